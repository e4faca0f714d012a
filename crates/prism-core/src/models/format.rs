use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared output format of a transformation. Closed set — format dispatch
/// in the parser and the system-prompt selection are exhaustive matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Structured,
}

impl OutputFormat {
    /// System prompt sent alongside the rendered template.
    pub fn system_prompt(self) -> &'static str {
        match self {
            OutputFormat::Json => {
                "You are a precise AI assistant. Always respond with valid JSON only. \
                 No additional text or explanation outside the JSON structure."
            }
            OutputFormat::Structured => {
                "You are a precise AI assistant. Follow the output schema exactly. \
                 Respond with valid JSON matching the required structure."
            }
            OutputFormat::Markdown => {
                "You are a helpful AI assistant. Provide clear, well-formatted \
                 responses using Markdown."
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::Structured => "structured",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
