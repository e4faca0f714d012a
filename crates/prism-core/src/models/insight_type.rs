use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed classification of a derived insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightType {
    Summary,
    KeyPoints,
    ActionItems,
    Tags,
    Category,
    Sentiment,
    Entities,
    Topics,
    Questions,
    Custom,
}

impl InsightType {
    /// Insight types generated when a request does not name any explicitly.
    pub const DEFAULT_SET: [InsightType; 3] =
        [InsightType::Summary, InsightType::KeyPoints, InsightType::Tags];

    /// Name of the transformation that produces this insight type.
    /// Resolution goes through the tenant catalog first, so a tenant can
    /// shadow any of these with its own same-named transformation.
    pub fn transformation_name(self) -> &'static str {
        match self {
            InsightType::Summary => "system:summary",
            InsightType::KeyPoints => "system:key-insights",
            InsightType::ActionItems => "system:action-items",
            InsightType::Tags => "system:auto-tags",
            InsightType::Category => "system:categorize",
            InsightType::Sentiment => "system:sentiment",
            InsightType::Entities => "system:entities",
            InsightType::Topics => "system:topics",
            InsightType::Questions => "system:questions",
            InsightType::Custom => "custom",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InsightType::Summary => "summary",
            InsightType::KeyPoints => "key-points",
            InsightType::ActionItems => "action-items",
            InsightType::Tags => "tags",
            InsightType::Category => "category",
            InsightType::Sentiment => "sentiment",
            InsightType::Entities => "entities",
            InsightType::Topics => "topics",
            InsightType::Questions => "questions",
            InsightType::Custom => "custom",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
