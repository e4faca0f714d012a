//! Built-in transformation catalog loader.
//!
//! One YAML file per transformation. Every file is validated; bad files are
//! collected into the aggregate error list instead of aborting the load.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use prism_core::errors::{CatalogError, PrismResult};
use prism_core::models::{OutputFormat, Transformation};
use prism_template::TemplateRenderer;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    name: String,
    title: Option<String>,
    description: String,
    prompt_template: String,
    output_format: OutputFormat,
    output_schema: Option<Value>,
    model_id: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    #[serde(default)]
    apply_default: bool,
    #[serde(default)]
    applicable_ingestion_types: Vec<String>,
}

/// Outcome of loading a catalog directory. Valid entries and per-file
/// errors are reported side by side.
#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub transformations: Vec<Transformation>,
    pub errors: Vec<CatalogError>,
}

/// Load every `.yaml`/`.yml` file under `dir` as a system-default
/// transformation. Only a directory read failure is fatal; per-file
/// problems land in `errors`.
pub fn load_catalog_dir(dir: impl AsRef<Path>) -> PrismResult<CatalogLoad> {
    let dir = dir.as_ref();
    let renderer = TemplateRenderer::new();
    let mut load = CatalogLoad::default();

    let entries = fs::read_dir(dir).map_err(|e| CatalogError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    paths.sort();

    for path in paths {
        match load_catalog_file(&path, &renderer) {
            Ok(transformation) => load.transformations.push(transformation),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping invalid catalog file");
                load.errors.push(e);
            }
        }
    }

    info!(
        loaded = load.transformations.len(),
        failed = load.errors.len(),
        dir = %dir.display(),
        "catalog load complete"
    );
    Ok(load)
}

fn load_catalog_file(path: &Path, renderer: &TemplateRenderer) -> Result<Transformation, CatalogError> {
    let display = path.display().to_string();
    let invalid = |message: String| CatalogError::InvalidFile {
        path: display.clone(),
        message,
    };

    let raw = fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let entry: CatalogEntry = serde_yaml::from_str(&raw).map_err(|e| invalid(e.to_string()))?;

    if let Some(temperature) = entry.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(invalid(format!(
                "temperature {temperature} outside [0, 2]"
            )));
        }
    }
    if let Some(max_tokens) = entry.max_tokens {
        if !(1..=128_000).contains(&max_tokens) {
            return Err(invalid(format!(
                "maxTokens {max_tokens} outside [1, 128000]"
            )));
        }
    }
    if entry.output_format == OutputFormat::Structured && entry.output_schema.is_none() {
        return Err(invalid(
            "structured output requires an outputSchema".to_string(),
        ));
    }

    let validation = renderer.validate(&entry.prompt_template);
    if !validation.valid {
        return Err(invalid(format!(
            "invalid promptTemplate: {}",
            validation.error.unwrap_or_else(|| "unknown error".to_string())
        )));
    }

    let now = Utc::now();
    Ok(Transformation {
        id: uuid::Uuid::new_v4().to_string(),
        tenant_id: None,
        name: entry.name,
        title: entry.title,
        description: Some(entry.description),
        prompt_template: entry.prompt_template,
        output_format: entry.output_format,
        output_schema: entry.output_schema,
        apply_default: entry.apply_default,
        model_id: entry.model_id,
        temperature: entry.temperature,
        max_tokens: entry.max_tokens,
        applicable_ingestion_types: entry.applicable_ingestion_types,
        is_enabled: true,
        version: 1,
        created_at: now,
        updated_at: now,
    })
}
