use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;

use crate::error::{LogoError, Result};
use crate::models::{GenerationResult, Style};

pub const MANIFEST_FILE: &str = "iterations.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoSummary {
    pub id: String,
    pub company: String,
    pub style: Option<Style>,
    pub file: Option<String>,
    pub cost: f64,
    #[serde(default)]
    pub cached: bool,
}

impl From<&GenerationResult> for LogoSummary {
    fn from(result: &GenerationResult) -> Self {
        Self {
            id: result.metadata.id.clone(),
            company: result.metadata.company.clone(),
            style: result.metadata.style,
            file: result
                .local_path
                .as_ref()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned()),
            cost: result.metadata.cost,
            cached: result.cached,
        }
    }
}

/// One batch run as recorded in `iterations.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    pub iteration: u32,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub count: usize,
    pub total_cost: f64,
    pub logos: Vec<LogoSummary>,
}

impl IterationRecord {
    pub fn new(iteration: u32, description: impl Into<String>, results: &[GenerationResult]) -> Self {
        Self {
            iteration,
            timestamp: Utc::now(),
            description: description.into(),
            count: results.len(),
            total_cost: results
                .iter()
                .filter(|result| !result.cached)
                .map(GenerationResult::cost)
                .sum(),
            logos: results.iter().map(LogoSummary::from).collect(),
        }
    }
}

pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILE)
}

async fn read_entries(path: &Path) -> Result<Vec<Value>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Array(entries) => Ok(entries),
        _ => Err(LogoError::validation(format!(
            "{} is not a JSON array, refusing to overwrite it",
            path.display()
        ))),
    }
}

/// Appends `record` to the manifest, keeping every earlier entry verbatim.
pub async fn append_iteration(output_dir: &Path, record: &IterationRecord) -> Result<PathBuf> {
    let path = manifest_path(output_dir);
    let mut entries = read_entries(&path).await?;
    entries.push(serde_json::to_value(record)?);
    fs::create_dir_all(output_dir).await?;
    fs::write(&path, serde_json::to_vec_pretty(&entries)?).await?;
    Ok(path)
}

pub async fn load_manifest(output_dir: &Path) -> Result<Vec<IterationRecord>> {
    read_entries(&manifest_path(output_dir))
        .await?
        .into_iter()
        .map(|entry| serde_json::from_value(entry).map_err(LogoError::from))
        .collect()
}
