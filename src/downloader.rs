use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose;
use reqwest::Client;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};
use url::Url;

use crate::error::{LogoError, Result};
use crate::image_processing::{self, ImageInfo};
use crate::models::{GenerationResult, LogoMetadata};

const METADATA_DIR: &str = ".metadata";
const ID_SUFFIX_LEN: usize = 6;
const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

pub fn validate_http_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LogoError::validation("image url is empty"));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|err| LogoError::validation(format!("invalid image url '{trimmed}': {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(LogoError::validation(format!(
            "unsupported url scheme '{scheme}', only http and https are allowed"
        ))),
    }
}

/// `<output_dir>` or `<output_dir>/iteration-N`.
pub fn target_dir(output_dir: &Path, iteration: Option<u32>) -> PathBuf {
    match iteration {
        Some(iteration) => output_dir.join(format!("iteration-{iteration}")),
        None => output_dir.to_path_buf(),
    }
}

/// Lowercases and collapses every run of non-alphanumerics into one `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("logo");
    }
    slug
}

pub fn logo_filename(metadata: &LogoMetadata) -> String {
    let style = metadata.style.map(|style| style.as_str()).unwrap_or("default");
    let id_chars: Vec<char> = metadata.id.chars().collect();
    let suffix: String = id_chars[id_chars.len().saturating_sub(ID_SUFFIX_LEN)..]
        .iter()
        .collect();
    format!(
        "{}-{}-{}-{}.png",
        slugify(&metadata.company),
        style,
        metadata.created_at.format("%Y-%m-%d"),
        suffix
    )
}

fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| LogoError::download(truncate(url), "malformed data url"))?;
    if !header.ends_with(";base64") {
        return Err(LogoError::download(truncate(url), "only base64 data urls are supported"));
    }
    general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|err| LogoError::download(truncate(url), err.to_string()))
}

fn truncate(url: &str) -> String {
    url.chars().take(48).collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataSidecar<'a> {
    #[serde(flatten)]
    metadata: &'a LogoMetadata,
    url: &'a str,
    revised_prompt: Option<&'a str>,
    local_path: &'a Path,
    image: &'a ImageInfo,
}

/// Saves generated images and their metadata sidecars to disk.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    timeout: Duration,
}

impl Default for Downloader {
    fn default() -> Self {
        Self::with_client(Client::new())
    }
}

impl Downloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(DOWNLOAD_TIMEOUT_SECS),
        }
    }

    /// Bounds each fetch from connect to the end of the body.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        if url.starts_with("data:") {
            return decode_data_url(url);
        }
        let validated = validate_http_url(url)?;
        let response = self
            .client
            .get(validated.as_str())
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LogoError::download(url, format!("HTTP {status}")));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetches the image for `result` and returns the path it was written to.
    pub async fn download(
        &self,
        result: &GenerationResult,
        output_dir: &Path,
        iteration: Option<u32>,
    ) -> Result<PathBuf> {
        let dir = target_dir(output_dir, iteration);
        fs::create_dir_all(&dir).await?;

        let bytes = self.fetch_bytes(&result.url).await?;
        let info = image_processing::inspect(&bytes);
        if info.mime_type.as_deref() != Some("image/png") {
            warn!(
                "image for {} is {}, saving with .png extension anyway",
                result.metadata.id,
                info.mime_type.as_deref().unwrap_or("an unknown format")
            );
        }

        let path = dir.join(logo_filename(&result.metadata));
        fs::write(&path, &bytes).await?;
        debug!("saved {} ({} bytes)", path.display(), bytes.len());

        if let Err(err) = self.write_sidecar(&dir, result, &path, &info).await {
            warn!("metadata for {} not written: {}", result.metadata.id, err);
        }
        Ok(path)
    }

    async fn write_sidecar(
        &self,
        dir: &Path,
        result: &GenerationResult,
        local_path: &Path,
        info: &ImageInfo,
    ) -> Result<()> {
        let metadata_dir = dir.join(METADATA_DIR);
        fs::create_dir_all(&metadata_dir).await?;
        let sidecar = MetadataSidecar {
            metadata: &result.metadata,
            url: if result.url.starts_with("data:") {
                "inline"
            } else {
                result.url.as_str()
            },
            revised_prompt: result.revised_prompt.as_deref(),
            local_path,
            image: info,
        };
        let payload = serde_json::to_vec_pretty(&sidecar)?;
        fs::write(metadata_dir.join(format!("{}.json", result.metadata.id)), payload).await?;
        Ok(())
    }
}
