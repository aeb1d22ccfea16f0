use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use tokio::time::Duration;

use crate::cache::{CacheConfig, CacheStore};
use crate::error::{LogoError, Result};
use crate::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiImageClient};
use crate::retry::RetryPolicy;

const APP_DIR: &str = "logo-forge";
const DEFAULT_CACHE_TTL_HOURS: u64 = 24;
const DEFAULT_CACHE_MAX_MB: u64 = 100;
const DEFAULT_OUTPUT_DIR: &str = "./logos";
const DEFAULT_CONCURRENCY: usize = 3;
const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    pub cache_max_bytes: u64,
    pub cache_enabled: bool,
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub max_retries: u32,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    non_blank(value)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    match non_blank(value).map(|value| value.to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

fn default_cache_dir() -> PathBuf {
    let mut base = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR);
    base
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unparsable numbers fall back to
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: non_blank(lookup("OPENAI_API_KEY")),
            base_url: non_blank(lookup("OPENAI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: non_blank(lookup("LOGO_IMAGE_MODEL"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            cache_dir: non_blank(lookup("LOGO_CACHE_DIR"))
                .map(PathBuf::from)
                .unwrap_or_else(default_cache_dir),
            cache_ttl: Duration::from_secs(
                parse_or(lookup("LOGO_CACHE_TTL_HOURS"), DEFAULT_CACHE_TTL_HOURS) * 3600,
            ),
            cache_max_bytes: parse_or(lookup("LOGO_CACHE_MAX_MB"), DEFAULT_CACHE_MAX_MB)
                * 1024
                * 1024,
            cache_enabled: parse_flag(lookup("LOGO_CACHE_ENABLED"), true),
            output_dir: non_blank(lookup("LOGO_OUTPUT_DIR"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            concurrency: parse_or(lookup("LOGO_CONCURRENCY"), DEFAULT_CONCURRENCY),
            max_retries: parse_or(lookup("LOGO_MAX_RETRIES"), DEFAULT_MAX_RETRIES).max(1),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: self.cache_ttl,
            max_size_bytes: self.cache_max_bytes,
            ..CacheConfig::new(self.cache_dir.clone())
        }
    }

    /// `None` when caching is switched off.
    pub fn cache_store(&self) -> Option<CacheStore> {
        self.cache_enabled.then(|| CacheStore::new(self.cache_config()))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default().with_max_attempts(self.max_retries)
    }

    /// Only generation needs credentials; everything else works without them.
    pub fn image_client(&self) -> Result<OpenAiImageClient> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            LogoError::configuration("missing OPENAI_API_KEY; export it or add it to .env")
        })?;
        OpenAiImageClient::new(api_key, self.base_url.as_str(), self.model.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]);
        assert_eq!(config.api_key, None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, "dall-e-3");
        assert!(config.cache_dir.ends_with("logo-forge"));
        assert_eq!(config.cache_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(config.cache_max_bytes, 100 * 1024 * 1024);
        assert!(config.cache_enabled);
        assert_eq!(config.output_dir, PathBuf::from("./logos"));
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.retry_policy().max_attempts, 3);
    }

    #[test]
    fn reads_overrides_and_ignores_garbage() {
        let config = config(&[
            ("OPENAI_API_KEY", " sk-test "),
            ("LOGO_CACHE_DIR", "/tmp/logo-cache"),
            ("LOGO_CACHE_TTL_HOURS", "2"),
            ("LOGO_CACHE_MAX_MB", "lots"),
            ("LOGO_CACHE_ENABLED", "off"),
            ("LOGO_CONCURRENCY", "8"),
            ("LOGO_MAX_RETRIES", "0"),
        ]);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.cache_config().dir, PathBuf::from("/tmp/logo-cache"));
        assert_eq!(config.cache_config().ttl, Duration::from_secs(7200));
        assert_eq!(config.cache_max_bytes, 100 * 1024 * 1024);
        assert!(config.cache_store().is_none());
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn blank_api_key_is_a_configuration_error() {
        let err = config(&[("OPENAI_API_KEY", "   ")]).image_client().unwrap_err();
        assert!(matches!(err, LogoError::Configuration { .. }));
        assert!(config(&[("OPENAI_API_KEY", "sk-test")]).image_client().is_ok());
    }
}
