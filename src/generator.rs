use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::cache::{CacheStore, derive_key};
use crate::error::Result;
use crate::models::{GenerationOptions, GenerationRequest, GenerationResult, LogoMetadata};
use crate::openai::{ImageClient, ImageRequest};
use crate::retry::RetryPolicy;
use crate::templates::PromptEngine;

/// Anything that can turn a request into a generated logo.
#[async_trait]
pub trait LogoService: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
        options: &GenerationOptions,
    ) -> Result<GenerationResult>;
}

pub fn new_logo_id() -> String {
    format!("logo_{}", uuid::Uuid::new_v4().simple())
}

pub struct LogoGenerator<C> {
    client: C,
    engine: PromptEngine<'static>,
    cache: Option<CacheStore>,
    retry: RetryPolicy,
}

impl<C: ImageClient> LogoGenerator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            engine: PromptEngine::default(),
            cache: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_engine(mut self, engine: PromptEngine<'static>) -> Self {
        self.engine = engine;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref()
    }
}

#[async_trait]
impl<C: ImageClient> LogoService for LogoGenerator<C> {
    async fn generate(
        &self,
        request: &GenerationRequest,
        options: &GenerationOptions,
    ) -> Result<GenerationResult> {
        let request = request.overlay(options);
        request.validate()?;
        let final_prompt = self.engine.build(&request, options)?;

        let key = derive_key(&request.company, &request.prompt, request.style, &request.colors);
        if let Some(cache) = &self.cache {
            if let Some(entry) = cache.get(&key).await {
                info!("cache hit for {} ({})", request.company, key);
                let mut result = entry.result;
                result.cached = entry.hit;
                return Ok(result);
            }
            debug!("cache miss for {} ({})", request.company, key);
        }

        let size = request.effective_size();
        let quality = request.effective_quality();
        let image_request = ImageRequest {
            prompt: final_prompt.clone(),
            size,
            quality,
        };
        let image = self
            .retry
            .execute(|| self.client.generate(&image_request))
            .await?;

        let result = GenerationResult {
            url: image.url,
            revised_prompt: image.revised_prompt,
            metadata: LogoMetadata {
                id: new_logo_id(),
                created_at: Utc::now(),
                company: request.company.clone(),
                original_prompt: request.prompt.clone(),
                final_prompt,
                style: request.style,
                industry: request.industry,
                size,
                quality,
                cost: quality.cost_usd(),
                template_id: options.template_id.clone(),
            },
            local_path: None,
            cached: false,
        };
        info!(
            "generated logo {} for {} (${:.2})",
            result.metadata.id, result.metadata.company, result.metadata.cost
        );

        if let Some(cache) = &self.cache {
            cache.set(&key, &result).await;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cache::{CacheConfig, CleanupSchedule};
    use crate::error::{LogoError, UpstreamError, UpstreamErrorKind};
    use crate::models::{Quality, Style};
    use crate::openai::GeneratedImage;

    #[derive(Default)]
    struct ScriptedClient {
        calls: AtomicUsize,
        rate_limited_calls: usize,
    }

    #[async_trait]
    impl ImageClient for ScriptedClient {
        async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.rate_limited_calls {
                return Err(UpstreamError::from_status(429, "Too Many Requests").into());
            }
            Ok(GeneratedImage {
                url: format!("https://cdn.example.com/{call}.png"),
                revised_prompt: Some(format!("revised: {}", request.prompt)),
            })
        }
    }

    #[tokio::test]
    async fn generates_with_free_form_prompt_and_cost() -> Result<()> {
        let generator = LogoGenerator::new(ScriptedClient::default());
        let request = GenerationRequest::new("Acme", "bold new idea");

        let standard = generator.generate(&request, &GenerationOptions::default()).await?;
        assert!(
            standard
                .metadata
                .final_prompt
                .starts_with("Professional logo of Acme, bold new idea")
        );
        assert!(standard.metadata.final_prompt.contains(" --no text"));
        assert_eq!(standard.cost(), 0.07);
        assert!(standard.metadata.id.starts_with("logo_"));
        assert_eq!(standard.metadata.original_prompt, "bold new idea");

        let hd = generator
            .generate(&request.clone().with_quality(Quality::Hd), &GenerationOptions::default())
            .await?;
        assert_eq!(hd.cost(), 0.19);
        assert_eq!(hd.metadata.quality, Quality::Hd);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_template_fails_before_any_call() {
        let generator = LogoGenerator::new(ScriptedClient::default());
        let options = GenerationOptions {
            template_id: Some("nope".into()),
            ..Default::default()
        };
        let err = generator
            .generate(&GenerationRequest::new("Acme", "x"), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, LogoError::TemplateNotFound { .. }));
        assert_eq!(generator.client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_request_fails_before_any_call() {
        let generator = LogoGenerator::new(ScriptedClient::default());
        let err = generator
            .generate(&GenerationRequest::new("", "x"), &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LogoError::Validation { .. }));
        assert_eq!(generator.client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repeated_request_is_served_from_cache() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let cache = CacheStore::new(CacheConfig {
            schedule: CleanupSchedule::Manual,
            ..CacheConfig::new(temp.path())
        });
        let generator = LogoGenerator::new(ScriptedClient::default()).with_cache(cache);
        let request = GenerationRequest::new("Acme", "rockets")
            .with_style(Style::Bold)
            .with_colors(["red", "blue"]);

        let first = generator.generate(&request, &GenerationOptions::default()).await?;
        let reordered = request.clone().with_colors(["blue", "red"]);
        let second = generator.generate(&reordered, &GenerationOptions::default()).await?;

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.metadata, first.metadata);
        assert_eq!(second.url, first.url);
        assert_eq!(generator.client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(generator.cache().unwrap().stats().await.unwrap().file_entries, 1);
        Ok(())
    }

    #[tokio::test]
    async fn cache_hit_from_disk_is_reported_after_restart() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = || CacheConfig {
            schedule: CleanupSchedule::Manual,
            ..CacheConfig::new(temp.path())
        };
        let request = GenerationRequest::new("Acme", "rockets");

        let fresh = LogoGenerator::new(ScriptedClient::default())
            .with_cache(CacheStore::new(config()))
            .generate(&request, &GenerationOptions::default())
            .await?;
        assert!(!fresh.cached);

        let restarted = LogoGenerator::new(ScriptedClient::default())
            .with_cache(CacheStore::new(config()));
        let replayed = restarted.generate(&request, &GenerationOptions::default()).await?;
        assert!(replayed.cached);
        assert_eq!(replayed.metadata.id, fresh.metadata.id);
        assert_eq!(restarted.client.calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_calls_are_retried() -> Result<()> {
        let generator = LogoGenerator::new(ScriptedClient {
            rate_limited_calls: 2,
            ..Default::default()
        });
        let result = generator
            .generate(&GenerationRequest::new("Acme", "x"), &GenerationOptions::default())
            .await?;
        assert_eq!(result.url, "https://cdn.example.com/2.png");
        assert_eq!(generator.client.calls.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn retries_stop_at_max_attempts() {
        let generator = LogoGenerator::new(ScriptedClient {
            rate_limited_calls: 10,
            ..Default::default()
        })
        .with_retry(RetryPolicy::default().with_max_attempts(2));
        let err = generator
            .generate(&GenerationRequest::new("Acme", "x"), &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LogoError::Upstream(UpstreamError { kind: UpstreamErrorKind::RateLimited, .. })
        ));
        assert_eq!(generator.client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn preview_matches_generated_prompt() -> Result<()> {
        let generator = LogoGenerator::new(ScriptedClient::default());
        let options = GenerationOptions {
            template_id: Some("finance-trust".into()),
            ..Default::default()
        };
        let request = GenerationRequest::new("Ledger", "steady growth");
        let preview = generator.engine.preview(&request, &options)?;
        assert!(
            preview.starts_with("Trustworthy financial services logo for Ledger, steady growth")
        );
        assert_eq!(generator.client.calls.load(Ordering::SeqCst), 0);

        let result = generator.generate(&request, &options).await?;
        assert_eq!(result.metadata.final_prompt, preview);
        assert_eq!(result.metadata.template_id.as_deref(), Some("finance-trust"));
        Ok(())
    }
}
