use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::time::Duration;
use tracing::debug;

use crate::error::{LogoError, Result, UpstreamError, UpstreamErrorKind};
use crate::models::{LogoSize, Quality};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "dall-e-3";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const RATE_LIMIT_ERROR_TYPES: &[&str] = &[
    "rate_limit_exceeded",
    "rate_limit_error",
    "insufficient_quota",
];

/// One image to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: LogoSize,
    pub quality: Quality,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    /// An `https://` URL, or a `data:` URL when the API answered inline.
    pub url: String,
    pub revised_prompt: Option<String>,
}

/// Boundary to the third-party image generation service.
#[async_trait]
pub trait ImageClient: Send + Sync {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage>;
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Option<Vec<ImageData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}

impl ApiError {
    fn is_rate_limit(&self) -> bool {
        [self.kind.as_deref(), self.code.as_deref()]
            .into_iter()
            .flatten()
            .any(|value| RATE_LIMIT_ERROR_TYPES.contains(&value))
    }
}

fn api_quality(model: &str, quality: Quality) -> &'static str {
    if model.starts_with("gpt-image") {
        match quality {
            Quality::Standard => "medium",
            Quality::Hd => "high",
        }
    } else {
        match quality {
            Quality::Standard => "standard",
            Quality::Hd => "hd",
        }
    }
}

/// Turns a non-success response into a classified [`UpstreamError`].
async fn assert_ok_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Err(classify_error_body(status.as_u16(), &text).into())
}

fn classify_error_body(status: u16, body: &str) -> UpstreamError {
    let api_error = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error);
    let message = api_error
        .as_ref()
        .and_then(|err| err.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    let mut error = UpstreamError::from_status(status, message);
    if api_error.as_ref().is_some_and(ApiError::is_rate_limit) {
        error.kind = UpstreamErrorKind::RateLimited;
    } else if error.kind == UpstreamErrorKind::Fatal {
        // Unknown statuses fall back to sniffing the message text.
        error.kind = UpstreamErrorKind::from_message(&error.message);
    }
    error
}

fn parse_images_response(body: &str) -> Result<GeneratedImage> {
    let payload: ImagesResponse = serde_json::from_str(body).map_err(|err| {
        UpstreamError::new(
            UpstreamErrorKind::Fatal,
            format!("unparsable image response: {err}"),
        )
    })?;
    if let Some(error) = payload.error {
        let message = error.message.clone().unwrap_or_else(|| "unknown error".to_string());
        let kind = if error.is_rate_limit() {
            UpstreamErrorKind::RateLimited
        } else {
            UpstreamErrorKind::from_message(&message)
        };
        return Err(UpstreamError::new(kind, message).into());
    }
    let image = payload
        .data
        .and_then(|images| images.into_iter().next())
        .ok_or_else(|| {
            UpstreamError::new(UpstreamErrorKind::Fatal, "image API returned no images")
        })?;
    let url = match (image.url, image.b64_json) {
        (Some(url), _) => url,
        (None, Some(b64)) => format!("data:image/png;base64,{b64}"),
        (None, None) => {
            return Err(UpstreamError::new(
                UpstreamErrorKind::Fatal,
                "image API returned neither url nor b64_json",
            )
            .into());
        }
    };
    Ok(GeneratedImage {
        url,
        revised_prompt: image.revised_prompt,
    })
}

#[derive(Debug, Clone)]
pub struct OpenAiImageClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiImageClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LogoError::configuration(
                "missing OPENAI_API_KEY; export it or add it to .env",
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ImageClient for OpenAiImageClient {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        let body = json!({
            "model": self.model,
            "prompt": request.prompt,
            "n": 1,
            "size": request.size.as_str(),
            "quality": api_quality(&self.model, request.quality),
            "background": "transparent",
            "response_format": "url",
        });
        debug!("image generation request: {}", body);

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        debug!("image generation response status: {}", response.status());

        let response = assert_ok_response(response).await?;
        let text = response.text().await?;
        parse_images_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let err = OpenAiImageClient::new("  ", DEFAULT_BASE_URL, DEFAULT_MODEL).unwrap_err();
        assert!(matches!(err, LogoError::Configuration { .. }));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn error_bodies_are_classified_at_the_boundary() {
        let limited = classify_error_body(
            429,
            r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#,
        );
        assert_eq!(limited.kind, UpstreamErrorKind::RateLimited);
        assert_eq!(limited.message, "Rate limit reached");

        let quota = classify_error_body(
            400,
            r#"{"error":{"message":"You exceeded your plan","type":"insufficient_quota"}}"#,
        );
        assert_eq!(quota.kind, UpstreamErrorKind::RateLimited);

        let overloaded = classify_error_body(503, "upstream unavailable");
        assert_eq!(overloaded.kind, UpstreamErrorKind::Transient);

        let policy = classify_error_body(
            400,
            r#"{"error":{"message":"Your request was rejected by the safety system","type":"invalid_request_error"}}"#,
        );
        assert_eq!(policy.kind, UpstreamErrorKind::Fatal);
        assert_eq!(policy.status, Some(400));
    }

    #[test]
    fn parses_url_and_inline_images() {
        let image = parse_images_response(
            r#"{"data":[{"url":"https://cdn.example.com/a.png","revised_prompt":"A fox"}]}"#,
        )
        .unwrap();
        assert_eq!(image.url, "https://cdn.example.com/a.png");
        assert_eq!(image.revised_prompt.as_deref(), Some("A fox"));

        let inline = parse_images_response(r#"{"data":[{"b64_json":"AAAA"}]}"#).unwrap();
        assert_eq!(inline.url, "data:image/png;base64,AAAA");

        assert!(parse_images_response(r#"{"data":[]}"#).is_err());
    }

    #[test]
    fn quality_maps_per_model_family() {
        assert_eq!(api_quality("dall-e-3", Quality::Hd), "hd");
        assert_eq!(api_quality("gpt-image-1", Quality::Standard), "medium");
    }
}
