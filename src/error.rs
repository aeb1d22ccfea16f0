use std::fmt;

use thiserror::Error;

pub type Result<T, E = LogoError> = std::result::Result<T, E>;

/// How an upstream failure should be treated by the retry wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    RateLimited,
    Transient,
    Fatal,
}

const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "too many requests", "quota exceeded"];
const TRANSIENT_MARKERS: &[&str] = &[
    "network",
    "timeout",
    "connection",
    "econnreset",
    "socket hang up",
];

impl UpstreamErrorKind {
    /// Fallback classifier for errors that arrive as plain text.
    pub fn from_message(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if RATE_LIMIT_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            return Self::RateLimited;
        }
        if TRANSIENT_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            return Self::Transient;
        }
        Self::Fatal
    }

    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            408 | 500 | 502 | 503 | 504 => Self::Transient,
            _ => Self::Fatal,
        }
    }

    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::Fatal)
    }
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RateLimited => "rate limited",
            Self::Transient => "transient",
            Self::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    pub fn new(kind: UpstreamErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: UpstreamErrorKind::from_status(status),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Wraps an untyped third-party error, classifying it by its text.
    pub fn from_untyped(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: UpstreamErrorKind::from_message(&message),
            status: None,
            message,
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(
                f,
                "image API error ({}, HTTP {code}): {}",
                self.kind, self.message
            ),
            None => write!(f, "image API error ({}): {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for UpstreamError {}

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("template not found: {id}")]
    TemplateNotFound { id: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("download of {url} failed: {message}")]
    Download { url: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LogoError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Error returned when a CLI or batch value does not name a known variant.
#[derive(Debug, Clone, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_rate_limit_messages_case_insensitively() {
        assert_eq!(
            UpstreamErrorKind::from_message("429 Too Many Requests"),
            UpstreamErrorKind::RateLimited
        );
        assert_eq!(
            UpstreamErrorKind::from_message("Billing QUOTA EXCEEDED for org"),
            UpstreamErrorKind::RateLimited
        );
    }

    #[test]
    fn classifies_transient_network_messages() {
        for message in [
            "read ECONNRESET",
            "socket hang up",
            "Connection refused",
            "request timeout",
        ] {
            assert_eq!(
                UpstreamErrorKind::from_message(message),
                UpstreamErrorKind::Transient,
                "{message}"
            );
        }
    }

    #[test]
    fn everything_else_is_fatal() {
        assert_eq!(
            UpstreamErrorKind::from_message("content policy violation"),
            UpstreamErrorKind::Fatal
        );
        assert_eq!(UpstreamErrorKind::from_status(400), UpstreamErrorKind::Fatal);
        assert_eq!(UpstreamErrorKind::from_status(429), UpstreamErrorKind::RateLimited);
        assert_eq!(UpstreamErrorKind::from_status(503), UpstreamErrorKind::Transient);
    }

    #[test]
    fn upstream_display_includes_status() {
        let err = UpstreamError::from_status(429, "slow down");
        assert_eq!(err.to_string(), "image API error (rate limited, HTTP 429): slow down");
    }
}
