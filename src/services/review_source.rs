use crate::models::AppIdentifier;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

/// Three-digit status codes standing alone in an error message
static STATUS_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[1-5]\d{2}\b").expect("status code pattern is valid"));

/// Errors reported by a review source
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("application not found: {0}")]
    NotFound(String),

    #[error("network failure: {0}")]
    Transient(String),

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("review source unavailable: {0}")]
    Unavailable(String),

    #[error("review source error: {0}")]
    Other(String),
}

impl SourceError {
    /// Classify a free-form upstream error message by its wording
    pub fn classify_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        let codes: Vec<&str> = STATUS_CODE.find_iter(&lower).map(|m| m.as_str()).collect();
        let has = |words: &[&str], statuses: &[&str]| {
            words.iter().any(|w| lower.contains(w)) || statuses.iter().any(|s| codes.contains(s))
        };

        if has(&["not found", "no such app", "does not exist"], &["404"]) {
            SourceError::NotFound(message.to_string())
        } else if has(&["forbidden", "permission", "denied", "unauthorized"], &["401", "403"]) {
            SourceError::Forbidden(message.to_string())
        } else if has(
            &["timeout", "timed out", "network", "connection", "unavailable"],
            &["408", "429", "502", "503", "504"],
        ) {
            SourceError::Transient(message.to_string())
        } else {
            SourceError::Other(message.to_string())
        }
    }

    /// Classify a non-success HTTP status, falling back to the body text
    pub fn from_status(status: u16, message: &str) -> Self {
        match status {
            404 => SourceError::NotFound(message.to_string()),
            401 | 403 => SourceError::Forbidden(message.to_string()),
            408 | 429 | 500..=599 => SourceError::Transient(message.to_string()),
            _ => Self::classify_message(message),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            SourceError::Transient(err.to_string())
        } else if err.is_builder() {
            SourceError::Unavailable(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::from_status(status.as_u16(), &err.to_string())
        } else {
            SourceError::Other(err.to_string())
        }
    }
}

/// Review ordering requested from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
        }
    }
}

/// Query parameters for one collection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewQuery {
    pub app_id: AppIdentifier,
    pub language: String,
    pub region: String,
    pub sort: SortOrder,
    pub page_size: u32,
}

/// One page of raw review entries
#[derive(Debug, Clone, Default)]
pub struct ReviewPage {
    pub records: Vec<Value>,
    /// Continuation token; `None` when the feed is exhausted
    pub next_token: Option<String>,
}

/// Capability that produces reviews for an application
///
/// Implementations page through the feed; callers stop asking for pages as
/// soon as they have enough.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_page(
        &self,
        query: &ReviewQuery,
        token: Option<&str>,
    ) -> Result<ReviewPage, SourceError>;
}
