use crate::core::extractor::{ExtractError, ACCEPTED_FORMATS};
use crate::models::ErrorResponse;
use crate::services::SourceError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// Longest message exposed for unclassified failures
pub const MAX_UNEXPECTED_MESSAGE: usize = 200;

/// Request-level failures of an export
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("application identifier not found in '{0}'")]
    IdentifierNotFound(String),

    #[error("review source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("application not found upstream: {0}")]
    UpstreamNotFound(String),

    #[error("review source temporarily unreachable: {0}")]
    UpstreamTransient(String),

    #[error("access to review source denied: {0}")]
    UpstreamForbidden(String),

    #[error("no reviews for {app_id} in the last {days} days (limit {limit})")]
    NoMatchingRecords { app_id: String, days: u32, limit: usize },

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ExportError {
    pub fn status(&self) -> StatusCode {
        match self {
            ExportError::InvalidInput(_) | ExportError::IdentifierNotFound(_) => StatusCode::BAD_REQUEST,
            ExportError::UpstreamNotFound(_)
            | ExportError::NoMatchingRecords { .. }
            | ExportError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ExportError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ExportError::UpstreamForbidden(_) => StatusCode::FORBIDDEN,
            ExportError::UpstreamTransient(_) => StatusCode::SERVICE_UNAVAILABLE,
            ExportError::SourceUnavailable(_) | ExportError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller
    pub fn public_message(&self) -> String {
        match self {
            ExportError::InvalidInput(reason) => format!("Invalid request: {}", reason),
            ExportError::IdentifierNotFound(_) => format!(
                "Could not extract an application ID from the URL. Examples: {}",
                ACCEPTED_FORMATS
            ),
            ExportError::SourceUnavailable(_) => {
                "The review source is not available on this server".to_string()
            }
            ExportError::UpstreamNotFound(_) => {
                "Application not found. Check that the ID is correct".to_string()
            }
            ExportError::UpstreamTransient(_) => {
                "The review source could not be reached. Please try again later".to_string()
            }
            ExportError::UpstreamForbidden(_) => "Access to the review source was denied".to_string(),
            ExportError::NoMatchingRecords { app_id, limit: 0, .. } => {
                format!("No reviews exported for {}: the review limit is 0", app_id)
            }
            ExportError::NoMatchingRecords { app_id, days, .. } => {
                format!("No reviews found for {} in the last {} days", app_id, days)
            }
            ExportError::MethodNotAllowed(method) => {
                format!("Method {} not allowed. Use GET or POST", method)
            }
            ExportError::RouteNotFound(path) => format!("Unknown endpoint: {}", path),
            ExportError::Unexpected(detail) => {
                let bounded: String = detail.chars().take(MAX_UNEXPECTED_MESSAGE).collect();
                format!("Internal server error: {}", bounded)
            }
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: true,
            status: self.status().as_u16(),
            message: self.public_message(),
        }
    }
}

impl From<ExtractError> for ExportError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Empty => ExportError::InvalidInput("the \"url\" field is empty".to_string()),
            ExtractError::NotFound(input) => ExportError::IdentifierNotFound(input),
        }
    }
}

impl From<SourceError> for ExportError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(m) => ExportError::UpstreamNotFound(m),
            SourceError::Transient(m) => ExportError::UpstreamTransient(m),
            SourceError::Forbidden(m) => ExportError::UpstreamForbidden(m),
            SourceError::Unavailable(m) => ExportError::SourceUnavailable(m),
            SourceError::Other(m) => ExportError::Unexpected(m),
        }
    }
}

impl ResponseError for ExportError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status()).json(self.to_response())
    }
}
