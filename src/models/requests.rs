use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to export reviews for one application
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExportRequest {
    /// Listing URL, query fragment or bare identifier
    #[validate(length(min = 1))]
    pub url: String,
    /// Overrides the configured recency window
    #[serde(default, alias = "max_age_days")]
    #[validate(range(min = 1, max = 3650))]
    pub days: Option<u32>,
    /// Overrides the configured result cap
    #[serde(default, alias = "max_count")]
    pub limit: Option<u32>,
}
