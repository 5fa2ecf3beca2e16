//! Review Export - collects storefront app reviews and exports them as CSV
//!
//! The library holds the export pipeline: identifier extraction, the
//! recency/count filter over the review feed, field sanitization and CSV
//! encoding, plus the review source adapters and HTTP routes around it.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{encode, extract, ExportError, Exporter, FilterCap, Sanitizer};
pub use models::{AppIdentifier, ExportDocument, ExportRow, FilterWindow, ReviewRecord};
