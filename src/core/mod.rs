// Core pipeline exports
pub mod encoder;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod pipeline;
pub mod sanitizer;

pub use encoder::encode;
pub use error::ExportError;
pub use exporter::{Exporter, SourceParams};
pub use extractor::{extract, is_bare_identifier, ExtractError};
pub use pipeline::{collect, CollectStats, FilterCap, Flow};
pub use sanitizer::{clean_field, Sanitizer};
