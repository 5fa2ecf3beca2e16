// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{AppIdentifier, ExportDocument, ExportRow, FieldLimits, FilterWindow, RecordError, ReviewRecord};
pub use requests::ExportRequest;
pub use responses::{ErrorResponse, HealthResponse, ServiceInfoResponse};
