// Service exports
pub mod demo_source;
pub mod http_source;
pub mod review_source;

pub use demo_source::DemoReviewSource;
pub use http_source::HttpReviewSource;
pub use review_source::{ReviewPage, ReviewQuery, ReviewSource, SortOrder, SourceError};
