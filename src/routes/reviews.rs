use crate::core::{ExportError, Exporter};
use crate::models::{ExportDocument, ExportRequest, FilterWindow, HealthResponse, ServiceInfoResponse};
use crate::services::ReviewSource;
use actix_web::{http::header, web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// `None` when the configured source failed to initialize
    pub source: Option<Arc<dyn ReviewSource>>,
    pub exporter: Exporter,
    pub window: FilterWindow,
    pub max_count_limit: usize,
}

impl AppState {
    /// Configured window with the request's overrides applied
    pub fn window_for(&self, req: &ExportRequest) -> FilterWindow {
        FilterWindow {
            max_age_days: req.days.unwrap_or(self.window.max_age_days),
            max_count: req
                .limit
                .map(|l| l as usize)
                .unwrap_or(self.window.max_count)
                .min(self.max_count_limit),
        }
    }
}

/// Configure all review export routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("", web::get().to(service_info))
        .route("/", web::get().to(service_info))
        .route("", web::post().to(export_reviews))
        .route("/", web::post().to(export_reviews))
        .route("/index", web::post().to(export_reviews))
        .route("/export", web::post().to(export_reviews))
        .route("/health", web::get().to(health_check));
}

/// Service description endpoint
async fn service_info() -> impl Responder {
    HttpResponse::Ok().json(ServiceInfoResponse {
        status: "success".to_string(),
        service: "App Reviews Exporter".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Send a POST request with { \"url\": \"<listing URL or app ID>\" }".to_string(),
        example: serde_json::json!({ "url": "com.whatsapp" }),
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.source.is_some() { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Export reviews endpoint
///
/// POST /api/export
///
/// Request body:
/// ```json
/// {
///   "url": "https://play.google.com/store/apps/details?id=com.whatsapp",
///   "days": 365,
///   "limit": 100
/// }
/// ```
async fn export_reviews(
    state: web::Data<AppState>,
    req: web::Json<ExportRequest>,
) -> Result<HttpResponse, ExportError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for export request: {}", errors);
        return Err(ExportError::InvalidInput(errors.to_string()));
    }

    let source = state.source.as_deref().ok_or_else(|| {
        ExportError::SourceUnavailable("review source failed to initialize".to_string())
    })?;

    let window = state.window_for(&req);

    let document = state
        .exporter
        .run(source, &req.url, window)
        .await
        .inspect_err(|e| tracing::warn!("Export failed for '{}': {}", req.url.trim(), e))?;

    Ok(HttpResponse::Ok()
        .content_type(ExportDocument::CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.filename),
        ))
        .insert_header((header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
        .body(document.bytes))
}
