// Route exports
pub mod reviews;

use crate::core::ExportError;
use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error,
    http::Method,
    middleware, web, App, HttpRequest, HttpResponse,
};
use reviews::AppState;

/// Endpoint paths served under `/api`
const ENDPOINTS: [&str; 5] = ["", "/", "/index", "/export", "/health"];

/// Build the application with shared state, CORS, middleware and routes
pub fn app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(Cors::permissive())
        .wrap(middleware::Logger::default())
        .wrap(middleware::Compress::default())
        .configure(configure_routes)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(reviews::configure)
            .default_service(web::to(unmatched)),
    );
}

/// Fallback for requests no route accepted
///
/// Known paths with an unsupported method get 405, anything else 404. Plain
/// `OPTIONS` requests that are not CORS preflights are acknowledged.
async fn unmatched(req: HttpRequest) -> Result<HttpResponse, ExportError> {
    if *req.method() == Method::OPTIONS {
        return Ok(HttpResponse::Ok().finish());
    }

    let path = req.path();
    let relative = path.strip_prefix("/api").unwrap_or(path);

    if ENDPOINTS.contains(&relative) {
        tracing::info!("Rejected {} {}", req.method(), path);
        Err(ExportError::MethodNotAllowed(req.method().to_string()))
    } else {
        Err(ExportError::RouteNotFound(path.to_string()))
    }
}

/// Handle JSON payload errors
///
/// Malformed bodies, non-object bodies and a missing `url` field all end up
/// here and are reported with the regular error shape.
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ExportError::InvalidInput(format!(
        "request body must be a JSON object with a \"url\" field ({})",
        err
    ))
    .into()
}

/// JSON extractor configuration used by the export endpoints
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .content_type_required(false)
        .error_handler(handle_json_payload_error)
}
