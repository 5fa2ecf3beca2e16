use actix_web::HttpServer;
use review_export::config::{Settings, SourceKind};
use review_export::core::Exporter;
use review_export::routes::{self, reviews::AppState};
use review_export::services::{DemoReviewSource, HttpReviewSource, ReviewSource};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn build_source(settings: &Settings) -> Option<Arc<dyn ReviewSource>> {
    match settings.source.kind {
        SourceKind::Demo => {
            warn!("Using the demo review source, exports contain sample data");
            Some(Arc::new(DemoReviewSource::new()))
        }
        SourceKind::Http => match HttpReviewSource::new(&settings.source.endpoint, settings.source.timeout_secs) {
            Ok(source) => {
                info!("Review feed client initialized ({})", source.base_url());
                Some(Arc::new(source))
            }
            Err(e) => {
                // Keep serving; export requests report the source as unavailable
                error!("Failed to initialize review feed client: {}", e);
                None
            }
        },
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting review export service...");

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, format!("Configuration error: {}", e))
    })?;

    info!("Configuration loaded successfully");

    let source = build_source(&settings);

    let exporter = Exporter::new(settings.source.params(), settings.sanitizer());
    let window = settings.export.window();

    info!(
        "Export window: {} days, up to {} reviews ({}/{})",
        window.max_age_days, window.max_count, settings.source.language, settings.source.region
    );

    // Build application state
    let app_state = AppState {
        source,
        exporter,
        window,
        max_count_limit: settings.export.max_count_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || routes::app(app_state.clone()))
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
