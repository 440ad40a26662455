#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the ViralCast dashboard.
//!
//! Serves weekly case statistics, the recent case history, a one-week LSTM
//! forecast, and policy-adjusted custom forecasts. All artifacts are loaded
//! once at startup; any that fail to load leave the server running in a
//! degraded mode where the endpoints needing them answer with HTTP 500.

pub mod config;
mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use viralcast_artifacts::{Artifacts, AssetPaths};

pub use config::{ConfigError, ServerConfig};

/// Shared application state.
pub struct AppState {
    /// Model, scaler, and weekly dataset loaded at startup.
    pub artifacts: Artifacts,
    /// Variant label reported by `/api/current-stats`.
    pub variant: String,
}

/// Registers the `/api` routes.
///
/// Shared by [`run_server`] and integration tests so both serve the same
/// surface.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/current-stats", web::get().to(handlers::current_stats))
            .route("/historical", web::get().to(handlers::historical))
            .route("/predict", web::get().to(handlers::predict))
            .route("/predict-custom", web::post().to(handlers::predict_custom)),
    );
}

/// Starts the ViralCast API server.
///
/// Resolves the asset directory, loads the artifacts, and starts the
/// Actix-Web HTTP server. Artifact failures are logged and never stop
/// startup. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let paths = AssetPaths::resolve(&config.assets_dir);
    let artifacts = Artifacts::load(&paths);

    if !artifacts.is_ready() {
        log::warn!("Running in degraded mode; forecast endpoints will return errors");
    }

    let state = web::Data::new(AppState {
        artifacts,
        variant: config.variant,
    });

    let bind_addr = config.bind_addr;
    let port = config.port;

    log::info!("Starting server on {bind_addr}:{port}");
    log::info!("Endpoints:");
    log::info!("  GET  /api/health");
    log::info!("  GET  /api/current-stats");
    log::info!("  GET  /api/historical");
    log::info!("  GET  /api/predict");
    log::info!("  POST /api/predict-custom");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
