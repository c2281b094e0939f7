//! Route configuration module.

use std::path::Path;

use axum::{middleware, routing::get, Router};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::api::handlers::{
    api_not_found_handler, event_results_handler, health_handler, list_seasons_handler,
    readiness_handler, season_handler, standings_handler,
};
use crate::api::middlewares::{build_cors_layer, https_redirect};
use crate::api::state::AppState;
use crate::config::AppConfig;

/// Creates the JSON API routes, mounted under `/api` by [`create_app`].
///
/// # Routes
///
/// - `GET /health` - Liveness check
/// - `GET /ready` - Readiness check
/// - `GET /seasons` - Season list
/// - `GET /seasons/{year}` - Season with events and races
/// - `GET /seasons/{year}/events/{event}/results` - Event results
/// - `GET /seasons/{year}/standings` - League table
pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(readiness_handler))
        .route("/seasons", get(list_seasons_handler))
        .route("/seasons/{year}", get(season_handler))
        .route(
            "/seasons/{year}/events/{event}/results",
            get(event_results_handler),
        )
        .route("/seasons/{year}/standings", get(standings_handler))
        // Own fallback so unknown API paths never reach the SPA document
        .fallback(api_not_found_handler)
        .with_state(state)
}

/// Static bundle service that answers unmatched paths with `index.html`.
fn spa_service(client_build_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(client_build_dir).fallback(ServeFile::new(client_build_dir.join("index.html")))
}

/// Creates the complete application router.
///
/// The API is mounted under `/api` in every environment. In production the
/// client bundle serves everything else, and plain-HTTP `GET` requests are
/// redirected to HTTPS before any routing happens.
///
/// Layer order (outermost first): Trace -> CORS -> HTTPS redirect -> routes
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new().nest("/api", create_api_routes(state));

    if config.is_production {
        app = app
            .fallback_service(spa_service(&config.client_build_dir))
            .layer(middleware::from_fn(https_redirect));
    }

    app.layer(build_cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}
