//! NOVOYAZ Server Library
//!
//! Exposes the service modules and the router constructor so integration
//! tests can drive the exact app the binary serves.
//!
//! # Modules
//!
//! - `ocr`: engine lifecycle, raw-result normalization, domain types
//! - `raster`: upload bytes to upright RGB raster
//! - `routes`: HTTP endpoints

pub mod config;
pub mod ocr;
pub mod raster;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ping", get(routes::health::ping))
        .route("/healthz", get(routes::health::ping))
        .nest("/ocr", routes::ocr::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
