//! API handlers for the Buch REST endpoints

pub mod buecher;
pub mod health;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Buecher
        .route(
            "/buecher",
            get(buecher::find_buecher).post(buecher::create_buch),
        )
        .route(
            "/buecher/:id",
            get(buecher::get_buch)
                .put(buecher::update_buch)
                .delete(buecher::delete_buch),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
