use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    // The quotes frontend is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Recommendations
        .route("/recommend", post(handlers::recommend))
        .route(
            "/recommendation_request/:user_id",
            get(handlers::get_recommendation_request),
        )
        .route(
            "/users/:user_id/recommendations",
            get(handlers::user_recommendations),
        )
        // Rule set snapshot
        .route("/rules", get(handlers::get_rules))
        .route("/rules/rebuild", post(handlers::rebuild_rules))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
