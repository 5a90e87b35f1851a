use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use shared::{Result, ServiceError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }

    let origin: HeaderValue = origin
        .parse()
        .map_err(|e| ServiceError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?;
    Ok(layer.allow_origin(origin))
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/click", post(handlers::record_click))
        .route("/api/clicks", get(handlers::list_sessions))
        .route(
            "/api/clicks/total",
            get(handlers::total_clicks).put(handlers::set_total_session_clicks),
        )
        .route(
            "/api/clicks/{session_id}",
            get(handlers::session_clicks).put(handlers::set_session_clicks),
        )
        .route(
            "/api/leaderboard",
            get(handlers::top_players).post(handlers::submit_score),
        )
        .route(
            "/api/leaderboard/refresh",
            post(handlers::refresh_rankings).delete(handlers::remove_refresh_player),
        )
        .route("/api/leaderboard/{username}", delete(handlers::remove_player))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
