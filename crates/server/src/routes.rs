//! API route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use ferry_core::AssembleError;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/routes", get(get_routes))
        .route("/api/routes/:route_id/snapshot", get(get_snapshot))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "ok"
}

async fn get_routes() -> impl IntoResponse {
    Json(ferry_core::list_routes())
}

async fn get_snapshot(
    State(state): State<AppState>,
    Path(route_id): Path<u32>,
) -> impl IntoResponse {
    match state.assembler.build_snapshot(route_id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(AssembleError::UnknownRoute(id)) => {
            error!("snapshot requested for unknown route {}", id);
            (StatusCode::NOT_FOUND, format!("unknown route: {id}")).into_response()
        }
    }
}
