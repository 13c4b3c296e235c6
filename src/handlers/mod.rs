// handlers/mod.rs - Three handler tiers
//
// Public (no session) → Protected (any approved account) → Elevated (admin+)
//
// Every API handler re-derives the caller from its own request through the
// `Session` extractor and checks the role itself; the page gate never covers
// /api.
pub mod elevated;
pub mod protected;
pub mod public;

use axum::extract::State;
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub database: &'static str,
}

/// GET /health - Store connectivity
pub async fn health(State(state): State<AppState>) -> ApiResult<Health> {
    match state.check_stores().await {
        Ok(()) => Ok(ApiResponse::success(Health {
            status: "ok",
            database: "connected",
        })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Database temporarily unavailable"))
        }
    }
}
