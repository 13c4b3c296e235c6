// handlers/protected/data.rs - GET/POST /api/data

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde_json::{json, Value};

use crate::auth::Role;
use crate::filter::TradeListParams;
use crate::middleware::{ApiResponse, ApiResult, Session};
use crate::services::authorize;
use crate::services::trades::TradeListing;
use crate::state::AppState;

/// GET /api/data - Paginated, searchable trade listing
///
/// Query: `page`, `limit`, `search`, `product`, `sortField`, `sortOrder`.
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    query: Result<Query<TradeListParams>, QueryRejection>,
) -> ApiResult<TradeListing> {
    let Query(params) = query?;
    let listing = state.trades.list(session.identity(), &params).await?;
    Ok(ApiResponse::success(listing))
}

/// POST /api/data - Create one trade record from a flat JSON object
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    authorize(session.identity(), Role::User)?;
    let Json(document) = payload?;
    let record = state.trades.create(session.identity(), document).await?;
    Ok(ApiResponse::created(json!({
        "message": "Data added successfully",
        "data": record,
    })))
}
