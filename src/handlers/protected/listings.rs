// handlers/protected/listings.rs - Distinct values and drill-downs
//
// GET /api/products
// GET /api/consignors, /api/consignors/:consignor/data
// GET /api/importers,  /api/importers/:importer/data
// GET /api/grades,     /api/grades/:grade/importers

use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, Session};
use crate::state::AppState;

pub async fn products(State(state): State<AppState>, session: Session) -> ApiResult<Vec<String>> {
    let products = state.trades.products(session.identity()).await?;
    Ok(ApiResponse::success(products))
}

pub async fn consignors(State(state): State<AppState>, session: Session) -> ApiResult<Value> {
    let consignors = state.trades.consignors(session.identity()).await?;
    Ok(ApiResponse::success(json!({ "consignors": consignors })))
}

pub async fn consignor_data(
    State(state): State<AppState>,
    session: Session,
    Path(consignor): Path<String>,
) -> ApiResult<Value> {
    let data = state.trades.consignor_data(session.identity(), &consignor).await?;
    Ok(ApiResponse::success(json!({ "data": data })))
}

pub async fn importers(State(state): State<AppState>, session: Session) -> ApiResult<Value> {
    let importers = state.trades.importers(session.identity()).await?;
    Ok(ApiResponse::success(json!({ "importers": importers })))
}

pub async fn importer_data(
    State(state): State<AppState>,
    session: Session,
    Path(importer): Path<String>,
) -> ApiResult<Value> {
    let data = state.trades.importer_data(session.identity(), &importer).await?;
    Ok(ApiResponse::success(json!({ "data": data })))
}

pub async fn grades(State(state): State<AppState>, session: Session) -> ApiResult<Value> {
    let grades = state.trades.grades(session.identity()).await?;
    Ok(ApiResponse::success(json!({ "grades": grades })))
}

/// Importers buying a grade, largest declared value first.
pub async fn grade_importers(
    State(state): State<AppState>,
    session: Session,
    Path(grade): Path<String>,
) -> ApiResult<Value> {
    let importers = state.trades.grade_importers(session.identity(), &grade).await?;
    Ok(ApiResponse::success(json!({ "importers": importers })))
}
