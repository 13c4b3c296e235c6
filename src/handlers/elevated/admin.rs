// handlers/elevated/admin.rs - /api/admin/*

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Role;
use crate::middleware::{ApiResponse, ApiResult, Session};
use crate::services::approval::ReviewAction;
use crate::services::authorize;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewRequest {
    pub user_id: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoleRequest {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

/// GET /api/admin/users - All accounts, newest first
pub async fn users(State(state): State<AppState>, session: Session) -> ApiResult<Value> {
    let users = state.approvals.list_accounts(session.identity()).await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// POST /api/admin/approve - `{userId, action: "approve" | "reject"}`
pub async fn approve(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Value> {
    // Role is checked before the body so outsiders never learn about it
    authorize(session.identity(), Role::Admin)?;
    let Json(body) = payload?;
    let action = state
        .approvals
        .review(session.identity(), body.user_id.as_deref(), body.action.as_deref())
        .await?;

    let message = match action {
        ReviewAction::Approve => "User approved successfully",
        ReviewAction::Reject => "User rejected and removed",
    };
    Ok(ApiResponse::success(json!({ "message": message })))
}

/// POST /api/admin/update-role - `{userId, role: "user" | "admin"}`, super-admin only
pub async fn update_role(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<Value> {
    authorize(session.identity(), Role::SuperAdmin)?;
    let Json(body) = payload?;
    let role = state
        .approvals
        .update_role(session.identity(), body.user_id.as_deref(), body.role.as_deref())
        .await?;
    Ok(ApiResponse::success(json!({ "message": "User role updated successfully", "role": role })))
}
