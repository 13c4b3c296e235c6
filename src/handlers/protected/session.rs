// handlers/protected/session.rs - GET /api/auth/session

use crate::auth::{Identity, Role};
use crate::middleware::{ApiResponse, ApiResult, Session};
use crate::services::authorize;

/// GET /api/auth/session - The identity behind the current session
pub async fn current(session: Session) -> ApiResult<Identity> {
    let identity = authorize(session.identity(), Role::User)?;
    Ok(ApiResponse::success(identity.clone()))
}
