// handlers/protected/upload.rs - POST /api/upload-csv

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use serde_json::{json, Value};

use crate::auth::Role;
use crate::error::ApiError;
use crate::ingest::IngestionError;
use crate::middleware::{ApiResponse, ApiResult, Session};
use crate::services::authorize;
use crate::state::AppState;

/// Multipart field carrying the file.
const FILE_FIELD: &str = "csv";

/// POST /api/upload-csv - Bulk import a CSV file
///
/// The whole file is parsed before anything is written; a malformed file
/// inserts nothing.
pub async fn upload(
    State(state): State<AppState>,
    session: Session,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Value> {
    // Check the caller before reading a potentially large body
    authorize(session.identity(), Role::User)?;

    let mut multipart = multipart?;
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            file = Some(field.bytes().await?);
            break;
        }
    }
    let bytes = file.ok_or(ApiError::from(IngestionError::NoFile))?;

    let inserted = state.trades.upload(session.identity(), &bytes).await?;
    Ok(ApiResponse::created(json!({
        "message": "CSV data uploaded successfully",
        "insertedCount": inserted,
    })))
}
