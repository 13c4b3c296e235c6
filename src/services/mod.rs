pub mod accounts;
pub mod approval;
pub mod trades;

use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::auth::{Identity, Role, SessionError};
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::ingest::IngestionError;

pub use accounts::AccountService;
pub use approval::ApprovalService;
pub use trades::TradeService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Ingestion(IngestionError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<IngestionError> for ServiceError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Store(db) => ServiceError::Database(db),
            IngestionError::InvalidDocument(msg) => ServiceError::Validation(msg),
            other => ServiceError::Ingestion(other),
        }
    }
}

/// Require an identity holding at least `min`.
///
/// No identity is `Unauthorized`; a lower role is `Forbidden`.
pub fn authorize(actor: Option<&Identity>, min: Role) -> Result<&Identity, ServiceError> {
    let identity = actor.ok_or(ServiceError::Unauthorized)?;
    if !identity.role.has_at_least(min) {
        return Err(ServiceError::Forbidden(format!("Requires {} role", min)));
    }
    Ok(identity)
}
