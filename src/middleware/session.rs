use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::auth::Identity;
use crate::state::AppState;

/// The caller's identity, if the request carries a valid session.
///
/// Always derived from the request itself, never from what the page gate
/// stored, so API handlers make their own authorization decision.
#[derive(Debug, Clone)]
pub struct Session(pub Option<Identity>);

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Session(state.identities.resolve(&parts.headers)))
    }
}
