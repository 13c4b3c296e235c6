use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use super::policy::{Decision, DASHBOARD_PATH, LOGIN_PATH};
use crate::state::AppState;

/// Page-navigation gate. Classifies every non-API path and either lets it
/// through, with the caller's identity attached, or answers with a 307.
pub async fn session_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if state.policy.is_excluded(&path) {
        return next.run(request).await;
    }

    let identity = state.identities.resolve(request.headers());
    let decision = state.policy.classify(&path, identity.as_ref().map(|i| i.role));

    match decision {
        Decision::Allow => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        Decision::RedirectLogin => {
            debug!(path = %path, "No session, redirecting to login");
            Redirect::temporary(LOGIN_PATH).into_response()
        }
        Decision::RedirectDashboard => {
            debug!(path = %path, "Redirecting to dashboard");
            Redirect::temporary(DASHBOARD_PATH).into_response()
        }
    }
}
