pub mod password;
pub mod role;

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub use role::{Role, RoleParseError};

/// Name of the cookie carrying the session token for page navigations.
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub account_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session secret not configured")]
    InvalidSecret,

    #[error("session token generation error: {0}")]
    TokenGeneration(String),

    #[error("invalid session token: {0}")]
    InvalidToken(String),
}

/// Resolves the identity behind a request, if any.
///
/// Injected into the router so tests can swap in a fixed identity.
pub trait IdentitySource: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Issues and verifies the stateless signed session token.
#[derive(Clone)]
pub struct SessionTokens {
    secret: String,
    expiry_hours: u64,
}

impl SessionTokens {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            secret: security.session_secret.clone(),
            expiry_hours: security.session_expiry_hours,
        }
    }

    pub fn expires_in_secs(&self) -> u64 {
        self.expiry_hours * 3600
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, SessionError> {
        if self.secret.is_empty() {
            return Err(SessionError::InvalidSecret);
        }

        let now = Utc::now();
        let claims = Claims {
            sub: identity.account_id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
            exp: (now + Duration::hours(self.expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| SessionError::TokenGeneration(e.to_string()))
    }

    /// Decodes a token. Claims carrying an unknown role fail here, so a
    /// session with an unrecognised role never becomes an [`Identity`].
    pub fn verify(&self, token: &str) -> Result<Identity, SessionError> {
        if self.secret.is_empty() {
            return Err(SessionError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(|e| SessionError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims.into())
    }
}

impl IdentitySource for SessionTokens {
    fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = extract_session_token(headers)?;
        match self.verify(&token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!("Ignoring session token: {}", e);
                None
            }
        }
    }
}

/// Bearer token from `Authorization`, falling back to the session cookie.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
