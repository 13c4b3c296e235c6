use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. When absent in development the server
    /// falls back to in-memory stores.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub session_secret: String,
    pub session_expiry_hours: u64,
    pub bcrypt_cost: u32,
    /// The one email that registers straight into super-admin.
    pub super_admin_email: Option<String>,
    /// Extra page paths that never need a session.
    pub public_routes: Vec<String>,
    pub cors_origins: Vec<String>,
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = v.parse().unwrap_or(self.security.session_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SUPER_ADMIN_EMAIL") {
            let v = v.trim().to_lowercase();
            self.security.super_admin_email = if v.is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("SECURITY_PUBLIC_ROUTES") {
            self.security.public_routes = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                max_request_size_bytes: 20 * 1024 * 1024, // 20MB
                default_page_size: 10,
                max_page_size: 1000,
            },
            security: SecurityConfig {
                session_secret: "development-session-secret".to_string(),
                session_expiry_hours: 24 * 7,
                bcrypt_cost: 12,
                super_admin_email: None,
                public_routes: vec![],
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                secure_cookies: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                default_page_size: 10,
                max_page_size: 500,
            },
            security: SecurityConfig {
                session_secret: String::new(),
                session_expiry_hours: 24,
                bcrypt_cost: 12,
                super_admin_email: None,
                public_routes: vec![],
                cors_origins: vec!["https://staging.example.com".to_string()],
                secure_cookies: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                default_page_size: 10,
                max_page_size: 100,
            },
            security: SecurityConfig {
                session_secret: String::new(),
                session_expiry_hours: 24,
                bcrypt_cost: 12,
                super_admin_email: None,
                public_routes: vec![],
                cors_origins: vec!["https://app.example.com".to_string()],
                secure_cookies: true,
            },
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Whether `email` is the configured super-admin address.
    pub fn is_super_admin_email(&self, email: &str) -> bool {
        self.security
            .super_admin_email
            .as_deref()
            .map(|configured| configured.eq_ignore_ascii_case(email.trim()))
            .unwrap_or(false)
    }
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup by the binary
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.database.url.is_none());
        assert_eq!(config.api.default_page_size, 10);
        assert_eq!(config.security.bcrypt_cost, 12);
        assert!(!config.security.session_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.api.max_page_size, 100);
        assert!(config.security.secure_cookies);
        // production refuses to start without an explicit secret
        assert!(config.security.session_secret.is_empty());
    }

    #[test]
    fn super_admin_email_match_ignores_case_and_padding() {
        let mut config = AppConfig::development();
        assert!(!config.is_super_admin_email("boss@example.com"));

        config.security.super_admin_email = Some("boss@example.com".to_string());
        assert!(config.is_super_admin_email(" Boss@Example.com "));
        assert!(!config.is_super_admin_email("other@example.com"));
    }

    #[test]
    fn splits_comma_lists() {
        assert_eq!(split_list(" /about, ,/pricing "), vec!["/about", "/pricing"]);
    }
}
