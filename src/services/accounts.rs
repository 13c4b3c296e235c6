use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::ServiceError;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::Role;
use crate::config::AppConfig;
use crate::database::models::Account;
use crate::database::{AccountStore, DatabaseError};

/// Registration and credential checks.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    config: Arc<AppConfig>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Create an account. The configured super-admin email is created
    /// approved with the super-admin role; everyone else waits for approval.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<Account, ServiceError> {
        let email = normalize_email(email);
        let name = name.trim();
        if email.is_empty() || password.is_empty() || name.is_empty() {
            return Err(ServiceError::Validation("All fields are required".to_string()));
        }
        if !is_plausible_email(&email) {
            return Err(ServiceError::Validation("Invalid email address".to_string()));
        }

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }

        let is_super_admin = self.config.is_super_admin_email(&email);
        let password_hash = hash_password(password.to_string(), self.config.security.bcrypt_cost).await?;

        let account = Account {
            id: Uuid::new_v4(),
            email,
            name: name.to_string(),
            password_hash,
            role: if is_super_admin { Role::SuperAdmin } else { Role::User },
            approved: is_super_admin,
            created_at: Utc::now(),
        };

        // A concurrent registration can still win the unique index
        let account = self.store.insert(account).await.map_err(|e| match e {
            DatabaseError::Duplicate(_) => ServiceError::Conflict("User already exists".to_string()),
            other => ServiceError::Database(other),
        })?;

        info!(account = %account.id, role = %account.role, approved = account.approved, "Registered account");
        Ok(account)
    }

    /// Check credentials. Unknown emails, wrong passwords and accounts still
    /// awaiting approval all fail the same way.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, ServiceError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation("Email and password are required".to_string()));
        }

        let Some(account) = self.store.find_by_email(&email).await? else {
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), account.password_hash.clone()).await? {
            return Err(ServiceError::InvalidCredentials);
        }

        if !account.approved {
            warn!(account = %account.id, "Login refused, account not approved");
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(account)
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryAccountStore;
    use crate::services::test_support::config;

    fn service() -> (AccountService, Arc<MemoryAccountStore>) {
        let store = Arc::new(MemoryAccountStore::new());
        (AccountService::new(store.clone(), config()), store)
    }

    #[tokio::test]
    async fn new_accounts_wait_for_approval() {
        let (service, _) = service();
        let account = service.register(" Trader@Example.com ", "pw", "Trader").await.unwrap();
        assert_eq!(account.email, "trader@example.com");
        assert_eq!(account.role, Role::User);
        assert!(!account.approved);
        assert_ne!(account.password_hash, "pw");

        let err = service.authenticate("trader@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn super_admin_email_is_approved_immediately() {
        let (service, _) = service();
        let account = service.register("ROOT@example.com", "pw", "Root").await.unwrap();
        assert_eq!(account.role, Role::SuperAdmin);
        assert!(account.approved);

        let authed = service.authenticate("root@EXAMPLE.com", "pw").await.unwrap();
        assert_eq!(authed.id, account.id);
        assert!(matches!(
            service.authenticate("root@example.com", "wrong").await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_and_incomplete_registrations_fail() {
        let (service, _) = service();
        service.register("a@example.com", "pw", "A").await.unwrap();
        assert!(matches!(
            service.register("A@EXAMPLE.COM", "pw2", "A2").await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(service.register("", "pw", "A").await, Err(ServiceError::Validation(_))));
        assert!(matches!(service.register("b@example.com", "pw", "  ").await, Err(ServiceError::Validation(_))));
        assert!(matches!(service.register("not-an-email", "pw", "B").await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_email_is_invalid_credentials() {
        let (service, _) = service();
        assert!(matches!(
            service.authenticate("ghost@example.com", "pw").await,
            Err(ServiceError::InvalidCredentials)
        ));
    }
}
