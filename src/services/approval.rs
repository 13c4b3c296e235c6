use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{authorize, ServiceError};
use crate::auth::{Identity, Role};
use crate::database::models::Account;
use crate::database::AccountStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Admin-side account management: the approval queue and role changes.
///
/// Writes are plain single-row updates, so two admins acting on the same
/// account at once resolve as last write wins.
#[derive(Clone)]
pub struct ApprovalService {
    store: Arc<dyn AccountStore>,
}

impl ApprovalService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn list_accounts(&self, actor: Option<&Identity>) -> Result<Vec<Account>, ServiceError> {
        authorize(actor, Role::Admin)?;
        Ok(self.store.list().await?)
    }

    /// Approve or reject a pending registration. Rejection deletes the
    /// account.
    pub async fn review(
        &self,
        actor: Option<&Identity>,
        user_id: Option<&str>,
        action: Option<&str>,
    ) -> Result<ReviewAction, ServiceError> {
        let actor = authorize(actor, Role::Admin)?;

        let (Some(user_id), Some(action)) = (non_empty(user_id), non_empty(action)) else {
            return Err(ServiceError::Validation("User ID and action are required".to_string()));
        };
        let action = ReviewAction::parse(action)
            .ok_or_else(|| ServiceError::Validation("Invalid action".to_string()))?;
        let target = self.load(user_id).await?;

        if target.role != Role::User {
            return Err(ServiceError::Validation("Only user accounts can be approved or rejected".to_string()));
        }

        let applied = match action {
            ReviewAction::Approve => self.store.set_approved(target.id, true).await?,
            ReviewAction::Reject => self.store.delete(target.id).await?,
        };
        if !applied {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        info!(actor = %actor.account_id, target = %target.id, ?action, "Reviewed account");
        Ok(action)
    }

    /// Change an account's role. Super-admin only, and only between `user`
    /// and `admin`.
    pub async fn update_role(
        &self,
        actor: Option<&Identity>,
        user_id: Option<&str>,
        role: Option<&str>,
    ) -> Result<Role, ServiceError> {
        let actor = authorize(actor, Role::SuperAdmin)?;

        let role = non_empty(role)
            .and_then(|r| r.parse::<Role>().ok())
            .filter(|r| r.is_assignable());
        let (Some(user_id), Some(role)) = (non_empty(user_id), role) else {
            return Err(ServiceError::Validation("Invalid user ID or role".to_string()));
        };
        let target = self.load(user_id).await?;

        if target.role == Role::SuperAdmin {
            return Err(ServiceError::Validation("The super-admin role cannot be changed".to_string()));
        }
        if role == Role::Admin && !target.approved {
            return Err(ServiceError::Validation("User must be approved before promotion".to_string()));
        }

        if !self.store.set_role(target.id, role).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        info!(actor = %actor.account_id, target = %target.id, %role, "Changed account role");
        Ok(role)
    }

    async fn load(&self, user_id: &str) -> Result<Account, ServiceError> {
        let id = Uuid::parse_str(user_id.trim())
            .map_err(|_| ServiceError::Validation("Invalid user ID".to_string()))?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryAccountStore;
    use crate::services::test_support::{config, identity};
    use crate::services::AccountService;

    struct Fixture {
        approvals: ApprovalService,
        accounts: AccountService,
        store: Arc<MemoryAccountStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryAccountStore::new());
        Fixture {
            approvals: ApprovalService::new(store.clone()),
            accounts: AccountService::new(store.clone(), config()),
            store,
        }
    }

    #[tokio::test]
    async fn admin_approves_pending_user() {
        let f = fixture();
        let pending = f.accounts.register("p@example.com", "pw", "P").await.unwrap();
        let admin = identity(Role::Admin);

        let id = pending.id.to_string();
        let action = f.approvals.review(Some(&admin), Some(&id), Some("approve")).await.unwrap();
        assert_eq!(action, ReviewAction::Approve);

        let stored = f.store.find_by_id(pending.id).await.unwrap().unwrap();
        assert!(stored.approved);
        assert_eq!(stored.role, Role::User);
        assert!(f.accounts.authenticate("p@example.com", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn reject_deletes_the_account() {
        let f = fixture();
        let pending = f.accounts.register("p@example.com", "pw", "P").await.unwrap();
        let id = pending.id.to_string();
        f.approvals
            .review(Some(&identity(Role::SuperAdmin)), Some(&id), Some("reject"))
            .await
            .unwrap();
        assert!(f.store.find_by_id(pending.id).await.unwrap().is_none());

        let err = f
            .approvals
            .review(Some(&identity(Role::Admin)), Some(&id), Some("approve"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn review_checks_role_and_input() {
        let f = fixture();
        let pending = f.accounts.register("p@example.com", "pw", "P").await.unwrap();
        let id = pending.id.to_string();

        assert!(matches!(
            f.approvals.review(None, Some(&id), Some("approve")).await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            f.approvals.review(Some(&identity(Role::User)), Some(&id), Some("approve")).await,
            Err(ServiceError::Forbidden(_))
        ));
        let admin = identity(Role::Admin);
        assert!(matches!(
            f.approvals.review(Some(&admin), Some(&id), None).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            f.approvals.review(Some(&admin), Some(&id), Some("promote")).await,
            Err(ServiceError::Validation(_))
        ));
        let missing = Uuid::new_v4().to_string();
        assert!(matches!(
            f.approvals.review(Some(&admin), Some(&missing), Some("approve")).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn review_only_applies_to_plain_users() {
        let f = fixture();
        let root = f.accounts.register("root@example.com", "pw", "Root").await.unwrap();
        let id = root.id.to_string();
        assert!(matches!(
            f.approvals.review(Some(&identity(Role::Admin)), Some(&id), Some("reject")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(f.store.find_by_id(root.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn only_super_admin_changes_roles() {
        let f = fixture();
        let user = f.accounts.register("u@example.com", "pw", "U").await.unwrap();
        let id = user.id.to_string();

        // Checked before the role value
        assert!(matches!(
            f.approvals.update_role(Some(&identity(Role::Admin)), Some(&id), Some("bogus")).await,
            Err(ServiceError::Forbidden(_))
        ));

        let root = identity(Role::SuperAdmin);
        assert!(matches!(
            f.approvals.update_role(Some(&root), Some(&id), Some("super-admin")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            f.approvals.update_role(Some(&root), Some(&id), Some("admin")).await,
            Err(ServiceError::Validation(_))
        ));

        f.store.set_approved(user.id, true).await.unwrap();
        assert_eq!(
            f.approvals.update_role(Some(&root), Some(&id), Some("admin")).await.unwrap(),
            Role::Admin
        );
        let stored = f.store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Admin);
        assert!(stored.approved);

        f.approvals.update_role(Some(&root), Some(&id), Some("user")).await.unwrap();
        assert_eq!(f.store.find_by_id(user.id).await.unwrap().unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn super_admin_role_is_fixed() {
        let f = fixture();
        let root_account = f.accounts.register("root@example.com", "pw", "Root").await.unwrap();
        let id = root_account.id.to_string();
        assert!(matches!(
            f.approvals
                .update_role(Some(&identity(Role::SuperAdmin)), Some(&id), Some("user"))
                .await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn listing_requires_admin() {
        let f = fixture();
        f.accounts.register("a@example.com", "pw", "A").await.unwrap();
        assert!(f.approvals.list_accounts(Some(&identity(Role::User))).await.is_err());
        assert_eq!(f.approvals.list_accounts(Some(&identity(Role::Admin))).await.unwrap().len(), 1);
    }
}
