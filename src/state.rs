use std::sync::Arc;

use crate::auth::{IdentitySource, SessionTokens};
use crate::config::AppConfig;
use crate::database::{AccountStore, Stores, TradeStore};
use crate::middleware::policy::AccessPolicy;
use crate::services::{AccountService, ApprovalService, TradeService};

/// Shared application state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionTokens>,
    pub identities: Arc<dyn IdentitySource>,
    pub policy: Arc<AccessPolicy>,
    pub accounts: AccountService,
    pub approvals: ApprovalService,
    pub trades: TradeService,
    account_store: Arc<dyn AccountStore>,
    trade_store: Arc<dyn TradeStore>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, stores: Stores) -> Self {
        let sessions = Arc::new(SessionTokens::new(&config.security));
        let policy = Arc::new(AccessPolicy::new(&config.security.public_routes));

        Self {
            accounts: AccountService::new(stores.accounts.clone(), config.clone()),
            approvals: ApprovalService::new(stores.accounts.clone()),
            trades: TradeService::new(stores.trades.clone(), config.clone()),
            identities: sessions.clone(),
            sessions,
            policy,
            config,
            account_store: stores.accounts,
            trade_store: stores.trades,
        }
    }

    /// Replace how requests are mapped to identities.
    pub fn with_identity_source(mut self, identities: Arc<dyn IdentitySource>) -> Self {
        self.identities = identities;
        self
    }

    /// Ping both stores.
    pub async fn check_stores(&self) -> Result<(), crate::database::DatabaseError> {
        self.account_store.ping().await?;
        self.trade_store.ping().await
    }
}
