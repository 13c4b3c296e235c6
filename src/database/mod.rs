pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use std::sync::Arc;
use tracing::{info, warn};

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryAccountStore, MemoryTradeStore};
pub use postgres::{PgAccountStore, PgTradeStore};
pub use store::{AccountStore, TradeStore};

use crate::config::AppConfig;

/// The two stores the application runs against.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub trades: Arc<dyn TradeStore>,
    pub manager: Option<DatabaseManager>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(MemoryAccountStore::new()),
            trades: Arc::new(MemoryTradeStore::new()),
            manager: None,
        }
    }
}

/// Postgres when `DATABASE_URL` is set; in development without one, fall
/// back to in-memory stores.
pub async fn connect_stores(config: &AppConfig) -> Result<Stores, DatabaseError> {
    if config.database.url.is_none() && config.is_development() {
        warn!("DATABASE_URL not set, using in-memory stores; data will not persist");
        return Ok(Stores::in_memory());
    }

    let manager = DatabaseManager::new(&config.database)?;
    info!("Using database {}", manager.redacted_url());
    manager.ensure_schema().await?;

    Ok(Stores {
        accounts: Arc::new(PgAccountStore::new(manager.clone())),
        trades: Arc::new(PgTradeStore::new(manager.clone())),
        manager: Some(manager),
    })
}
