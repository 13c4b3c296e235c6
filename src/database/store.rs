use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Account, GradeImporter, ImporterSummary, TradeFields, TradeRecord};
use crate::auth::Role;
use crate::filter::{Page, TradeFilter};

/// Persistence of accounts. Email comparisons are case-insensitive.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with [`DatabaseError::Duplicate`] when the email is taken.
    async fn insert(&self, account: Account) -> Result<Account, DatabaseError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DatabaseError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<Account>, DatabaseError>;
    /// Returns false when no account has that id.
    async fn set_approved(&self, id: Uuid, approved: bool) -> Result<bool, DatabaseError>;
    async fn set_role(&self, id: Uuid, role: Role) -> Result<bool, DatabaseError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Persistence of trade records. Records are append-only.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn insert_one(&self, fields: TradeFields) -> Result<TradeRecord, DatabaseError>;
    /// Returns the number of records written.
    async fn insert_many(&self, batch: Vec<TradeFields>) -> Result<u64, DatabaseError>;
    async fn find_page(&self, filter: &TradeFilter) -> Result<Page<TradeRecord>, DatabaseError>;
    /// Exact match on `field`, newest Year then Month first.
    async fn find_by_field(&self, field: &'static str, value: &str) -> Result<Vec<TradeRecord>, DatabaseError>;
    /// Distinct non-blank values of `field`, sorted.
    async fn distinct(&self, field: &'static str) -> Result<Vec<String>, DatabaseError>;
    async fn importer_summaries(&self) -> Result<Vec<ImporterSummary>, DatabaseError>;
    async fn grade_importers(&self, grade: &str) -> Result<Vec<GradeImporter>, DatabaseError>;
    async fn ping(&self) -> Result<(), DatabaseError>;
}
