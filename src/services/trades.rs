use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{authorize, ServiceError};
use crate::auth::{Identity, Role};
use crate::config::AppConfig;
use crate::database::models::{GradeImporter, ImporterSummary, TradeRecord};
use crate::database::TradeStore;
use crate::filter::{Pagination, TradeFilter, TradeListParams};
use crate::ingest;

const CONSIGNOR_DATA_FIELDS: &[&str] = &[
    "Actual Importer Name",
    "Item Description",
    "Grade",
    "Qty (Kg)",
    "Price/Kg",
    "Cash Date",
    "Month",
    "Year",
];

const IMPORTER_DATA_FIELDS: &[&str] = &[
    "Item Description",
    "Grade",
    "Qty (Kg)",
    "Price/Kg",
    "DCL Val",
    "Assessed Value",
    "Cash Date",
    "Month",
    "Year",
    "Actual Consignor Name",
];

#[derive(Debug, Serialize)]
pub struct TradeListing {
    pub data: Vec<TradeRecord>,
    pub pagination: Pagination,
}

/// Reads and writes of trade records. Every operation needs a signed-in
/// account of any role.
#[derive(Clone)]
pub struct TradeService {
    store: Arc<dyn TradeStore>,
    config: Arc<AppConfig>,
}

impl TradeService {
    pub fn new(store: Arc<dyn TradeStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub async fn list(&self, actor: Option<&Identity>, params: &TradeListParams) -> Result<TradeListing, ServiceError> {
        authorize(actor, Role::User)?;
        let filter = TradeFilter::from_params(params, &self.config.api)?;
        let page = self.store.find_page(&filter).await?;
        Ok(TradeListing {
            data: page.items,
            pagination: Pagination::new(filter.page, filter.limit, page.total),
        })
    }

    pub async fn create(&self, actor: Option<&Identity>, document: Value) -> Result<TradeRecord, ServiceError> {
        let actor = authorize(actor, Role::User)?;
        let record = ingest::ingest_document(self.store.as_ref(), document).await?;
        info!(actor = %actor.account_id, record = %record.id, "Created trade record");
        Ok(record)
    }

    pub async fn upload(&self, actor: Option<&Identity>, bytes: &[u8]) -> Result<u64, ServiceError> {
        let actor = authorize(actor, Role::User)?;
        let inserted = ingest::ingest_csv(self.store.as_ref(), bytes).await?;
        info!(actor = %actor.account_id, inserted, "CSV upload complete");
        Ok(inserted)
    }

    pub async fn products(&self, actor: Option<&Identity>) -> Result<Vec<String>, ServiceError> {
        authorize(actor, Role::User)?;
        Ok(self.store.distinct("Product Name").await?)
    }

    pub async fn consignors(&self, actor: Option<&Identity>) -> Result<Vec<String>, ServiceError> {
        authorize(actor, Role::User)?;
        Ok(self.store.distinct("Actual Consignor Name").await?)
    }

    pub async fn consignor_data(&self, actor: Option<&Identity>, consignor: &str) -> Result<Vec<TradeRecord>, ServiceError> {
        authorize(actor, Role::User)?;
        let records = self.store.find_by_field("Actual Consignor Name", consignor).await?;
        Ok(records.into_iter().map(|r| r.project(CONSIGNOR_DATA_FIELDS)).collect())
    }

    pub async fn importers(&self, actor: Option<&Identity>) -> Result<Vec<ImporterSummary>, ServiceError> {
        authorize(actor, Role::User)?;
        Ok(self.store.importer_summaries().await?)
    }

    pub async fn importer_data(&self, actor: Option<&Identity>, importer: &str) -> Result<Vec<TradeRecord>, ServiceError> {
        authorize(actor, Role::User)?;
        let records = self.store.find_by_field("Actual Importer Name", importer).await?;
        Ok(records.into_iter().map(|r| r.project(IMPORTER_DATA_FIELDS)).collect())
    }

    pub async fn grades(&self, actor: Option<&Identity>) -> Result<Vec<String>, ServiceError> {
        authorize(actor, Role::User)?;
        Ok(self.store.distinct("Grade").await?)
    }

    pub async fn grade_importers(&self, actor: Option<&Identity>, grade: &str) -> Result<Vec<GradeImporter>, ServiceError> {
        authorize(actor, Role::User)?;
        Ok(self.store.grade_importers(grade).await?)
    }
}
