use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::trade::numeric_value;
use super::models::{Account, GradeImporter, ImporterSummary, TradeFields, TradeRecord};
use super::store::{AccountStore, TradeStore};
use crate::auth::Role;
use crate::filter::{Page, TradeFilter};

/// Process-local account store for tests and database-less development.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: Account) -> Result<Account, DatabaseError> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| same_email(&a.email, &account.email)) {
            return Err(DatabaseError::Duplicate(account.email));
        }
        accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DatabaseError> {
        Ok(self.accounts.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| same_email(&a.email, email)).cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, DatabaseError> {
        // Reversed insertion order is newest first even when timestamps tie
        let mut accounts: Vec<Account> = self.accounts.read().await.iter().rev().cloned().collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn set_approved(&self, id: Uuid, approved: bool) -> Result<bool, DatabaseError> {
        let mut accounts = self.accounts.write().await;
        Ok(match accounts.iter_mut().find(|a| a.id == id) {
            Some(account) => {
                account.approved = approved;
                true
            }
            None => false,
        })
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<bool, DatabaseError> {
        let mut accounts = self.accounts.write().await;
        Ok(match accounts.iter_mut().find(|a| a.id == id) {
            Some(account) => {
                account.role = role;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok(accounts.len() < before)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Default)]
struct TradeTable {
    next_seq: i64,
    records: Vec<TradeRecord>,
}

impl TradeTable {
    fn push(&mut self, fields: TradeFields) -> TradeRecord {
        self.next_seq += 1;
        let record = TradeRecord {
            id: Uuid::new_v4(),
            seq: self.next_seq,
            fields,
            created_at: Utc::now(),
        };
        self.records.push(record.clone());
        record
    }
}

/// Process-local trade store mirroring the Postgres query semantics.
#[derive(Default)]
pub struct MemoryTradeStore {
    table: RwLock<TradeTable>,
}

impl MemoryTradeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl TradeStore for MemoryTradeStore {
    async fn insert_one(&self, fields: TradeFields) -> Result<TradeRecord, DatabaseError> {
        Ok(self.table.write().await.push(fields))
    }

    async fn insert_many(&self, batch: Vec<TradeFields>) -> Result<u64, DatabaseError> {
        let mut table = self.table.write().await;
        let count = batch.len() as u64;
        for fields in batch {
            table.push(fields);
        }
        Ok(count)
    }

    async fn find_page(&self, filter: &TradeFilter) -> Result<Page<TradeRecord>, DatabaseError> {
        let table = self.table.read().await;
        let mut matched: Vec<&TradeRecord> = table.records.iter().filter(|r| filter.matches(r)).collect();
        matched.sort_by(|a, b| filter.compare(a, b));

        let total = matched.len() as u64;
        let offset = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(filter.limit as usize)
            .cloned()
            .collect();
        Ok(Page { items, total })
    }

    async fn find_by_field(&self, field: &'static str, value: &str) -> Result<Vec<TradeRecord>, DatabaseError> {
        let table = self.table.read().await;
        let mut records: Vec<TradeRecord> = table
            .records
            .iter()
            .filter(|r| r.field(field) == Some(value))
            .cloned()
            .collect();
        // Descending with missing values last, insertion order on ties
        records.sort_by(|a, b| {
            let desc = |x: Option<&str>, y: Option<&str>| match (x, y) {
                (Some(x), Some(y)) => y.cmp(x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            desc(a.field("Year"), b.field("Year"))
                .then_with(|| desc(a.field("Month"), b.field("Month")))
                .then(a.seq.cmp(&b.seq))
        });
        Ok(records)
    }

    async fn distinct(&self, field: &'static str) -> Result<Vec<String>, DatabaseError> {
        let table = self.table.read().await;
        let mut values: Vec<String> = table
            .records
            .iter()
            .filter_map(|r| non_blank(r.field(field)))
            .map(str::to_string)
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }

    async fn importer_summaries(&self) -> Result<Vec<ImporterSummary>, DatabaseError> {
        let table = self.table.read().await;
        let mut groups: BTreeMap<&str, ImporterSummary> = BTreeMap::new();
        for record in &table.records {
            let Some(name) = record.field("Actual Importer Name").filter(|n| !n.is_empty()) else {
                continue;
            };
            let entry = groups.entry(name).or_insert_with(|| ImporterSummary {
                importer_name: name.to_string(),
                importer_address: record.field("Importer Address").map(str::to_string),
                count: 0,
            });
            entry.count += 1;
        }
        Ok(groups.into_values().collect())
    }

    async fn grade_importers(&self, grade: &str) -> Result<Vec<GradeImporter>, DatabaseError> {
        let table = self.table.read().await;
        let mut groups: BTreeMap<&str, GradeImporter> = BTreeMap::new();
        for record in table.records.iter().filter(|r| r.field("Grade") == Some(grade)) {
            let Some(name) = record.field("Actual Importer Name").filter(|n| !n.is_empty()) else {
                continue;
            };
            let entry = groups.entry(name).or_insert_with(|| GradeImporter {
                importer_name: name.to_string(),
                total_dcl_val: 0.0,
                count: 0,
            });
            entry.total_dcl_val += numeric_value(record.field("DCL Val"));
            entry.count += 1;
        }
        let mut importers: Vec<GradeImporter> = groups.into_values().collect();
        // Stable sort keeps the by-name order among equal totals
        importers.sort_by(|a, b| b.total_dcl_val.total_cmp(&a.total_dcl_val));
        Ok(importers)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fields(value: Value) -> TradeFields {
        value.as_object().cloned().unwrap()
    }

    fn account(email: &str) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Trader".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            approved: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn account_emails_are_unique_ignoring_case() {
        let store = MemoryAccountStore::new();
        store.insert(account("a@example.com")).await.unwrap();
        let err = store.insert(account("A@Example.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate(_)));
        assert!(store.find_by_email("A@EXAMPLE.COM").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn account_mutations_report_missing_ids() {
        let store = MemoryAccountStore::new();
        let a = store.insert(account("a@example.com")).await.unwrap();
        assert!(store.set_approved(a.id, true).await.unwrap());
        assert!(store.set_role(a.id, Role::Admin).await.unwrap());
        let stored = store.find_by_id(a.id).await.unwrap().unwrap();
        assert!(stored.approved);
        assert_eq!(stored.role, Role::Admin);

        assert!(store.delete(a.id).await.unwrap());
        assert!(!store.delete(a.id).await.unwrap());
        assert!(!store.set_approved(a.id, true).await.unwrap());
    }

    #[tokio::test]
    async fn accounts_list_newest_first() {
        let store = MemoryAccountStore::new();
        let first = store.insert(account("first@example.com")).await.unwrap();
        let second = store.insert(account("second@example.com")).await.unwrap();
        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn drill_down_sorts_year_then_month_descending() {
        let store = MemoryTradeStore::new();
        store
            .insert_many(vec![
                fields(json!({ "Actual Consignor Name": "Acme", "Year": "2023", "Month": "05" })),
                fields(json!({ "Actual Consignor Name": "Acme", "Year": "2024", "Month": "01" })),
                fields(json!({ "Actual Consignor Name": "Other", "Year": "2025" })),
                fields(json!({ "Actual Consignor Name": "Acme", "Year": "2024", "Month": "03" })),
                fields(json!({ "Actual Consignor Name": "Acme" })),
            ])
            .await
            .unwrap();

        let records = store.find_by_field("Actual Consignor Name", "Acme").await.unwrap();
        let keys: Vec<(Option<&str>, Option<&str>)> =
            records.iter().map(|r| (r.field("Year"), r.field("Month"))).collect();
        assert_eq!(
            keys,
            vec![
                (Some("2024"), Some("03")),
                (Some("2024"), Some("01")),
                (Some("2023"), Some("05")),
                (None, None),
            ]
        );
    }

    #[tokio::test]
    async fn aggregates_skip_blank_importers() {
        let store = MemoryTradeStore::new();
        store
            .insert_many(vec![
                fields(json!({ "Grade": "W320", "Actual Importer Name": "Beta", "DCL Val": "10.5", "Importer Address": "Pier 1" })),
                fields(json!({ "Grade": "W320", "Actual Importer Name": "Alpha", "DCL Val": "n/a" })),
                fields(json!({ "Grade": "W320", "Actual Importer Name": "Beta", "DCL Val": "4.5", "Importer Address": "Pier 9" })),
                fields(json!({ "Grade": "W240", "Actual Importer Name": "Alpha", "DCL Val": "100" })),
                fields(json!({ "Grade": "W320", "DCL Val": "7" })),
            ])
            .await
            .unwrap();

        let importers = store.grade_importers("W320").await.unwrap();
        assert_eq!(importers.len(), 2);
        assert_eq!(importers[0].importer_name, "Beta");
        assert_eq!(importers[0].total_dcl_val, 15.0);
        assert_eq!(importers[0].count, 2);
        assert_eq!(importers[1].total_dcl_val, 0.0);

        let summaries = store.importer_summaries().await.unwrap();
        assert_eq!(summaries[0].importer_name, "Alpha");
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[1].importer_address.as_deref(), Some("Pier 1"));

        assert_eq!(store.distinct("Grade").await.unwrap(), vec!["W240", "W320"]);
    }
}
