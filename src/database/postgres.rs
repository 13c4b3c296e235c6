use async_trait::async_trait;
use sqlx::{types::Json, Postgres};
use tracing::debug;
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{Account, GradeImporter, ImporterSummary, TradeFields, TradeRecord};
use super::store::{AccountStore, TradeStore};
use crate::auth::Role;
use crate::filter::filter_order::quote_literal;
use crate::filter::{Page, TradeFilter};

const UNIQUE_VIOLATION: &str = "23505";

/// Strings Postgres can cast to double precision without overflow.
const NUMERIC_PATTERN: &str = r"^\s*[-+]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][-+]?[0-9]{1,2})?\s*$";

fn map_unique(err: sqlx::Error, what: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            DatabaseError::Duplicate(what.to_string())
        }
        _ => DatabaseError::Sqlx(err),
    }
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: DatabaseManager,
}

impl PgAccountStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: Account) -> Result<Account, DatabaseError> {
        let pool = self.db.pool().await?;
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (id, email, name, password_hash, role, approved, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.name)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.approved)
        .bind(account.created_at)
        .fetch_one(&pool)
        .await
        .map_err(|e| map_unique(e, &account.email))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DatabaseError> {
        let pool = self.db.pool().await?;
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&pool)
            .await?;
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        let pool = self.db.pool().await?;
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE lower(email) = lower($1)")
            .bind(email.trim())
            .fetch_optional(&pool)
            .await?;
        Ok(account)
    }

    async fn list(&self) -> Result<Vec<Account>, DatabaseError> {
        let pool = self.db.pool().await?;
        let accounts = sqlx::query_as::<_, Account>("SELECT * FROM accounts ORDER BY created_at DESC, id")
            .fetch_all(&pool)
            .await?;
        Ok(accounts)
    }

    async fn set_approved(&self, id: Uuid, approved: bool) -> Result<bool, DatabaseError> {
        let pool = self.db.pool().await?;
        let result = sqlx::query("UPDATE accounts SET approved = $2 WHERE id = $1")
            .bind(id)
            .bind(approved)
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<bool, DatabaseError> {
        let pool = self.db.pool().await?;
        let result = sqlx::query("UPDATE accounts SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let pool = self.db.pool().await?;
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.db.health_check().await
    }
}

#[derive(Clone)]
pub struct PgTradeStore {
    db: DatabaseManager,
}

impl PgTradeStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TradeStore for PgTradeStore {
    async fn insert_one(&self, fields: TradeFields) -> Result<TradeRecord, DatabaseError> {
        let pool = self.db.pool().await?;
        let record = sqlx::query_as::<_, TradeRecord>(
            "INSERT INTO trade_records (id, data) VALUES ($1, $2) RETURNING id, seq, data, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(Json(fields))
        .fetch_one(&pool)
        .await?;
        Ok(record)
    }

    async fn insert_many(&self, batch: Vec<TradeFields>) -> Result<u64, DatabaseError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let pool = self.db.pool().await?;
        let ids: Vec<Uuid> = batch.iter().map(|_| Uuid::new_v4()).collect();
        let docs: Vec<Json<TradeFields>> = batch.into_iter().map(Json).collect();

        // One statement, so the rows share a transaction and keep their order
        let result = sqlx::query(
            "INSERT INTO trade_records (id, data)
             SELECT id, data FROM UNNEST($1::uuid[], $2::jsonb[]) WITH ORDINALITY AS t(id, data, n)
             ORDER BY n",
        )
        .bind(ids)
        .bind(docs)
        .execute(&pool)
        .await?;

        debug!("Inserted {} trade records", result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn find_page(&self, filter: &TradeFilter) -> Result<Page<TradeRecord>, DatabaseError> {
        let pool = self.db.pool().await?;
        let select = filter.to_sql();
        let count = filter.to_count_sql();
        debug!("Trade listing: {}", select.query);

        let mut items = sqlx::query_as::<Postgres, TradeRecord>(&select.query);
        for param in &select.params {
            items = items.bind(param);
        }
        let mut total = sqlx::query_scalar::<Postgres, i64>(&count.query);
        for param in &count.params {
            total = total.bind(param);
        }

        let (items, total) = futures::try_join!(items.fetch_all(&pool), total.fetch_one(&pool))?;
        Ok(Page {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn find_by_field(&self, field: &'static str, value: &str) -> Result<Vec<TradeRecord>, DatabaseError> {
        let pool = self.db.pool().await?;
        let query = format!(
            "SELECT id, seq, data, created_at FROM trade_records
             WHERE data->>{} = $1
             ORDER BY data->>'Year' COLLATE \"C\" DESC NULLS LAST,
                      data->>'Month' COLLATE \"C\" DESC NULLS LAST,
                      seq ASC",
            quote_literal(field)
        );
        let records = sqlx::query_as::<_, TradeRecord>(&query)
            .bind(value)
            .fetch_all(&pool)
            .await?;
        Ok(records)
    }

    async fn distinct(&self, field: &'static str) -> Result<Vec<String>, DatabaseError> {
        let pool = self.db.pool().await?;
        let column = format!("data->>{}", quote_literal(field));
        let query = format!(
            "SELECT {col} FROM trade_records
             WHERE {col} IS NOT NULL AND btrim({col}) <> ''
             GROUP BY 1 ORDER BY {col} COLLATE \"C\"",
            col = column
        );
        let values = sqlx::query_scalar::<_, String>(&query).fetch_all(&pool).await?;
        Ok(values)
    }

    async fn importer_summaries(&self) -> Result<Vec<ImporterSummary>, DatabaseError> {
        let pool = self.db.pool().await?;
        let rows = sqlx::query_as::<_, (String, Option<String>, i64)>(
            "SELECT data->>'Actual Importer Name' AS name,
                    (array_agg(data->>'Importer Address' ORDER BY seq))[1] AS address,
                    COUNT(*) AS count
             FROM trade_records
             WHERE data->>'Actual Importer Name' IS NOT NULL AND data->>'Actual Importer Name' <> ''
             GROUP BY 1
             ORDER BY data->>'Actual Importer Name' COLLATE \"C\"",
        )
        .fetch_all(&pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(importer_name, importer_address, count)| ImporterSummary {
                importer_name,
                importer_address,
                count,
            })
            .collect())
    }

    async fn grade_importers(&self, grade: &str) -> Result<Vec<GradeImporter>, DatabaseError> {
        let pool = self.db.pool().await?;
        let rows = sqlx::query_as::<_, (String, f64, i64)>(
            "SELECT data->>'Actual Importer Name' AS name,
                    COALESCE(SUM(CASE WHEN data->>'DCL Val' ~ $2
                                      THEN (data->>'DCL Val')::double precision
                                      ELSE 0 END), 0)::double precision AS total,
                    COUNT(*) AS count
             FROM trade_records
             WHERE data->>'Grade' = $1
               AND data->>'Actual Importer Name' IS NOT NULL AND data->>'Actual Importer Name' <> ''
             GROUP BY 1
             ORDER BY total DESC, data->>'Actual Importer Name' COLLATE \"C\"",
        )
        .bind(grade)
        .bind(NUMERIC_PATTERN)
        .fetch_all(&pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(importer_name, total_dcl_val, count)| GradeImporter {
                importer_name,
                total_dcl_val,
                count,
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.db.health_check().await
    }
}
