use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, types::Json, FromRow, Row};
use uuid::Uuid;

/// Sparse field map of a trade record. Absent keys mean "no data".
pub type TradeFields = Map<String, Value>;

/// Keys the record envelope owns; source data may not set them.
pub const RESERVED_KEYS: &[&str] = &["_id", "createdAt"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Insertion order, used for the default sort.
    #[serde(skip)]
    pub seq: i64,
    #[serde(flatten)]
    pub fields: TradeFields,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl TradeRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Keep only the listed fields (plus the id and timestamp).
    pub fn project(mut self, keep: &[&str]) -> Self {
        self.fields.retain(|k, _| keep.contains(&k.as_str()));
        self
    }
}

impl<'r> FromRow<'r, PgRow> for TradeRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let Json(fields): Json<TradeFields> = row.try_get("data")?;
        Ok(Self {
            id: row.try_get("id")?,
            seq: row.try_get("seq")?,
            fields,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// One importer in the importer directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImporterSummary {
    pub importer_name: String,
    pub importer_address: Option<String>,
    pub count: i64,
}

/// Importer totals within a single grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeImporter {
    pub importer_name: String,
    #[serde(rename = "totalDCLVal")]
    pub total_dcl_val: f64,
    pub count: i64,
}

/// DCL Val as a number; anything unparseable counts as zero.
pub fn numeric_value(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
