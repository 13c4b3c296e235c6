use serde_json::Value;
use tracing::{debug, info};

use super::csv::parse_csv;
use super::headers;
use super::{IngestionError, RawRow};
use crate::database::models::trade::RESERVED_KEYS;
use crate::database::models::{TradeFields, TradeRecord};
use crate::database::TradeStore;

/// Map one raw row onto canonical field names.
///
/// Empty cells are dropped; whitespace is stored as given. When two columns
/// land on the same field the later non-empty one wins.
pub fn canonicalize_row(row: RawRow) -> TradeFields {
    let mut fields = TradeFields::new();
    for (raw, value) in row {
        if value.is_empty() {
            continue;
        }
        let field = headers::normalize(&raw);
        if RESERVED_KEYS.contains(&field.as_str()) {
            continue;
        }
        fields.insert(field, Value::String(value));
    }
    fields
}

/// Canonicalize a JSON object submitted for single-record creation.
///
/// Scalars are stored as text; nulls count as empty. Nested values are
/// rejected.
pub fn canonicalize_document(document: Value) -> Result<TradeFields, IngestionError> {
    let Value::Object(object) = document else {
        return Err(IngestionError::InvalidDocument("expected a JSON object".to_string()));
    };

    let mut row = RawRow::with_capacity(object.len());
    for (key, value) in object {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(IngestionError::InvalidDocument(format!("field '{}' must be a scalar", key)));
            }
        };
        row.push((key, text));
    }
    Ok(canonicalize_row(row))
}

/// Canonicalize every row and write them in one batch.
pub async fn ingest(store: &dyn TradeStore, rows: Vec<RawRow>) -> Result<u64, IngestionError> {
    if rows.is_empty() {
        debug!("Empty batch, nothing to insert");
        return Ok(0);
    }
    let batch: Vec<TradeFields> = rows.into_iter().map(canonicalize_row).collect();
    let inserted = store.insert_many(batch).await?;
    info!("Ingested {} trade records", inserted);
    Ok(inserted)
}

pub async fn ingest_csv(store: &dyn TradeStore, bytes: &[u8]) -> Result<u64, IngestionError> {
    let rows = parse_csv(bytes)?;
    ingest(store, rows).await
}

/// Canonicalize and store a single record.
pub async fn ingest_document(store: &dyn TradeStore, document: Value) -> Result<TradeRecord, IngestionError> {
    let fields = canonicalize_document(document)?;
    Ok(store.insert_one(fields).await?)
}
