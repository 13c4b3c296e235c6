pub mod csv;
pub mod headers;
pub mod pipeline;

use thiserror::Error;

use crate::database::DatabaseError;

pub use pipeline::{canonicalize_document, canonicalize_row, ingest, ingest_csv, ingest_document};

/// One parsed source row: raw header paired with its cell, in column order.
pub type RawRow = Vec<(String, String)>;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("No file provided")]
    NoFile,

    #[error("CSV parsing error")]
    ParseFailure { details: Vec<String> },

    #[error("Invalid record: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}
