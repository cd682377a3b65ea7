//! Typed errors for CSV ingestion. Everything else in the crate reports
//! through `anyhow` with context, the same way the database helpers do.

use std::path::PathBuf;

use thiserror::Error;

use crate::loader::EntityKind;

/// Why a single CSV row could not become an entity.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("malformed CSV record: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column `{0}`")]
    MissingColumn(&'static str),
    #[error("invalid quantity {0:?}: expected a non-negative whole number")]
    InvalidQuantity(String),
    #[error("invalid price {0:?}: expected dollars such as $2.99")]
    InvalidPrice(String),
    #[error("price {0:?} is negative")]
    NegativePrice(String),
    #[error("invalid date {0:?}: expected MM/DD/YYYY")]
    InvalidDate(String),
}

/// Failure of a whole `load` call. Nothing from the file is committed when
/// one of these is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} row on line {line} rejected: {source}")]
    Row {
        kind: EntityKind,
        line: u64,
        #[source]
        source: RowError,
    },
    #[error("failed to save {kind} rows")]
    Store {
        kind: EntityKind,
        #[source]
        source: anyhow::Error,
    },
}
