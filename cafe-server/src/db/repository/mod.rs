//! Repository Module
//!
//! Row types and queries for the POS tables. All queries are runtime-bound
//! (`sqlx::query` / `query_as`) so the crate builds without a prepared
//! database. Money columns travel as TEXT and are parsed into `Decimal` at
//! this boundary.

pub mod bill;
pub mod menu;
pub mod order;
pub mod payment;

use rust_decimal::Decimal;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // SQLite reports uniqueness violations as "UNIQUE constraint failed: ..."
            if db_err.message().contains("UNIQUE constraint failed") {
                return RepoError::Duplicate(db_err.message().to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Parse a stored money TEXT column into an exact decimal.
pub(crate) fn parse_money(raw: &str) -> RepoResult<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|e| RepoError::Database(format!("Corrupt money value '{raw}': {e}")))
}
