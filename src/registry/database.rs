//! Validation Log Registry Module
//!
//! This module implements a database registry for storing validation outcomes.
//! Every validation request can be recorded so operators can audit which
//! transactions were rejected and why.
//!
//! # Storage
//! Stores one row per validation:
//! - Transaction type and source account
//! - Validity flag and the JSON-encoded error list
//! - Timestamp of the validation

use crate::ValidationReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{
    Row,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use std::str::FromStr;
use tracing::debug;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS validations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tx_type TEXT NOT NULL,
    account TEXT,
    valid INTEGER NOT NULL,
    errors TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

/// A stored validation outcome
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRecord {
    pub id: i64,
    pub transaction_type: String,
    pub account: Option<String>,
    pub valid: bool,
    pub errors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Validation log registry
///
/// Stores validation outcomes in SQLite for querying and auditing.
pub struct Registry {
    pool: SqlitePool,
}

impl Registry {
    /// Opens (creating if needed) the database at `url` and ensures the schema exists
    ///
    /// # Arguments
    /// * `url` - SQLite connection URL (e.g., "sqlite://validations.db" or "sqlite::memory:")
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // A single connection keeps in-memory databases coherent
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Store one validation outcome
    ///
    /// # Returns
    /// The row id of the new record
    pub async fn record(&self, account: Option<&str>, report: &ValidationReport) -> anyhow::Result<i64> {
        let errors = serde_json::to_string(&report.errors)?;
        let created_at = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO validations (tx_type, account, valid, errors, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(report.transaction_type.as_str())
        .bind(account)
        .bind(report.valid)
        .bind(errors)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Recorded {} validation as #{}", report.transaction_type, id);
        Ok(id)
    }

    /// Most recent validation outcomes, newest first
    pub async fn recent(&self, limit: u32) -> anyhow::Result<Vec<ValidationRecord>> {
        let rows = sqlx::query(
            "SELECT id, tx_type, account, valid, errors, created_at FROM validations ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> anyhow::Result<ValidationRecord> {
                let errors: String = row.try_get("errors")?;
                let created_at: String = row.try_get("created_at")?;
                Ok(ValidationRecord {
                    id: row.try_get("id")?,
                    transaction_type: row.try_get("tx_type")?,
                    account: row.try_get("account")?,
                    valid: row.try_get("valid")?,
                    errors: serde_json::from_str(&errors)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransactionType;

    #[tokio::test]
    async fn records_and_lists_newest_first() {
        let registry = Registry::connect("sqlite::memory:").await.unwrap();

        let ok = ValidationReport::new(TransactionType::Payment, vec![]);
        let bad = ValidationReport::new(
            TransactionType::TrustSet,
            vec!["Currency is required".to_string()],
        );
        registry
            .record(Some("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"), &ok)
            .await
            .unwrap();
        registry.record(None, &bad).await.unwrap();

        let records = registry.recent(10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].transaction_type, "TrustSet");
        assert!(!records[0].valid);
        assert_eq!(records[0].errors, vec!["Currency is required"]);
        assert_eq!(records[0].account, None);
        assert!(records[1].valid);

        assert_eq!(registry.recent(1).await.unwrap().len(), 1);
    }
}
