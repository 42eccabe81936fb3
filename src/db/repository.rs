//! Row store for generic tables.
//!
//! Rows are stored as JSON documents keyed by table name and row id.

use chrono::Utc;
use serde_json::Value;
use sqlx::{Row as _, SqlitePool};

use crate::errors::AppError;
use crate::models::{Row, TableSummary, CREATED_FIELD, MODIFIED_FIELD};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    /// List every table that has rows, with its row count.
    pub async fn list_tables(&self) -> Result<Vec<TableSummary>, AppError> {
        let rows = sqlx::query(
            "SELECT table_name, COUNT(*) AS row_count FROM table_rows GROUP BY table_name ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TableSummary {
                name: row.get("table_name"),
                row_count: row.get("row_count"),
            })
            .collect())
    }

    /// Load all rows of a table in insertion order. Unknown tables are empty.
    pub async fn list_rows(&self, table: &str) -> Result<Vec<Row>, AppError> {
        let rows = sqlx::query(
            "SELECT id, data FROM table_rows WHERE table_name = ? ORDER BY created_at, id",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let id: String = row.get("id");
                let data: String = row.get("data");
                match serde_json::from_str::<Row>(&data) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable row {}/{}: {}", table, id, e);
                        None
                    }
                }
            })
            .collect())
    }

    /// Insert or replace rows in a single transaction.
    ///
    /// Each row gets an `id`, `created_at` and `modified_at` unless it already
    /// carries them. Returns the stored rows.
    pub async fn upsert_rows(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(rows.len());

        for mut row in rows {
            let id = row_id(&row).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            row.insert("id".to_string(), Value::String(id.clone()));
            let created_at = ensure_timestamp(&mut row, CREATED_FIELD, &now);
            let modified_at = ensure_timestamp(&mut row, MODIFIED_FIELD, &now);
            let data = serde_json::to_string(&row)?;

            sqlx::query(
                "INSERT OR REPLACE INTO table_rows (table_name, id, data, created_at, modified_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(table)
            .bind(&id)
            .bind(&data)
            .bind(&created_at)
            .bind(&modified_at)
            .execute(&mut *tx)
            .await?;

            stored.push(row);
        }

        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(stored)
    }

    /// Delete one row.
    pub async fn delete_row(&self, table: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM table_rows WHERE table_name = ? AND id = ?")
            .bind(table)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Row {} not found in table {}",
                id, table
            )));
        }

        self.increment_revision().await?;
        Ok(())
    }
}

// Helper functions for row conversion

fn row_id(row: &Row) -> Option<String> {
    match row.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn ensure_timestamp(row: &mut Row, field: &str, now: &str) -> String {
    match row.get(field).and_then(|v| v.as_str()) {
        Some(existing) => existing.to_string(),
        None => {
            row.insert(field.to_string(), Value::String(now.to_string()));
            now.to_string()
        }
    }
}
