//! # Write-Off Repository
//!
//! Persistence for stock write-off records. The stock side effects of a
//! write-off (and of editing one) live in the engine's write-off flow;
//! this repository only stores the paper trail.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use despensa_core::WriteOff;

/// Repository for write-off database operations.
#[derive(Debug, Clone)]
pub struct WriteOffRepository {
    pool: SqlitePool,
}

impl WriteOffRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WriteOffRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<WriteOff>> {
        let write_off = sqlx::query_as::<_, WriteOff>(
            r#"
            SELECT id, product_id, quantity, reason, description,
                   loss_value_cents, recorded_by, created_at
            FROM write_offs
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(write_off)
    }

    /// Lists all write-offs, newest first.
    pub async fn list(&self) -> DbResult<Vec<WriteOff>> {
        let write_offs = sqlx::query_as::<_, WriteOff>(
            r#"
            SELECT id, product_id, quantity, reason, description,
                   loss_value_cents, recorded_by, created_at
            FROM write_offs
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(write_offs)
    }

    /// Lists write-offs recorded within `[from, to)`, for loss reports.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<WriteOff>> {
        let write_offs = sqlx::query_as::<_, WriteOff>(
            r#"
            SELECT id, product_id, quantity, reason, description,
                   loss_value_cents, recorded_by, created_at
            FROM write_offs
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(write_offs)
    }

    pub async fn insert(&self, write_off: &WriteOff) -> DbResult<WriteOff> {
        debug!(id = %write_off.id, product_id = %write_off.product_id, "Inserting write-off");

        sqlx::query(
            r#"
            INSERT INTO write_offs (
                id, product_id, quantity, reason, description,
                loss_value_cents, recorded_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&write_off.id)
        .bind(&write_off.product_id)
        .bind(write_off.quantity)
        .bind(write_off.reason)
        .bind(&write_off.description)
        .bind(write_off.loss_value_cents)
        .bind(&write_off.recorded_by)
        .bind(write_off.created_at)
        .execute(&self.pool)
        .await?;

        Ok(write_off.clone())
    }

    /// Overwrites a write-off record. `recorded_by` and `created_at` are
    /// written as given; the engine preserves the originals when editing.
    pub async fn update(&self, write_off: &WriteOff) -> DbResult<()> {
        debug!(id = %write_off.id, "Updating write-off");

        let result = sqlx::query(
            r#"
            UPDATE write_offs SET
                product_id = ?2,
                quantity = ?3,
                reason = ?4,
                description = ?5,
                loss_value_cents = ?6,
                recorded_by = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&write_off.id)
        .bind(&write_off.product_id)
        .bind(write_off.quantity)
        .bind(write_off.reason)
        .bind(&write_off.description)
        .bind(write_off.loss_value_cents)
        .bind(&write_off.recorded_by)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("WriteOff", &write_off.id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting write-off");

        let result = sqlx::query("DELETE FROM write_offs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("WriteOff", id));
        }

        Ok(())
    }
}
