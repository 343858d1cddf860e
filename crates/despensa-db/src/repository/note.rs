//! # Note Repository
//!
//! Internal staff notes (seller -> admin). Two independent flags:
//! `is_read` is per-note acknowledgement, `seen_by_admin` feeds the
//! "new notes" badge and is cleared in bulk.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use despensa_core::Note;

/// Repository for note database operations.
#[derive(Debug, Clone)]
pub struct NoteRepository {
    pool: SqlitePool,
}

impl NoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        NoteRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, body, created_by, is_read, seen_by_admin, created_at
            FROM notes
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    /// Lists all notes, newest first.
    pub async fn list(&self) -> DbResult<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, body, created_by, is_read, seen_by_admin, created_at
            FROM notes
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn insert(&self, note: &Note) -> DbResult<Note> {
        debug!(id = %note.id, created_by = %note.created_by, "Inserting note");

        sqlx::query(
            r#"
            INSERT INTO notes (
                id, title, body, created_by, is_read, seen_by_admin, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&note.id)
        .bind(&note.title)
        .bind(&note.body)
        .bind(&note.created_by)
        .bind(note.is_read)
        .bind(note.seen_by_admin)
        .bind(note.created_at)
        .execute(&self.pool)
        .await?;

        Ok(note.clone())
    }

    /// Marks a single note as read.
    pub async fn mark_read(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE notes SET is_read = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Note", id));
        }

        Ok(())
    }

    /// Counts notes an admin has not yet seen.
    pub async fn count_unseen(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE seen_by_admin = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Flags every note as seen; returns how many were flipped.
    pub async fn mark_all_seen(&self) -> DbResult<u64> {
        let result = sqlx::query("UPDATE notes SET seen_by_admin = 1 WHERE seen_by_admin = 0")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting note");

        let result = sqlx::query("DELETE FROM notes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Note", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    fn sample(id: &str) -> Note {
        Note {
            id: id.to_string(),
            title: "Falta cambio".to_string(),
            body: "Quedan pocos billetes chicos en caja".to_string(),
            created_by: "ana".to_string(),
            is_read: false,
            seen_by_admin: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mark_read_and_seen_are_independent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.notes();

        repo.insert(&sample("n1")).await.unwrap();
        repo.insert(&sample("n2")).await.unwrap();

        repo.mark_read("n1").await.unwrap();
        let n1 = repo.get_by_id("n1").await.unwrap().unwrap();
        assert!(n1.is_read);
        assert!(!n1.seen_by_admin);

        assert_eq!(repo.count_unseen().await.unwrap(), 2);
        assert_eq!(repo.mark_all_seen().await.unwrap(), 2);
        assert_eq!(repo.count_unseen().await.unwrap(), 0);
        // idempotent
        assert_eq!(repo.mark_all_seen().await.unwrap(), 0);
    }
}
