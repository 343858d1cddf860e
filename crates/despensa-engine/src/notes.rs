//! # Staff Notes
//!
//! Seller-to-admin messages. Only sellers create notes; admins read
//! them. The unseen counter drives the interface's badge.

use chrono::Utc;
use tracing::info;

use despensa_core::{validation, Caller, Note, StaffRole};
use despensa_db::{generate_id, Database};

use crate::error::{EngineError, EngineResult};

/// A new-note request.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    pub title: String,
    pub body: String,
}

/// Service for staff notes.
#[derive(Debug, Clone)]
pub struct NoteService {
    db: Database,
}

impl NoteService {
    pub fn new(db: Database) -> Self {
        NoteService { db }
    }

    /// Creates a note. Admins don't leave notes for themselves; only
    /// sellers may call this.
    pub async fn create(&self, caller: &Caller, request: NoteRequest) -> EngineResult<Note> {
        if caller.role != StaffRole::Seller {
            return Err(EngineError::Forbidden("only sellers can create notes"));
        }
        validation::validate_required("title", &request.title)?;
        validation::validate_required("body", &request.body)?;

        let note = Note {
            id: generate_id(),
            title: request.title,
            body: request.body,
            created_by: caller.id.clone(),
            is_read: false,
            seen_by_admin: false,
            created_at: Utc::now(),
        };
        self.db.notes().insert(&note).await?;

        info!(id = %note.id, created_by = %note.created_by, "Note created");
        Ok(note)
    }

    pub async fn get(&self, id: &str) -> EngineResult<Note> {
        self.db
            .notes()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Note", id))
    }

    /// All notes, newest first.
    pub async fn list(&self) -> EngineResult<Vec<Note>> {
        Ok(self.db.notes().list().await?)
    }

    pub async fn mark_read(&self, id: &str) -> EngineResult<()> {
        Ok(self.db.notes().mark_read(id).await?)
    }

    /// Number of notes no admin has seen yet.
    pub async fn unseen_by_admin(&self) -> EngineResult<i64> {
        Ok(self.db.notes().count_unseen().await?)
    }

    /// Marks every note as seen; returns how many changed.
    pub async fn mark_all_seen(&self) -> EngineResult<u64> {
        Ok(self.db.notes().mark_all_seen().await?)
    }

    pub async fn delete(&self, id: &str) -> EngineResult<()> {
        self.db.notes().delete(id).await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use despensa_db::DbConfig;

    async fn test_service() -> NoteService {
        NoteService::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    fn seller() -> Caller {
        Caller {
            id: "ana".to_string(),
            role: StaffRole::Seller,
        }
    }

    fn admin() -> Caller {
        Caller {
            id: "admin1".to_string(),
            role: StaffRole::Admin,
        }
    }

    fn request() -> NoteRequest {
        NoteRequest {
            title: "Falta cambio".to_string(),
            body: "Quedan pocos billetes chicos en caja".to_string(),
        }
    }

    #[tokio::test]
    async fn test_only_sellers_create() {
        let service = test_service().await;

        let err = service.create(&admin(), request()).await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));

        let note = service.create(&seller(), request()).await.unwrap();
        assert_eq!(note.created_by, "ana");
        assert!(!note.is_read);
    }

    #[tokio::test]
    async fn test_unseen_badge_flow() {
        let service = test_service().await;

        service.create(&seller(), request()).await.unwrap();
        service.create(&seller(), request()).await.unwrap();

        assert_eq!(service.unseen_by_admin().await.unwrap(), 2);
        assert_eq!(service.mark_all_seen().await.unwrap(), 2);
        assert_eq!(service.unseen_by_admin().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read() {
        let service = test_service().await;
        let note = service.create(&seller(), request()).await.unwrap();

        service.mark_read(&note.id).await.unwrap();
        assert!(service.get(&note.id).await.unwrap().is_read);
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let service = test_service().await;
        let err = service
            .create(
                &seller(),
                NoteRequest {
                    title: " ".to_string(),
                    body: "x".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
