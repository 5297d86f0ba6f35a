use crate::error::{AppError, Result};
use crate::models::{CreateNoteRequest, Note, UpdateNoteRequest};
use crate::repositories::NoteRepository;
use std::sync::Arc;

pub struct NoteService {
    repository: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(repository: Arc<dyn NoteRepository>) -> Self {
        Self { repository }
    }

    // An entirely empty note is allowed; deciding what is worth keeping
    // is the client's business.
    pub async fn create_note(&self, user_id: i64, request: CreateNoteRequest) -> Result<i64> {
        self.repository.create(user_id, request).await
    }

    pub async fn get_note(&self, id: i64, user_id: i64) -> Result<Note> {
        self.repository
            .get_by_id(id, user_id)
            .await?
            .ok_or(AppError::NoteNotFound)
    }

    pub async fn list_notes(&self, user_id: i64) -> Result<Vec<Note>> {
        self.repository.list_by_user(user_id).await
    }

    pub async fn update_note(
        &self,
        id: i64,
        user_id: i64,
        request: UpdateNoteRequest,
    ) -> Result<()> {
        let updated = self.repository.update(id, user_id, request).await?;

        if updated {
            Ok(())
        } else {
            Err(AppError::NoteNotFound)
        }
    }

    pub async fn delete_note(&self, id: i64, user_id: i64) -> Result<()> {
        let deleted = self.repository.delete(id, user_id).await?;

        if deleted {
            Ok(())
        } else {
            Err(AppError::NoteNotFound)
        }
    }

    pub async fn toggle_pin(&self, id: i64, user_id: i64) -> Result<bool> {
        self.repository
            .toggle_pin(id, user_id)
            .await?
            .ok_or(AppError::NoteNotFound)
    }
}
