use crate::error::Result;
use crate::models::{CreateNoteRequest, Note, UpdateNoteRequest};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn create(&self, user_id: i64, request: CreateNoteRequest) -> Result<i64>;
    async fn get_by_id(&self, id: i64, user_id: i64) -> Result<Option<Note>>;
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Note>>;
    async fn update(&self, id: i64, user_id: i64, request: UpdateNoteRequest) -> Result<bool>;
    async fn delete(&self, id: i64, user_id: i64) -> Result<bool>;
    async fn toggle_pin(&self, id: i64, user_id: i64) -> Result<Option<bool>>;
}

pub struct SqliteNoteRepository {
    pool: SqlitePool,
}

impl SqliteNoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for SqliteNoteRepository {
    async fn create(&self, user_id: i64, request: CreateNoteRequest) -> Result<i64> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let result = sqlx::query(
            r#"
            INSERT INTO notes (title, content, color, image_data, is_pinned, created_at, user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.color.as_deref().unwrap_or("#ffffff"))
        .bind(&request.image_data)
        .bind(request.is_pinned.unwrap_or(false))
        .bind(&created_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_by_id(&self, id: i64, user_id: i64) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, color, image_data, is_pinned, created_at, user_id
            FROM notes
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Note>> {
        // Pinned notes first, newest first within each group. The id
        // tiebreak keeps same-timestamp notes in insertion order.
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, color, image_data, is_pinned, created_at, user_id
            FROM notes
            WHERE user_id = ?
            ORDER BY is_pinned DESC, created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    async fn update(&self, id: i64, user_id: i64, request: UpdateNoteRequest) -> Result<bool> {
        // COALESCE keeps the stored value for every field the request
        // leaves unset. is_pinned is deliberately not touched here.
        let result = sqlx::query(
            r#"
            UPDATE notes
            SET title = COALESCE(?, title),
                content = COALESCE(?, content),
                color = COALESCE(?, color),
                image_data = COALESCE(?, image_data)
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&request.title)
        .bind(&request.content)
        .bind(&request.color)
        .bind(&request.image_data)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_pin(&self, id: i64, user_id: i64) -> Result<Option<bool>> {
        // Read-flip-write inside one transaction so concurrent toggles on
        // the same note cannot both observe the same starting state.
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, bool>(
            "SELECT is_pinned FROM notes WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let pinned = match current {
            Some(p) => p,
            None => return Ok(None),
        };

        let new_state = !pinned;
        sqlx::query("UPDATE notes SET is_pinned = ? WHERE id = ? AND user_id = ?")
            .bind(new_state)
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(new_state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::{SqliteUserRepository, UserRepository};
    use crate::test_utils::{create_test_pool, create_test_user};

    #[tokio::test]
    async fn test_note_crud() {
        let pool = create_test_pool().await;
        let repo = SqliteNoteRepository::new(pool.clone());
        let user_id = create_test_user(&pool, "test@example.com", "password")
            .await
            .unwrap();

        // Create
        let request = CreateNoteRequest {
            title: Some("Groceries".to_string()),
            content: Some("milk, eggs".to_string()),
            color: Some("#f28b82".to_string()),
            image_data: None,
            is_pinned: None,
        };
        let note_id = repo.create(user_id, request).await.unwrap();
        assert!(note_id > 0);

        // Read
        let note = repo.get_by_id(note_id, user_id).await.unwrap().unwrap();
        assert_eq!(note.title.as_deref(), Some("Groceries"));
        assert_eq!(note.color, "#f28b82");
        assert!(!note.is_pinned);

        // Partial update: only the content changes
        let update_request = UpdateNoteRequest {
            content: Some("milk, eggs, bread".to_string()),
            ..Default::default()
        };
        let updated = repo.update(note_id, user_id, update_request).await.unwrap();
        assert!(updated);

        let note = repo.get_by_id(note_id, user_id).await.unwrap().unwrap();
        assert_eq!(note.title.as_deref(), Some("Groceries"));
        assert_eq!(note.content.as_deref(), Some("milk, eggs, bread"));
        assert_eq!(note.color, "#f28b82");

        // List
        let notes = repo.list_by_user(user_id).await.unwrap();
        assert_eq!(notes.len(), 1);

        // Delete
        let deleted = repo.delete(note_id, user_id).await.unwrap();
        assert!(deleted);

        let note = repo.get_by_id(note_id, user_id).await.unwrap();
        assert!(note.is_none());
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let pool = create_test_pool().await;
        let repo = SqliteNoteRepository::new(pool.clone());
        let user_id = create_test_user(&pool, "test@example.com", "password")
            .await
            .unwrap();

        let note_id = repo
            .create(user_id, CreateNoteRequest::default())
            .await
            .unwrap();

        let note = repo.get_by_id(note_id, user_id).await.unwrap().unwrap();
        assert_eq!(note.title, None);
        assert_eq!(note.content, None);
        assert_eq!(note.color, "#ffffff");
        assert_eq!(note.image_data, None);
        assert!(!note.is_pinned);

        // A note can also be pinned at creation.
        let pinned_id = repo
            .create(
                user_id,
                CreateNoteRequest {
                    is_pinned: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let pinned = repo.get_by_id(pinned_id, user_id).await.unwrap().unwrap();
        assert!(pinned.is_pinned);
    }

    #[tokio::test]
    async fn test_list_orders_pinned_first_then_newest() {
        let pool = create_test_pool().await;
        let repo = SqliteNoteRepository::new(pool.clone());
        let user_id = create_test_user(&pool, "test@example.com", "password")
            .await
            .unwrap();

        let first = repo
            .create(
                user_id,
                CreateNoteRequest {
                    title: Some("first".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = repo
            .create(
                user_id,
                CreateNoteRequest {
                    title: Some("second".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let third = repo
            .create(
                user_id,
                CreateNoteRequest {
                    title: Some("third".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Pin the middle note; it must come first, the rest newest-first.
        repo.toggle_pin(second, user_id).await.unwrap();

        let notes = repo.list_by_user(user_id).await.unwrap();
        let ids: Vec<i64> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![second, third, first]);
    }

    #[tokio::test]
    async fn test_toggle_pin_flips_and_reports_state() {
        let pool = create_test_pool().await;
        let repo = SqliteNoteRepository::new(pool.clone());
        let user_id = create_test_user(&pool, "test@example.com", "password")
            .await
            .unwrap();

        let note_id = repo
            .create(user_id, CreateNoteRequest::default())
            .await
            .unwrap();

        let pinned = repo.toggle_pin(note_id, user_id).await.unwrap();
        assert_eq!(pinned, Some(true));

        let pinned = repo.toggle_pin(note_id, user_id).await.unwrap();
        assert_eq!(pinned, Some(false));

        let missing = repo.toggle_pin(9999, user_id).await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_operations_are_owner_scoped() {
        let pool = create_test_pool().await;
        let repo = SqliteNoteRepository::new(pool.clone());
        let owner = create_test_user(&pool, "owner@example.com", "password")
            .await
            .unwrap();
        let intruder = create_test_user(&pool, "intruder@example.com", "password")
            .await
            .unwrap();

        let note_id = repo
            .create(
                owner,
                CreateNoteRequest {
                    title: Some("private".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(repo.get_by_id(note_id, intruder).await.unwrap().is_none());
        assert!(repo.list_by_user(intruder).await.unwrap().is_empty());
        assert!(!repo
            .update(note_id, intruder, UpdateNoteRequest::default())
            .await
            .unwrap());
        assert!(!repo.delete(note_id, intruder).await.unwrap());
        assert_eq!(repo.toggle_pin(note_id, intruder).await.unwrap(), None);

        // Owner still sees the untouched note.
        let note = repo.get_by_id(note_id, owner).await.unwrap().unwrap();
        assert_eq!(note.title.as_deref(), Some("private"));
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_to_notes() {
        let pool = create_test_pool().await;
        let repo = SqliteNoteRepository::new(pool.clone());
        let user_repo = SqliteUserRepository::new(pool.clone());
        let user_id = create_test_user(&pool, "doomed@example.com", "password")
            .await
            .unwrap();

        repo.create(user_id, CreateNoteRequest::default())
            .await
            .unwrap();
        repo.create(user_id, CreateNoteRequest::default())
            .await
            .unwrap();

        user_repo.delete_user(user_id).await.unwrap();

        let orphans = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
