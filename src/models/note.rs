use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: String,
    pub image_data: Option<String>,
    pub is_pinned: bool,
    pub created_at: String,
    // Owner id stays server-side; responses never include it.
    #[serde(skip_serializing)]
    pub user_id: i64,
}

/// Body of POST /api/notes. Every field is optional; the client is allowed
/// to create a completely empty note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<String>,
    pub image_data: Option<String>,
    pub is_pinned: Option<bool>,
}

/// Body of PUT /api/notes/{id}. Omitted fields keep their stored value;
/// the pin flag is only ever changed through the pin endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<String>,
    pub image_data: Option<String>,
}
