use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{CreateNoteRequest, UpdateNoteRequest};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::{json, Value};

/// GET /api/notes - List the caller's notes, pinned first then newest
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Value>> {
    let notes = state.note_service.list_notes(user.id).await?;

    Ok(Json(json!({ "notes": notes })))
}

/// POST /api/notes - Create a note; every field is optional
pub async fn create_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse> {
    let note_id = state.note_service.create_note(user.id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Note created", "note_id": note_id })),
    ))
}

/// GET /api/notes/{id} - Fetch a single note
pub async fn get_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let note = state.note_service.get_note(id, user.id).await?;

    Ok(Json(json!({ "note": note })))
}

/// PUT /api/notes/{id} - Partial update; omitted fields keep their value.
/// The pin state is not touched here, that goes through the pin route.
pub async fn update_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateNoteRequest>,
) -> Result<Json<Value>> {
    state.note_service.update_note(id, user.id, request).await?;

    Ok(Json(json!({ "message": "Note updated" })))
}

/// DELETE /api/notes/{id} - Delete a note permanently
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state.note_service.delete_note(id, user.id).await?;

    Ok(Json(json!({ "message": "Note deleted" })))
}

/// PUT /api/notes/{id}/pin - Flip the pin state and report the new value
pub async fn toggle_pin(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let is_pinned = state.note_service.toggle_pin(id, user.id).await?;

    Ok(Json(json!({ "message": "Pin toggled", "is_pinned": is_pinned })))
}
