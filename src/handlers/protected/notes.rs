// handlers/protected/notes.rs - /notes collection and record handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::database::models::{NewNote, Note, NotePatch};
use crate::auth::RoleSet;
use crate::handlers::{checked_input, ListQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthHeader};
use crate::routes::AppState;
use crate::services::Message;

/// POST /notes - Create a note in the caller's tenant (201)
pub async fn create(
    State(state): State<AppState>,
    auth: AuthHeader,
    payload: Result<Json<NewNote>, JsonRejection>,
) -> ApiResult<Note> {
    let Json(note) = checked_input(&state, &auth, RoleSet::ANY_MEMBER, payload).await?;
    let created = state.notes.create_note(auth.as_deref(), note).await?;
    Ok(ApiResponse::created(created))
}

/// GET /notes?skip=&limit=
pub async fn list(
    State(state): State<AppState>,
    auth: AuthHeader,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Note>> {
    let Query(query) = checked_input(&state, &auth, RoleSet::ANY_MEMBER, query).await?;
    let notes = state.notes.list_notes(auth.as_deref(), query.skip, query.limit).await?;
    Ok(ApiResponse::success(notes))
}

/// GET /notes/:id
pub async fn get(
    State(state): State<AppState>,
    auth: AuthHeader,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Note> {
    let Path(note_id) = checked_input(&state, &auth, RoleSet::ANY_MEMBER, id).await?;
    let note = state.notes.get_note(auth.as_deref(), note_id).await?;
    Ok(ApiResponse::success(note))
}

/// PUT /notes/:id - Partial update; omitted fields keep their values
pub async fn update(
    State(state): State<AppState>,
    auth: AuthHeader,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NotePatch>, JsonRejection>,
) -> ApiResult<Note> {
    let Path(note_id) = checked_input(&state, &auth, RoleSet::ANY_MEMBER, id).await?;
    let Json(patch) = checked_input(&state, &auth, RoleSet::ANY_MEMBER, payload).await?;
    let note = state.notes.update_note(auth.as_deref(), note_id, patch).await?;
    Ok(ApiResponse::success(note))
}

/// DELETE /notes/:id
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthHeader,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Message> {
    let Path(note_id) = checked_input(&state, &auth, RoleSet::ANY_MEMBER, id).await?;
    let ack = state.notes.delete_note(auth.as_deref(), note_id).await?;
    Ok(ApiResponse::success(ack))
}
