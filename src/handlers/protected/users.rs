// handlers/protected/users.rs - /users handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::database::models::User;
use crate::auth::RoleSet;
use crate::handlers::{checked_input, ListQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthHeader};
use crate::routes::AppState;
use crate::services::{CreateUserRequest, Message, UpdateUserRequest};

/// POST /users - Invite a user into the caller's tenant (admin, 201)
pub async fn create(
    State(state): State<AppState>,
    auth: AuthHeader,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(request) = checked_input(&state, &auth, RoleSet::ADMIN_ONLY, payload).await?;
    let user = state.users.create_user(auth.as_deref(), request).await?;
    Ok(ApiResponse::created(user))
}

/// GET /users (admin)
pub async fn list(
    State(state): State<AppState>,
    auth: AuthHeader,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<User>> {
    let Query(query) = checked_input(&state, &auth, RoleSet::ADMIN_ONLY, query).await?;
    let users = state.users.list_users(auth.as_deref(), query.skip, query.limit).await?;
    Ok(ApiResponse::success(users))
}

/// GET /users/me
pub async fn me(State(state): State<AppState>, auth: AuthHeader) -> ApiResult<User> {
    let user = state.users.me(auth.as_deref()).await?;
    Ok(ApiResponse::success(user))
}

/// PATCH /users/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    auth: AuthHeader,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Path(user_id) = checked_input(&state, &auth, RoleSet::ADMIN_ONLY, id).await?;
    let Json(request) = checked_input(&state, &auth, RoleSet::ADMIN_ONLY, payload).await?;
    let user = state.users.update_user(auth.as_deref(), user_id, request).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /users/:id (admin); the user's notes are deleted with them
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthHeader,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Message> {
    let Path(user_id) = checked_input(&state, &auth, RoleSet::ADMIN_ONLY, id).await?;
    let ack = state.users.delete_user(auth.as_deref(), user_id).await?;
    Ok(ApiResponse::success(ack))
}
