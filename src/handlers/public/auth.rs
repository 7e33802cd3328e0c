// handlers/public/auth.rs - POST /auth/login handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::middleware::{ApiResponse, ApiResult};
use crate::routes::AppState;
use crate::services::{LoginRequest, TokenResponse};

/// POST /auth/login - Exchange email and password for a bearer token
///
/// Input: `{"email": "...", "password": "...", "tenant": "acme"?}`
///
/// Output: `{"success": true, "data": {"access_token": "...", "token_type": "bearer", "expires_in": 1800}}`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(request) = payload?;
    let token = state.auth.login(request).await?;
    Ok(ApiResponse::success(token))
}
