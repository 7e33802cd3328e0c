// handlers/mod.rs - Two-tier handler layout
//
// Public (no token) → Protected (bearer token, checked by the request pipeline)
pub mod protected;
pub mod public;

use serde::Deserialize;

use crate::auth::RoleSet;
use crate::error::ApiError;
use crate::middleware::AuthHeader;
use crate::routes::AppState;

/// `?skip=&limit=` pagination parameters, clamped by the pipeline
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Unwrap an extracted path, query or body. A rejected input is reported only
/// once the caller has passed the route's authentication and role check.
pub async fn checked_input<T, R>(
    state: &AppState,
    auth: &AuthHeader,
    required: RoleSet,
    input: Result<T, R>,
) -> Result<T, ApiError>
where
    ApiError: From<R>,
{
    match input {
        Ok(value) => Ok(value),
        Err(rejection) => {
            state.pipeline.authenticate(auth.as_deref(), required).await?;
            Err(ApiError::from(rejection))
        }
    }
}
