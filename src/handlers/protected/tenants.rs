// handlers/protected/tenants.rs - /tenants handlers

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};

use crate::auth::RoleSet;
use crate::handlers::checked_input;
use crate::middleware::{ApiResponse, ApiResult, AuthHeader};
use crate::routes::AppState;
use crate::services::{TenantOverview, UpgradeResponse};

/// POST /tenants/:slug/upgrade - Admin of that tenant only
pub async fn upgrade(
    State(state): State<AppState>,
    auth: AuthHeader,
    slug: Result<Path<String>, PathRejection>,
) -> ApiResult<UpgradeResponse> {
    let Path(slug) = checked_input(&state, &auth, RoleSet::ADMIN_ONLY, slug).await?;
    let upgraded = state.tenants.upgrade_tenant(auth.as_deref(), &slug).await?;
    Ok(ApiResponse::success(upgraded))
}

/// GET /tenants/me
pub async fn me(State(state): State<AppState>, auth: AuthHeader) -> ApiResult<TenantOverview> {
    let overview = state.tenants.current_tenant(auth.as_deref()).await?;
    Ok(ApiResponse::success(overview))
}
