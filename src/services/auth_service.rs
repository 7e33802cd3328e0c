use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::TokenSubject;
use crate::database::models::Tenant;
use crate::services::error::ServiceError;
use crate::services::pipeline::Pipeline;

#[derive(Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Optional tenant slug; restricts the credential search to that tenant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("tenant", &self.tenant)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AuthService {
    pipeline: Arc<Pipeline>,
}

impl AuthService {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Exchange email and password for an access token.
    ///
    /// Without a tenant slug every tenant is tried in ascending id order and the
    /// first one holding a user with this email and password wins. Every failure
    /// reports the same error so callers cannot tell which field was wrong.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, ServiceError> {
        let store = self.pipeline.store();

        let tenants: Vec<Tenant> = match request.tenant.as_deref() {
            Some(slug) => store.find_tenant_by_slug(slug).await?.into_iter().collect(),
            None => store.list_tenants().await?,
        };
        if tenants.is_empty() {
            self.pipeline.verify_decoy(request.password.clone()).await?;
        }

        for tenant in tenants {
            let Some(user) = store.find_user_by_email(&request.email, tenant.id).await? else {
                self.pipeline.verify_decoy(request.password.clone()).await?;
                continue;
            };
            let matched = self
                .pipeline
                .verify_password(request.password.clone(), user.password_hash.clone())
                .await?;
            if !matched {
                continue;
            }

            let tokens = self.pipeline.tokens();
            let access_token = tokens.issue(
                &TokenSubject {
                    email: user.email.clone(),
                    user_id: user.id,
                    tenant_id: tenant.id,
                    role: user.role,
                },
                None,
            )?;

            info!(user_id = user.id, tenant_id = tenant.id, role = %user.role, "User logged in");
            return Ok(TokenResponse {
                access_token,
                token_type: "bearer".to_string(),
                expires_in: tokens.default_ttl().num_seconds(),
            });
        }

        debug!(tenant = ?request.tenant, "Login rejected");
        Err(ServiceError::InvalidCredentials)
    }
}
