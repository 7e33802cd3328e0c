use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::token::Claims;
use crate::database::models::{Tenant, User};
use crate::database::{DatabaseError, Store};
use crate::types::Role;

/// The authenticated principal for one request
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub tenant: Tenant,
    /// Role as signed into the token. Changes made since login are not visible here.
    pub role: Role,
}

impl Identity {
    pub fn tenant_id(&self) -> i64 {
        self.tenant.id
    }

    pub fn user_id(&self) -> i64 {
        self.user.id
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no user matches the token subject")]
    UnknownUser,
    #[error("tenant {0} referenced by a user does not exist")]
    TenantMissing(i64),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Loads the live user and tenant behind validated claims
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn Store>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, claims: &Claims) -> Result<Identity, IdentityError> {
        // Email lookup is scoped by the token's tenant, never across tenants.
        let user = self
            .store
            .find_user_by_email(claims.email(), claims.tenant_id)
            .await?
            .filter(|user| user.id == claims.user_id)
            .ok_or_else(|| {
                debug!(user_id = claims.user_id, tenant_id = claims.tenant_id, "Token subject not found");
                IdentityError::UnknownUser
            })?;

        let tenant = self
            .store
            .find_tenant_by_id(claims.tenant_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = user.id, tenant_id = claims.tenant_id, "User references a missing tenant");
                IdentityError::TenantMissing(claims.tenant_id)
            })?;

        Ok(Identity {
            user,
            tenant,
            role: claims.role,
        })
    }
}
