use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::RoleSet;
use crate::database::models::{NewUser, User, UserUpdate};
use crate::services::error::ServiceError;
use crate::services::pipeline::Pipeline;
use crate::services::Message;
use crate::types::Role;

const DUPLICATE_EMAIL: &str = "Email already registered in this tenant";

#[derive(Clone, Deserialize, Serialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

fn validate_email(email: &str) -> Result<(), ServiceError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ServiceError::Validation("Invalid email address".to_string()))
    }
}

fn conflict_as_duplicate(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Conflict(_) => ServiceError::Conflict(DUPLICATE_EMAIL.to_string()),
        other => other,
    }
}

/// User administration inside the caller's tenant
#[derive(Clone)]
pub struct UserService {
    pipeline: Arc<Pipeline>,
}

impl UserService {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Invite a user into the caller's tenant. The tenant always comes from the token.
    pub async fn create_user(&self, auth_header: Option<&str>, request: CreateUserRequest) -> Result<User, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ADMIN_ONLY).await?;
        validate_email(&request.email)?;
        if request.password.is_empty() {
            return Err(ServiceError::Validation("Password must not be empty".to_string()));
        }

        let store = self.pipeline.store();
        if store.find_user_by_email(&request.email, identity.tenant_id()).await?.is_some() {
            return Err(ServiceError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let password_hash = self.pipeline.hash_password(request.password).await?;
        let user = store
            .create_user(NewUser {
                tenant_id: identity.tenant_id(),
                email: request.email,
                password_hash,
                role: request.role,
            })
            .await
            .map_err(|e| conflict_as_duplicate(e.into()))?;

        info!(
            user_id = user.id,
            tenant_id = user.tenant_id,
            role = %user.role,
            invited_by = identity.user_id(),
            "User created"
        );
        Ok(user)
    }

    pub async fn me(&self, auth_header: Option<&str>) -> Result<User, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ANY_MEMBER).await?;
        Ok(identity.user)
    }

    pub async fn list_users(
        &self,
        auth_header: Option<&str>,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<User>, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ADMIN_ONLY).await?;
        let page = self.pipeline.page(skip, limit);
        Ok(self.pipeline.store().list_users(identity.tenant_id(), page).await?)
    }

    /// Change a user's email or role. A new role applies from that user's next login.
    pub async fn update_user(
        &self,
        auth_header: Option<&str>,
        user_id: i64,
        request: UpdateUserRequest,
    ) -> Result<User, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ADMIN_ONLY).await?;
        if let Some(email) = &request.email {
            validate_email(email)?;
        }
        let update = UserUpdate {
            email: request.email,
            role: request.role,
        };
        if update.is_empty() {
            return Err(ServiceError::Validation("Nothing to update".to_string()));
        }

        let user = self
            .pipeline
            .store()
            .update_user(user_id, identity.tenant_id(), update)
            .await
            .map_err(|e| conflict_as_duplicate(e.into()))?
            .ok_or(ServiceError::NotFound("User"))?;

        info!(user_id = user.id, tenant_id = user.tenant_id, role = %user.role, "User updated");
        Ok(user)
    }

    /// Delete a user and all notes they wrote. Admins cannot delete themselves.
    pub async fn delete_user(&self, auth_header: Option<&str>, user_id: i64) -> Result<Message, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ADMIN_ONLY).await?;
        if user_id == identity.user_id() {
            return Err(ServiceError::Forbidden("Cannot delete your own account".to_string()));
        }

        if !self.pipeline.store().delete_user(user_id, identity.tenant_id()).await? {
            return Err(ServiceError::NotFound("User"));
        }
        info!(user_id, tenant_id = identity.tenant_id(), "User deleted");
        Ok(Message::new("User deleted successfully"))
    }
}
