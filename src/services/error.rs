use thiserror::Error;

use crate::auth::{IdentityError, PasswordError, PolicyError, QuotaExceeded, TokenError};
use crate::database::DatabaseError;

/// Terminal outcome of a rejected request. Each variant maps to one HTTP status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    LimitReached(QuotaExceeded),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    /// A user row points at a tenant that is gone
    #[error("tenant {0} is missing")]
    TenantMissing(i64),

    #[error(transparent)]
    Database(DatabaseError),

    #[error("{0}")]
    Internal(String),
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Database(other),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed | TokenError::InvalidSignature | TokenError::Expired => {
                ServiceError::Unauthenticated
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<IdentityError> for ServiceError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::UnknownUser => ServiceError::Unauthenticated,
            IdentityError::TenantMissing(id) => ServiceError::TenantMissing(id),
            IdentityError::Database(e) => e.into(),
        }
    }
}

impl From<PolicyError> for ServiceError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::RoleNotPermitted { .. } => {
                ServiceError::Forbidden("Not enough permissions".to_string())
            }
            PolicyError::CrossTenant => {
                ServiceError::Forbidden("Cannot upgrade a different tenant".to_string())
            }
        }
    }
}

impl From<QuotaExceeded> for ServiceError {
    fn from(err: QuotaExceeded) -> Self {
        ServiceError::LimitReached(err)
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
