pub mod auth_service;
pub mod error;
pub mod note_service;
pub mod pipeline;
pub mod tenant_service;
pub mod user_service;

use serde::{Deserialize, Serialize};

pub use auth_service::{AuthService, LoginRequest, TokenResponse};
pub use error::ServiceError;
pub use note_service::NoteService;
pub use pipeline::{Pipeline, PipelineSettings};
pub use tenant_service::{TenantOverview, TenantService, UpgradeResponse};
pub use user_service::{CreateUserRequest, UpdateUserRequest, UserService};

/// Plain acknowledgement body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
