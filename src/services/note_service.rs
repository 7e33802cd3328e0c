use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::RoleSet;
use crate::database::models::{NewNote, Note, NotePatch};
use crate::services::error::ServiceError;
use crate::services::pipeline::Pipeline;
use crate::services::Message;

/// Note CRUD, always scoped to the caller's tenant
#[derive(Clone)]
pub struct NoteService {
    pipeline: Arc<Pipeline>,
}

fn validate_title(title: &str) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("Note title must not be empty".to_string()));
    }
    Ok(())
}

impl NoteService {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    pub async fn create_note(&self, auth_header: Option<&str>, note: NewNote) -> Result<Note, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ANY_MEMBER).await?;
        validate_title(&note.title)?;

        let quota = self.pipeline.settings().quota;
        let created = self
            .pipeline
            .store()
            .create_note(identity.tenant_id(), identity.user_id(), note, &quota)
            .await?
            .map_err(|exceeded| {
                info!(
                    tenant_id = identity.tenant_id(),
                    plan = %exceeded.plan,
                    limit = exceeded.limit,
                    "Note limit reached"
                );
                ServiceError::LimitReached(exceeded)
            })?;

        debug!(note_id = created.id, tenant_id = created.tenant_id, user_id = created.user_id, "Note created");
        Ok(created)
    }

    pub async fn list_notes(
        &self,
        auth_header: Option<&str>,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Note>, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ANY_MEMBER).await?;
        let page = self.pipeline.page(skip, limit);
        Ok(self.pipeline.store().list_notes(identity.tenant_id(), page).await?)
    }

    /// A note in another tenant is reported exactly like a missing one
    pub async fn get_note(&self, auth_header: Option<&str>, note_id: i64) -> Result<Note, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ANY_MEMBER).await?;
        self.pipeline
            .store()
            .find_note(note_id, identity.tenant_id())
            .await?
            .ok_or(ServiceError::NotFound("Note"))
    }

    pub async fn update_note(
        &self,
        auth_header: Option<&str>,
        note_id: i64,
        patch: NotePatch,
    ) -> Result<Note, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ANY_MEMBER).await?;
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }

        let updated = self
            .pipeline
            .store()
            .update_note(note_id, identity.tenant_id(), patch)
            .await?
            .ok_or(ServiceError::NotFound("Note"))?;
        debug!(note_id, tenant_id = identity.tenant_id(), "Note updated");
        Ok(updated)
    }

    pub async fn delete_note(&self, auth_header: Option<&str>, note_id: i64) -> Result<Message, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ANY_MEMBER).await?;
        if !self.pipeline.store().delete_note(note_id, identity.tenant_id()).await? {
            return Err(ServiceError::NotFound("Note"));
        }
        debug!(note_id, tenant_id = identity.tenant_id(), "Note deleted");
        Ok(Message::new("Note deleted successfully"))
    }
}
