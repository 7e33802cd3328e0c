use async_trait::async_trait;

use crate::auth::policy::{QuotaExceeded, QuotaPolicy};
use crate::database::manager::DatabaseError;
use crate::database::models::{NewNote, NewTenant, NewUser, Note, NotePatch, Tenant, User, UserUpdate};
use crate::types::{Page, SubscriptionPlan};

/// Persistence capability consumed by the services.
///
/// Every user and note operation takes the caller's `tenant_id` and treats a row
/// in another tenant exactly like a missing row.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Tenants

    /// All tenants in ascending id order
    async fn list_tenants(&self) -> Result<Vec<Tenant>, DatabaseError>;
    async fn find_tenant_by_id(&self, tenant_id: i64) -> Result<Option<Tenant>, DatabaseError>;
    async fn find_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DatabaseError>;
    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, DatabaseError>;
    async fn update_tenant_plan(
        &self,
        tenant_id: i64,
        plan: SubscriptionPlan,
    ) -> Result<Option<Tenant>, DatabaseError>;

    // Users

    async fn find_user_by_email(&self, email: &str, tenant_id: i64) -> Result<Option<User>, DatabaseError>;
    async fn list_users(&self, tenant_id: i64, page: Page) -> Result<Vec<User>, DatabaseError>;
    /// Fails with `DatabaseError::Conflict` when the email is taken within the tenant
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn update_user(
        &self,
        user_id: i64,
        tenant_id: i64,
        update: UserUpdate,
    ) -> Result<Option<User>, DatabaseError>;
    /// Removes the user and every note they authored
    async fn delete_user(&self, user_id: i64, tenant_id: i64) -> Result<bool, DatabaseError>;

    // Notes

    async fn count_notes_by_tenant(&self, tenant_id: i64) -> Result<u64, DatabaseError>;
    async fn list_notes(&self, tenant_id: i64, page: Page) -> Result<Vec<Note>, DatabaseError>;
    async fn find_note(&self, note_id: i64, tenant_id: i64) -> Result<Option<Note>, DatabaseError>;

    /// Count, check and insert as one serialized step per tenant.
    ///
    /// The outer error is a storage failure, the inner one the quota decision.
    async fn create_note(
        &self,
        tenant_id: i64,
        user_id: i64,
        note: NewNote,
        quota: &QuotaPolicy,
    ) -> Result<Result<Note, QuotaExceeded>, DatabaseError>;

    async fn update_note(
        &self,
        note_id: i64,
        tenant_id: i64,
        patch: NotePatch,
    ) -> Result<Option<Note>, DatabaseError>;
    async fn delete_note(&self, note_id: i64, tenant_id: i64) -> Result<bool, DatabaseError>;
}
