use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::auth::policy::{QuotaExceeded, QuotaPolicy};
use crate::database::manager::DatabaseError;
use crate::database::models::{NewNote, NewTenant, NewUser, Note, NotePatch, Tenant, User, UserUpdate};
use crate::database::repository::Store;
use crate::types::{Page, SubscriptionPlan};

#[derive(Debug, Default)]
struct State {
    tenants: BTreeMap<i64, Tenant>,
    users: BTreeMap<i64, User>,
    notes: BTreeMap<i64, Note>,
    next_tenant_id: i64,
    next_user_id: i64,
    next_note_id: i64,
}

impl State {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn email_taken(&self, email: &str, tenant_id: i64, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.tenant_id == tenant_id && u.email == email && Some(u.id) != except)
    }
}

fn paginate<T: Clone>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(usize::try_from(page.skip).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
        .collect()
}

/// Process-local store with the same constraints as the Postgres schema.
///
/// A single write lock serializes every mutation, which also makes the
/// note count-and-insert atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_tenants(&self) -> Result<Vec<Tenant>, DatabaseError> {
        Ok(self.state.read().await.tenants.values().cloned().collect())
    }

    async fn find_tenant_by_id(&self, tenant_id: i64) -> Result<Option<Tenant>, DatabaseError> {
        Ok(self.state.read().await.tenants.get(&tenant_id).cloned())
    }

    async fn find_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.tenants.values().find(|t| t.slug == slug).cloned())
    }

    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, DatabaseError> {
        let mut state = self.state.write().await;
        if state.tenants.values().any(|t| t.slug == tenant.slug) {
            return Err(DatabaseError::Conflict("tenant already exists".to_string()));
        }

        let now = Utc::now();
        let id = State::next_id(&mut state.next_tenant_id);
        let row = Tenant {
            id,
            slug: tenant.slug,
            name: tenant.name,
            subscription_plan: tenant.subscription_plan,
            created_at: now,
            updated_at: now,
        };
        state.tenants.insert(id, row.clone());
        Ok(row)
    }

    async fn update_tenant_plan(
        &self,
        tenant_id: i64,
        plan: SubscriptionPlan,
    ) -> Result<Option<Tenant>, DatabaseError> {
        let mut state = self.state.write().await;
        Ok(state.tenants.get_mut(&tenant_id).map(|tenant| {
            tenant.subscription_plan = plan;
            tenant.updated_at = Utc::now();
            tenant.clone()
        }))
    }

    async fn find_user_by_email(&self, email: &str, tenant_id: i64) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.tenant_id == tenant_id && u.email == email)
            .cloned())
    }

    async fn list_users(&self, tenant_id: i64, page: Page) -> Result<Vec<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(paginate(
            state.users.values().filter(|u| u.tenant_id == tenant_id).cloned(),
            page,
        ))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.tenants.contains_key(&user.tenant_id) {
            return Err(DatabaseError::Conflict("user references a missing tenant".to_string()));
        }
        if state.email_taken(&user.email, user.tenant_id, None) {
            return Err(DatabaseError::Conflict("user already exists".to_string()));
        }

        let now = Utc::now();
        let id = State::next_id(&mut state.next_user_id);
        let row = User {
            id,
            tenant_id: user.tenant_id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, row.clone());
        Ok(row)
    }

    async fn update_user(
        &self,
        user_id: i64,
        tenant_id: i64,
        update: UserUpdate,
    ) -> Result<Option<User>, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.users.get(&user_id).is_some_and(|u| u.tenant_id == tenant_id) {
            return Ok(None);
        }
        if let Some(email) = &update.email {
            if state.email_taken(email, tenant_id, Some(user_id)) {
                return Err(DatabaseError::Conflict("user already exists".to_string()));
            }
        }

        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, user_id: i64, tenant_id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.users.get(&user_id).is_some_and(|u| u.tenant_id == tenant_id) {
            return Ok(false);
        }
        state.users.remove(&user_id);
        state.notes.retain(|_, note| note.user_id != user_id);
        Ok(true)
    }

    async fn count_notes_by_tenant(&self, tenant_id: i64) -> Result<u64, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.notes.values().filter(|n| n.tenant_id == tenant_id).count() as u64)
    }

    async fn list_notes(&self, tenant_id: i64, page: Page) -> Result<Vec<Note>, DatabaseError> {
        let state = self.state.read().await;
        Ok(paginate(
            state.notes.values().filter(|n| n.tenant_id == tenant_id).cloned(),
            page,
        ))
    }

    async fn find_note(&self, note_id: i64, tenant_id: i64) -> Result<Option<Note>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.notes.get(&note_id).filter(|n| n.tenant_id == tenant_id).cloned())
    }

    async fn create_note(
        &self,
        tenant_id: i64,
        user_id: i64,
        note: NewNote,
        quota: &QuotaPolicy,
    ) -> Result<Result<Note, QuotaExceeded>, DatabaseError> {
        let mut state = self.state.write().await;
        let plan = state
            .tenants
            .get(&tenant_id)
            .map(|t| t.subscription_plan)
            .ok_or_else(|| DatabaseError::Conflict("note references a missing tenant".to_string()))?;
        if !state.users.get(&user_id).is_some_and(|u| u.tenant_id == tenant_id) {
            return Err(DatabaseError::Conflict("note author is not a member of the tenant".to_string()));
        }

        let count = state.notes.values().filter(|n| n.tenant_id == tenant_id).count() as u64;
        if let Err(exceeded) = quota.check(plan, count) {
            return Ok(Err(exceeded));
        }

        let now = Utc::now();
        let id = State::next_id(&mut state.next_note_id);
        let row = Note {
            id,
            tenant_id,
            user_id,
            title: note.title,
            content: note.content,
            created_at: now,
            updated_at: now,
        };
        state.notes.insert(id, row.clone());
        Ok(Ok(row))
    }

    async fn update_note(
        &self,
        note_id: i64,
        tenant_id: i64,
        patch: NotePatch,
    ) -> Result<Option<Note>, DatabaseError> {
        let mut state = self.state.write().await;
        let Some(note) = state.notes.get_mut(&note_id).filter(|n| n.tenant_id == tenant_id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = Some(content);
        }
        note.updated_at = Utc::now();
        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, note_id: i64, tenant_id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.notes.get(&note_id).is_some_and(|n| n.tenant_id == tenant_id) {
            return Ok(false);
        }
        state.notes.remove(&note_id);
        Ok(true)
    }
}
