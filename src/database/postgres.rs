use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::auth::policy::{QuotaExceeded, QuotaPolicy};
use crate::database::manager::DatabaseError;
use crate::database::models::{NewNote, NewTenant, NewUser, Note, NotePatch, Tenant, User, UserUpdate};
use crate::database::repository::Store;
use crate::types::{Page, SubscriptionPlan};

const TENANT_COLUMNS: &str = "id, slug, name, subscription_plan, created_at, updated_at";
const USER_COLUMNS: &str = "id, tenant_id, email, password_hash, role, created_at, updated_at";
const NOTE_COLUMNS: &str = "id, tenant_id, user_id, title, content, created_at, updated_at";

#[derive(FromRow)]
struct TenantRow {
    id: i64,
    slug: String,
    name: String,
    subscription_plan: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = DatabaseError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        Ok(Tenant {
            subscription_plan: row
                .subscription_plan
                .parse()
                .map_err(|e| DatabaseError::CorruptRow(format!("tenant {}: {}", row.id, e)))?,
            id: row.id,
            slug: row.slug,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    tenant_id: i64,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            role: row
                .role
                .parse()
                .map_err(|e| DatabaseError::CorruptRow(format!("user {}: {}", row.id, e)))?,
            id: row.id,
            tenant_id: row.tenant_id,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct NoteRow {
    id: i64,
    tenant_id: i64,
    user_id: i64,
    title: String,
    content: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            tenant_id: row.tenant_id,
            user_id: row.user_id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn page_bounds(page: Page) -> (i64, i64) {
    (
        i64::try_from(page.skip).unwrap_or(i64::MAX),
        i64::try_from(page.limit).unwrap_or(i64::MAX),
    )
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_tenants(&self) -> Result<Vec<Tenant>, DatabaseError> {
        let rows = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {} FROM tenants ORDER BY id",
            TENANT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Tenant::try_from).collect()
    }

    async fn find_tenant_by_id(&self, tenant_id: i64) -> Result<Option<Tenant>, DatabaseError> {
        sqlx::query_as::<_, TenantRow>(&format!("SELECT {} FROM tenants WHERE id = $1", TENANT_COLUMNS))
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Tenant::try_from)
            .transpose()
    }

    async fn find_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DatabaseError> {
        sqlx::query_as::<_, TenantRow>(&format!("SELECT {} FROM tenants WHERE slug = $1", TENANT_COLUMNS))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .map(Tenant::try_from)
            .transpose()
    }

    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, DatabaseError> {
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "INSERT INTO tenants (slug, name, subscription_plan) VALUES ($1, $2, $3) RETURNING {}",
            TENANT_COLUMNS
        ))
        .bind(&tenant.slug)
        .bind(&tenant.name)
        .bind(tenant.subscription_plan.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "tenant"))?;
        Tenant::try_from(row)
    }

    async fn update_tenant_plan(
        &self,
        tenant_id: i64,
        plan: SubscriptionPlan,
    ) -> Result<Option<Tenant>, DatabaseError> {
        sqlx::query_as::<_, TenantRow>(&format!(
            "UPDATE tenants SET subscription_plan = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            TENANT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(plan.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Tenant::try_from)
        .transpose()
    }

    async fn find_user_by_email(&self, email: &str, tenant_id: i64) -> Result<Option<User>, DatabaseError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1 AND tenant_id = $2",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn list_users(&self, tenant_id: i64, page: Page) -> Result<Vec<User>, DatabaseError> {
        let (offset, limit) = page_bounds(page);
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE tenant_id = $1 ORDER BY id OFFSET $2 LIMIT $3",
            USER_COLUMNS
        ))
        .bind(tenant_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (tenant_id, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.tenant_id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "user"))?;
        User::try_from(row)
    }

    async fn update_user(
        &self,
        user_id: i64,
        tenant_id: i64,
        update: UserUpdate,
    ) -> Result<Option<User>, DatabaseError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users
             SET email = COALESCE($3, email), role = COALESCE($4, role), updated_at = now()
             WHERE id = $1 AND tenant_id = $2
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(tenant_id)
        .bind(update.email.as_deref())
        .bind(update.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "user"))?
        .map(User::try_from)
        .transpose()
    }

    async fn delete_user(&self, user_id: i64, tenant_id: i64) -> Result<bool, DatabaseError> {
        // notes go with the user through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND tenant_id = $2")
            .bind(user_id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_notes_by_tenant(&self, tenant_id: i64) -> Result<u64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn list_notes(&self, tenant_id: i64, page: Page) -> Result<Vec<Note>, DatabaseError> {
        let (offset, limit) = page_bounds(page);
        let rows = sqlx::query_as::<_, NoteRow>(&format!(
            "SELECT {} FROM notes WHERE tenant_id = $1 ORDER BY id OFFSET $2 LIMIT $3",
            NOTE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn find_note(&self, note_id: i64, tenant_id: i64) -> Result<Option<Note>, DatabaseError> {
        let row = sqlx::query_as::<_, NoteRow>(&format!(
            "SELECT {} FROM notes WHERE id = $1 AND tenant_id = $2",
            NOTE_COLUMNS
        ))
        .bind(note_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Note::from))
    }

    async fn create_note(
        &self,
        tenant_id: i64,
        user_id: i64,
        note: NewNote,
        quota: &QuotaPolicy,
    ) -> Result<Result<Note, QuotaExceeded>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Lock the tenant row so concurrent creators for the same tenant queue up
        let plan: Option<String> =
            sqlx::query_scalar("SELECT subscription_plan FROM tenants WHERE id = $1 FOR UPDATE")
                .bind(tenant_id)
                .fetch_optional(&mut *tx)
                .await?;
        let plan: SubscriptionPlan = plan
            .ok_or_else(|| DatabaseError::Conflict("note references a missing tenant".to_string()))?
            .parse()
            .map_err(|e| DatabaseError::CorruptRow(format!("tenant {}: {}", tenant_id, e)))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&mut *tx)
            .await?;

        if let Err(exceeded) = quota.check(plan, count.max(0) as u64) {
            tx.rollback().await?;
            return Ok(Err(exceeded));
        }

        let row = sqlx::query_as::<_, NoteRow>(&format!(
            "INSERT INTO notes (tenant_id, user_id, title, content) VALUES ($1, $2, $3, $4) RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(user_id)
        .bind(&note.title)
        .bind(note.content.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_write(e, "note"))?;

        tx.commit().await?;
        Ok(Ok(Note::from(row)))
    }

    async fn update_note(
        &self,
        note_id: i64,
        tenant_id: i64,
        patch: NotePatch,
    ) -> Result<Option<Note>, DatabaseError> {
        let row = sqlx::query_as::<_, NoteRow>(&format!(
            "UPDATE notes
             SET title = COALESCE($3, title), content = COALESCE($4, content), updated_at = now()
             WHERE id = $1 AND tenant_id = $2
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(note_id)
        .bind(tenant_id)
        .bind(patch.title.as_deref())
        .bind(patch.content.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Note::from))
    }

    async fn delete_note(&self, note_id: i64, tenant_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND tenant_id = $2")
            .bind(note_id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
