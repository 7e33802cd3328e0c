use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

/// Idempotent DDL applied at startup, in order.
///
/// Tenants are never cascaded: their users and notes hold RESTRICT keys.
/// Deleting a user cascades to that user's notes. The composite key on
/// notes pins every note to its author's tenant.
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS tenants (
        id                BIGSERIAL PRIMARY KEY,
        slug              TEXT NOT NULL UNIQUE,
        name              TEXT NOT NULL,
        subscription_plan TEXT NOT NULL DEFAULT 'free'
                          CHECK (subscription_plan IN ('free', 'pro')),
        created_at        TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at        TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            BIGSERIAL PRIMARY KEY,
        tenant_id     BIGINT NOT NULL REFERENCES tenants(id) ON DELETE RESTRICT,
        email         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL CHECK (role IN ('admin', 'member')),
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (tenant_id, email),
        UNIQUE (id, tenant_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notes (
        id         BIGSERIAL PRIMARY KEY,
        tenant_id  BIGINT NOT NULL REFERENCES tenants(id) ON DELETE RESTRICT,
        user_id    BIGINT NOT NULL,
        title      TEXT NOT NULL,
        content    TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        FOREIGN KEY (user_id, tenant_id) REFERENCES users(id, tenant_id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS notes_tenant_id_idx ON notes (tenant_id, id)",
];

pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    }
    info!(statements = STATEMENTS.len(), "Database schema is up to date");
    Ok(())
}
