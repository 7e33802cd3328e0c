use thiserror::Error;
use tracing::info;

use crate::auth::password::{PasswordError, PasswordService};
use crate::database::manager::DatabaseError;
use crate::database::models::{NewTenant, NewUser, Tenant};
use crate::database::repository::Store;
use crate::types::{Role, SubscriptionPlan};

/// Password shared by every demo account
pub const DEMO_PASSWORD: &str = "password";

const DEMO_TENANTS: &[(&str, &str)] = &[("acme", "Acme Corporation"), ("globex", "Globex Corporation")];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Ensure the demo tenants and their admin/member accounts exist.
///
/// Existing rows are left untouched, so running this on every start is safe.
pub async fn seed_demo_data(store: &dyn Store, passwords: &PasswordService) -> Result<Vec<Tenant>, SeedError> {
    let mut tenants = Vec::with_capacity(DEMO_TENANTS.len());

    for (slug, name) in DEMO_TENANTS {
        let tenant = match store.find_tenant_by_slug(slug).await? {
            Some(existing) => existing,
            None => {
                let created = store
                    .create_tenant(NewTenant {
                        slug: slug.to_string(),
                        name: name.to_string(),
                        subscription_plan: SubscriptionPlan::Free,
                    })
                    .await?;
                info!(tenant_id = created.id, slug = %created.slug, "Seeded tenant");
                created
            }
        };

        for (local, role) in [("admin", Role::Admin), ("user", Role::Member)] {
            let email = format!("{}@{}.test", local, slug);
            if store.find_user_by_email(&email, tenant.id).await?.is_some() {
                continue;
            }
            let user = store
                .create_user(NewUser {
                    tenant_id: tenant.id,
                    email,
                    password_hash: passwords.hash(DEMO_PASSWORD)?,
                    role,
                })
                .await?;
            info!(user_id = user.id, tenant_id = tenant.id, role = %user.role, "Seeded user");
        }

        tenants.push(tenant);
    }

    Ok(tenants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::types::Page;

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let store = MemoryStore::new();
        let passwords = PasswordService::with_cost(8, 1, 1).unwrap();

        let first = seed_demo_data(&store, &passwords).await.unwrap();
        let second = seed_demo_data(&store, &passwords).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list_tenants().await.unwrap().len(), 2);

        let acme = &first[0];
        assert_eq!(acme.slug, "acme");
        assert_eq!(acme.subscription_plan, SubscriptionPlan::Free);
        let users = store.list_users(acme.id, Page::default()).await.unwrap();
        assert_eq!(users.len(), 2);

        let admin = store.find_user_by_email("admin@acme.test", acme.id).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(passwords.verify(DEMO_PASSWORD, &admin.password_hash).unwrap());
    }
}
