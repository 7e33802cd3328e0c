use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::auth::{
    authorize, bearer_token, Identity, IdentityResolver, PasswordService, QuotaPolicy, RoleSet, TokenService,
};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::error::ServiceError;
use crate::types::Page;

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub quota: QuotaPolicy,
    pub default_page_limit: u64,
    pub max_page_limit: u64,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            quota: QuotaPolicy::new(config.quota.free_note_limit),
            default_page_limit: config.api.default_page_limit,
            max_page_limit: config.api.max_page_limit,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            quota: QuotaPolicy::default(),
            default_page_limit: 100,
            max_page_limit: 1000,
        }
    }
}

/// Shared request machinery: token check, identity lookup, role check.
///
/// Every protected operation goes through [`Pipeline::authenticate`] first and
/// only uses the tenant id of the identity it returns.
pub struct Pipeline {
    store: Arc<dyn Store>,
    tokens: TokenService,
    passwords: PasswordService,
    identities: IdentityResolver,
    settings: PipelineSettings,
    // Hashed on first use; verified against when a login email has no user.
    decoy_digest: OnceCell<String>,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenService,
        passwords: PasswordService,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            identities: IdentityResolver::new(store.clone()),
            store,
            tokens,
            passwords,
            settings,
            decoy_digest: OnceCell::new(),
        }
    }

    pub fn from_config(store: Arc<dyn Store>, config: &AppConfig) -> Result<Self, ServiceError> {
        let tokens = TokenService::from_config(&config.security)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let passwords = PasswordService::from_config(&config.security)?;
        Ok(Self::new(store, tokens, passwords, PipelineSettings::from_config(config)))
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Token, then identity, then role. The first failing stage ends the request.
    pub async fn authenticate(&self, auth_header: Option<&str>, required: RoleSet) -> Result<Identity, ServiceError> {
        let token = auth_header.and_then(bearer_token).ok_or_else(|| {
            debug!("Request without bearer token");
            ServiceError::Unauthenticated
        })?;

        let claims = self.tokens.validate(token).map_err(|e| {
            debug!(reason = %e, "Token rejected");
            ServiceError::from(e)
        })?;

        let identity = self.identities.resolve(&claims).await?;

        if let Err(e) = authorize(identity.role, required) {
            warn!(
                user_id = identity.user_id(),
                tenant_id = identity.tenant_id(),
                role = %identity.role,
                "Role not permitted"
            );
            return Err(e.into());
        }

        Ok(identity)
    }

    pub fn page(&self, skip: Option<i64>, limit: Option<i64>) -> Page {
        Page::normalize(skip, limit, self.settings.default_page_limit, self.settings.max_page_limit)
    }

    pub async fn hash_password(&self, plaintext: String) -> Result<String, ServiceError> {
        let passwords = self.passwords.clone();
        tokio::task::spawn_blocking(move || passwords.hash(&plaintext))
            .await
            .map_err(|e| ServiceError::Internal(format!("password hashing task failed: {}", e)))?
            .map_err(ServiceError::from)
    }

    /// Spend one full verification on a throwaway digest.
    ///
    /// Login calls this when the email is unknown so both rejection paths cost the same.
    pub async fn verify_decoy(&self, plaintext: String) -> Result<(), ServiceError> {
        let digest = self
            .decoy_digest
            .get_or_try_init(|| self.hash_password("decoy-password-never-issued".to_string()))
            .await?
            .clone();
        self.verify_password(plaintext, digest).await?;
        Ok(())
    }

    /// A digest that cannot be parsed counts as a mismatch
    pub async fn verify_password(&self, plaintext: String, digest: String) -> Result<bool, ServiceError> {
        let passwords = self.passwords.clone();
        let outcome = tokio::task::spawn_blocking(move || passwords.verify(&plaintext, &digest))
            .await
            .map_err(|e| ServiceError::Internal(format!("password verification task failed: {}", e)))?;
        match outcome {
            Ok(matched) => Ok(matched),
            Err(e) => {
                warn!(reason = %e, "Stored password hash could not be parsed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenSubject;
    use crate::database::models::{NewTenant, NewUser};
    use crate::database::MemoryStore;
    use crate::types::{Role, SubscriptionPlan};
    use chrono::Duration;

    async fn pipeline_with_member() -> (Pipeline, TokenSubject) {
        let store = Arc::new(MemoryStore::new());
        let tenant = store
            .create_tenant(NewTenant {
                slug: "acme".to_string(),
                name: "Acme".to_string(),
                subscription_plan: SubscriptionPlan::Free,
            })
            .await
            .unwrap();
        let user = store
            .create_user(NewUser {
                tenant_id: tenant.id,
                email: "user@acme.test".to_string(),
                password_hash: String::new(),
                role: Role::Member,
            })
            .await
            .unwrap();
        let tokens = TokenService::new("pipeline-secret", "HS256", Duration::minutes(30)).unwrap();
        let pipeline = Pipeline::new(
            store,
            tokens,
            PasswordService::with_cost(8, 1, 1).unwrap(),
            PipelineSettings::default(),
        );
        let subject = TokenSubject {
            email: user.email,
            user_id: user.id,
            tenant_id: tenant.id,
            role: Role::Member,
        };
        (pipeline, subject)
    }

    #[tokio::test]
    async fn missing_or_bad_header_is_unauthenticated() {
        let (pipeline, _) = pipeline_with_member().await;
        for header in [None, Some("Token abc"), Some("Bearer not.a.token")] {
            assert!(matches!(
                pipeline.authenticate(header, RoleSet::ANY_MEMBER).await,
                Err(ServiceError::Unauthenticated)
            ));
        }
    }

    #[tokio::test]
    async fn member_passes_member_gate_only() {
        let (pipeline, subject) = pipeline_with_member().await;
        let header = format!("Bearer {}", pipeline.tokens().issue(&subject, None).unwrap());

        let identity = pipeline.authenticate(Some(&header), RoleSet::ANY_MEMBER).await.unwrap();
        assert_eq!(identity.tenant.slug, "acme");
        assert!(matches!(
            pipeline.authenticate(Some(&header), RoleSet::ADMIN_ONLY).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn unparseable_digest_verifies_false() {
        let (pipeline, _) = pipeline_with_member().await;
        assert!(!pipeline
            .verify_password("password".to_string(), "garbage".to_string())
            .await
            .unwrap());
        let digest = pipeline.hash_password("password".to_string()).await.unwrap();
        assert!(pipeline.verify_password("password".to_string(), digest).await.unwrap());
    }

    #[tokio::test]
    async fn decoy_is_a_real_digest_hashed_once() {
        let (pipeline, _) = pipeline_with_member().await;
        pipeline.verify_decoy("whatever".to_string()).await.unwrap();
        let first = pipeline.decoy_digest.get().cloned().unwrap();
        assert!(first.starts_with("$argon2id$"));

        pipeline.verify_decoy("again".to_string()).await.unwrap();
        assert_eq!(pipeline.decoy_digest.get(), Some(&first));
    }
}
