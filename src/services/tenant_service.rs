use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{ensure_same_tenant, RoleSet};
use crate::database::models::Tenant;
use crate::services::error::ServiceError;
use crate::services::pipeline::Pipeline;
use crate::types::SubscriptionPlan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeResponse {
    pub message: String,
    pub subscription_plan: SubscriptionPlan,
}

/// Caller's tenant with its current quota usage
#[derive(Debug, Clone, Serialize)]
pub struct TenantOverview {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub note_count: u64,
    /// `None` when the plan is unlimited
    pub note_limit: Option<u64>,
}

#[derive(Clone)]
pub struct TenantService {
    pipeline: Arc<Pipeline>,
}

impl TenantService {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Move the tenant named by `slug` to PRO. Only an admin of that same tenant may do this.
    /// Upgrading a tenant that is already PRO succeeds and changes nothing.
    pub async fn upgrade_tenant(&self, auth_header: Option<&str>, slug: &str) -> Result<UpgradeResponse, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ADMIN_ONLY).await?;
        let store = self.pipeline.store();

        let target = store
            .find_tenant_by_slug(slug)
            .await?
            .ok_or(ServiceError::NotFound("Tenant"))?;

        if let Err(e) = ensure_same_tenant(identity.tenant_id(), target.id) {
            warn!(
                user_id = identity.user_id(),
                tenant_id = identity.tenant_id(),
                target_tenant_id = target.id,
                "Cross-tenant upgrade refused"
            );
            return Err(e.into());
        }

        let upgraded = store
            .update_tenant_plan(target.id, SubscriptionPlan::Pro)
            .await?
            .ok_or(ServiceError::NotFound("Tenant"))?;

        info!(tenant_id = upgraded.id, user_id = identity.user_id(), "Tenant upgraded to pro");
        Ok(UpgradeResponse {
            message: "Tenant successfully upgraded to Pro plan".to_string(),
            subscription_plan: upgraded.subscription_plan,
        })
    }

    pub async fn current_tenant(&self, auth_header: Option<&str>) -> Result<TenantOverview, ServiceError> {
        let identity = self.pipeline.authenticate(auth_header, RoleSet::ANY_MEMBER).await?;
        let note_count = self.pipeline.store().count_notes_by_tenant(identity.tenant_id()).await?;
        let note_limit = self.pipeline.settings().quota.limit_for(identity.tenant.subscription_plan);
        Ok(TenantOverview {
            tenant: identity.tenant,
            note_count,
            note_limit,
        })
    }
}
