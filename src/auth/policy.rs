//! Pure authorization and quota decisions. Nothing here touches storage.

use serde::Serialize;
use thiserror::Error;

use crate::types::{Role, SubscriptionPlan};

/// Set of roles permitted to perform an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(&'static [Role]);

impl RoleSet {
    /// Tenant management and user administration
    pub const ADMIN_ONLY: RoleSet = RoleSet(&[Role::Admin]);
    /// Note CRUD and self-service reads
    pub const ANY_MEMBER: RoleSet = RoleSet(&[Role::Admin, Role::Member]);

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("role '{role}' is not permitted to perform this operation")]
    RoleNotPermitted { role: Role },
    #[error("resource belongs to a different tenant")]
    CrossTenant,
}

pub fn authorize(role: Role, required: RoleSet) -> Result<(), PolicyError> {
    if required.contains(role) {
        Ok(())
    } else {
        Err(PolicyError::RoleNotPermitted { role })
    }
}

/// Guard for operations that name a tenant explicitly (the upgrade-by-slug path)
pub fn ensure_same_tenant(caller_tenant_id: i64, target_tenant_id: i64) -> Result<(), PolicyError> {
    if caller_tenant_id == target_tenant_id {
        Ok(())
    } else {
        Err(PolicyError::CrossTenant)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
#[error("note limit of {limit} reached for the {plan} plan")]
pub struct QuotaExceeded {
    pub plan: SubscriptionPlan,
    pub limit: u64,
}

/// Note count limits per subscription plan. PRO is unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub free_note_limit: u64,
}

impl QuotaPolicy {
    pub const DEFAULT_FREE_NOTE_LIMIT: u64 = 3;

    pub fn new(free_note_limit: u64) -> Self {
        Self { free_note_limit }
    }

    pub fn limit_for(&self, plan: SubscriptionPlan) -> Option<u64> {
        match plan {
            SubscriptionPlan::Free => Some(self.free_note_limit),
            SubscriptionPlan::Pro => None,
        }
    }

    /// Decide whether one more note may be created given `current_count`
    pub fn check(&self, plan: SubscriptionPlan, current_count: u64) -> Result<(), QuotaExceeded> {
        match self.limit_for(plan) {
            Some(limit) if current_count >= limit => Err(QuotaExceeded { plan, limit }),
            _ => Ok(()),
        }
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FREE_NOTE_LIMIT)
    }
}

/// Quota check with the default limits
pub fn check_note_quota(plan: SubscriptionPlan, current_count: u64) -> Result<(), QuotaExceeded> {
    QuotaPolicy::default().check(plan, current_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_only_rejects_members() {
        assert!(authorize(Role::Admin, RoleSet::ADMIN_ONLY).is_ok());
        assert_eq!(
            authorize(Role::Member, RoleSet::ADMIN_ONLY),
            Err(PolicyError::RoleNotPermitted { role: Role::Member })
        );
    }

    #[test]
    fn any_member_admits_both_roles() {
        assert!(authorize(Role::Admin, RoleSet::ANY_MEMBER).is_ok());
        assert!(authorize(Role::Member, RoleSet::ANY_MEMBER).is_ok());
    }

    #[test]
    fn tenant_guard_compares_ids() {
        assert!(ensure_same_tenant(1, 1).is_ok());
        assert_eq!(ensure_same_tenant(1, 2), Err(PolicyError::CrossTenant));
    }

    #[test]
    fn free_plan_stops_at_three() {
        for count in 0..3 {
            assert!(check_note_quota(SubscriptionPlan::Free, count).is_ok());
        }
        assert_eq!(
            check_note_quota(SubscriptionPlan::Free, 3),
            Err(QuotaExceeded { plan: SubscriptionPlan::Free, limit: 3 })
        );
        assert!(check_note_quota(SubscriptionPlan::Free, 42).is_err());
    }

    #[test]
    fn pro_plan_is_unlimited() {
        assert!(check_note_quota(SubscriptionPlan::Pro, 0).is_ok());
        assert!(check_note_quota(SubscriptionPlan::Pro, 3).is_ok());
        assert!(check_note_quota(SubscriptionPlan::Pro, u64::MAX).is_ok());
        assert_eq!(QuotaPolicy::default().limit_for(SubscriptionPlan::Pro), None);
    }

    #[test]
    fn configured_limit_is_respected() {
        let policy = QuotaPolicy::new(10);
        assert!(policy.check(SubscriptionPlan::Free, 9).is_ok());
        assert!(policy.check(SubscriptionPlan::Free, 10).is_err());
    }
}
