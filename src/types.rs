/// Shared types used across the codebase

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role a user holds inside their tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// Subscription plan of a tenant. Only ever moves FREE -> PRO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    Free,
    Pro,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Pro => "pro",
        }
    }
}

impl FromStr for SubscriptionPlan {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(SubscriptionPlan::Free),
            "pro" => Ok(SubscriptionPlan::Pro),
            other => Err(UnknownVariant {
                kind: "subscription plan",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offset pagination window for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Page {
    /// Clamp raw query parameters: negative skip becomes 0, a missing or
    /// non-positive limit falls back to `default_limit`, and anything above
    /// `max_limit` is capped.
    pub fn normalize(skip: Option<i64>, limit: Option<i64>, default_limit: u64, max_limit: u64) -> Self {
        let skip = skip.filter(|s| *s > 0).unwrap_or(0) as u64;
        let limit = match limit {
            Some(l) if l > 0 => (l as u64).min(max_limit),
            _ => default_limit.min(max_limit),
        };
        Self { skip, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_use_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::from_str::<Role>("\"member\"").unwrap(), Role::Member);
        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
    }

    #[test]
    fn plans_parse_from_storage_text() {
        assert_eq!("pro".parse::<SubscriptionPlan>().unwrap(), SubscriptionPlan::Pro);
        let err = "gold".parse::<SubscriptionPlan>().unwrap_err();
        assert_eq!(err.to_string(), "unknown subscription plan 'gold'");
    }

    #[test]
    fn page_normalization_clamps_inputs() {
        assert_eq!(Page::normalize(None, None, 100, 1000), Page { skip: 0, limit: 100 });
        assert_eq!(Page::normalize(Some(-5), Some(0), 100, 1000), Page { skip: 0, limit: 100 });
        assert_eq!(Page::normalize(Some(20), Some(5000), 100, 1000), Page { skip: 20, limit: 1000 });
        assert_eq!(Page::normalize(Some(3), Some(7), 100, 1000), Page { skip: 3, limit: 7 });
    }
}
