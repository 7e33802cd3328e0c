use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use thiserror::Error;

/// Placeholder secret shipped with the development preset. Refused outside development.
pub const DEVELOPMENT_SECRET: &str = "development-secret-change-me";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub quota: QuotaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. When unset the server runs on the in-memory store.
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub default_page_limit: u64,
    pub max_page_limit: u64,
    pub seed_demo_data: bool,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub access_token_expire_minutes: u64,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub password_parallelism: u32,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub free_note_limit: u64,
}

/// One year
pub const MAX_TOKEN_LIFETIME_MINUTES: u64 = 60 * 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set to a non-default value in {0:?}")]
    InsecureSecret(Environment),
    #[error("API_DEFAULT_PAGE_LIMIT ({default}) must be between 1 and API_MAX_PAGE_LIMIT ({max})")]
    InvalidPageLimits { default: u64, max: u64 },
    #[error("ACCESS_TOKEN_EXPIRE_MINUTES must be greater than zero")]
    ZeroTokenLifetime,
    #[error("ACCESS_TOKEN_EXPIRE_MINUTES must be at most {max} (got {got})")]
    TokenLifetimeTooLong { got: u64, max: u64 },
}

// Keep the signing secret out of logs.
impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("password_memory_kib", &self.password_memory_kib)
            .field("password_iterations", &self.password_iterations)
            .field("password_parallelism", &self.password_parallelism)
            .field("enable_cors", &self.enable_cors)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (process env in production, maps in tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = lookup("API_PORT").or_else(|| lookup("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("API_DEFAULT_PAGE_LIMIT") {
            self.api.default_page_limit = v.parse().unwrap_or(self.api.default_page_limit);
        }
        if let Some(v) = lookup("API_MAX_PAGE_LIMIT") {
            self.api.max_page_limit = v.parse().unwrap_or(self.api.max_page_limit);
        }
        if let Some(v) = lookup("SEED_DEMO_DATA") {
            self.api.seed_demo_data = v.parse().unwrap_or(self.api.seed_demo_data);
        }

        // Security overrides
        if let Some(v) = lookup("SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("ALGORITHM") {
            self.security.jwt_algorithm = v.trim().to_uppercase();
        }
        if let Some(v) = lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.security.access_token_expire_minutes =
                v.parse().unwrap_or(self.security.access_token_expire_minutes);
        }
        if let Some(v) = lookup("PASSWORD_HASH_MEMORY_KIB") {
            self.security.password_memory_kib = v.parse().unwrap_or(self.security.password_memory_kib);
        }
        if let Some(v) = lookup("PASSWORD_HASH_ITERATIONS") {
            self.security.password_iterations = v.parse().unwrap_or(self.security.password_iterations);
        }
        if let Some(v) = lookup("PASSWORD_HASH_PARALLELISM") {
            self.security.password_parallelism = v.parse().unwrap_or(self.security.password_parallelism);
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Quota overrides
        if let Some(v) = lookup("FREE_PLAN_NOTE_LIMIT") {
            self.quota.free_note_limit = v.parse().unwrap_or(self.quota.free_note_limit);
        }

        self
    }

    /// Reject configurations that must never reach a running server
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment != Environment::Development {
            let secret = self.security.jwt_secret.trim();
            if secret.is_empty() || secret == DEVELOPMENT_SECRET {
                return Err(ConfigError::InsecureSecret(self.environment));
            }
        }
        if self.api.default_page_limit == 0 || self.api.default_page_limit > self.api.max_page_limit {
            return Err(ConfigError::InvalidPageLimits {
                default: self.api.default_page_limit,
                max: self.api.max_page_limit,
            });
        }
        if self.security.access_token_expire_minutes == 0 {
            return Err(ConfigError::ZeroTokenLifetime);
        }
        if self.security.access_token_expire_minutes > MAX_TOKEN_LIFETIME_MINUTES {
            return Err(ConfigError::TokenLifetimeTooLong {
                got: self.security.access_token_expire_minutes,
                max: MAX_TOKEN_LIFETIME_MINUTES,
            });
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                default_page_limit: 100,
                max_page_limit: 1000,
                seed_demo_data: true,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_SECRET.to_string(),
                jwt_algorithm: "HS256".to_string(),
                access_token_expire_minutes: 30,
                password_memory_kib: 19 * 1024,
                password_iterations: 2,
                password_parallelism: 1,
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
            quota: QuotaConfig { free_note_limit: 3 },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                default_page_limit: 100,
                max_page_limit: 500,
                seed_demo_data: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_algorithm: "HS256".to_string(),
                access_token_expire_minutes: 30,
                password_memory_kib: 19 * 1024,
                password_iterations: 2,
                password_parallelism: 1,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            quota: QuotaConfig { free_note_limit: 3 },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                default_page_limit: 100,
                max_page_limit: 100,
                seed_demo_data: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_algorithm: "HS256".to_string(),
                access_token_expire_minutes: 30,
                password_memory_kib: 64 * 1024,
                password_iterations: 3,
                password_parallelism: 1,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            quota: QuotaConfig { free_note_limit: 3 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.security.access_token_expire_minutes, 30);
        assert_eq!(config.quota.free_note_limit, 3);
        assert!(config.database.url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_apply() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://notes@localhost/notes"),
            ("SECRET_KEY", "s3cret"),
            ("ALGORITHM", "hs512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
            ("FREE_PLAN_NOTE_LIMIT", "10"),
            ("PORT", "8080"),
            ("SECURITY_CORS_ORIGINS", "https://a.test, https://b.test,"),
        ]));
        assert_eq!(config.database.url.as_deref(), Some("postgres://notes@localhost/notes"));
        assert_eq!(config.security.jwt_algorithm, "HS512");
        assert_eq!(config.security.access_token_expire_minutes, 5);
        assert_eq!(config.quota.free_note_limit, 10);
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.security.cors_origins, vec!["https://a.test", "https://b.test"]);
    }

    #[test]
    fn test_production_requires_real_secret() {
        let config = AppConfig::from_lookup(lookup_from(&[("APP_ENV", "production")]));
        assert_eq!(config.validate(), Err(ConfigError::InsecureSecret(Environment::Production)));

        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "prod"),
            ("SECRET_KEY", DEVELOPMENT_SECRET),
        ]));
        assert!(config.validate().is_err());

        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("SECRET_KEY", "a-long-random-production-secret"),
        ]));
        assert!(config.validate().is_ok());
        assert!(!config.api.seed_demo_data);
    }

    #[test]
    fn test_page_limits_are_checked() {
        let config = AppConfig::from_lookup(lookup_from(&[("API_DEFAULT_PAGE_LIMIT", "5000")]));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPageLimits { .. })));
    }

    #[test]
    fn test_token_lifetime_is_bounded() {
        let config = AppConfig::from_lookup(lookup_from(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "0")]));
        assert_eq!(config.validate(), Err(ConfigError::ZeroTokenLifetime));

        let config = AppConfig::from_lookup(lookup_from(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "10000000000000")]));
        assert!(matches!(config.validate(), Err(ConfigError::TokenLifetimeTooLong { .. })));

        let max = MAX_TOKEN_LIFETIME_MINUTES.to_string();
        let config = AppConfig::from_lookup(lookup_from(&[("ACCESS_TOKEN_EXPIRE_MINUTES", max.as_str())]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_output_redacts_secret() {
        let config = AppConfig::from_lookup(lookup_from(&[("SECRET_KEY", "super-secret-value")]));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
