use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::clock::{Clock, SystemClock};
use crate::config::SecurityConfig;
use crate::types::Role;

/// Identity facts bound into a token at login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub email: String,
    pub user_id: i64,
    pub tenant_id: i64,
    pub role: Role,
}

/// Token payload. Field names are the wire format: `sub` carries the email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: i64,
    pub tenant_id: i64,
    pub role: Role,
    pub exp: i64,
}

impl Claims {
    pub fn email(&self) -> &str {
        &self.sub
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token generation failed: {0}")]
    Generation(String),
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("signing secret is empty")]
    MissingSecret,
}

/// Issues and validates HMAC-signed access tokens
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &str, algorithm: &str, default_ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let algorithm = match Algorithm::from_str(algorithm) {
            Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => alg,
            _ => return Err(TokenError::UnsupportedAlgorithm(algorithm.to_string())),
        };

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            default_ttl,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, TokenError> {
        let minutes = i64::try_from(config.access_token_expire_minutes).unwrap_or(i64::MAX / 60_000);
        Self::new(&config.jwt_secret, &config.jwt_algorithm, Duration::minutes(minutes))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign a token for `subject`, expiring `ttl` (or the configured default) from now
    pub fn issue(&self, subject: &TokenSubject, ttl: Option<Duration>) -> Result<String, TokenError> {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl.unwrap_or(self.default_ttl))
            .ok_or_else(|| TokenError::Generation("token lifetime overflows the clock".to_string()))?;
        let claims = Claims {
            sub: subject.email.clone(),
            user_id: subject.user_id,
            tenant_id: subject.tenant_id,
            role: subject.role,
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify signature and expiry, returning the signed claims unchanged
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        if data.claims.exp < self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}
