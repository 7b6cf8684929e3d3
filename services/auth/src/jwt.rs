//! JWT service for session token generation and validation
//!
//! Tokens are HS256-signed and carry the user id plus issue and expiry
//! timestamps. Nothing is stored server side: a token is valid exactly when
//! its signature verifies and its expiry lies in the future.

use chrono::{DateTime, Utc};
use common::AppConfig;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret used to sign and verify tokens
    pub secret_key: String,
    /// Token lifetime in seconds (default: 24 hours)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Extract the token settings from the application configuration
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            secret_key: config.secret_key.clone(),
            token_expiry: config.token_ttl().as_secs(),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub user_id: i64,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Token failures
#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed token or expired token
    #[error("Token is invalid")]
    Invalid,

    /// Signing failed
    #[error("Failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_expiry: i64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            validation,
            token_expiry: i64::try_from(config.token_expiry).unwrap_or(i64::MAX),
        }
    }

    /// Generate a session token for a user
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Generate a session token as if issued at `now`
    pub fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            user_id,
            iat,
            exp: iat.saturating_add(self.token_expiry),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    /// Validate a token and return the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Validate a token against the clock value `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<i64, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                TokenError::Invalid
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            debug!("Rejected expired token for user {}", claims.user_id);
            return Err(TokenError::Invalid);
        }

        Ok(claims.user_id)
    }
}
