//! Session Token Service
//!
//! Issues, verifies and refreshes HMAC-signed session tokens.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use kernel::id::TokenId;

use crate::application::config::{AuthConfig, REFRESH_THRESHOLD};
use crate::domain::entity::SessionClaims;
use crate::domain::value_object::Role;
use crate::error::{AuthError, AuthResult};

/// Signs and verifies session tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    issuer: String,
    lifetime: Duration,
    refresh_threshold: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a new [`TokenService`] signing with HS256.
    pub fn new(secret: &str, issuer: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
            lifetime,
            refresh_threshold: REFRESH_THRESHOLD,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_issuer.clone(), config.token_lifetime)
            .with_refresh_threshold(config.refresh_threshold)
    }

    pub fn with_refresh_threshold(mut self, threshold: Duration) -> Self {
        self.refresh_threshold = threshold;
        self
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Mint a token for an account
    pub fn generate_token(&self, account_id: &str, email: &str, role: Role) -> AuthResult<String> {
        if account_id.trim().is_empty() {
            return Err(AuthError::MalformedParameters(
                "account id must not be empty".into(),
            ));
        }

        let now = Utc::now().timestamp();
        let exp = i64::try_from(self.lifetime.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or_else(|| AuthError::Internal("token lifetime out of range".into()))?;
        let claims = SessionClaims {
            user_id: account_id.to_string(),
            email: email.to_string(),
            account_type: role,
            jti: TokenId::new().to_string(),
            iss: self.issuer.clone(),
            sub: account_id.to_string(),
            iat: now,
            nbf: now,
            exp,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Verify a token and return its claims
    pub fn validate_token(&self, token: &str) -> AuthResult<SessionClaims> {
        let header = decode_header(token)
            .map_err(|e| AuthError::InvalidToken(format!("malformed token: {}", e)))?;

        if !matches!(header.alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AuthError::InvalidToken(format!(
                "unexpected signing method: {:?}",
                header.alg
            )));
        }

        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "sub"]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Re-issue a token close to expiry.
    ///
    /// Returns the input unchanged while more than the refresh threshold remains.
    pub fn refresh_token(&self, token: &str) -> AuthResult<String> {
        let claims = self.validate_token(token)?;

        let remaining = claims.remaining(Utc::now());
        let threshold = chrono::Duration::from_std(self.refresh_threshold)
            .unwrap_or(chrono::Duration::MAX);

        if remaining > threshold {
            return Ok(token.to_string());
        }

        tracing::debug!(user_id = %claims.user_id, "Refreshing session token");
        self.generate_token(&claims.user_id, &claims.email, claims.account_type)
    }
}
