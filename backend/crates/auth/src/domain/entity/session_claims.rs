//! Session Claims
//!
//! Payload of the signed session token.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{AccountId, Role};
use crate::error::{AuthError, AuthResult};

/// Identity and registered claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: String,
    pub email: String,
    pub account_type: Role,
    /// Unique token id
    pub jti: String,
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn role(&self) -> Role {
        self.account_type
    }

    pub fn account_id(&self) -> AuthResult<AccountId> {
        self.user_id
            .parse()
            .map_err(|_| AuthError::InvalidToken("user_id is not a valid id".into()))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Time left before expiry, negative once expired
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let secs = self.exp.saturating_sub(now.timestamp());
        Duration::try_seconds(secs).unwrap_or(if secs > 0 { Duration::MAX } else { Duration::MIN })
    }
}
