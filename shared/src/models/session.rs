//! Session and authentication token models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// A locally persisted authenticated session
///
/// At most one valid session exists at a time; logging in replaces any
/// prior session atomically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Instant at which the access token stops being valid
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    /// Whether the access token has passed its expiry instant
    ///
    /// An expired session still carries a usable refresh token; only
    /// the access token is dead.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Token pair returned by the authentication endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl AuthTokens {
    /// Absolute expiry instant for a token received just now
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.expires_in)
    }
}
