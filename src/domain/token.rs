//! Issued bearer token record.

use chrono::{DateTime, Utc};

/// One issued bearer token. Deleting the record revokes the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    /// Identifier embedded in the signed token (`jti` claim)
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
