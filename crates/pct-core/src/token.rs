//! The persisted claims token record.

use crate::claims::Claims;
use crate::code::generate_code;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime used when the configured value is not positive.
pub const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// Longest accepted lifetime, about 68 years.
pub const MAX_LIFETIME_SECS: i64 = i32::MAX as i64;

/// Resolve the token lifetime from a configured number of seconds.
///
/// Values outside `1..=MAX_LIFETIME_SECS` select [`DEFAULT_LIFETIME_SECS`].
pub fn effective_lifetime(configured_secs: i64) -> Duration {
    if (1..=MAX_LIFETIME_SECS).contains(&configured_secs) {
        Duration::seconds(configured_secs)
    } else {
        Duration::seconds(DEFAULT_LIFETIME_SECS)
    }
}

/// A persisted claims token.
///
/// Only `claims` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimsToken {
    /// Opaque unique code; also the lookup key.
    pub code: String,
    /// Client the token was created for.
    pub client_id: String,
    /// Accumulated claims.
    #[serde(default)]
    pub claims: Claims,
    /// When the token was created.
    pub created_at: DateTime<Utc>,
    /// When the token becomes eligible for deletion.
    pub expires_at: DateTime<Utc>,
}

impl ClaimsToken {
    /// Create a token with a fresh code and no claims, expiring after `lifetime`.
    pub fn new(client_id: impl Into<String>, lifetime: Duration) -> Self {
        Self::issued_at(generate_code(), client_id, Utc::now(), lifetime)
    }

    /// Create a token with an explicit code and creation instant.
    ///
    /// An expiration past the representable range saturates.
    pub fn issued_at(
        code: impl Into<String>,
        client_id: impl Into<String>,
        created_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            code: code.into(),
            client_id: client_id.into(),
            claims: Claims::new(),
            created_at,
            expires_at: created_at
                .checked_add_signed(lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Check whether the token is past its expiration at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Check whether the token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
