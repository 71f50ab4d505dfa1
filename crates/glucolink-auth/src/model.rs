//! Login inputs and outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials plus the region to try first.
#[derive(Clone)]
pub struct LoginRequest {
    /// Lowercase country code or `global`
    pub region: String,
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(
        region: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("region", &self.region)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Authenticated, region-bound session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub account_id: String,
    /// Server-confirmed region, already normalized
    pub region: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("account_id", &self.account_id)
            .field("region", &self.region)
            .finish()
    }
}

/// Result of one authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success(Session),
    /// Provider answered with a non-zero status
    Failure { status: i64 },
    /// Transport or parse failure before any status was read
    Unknown,
}

impl AuthOutcome {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthOutcome::Success(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }
}
