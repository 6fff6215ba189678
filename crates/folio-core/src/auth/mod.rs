//! Admin session auth
//!
//! A single shared password, taken from `ADMIN_PASSWORD`, unlocks editing. A
//! successful login issues a session token that carries its issue time and a
//! digest binding that time to the password, so changing the password revokes
//! every outstanding session.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::application::errors::FieldError;
use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Upper bound on a configured session lifetime, one year
const MAX_SESSION_TTL_HOURS: u64 = 24 * 366;

/// Opaque session token handed to the admin after login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Result of checking a presented token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Valid,
    Expired,
    Invalid,
}

impl SessionStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, SessionStatus::Valid)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::Valid => "valid",
            SessionStatus::Expired => "expired",
            SessionStatus::Invalid => "invalid",
        })
    }
}

/// Shared-password gate for the admin surface
#[derive(Clone)]
pub struct AdminAuth {
    password: Option<String>,
    session_ttl: Duration,
}

impl fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAuth")
            .field("configured", &self.is_configured())
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

impl AdminAuth {
    pub fn from_config(config: &AuthConfig) -> Self {
        let hours = config.session_ttl_hours.min(MAX_SESSION_TTL_HOURS) as i64;
        Self {
            password: config.admin_password.clone(),
            session_ttl: Duration::hours(hours),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Compare `candidate` with the admin password
    ///
    /// Always false when no password is configured.
    pub fn verify_password(&self, candidate: &str) -> bool {
        match &self.password {
            Some(password) => {
                Sha256::digest(candidate.as_bytes()) == Sha256::digest(password.as_bytes())
            }
            None => {
                warn!("ADMIN_PASSWORD not configured");
                false
            }
        }
    }

    /// Log in with `candidate`, issuing a token stamped with `now`
    pub fn issue_session(&self, candidate: &str, now: DateTime<Utc>) -> Result<SessionToken> {
        let Some(password) = &self.password else {
            return Err(Error::not_configured(["ADMIN_PASSWORD"]));
        };
        if candidate.is_empty() {
            return Err(Error::ValidationFailed(
                vec![FieldError::new("password", "Password is required")].into(),
            ));
        }
        if !self.verify_password(candidate) {
            return Err(Error::Unauthorized("Invalid password".to_string()));
        }

        let issued_ms = now.timestamp_millis();
        let payload = format!("{}:{}", issued_ms, session_digest(password, issued_ms));
        debug!(issued_ms, "Issued admin session");
        Ok(SessionToken(URL_SAFE_NO_PAD.encode(payload)))
    }

    /// Classify a presented token at time `now`
    pub fn check_session(&self, token: &str, now: DateTime<Utc>) -> SessionStatus {
        let Some(password) = &self.password else {
            return SessionStatus::Invalid;
        };
        let Some((issued_ms, digest)) = parse_token(token) else {
            return SessionStatus::Invalid;
        };
        if digest != session_digest(password, issued_ms) {
            return SessionStatus::Invalid;
        }
        let Some(issued_at) = Utc.timestamp_millis_opt(issued_ms).single() else {
            return SessionStatus::Invalid;
        };

        if issued_at > now {
            SessionStatus::Invalid
        } else if now - issued_at > self.session_ttl {
            SessionStatus::Expired
        } else {
            SessionStatus::Valid
        }
    }
}

fn session_digest(password: &str, issued_ms: i64) -> String {
    hex::encode(Sha256::digest(format!("{}:{}", password, issued_ms).as_bytes()))
}

fn parse_token(token: &str) -> Option<(i64, String)> {
    let bytes = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
    let payload = String::from_utf8(bytes).ok()?;
    let (issued, digest) = payload.split_once(':')?;
    Some((issued.parse().ok()?, digest.to_string()))
}
