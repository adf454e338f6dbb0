//! Session configuration.
//!
//! Read from the environment at startup. The cipher key and IV fall back to a
//! development default with a warning, the same way a missing signing secret
//! is handled elsewhere; a real deployment must provision its own.

use chrono::Duration;
use thiserror::Error;

pub const CRYPTO_KEY_VAR: &str = "TELEXPENSE_CRYPTO_KEY";
pub const CRYPTO_IV_VAR: &str = "TELEXPENSE_CRYPTO_IV";
pub const SESSION_TTL_HOURS_VAR: &str = "TELEXPENSE_SESSION_TTL_HOURS";
pub const COOKIE_PATH_VAR: &str = "TELEXPENSE_COOKIE_PATH";
pub const LOGIN_ROUTE_VAR: &str = "TELEXPENSE_LOGIN_ROUTE";

const DEV_CRYPTO_KEY: &str = "telexpense-insecure-dev-key-0001";
const DEV_CRYPTO_IV: &str = "telexpense-iv-01";
const DEFAULT_TTL_HOURS: i64 = 24;
/// Longest accepted record lifetime (one year).
pub const MAX_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Cipher key, one byte per character (16, 24 or 32 characters).
    pub crypto_key: String,
    /// Initialization vector, one byte per character (16 characters).
    pub crypto_iv: String,
    /// Lifetime of the `user` and `menu` records.
    pub record_ttl: Duration,
    /// Path scope of the `user` and `menu` records.
    pub cookie_path: String,
    /// Where unauthenticated navigation is sent.
    pub login_route: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            crypto_key: DEV_CRYPTO_KEY.to_string(),
            crypto_iv: DEV_CRYPTO_IV.to_string(),
            record_ttl: Duration::hours(DEFAULT_TTL_HOURS),
            cookie_path: "/".to_string(),
            login_route: "/login".to_string(),
        }
    }
}

impl core::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("crypto_key", &"<redacted>")
            .field("crypto_iv", &"<redacted>")
            .field("record_ttl", &self.record_ttl)
            .field("cookie_path", &self.cookie_path)
            .field("login_route", &self.login_route)
            .finish()
    }
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let crypto_key = non_empty(CRYPTO_KEY_VAR).unwrap_or_else(|| {
            tracing::warn!("{CRYPTO_KEY_VAR} not set; using insecure dev default");
            defaults.crypto_key.clone()
        });
        let crypto_iv = non_empty(CRYPTO_IV_VAR).unwrap_or_else(|| {
            tracing::warn!("{CRYPTO_IV_VAR} not set; using insecure dev default");
            defaults.crypto_iv.clone()
        });

        let record_ttl = match non_empty(SESSION_TTL_HOURS_VAR) {
            Some(raw) => {
                let hours: i64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                    var: SESSION_TTL_HOURS_VAR,
                    reason: format!("{e}"),
                })?;
                if !(1..=MAX_TTL_HOURS).contains(&hours) {
                    return Err(ConfigError::Invalid {
                        var: SESSION_TTL_HOURS_VAR,
                        reason: format!("must be between 1 and {MAX_TTL_HOURS}, got {hours}"),
                    });
                }
                Duration::try_hours(hours).ok_or_else(|| ConfigError::Invalid {
                    var: SESSION_TTL_HOURS_VAR,
                    reason: format!("{hours} hours is out of range"),
                })?
            }
            None => defaults.record_ttl,
        };

        Ok(Self {
            crypto_key,
            crypto_iv,
            record_ttl,
            cookie_path: non_empty(COOKIE_PATH_VAR).unwrap_or(defaults.cookie_path),
            login_route: non_empty(LOGIN_ROUTE_VAR).unwrap_or(defaults.login_route),
        })
    }
}
