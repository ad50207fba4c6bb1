use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use zeroize::Zeroizing;

use crate::logger::SessionLogger;

/// Cookie name used when none is configured.
pub const DEFAULT_COOKIE_NAME: &str = "did_session";
/// One week.
pub const DEFAULT_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
/// Shortest secret a `SessionManager` accepts, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;
/// Listen address used when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Caller-supplied settings for a `SessionManager`.
///
/// Validation happens in `SessionManager::new`, not here.
#[derive(Clone)]
pub struct SessionConfig {
    /// The shared sealing secret.
    pub secret: Zeroizing<Vec<u8>>,
    /// Cookie name, `DEFAULT_COOKIE_NAME` when `None`.
    pub cookie_name: Option<String>,
    /// Envelope and cookie lifetime, `DEFAULT_TTL_SECONDS` when `None`.
    pub ttl_seconds: Option<u64>,
    /// Logger, `NoopLogger` when `None`.
    pub logger: Option<Arc<dyn SessionLogger>>,
}

impl SessionConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            cookie_name: None,
            ttl_seconds: None,
            logger: None,
        }
    }

    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = Some(cookie_name.into());
        self
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn SessionLogger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"[REDACTED]")
            .field("cookie_name", &self.cookie_name)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("logger", &self.logger.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// The server's configuration.
#[derive(Clone)]
pub struct Config {
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The sealing secret shared with whatever mints sessions.
    pub session_secret: Zeroizing<Vec<u8>>,
    /// Optional cookie name override.
    pub cookie_name: Option<String>,
    /// Optional session lifetime override, in seconds.
    pub session_ttl_seconds: Option<u64>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a `Config` from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_secret = lookup("SESSION_SECRET")
            .context("SESSION_SECRET must be set (generate with: openssl rand -hex 32)")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("Invalid BIND_ADDR")?;

        let session_ttl_seconds = lookup("SESSION_TTL_SECONDS")
            .map(|raw| raw.parse::<u64>())
            .transpose()
            .context("Invalid SESSION_TTL_SECONDS")?;

        Ok(Self {
            bind_addr,
            session_secret: Zeroizing::new(session_secret.into_bytes()),
            cookie_name: lookup("SESSION_COOKIE_NAME").filter(|name| !name.is_empty()),
            session_ttl_seconds,
        })
    }

    /// The `SessionConfig` this server runs its manager with.
    pub fn session_config(&self, logger: Arc<dyn SessionLogger>) -> SessionConfig {
        SessionConfig {
            secret: self.session_secret.clone(),
            cookie_name: self.cookie_name.clone(),
            ttl_seconds: self.session_ttl_seconds,
            logger: Some(logger),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("session_secret", &"[REDACTED]")
            .field("cookie_name", &self.cookie_name)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn requires_secret() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET"));
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup_from(&[(
            "SESSION_SECRET",
            "0123456789abcdef0123456789abcdef",
        )]))
        .unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(config.cookie_name, None);
        assert_eq!(config.session_ttl_seconds, None);
        assert_eq!(config.session_secret.len(), 32);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SESSION_SECRET", "0123456789abcdef0123456789abcdef"),
            ("SESSION_COOKIE_NAME", "sid"),
            ("SESSION_TTL_SECONDS", "3600"),
            ("BIND_ADDR", "0.0.0.0:8080"),
        ]))
        .unwrap();

        assert_eq!(config.cookie_name.as_deref(), Some("sid"));
        assert_eq!(config.session_ttl_seconds, Some(3600));
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn rejects_bad_ttl() {
        let err = Config::from_lookup(lookup_from(&[
            ("SESSION_SECRET", "0123456789abcdef0123456789abcdef"),
            ("SESSION_TTL_SECONDS", "a week"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SESSION_TTL_SECONDS"));
    }

    #[test]
    fn debug_redacts_secret() {
        let config = SessionConfig::new("super-secret-value-that-is-long-enough");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
