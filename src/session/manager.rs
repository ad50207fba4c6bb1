use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, Request, header::COOKIE};
use zeroize::Zeroizing;

use crate::config::{DEFAULT_COOKIE_NAME, DEFAULT_TTL_SECONDS, MIN_SECRET_LENGTH, SessionConfig};
use crate::crypto::seal::{AesGcmSealer, Sealer};
use crate::error::{ConfigurationError, SealError, SessionError, SessionErrorKind};
use crate::logger::{NoopLogger, SessionLogger};
use crate::models::session::{SessionPayload, SessionResult, now_millis};
use crate::session::cookie;

/// Issues, validates and refreshes sealed session cookies.
///
/// Immutable after construction. The cookie itself is the only session
/// state, so any number of requests can be validated concurrently.
pub struct SessionManager<S = AesGcmSealer> {
    secret: Zeroizing<Vec<u8>>,
    cookie_name: String,
    ttl_seconds: u64,
    logger: Arc<dyn SessionLogger>,
    sealer: S,
}

impl SessionManager<AesGcmSealer> {
    /// Creates a manager backed by the default AES-GCM sealer.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` if the secret is missing or shorter than
    /// `MIN_SECRET_LENGTH` bytes.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigurationError> {
        Self::with_sealer(config, AesGcmSealer)
    }
}

impl<S: Sealer> SessionManager<S> {
    /// Creates a manager that seals through `sealer`.
    pub fn with_sealer(config: SessionConfig, sealer: S) -> Result<Self, ConfigurationError> {
        let SessionConfig {
            secret,
            cookie_name,
            ttl_seconds,
            logger,
        } = config;

        if secret.is_empty() {
            return Err(ConfigurationError::MissingSecret);
        }
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigurationError::SecretTooShort {
                actual: secret.len(),
                minimum: MIN_SECRET_LENGTH,
            });
        }

        Ok(Self {
            secret,
            cookie_name: cookie_name.unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            ttl_seconds: ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS),
            logger: logger.unwrap_or_else(|| Arc::new(NoopLogger)),
            sealer,
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Validates the session cookie on `request` and refreshes it.
    ///
    /// All `Cookie` header fields are considered, joined the way HTTP/2
    /// peers split them. Never fails: every problem is classified into the
    /// returned `SessionResult`.
    ///
    /// The header is copied out before the returned future runs, so the
    /// future does not borrow `request`.
    pub fn get_session_from_request<'a, B>(
        &'a self,
        request: &Request<B>,
    ) -> impl Future<Output = SessionResult> + Send + use<'a, S, B> {
        let header = joined_cookie_header(request.headers());
        async move { self.get_session_from_cookie_header(header.as_deref()).await }
    }

    /// Same as `get_session_from_request`, on a raw `Cookie` header value.
    pub async fn get_session_from_cookie_header(&self, header: Option<&str>) -> SessionResult {
        let Some(header) = header.filter(|h| cookie::mentions_cookie(h, &self.cookie_name)) else {
            self.logger.debug("No session cookie", &[&self.cookie_name]);
            return SessionError::new(SessionErrorKind::NoCookie).into();
        };

        let Some(raw) = cookie::find_cookie_value(header, &self.cookie_name) else {
            self.logger.warn("Session cookie name matched no cookie pair", &[&self.cookie_name]);
            return SessionError::new(SessionErrorKind::InvalidCookie).into();
        };

        let sealed = match urlencoding::decode(raw) {
            Ok(sealed) => sealed,
            Err(e) => {
                self.logger.warn("Session cookie is not valid UTF-8 once decoded", &[&e]);
                return SessionError::with_detail(SessionErrorKind::InvalidCookie, e.to_string())
                    .into();
            }
        };

        self.decode_and_refresh(&sealed).await
    }

    /// The single path that turns a sealed value into a refreshed session.
    ///
    /// Cookies and handed-off tokens both end up here.
    async fn decode_and_refresh(&self, sealed: &str) -> SessionResult {
        let unsealed = match self.sealer.unseal(sealed, &self.secret).await {
            Ok(unsealed) => unsealed,
            Err(e) => {
                self.logger.warn("Failed to unseal session cookie", &[&e]);
                return SessionError::with_detail(SessionErrorKind::SessionExpired, e.to_string())
                    .into();
            }
        };

        let Some(did) = unsealed.did() else {
            self.logger.warn("Unsealed session carries no identity", &[]);
            return SessionError::new(SessionErrorKind::InvalidCookie).into();
        };

        let now = now_millis();
        let data = SessionPayload {
            did: did.to_string(),
            created_at: unsealed.created_at.unwrap_or(now),
            last_accessed: refreshed_access_time(unsealed.last_accessed, now),
        };

        match self.create_session(&data).await {
            Ok(set_cookie) => {
                self.logger.debug("Session validated", &[&data.did]);
                SessionResult::Active { data, set_cookie }
            }
            Err(e) => {
                self.logger.error("Failed to reseal refreshed session", &[&e]);
                SessionError::with_detail(SessionErrorKind::Unknown, e.to_string()).into()
            }
        }
    }

    /// Seals `payload` and returns the `Set-Cookie` value that stores it.
    ///
    /// # Errors
    ///
    /// Only if the sealing primitive itself fails.
    pub async fn create_session(&self, payload: &SessionPayload) -> Result<String, SealError> {
        let sealed = self
            .sealer
            .seal(payload, &self.secret, self.ttl_seconds)
            .await?;

        Ok(cookie::session_cookie_header(
            &self.cookie_name,
            &urlencoding::encode(&sealed),
            self.ttl_seconds,
        ))
    }

    /// The `Set-Cookie` value that makes the client drop its session.
    pub fn get_clear_cookie_header(&self) -> String {
        cookie::clear_cookie_header(&self.cookie_name)
    }

    /// Seals a fresh session for `did` as a bare token.
    ///
    /// The token is meant for channels other than `Set-Cookie`, such as a
    /// mobile handoff URL. It is validated only by presenting it later as
    /// the session cookie value.
    pub async fn seal_token(&self, did: &str) -> Result<String, SealError> {
        let payload = SessionPayload::new(did, now_millis());
        self.sealer
            .seal(&payload, &self.secret, self.ttl_seconds)
            .await
    }
}

impl<S> fmt::Debug for SessionManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("cookie_name", &self.cookie_name)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

fn joined_cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    match values.as_slice() {
        [] => None,
        many => Some(many.join("; ")),
    }
}

/// New access time for a refreshed session. Always later than `previous`.
fn refreshed_access_time(previous: Option<i64>, now: i64) -> i64 {
    match previous {
        Some(previous) if previous >= now => previous.saturating_add(1),
        _ => now,
    }
}
