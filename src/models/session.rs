use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The identity record carried inside a sealed session cookie.
///
/// A payload is never mutated after it is sealed: every successful read
/// produces a fresh payload with the same `did` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// The caller's decentralized identifier. Opaque, never empty.
    pub did: String,
    /// Epoch milliseconds when the session was first issued.
    pub created_at: i64,
    /// Epoch milliseconds of the most recent successful validation.
    pub last_accessed: i64,
}

impl SessionPayload {
    /// A brand new session for `did`, created and accessed at `now_ms`.
    pub fn new(did: impl Into<String>, now_ms: i64) -> Self {
        Self {
            did: did.into(),
            created_at: now_ms,
            last_accessed: now_ms,
        }
    }
}

/// What an envelope decodes to before it is trusted.
///
/// Every field is optional: envelopes sealed by older releases may lack
/// `createdAt`, and garbage input decodes to an all-empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnsealedPayload {
    pub did: Option<String>,
    pub created_at: Option<i64>,
    pub last_accessed: Option<i64>,
}

impl UnsealedPayload {
    /// The identity, if present and non-empty.
    pub fn did(&self) -> Option<&str> {
        self.did.as_deref().filter(|did| !did.is_empty())
    }
}

impl From<SessionPayload> for UnsealedPayload {
    fn from(payload: SessionPayload) -> Self {
        Self {
            did: Some(payload.did),
            created_at: Some(payload.created_at),
            last_accessed: Some(payload.last_accessed),
        }
    }
}

/// Outcome of validating a request's session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResult {
    /// A valid session, refreshed, with the header that persists the refresh.
    Active {
        data: SessionPayload,
        set_cookie: String,
    },
    /// No usable session.
    Rejected { error: SessionError },
}

impl SessionResult {
    pub fn data(&self) -> Option<&SessionPayload> {
        match self {
            SessionResult::Active { data, .. } => Some(data),
            SessionResult::Rejected { .. } => None,
        }
    }

    /// The renewal `Set-Cookie` value. Present exactly when `data` is.
    pub fn set_cookie(&self) -> Option<&str> {
        match self {
            SessionResult::Active { set_cookie, .. } => Some(set_cookie),
            SessionResult::Rejected { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&SessionError> {
        match self {
            SessionResult::Active { .. } => None,
            SessionResult::Rejected { error } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<(SessionPayload, String), SessionError> {
        match self {
            SessionResult::Active { data, set_cookie } => Ok((data, set_cookie)),
            SessionResult::Rejected { error } => Err(error),
        }
    }
}

impl From<SessionError> for SessionResult {
    fn from(error: SessionError) -> Self {
        SessionResult::Rejected { error }
    }
}
