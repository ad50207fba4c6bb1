use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Raised when a `SessionManager` is constructed with an unusable configuration.
///
/// This is a programmer error: the manager refuses to exist rather than
/// failing later on a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No secret was supplied.
    #[error("session secret is required")]
    MissingSecret,

    /// The secret is shorter than the minimum length.
    #[error("session secret must be at least {minimum} bytes, got {actual}")]
    SecretTooShort { actual: usize, minimum: usize },
}

/// Failure while sealing a payload into an envelope.
#[derive(Error, Debug)]
pub enum SealError {
    /// The payload could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The cipher rejected the input.
    #[error("Encryption failed: {0}")]
    Encryption(String),
}

/// Failure while opening an envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsealError {
    /// The envelope has the right shape but its parts cannot be decoded.
    #[error("Malformed seal: {0}")]
    Malformed(String),

    /// Tampered ciphertext or wrong secret.
    #[error("Bad seal authentication")]
    Authentication,

    /// The embedded expiry has elapsed.
    #[error("Expired seal")]
    Expired,
}

/// Classified reason a request carries no usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionErrorKind {
    /// The named cookie is absent from the request.
    NoCookie,
    /// The cookie is present but unparsable, or carries no identity.
    InvalidCookie,
    /// The sealing primitive rejected the envelope.
    SessionExpired,
    /// Anything else that went wrong while handling the cookie.
    Unknown,
}

impl SessionErrorKind {
    /// The stable wire code for this kind.
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoCookie => "NO_COOKIE",
            Self::InvalidCookie => "INVALID_COOKIE",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// The message safe to show to an untrusted caller.
    pub const fn public_message(self) -> &'static str {
        match self {
            Self::NoCookie => "No session cookie",
            Self::InvalidCookie => "Invalid session cookie",
            Self::SessionExpired => "Session expired",
            Self::Unknown => "Session could not be read",
        }
    }
}

impl fmt::Display for SessionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A per-request session failure.
///
/// `Display` only renders the public message. The underlying cause, if
/// any, is kept in `detail` for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    kind: SessionErrorKind,
    detail: Option<String>,
}

impl SessionError {
    pub fn new(kind: SessionErrorKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: SessionErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    pub fn kind(&self) -> SessionErrorKind {
        self.kind
    }

    /// Diagnostic detail. Never send this to the client.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.kind.public_message())
    }
}

impl std::error::Error for SessionError {}

/// The HTTP layer's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The request has no usable session.
    #[error("Session rejected: {0}")]
    Session(SessionError),

    /// A sealing error.
    #[error("Seal error: {0}")]
    Seal(#[from] SealError),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<SessionError> for AppError {
    fn from(error: SessionError) -> Self {
        AppError::Session(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Session(ref e) => {
                match e.kind() {
                    SessionErrorKind::NoCookie => tracing::debug!("Session rejected: {}", e.kind()),
                    _ => tracing::warn!("Session rejected: {}", e.kind()),
                }
                (StatusCode::UNAUTHORIZED, e.kind().code().to_string())
            }

            AppError::Seal(ref e) => {
                tracing::error!("Seal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Seal error".to_string())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, [(http::header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_hides_detail() {
        let error =
            SessionError::with_detail(SessionErrorKind::SessionExpired, "Bad seal authentication");
        let rendered = error.to_string();
        assert_eq!(rendered, "SESSION_EXPIRED: Session expired");
        assert_eq!(error.detail(), Some("Bad seal authentication"));
    }

    #[test]
    fn kind_serializes_as_code() {
        let json = sonic_rs::to_string(&SessionErrorKind::InvalidCookie).unwrap();
        assert_eq!(json, "\"INVALID_COOKIE\"");
    }

    #[test]
    fn session_rejection_is_unauthorized() {
        let response =
            AppError::from(SessionError::new(SessionErrorKind::NoCookie)).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
