//! Sealed, sliding-expiry session cookies for DID-authenticated web apps.
//!
//! A session lives entirely in the cookie: an authenticated, encrypted
//! envelope around the caller's DID and two timestamps. Every successful
//! read reseals it with a fresh access time.

pub mod config;
pub mod error;
pub mod logger;
pub mod router;
pub mod state;

pub mod crypto {
    pub mod aes;
    pub mod seal;
}

pub mod models {
    pub mod session;
}

pub mod session {
    pub mod cookie;
    pub mod manager;
}

pub mod handlers {
    pub mod session;
}

pub mod middleware_layer {
    pub mod auth;
}

pub use config::SessionConfig;
pub use crypto::seal::{AesGcmSealer, Sealer};
pub use error::{ConfigurationError, SealError, SessionError, SessionErrorKind, UnsealError};
pub use logger::{NoopLogger, SessionLogger, TracingLogger};
pub use models::session::{SessionPayload, SessionResult, UnsealedPayload};
pub use session::manager::SessionManager;
