//! The sealing primitive: authenticated, encrypted, TTL-bound envelopes.
//!
//! Envelope layout is `ds1.<nonce>.<ciphertext>`, both parts base64url
//! without padding. The plaintext is JSON `{"exp": <ms|null>, "data": ...}`
//! and the version tag is bound as associated data.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::crypto::aes::{self, NONCE_SIZE, SecureKey};
use crate::error::{SealError, UnsealError};
use crate::models::session::{SessionPayload, UnsealedPayload, now_millis};

/// Version tag at the front of every envelope.
pub const SEAL_VERSION: &str = "ds1";

const SEPARATOR: char = '.';

/// Seals payloads into opaque strings and opens them again.
#[async_trait]
pub trait Sealer: Send + Sync {
    /// Seals `payload` so it is accepted for `ttl_seconds`. Zero means no expiry.
    async fn seal(
        &self,
        payload: &SessionPayload,
        secret: &[u8],
        ttl_seconds: u64,
    ) -> Result<String, SealError>;

    /// Opens an envelope.
    ///
    /// Input that is not shaped like an envelope at all yields an empty
    /// payload rather than an error.
    async fn unseal(&self, envelope: &str, secret: &[u8]) -> Result<UnsealedPayload, UnsealError>;
}

#[derive(Serialize, Deserialize)]
struct SealedBody<T> {
    exp: Option<i64>,
    data: T,
}

/// AES-256-GCM sealer keyed by SHA-256 of the secret.
#[derive(Debug, Default, Clone, Copy)]
pub struct AesGcmSealer;

impl AesGcmSealer {
    pub(crate) fn seal_at(
        &self,
        payload: &SessionPayload,
        secret: &[u8],
        ttl_seconds: u64,
        now_ms: i64,
    ) -> Result<String, SealError> {
        let exp = match ttl_seconds {
            0 => None,
            ttl => {
                let ttl_ms = i64::try_from(ttl.saturating_mul(1000)).unwrap_or(i64::MAX);
                Some(now_ms.saturating_add(ttl_ms))
            }
        };

        let plaintext = sonic_rs::to_vec(&SealedBody { exp, data: payload })
            .map_err(|e| SealError::Serialization(e.to_string()))?;

        let key = SecureKey::derive(secret);
        let (ciphertext, nonce) = aes::encrypt(&key, &plaintext, SEAL_VERSION.as_bytes())
            .map_err(|e| SealError::Encryption(e.to_string()))?;

        Ok(format!(
            "{SEAL_VERSION}{SEPARATOR}{}{SEPARATOR}{}",
            URL_SAFE_NO_PAD.encode(nonce),
            URL_SAFE_NO_PAD.encode(ciphertext),
        ))
    }

    pub(crate) fn unseal_at(
        &self,
        envelope: &str,
        secret: &[u8],
        now_ms: i64,
    ) -> Result<UnsealedPayload, UnsealError> {
        let parts: Vec<&str> = envelope.split(SEPARATOR).collect();
        let [version, nonce, ciphertext] = parts.as_slice() else {
            return Ok(UnsealedPayload::default());
        };
        if *version != SEAL_VERSION {
            return Ok(UnsealedPayload::default());
        }

        let nonce: [u8; NONCE_SIZE] = URL_SAFE_NO_PAD
            .decode(nonce)
            .map_err(|e| UnsealError::Malformed(format!("nonce: {e}")))?
            .try_into()
            .map_err(|_| UnsealError::Malformed("nonce: wrong length".to_string()))?;
        let ciphertext = URL_SAFE_NO_PAD
            .decode(ciphertext)
            .map_err(|e| UnsealError::Malformed(format!("ciphertext: {e}")))?;

        let key = SecureKey::derive(secret);
        let plaintext = aes::decrypt(&key, &ciphertext, &nonce, SEAL_VERSION.as_bytes())
            .map_err(|_| UnsealError::Authentication)?;

        let body: SealedBody<UnsealedPayload> = sonic_rs::from_slice(&plaintext)
            .map_err(|e| UnsealError::Malformed(format!("body: {e}")))?;

        match body.exp {
            Some(exp) if now_ms >= exp => Err(UnsealError::Expired),
            _ => Ok(body.data),
        }
    }
}

#[async_trait]
impl Sealer for AesGcmSealer {
    async fn seal(
        &self,
        payload: &SessionPayload,
        secret: &[u8],
        ttl_seconds: u64,
    ) -> Result<String, SealError> {
        self.seal_at(payload, secret, ttl_seconds, now_millis())
    }

    async fn unseal(&self, envelope: &str, secret: &[u8]) -> Result<UnsealedPayload, UnsealError> {
        self.unseal_at(envelope, secret, now_millis())
    }
}
