//! # Signed Payload Codec
//!
//! Compact authenticated tokens carried in cookies.
//!
//! ## Token Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   base64url(json(payload))  "."  base64url(HMAC-SHA256(key, part₁))     │
//! │   └──────── part₁ ────────┘      └──────────── part₂ ─────────────┘     │
//! │                                                                         │
//! │  sign:   encode payload, tag the encoded bytes, join with "."          │
//! │  verify: split, recompute tag, constant-time compare, then decode      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is stored server side. A token is only as long-lived as the key:
//! with an ephemeral key, every token dies with the process.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Minimum key length in bytes (256 bits).
pub const MIN_KEY_LEN: usize = 32;

/// Why a token was rejected.
///
/// Callers outside this module treat every variant the same: no payload.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Token is malformed")]
    Malformed,

    #[error("Signature mismatch")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Key must be at least {MIN_KEY_LEN} bytes, got {len}")]
    KeyTooShort { len: usize },

    #[error("Base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// HMAC-SHA256 signer over base64url JSON payloads.
#[derive(Clone)]
pub struct Signer {
    key: Arc<[u8]>,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("key", &"<redacted>").finish()
    }
}

impl Signer {
    /// Creates a signer from configured key material.
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, CodecError> {
        let key = key.as_ref();
        if key.len() < MIN_KEY_LEN {
            return Err(CodecError::KeyTooShort { len: key.len() });
        }
        Ok(Signer { key: key.into() })
    }

    /// Creates a signer with a random per-process key.
    pub fn ephemeral() -> Self {
        let mut key = [0u8; MIN_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Signer {
            key: key.as_slice().into(),
        }
    }

    /// Derives an independent signer for one purpose, so a token minted for
    /// one cookie never verifies as another.
    pub fn derive(&self, purpose: &str) -> Result<Self, CodecError> {
        Ok(Signer {
            key: self.tag(purpose.as_bytes())?.into(),
        })
    }

    /// Signs `payload` into a `payload.tag` token.
    pub fn sign<T: Serialize>(&self, payload: &T) -> Result<String, CodecError> {
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload)?);
        let tag = URL_SAFE_NO_PAD.encode(self.tag(body.as_bytes())?);
        Ok(format!("{body}.{tag}"))
    }

    /// Verifies a token and decodes its payload.
    ///
    /// The tag is checked before the payload is decoded.
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, CodecError> {
        let (body, tag) = token.split_once('.').ok_or(CodecError::Malformed)?;
        if body.is_empty() || tag.is_empty() {
            return Err(CodecError::Malformed);
        }

        let presented = URL_SAFE_NO_PAD.decode(tag)?;
        let expected = self.tag(body.as_bytes())?;
        if !constant_time_eq::constant_time_eq(&presented, &expected) {
            return Err(CodecError::BadSignature);
        }

        let json = URL_SAFE_NO_PAD.decode(body)?;
        Ok(serde_json::from_slice(&json)?)
    }

    fn tag(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key)
            .map_err(|_| CodecError::KeyTooShort { len: self.key.len() })?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Random URL-safe nonce.
pub fn nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        sub: String,
        n: i64,
    }

    fn signer() -> Signer {
        Signer::new([7u8; 32]).unwrap()
    }

    fn payload() -> Payload {
        Payload {
            sub: "user-1".to_string(),
            n: 42,
        }
    }

    #[test]
    fn test_round_trip() {
        let s = signer();
        let token = s.sign(&payload()).unwrap();
        assert_eq!(token.matches('.').count(), 1);
        assert_eq!(s.verify::<Payload>(&token).unwrap(), payload());
    }

    #[test]
    fn test_any_flipped_byte_fails() {
        let s = signer();
        let token = s.sign(&payload()).unwrap();

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] ^= 0x01;
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(
                s.verify::<Payload>(&tampered).is_err(),
                "flip at {i} verified: {tampered}"
            );
        }
    }

    #[test]
    fn test_malformed_tokens() {
        let s = signer();
        for token in ["", ".", "abc", "abc.", ".abc", "a.b.c"] {
            assert!(s.verify::<Payload>(token).is_err(), "{token:?} verified");
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let token = signer().sign(&payload()).unwrap();
        let other = Signer::new([8u8; 32]).unwrap();
        assert!(matches!(
            other.verify::<Payload>(&token),
            Err(CodecError::BadSignature)
        ));
    }

    #[test]
    fn test_short_key_rejected() {
        assert!(matches!(
            Signer::new(b"too short"),
            Err(CodecError::KeyTooShort { len: 9 })
        ));
    }

    #[test]
    fn test_derived_signers_are_independent() {
        let root = signer();
        let session = root.derive("session").unwrap();
        let flash = root.derive("flash").unwrap();

        let token = flash.sign(&payload()).unwrap();
        assert!(flash.verify::<Payload>(&token).is_ok());
        assert!(session.verify::<Payload>(&token).is_err());
        assert!(root.verify::<Payload>(&token).is_err());
    }

    #[test]
    fn test_ephemeral_keys_differ() {
        let token = Signer::ephemeral().sign(&payload()).unwrap();
        assert!(Signer::ephemeral().verify::<Payload>(&token).is_err());
    }

    #[test]
    fn test_nonce_is_unique() {
        assert_ne!(nonce(), nonce());
    }
}
