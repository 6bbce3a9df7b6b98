//! # Sessions and Flash Messages
//!
//! Both ride in signed cookies (see [`crate::codec`]) and are never stored
//! server side.
//!
//! ```text
//! taproom_session = sign({ sub, exp, nonce })          ← who is calling
//! taproom_flash   = sign({ exp, messages: [..] })      ← one-shot notices
//! ```
//!
//! Anything that fails verification, or whose `exp` has passed, is treated
//! as absent. Issuing sessions belongs to the login flow, which lives
//! outside this server; [`SessionManager::issue`] is the shared contract.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{self, CodecError, Signer};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "taproom_session";

/// Flash cookie name.
pub const FLASH_COOKIE: &str = "taproom_flash";

/// Oldest messages are dropped beyond this many, to bound cookie size.
pub const MAX_FLASH_MESSAGES: usize = 8;

/// Longest lifetime a session or flash token may carry (ten years).
pub const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Token lifetime clamped to `1..=MAX_TTL_SECS`, so expiry math cannot overflow.
fn bounded_ttl(ttl_secs: i64) -> Duration {
    Duration::seconds(ttl_secs.clamp(1, MAX_TTL_SECS))
}

// =============================================================================
// Session
// =============================================================================

/// Signed session claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    /// Absolute expiry, Unix seconds
    pub exp: i64,
    pub nonce: String,
}

/// Issues and verifies session tokens.
#[derive(Debug, Clone)]
pub struct SessionManager {
    signer: Signer,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(signer: Signer, ttl_secs: i64) -> Self {
        SessionManager {
            signer,
            ttl: bounded_ttl(ttl_secs),
        }
    }

    /// Mints a session token for `user_id`.
    pub fn issue(&self, user_id: &str) -> Result<String, CodecError> {
        self.sign(SessionClaims {
            sub: user_id.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
            nonce: codec::nonce(),
        })
    }

    /// Signs explicit claims.
    pub fn sign(&self, claims: SessionClaims) -> Result<String, CodecError> {
        self.signer.sign(&claims)
    }

    /// Verifies a token, including its expiry.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, CodecError> {
        let claims: SessionClaims = self.signer.verify(token)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(CodecError::Expired);
        }
        Ok(claims)
    }

    /// Claims of a valid, unexpired session, or `None`.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        match self.decode(token) {
            Ok(claims) => Some(claims),
            Err(err) => {
                debug!(error = %err, "Session rejected");
                None
            }
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

// =============================================================================
// Flash
// =============================================================================

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn new(level: FlashLevel, text: impl Into<String>) -> Self {
        FlashMessage {
            level,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlashPayload {
    exp: i64,
    messages: Vec<FlashMessage>,
}

/// Reads and appends flash messages.
#[derive(Debug, Clone)]
pub struct FlashManager {
    signer: Signer,
    ttl: Duration,
}

impl FlashManager {
    pub fn new(signer: Signer, ttl_secs: i64) -> Self {
        FlashManager {
            signer,
            ttl: bounded_ttl(ttl_secs),
        }
    }

    /// Messages carried by a token. Invalid or expired tokens carry none.
    pub fn read(&self, token: &str) -> Vec<FlashMessage> {
        match self.signer.verify::<FlashPayload>(token) {
            Ok(payload) if payload.exp > Utc::now().timestamp() => payload.messages,
            Ok(_) => {
                debug!("Flash expired");
                Vec::new()
            }
            Err(err) => {
                debug!(error = %err, "Flash rejected");
                Vec::new()
            }
        }
    }

    /// Appends `message` to whatever `existing` still carries and re-signs
    /// with a fresh expiry.
    pub fn push(&self, existing: Option<&str>, message: FlashMessage) -> Result<String, CodecError> {
        let mut messages = existing.map(|t| self.read(t)).unwrap_or_default();
        messages.push(message);
        if messages.len() > MAX_FLASH_MESSAGES {
            let excess = messages.len() - MAX_FLASH_MESSAGES;
            messages.drain(..excess);
        }

        self.encode(messages, (Utc::now() + self.ttl).timestamp())
    }

    fn encode(&self, messages: Vec<FlashMessage>, exp: i64) -> Result<String, CodecError> {
        self.signer.sign(&FlashPayload { exp, messages })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

// =============================================================================
// Cookie Helpers
// =============================================================================

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value storing `value` for `max_age_secs`.
pub fn set_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value deleting cookie `name`.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    set_cookie(name, "", 0, secure)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn signer() -> Signer {
        Signer::new([3u8; 32]).unwrap()
    }

    #[test]
    fn test_session_round_trip() {
        let sessions = SessionManager::new(signer(), 3600);
        let token = sessions.issue("user-1").unwrap();

        let claims = sessions.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_expired_session_is_absent() {
        let sessions = SessionManager::new(signer(), 3600);
        let token = sessions
            .sign(SessionClaims {
                sub: "user-1".to_string(),
                exp: Utc::now().timestamp() - 1,
                nonce: codec::nonce(),
            })
            .unwrap();

        // Signature is fine, expiry is not
        assert!(matches!(sessions.decode(&token), Err(CodecError::Expired)));
        assert!(sessions.verify(&token).is_none());
    }

    #[test]
    fn test_sessions_from_another_key_are_absent() {
        let ours = SessionManager::new(signer(), 3600);
        let theirs = SessionManager::new(Signer::ephemeral(), 3600);
        let token = theirs.issue("user-1").unwrap();
        assert!(ours.verify(&token).is_none());
    }

    #[test]
    fn test_flash_accumulates() {
        let flashes = FlashManager::new(signer(), 300);

        let token = flashes.push(None, FlashMessage::success("Order placed")).unwrap();
        let token = flashes
            .push(Some(&token), FlashMessage::info("Bar is busy"))
            .unwrap();

        let messages = flashes.read(&token);
        assert_eq!(
            messages,
            vec![
                FlashMessage::success("Order placed"),
                FlashMessage::info("Bar is busy"),
            ]
        );
    }

    #[test]
    fn test_flash_is_bounded() {
        let flashes = FlashManager::new(signer(), 300);
        let mut token: Option<String> = None;
        for n in 0..(MAX_FLASH_MESSAGES + 3) {
            token = Some(
                flashes
                    .push(token.as_deref(), FlashMessage::info(format!("m{n}")))
                    .unwrap(),
            );
        }

        let messages = flashes.read(token.as_deref().unwrap());
        assert_eq!(messages.len(), MAX_FLASH_MESSAGES);
        assert_eq!(messages[0].text, "m3");
    }

    #[test]
    fn test_expired_or_forged_flash_is_empty() {
        let flashes = FlashManager::new(signer(), 300);
        let expired = flashes
            .encode(vec![FlashMessage::info("old")], Utc::now().timestamp() - 5)
            .unwrap();
        assert!(flashes.read(&expired).is_empty());
        assert!(flashes.read("garbage").is_empty());

        // A bad existing cookie does not block new messages
        let token = flashes.push(Some("garbage"), FlashMessage::info("new")).unwrap();
        assert_eq!(flashes.read(&token).len(), 1);
    }

    #[test]
    fn test_out_of_range_ttl_is_clamped() {
        let flashes = FlashManager::new(signer(), 10_000_000_000_000);
        assert_eq!(flashes.ttl_secs(), MAX_TTL_SECS);
        let token = flashes.push(None, FlashMessage::info("far future")).unwrap();
        assert_eq!(flashes.read(&token).len(), 1);

        let sessions = SessionManager::new(signer(), i64::MAX);
        assert!(sessions.verify(&sessions.issue("user-1").unwrap()).is_some());

        assert_eq!(SessionManager::new(signer(), -5).ttl_secs(), 1);
    }

    #[test]
    fn test_flash_level_wire_names() {
        let json = serde_json::to_string(&FlashMessage::new(FlashLevel::Warning, "x")).unwrap();
        assert_eq!(json, r#"{"level":"warning","text":"x"}"#);
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; taproom_session=abc.def; other=1"),
        );

        assert_eq!(read_cookie(&headers, SESSION_COOKIE).as_deref(), Some("abc.def"));
        assert_eq!(read_cookie(&headers, "theme").as_deref(), Some("dark"));
        assert!(read_cookie(&headers, FLASH_COOKIE).is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = set_cookie(FLASH_COOKIE, "v", 300, true);
        assert!(cookie.starts_with("taproom_flash=v;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=300"));
        assert!(cookie.ends_with("; Secure"));

        assert!(clear_cookie(FLASH_COOKIE, false).contains("Max-Age=0"));
    }
}
