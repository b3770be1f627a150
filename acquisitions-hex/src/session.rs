//! Signed session tokens.
//!
//! A token is `<user_id>.<role>.<expires_unix>.<signature>` where the
//! signature is hex HMAC-SHA256 over everything before the last dot. The
//! role travels as a raw claim; admission control decides what it means.

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use acquisitions_types::{Actor, Role, UserId};

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Default token lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Why a presented token was rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// Signs and verifies session tokens.
pub struct SessionKeys {
    secret: Vec<u8>,
    ttl: Duration,
    secure_cookies: bool,
}

impl SessionKeys {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl,
            secure_cookies: false,
        }
    }

    /// Keys with a fresh random secret; sessions do not survive a restart.
    pub fn random(ttl: Duration) -> Self {
        let secret: [u8; 32] = rand::random();
        Self::new(secret, ttl)
    }

    /// Marks issued cookies `Secure`.
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Issues a token that expires `ttl` after `now_unix`.
    pub fn issue_at(&self, user_id: UserId, role: Role, now_unix: i64) -> String {
        let expires = now_unix + self.ttl.as_secs() as i64;
        let payload = format!("{}.{}.{}", user_id, role, expires);
        let signature = self.sign(&payload);
        format!("{}.{}", payload, signature)
    }

    pub fn issue(&self, user_id: UserId, role: Role) -> String {
        self.issue_at(user_id, role, chrono::Utc::now().timestamp())
    }

    /// Verifies a token as of `now_unix`.
    pub fn verify_at(&self, token: &str, now_unix: i64) -> Result<Actor, SessionError> {
        let (payload, signature) = token.rsplit_once('.').ok_or(SessionError::Malformed)?;

        let expected = self.sign(payload);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(SessionError::BadSignature);
        }

        let mut parts = payload.splitn(3, '.');
        let (Some(user_id), Some(role), Some(expires)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SessionError::Malformed);
        };

        let user_id: UserId = user_id.parse().map_err(|_| SessionError::Malformed)?;
        let expires: i64 = expires.parse().map_err(|_| SessionError::Malformed)?;

        if now_unix >= expires {
            return Err(SessionError::Expired);
        }

        Ok(Actor {
            user_id,
            role: role.to_string(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Actor, SessionError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// `Set-Cookie` value carrying a fresh token.
    pub fn cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; Path=/; SameSite=Strict; Max-Age={}{}",
            SESSION_COOKIE,
            token,
            self.ttl.as_secs(),
            if self.secure_cookies { "; Secure" } else { "" }
        )
    }

    /// `Set-Cookie` value that clears the session.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; Path=/; SameSite=Strict; Max-Age=0{}",
            SESSION_COOKIE,
            if self.secure_cookies { "; Secure" } else { "" }
        )
    }
}

/// Finds a named cookie in a `Cookie` header value.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn keys() -> SessionKeys {
        SessionKeys::new("test-secret", DEFAULT_TTL)
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys();
        let user_id = UserId::new();
        let token = keys.issue_at(user_id, Role::Admin, NOW);

        let actor = keys.verify_at(&token, NOW + 60).unwrap();

        assert_eq!(actor.user_id, user_id);
        assert_eq!(actor.role, "admin");
    }

    #[test]
    fn test_expired_token() {
        let keys = keys();
        let token = keys.issue_at(UserId::new(), Role::User, NOW);

        let result = keys.verify_at(&token, NOW + DEFAULT_TTL.as_secs() as i64);

        assert_eq!(result, Err(SessionError::Expired));
    }

    #[test]
    fn test_tampered_role_fails_signature() {
        let keys = keys();
        let token = keys.issue_at(UserId::new(), Role::Guest, NOW);
        let forged = token.replacen(".guest.", ".admin.", 1);

        assert_eq!(keys.verify_at(&forged, NOW), Err(SessionError::BadSignature));
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = keys().issue_at(UserId::new(), Role::User, NOW);
        let other = SessionKeys::new("another-secret", DEFAULT_TTL);

        assert_eq!(other.verify_at(&token, NOW), Err(SessionError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(keys().verify_at("garbage", NOW), Err(SessionError::Malformed));
    }

    #[test]
    fn test_random_keys_differ() {
        let a = SessionKeys::random(DEFAULT_TTL);
        let b = SessionKeys::random(DEFAULT_TTL);
        let token = a.issue_at(UserId::new(), Role::User, NOW);

        assert!(a.verify_at(&token, NOW).is_ok());
        assert!(b.verify_at(&token, NOW).is_err());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = keys().with_secure_cookies(true).cookie("abc");
        assert_eq!(
            cookie,
            "token=abc; HttpOnly; Path=/; SameSite=Strict; Max-Age=900; Secure"
        );
        assert!(keys().clear_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_find_cookie() {
        let header = "theme=dark; token=abc.def; other=1";
        assert_eq!(find_cookie(header, "token"), Some("abc.def"));
        assert_eq!(find_cookie(header, "missing"), None);
    }
}
