//! services/api/src/web/session.rs
//!
//! Signed, per-browser session cookie carrying an anonymous user id.
//!
//! The cookie value is `user_<8 hex>.<hex sha256(secret || 0x00 || user id)>`.
//! There is no server-side session store; a cookie is valid for as long as the
//! browser keeps it and the secret does not change.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{error, info};
use uuid::Uuid;

use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "sc_session";

/// Used for chat exchanges that arrive without a valid session.
pub const ANONYMOUS_USER: &str = "anonymous";

/// The session's user id, inserted into request extensions by [`session_layer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser(pub Option<String>);

impl SessionUser {
    pub fn id_or_anonymous(&self) -> &str {
        self.0.as_deref().unwrap_or(ANONYMOUS_USER)
    }
}

/// Signs and verifies session cookies.
#[derive(Clone)]
pub struct SessionKeys {
    secret: Vec<u8>,
}

impl SessionKeys {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// A per-process secret. Cookies issued with it do not survive a restart.
    pub fn ephemeral() -> Self {
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self::new(secret)
    }

    /// Creates a fresh user id and the cookie value that carries it.
    pub fn issue(&self) -> (String, String) {
        let user_id = new_user_id();
        let value = format!("{}.{}", user_id, self.sign(&user_id));
        (user_id, value)
    }

    /// Returns the user id of a well-formed cookie value with a valid signature.
    pub fn verify(&self, value: &str) -> Option<String> {
        let (user_id, signature) = value.rsplit_once('.')?;
        if !is_user_id(user_id) {
            return None;
        }
        let expected = self.sign(user_id);
        let valid: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();
        valid.then(|| user_id.to_string())
    }

    fn sign(&self, user_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update([0u8]);
        hasher.update(user_id.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn new_user_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("user_{}", &random[..8])
}

fn is_user_id(candidate: &str) -> bool {
    candidate
        .strip_prefix("user_")
        .is_some_and(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Reads the raw session cookie value from the request headers.
pub fn cookie_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            c.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
}

/// Middleware that resolves the session cookie into a [`SessionUser`].
///
/// A visit to the index page without a valid cookie is assigned a new session.
pub async fn session_layer(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let user = cookie_value(req.headers()).and_then(|v| state.sessions.verify(v));
    let is_index = req.uri().path() == "/";

    let (user, new_cookie) = match user {
        Some(user) => (Some(user), None),
        None if is_index => {
            let (user_id, value) = state.sessions.issue();
            info!(user_id = %user_id, "New session");
            (Some(user_id), Some(value))
        }
        None => (None, None),
    };

    req.extensions_mut().insert(SessionUser(user));
    let mut response = next.run(req).await;

    if let Some(value) = new_cookie {
        let cookie = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, value);
        match HeaderValue::from_str(&cookie) {
            Ok(v) => {
                response.headers_mut().append(header::SET_COOKIE, v);
            }
            Err(e) => error!("Failed to build session cookie: {:?}", e),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_cookie_verifies() {
        let keys = SessionKeys::new("secret");
        let (user_id, value) = keys.issue();
        assert!(is_user_id(&user_id));
        assert_eq!(keys.verify(&value), Some(user_id));
    }

    #[test]
    fn tampered_or_foreign_cookies_are_rejected() {
        let keys = SessionKeys::new("secret");
        let (_, value) = keys.issue();
        let (_, signature) = value.rsplit_once('.').unwrap();

        assert_eq!(keys.verify(&format!("user_deadbeef.{}", signature)), None);
        assert_eq!(SessionKeys::new("other").verify(&value), None);
        assert_eq!(keys.verify("garbage"), None);
        assert_eq!(keys.verify(""), None);
    }

    #[test]
    fn cookie_value_finds_session_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sc_session=user_01234567.abc; other=1"),
        );
        assert_eq!(cookie_value(&headers), Some("user_01234567.abc"));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sc_session_old=x"));
        assert_eq!(cookie_value(&headers), None);
    }

    #[test]
    fn anonymous_fallback() {
        assert_eq!(SessionUser(None).id_or_anonymous(), "anonymous");
        assert_eq!(
            SessionUser(Some("user_01234567".into())).id_or_anonymous(),
            "user_01234567"
        );
    }
}
