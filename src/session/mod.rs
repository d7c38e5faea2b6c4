//! Session tokens and cookies
//!
//! A session is a signed, expiring token stored in a cookie. There is no
//! server-side session table: a token whose MAC verifies and whose expiry is in
//! the future authenticates the request.
//!
//! Token layout: `hex(email) "." expires_unix "." hex(mac)` where `mac` is a
//! keyed BLAKE3 hash of the first two parts.

use axum::http::{header::COOKIE, HeaderMap};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::core::config::SessionConfig;

/// Where a successful login lands when no usable `next` was given
pub const DEFAULT_AFTER_LOGIN: &str = "/users";

const KEY_CONTEXT: &str = "hxdash 2023-11 session token signing key";

/// An authenticated session recovered from a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Email the session was issued to
    pub email: String,
    /// Expiry as seconds since the Unix epoch
    pub expires_at: u64,
}

/// Issues and verifies session tokens and formats the session cookie
#[derive(Clone)]
pub struct SessionKeys {
    key: [u8; 32],
    ttl_secs: u64,
    cookie_name: String,
    secure: bool,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl_secs", &self.ttl_secs)
            .field("cookie_name", &self.cookie_name)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    /// Build keys from configuration; an empty secret yields a random key
    pub fn from_config(config: &SessionConfig) -> Self {
        let key = if config.secret.is_empty() {
            debug!("no session secret configured, using a per-process key");
            rand::random()
        } else {
            blake3::derive_key(KEY_CONTEXT, config.secret.as_bytes())
        };

        Self {
            key,
            ttl_secs: config.ttl_secs,
            cookie_name: config.cookie_name.clone(),
            secure: config.secure,
        }
    }

    /// Name of the session cookie
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Issue a token for `email` valid from now
    pub fn issue(&self, email: &str) -> String {
        self.issue_at(email, now_unix())
    }

    /// Issue a token for `email` valid from `now`
    pub fn issue_at(&self, email: &str, now: u64) -> String {
        let payload = format!("{}.{}", hex::encode(email), now.saturating_add(self.ttl_secs));
        let mac = blake3::keyed_hash(&self.key, payload.as_bytes());
        format!("{}.{}", payload, mac.to_hex())
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Option<Session> {
        self.verify_at(token, now_unix())
    }

    /// Verify a token against `now`
    pub fn verify_at(&self, token: &str, now: u64) -> Option<Session> {
        let (payload, mac_hex) = token.rsplit_once('.')?;

        let mut mac = [0u8; 32];
        hex::decode_to_slice(mac_hex, &mut mac).ok()?;
        // `blake3::Hash` equality is constant time.
        if blake3::keyed_hash(&self.key, payload.as_bytes()) != blake3::Hash::from(mac) {
            debug!("session token signature mismatch");
            return None;
        }

        let (email_hex, expires) = payload.split_once('.')?;
        let expires_at: u64 = expires.parse().ok()?;
        if expires_at <= now {
            debug!(expires_at, "session token expired");
            return None;
        }

        let email = String::from_utf8(hex::decode(email_hex).ok()?).ok()?;
        Some(Session { email, expires_at })
    }

    /// Find and verify the session cookie among request headers
    pub fn from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        cookie_value(headers, &self.cookie_name).and_then(|token| self.verify(token))
    }

    /// `Set-Cookie` value installing `token`
    pub fn set_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name, token, self.ttl_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value removing the session cookie
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            self.cookie_name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Value of cookie `name`, searching every `Cookie` header
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

/// Login page URL carrying `next` as a percent-encoded return-to parameter
///
/// `/` is left as is; it is legal inside a query component.
pub fn login_url(next: Option<&str>) -> String {
    match next {
        Some(next) => format!(
            "/login?next={}",
            urlencoding::encode(next).replace("%2F", "/")
        ),
        None => "/login".to_string(),
    }
}

/// Accept `next` only when it is a local absolute path
///
/// The path must also be printable ASCII so it can go straight into a
/// `Location` header.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.contains("://")
                && path.bytes().all(|b| b.is_ascii_graphic()) =>
        {
            path
        }
        _ => DEFAULT_AFTER_LOGIN,
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
