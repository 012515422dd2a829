//! Proxy credentials and `Proxy-Authorization` header construction.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use http::header::InvalidHeaderValue;
use http::HeaderValue;
use rand::Rng;
use std::ops::Range;

/// Marker inserted between the base username and the session id.
pub const SESSION_MARKER: &str = "-session-glob_rand";

/// Range the per-request session id is drawn from.
pub const SESSION_ID_RANGE: Range<u64> = 100_000_000_000..1_000_000_000_000;

/// Credentials sent to the upstream proxy.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Base username, before any session suffix.
    username: String,
    /// Proxy password.
    password: String,
    /// Append a fresh session id to the username on every request.
    randomize_session: bool,
}

/// Credentials resolved for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAuthorization {
    /// Username for this request, including the session suffix if enabled.
    pub username: String,
    /// Proxy password.
    pub password: String,
    /// Basic `Proxy-Authorization` value for `username:password`.
    pub header: HeaderValue,
}

impl Credentials {
    /// Create credentials from the configured username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>, randomize_session: bool) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            randomize_session,
        }
    }

    /// The configured base username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Username to send for one request. With session randomization enabled,
    /// every call yields a new session identity.
    pub fn session_username<R: Rng>(&self, rng: &mut R) -> String {
        if self.randomize_session {
            let session_id = rng.random_range(SESSION_ID_RANGE);
            format!("{}{}{}", self.username, SESSION_MARKER, session_id)
        } else {
            self.username.clone()
        }
    }

    /// Resolve the username, password and header value for one request.
    ///
    /// `http` validates the header value. `"Basic "` plus base64 output
    /// always passes, so the error only exists to avoid a panic path.
    pub fn authorize_with<R: Rng>(&self, rng: &mut R) -> Result<ProxyAuthorization, InvalidHeaderValue> {
        let username = self.session_username(rng);
        let header = HeaderValue::from_str(&proxy_auth_header(&username, &self.password))?;
        Ok(ProxyAuthorization {
            username,
            password: self.password.clone(),
            header,
        })
    }

    /// Build the `Proxy-Authorization` header value for one request.
    pub fn auth_header_with<R: Rng>(&self, rng: &mut R) -> String {
        proxy_auth_header(&self.session_username(rng), &self.password)
    }
}

/// Basic authentication header value for `user` and `password`.
pub fn proxy_auth_header(user: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{}:{}", user, password)))
}
