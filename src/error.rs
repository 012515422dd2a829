//! Error types for the reqwest-proxy-rotator crate.

use std::path::PathBuf;
use thiserror::Error;

/// Error returned when every proxy in the pool has been blacklisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No proxy available in pool")]
pub struct NoProxyAvailable;

/// Error returned when the rotator cannot be built from its settings.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("missing required setting `{0}`")]
    MissingField(&'static str),

    #[error("setting `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("proxy list is empty")]
    EmptyProxyList,

    #[error("failed to read proxies file {}: {source}", path.display())]
    ProxiesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error returned while assigning a proxy to a request.
#[derive(Debug, Error)]
pub enum RotatorError {
    #[error(transparent)]
    NoProxyAvailable(#[from] NoProxyAvailable),

    /// `http` rejected the `Proxy-Authorization` value. A base64 Basic
    /// credential is always valid, so this is not expected in practice.
    #[error("invalid Proxy-Authorization header: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

/// Error returned while turning an endpoint into a `reqwest::Proxy`.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid proxy endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}
