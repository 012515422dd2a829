//! Configuration for the proxy rotator.

use crate::error::ConfigurationError;
use crate::utils;

use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Raw settings mapping as supplied by the host, e.g. deserialized from a
/// crawler settings file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyRotatorSettings {
    /// Proxy username.
    pub username: Option<String>,
    /// Proxy password.
    pub password: Option<String>,
    /// Path to a newline-delimited list of proxy endpoints.
    pub proxies_file: Option<PathBuf>,
    /// Status codes that remove the serving proxy from rotation.
    pub remove_proxy_for_status_codes: Option<Vec<u16>>,
    /// Generate a fresh session username for every request.
    #[serde(default, alias = "LUMINATI_RANDOM")]
    pub randomize_session: Option<bool>,
    /// Blacklist proxies automatically when a response matches the removal codes.
    #[serde(default)]
    pub auto_blacklist: Option<bool>,
}

/// Validated configuration for the proxy rotator.
#[derive(Debug, Clone)]
pub struct ProxyRotatorConfig {
    /// Proxy endpoints, in the order they were loaded.
    pub proxies: Vec<String>,
    /// Proxy username.
    pub username: String,
    /// Proxy password.
    pub password: String,
    /// Append a random session id to the username on every request.
    pub randomize_session: bool,
    /// Status codes that remove the serving proxy from rotation.
    pub remove_proxy_for_status_codes: HashSet<u16>,
    /// Whether the middleware blacklists proxies on matching responses.
    pub auto_blacklist: bool,
}

impl ProxyRotatorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProxyRotatorConfigBuilder {
        ProxyRotatorConfigBuilder::new()
    }

    /// Build a configuration from a host settings mapping, reading the proxies file.
    pub fn from_settings(settings: ProxyRotatorSettings) -> Result<Self, ConfigurationError> {
        let username = settings
            .username
            .ok_or(ConfigurationError::MissingField("username"))?;
        let password = settings
            .password
            .ok_or(ConfigurationError::MissingField("password"))?;
        let proxies_file = settings
            .proxies_file
            .ok_or(ConfigurationError::MissingField("proxies_file"))?;
        let codes = settings
            .remove_proxy_for_status_codes
            .ok_or(ConfigurationError::MissingField("remove_proxy_for_status_codes"))?;

        let mut builder = Self::builder()
            .proxies(utils::read_proxies(&proxies_file)?)
            .username(username)
            .password(password)
            .remove_proxy_for_status_codes(codes);
        if let Some(randomize) = settings.randomize_session {
            builder = builder.randomize_session(randomize);
        }
        if let Some(auto) = settings.auto_blacklist {
            builder = builder.auto_blacklist(auto);
        }
        builder.build()
    }
}

/// Builder for `ProxyRotatorConfig`.
pub struct ProxyRotatorConfigBuilder {
    proxies: Vec<String>,
    username: Option<String>,
    password: Option<String>,
    randomize_session: Option<bool>,
    remove_proxy_for_status_codes: Option<HashSet<u16>>,
    auto_blacklist: Option<bool>,
}

impl ProxyRotatorConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            proxies: Vec::new(),
            username: None,
            password: None,
            randomize_session: None,
            remove_proxy_for_status_codes: None,
            auto_blacklist: None,
        }
    }

    /// Set the proxy endpoints.
    pub fn proxies(mut self, proxies: Vec<impl Into<String>>) -> Self {
        self.proxies = proxies.into_iter().map(Into::into).collect();
        self
    }

    /// Set the proxy username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the proxy password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enable or disable per-request session usernames.
    pub fn randomize_session(mut self, enabled: bool) -> Self {
        self.randomize_session = Some(enabled);
        self
    }

    /// Set the status codes that remove a proxy from rotation.
    pub fn remove_proxy_for_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.remove_proxy_for_status_codes = Some(codes.into_iter().collect());
        self
    }

    /// Enable or disable automatic blacklisting in the middleware.
    pub fn auto_blacklist(mut self, enabled: bool) -> Self {
        self.auto_blacklist = Some(enabled);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ProxyRotatorConfig, ConfigurationError> {
        let username = non_empty("username", self.username)?;
        let password = non_empty("password", self.password)?;
        let remove_proxy_for_status_codes = self
            .remove_proxy_for_status_codes
            .ok_or(ConfigurationError::MissingField("remove_proxy_for_status_codes"))?;

        if self.proxies.is_empty() {
            return Err(ConfigurationError::EmptyProxyList);
        }

        Ok(ProxyRotatorConfig {
            proxies: self.proxies,
            username,
            password,
            randomize_session: self.randomize_session.unwrap_or(false),
            remove_proxy_for_status_codes,
            auto_blacklist: self.auto_blacklist.unwrap_or(true),
        })
    }
}

impl Default for ProxyRotatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(field: &'static str, value: Option<String>) -> Result<String, ConfigurationError> {
    match value {
        None => Err(ConfigurationError::MissingField(field)),
        Some(v) if v.is_empty() => Err(ConfigurationError::EmptyField(field)),
        Some(v) => Ok(v),
    }
}
