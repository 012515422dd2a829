//! Proxy selection and blacklist policy.

use crate::auth::Credentials;
use crate::config::ProxyRotatorConfig;
use crate::error::{NoProxyAvailable, RotatorError};
use crate::pool::ProxyPool;
use crate::proxy::ProxyStatus;
use crate::request::ProxiedRequest;

use log::{debug, info, warn};
use rand::Rng;
use std::collections::HashSet;

/// Rotates requests over a pool of proxies and removes proxies that answer
/// with one of the configured status codes.
pub struct ProxyRotator {
    /// Proxies and the session blacklist.
    pool: ProxyPool,
    /// Credentials sent to every proxy.
    credentials: Credentials,
    /// Status codes that remove the serving proxy from rotation.
    remove_proxy_for_status_codes: HashSet<u16>,
    /// Whether response handling blacklists automatically.
    auto_blacklist: bool,
}

impl ProxyRotator {
    /// Create a rotator from a validated configuration. The blacklist starts empty.
    pub fn new(config: ProxyRotatorConfig) -> Self {
        info!(
            "Proxy rotator initialized with {} proxies, removal codes {:?}",
            config.proxies.len(),
            config.remove_proxy_for_status_codes
        );

        Self {
            pool: ProxyPool::new(config.proxies),
            credentials: Credentials::new(config.username, config.password, config.randomize_session),
            remove_proxy_for_status_codes: config.remove_proxy_for_status_codes,
            auto_blacklist: config.auto_blacklist,
        }
    }

    /// Pick a random non-blacklisted proxy.
    pub fn select_proxy(&self) -> Result<String, NoProxyAvailable> {
        self.select_proxy_with(&mut rand::rng())
    }

    /// Pick a random non-blacklisted proxy using `rng`.
    pub fn select_proxy_with<R: Rng>(&self, rng: &mut R) -> Result<String, NoProxyAvailable> {
        self.pool.get_proxy_with(rng).inspect_err(|_| {
            let (total, active) = self.pool.get_stats();
            warn!("No proxy available. Total: {}, Active: {}", total, active);
        })
    }

    /// Build the `Proxy-Authorization` header value.
    pub fn build_auth_header(&self) -> String {
        self.build_auth_header_with(&mut rand::rng())
    }

    /// Build the `Proxy-Authorization` header value using `rng` for the session id.
    pub fn build_auth_header_with<R: Rng>(&self, rng: &mut R) -> String {
        self.credentials.auth_header_with(rng)
    }

    /// Assign a proxy and credentials to `request` unless it opted out.
    pub fn prepare_request<Q: ProxiedRequest + ?Sized>(&self, request: &mut Q) -> Result<(), RotatorError> {
        self.prepare_request_with(request, &mut rand::rng())
    }

    /// Assign a proxy and credentials to `request` unless it opted out, using `rng`.
    pub fn prepare_request_with<Q: ProxiedRequest + ?Sized, R: Rng>(
        &self,
        request: &mut Q,
        rng: &mut R,
    ) -> Result<(), RotatorError> {
        if request.dont_proxy() {
            return Ok(());
        }

        let proxy = self.select_proxy_with(rng)?;
        let auth = self.credentials.authorize_with(rng)?;
        debug!("Using proxy: {}", proxy);

        request.set_proxy(&proxy);
        request.set_proxy_authorization(auth);
        Ok(())
    }

    /// Whether a response with `status` should remove its proxy from rotation.
    pub fn should_blacklist(&self, status: u16) -> bool {
        self.remove_proxy_for_status_codes.contains(&status)
    }

    /// Remove `proxy` from rotation for the rest of the session.
    ///
    /// Returns `true` only if this call moved the proxy from active to
    /// blacklisted; unknown and already blacklisted proxies yield `false`.
    pub fn blacklist(&self, proxy: &str) -> bool {
        self.pool.blacklist(proxy)
    }

    /// Evaluate a response served through `proxy`, blacklisting the proxy
    /// when `status` is a removal code. Returns whether this call removed it.
    pub fn report_response(&self, proxy: &str, status: u16) -> bool {
        if !self.should_blacklist(status) {
            return false;
        }
        debug!("Proxy {} returned removal status {}", proxy, status);
        self.blacklist(proxy)
    }

    /// Whether the middleware should call `report_response` on its own.
    pub fn auto_blacklist(&self) -> bool {
        self.auto_blacklist
    }

    /// Whether `proxy` has been removed from rotation.
    pub fn is_blacklisted(&self, proxy: &str) -> bool {
        self.pool.status(proxy) == Some(ProxyStatus::Blacklisted)
    }

    /// Proxies still eligible for selection.
    pub fn working_proxies(&self) -> Vec<String> {
        self.pool.working_proxies()
    }

    /// Proxies removed from rotation.
    pub fn blacklisted_proxies(&self) -> Vec<String> {
        self.pool.blacklisted_proxies()
    }

    /// Get statistics about the rotation as `(total, active)`.
    pub fn get_stats(&self) -> (usize, usize) {
        self.pool.get_stats()
    }
}
