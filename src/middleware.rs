//! Middleware implementation for reqwest.

use crate::auth::ProxyAuthorization;
use crate::config::ProxyRotatorConfig;
use crate::error::{ProxyError, RotatorError};
use crate::proxy;
use crate::request::ProxiedRequest;
use crate::rotator::ProxyRotator;

use anyhow::anyhow;
use async_trait::async_trait;
use http::header::PROXY_AUTHORIZATION;
use http::Extensions;
use log::{debug, info, warn};
use reqwest_middleware::{Error, Middleware, Next, Result};
use std::sync::Arc;

/// Request extension that sends the request directly, bypassing rotation.
///
/// ```no_run
/// # async fn run(client: reqwest_middleware::ClientWithMiddleware) -> reqwest_middleware::Result<()> {
/// use reqwest_proxy_rotator::DontProxy;
///
/// client.get("https://example.com").with_extension(DontProxy).send().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DontProxy;

/// The proxy endpoint a request was routed through. Attached to the request
/// extensions and to the extensions of the returned response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedProxy(pub String);

/// Middleware that routes each request through a randomly chosen proxy.
#[derive(Clone)]
pub struct ProxyRotatorMiddleware {
    /// The shared rotation state.
    rotator: Arc<ProxyRotator>,
}

impl ProxyRotatorMiddleware {
    /// Create a middleware over an existing rotator.
    pub fn new(rotator: Arc<ProxyRotator>) -> Self {
        let (total, active) = rotator.get_stats();
        info!("Proxy rotator middleware using {}/{} active proxies", active, total);
        Self { rotator }
    }

    /// Create a middleware with a fresh rotator built from `config`.
    pub fn from_config(config: ProxyRotatorConfig) -> Self {
        Self::new(Arc::new(ProxyRotator::new(config)))
    }

    /// The rotator this middleware draws proxies from.
    pub fn rotator(&self) -> &Arc<ProxyRotator> {
        &self.rotator
    }
}

/// The middleware's view of a request: proxy assignment and credentials are
/// recorded in the extensions, never in the outgoing headers.
struct MiddlewareRequest<'a> {
    extensions: &'a mut Extensions,
}

impl ProxiedRequest for MiddlewareRequest<'_> {
    fn dont_proxy(&self) -> bool {
        self.extensions.get::<DontProxy>().is_some()
    }

    fn set_proxy(&mut self, proxy: &str) {
        self.extensions.insert(SelectedProxy(proxy.to_string()));
    }

    fn set_proxy_authorization(&mut self, auth: ProxyAuthorization) {
        self.extensions.insert(auth);
    }
}

#[async_trait]
impl Middleware for ProxyRotatorMiddleware {
    async fn handle(
        &self,
        mut req: reqwest::Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<reqwest::Response> {
        if extensions.get::<DontProxy>().is_some() {
            debug!("Sending {} without proxy", req.url());
            return next.run(req, extensions).await;
        }

        self.rotator
            .prepare_request(&mut MiddlewareRequest {
                extensions: &mut *extensions,
            })
            .map_err(|err| match err {
                RotatorError::NoProxyAvailable(e) => Error::Middleware(anyhow!(e)),
                other => Error::Middleware(anyhow!(other)),
            })?;

        let selected = extensions
            .get::<SelectedProxy>()
            .cloned()
            .ok_or_else(|| Error::Middleware(anyhow!("no proxy was assigned to the request")))?;
        let auth = extensions
            .remove::<ProxyAuthorization>()
            .ok_or_else(|| Error::Middleware(anyhow!("no proxy credentials were assigned")))?;

        // Proxy credentials go to the proxy only; a header here would be
        // tunneled to the origin for CONNECT and SOCKS routes.
        if req.headers_mut().remove(PROXY_AUTHORIZATION).is_some() {
            debug!("Dropped caller-supplied Proxy-Authorization for {}", req.url());
        }

        let proxy_url = selected.0.clone();
        info!("Using proxy: {} for {}", proxy_url, req.url());

        // Create a new client with the selected proxy
        let reqwest_proxy = proxy::to_reqwest_proxy(&proxy_url, &auth).map_err(|e| {
            warn!("Failed to create proxy from {}: {}", proxy_url, e);
            match e {
                ProxyError::Reqwest(e) => Error::Reqwest(e),
                other => Error::Middleware(anyhow!(other)),
            }
        })?;
        let client = reqwest::Client::builder()
            .proxy(reqwest_proxy)
            .build()
            .map_err(|e| {
                warn!("Failed to build client with proxy {}: {}", proxy_url, e);
                Error::Reqwest(e)
            })?;

        match client.execute(req).await {
            Ok(mut response) => {
                let status = response.status().as_u16();
                if self.rotator.auto_blacklist() && self.rotator.report_response(&proxy_url, status) {
                    info!("Removed proxy {} from rotation after status {}", proxy_url, status);
                }
                response.extensions_mut().insert(selected);
                Ok(response)
            }
            Err(err) => {
                warn!("Request failed with proxy {}: {}", proxy_url, err);
                Err(Error::Reqwest(err))
            }
        }
    }
}
