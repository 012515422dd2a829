//! The request contract the rotator assigns proxies through.

use crate::auth::ProxyAuthorization;

use http::header::PROXY_AUTHORIZATION;
use http::HeaderMap;
use std::collections::HashMap;
use url::Url;

/// Meta key whose presence opts a request out of proxying.
pub const DONT_PROXY_META_KEY: &str = "dont_proxy";

/// Meta key the selected proxy endpoint is written to.
pub const PROXY_META_KEY: &str = "proxy";

/// An outbound request the rotator can route through a proxy.
pub trait ProxiedRequest {
    /// Whether the request asked not to be proxied.
    fn dont_proxy(&self) -> bool;

    /// Record the proxy endpoint the request should go through.
    fn set_proxy(&mut self, proxy: &str);

    /// Attach the credentials for the assigned proxy.
    fn set_proxy_authorization(&mut self, auth: ProxyAuthorization);
}

/// A framework-neutral crawl request with a string metadata map.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Target URL.
    pub url: Url,
    /// Per-request metadata; read for `dont_proxy`, written with `proxy`.
    pub meta: HashMap<String, String>,
    /// Request headers; `Proxy-Authorization` is written here.
    pub headers: HeaderMap,
}

impl CrawlRequest {
    /// Create a request for `url` with empty metadata and headers.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            meta: HashMap::new(),
            headers: HeaderMap::new(),
        }
    }

    /// Mark the request as not to be proxied.
    pub fn without_proxy(mut self) -> Self {
        self.meta.insert(DONT_PROXY_META_KEY.to_string(), "true".to_string());
        self
    }

    /// The proxy assigned to this request, if any.
    pub fn proxy(&self) -> Option<&str> {
        self.meta.get(PROXY_META_KEY).map(String::as_str)
    }
}

impl ProxiedRequest for CrawlRequest {
    fn dont_proxy(&self) -> bool {
        self.meta.contains_key(DONT_PROXY_META_KEY)
    }

    fn set_proxy(&mut self, proxy: &str) {
        self.meta.insert(PROXY_META_KEY.to_string(), proxy.to_string());
    }

    fn set_proxy_authorization(&mut self, auth: ProxyAuthorization) {
        self.headers.insert(PROXY_AUTHORIZATION, auth.header);
    }
}
