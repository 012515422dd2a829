//! # reqwest-proxy-rotator
//!
//! A proxy rotation middleware for reqwest.
//!
//! Every request is sent through a proxy picked at random from a fixed list,
//! with a Basic `Proxy-Authorization` header attached. Proxies that answer
//! with one of the configured status codes are removed from rotation for the
//! rest of the session.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod pool;
pub mod proxy;
pub mod request;
pub mod rotator;
mod utils;

pub use auth::{proxy_auth_header, Credentials, ProxyAuthorization};
pub use config::{ProxyRotatorConfig, ProxyRotatorConfigBuilder, ProxyRotatorSettings};
pub use error::{ConfigurationError, NoProxyAvailable, ProxyError, RotatorError};
pub use middleware::{DontProxy, ProxyRotatorMiddleware, SelectedProxy};
pub use pool::ProxyPool;
pub use proxy::ProxyStatus;
pub use request::{CrawlRequest, ProxiedRequest, DONT_PROXY_META_KEY, PROXY_META_KEY};
pub use rotator::ProxyRotator;
