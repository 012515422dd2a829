//! Proxy endpoint representation and status.

use crate::auth::ProxyAuthorization;
use crate::error::ProxyError;

use url::Url;

/// Status of a proxy endpoint within a rotation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyStatus {
    /// The proxy is eligible for selection.
    Active,
    /// The proxy returned a removal status code and is never selected again.
    Blacklisted,
}

/// Parse an endpoint into a proxy URL. Endpoints without a scheme
/// (`host:port`) are treated as plain HTTP proxies.
pub fn proxy_url(endpoint: &str) -> Result<Url, url::ParseError> {
    if endpoint.contains("://") {
        Url::parse(endpoint)
    } else {
        Url::parse(&format!("http://{}", endpoint))
    }
}

/// Whether the endpoint speaks SOCKS5, where credentials travel in the
/// handshake instead of a `Proxy-Authorization` header.
fn is_socks(url: &Url) -> bool {
    matches!(url.scheme(), "socks5" | "socks5h")
}

/// Proxy URL for one request. SOCKS5 endpoints carry `auth` as userinfo;
/// HTTP endpoints are returned unchanged.
pub fn authenticated_url(endpoint: &str, auth: &ProxyAuthorization) -> Result<Url, ProxyError> {
    let invalid = |reason: String| ProxyError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let mut url = proxy_url(endpoint).map_err(|e| invalid(e.to_string()))?;
    if is_socks(&url) {
        url.set_username(&auth.username)
            .map_err(|_| invalid("cannot carry a username".to_string()))?;
        url.set_password(Some(&auth.password))
            .map_err(|_| invalid("cannot carry a password".to_string()))?;
    }
    Ok(url)
}

/// Convert an endpoint to a `reqwest::Proxy` that authenticates with `auth`.
///
/// HTTP proxies get the header on forwarded requests and CONNECT tunnels;
/// SOCKS5 proxies get username/password authentication.
pub fn to_reqwest_proxy(endpoint: &str, auth: &ProxyAuthorization) -> Result<reqwest::Proxy, ProxyError> {
    let url = authenticated_url(endpoint, auth)?;
    let proxy = reqwest::Proxy::all(url.as_str())?;
    if is_socks(&url) {
        Ok(proxy)
    } else {
        Ok(proxy.custom_http_auth(auth.header.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn auth() -> ProxyAuthorization {
        ProxyAuthorization {
            username: "lum-customer-session-glob_rand123456789012".to_string(),
            password: "s3cr:et".to_string(),
            header: HeaderValue::from_static("Basic dTpw"),
        }
    }

    #[test]
    fn test_proxy_url_adds_http_scheme() {
        let url = proxy_url("10.0.0.1:8080").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("10.0.0.1"));
        assert_eq!(url.port(), Some(8080));

        let url = proxy_url("localhost:3128").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(3128));
    }

    #[test]
    fn test_proxy_url_keeps_scheme() {
        let url = proxy_url("socks5://127.0.0.1:1080").unwrap();
        assert_eq!(url.scheme(), "socks5");
        assert_eq!(url.port(), Some(1080));
    }

    #[test]
    fn test_socks_url_carries_credentials() {
        for endpoint in ["socks5://127.0.0.1:1080", "socks5h://proxy.example.com:1080"] {
            let url = authenticated_url(endpoint, &auth()).unwrap();
            assert_eq!(url.username(), "lum-customer-session-glob_rand123456789012");
            let password = url.password().unwrap();
            let decoded = percent_decode(password);
            assert_eq!(decoded, "s3cr:et");
        }
    }

    #[test]
    fn test_http_url_has_no_userinfo() {
        let url = authenticated_url("10.0.0.1:8080", &auth()).unwrap();
        assert_eq!(url.username(), "");
        assert_eq!(url.password(), None);
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = authenticated_url("http://[::1", &auth()).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_to_reqwest_proxy() {
        assert!(to_reqwest_proxy("10.0.0.1:8080", &auth()).is_ok());
        assert!(to_reqwest_proxy("socks5://127.0.0.1:1080", &auth()).is_ok());
    }

    fn percent_decode(s: &str) -> String {
        url::form_urlencoded::parse(format!("v={}", s).as_bytes())
            .next()
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }
}
