//! Proxy pool with a session-long blacklist.

use crate::error::NoProxyAvailable;
use crate::proxy::ProxyStatus;

use log::{debug, warn};
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashSet;

/// A fixed list of proxy endpoints plus the set of endpoints removed from rotation.
pub struct ProxyPool {
    /// All proxies in the pool, in load order.
    proxies: Vec<String>,
    /// Proxies that must not be selected again. Only ever grows.
    blacklist: RwLock<HashSet<String>>,
}

impl ProxyPool {
    /// Create a pool over the given endpoints with an empty blacklist.
    pub fn new(proxies: Vec<String>) -> Self {
        Self {
            proxies,
            blacklist: RwLock::new(HashSet::new()),
        }
    }

    /// Proxies that are not blacklisted, in pool order.
    pub fn working_proxies(&self) -> Vec<String> {
        let blacklist = self.blacklist.read();
        self.proxies
            .iter()
            .filter(|p| !blacklist.contains(*p))
            .cloned()
            .collect()
    }

    /// Pick a working proxy uniformly at random using `rng`.
    pub fn get_proxy_with<R: Rng>(&self, rng: &mut R) -> Result<String, NoProxyAvailable> {
        let blacklist = self.blacklist.read();
        let working: Vec<&String> = self
            .proxies
            .iter()
            .filter(|p| !blacklist.contains(*p))
            .collect();

        if working.is_empty() {
            return Err(NoProxyAvailable);
        }

        let idx = rng.random_range(0..working.len());
        Ok(working[idx].clone())
    }

    /// Pick a working proxy uniformly at random.
    pub fn get_proxy(&self) -> Result<String, NoProxyAvailable> {
        self.get_proxy_with(&mut rand::rng())
    }

    /// Remove a proxy from rotation for the rest of the session.
    ///
    /// Returns `true` if the proxy was active before this call. Endpoints that
    /// are not part of the pool are ignored.
    pub fn blacklist(&self, proxy: &str) -> bool {
        if !self.proxies.iter().any(|p| p == proxy) {
            debug!("Ignoring blacklist request for unknown proxy {}", proxy);
            return false;
        }

        let inserted = self.blacklist.write().insert(proxy.to_string());
        if inserted {
            let (total, active) = self.get_stats();
            warn!(
                "Proxy {} blacklisted, {}/{} proxies still active",
                proxy, active, total
            );
        }
        inserted
    }

    /// Current status of a proxy, or `None` if it is not part of the pool.
    pub fn status(&self, proxy: &str) -> Option<ProxyStatus> {
        if !self.proxies.iter().any(|p| p == proxy) {
            return None;
        }
        if self.blacklist.read().contains(proxy) {
            Some(ProxyStatus::Blacklisted)
        } else {
            Some(ProxyStatus::Active)
        }
    }

    /// Blacklisted proxies, in pool order.
    pub fn blacklisted_proxies(&self) -> Vec<String> {
        let blacklist = self.blacklist.read();
        self.proxies
            .iter()
            .filter(|p| blacklist.contains(*p))
            .cloned()
            .collect()
    }

    /// Get statistics about the proxy pool as `(total, active)`.
    pub fn get_stats(&self) -> (usize, usize) {
        let blacklist = self.blacklist.read();
        let total = self.proxies.len();
        let active = self
            .proxies
            .iter()
            .filter(|p| !blacklist.contains(*p))
            .count();

        (total, active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn pool(n: usize) -> ProxyPool {
        ProxyPool::new((1..=n).map(|i| format!("10.0.0.{}:8080", i)).collect())
    }

    #[test]
    fn test_get_proxy_returns_pool_member() {
        let pool = pool(5);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let proxy = pool.get_proxy_with(&mut rng).unwrap();
            assert!(pool.proxies.contains(&proxy));
        }
    }

    #[test]
    fn test_get_proxy_covers_pool() {
        let pool = pool(3);
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<String> = (0..200)
            .map(|_| pool.get_proxy_with(&mut rng).unwrap())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_blacklisted_proxy_never_selected() {
        let pool = pool(3);
        assert!(pool.blacklist("10.0.0.2:8080"));
        for _ in 0..100 {
            assert_ne!(pool.get_proxy().unwrap(), "10.0.0.2:8080");
        }
        assert_eq!(pool.working_proxies(), vec!["10.0.0.1:8080", "10.0.0.3:8080"]);
        assert_eq!(pool.blacklisted_proxies(), vec!["10.0.0.2:8080"]);
    }

    #[test]
    fn test_blacklist_is_idempotent() {
        let pool = pool(2);
        assert!(pool.blacklist("10.0.0.1:8080"));
        assert!(!pool.blacklist("10.0.0.1:8080"));
        assert_eq!(pool.get_stats(), (2, 1));
    }

    #[test]
    fn test_blacklist_ignores_unknown_proxy() {
        let pool = pool(2);
        assert!(!pool.blacklist("192.168.1.1:3128"));
        assert_eq!(pool.status("192.168.1.1:3128"), None);
        assert_eq!(pool.get_stats(), (2, 2));
    }

    #[test]
    fn test_status_transitions() {
        let pool = pool(1);
        assert_eq!(pool.status("10.0.0.1:8080"), Some(ProxyStatus::Active));
        pool.blacklist("10.0.0.1:8080");
        assert_eq!(pool.status("10.0.0.1:8080"), Some(ProxyStatus::Blacklisted));
    }

    #[test]
    fn test_exhausted_pool() {
        let pool = pool(3);
        for proxy in pool.proxies.clone() {
            pool.blacklist(&proxy);
        }
        assert_eq!(pool.get_proxy(), Err(NoProxyAvailable));
        assert!(pool.working_proxies().is_empty());
    }

    #[test]
    fn test_concurrent_blacklist_has_no_lost_updates() {
        let pool = Arc::new(pool(64));
        let victims: Vec<String> = pool.proxies.iter().take(48).cloned().collect();

        std::thread::scope(|s| {
            for proxy in &victims {
                let pool = Arc::clone(&pool);
                s.spawn(move || {
                    pool.blacklist(proxy);
                    let _ = pool.get_proxy();
                });
            }
        });

        let working = pool.working_proxies();
        assert_eq!(working.len(), 16);
        for proxy in &victims {
            assert!(!working.contains(proxy));
        }
        assert_eq!(pool.blacklisted_proxies().len(), 48);
    }
}
