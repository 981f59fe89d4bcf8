//! Fetch target validation.
//!
//! [`NetworkGuard`] resolves a URL's host to every address it maps to and
//! refuses the fetch if any of them is private, loopback or link-local.
//! The check happens once, before the request. Redirects followed by the
//! HTTP client are not re-checked.

use async_trait::async_trait;
use openlink_domain::security::FetchTargetError;
use openlink_domain::security::address_policy::{check_resolved, check_scheme};
use reqwest::Url;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Hostname resolution, injectable so tests never touch DNS.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str, port: u16) -> std::io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the system resolver via tokio
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str, port: u16) -> std::io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, port)).await?;
        Ok(addrs.map(|a| a.ip()).collect())
    }
}

pub struct NetworkGuard {
    resolver: Arc<dyn HostResolver>,
}

impl Default for NetworkGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkGuard {
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(SystemResolver),
        }
    }

    pub fn with_resolver(resolver: Arc<dyn HostResolver>) -> Self {
        Self { resolver }
    }

    /// Validate `url` and return it parsed.
    pub async fn validate_fetch_target(&self, url: &str) -> Result<Url, FetchTargetError> {
        check_scheme(url)?;
        let parsed = Url::parse(url.trim()).map_err(|e| FetchTargetError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| FetchTargetError::MissingHost(url.to_string()))?;

        // IP literals are checked directly; IPv6 hosts come bracketed
        let literal = host.trim_start_matches('[').trim_end_matches(']');
        let addrs = match literal.parse::<IpAddr>() {
            Ok(ip) => vec![ip],
            Err(_) => {
                let port = parsed.port_or_known_default().unwrap_or(80);
                self.resolver.resolve(host, port).await.map_err(|e| {
                    FetchTargetError::UnresolvableHost {
                        host: host.to_string(),
                        reason: e.to_string(),
                    }
                })?
            }
        };
        debug!(host = %host, addresses = addrs.len(), "Fetch target resolved");

        check_resolved(host, &addrs)?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StubResolver(HashMap<&'static str, Vec<IpAddr>>);

    #[async_trait]
    impl HostResolver for StubResolver {
        async fn resolve(&self, host: &str, _port: u16) -> std::io::Result<Vec<IpAddr>> {
            self.0.get(host).cloned().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such host")
            })
        }
    }

    fn guard() -> NetworkGuard {
        let mut hosts = HashMap::new();
        hosts.insert("example.com", vec!["93.184.216.34".parse().unwrap()]);
        hosts.insert("internal.corp", vec!["10.0.0.5".parse().unwrap()]);
        hosts.insert(
            "mixed.test",
            vec!["93.184.216.34".parse().unwrap(), "192.168.1.1".parse().unwrap()],
        );
        NetworkGuard::with_resolver(Arc::new(StubResolver(hosts)))
    }

    #[tokio::test]
    async fn test_loopback_literal_blocked() {
        let err = guard().validate_fetch_target("http://127.0.0.1/x").await.unwrap_err();
        assert!(matches!(err, FetchTargetError::PrivateAddressBlocked { .. }));
    }

    #[tokio::test]
    async fn test_metadata_endpoint_blocked() {
        let err = guard()
            .validate_fetch_target("http://169.254.169.254/")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchTargetError::PrivateAddressBlocked { .. }));
    }

    #[tokio::test]
    async fn test_ipv6_loopback_literal_blocked() {
        let err = guard().validate_fetch_target("http://[::1]:8080/").await.unwrap_err();
        assert!(matches!(err, FetchTargetError::PrivateAddressBlocked { .. }));
    }

    #[tokio::test]
    async fn test_public_host_allowed() {
        let url = guard().validate_fetch_target("https://example.com/").await.unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[tokio::test]
    async fn test_any_private_resolution_blocks() {
        assert!(guard().validate_fetch_target("http://internal.corp/").await.is_err());
        let err = guard().validate_fetch_target("http://mixed.test/").await.unwrap_err();
        assert!(matches!(err, FetchTargetError::PrivateAddressBlocked { .. }));
    }

    #[tokio::test]
    async fn test_unknown_host_rejected() {
        let err = guard().validate_fetch_target("http://nowhere.invalid/").await.unwrap_err();
        assert!(matches!(err, FetchTargetError::UnresolvableHost { .. }));
    }

    #[tokio::test]
    async fn test_non_http_scheme_rejected() {
        let err = guard().validate_fetch_target("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, FetchTargetError::UnsupportedScheme(_)));
        assert!(guard().validate_fetch_target("ftp://example.com/").await.is_err());
    }
}
