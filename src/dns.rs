//! Forward and reverse name lookups.
//!
//! Target resolution talks to DNS through the [`DnsResolver`] trait so the
//! resolution rules can be exercised without a network. [`SystemResolver`] is
//! the production implementation backed by `trust-dns-resolver`.

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::warn;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

use crate::config::ResolverSettings;

#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolve a hostname to one address.
    async fn lookup_ip(&self, hostname: &str) -> Result<IpAddr>;

    /// Resolve an address to its primary name.
    async fn reverse_lookup(&self, ip: IpAddr) -> Result<String>;
}

/// Resolver using the host's DNS configuration
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    pub fn new(settings: &ResolverSettings) -> Self {
        let (config, mut opts) = or_public_defaults(trust_dns_resolver::system_conf::read_system_conf());
        opts.timeout = Duration::from_millis(settings.timeout_ms);
        opts.attempts = settings.attempts;

        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

/// Fall back to trust-dns defaults, which query public nameservers.
fn or_public_defaults<E: std::fmt::Display>(
    system: std::result::Result<(ResolverConfig, ResolverOpts), E>,
) -> (ResolverConfig, ResolverOpts) {
    match system {
        Ok(conf) => conf,
        Err(e) => {
            warn!("System resolver config unavailable ({e}), falling back to public default nameservers");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    }
}

#[async_trait]
impl DnsResolver for SystemResolver {
    async fn lookup_ip(&self, hostname: &str) -> Result<IpAddr> {
        let response = self.inner.lookup_ip(hostname).await?;
        let addrs: Vec<IpAddr> = response.iter().collect();
        pick_address(&addrs).ok_or_else(|| anyhow!("no addresses found for {hostname}"))
    }

    async fn reverse_lookup(&self, ip: IpAddr) -> Result<String> {
        let response = self.inner.reverse_lookup(ip).await?;
        response
            .iter()
            .next()
            .map(|name| strip_root(&name.to_utf8()))
            .ok_or_else(|| anyhow!("no PTR record for {ip}"))
    }
}

/// First IPv4 address if there is one, otherwise the first address.
pub fn pick_address(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

fn strip_root(name: &str) -> String {
    name.strip_suffix('.').unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_pick_address_prefers_ipv4() {
        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);
        let v4 = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 5));
        assert_eq!(pick_address(&[v6, v4]), Some(v4));
        assert_eq!(pick_address(&[v6]), Some(v6));
        assert_eq!(pick_address(&[]), None);
    }

    fn servers(config: &ResolverConfig) -> Vec<std::net::SocketAddr> {
        config.name_servers().iter().map(|ns| ns.socket_addr).collect()
    }

    #[test]
    fn test_unreadable_system_config_uses_defaults() {
        let (config, _) = or_public_defaults::<&str>(Err("no /etc/resolv.conf"));
        assert_eq!(servers(&config), servers(&ResolverConfig::default()));

        let system = ResolverConfig::cloudflare();
        let (config, _) = or_public_defaults::<&str>(Ok((system.clone(), ResolverOpts::default())));
        assert_eq!(servers(&config), servers(&system));
    }

    #[test]
    fn test_strip_root() {
        assert_eq!(strip_root("dns.google."), "dns.google");
        assert_eq!(strip_root("localhost"), "localhost");
    }

    #[tokio::test]
    #[ignore]
    async fn system_resolver_should_resolve_public_name() {
        let resolver = SystemResolver::new(&ResolverSettings::default());
        let ip = resolver.lookup_ip("one.one.one.one").await.unwrap();
        let name = resolver.reverse_lookup(ip).await.unwrap();
        assert!(!name.ends_with('.'));
    }
}
