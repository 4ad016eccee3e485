//! # Target resolution
//!
//! Turns the raw target string into a [`ResolvedTarget`].
//!
//! The target is classified by its first character:
//! * A letter means URL-like (`scanme.example`, `https://scanme.example/x`).
//!   The host segment is pulled out of the scheme-qualified URL and resolved
//!   with a forward lookup.
//! * A digit means IP-like (`203.0.113.5`, `2001:db8::1`). The literal is
//!   parsed strictly and a reverse lookup is attempted for a display name.
//! * Anything else is rejected without touching the network.
//!
//! IPv6 literals that begin with a letter (`fe80::1`) are therefore treated
//! as URL-like and fail hostname resolution.

use std::net::IpAddr;

use serde::Serialize;
use tracing::{info, warn};

use crate::dns::DnsResolver;
use crate::error::{ScanError, ScanResult};

const SCHEMES: [&str; 2] = ["https://", "http://"];

/// How the raw target string is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Url,
    Ip,
    Invalid,
}

impl TargetKind {
    pub fn classify(target: &str) -> Self {
        match target.chars().next() {
            Some(c) if c.is_alphabetic() => TargetKind::Url,
            Some(c) if c.is_numeric() => TargetKind::Ip,
            _ => TargetKind::Invalid,
        }
    }
}

/// Display name, address and hostname derived from a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    pub display_url: Option<String>,
    pub ip: IpAddr,
    pub hostname: Option<String>,
}

impl ResolvedTarget {
    /// Host handed to the port prober: the hostname when known, else the IP.
    pub fn scan_host(&self) -> String {
        match &self.hostname {
            Some(hostname) => hostname.clone(),
            None => self.ip.to_string(),
        }
    }

    /// Name shown in report titles.
    pub fn label(&self) -> Option<&str> {
        self.hostname.as_deref().or(self.display_url.as_deref())
    }
}

pub struct TargetResolver<'a> {
    dns: &'a dyn DnsResolver,
}

impl<'a> TargetResolver<'a> {
    pub fn new(dns: &'a dyn DnsResolver) -> Self {
        Self { dns }
    }

    pub async fn resolve(&self, target: &str) -> ScanResult<ResolvedTarget> {
        match TargetKind::classify(target) {
            TargetKind::Url => self.resolve_url(target).await,
            TargetKind::Ip => self.resolve_ip(target).await,
            TargetKind::Invalid => Err(ScanError::InvalidTarget),
        }
    }

    async fn resolve_url(&self, target: &str) -> ScanResult<ResolvedTarget> {
        let url = url_candidates(target)
            .into_iter()
            .find(|candidate| is_valid_url(candidate))
            .ok_or(ScanError::InvalidHostname)?;

        let hostname = host_segment(&url)
            .filter(|host| !host.is_empty())
            .ok_or(ScanError::InvalidHostname)?
            .to_string();

        let ip = match self.dns.lookup_ip(&hostname).await {
            Ok(ip) => ip,
            Err(e) => {
                warn!("Could not find IP address for hostname {hostname}: {e}");
                return Err(ScanError::InvalidHostname);
            }
        };
        info!("Resolved {hostname} to {ip}");

        Ok(ResolvedTarget {
            display_url: Some(url),
            ip,
            hostname: Some(hostname),
        })
    }

    async fn resolve_ip(&self, target: &str) -> ScanResult<ResolvedTarget> {
        let ip: IpAddr = target.parse().map_err(|_| ScanError::InvalidIp)?;

        let name = match self.dns.reverse_lookup(ip).await {
            Ok(name) => {
                info!("Resolved {ip} to {name}");
                Some(name)
            }
            Err(e) => {
                warn!("Could not find hostname for IP address {ip}: {e}");
                None
            }
        };

        Ok(ResolvedTarget {
            display_url: name.clone(),
            ip,
            hostname: name,
        })
    }
}

/// Scheme-qualified URLs to try, in order.
pub fn url_candidates(target: &str) -> Vec<String> {
    if SCHEMES.iter().any(|scheme| target.starts_with(scheme)) {
        vec![target.to_string()]
    } else {
        SCHEMES
            .iter()
            .map(|scheme| format!("{scheme}{target}"))
            .collect()
    }
}

/// A URL is usable when it has a supported scheme and a `scheme://host` shape.
pub fn is_valid_url(url: &str) -> bool {
    !url.is_empty()
        && SCHEMES.iter().any(|scheme| url.starts_with(scheme))
        && url.split('/').count() >= 3
}

/// Third `/`-delimited segment: the host in `scheme://host/...`.
pub fn host_segment(url: &str) -> Option<&str> {
    url.split('/').nth(2)
}
