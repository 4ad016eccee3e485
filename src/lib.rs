//! Resolve a hostname, URL or IP address and find which TCP ports in a range
//! accept connections.
//!
//! ```no_run
//! # async fn demo() {
//! use portprobe::{get_open_ports, ScanOutcome};
//! use serde_json::json;
//!
//! match get_open_ports("scanme.example", &json!([20, 80]), true).await {
//!     Ok(ScanOutcome::Report(report)) => println!("{report}"),
//!     Ok(ScanOutcome::Ports(ports)) => println!("{ports:?}"),
//!     Err(e) => println!("{e}"),
//! }
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod output;
pub mod probe;
pub mod range;
pub mod scanner;
pub mod services;
pub mod target;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

pub use config::Config;
pub use dns::{DnsResolver, SystemResolver};
pub use error::{ScanError, ScanResult};
pub use output::format_report;
pub use probe::{PortProber, TcpConnectProber};
pub use range::PortRange;
pub use scanner::{RangeScanner, ScanSummary, Sweep};
pub use services::{ServiceLookup, ServiceTable};
pub use target::{ResolvedTarget, TargetKind, TargetResolver};

/// What a successful `get_open_ports` call produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Open ports, ascending
    Ports(Vec<u16>),
    /// Verbose report text
    Report(String),
}

/// Resolves targets, validates ranges and drives the range scanner.
pub struct PortScanner {
    dns: Arc<dyn DnsResolver>,
    prober: Arc<dyn PortProber>,
    services: Arc<dyn ServiceLookup>,
    concurrency: usize,
    deadline: Option<Duration>,
    show_progress: bool,
}

impl PortScanner {
    pub fn new(
        dns: Arc<dyn DnsResolver>,
        prober: Arc<dyn PortProber>,
        services: Arc<dyn ServiceLookup>,
    ) -> Self {
        Self {
            dns,
            prober,
            services,
            concurrency: 1,
            deadline: None,
            show_progress: false,
        }
    }

    /// System resolver, TCP connect prober and the built-in service table
    /// extended with `config.services`.
    pub fn from_config(config: &Config) -> Self {
        let services = ServiceTable::default().with_entries(config.services.clone());

        Self::new(
            Arc::new(SystemResolver::new(&config.resolver)),
            Arc::new(TcpConnectProber::new(config.scanning.timeout_ms)),
            Arc::new(services),
        )
        .with_concurrency(config.scanning.concurrency)
        .with_deadline(config.scanning.deadline_ms.map(Duration::from_millis))
        .with_progress(config.scanning.show_progress)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn services(&self) -> &dyn ServiceLookup {
        self.services.as_ref()
    }

    /// Resolve `target`, validate `port_range` and scan it.
    ///
    /// Target errors take precedence over range errors. An invalid range
    /// stops the call with [`ScanError::InvalidPortRange`] before any port is
    /// probed.
    pub async fn run(&self, target: &str, port_range: &Value) -> ScanResult<ScanSummary> {
        let resolved = TargetResolver::new(self.dns.as_ref()).resolve(target).await?;
        let range = PortRange::validate(port_range).ok_or(ScanError::InvalidPortRange)?;
        Ok(self.scan_resolved(target, resolved, range).await)
    }

    /// Scan an already resolved target.
    pub async fn scan_resolved(
        &self,
        target: &str,
        resolved: ResolvedTarget,
        range: PortRange,
    ) -> ScanSummary {
        let start_time = chrono::Utc::now();
        let host = resolved.scan_host();
        info!("Scanning {host} ({}) ports {range}", resolved.ip);

        let sweep = RangeScanner::new(self.prober.clone(), self.concurrency)
            .with_deadline(self.deadline)
            .with_progress(self.show_progress)
            .sweep(&host, range)
            .await;

        ScanSummary::new(target, resolved, range, sweep.open, self.services(), start_time)
            .with_abandoned(sweep.abandoned)
    }

    pub async fn get_open_ports(
        &self,
        target: &str,
        port_range: &Value,
        verbose: bool,
    ) -> ScanResult<ScanOutcome> {
        let summary = self.run(target, port_range).await?;
        Ok(self.outcome(&summary, verbose))
    }

    pub fn outcome(&self, summary: &ScanSummary, verbose: bool) -> ScanOutcome {
        let ports = summary.ports();
        if verbose {
            let resolved = &summary.resolved;
            ScanOutcome::Report(format_report(resolved.label(), resolved.ip, &ports, self.services()))
        } else {
            ScanOutcome::Ports(ports)
        }
    }
}

/// Scan `target` over `port_range` with the default configuration.
pub async fn get_open_ports(
    target: &str,
    port_range: &Value,
    verbose: bool,
) -> ScanResult<ScanOutcome> {
    PortScanner::from_config(&Config::default())
        .get_open_ports(target, port_range, verbose)
        .await
}
