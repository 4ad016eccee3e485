use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::probe::PortProber;
use crate::range::PortRange;
use crate::services::ServiceLookup;
use crate::target::ResolvedTarget;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenPort {
    pub port: u16,
    pub service: String,
}

/// Everything known about one finished scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub target: String,
    pub resolved: ResolvedTarget,
    pub range: PortRange,
    pub open_ports: Vec<OpenPort>,
    /// Probes cut off by the deadline; non-zero means the scan is incomplete
    pub abandoned: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ScanSummary {
    pub fn new(
        target: &str,
        resolved: ResolvedTarget,
        range: PortRange,
        open_ports: Vec<u16>,
        services: &dyn ServiceLookup,
        start_time: DateTime<Utc>,
    ) -> Self {
        let open_ports = open_ports
            .into_iter()
            .map(|port| OpenPort {
                port,
                service: services.service_name(port).to_string(),
            })
            .collect();

        Self {
            target: target.to_string(),
            resolved,
            range,
            open_ports,
            abandoned: 0,
            start_time,
            end_time: Utc::now(),
        }
    }

    pub fn with_abandoned(mut self, abandoned: usize) -> Self {
        self.abandoned = abandoned;
        self
    }

    pub fn ports(&self) -> Vec<u16> {
        self.open_ports.iter().map(|p| p.port).collect()
    }
}

/// Result of probing one range
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sweep {
    /// Open ports, ascending
    pub open: Vec<u16>,
    /// Probes still pending when the deadline expired
    pub abandoned: usize,
}

/// Probes every port of a range and collects the open ones.
///
/// Probes run as tokio tasks bounded by `concurrency` permits; a value of 1
/// probes one port at a time. The returned list is always ascending.
pub struct RangeScanner {
    prober: Arc<dyn PortProber>,
    concurrency: usize,
    deadline: Option<Duration>,
    show_progress: bool,
}

impl RangeScanner {
    pub fn new(prober: Arc<dyn PortProber>, concurrency: usize) -> Self {
        Self {
            prober,
            concurrency: concurrency.max(1),
            deadline: None,
            show_progress: false,
        }
    }

    /// Abort probes still pending once `deadline` has elapsed since the scan started.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn scan(&self, host: &str, range: PortRange) -> Vec<u16> {
        self.sweep(host, range).await.open
    }

    /// Like [`scan`](Self::scan), but also reports how many probes the
    /// deadline cut off.
    pub async fn sweep(&self, host: &str, range: PortRange) -> Sweep {
        let pb = self.progress_bar(range);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let deadline = self.deadline.map(|d| Instant::now() + d);
        let host: Arc<str> = Arc::from(host);

        let mut tasks = Vec::with_capacity(range.port_count());

        for port in range.ports() {
            let sem = semaphore.clone();
            let prober = self.prober.clone();
            let host = host.clone();
            let pb = pb.clone();

            let task = tokio::spawn(async move {
                let attempt = async {
                    let _permit = sem.acquire().await.ok()?;
                    Some(prober.probe(&host, port).await)
                };

                // None: cut off by the deadline.
                let status = match deadline {
                    Some(deadline) => timeout_at(deadline, attempt).await.ok().flatten(),
                    None => Some(attempt.await.unwrap_or(false)),
                };

                pb.inc(1);
                (port, status)
            });

            tasks.push(task);
        }

        let mut sweep = Sweep::default();
        for joined in join_all(tasks).await {
            match joined {
                Ok((port, Some(true))) => sweep.open.push(port),
                Ok((_, Some(false))) => {}
                Ok((_, None)) => sweep.abandoned += 1,
                Err(e) => warn!("Probe task failed: {e}"),
            }
        }
        sweep.open.sort_unstable();

        pb.finish_and_clear();
        if sweep.abandoned > 0 {
            warn!(
                "Deadline reached on {host}: {} of {} probes abandoned and counted as closed",
                sweep.abandoned,
                range.port_count()
            );
        }
        info!(
            "Scanned {} ports on {host}, {} open",
            range.port_count(),
            sweep.open.len()
        );

        sweep
    }

    fn progress_bar(&self, range: PortRange) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(range.port_count() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.green/black} {pos}/{len} ports scanned ({eta})")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb
    }
}
