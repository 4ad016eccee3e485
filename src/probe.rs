use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Single-port reachability check.
///
/// Implementations fold every failure into `false`; nothing escapes as an
/// error or a panic.
#[async_trait]
pub trait PortProber: Send + Sync {
    async fn probe(&self, host: &str, port: u16) -> bool;
}

/// TCP connect probe with a fixed timeout
#[derive(Debug, Clone)]
pub struct TcpConnectProber {
    timeout: Duration,
}

impl TcpConnectProber {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TcpConnectProber {
    fn default() -> Self {
        Self::new(500)
    }
}

#[async_trait]
impl PortProber for TcpConnectProber {
    async fn probe(&self, host: &str, port: u16) -> bool {
        // The stream is dropped at the end of each arm, closing the socket.
        match timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => {
                debug!("Port {port} is OPEN");
                true
            }
            Ok(Err(e)) => {
                debug!("Port {port} is closed ({e})");
                false
            }
            Err(_elapsed) => {
                debug!("Port {port} timed out");
                false
            }
        }
    }
}
