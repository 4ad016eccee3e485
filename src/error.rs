use thiserror::Error;

/// Result type for target resolution and scanning
pub type ScanResult<T> = Result<T, ScanError>;

/// Failure kinds surfaced by `get_open_ports`.
///
/// The display strings are the messages callers print verbatim, so they
/// carry the `Error:` prefix themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Error: target is neither valid URL nor IP address")]
    InvalidTarget,

    #[error("Error: Invalid hostname")]
    InvalidHostname,

    #[error("Error: Invalid IP address")]
    InvalidIp,

    #[error("Error: Invalid port range")]
    InvalidPortRange,

    #[error("Error: Invalid configuration: {0}")]
    Config(String),
}
