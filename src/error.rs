//! Error types for patron-ping.

use patreon_api::FetchError;

/// Top-level error type for the milestone monitor.
#[derive(Debug, thiserror::Error)]
pub enum PingError {
    /// Required configuration missing or invalid. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// Fetching or parsing the campaign snapshot failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] FetchError),

    /// A notification could not be delivered.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// A channel name outside {Public, Private}.
    #[error("invalid channel: {0}")]
    InvalidChannel(String),

    /// Milestone state could not be loaded or persisted.
    #[error("state error: {0}")]
    State(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, PingError>;
