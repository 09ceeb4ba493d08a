//! Error types for the patreon-api crate.
//!
//! Messages never include the access token.

/// Errors that can occur while fetching a campaign snapshot.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Patreon answered with a non-success status code.
    #[error("Patreon returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The response could not be parsed as a campaign-members document.
    #[error("upstream protocol error: {0}")]
    Protocol(String),

    /// The debug snapshot cache could not be read or written.
    #[error("snapshot cache error: {0}")]
    Cache(String),

    /// Invalid fetch configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for patreon-api results.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_status() {
        let err = FetchError::Status {
            status: 401,
            body: "unauthorized".into(),
        };
        assert_eq!(err.to_string(), "Patreon returned 401: unauthorized");
    }

    #[test]
    fn display_protocol() {
        let err = FetchError::Protocol("missing field `data`".into());
        assert_eq!(
            err.to_string(),
            "upstream protocol error: missing field `data`"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FetchError>();
    }
}
