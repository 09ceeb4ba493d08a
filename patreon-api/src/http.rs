//! Shared HTTP client for Patreon API requests.

use crate::config::FetchConfig;
use crate::error::FetchError;
use std::time::Duration;

/// Build a [`reqwest::Client`] configured for the Patreon API.
///
/// The client has:
/// - Timeout from config
/// - User-Agent from config, or `patreon-api/<version>`
/// - Gzip decompression
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &FetchConfig) -> Result<reqwest::Client, FetchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => default_user_agent(),
    };

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| FetchError::Http(format!("failed to build HTTP client: {e}")))
}

/// User-Agent sent when none is configured.
pub fn default_user_agent() -> String {
    format!("patreon-api/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_with_default_config() {
        let config = FetchConfig::default();
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = FetchConfig {
            user_agent: Some("PatronPing/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn default_user_agent_names_crate() {
        assert!(default_user_agent().starts_with("patreon-api/"));
    }
}
