//! Fetch configuration with sensible defaults.
//!
//! [`FetchConfig`] is also the `[patreon]` table of the patron-ping config
//! file, so it derives serde with per-field defaults.

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Amount, in cents, of the tier whose occupancy is tracked ($250).
pub const FIXED_TIER_AMOUNT_CENTS: u64 = 25_000;

/// Configuration for talking to the Patreon campaign-members endpoint.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// API origin. Overridden in tests to point at a mock server.
    pub base_url: String,
    /// Campaign whose members are polled.
    pub campaign_id: String,
    /// OAuth2 creator access token, sent as a bearer token.
    pub access_token: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Tier amount resolved from the included tier metadata.
    pub fixed_tier_amount_cents: u64,
    /// Custom User-Agent string. Defaults to `patreon-api/<version>`.
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.patreon.com".to_owned(),
            campaign_id: "82133".to_owned(),
            access_token: String::new(),
            timeout_secs: 30,
            fixed_tier_amount_cents: FIXED_TIER_AMOUNT_CENTS,
            user_agent: None,
        }
    }
}

impl fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.access_token.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("FetchConfig")
            .field("base_url", &self.base_url)
            .field("campaign_id", &self.campaign_id)
            .field("access_token", &token)
            .field("timeout_secs", &self.timeout_secs)
            .field("fixed_tier_amount_cents", &self.fixed_tier_amount_cents)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl FetchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `access_token` must be non-blank
    /// - `campaign_id` must be non-blank
    /// - `timeout_secs` must be greater than 0
    /// - `base_url` must parse as an absolute URL
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.access_token.trim().is_empty() {
            return Err(FetchError::Config(
                "patreon.access_token is required".into(),
            ));
        }
        if self.campaign_id.trim().is_empty() {
            return Err(FetchError::Config("patreon.campaign_id is required".into()));
        }
        if self.timeout_secs == 0 {
            return Err(FetchError::Config(
                "patreon.timeout_secs must be greater than 0".into(),
            ));
        }
        Url::parse(&self.base_url)
            .map_err(|e| FetchError::Config(format!("patreon.base_url is invalid: {e}")))?;
        Ok(())
    }

    /// URL of the first campaign-members page, including the field selection.
    pub fn members_url(&self) -> Result<Url, FetchError> {
        let base = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{base}/api/oauth2/v2/campaigns/{}/members",
            self.campaign_id.trim()
        ))
        .map_err(|e| FetchError::Config(format!("cannot build members URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("include", "currently_entitled_tiers")
            .append_pair(
                "fields[member]",
                "full_name,lifetime_support_cents,patron_status,pledge_relationship_start,currently_entitled_amount_cents",
            )
            .append_pair("fields[tier]", "amount_cents");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> FetchConfig {
        FetchConfig {
            access_token: "token".into(),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_has_sensible_values() {
        let config = FetchConfig::default();
        assert_eq!(config.base_url, "https://www.patreon.com");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.fixed_tier_amount_cents, 25_000);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn missing_token_rejected() {
        let err = FetchConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("access_token"));
    }

    #[test]
    fn blank_campaign_rejected() {
        let config = FetchConfig {
            campaign_id: "  ".into(),
            ..configured()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("campaign_id"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = FetchConfig {
            timeout_secs: 0,
            ..configured()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn configured_passes_validation() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn members_url_selects_fields_and_tiers() {
        let config = FetchConfig {
            base_url: "http://127.0.0.1:9000/".into(),
            ..configured()
        };
        let url = config.members_url().expect("url");
        assert_eq!(url.path(), "/api/oauth2/v2/campaigns/82133/members");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("include".into(), "currently_entitled_tiers".into())));
        assert!(pairs.contains(&("fields[tier]".into(), "amount_cents".into())));
        assert!(pairs
            .iter()
            .any(|(k, v)| k == "fields[member]" && v.contains("pledge_relationship_start")));
    }

    #[test]
    fn debug_output_redacts_token() {
        let rendered = format!("{:?}", configured());
        assert!(!rendered.contains("\"token\""));
        assert!(rendered.contains("<redacted>"));
    }
}
