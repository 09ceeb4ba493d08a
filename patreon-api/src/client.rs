//! Live campaign-members client.
//!
//! Pages are fetched sequentially, following `links.next` until Patreon
//! stops sending one.

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::http;
use crate::source::SnapshotSource;
use crate::types::{MembersPage, Snapshot, SnapshotBuilder};
use reqwest::header::ACCEPT;
use url::Url;

/// Bearer-authenticated client for one campaign.
#[derive(Debug)]
pub struct PatreonClient {
    client: reqwest::Client,
    config: FetchConfig,
}

impl PatreonClient {
    /// Validate `config` and build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] for an invalid configuration and
    /// [`FetchError::Http`] if the client cannot be constructed.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        config.validate()?;
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    async fn fetch_page(&self, url: &Url) -> Result<MembersPage, FetchError> {
        tracing::debug!(%url, "requesting members page");

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.config.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Http(format!("members request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(format!("members response read failed: {e}")))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_members_page(&body)
    }
}

/// Parse one members page, mapping any shape mismatch to a protocol error.
pub fn parse_members_page(body: &str) -> Result<MembersPage, FetchError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(bytes = body.len(), "unparseable members page: {e}");
        FetchError::Protocol(format!("cannot parse members page: {e}"))
    })
}

impl SnapshotSource for PatreonClient {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        tracing::info!(campaign_id = %self.config.campaign_id, "retrieving members from Patreon");

        let mut url = self.config.members_url()?;
        let mut builder = SnapshotBuilder::new(self.config.fixed_tier_amount_cents);

        loop {
            let page = self.fetch_page(&url).await?;
            let Some(next) = builder.absorb(page) else {
                break;
            };
            let next = Url::parse(&next)
                .map_err(|e| FetchError::Protocol(format!("invalid next link `{next}`: {e}")))?;
            if next == url {
                return Err(FetchError::Protocol(format!(
                    "next link repeats the current page: {next}"
                )));
            }
            url = next;
        }

        let pages = builder.pages();
        let snapshot = builder.finish();
        tracing::info!(
            pages,
            members = snapshot.patrons.len(),
            fixed_tier = ?snapshot.fixed_tier_id,
            "members retrieved"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_missing_token() {
        let err = PatreonClient::new(FetchConfig::default()).unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
    }

    #[test]
    fn new_accepts_valid_config() {
        let config = FetchConfig {
            access_token: "token".into(),
            ..Default::default()
        };
        let client = PatreonClient::new(config);
        assert!(client.is_ok());
    }

    #[test]
    fn non_json_body_is_protocol_error() {
        let err = parse_members_page("<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(err, FetchError::Protocol(_)));
    }
}
