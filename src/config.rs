//! Configuration types for the milestone monitor.

use crate::error::{PingError, Result};
use patreon_api::FetchConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `patreon.access_token`.
pub const ENV_PATREON_TOKEN: &str = "PATRON_PING_PATREON_TOKEN";
/// Environment variable overriding `discord.public_webhook`.
pub const ENV_PUBLIC_WEBHOOK: &str = "PATRON_PING_PUBLIC_WEBHOOK";
/// Environment variable overriding `discord.private_webhook`.
pub const ENV_PRIVATE_WEBHOOK: &str = "PATRON_PING_PRIVATE_WEBHOOK";

/// Top-level configuration, loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PingConfig {
    /// Patreon API access.
    pub patreon: FetchConfig,
    /// Discord webhook endpoints.
    pub discord: DiscordConfig,
    /// Polling loop and local files.
    pub monitor: MonitorConfig,
}

/// Discord webhook configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Webhook for the public channel (open tier slots).
    pub public_webhook: String,
    /// Webhook for the private channel (lifetime and anniversary shout-outs).
    pub private_webhook: String,
    /// Pause after every send to stay under Discord's webhook rate limit.
    pub send_delay_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            public_webhook: String::new(),
            private_webhook: String::new(),
            send_delay_ms: 1000,
            timeout_secs: 15,
        }
    }
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(url: &str) -> &'static str {
            if url.trim().is_empty() {
                "<unset>"
            } else {
                "<redacted>"
            }
        }
        f.debug_struct("DiscordConfig")
            .field("public_webhook", &redact(&self.public_webhook))
            .field("private_webhook", &redact(&self.private_webhook))
            .field("send_delay_ms", &self.send_delay_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl DiscordConfig {
    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }
}

/// Polling loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Sleep between cycles.
    pub poll_interval_secs: u64,
    /// Persisted milestone state.
    pub state_path: PathBuf,
    /// Snapshot cache used in debug mode.
    pub cache_path: PathBuf,
    /// Serve the snapshot cache and only log notifications.
    pub debug: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10 * 60,
            state_path: PathBuf::from("patrons_db.json"),
            cache_path: PathBuf::from("cached_patrons.json"),
            debug: false,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl PingConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| PingError::Config(format!("cannot parse '{}': {e}", path.display())))
    }

    /// Load `path` if given, else the default path if it exists, else defaults.
    ///
    /// Environment overrides are applied on top in every case.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!(
                        path = %default_path.display(),
                        "no config file, using defaults"
                    );
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Returns the default config file path: `~/.config/patron-ping/config.toml`.
    pub fn default_config_path() -> PathBuf {
        match dirs::config_dir() {
            Some(dir) => dir.join("patron-ping").join("config.toml"),
            None => PathBuf::from("config.toml"),
        }
    }

    /// Apply `PATRON_PING_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Blank values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = get(ENV_PATREON_TOKEN) {
            self.patreon.access_token = token;
        }
        if let Some(url) = get(ENV_PUBLIC_WEBHOOK) {
            self.discord.public_webhook = url;
        }
        if let Some(url) = get(ENV_PRIVATE_WEBHOOK) {
            self.discord.private_webhook = url;
        }
    }

    /// Check that every required value is present.
    ///
    /// Webhooks are not required in debug mode since nothing is delivered.
    ///
    /// # Errors
    ///
    /// Returns [`PingError::Config`] naming the first missing or invalid key.
    pub fn validate(&self) -> Result<()> {
        self.patreon
            .validate()
            .map_err(|e| PingError::Config(e.to_string()))?;

        if !self.monitor.debug {
            if self.discord.public_webhook.trim().is_empty() {
                return Err(PingError::Config(
                    "discord.public_webhook is required".into(),
                ));
            }
            if self.discord.private_webhook.trim().is_empty() {
                return Err(PingError::Config(
                    "discord.private_webhook is required".into(),
                ));
            }
        }
        if self.discord.timeout_secs == 0 {
            return Err(PingError::Config(
                "discord.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.monitor.poll_interval_secs == 0 {
            return Err(PingError::Config(
                "monitor.poll_interval_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
