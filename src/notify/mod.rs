//! Notification channels and delivery.
//!
//! Evaluators only produce [`Notification`] values. The [`Dispatcher`] owns
//! delivery: sends happen serially, a failed send is logged and skipped, and
//! every attempt is followed by a fixed pause for the webhook rate limit.

pub mod discord;
pub mod traits;

use crate::error::PingError;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

pub use discord::DiscordWebhookNotifier;
pub use traits::Notifier;

/// Named notification destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Community-facing channel.
    Public,
    /// Creator-only channel.
    Private,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = PingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            _ => Err(PingError::InvalidChannel(s.to_owned())),
        }
    }
}

/// A message one evaluator wants delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: Channel,
    pub text: String,
}

impl Notification {
    pub fn new(channel: Channel, text: impl Into<String>) -> Self {
        Self {
            channel,
            text: text.into(),
        }
    }

    pub fn public(text: impl Into<String>) -> Self {
        Self::new(Channel::Public, text)
    }

    pub fn private(text: impl Into<String>) -> Self {
        Self::new(Channel::Private, text)
    }
}

/// Debug-mode notifier: delivers nothing.
///
/// The message text is already logged by [`Dispatcher::dispatch`].
#[derive(Debug, Default)]
pub struct LogOnlyNotifier;

#[async_trait]
impl Notifier for LogOnlyNotifier {
    fn id(&self) -> &'static str {
        "log"
    }

    async fn send(&self, channel: Channel, text: &str) -> crate::Result<()> {
        debug!(%channel, bytes = text.len(), "delivery suppressed (debug mode)");
        Ok(())
    }
}

/// Serial sender with a fixed post-send delay.
pub struct Dispatcher<N> {
    notifier: N,
    send_delay: Duration,
}

impl<N: Notifier> Dispatcher<N> {
    pub fn new(notifier: N, send_delay: Duration) -> Self {
        Self {
            notifier,
            send_delay,
        }
    }

    /// Send every notification in order and return how many failed.
    ///
    /// A failure never stops the remaining sends.
    pub async fn dispatch(&self, notifications: &[Notification]) -> usize {
        let mut failures = 0;
        for notification in notifications {
            info!(
                channel = %notification.channel,
                backend = self.notifier.id(),
                "{}",
                notification.text
            );
            if let Err(e) = self
                .notifier
                .send(notification.channel, &notification.text)
                .await
            {
                failures += 1;
                warn!(channel = %notification.channel, "notification not delivered: {e}");
            }
            if !self.send_delay.is_zero() {
                tokio::time::sleep(self.send_delay).await;
            }
        }
        failures
    }
}
