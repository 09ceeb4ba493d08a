//! Shared test utilities used across multiple test modules.
//!
//! Patron fixtures, a recording notifier and a scripted snapshot source, so
//! evaluator and monitor tests never touch the network.

use crate::error::{PingError, Result};
use crate::notify::{Channel, Notifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use patreon_api::{FetchError, Patron, PatronStatus, Snapshot, SnapshotSource};
use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

/// A patron with no pledge history; chain [`PatronFixture`] methods onto it.
pub fn patron(name: &str) -> Patron {
    Patron::new(format!("member-{name}"), name)
}

/// Set of owned names.
pub fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

/// Parse an RFC 3339 instant as UTC.
pub fn at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("rfc3339 instant")
        .with_timezone(&Utc)
}

/// Builder-style setters for fixture patrons.
pub trait PatronFixture {
    fn lifetime(self, cents: u64) -> Self;
    fn active(self) -> Self;
    fn former(self) -> Self;
    fn started(self, raw: &str) -> Self;
    fn tier(self, tier_id: &str) -> Self;
}

impl PatronFixture for Patron {
    fn lifetime(mut self, cents: u64) -> Self {
        self.lifetime_support_cents = cents;
        self
    }

    fn active(mut self) -> Self {
        self.patron_status = PatronStatus::ActivePatron;
        self
    }

    fn former(mut self) -> Self {
        self.patron_status = PatronStatus::FormerPatron;
        self
    }

    fn started(mut self, raw: &str) -> Self {
        self.pledge_relationship_start =
            Some(DateTime::parse_from_rfc3339(raw).expect("rfc3339 start"));
        self
    }

    fn tier(mut self, tier_id: &str) -> Self {
        self.currently_entitled_tier_ids.insert(tier_id.to_owned());
        self
    }
}

#[derive(Debug, Default)]
struct Recorded {
    sent: Vec<(Channel, String)>,
    attempts: usize,
}

/// Notifier that remembers what it delivered. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Recorded>>,
    failing: Option<Channel>,
}

impl RecordingNotifier {
    /// Every send to `channel` fails with a delivery error.
    pub fn failing_on(channel: Channel) -> Self {
        Self {
            failing: Some(channel),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(Channel, String)> {
        self.log.lock().expect("notifier log").sent.clone()
    }

    pub fn attempts(&self) -> usize {
        self.log.lock().expect("notifier log").attempts
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn id(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, channel: Channel, text: &str) -> Result<()> {
        let mut log = self.log.lock().expect("notifier log");
        log.attempts += 1;
        if self.failing == Some(channel) {
            return Err(PingError::Delivery(format!("{channel} is down")));
        }
        log.sent.push((channel, text.to_owned()));
        Ok(())
    }
}

/// Source that replays queued snapshots, then repeats the last one.
///
/// `None` entries are served as protocol errors.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    queue: Mutex<VecDeque<Option<Snapshot>>>,
    last: Mutex<Option<Snapshot>>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Option<Snapshot>>) -> Self {
        Self {
            queue: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(None),
        }
    }

    pub fn repeating(snapshot: Snapshot) -> Self {
        Self::new([Some(snapshot)])
    }
}

impl SnapshotSource for ScriptedSource {
    async fn fetch(&self) -> std::result::Result<Snapshot, FetchError> {
        let next = self.queue.lock().expect("script").pop_front();
        let mut last = self.last.lock().expect("script");
        match next {
            Some(Some(snapshot)) => {
                *last = Some(snapshot.clone());
                Ok(snapshot)
            }
            Some(None) => Err(FetchError::Protocol("scripted failure".into())),
            None => last
                .clone()
                .ok_or_else(|| FetchError::Protocol("script exhausted".into())),
        }
    }
}
