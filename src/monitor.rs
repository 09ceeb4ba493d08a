//! Polling loop.
//!
//! [`Monitor`] owns the milestone state for the lifetime of the process.
//! One cycle is fetch → lifetime → anniversary → tier. Each evaluator's
//! notifications are dispatched before its state change is applied, and a
//! change is committed in memory only after it reached disk.

use crate::error::Result;
use crate::milestones::{self, MilestoneOutcome};
use crate::notify::{Dispatcher, Notifier};
use crate::state::{MilestoneState, StateStore};
use chrono::{DateTime, Utc};
use patreon_api::SnapshotSource;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// What one cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Members in the fetched snapshot.
    pub patrons: usize,
    /// Notifications produced by the evaluators.
    pub notifications: usize,
    /// Notifications that could not be delivered.
    pub delivery_failures: usize,
    /// State rewrites (at most one per evaluator).
    pub persisted_writes: usize,
}

/// Fetches snapshots, evaluates milestones and announces transitions.
pub struct Monitor<S, N> {
    source: S,
    dispatcher: Dispatcher<N>,
    store: StateStore,
    state: MilestoneState,
    poll_interval: Duration,
}

impl<S: SnapshotSource, N: Notifier> Monitor<S, N> {
    /// Create a monitor, loading the persisted state from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`PingError::State`](crate::PingError::State) if an existing
    /// state file cannot be read.
    pub fn new(source: S, dispatcher: Dispatcher<N>, store: StateStore) -> Result<Self> {
        let state = store.load()?;
        Ok(Self {
            source,
            dispatcher,
            store,
            state,
            poll_interval: Duration::from_secs(10 * 60),
        })
    }

    /// Override the sleep between cycles.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn state(&self) -> &MilestoneState {
        &self.state
    }

    /// Run one cycle at the current time.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle with `now` as the reference instant for anniversaries.
    ///
    /// # Errors
    ///
    /// A fetch failure aborts before anything is evaluated. A persistence
    /// failure aborts the remaining evaluators and leaves the in-memory
    /// state at its last persisted value. Delivery failures never abort.
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> Result<CycleReport> {
        let snapshot = self.source.fetch().await?;
        let mut report = CycleReport {
            patrons: snapshot.patrons.len(),
            ..Default::default()
        };
        debug!(patrons = report.patrons, "checking for updates");

        let outcome = milestones::lifetime::evaluate(&snapshot.patrons, &self.state);
        self.apply(outcome, &mut report, |state, names| {
            state.thousand_plus = names;
        })
        .await?;

        let outcome = milestones::anniversary::evaluate(&snapshot.patrons, &self.state, now);
        self.apply(outcome, &mut report, |state, buckets| {
            state.anniversary_years = buckets;
        })
        .await?;

        let outcome = milestones::tier::evaluate(
            &snapshot.patrons,
            &self.state,
            snapshot.fixed_tier_id.as_deref(),
        );
        self.apply(outcome, &mut report, |state, names| {
            state.tier_occupants = names;
        })
        .await?;

        Ok(report)
    }

    async fn apply<T>(
        &mut self,
        outcome: MilestoneOutcome<T>,
        report: &mut CycleReport,
        assign: impl FnOnce(&mut MilestoneState, T),
    ) -> Result<()> {
        report.notifications += outcome.notifications.len();
        report.delivery_failures += self.dispatcher.dispatch(&outcome.notifications).await;

        if let Some(update) = outcome.update {
            let mut next = self.state.clone();
            assign(&mut next, update);
            self.store.save(&next)?;
            self.state = next;
            report.persisted_writes += 1;
            info!(milestone = outcome.milestone, "milestone state updated");
        }
        Ok(())
    }

    /// Run cycles until `cancel` fires.
    ///
    /// Cancellation is honoured before each cycle and during the sleep; a
    /// cycle already in flight always finishes. Cycle errors are logged and
    /// the loop carries on with the next cycle.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            state = %self.store.path().display(),
            "patron monitor started"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            match self.run_cycle().await {
                Ok(report) => info!(
                    patrons = report.patrons,
                    notifications = report.notifications,
                    delivery_failures = report.delivery_failures,
                    writes = report.persisted_writes,
                    "cycle complete"
                ),
                Err(e) => error!("cycle failed: {e}"),
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!("patron monitor stopped");
    }
}
