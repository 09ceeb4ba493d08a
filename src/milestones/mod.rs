//! Milestone evaluators.
//!
//! Each evaluator is a pure function of the fetched patrons and the stored
//! [`MilestoneState`](crate::state::MilestoneState). It returns the
//! notifications to send and, only when the freshly computed value differs
//! from the stored one, the replacement for its own slice of the state.
//! Applying and persisting that replacement is the monitor's job.

pub mod anniversary;
pub mod lifetime;
pub mod tier;

use crate::notify::Notification;

/// Result of evaluating one milestone against the stored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneOutcome<T> {
    /// Which milestone produced this outcome.
    pub milestone: &'static str,
    /// Messages to deliver, in patron order.
    pub notifications: Vec<Notification>,
    /// New value for the milestone's state slice, if it changed.
    pub update: Option<T>,
}

impl<T: PartialEq> MilestoneOutcome<T> {
    /// Build an outcome, keeping `computed` only when it differs from `stored`.
    pub fn new(
        milestone: &'static str,
        notifications: Vec<Notification>,
        computed: T,
        stored: &T,
    ) -> Self {
        let update = (computed != *stored).then_some(computed);
        Self {
            milestone,
            notifications,
            update,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.notifications.is_empty() && self.update.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn equal_values_produce_no_update() {
        let stored: BTreeSet<String> = ["Ada".to_owned()].into();
        let outcome = MilestoneOutcome::new("test", vec![], stored.clone(), &stored);
        assert!(outcome.update.is_none());
        assert!(outcome.is_quiet());
    }

    #[test]
    fn different_values_carry_the_new_value() {
        let stored: BTreeSet<String> = BTreeSet::new();
        let computed: BTreeSet<String> = ["Ada".to_owned()].into();
        let outcome = MilestoneOutcome::new("test", vec![], computed.clone(), &stored);
        assert_eq!(outcome.update, Some(computed));
        assert!(!outcome.is_quiet());
    }
}
