//! Lifetime-support threshold: patrons who have given more than $1000 in total.

use crate::milestones::MilestoneOutcome;
use crate::notify::Notification;
use crate::state::MilestoneState;
use patreon_api::Patron;
use std::collections::BTreeSet;

/// Lifetime support must be strictly greater than this ($1000).
pub const LIFETIME_THRESHOLD_CENTS: u64 = 100_000;

/// Compute the set of names above the threshold and announce new arrivals.
///
/// Status is ignored: former patrons still count. A name is new when it is
/// absent from the stored set, so dropping out and coming back re-notifies.
pub fn evaluate(patrons: &[Patron], state: &MilestoneState) -> MilestoneOutcome<BTreeSet<String>> {
    let mut current = BTreeSet::new();
    let mut notifications = Vec::new();

    for patron in patrons
        .iter()
        .filter(|p| p.lifetime_support_cents > LIFETIME_THRESHOLD_CENTS)
    {
        let name = &patron.full_name;
        if !state.thousand_plus.contains(name) && !current.contains(name) {
            notifications.push(Notification::private(format!(
                "{name} has pledged over $1000 in their lifetime!"
            )));
        }
        current.insert(name.clone());
    }

    MilestoneOutcome::new("lifetime", notifications, current, &state.thousand_plus)
}
