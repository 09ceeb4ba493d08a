//! Occupancy of the $250 tier.
//!
//! Any change to the set of occupants that leaves fewer than
//! [`OPEN_SLOT_THRESHOLD`] of them announces an open slot publicly. That
//! includes the first observation and changes that add someone.

use crate::milestones::MilestoneOutcome;
use crate::notify::Notification;
use crate::state::MilestoneState;
use patreon_api::Patron;
use std::collections::BTreeSet;

/// The tier is considered full at this many occupants.
pub const OPEN_SLOT_THRESHOLD: usize = 4;

pub const OPEN_SLOT_MESSAGE: &str = "There is a free slot in the $250 tier! Grab it quick!";

/// Compute current occupants of `fixed_tier_id` and decide on the announcement.
///
/// With no tier id (the tier was not in the response) nobody can match and
/// the computed set is empty.
pub fn evaluate(
    patrons: &[Patron],
    state: &MilestoneState,
    fixed_tier_id: Option<&str>,
) -> MilestoneOutcome<BTreeSet<String>> {
    let occupants: BTreeSet<String> = match fixed_tier_id {
        Some(tier_id) => patrons
            .iter()
            .filter(|p| p.patron_status.is_active() && p.is_entitled_to(tier_id))
            .map(|p| p.full_name.clone())
            .collect(),
        None => BTreeSet::new(),
    };

    let mut notifications = Vec::new();
    if occupants != state.tier_occupants && occupants.len() < OPEN_SLOT_THRESHOLD {
        notifications.push(Notification::public(OPEN_SLOT_MESSAGE));
    }

    MilestoneOutcome::new("tier", notifications, occupants, &state.tier_occupants)
}
