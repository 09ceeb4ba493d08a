//! Pledge anniversaries.
//!
//! Tenure is counted in whole calendar years in the offset Patreon reported
//! for the pledge start. A year only counts once its anniversary instant has
//! passed; a start on Feb 29 reaches its anniversary on Feb 28 in common
//! years, since adding months clamps to the end of the month.

use crate::milestones::MilestoneOutcome;
use crate::notify::Notification;
use crate::state::MilestoneState;
use chrono::{DateTime, Datelike, FixedOffset, Months, Utc};
use patreon_api::Patron;
use std::collections::{BTreeMap, BTreeSet};

/// Whole calendar years elapsed from `start` to `now`. Zero if `now` is earlier.
pub fn whole_years_between(start: DateTime<FixedOffset>, now: DateTime<Utc>) -> u32 {
    let now = now.with_timezone(start.offset());
    if now < start {
        return 0;
    }

    let mut months = (now.year() - start.year()) * 12 + now.month() as i32 - start.month() as i32;
    let reached = |m: i32| {
        u32::try_from(m)
            .ok()
            .and_then(|m| start.checked_add_months(Months::new(m)))
            .is_some_and(|anniversary| anniversary <= now)
    };
    if months > 0 && !reached(months) {
        months -= 1;
    }

    u32::try_from(months / 12).unwrap_or(0)
}

/// Bucket active patrons by tenure and announce every name new to its bucket.
///
/// Patrons with less than one full year, or without a start date, are left
/// out entirely.
pub fn evaluate(
    patrons: &[Patron],
    state: &MilestoneState,
    now: DateTime<Utc>,
) -> MilestoneOutcome<BTreeMap<u32, BTreeSet<String>>> {
    let mut buckets: BTreeMap<u32, BTreeSet<String>> = BTreeMap::new();
    let mut notifications = Vec::new();

    for patron in patrons.iter().filter(|p| p.patron_status.is_active()) {
        let Some(start) = patron.pledge_relationship_start else {
            continue;
        };
        let years = whole_years_between(start, now);
        if years == 0 {
            continue;
        }

        let name = &patron.full_name;
        let known = state
            .anniversary_years
            .get(&years)
            .is_some_and(|names| names.contains(name));
        let bucket = buckets.entry(years).or_default();
        if !known && !bucket.contains(name) {
            notifications.push(Notification::private(format!(
                "{name} has had their {years} year anniversary!"
            )));
        }
        bucket.insert(name.clone());
    }

    MilestoneOutcome::new(
        "anniversary",
        notifications,
        buckets,
        &state.anniversary_years,
    )
}
