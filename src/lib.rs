//! patron-ping: Patreon milestone announcements for Discord.
//!
//! Polls a campaign's members, compares them with the milestone facts
//! recorded after the previous poll, and announces each transition once:
//! Snapshot → Evaluators → Notifications → State
//!
//! # Architecture
//!
//! - **Snapshot**: paginated fetch via the `patreon-api` workspace crate
//! - **Evaluators**: lifetime total over $1000, pledge anniversaries and
//!   $250 tier occupancy, each a pure function of snapshot + stored state
//! - **Notifications**: Discord webhooks, one per channel, sent serially
//!   with a fixed rate-limit pause
//! - **State**: a JSON file rewritten atomically after every change

pub mod config;
pub mod error;
pub mod milestones;
pub mod monitor;
pub mod notify;
pub mod state;

#[cfg(test)]
pub mod test_utils;

pub use config::PingConfig;
pub use error::{PingError, Result};
pub use monitor::{CycleReport, Monitor};
pub use notify::{Channel, Dispatcher, Notification, Notifier};
pub use state::{MilestoneState, StateStore};
