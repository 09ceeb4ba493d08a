//! # patreon-api
//!
//! Paginated client for the Patreon OAuth2 v2 campaign-members endpoint.
//!
//! ## Design
//!
//! - Follows `links.next` until absent, accumulating every member
//! - Resolves the fixed-amount tier id from the first page that includes it
//! - Flattens JSON:API member resources into [`Patron`] records
//! - Optional JSON snapshot cache for offline debug runs
//!
//! ## Security
//!
//! - The access token only ever appears in the `Authorization` header
//! - [`FetchConfig`]'s `Debug` output redacts the token

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod source;
pub mod types;

pub use cache::CachedSource;
pub use client::PatreonClient;
pub use config::{FetchConfig, FIXED_TIER_AMOUNT_CENTS};
pub use error::{FetchError, Result};
pub use source::SnapshotSource;
pub use types::{Patron, PatronStatus, Snapshot};
