//! Persisted milestone state.
//!
//! The state is one small JSON document, rewritten in full after every
//! detected change (temp file → fsync → rename). Its key names match the
//! legacy `patrons_db.json` layout so an existing file keeps working.

use crate::error::{PingError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Milestone facts observed in the last successful cycle.
///
/// All collections are sets keyed by full name, so reordering in the
/// upstream response never reads as a change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneState {
    /// Names whose lifetime support exceeds $1000.
    #[serde(rename = "$1000+", default)]
    pub thousand_plus: BTreeSet<String>,
    /// Whole years of tenure → names of active patrons with that tenure.
    #[serde(rename = "Year lists", default)]
    pub anniversary_years: BTreeMap<u32, BTreeSet<String>>,
    /// Names of active patrons entitled to the $250 tier.
    #[serde(rename = "$250 tier", default)]
    pub tier_occupants: BTreeSet<String>,
}

/// Durable home of the [`MilestoneState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state, or an empty one if nothing was persisted yet.
    ///
    /// # Errors
    ///
    /// Returns [`PingError::State`] if the file exists but cannot be read or
    /// parsed. A corrupt file is never silently replaced.
    pub fn load(&self) -> Result<MilestoneState> {
        let bytes = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted state, starting empty");
                return Ok(MilestoneState::default());
            }
            Err(e) => {
                return Err(PingError::State(format!(
                    "cannot read '{}': {e}",
                    self.path.display()
                )));
            }
        };

        let state = serde_json::from_slice(&bytes).map_err(|e| {
            PingError::State(format!("cannot parse '{}': {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), "loaded milestone state");
        Ok(state)
    }

    /// Atomically replace the persisted state with `state`.
    ///
    /// # Errors
    ///
    /// Returns [`PingError::State`] on serialization, write, sync or rename
    /// failure. The previous file is left untouched in that case.
    pub fn save(&self, state: &MilestoneState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PingError::State(format!(
                    "cannot create state dir '{}': {e}",
                    parent.display()
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| PingError::State(format!("cannot serialize state: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&tmp_path).map_err(|e| {
            PingError::State(format!(
                "cannot create temp file '{}': {e}",
                tmp_path.display()
            ))
        })?;
        file.write_all(json.as_bytes())
            .map_err(|e| PingError::State(format!("cannot write temp file: {e}")))?;
        file.sync_all()
            .map_err(|e| PingError::State(format!("cannot sync temp file: {e}")))?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            PingError::State(format!(
                "cannot rename '{}' to '{}': {e}",
                tmp_path.display(),
                self.path.display()
            ))
        })?;

        debug!(path = %self.path.display(), "milestone state persisted");
        Ok(())
    }
}
