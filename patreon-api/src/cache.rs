//! On-disk snapshot cache for debug runs.
//!
//! When the cache file exists it is served instead of hitting Patreon.
//! Otherwise the inner source is fetched once and its snapshot written out.
//!
//! The file holds the raw member resources plus the resolved tier id:
//! `{"patrons": [<member resource>, ...], "two_fifty_tier_id": "..."}`.

use crate::error::FetchError;
use crate::source::SnapshotSource;
use crate::types::{MemberResource, Patron, Snapshot};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    patrons: Vec<MemberResource>,
    #[serde(default)]
    two_fifty_tier_id: Option<String>,
}

/// Wraps another source with a JSON snapshot file.
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    path: PathBuf,
}

impl<S: SnapshotSource> CachedSource<S> {
    pub fn new(inner: S, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }
}

impl<S: SnapshotSource> SnapshotSource for CachedSource<S> {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        if let Some(snapshot) = read_cache(&self.path)? {
            tracing::info!(
                path = %self.path.display(),
                members = snapshot.patrons.len(),
                "using cached snapshot"
            );
            return Ok(snapshot);
        }

        let snapshot = self.inner.fetch().await?;
        write_cache(&self.path, &snapshot)?;
        tracing::info!(path = %self.path.display(), "cached snapshot written");
        Ok(snapshot)
    }
}

/// Read a cached snapshot. `Ok(None)` when the file does not exist.
pub fn read_cache(path: &Path) -> Result<Option<Snapshot>, FetchError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(FetchError::Cache(format!(
                "cannot read '{}': {e}",
                path.display()
            )));
        }
    };
    let file: CacheFile = serde_json::from_slice(&bytes)
        .map_err(|e| FetchError::Cache(format!("cannot parse '{}': {e}", path.display())))?;

    Ok(Some(Snapshot {
        patrons: file.patrons.into_iter().map(Patron::from_resource).collect(),
        fixed_tier_id: file.two_fifty_tier_id,
    }))
}

/// Write a snapshot to the cache file (temp file → fsync → rename).
pub fn write_cache(path: &Path, snapshot: &Snapshot) -> Result<(), FetchError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| FetchError::Cache(format!("cannot create cache dir: {e}")))?;
    }

    let file = CacheFile {
        patrons: snapshot.patrons.iter().map(Patron::to_resource).collect(),
        two_fifty_tier_id: snapshot.fixed_tier_id.clone(),
    };
    let json = serde_json::to_vec(&file)
        .map_err(|e| FetchError::Cache(format!("cannot serialize snapshot: {e}")))?;

    let tmp_path = path.with_extension("json.tmp");
    let mut tmp = std::fs::File::create(&tmp_path)
        .map_err(|e| FetchError::Cache(format!("cannot create '{}': {e}", tmp_path.display())))?;
    tmp.write_all(&json)
        .map_err(|e| FetchError::Cache(format!("cannot write cache: {e}")))?;
    tmp.sync_all()
        .map_err(|e| FetchError::Cache(format!("cannot sync cache: {e}")))?;
    std::fs::rename(&tmp_path, path)
        .map_err(|e| FetchError::Cache(format!("cannot move cache into place: {e}")))
}
