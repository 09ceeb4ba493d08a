//! Trait definition for snapshot sources.
//!
//! The live [`PatreonClient`](crate::client::PatreonClient) and the debug
//! [`CachedSource`](crate::cache::CachedSource) both implement
//! [`SnapshotSource`], so the monitor never knows which one it polls.

use crate::error::FetchError;
use crate::types::Snapshot;

/// Something that can produce a full campaign [`Snapshot`].
///
/// All implementations must be `Send + Sync` so the monitor future stays `Send`.
pub trait SnapshotSource: Send + Sync {
    /// Fetch every member plus the fixed tier id.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if any page fails or cannot be parsed. A
    /// partial snapshot is never returned.
    fn fetch(&self) -> impl std::future::Future<Output = Result<Snapshot, FetchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Patron;

    struct FixedSource(Option<Snapshot>);

    impl SnapshotSource for FixedSource {
        async fn fetch(&self) -> Result<Snapshot, FetchError> {
            self.0
                .clone()
                .ok_or_else(|| FetchError::Protocol("fixed source failure".into()))
        }
    }

    #[test]
    fn fixed_source_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FixedSource>();
    }

    #[tokio::test]
    async fn fixed_source_returns_snapshot() {
        let snapshot = Snapshot {
            patrons: vec![Patron::new("m-1", "Ada")],
            fixed_tier_id: None,
        };
        let source = FixedSource(Some(snapshot.clone()));
        assert_eq!(source.fetch().await.expect("snapshot"), snapshot);
    }

    #[tokio::test]
    async fn fixed_source_propagates_errors() {
        let source = FixedSource(None);
        let err = source.fetch().await.unwrap_err();
        assert!(err.to_string().contains("fixed source failure"));
    }
}
