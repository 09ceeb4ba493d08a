use crate::notify::Channel;
use async_trait::async_trait;

/// Notifier contract. New delivery backends only need to implement this trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Stable backend identifier (e.g. `discord`, `log`).
    fn id(&self) -> &'static str;

    /// Deliver `text` to the endpoint bound to `channel`.
    async fn send(&self, channel: Channel, text: &str) -> crate::Result<()>;
}
