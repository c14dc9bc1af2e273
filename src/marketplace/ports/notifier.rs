//! Notification sink port for transition side effects.

use crate::marketplace::domain::MarketplaceEvent;
use async_trait::async_trait;
use thiserror::Error;

/// Delivery failure reported by a notification sink.
///
/// The lifecycle engine swallows this error: a committed transition is
/// never rolled back because a notification could not be delivered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("notification delivery failed: {0}")]
pub struct NotificationError(pub String);

/// Fire-and-forget sink invoked after each successful transition.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when delivery fails; the caller treats
    /// this as advisory only.
    async fn notify(&self, event: &MarketplaceEvent) -> Result<(), NotificationError>;
}
