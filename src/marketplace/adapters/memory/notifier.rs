//! In-memory notification sinks.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::marketplace::{
    domain::MarketplaceEvent,
    ports::{NotificationError, NotificationSink},
};

/// Sink that discards every event.
///
/// Production wiring when no delivery channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSink;

#[async_trait]
impl NotificationSink for NoopNotificationSink {
    async fn notify(&self, _event: &MarketplaceEvent) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Sink that records every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    events: Mutex<Vec<MarketplaceEvent>>,
}

impl RecordingNotificationSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    pub async fn recorded(&self) -> Vec<MarketplaceEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn notify(&self, event: &MarketplaceEvent) -> Result<(), NotificationError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
