//! In-memory adapters: the authoritative single-process store.

mod bid;
mod notifier;
mod task;

pub use bid::InMemoryBidRepository;
pub use notifier::{NoopNotificationSink, RecordingNotificationSink};
pub use task::InMemoryTaskRepository;
