//! Port contracts for the marketplace core.
//!
//! Ports define infrastructure-agnostic interfaces used by the lifecycle
//! engine and the query facade.

pub mod notifier;
pub mod repository;

pub use notifier::{NotificationError, NotificationSink};
pub use repository::{BidRepository, RepositoryError, RepositoryResult, TaskRepository};
