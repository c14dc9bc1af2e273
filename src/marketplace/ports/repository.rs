//! Repository ports for the task registry and the bid ledger.

use crate::marketplace::domain::{Bid, BidId, Task, TaskId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Task registry contract: the exclusive owner of task records.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> RepositoryResult<()>;

    /// Replaces an existing task wholesale.
    ///
    /// Multi-field lifecycle updates (escrow holding in particular) must
    /// become visible to readers as one unit.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`] when the task does not
    /// exist.
    async fn update(&self, task: &Task) -> RepositoryResult<()>;

    /// Finds a task by identifier; `None` when absent.
    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;

    /// Returns tasks posted by the customer, newest first by `posted_at`.
    async fn list_by_customer(&self, customer_id: &UserId) -> RepositoryResult<Vec<Task>>;

    /// Returns tasks currently assigned to the tasker, newest first by
    /// `posted_at`.
    async fn list_by_tasker(&self, tasker_id: &UserId) -> RepositoryResult<Vec<Task>>;

    /// Returns all tasks, newest first by `posted_at`.
    async fn list_all(&self) -> RepositoryResult<Vec<Task>>;
}

/// Bid ledger contract: the exclusive owner of bid records.
///
/// The ledger is append-only; stored bids are amended (acceptance flags
/// only) but never deleted.
#[async_trait]
pub trait BidRepository: Send + Sync {
    /// Appends a new bid to the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateBid`] when the bid ID already
    /// exists.
    async fn store(&self, bid: &Bid) -> RepositoryResult<()>;

    /// Persists an amendment to an existing bid.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::BidNotFound`] when the bid does not
    /// exist.
    async fn update(&self, bid: &Bid) -> RepositoryResult<()>;

    /// Finds a bid by identifier; `None` when absent.
    async fn find_by_id(&self, id: BidId) -> RepositoryResult<Option<Bid>>;

    /// Returns all bids for the task in stable submission order.
    async fn list_for_task(&self, task_id: TaskId) -> RepositoryResult<Vec<Bid>>;
}

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The referenced bid does not exist.
    #[error("bid not found: {0}")]
    BidNotFound(BidId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A bid with the same identifier already exists.
    #[error("duplicate bid identifier: {0}")]
    DuplicateBid(BidId),

    /// Storage-layer failure.
    #[error("storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}
