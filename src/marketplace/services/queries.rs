//! Read-side facade over the task registry and bid ledger.

use std::sync::Arc;

use crate::marketplace::{
    domain::{Bid, Task, TaskId, UserId},
    ports::{BidRepository, RepositoryError, RepositoryResult, TaskRepository},
};

/// Read-only queries over marketplace state.
///
/// Queries never take the per-task lock; they observe whichever committed
/// snapshot the repositories hold at call time.
#[derive(Clone)]
pub struct MarketplaceQueries<T, B>
where
    T: TaskRepository,
    B: BidRepository,
{
    tasks: Arc<T>,
    bids: Arc<B>,
}

impl<T, B> MarketplaceQueries<T, B>
where
    T: TaskRepository,
    B: BidRepository,
{
    /// Creates a query facade over the given repositories.
    #[must_use]
    pub const fn new(tasks: Arc<T>, bids: Arc<B>) -> Self {
        Self { tasks, bids }
    }

    /// Fetches a single task.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`] when the task does not
    /// exist.
    pub async fn get_task(&self, task_id: TaskId) -> RepositoryResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(RepositoryError::TaskNotFound(task_id))
    }

    /// Lists tasks posted by a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the registry read fails.
    pub async fn tasks_by_customer(&self, customer_id: &UserId) -> RepositoryResult<Vec<Task>> {
        self.tasks.list_by_customer(customer_id).await
    }

    /// Lists tasks currently assigned to a tasker, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the registry read fails.
    pub async fn tasks_by_tasker(&self, tasker_id: &UserId) -> RepositoryResult<Vec<Task>> {
        self.tasks.list_by_tasker(tasker_id).await
    }

    /// Lists every task on the platform, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the registry read fails.
    pub async fn all_tasks(&self) -> RepositoryResult<Vec<Task>> {
        self.tasks.list_all().await
    }

    /// Lists a task's bids in stable submission order.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the ledger read fails.
    pub async fn bids_for_task(&self, task_id: TaskId) -> RepositoryResult<Vec<Bid>> {
        self.bids.list_for_task(task_id).await
    }
}
