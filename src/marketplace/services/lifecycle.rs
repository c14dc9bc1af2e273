//! Lifecycle engine: validated transitions over the task registry and the
//! bid ledger.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use mockable::Clock;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;

use crate::marketplace::{
    domain::{
        Bid, BidId, BidderProfile, BudgetType, CommissionRate, CompletionProgress,
        MarketplaceEvent, Money, Party, PreconditionError, Task, TaskId, TaskListing, UserId,
        ValidationError,
    },
    ports::{BidRepository, NotificationSink, RepositoryError, TaskRepository},
};

/// Request payload for posting a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    customer_id: String,
    title: String,
    description: String,
    category: String,
    budget_minor: u64,
    budget_type: BudgetType,
    skills: Vec<String>,
    images: Vec<String>,
    time_estimate: Option<String>,
    location: Option<String>,
    is_remote: bool,
    special_instructions: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required posting fields.
    #[must_use]
    pub fn new(
        customer_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        budget_minor: u64,
        budget_type: BudgetType,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            title: title.into(),
            description: description.into(),
            category: category.into(),
            budget_minor,
            budget_type,
            skills: Vec::new(),
            images: Vec::new(),
            time_estimate: None,
            location: None,
            is_remote: false,
            special_instructions: None,
        }
    }

    /// Sets the required skills.
    #[must_use]
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = String>) -> Self {
        self.skills = skills.into_iter().collect();
        self
    }

    /// Sets attached image references.
    #[must_use]
    pub fn with_images(mut self, images: impl IntoIterator<Item = String>) -> Self {
        self.images = images.into_iter().collect();
        self
    }

    /// Sets the estimated time to complete.
    #[must_use]
    pub fn with_time_estimate(mut self, time_estimate: impl Into<String>) -> Self {
        self.time_estimate = Some(time_estimate.into());
        self
    }

    /// Sets the task location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Marks the task as performable remotely.
    #[must_use]
    pub const fn remote(mut self) -> Self {
        self.is_remote = true;
        self
    }

    /// Sets special instructions for the tasker.
    #[must_use]
    pub fn with_special_instructions(mut self, special_instructions: impl Into<String>) -> Self {
        self.special_instructions = Some(special_instructions.into());
        self
    }
}

/// Request payload for submitting a bid against a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitBidRequest {
    task_id: TaskId,
    bidder_id: String,
    bidder_name: String,
    amount_minor: u64,
    message: String,
    delivery_time: String,
    rating_centi: u32,
    completed_tasks: u64,
    verified: bool,
    response_time: Option<String>,
}

impl SubmitBidRequest {
    /// Creates a request with the required offer fields.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        bidder_id: impl Into<String>,
        bidder_name: impl Into<String>,
        amount_minor: u64,
        message: impl Into<String>,
        delivery_time: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            bidder_id: bidder_id.into(),
            bidder_name: bidder_name.into(),
            amount_minor,
            message: message.into(),
            delivery_time: delivery_time.into(),
            rating_centi: 0,
            completed_tasks: 0,
            verified: false,
            response_time: None,
        }
    }

    /// Sets the bidder's rating snapshot in hundredths of a star.
    #[must_use]
    pub const fn with_rating_centi(mut self, rating_centi: u32) -> Self {
        self.rating_centi = rating_centi;
        self
    }

    /// Sets the bidder's completed-task count snapshot.
    #[must_use]
    pub const fn with_completed_tasks(mut self, completed_tasks: u64) -> Self {
        self.completed_tasks = completed_tasks;
        self
    }

    /// Marks the bidder as identity-verified.
    #[must_use]
    pub const fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    /// Sets the bidder's estimated response time.
    #[must_use]
    pub fn with_response_time(mut self, response_time: impl Into<String>) -> Self {
        self.response_time = Some(response_time.into());
        self
    }
}

/// Service-level errors for marketplace lifecycle operations.
///
/// Every variant is recoverable by the caller; a failed operation leaves
/// all prior state untouched.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// Caller input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The operation was invoked from a state or by an actor it does not
    /// permit.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    /// Repository lookup or persistence failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for marketplace service operations.
pub type MarketplaceResult<T> = Result<T, MarketplaceError>;

/// Per-task lock table serialising mutating operations.
///
/// Lifecycle operations on the same task never interleave; unrelated tasks
/// proceed concurrently.
#[derive(Debug, Default)]
struct TaskLockTable {
    inner: Mutex<HashMap<TaskId, Arc<AsyncMutex<()>>>>,
}

impl TaskLockTable {
    fn lock_for(&self, task_id: TaskId) -> Arc<AsyncMutex<()>> {
        let mut table = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(table.entry(task_id).or_default())
    }
}

/// Marketplace lifecycle orchestration service.
///
/// Holds no task or bid state of its own; it operates on the injected
/// registry and ledger and emits a notification after each successful
/// transition.
#[derive(Clone)]
pub struct MarketplaceService<T, B, N, C>
where
    T: TaskRepository,
    B: BidRepository,
    N: NotificationSink,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    bids: Arc<B>,
    notifier: Arc<N>,
    clock: Arc<C>,
    commission_rate: CommissionRate,
    locks: Arc<TaskLockTable>,
}

impl<T, B, N, C> MarketplaceService<T, B, N, C>
where
    T: TaskRepository,
    B: BidRepository,
    N: NotificationSink,
    C: Clock + Send + Sync,
{
    /// Creates a new service with the platform default commission rate.
    #[must_use]
    pub fn new(tasks: Arc<T>, bids: Arc<B>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            bids,
            notifier,
            clock,
            commission_rate: CommissionRate::DEFAULT,
            locks: Arc::new(TaskLockTable::default()),
        }
    }

    /// Overrides the commission rate.
    #[must_use]
    pub const fn with_commission_rate(mut self, rate: CommissionRate) -> Self {
        self.commission_rate = rate;
        self
    }

    /// Posts a new open task.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Validation`] when a required field is
    /// missing or the budget is not positive, or
    /// [`MarketplaceError::Repository`] when persistence fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> MarketplaceResult<Task> {
        let customer_id = UserId::new(request.customer_id)?;
        let budget = Money::new(request.budget_minor)?;

        let mut listing = TaskListing::new(
            request.title,
            request.description,
            request.category,
            budget,
            request.budget_type,
        )?
        .with_skills(request.skills)
        .with_images(request.images);
        if let Some(time_estimate) = request.time_estimate {
            listing = listing.with_time_estimate(time_estimate);
        }
        if let Some(location) = request.location {
            listing = listing.with_location(location);
        }
        if request.is_remote {
            listing = listing.remote();
        }
        if let Some(special_instructions) = request.special_instructions {
            listing = listing.with_special_instructions(special_instructions);
        }

        let task = Task::post(customer_id.clone(), listing, &*self.clock);
        self.tasks.store(&task).await?;
        self.emit(MarketplaceEvent::TaskCreated {
            task_id: task.id(),
            customer_id,
        })
        .await;
        Ok(task)
    }

    /// Submits a bid against a task and bumps the task's bid counter.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Validation`] for a non-positive amount
    /// or empty message, or [`MarketplaceError::Repository`] when the task
    /// does not exist.
    pub async fn submit_bid(&self, request: SubmitBidRequest) -> MarketplaceResult<Bid> {
        let bidder_id = UserId::new(request.bidder_id)?;
        let amount = Money::new(request.amount_minor)?;

        let lock = self.locks.lock_for(request.task_id);
        let _guard = lock.lock().await;

        let mut task = self.load_task(request.task_id).await?;

        let mut bidder = BidderProfile::new(bidder_id.clone(), request.bidder_name)
            .with_rating_centi(request.rating_centi)
            .with_completed_tasks(request.completed_tasks);
        if request.verified {
            bidder = bidder.verified();
        }

        let mut bid = Bid::submit(
            request.task_id,
            bidder,
            amount,
            request.message,
            request.delivery_time,
            &*self.clock,
        )?;
        if let Some(response_time) = request.response_time {
            bid = bid.with_response_time(response_time);
        }

        self.bids.store(&bid).await?;
        task.increment_bids_count();
        self.tasks.update(&task).await?;

        self.emit(MarketplaceEvent::BidSubmitted {
            task_id: task.id(),
            bid_id: bid.id(),
            bidder_id,
        })
        .await;
        Ok(bid)
    }

    /// Accepts the winning bid on an open task.
    ///
    /// The winning bid is marked accepted and every sibling bid in the
    /// ledger is marked rejected, so at most one bid per task ever carries
    /// the accepted flag.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Repository`] when the task or bid does
    /// not exist, or [`MarketplaceError::Precondition`] when the task is
    /// not open or the bid belongs to another task.
    pub async fn accept_bid(&self, task_id: TaskId, bid_id: BidId) -> MarketplaceResult<Task> {
        let lock = self.locks.lock_for(task_id);
        let _guard = lock.lock().await;

        let mut task = self.load_task(task_id).await?;
        let mut winner = self
            .bids
            .find_by_id(bid_id)
            .await?
            .ok_or(RepositoryError::BidNotFound(bid_id))?;

        task.accept_bid(&winner, &*self.clock)?;
        winner.mark_accepted(&*self.clock);

        self.tasks.update(&task).await?;
        self.bids.update(&winner).await?;
        for mut sibling in self.bids.list_for_task(task_id).await? {
            if sibling.id() == bid_id {
                continue;
            }
            sibling.mark_rejected(&*self.clock);
            self.bids.update(&sibling).await?;
        }

        self.emit(MarketplaceEvent::BidAccepted {
            task_id,
            bid_id,
            tasker_id: winner.bidder().id().clone(),
        })
        .await;
        Ok(task)
    }

    /// Approves the accepted bid and holds the budget in escrow.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Precondition`] unless the task has an
    /// accepted bid and `actor` is the posting customer, or
    /// [`MarketplaceError::Repository`] when the task does not exist.
    pub async fn approve_and_hold_escrow(
        &self,
        task_id: TaskId,
        actor: &UserId,
    ) -> MarketplaceResult<Task> {
        let lock = self.locks.lock_for(task_id);
        let _guard = lock.lock().await;

        let mut task = self.load_task(task_id).await?;
        task.approve_and_hold_escrow(actor, self.commission_rate, &*self.clock)?;
        self.tasks.update(&task).await?;

        if let Some(escrow) = task.escrow() {
            self.emit(MarketplaceEvent::EscrowHeld {
                task_id,
                amount: escrow.amount(),
                commission: escrow.commission(),
                tasker_payment: escrow.tasker_payment(),
            })
            .await;
        }
        Ok(task)
    }

    /// Records one party's completion confirmation.
    ///
    /// Idempotent per role: a repeated confirmation by the same party
    /// changes nothing and emits nothing, including a re-send after the
    /// task has already reached completed.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Precondition`] unless the task is in an
    /// active (approved, in-progress or completed) state and `actor`
    /// matches `party`, or [`MarketplaceError::Repository`] when the task
    /// does not exist.
    pub async fn mark_completed(
        &self,
        task_id: TaskId,
        actor: &UserId,
        party: Party,
    ) -> MarketplaceResult<Task> {
        let lock = self.locks.lock_for(task_id);
        let _guard = lock.lock().await;

        let mut task = self.load_task(task_id).await?;
        let progress = task.record_completion(actor, party, &*self.clock)?;
        match progress {
            CompletionProgress::AlreadyRecorded => {}
            CompletionProgress::AwaitingOtherParty => {
                self.tasks.update(&task).await?;
                self.emit(MarketplaceEvent::CompletionRecorded { task_id, party })
                    .await;
            }
            CompletionProgress::Completed => {
                self.tasks.update(&task).await?;
                self.emit(MarketplaceEvent::TaskCompleted { task_id }).await;
            }
        }
        Ok(task)
    }

    /// Releases held escrow funds to the tasker.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Precondition`] unless the task is
    /// completed with held escrow and `actor` is the posting customer, or
    /// [`MarketplaceError::Repository`] when the task does not exist.
    pub async fn release_payment(
        &self,
        task_id: TaskId,
        actor: &UserId,
    ) -> MarketplaceResult<Task> {
        let lock = self.locks.lock_for(task_id);
        let _guard = lock.lock().await;

        let mut task = self.load_task(task_id).await?;
        task.release_payment(actor, &*self.clock)?;
        self.tasks.update(&task).await?;

        if let Some(escrow) = task.escrow() {
            self.emit(MarketplaceEvent::PaymentReleased {
                task_id,
                tasker_payment: escrow.tasker_payment(),
            })
            .await;
        }
        Ok(task)
    }

    /// Cancels a task before escrow approval.
    ///
    /// If a bid had been accepted, the assignment is cleared and the
    /// previously winning bid is demoted to rejected in the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Precondition`] unless the task is open
    /// or awaiting approval and `actor` is the posting customer, or
    /// [`MarketplaceError::Repository`] when the task does not exist.
    pub async fn cancel(&self, task_id: TaskId, actor: &UserId) -> MarketplaceResult<Task> {
        let lock = self.locks.lock_for(task_id);
        let _guard = lock.lock().await;

        let mut task = self.load_task(task_id).await?;
        let unaccepted_bid = task.cancel(actor, &*self.clock)?;
        self.tasks.update(&task).await?;

        if let Some(unaccepted_bid_id) = unaccepted_bid {
            if let Some(mut bid) = self.bids.find_by_id(unaccepted_bid_id).await? {
                bid.mark_rejected(&*self.clock);
                self.bids.update(&bid).await?;
            }
        }

        self.emit(MarketplaceEvent::TaskCancelled { task_id }).await;
        Ok(task)
    }

    /// Bumps a task's view counter.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Repository`] when the task does not
    /// exist.
    pub async fn record_view(&self, task_id: TaskId) -> MarketplaceResult<Task> {
        let lock = self.locks.lock_for(task_id);
        let _guard = lock.lock().await;

        let mut task = self.load_task(task_id).await?;
        task.record_view();
        self.tasks.update(&task).await?;
        Ok(task)
    }

    async fn load_task(&self, task_id: TaskId) -> MarketplaceResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| MarketplaceError::Repository(RepositoryError::TaskNotFound(task_id)))
    }

    /// Fire-and-forget: a committed transition is never rolled back because
    /// delivery failed.
    async fn emit(&self, event: MarketplaceEvent) {
        self.notifier.notify(&event).await.ok();
    }
}
