//! Task aggregate root and the lifecycle/escrow state machine.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    Bid, BidId, CommissionRate, Money, ParseTaskStatusError, PreconditionError, TaskId, UserId,
    ValidationError, compute_split,
};

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is posted and accepting bids.
    Open,
    /// A bid has been accepted; awaiting the customer's escrow approval.
    BidAccepted,
    /// The customer approved and escrow funds are held.
    Approved,
    /// One party has recorded completion; the other has not yet.
    InProgress,
    /// Both parties confirmed completion.
    Completed,
    /// The customer cancelled the task before work was approved.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::BidAccepted => "bid_accepted",
            Self::Approved => "approved",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the lifecycle permits moving from `self` to `to`.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Open, Self::BidAccepted | Self::Cancelled)
                | (Self::BidAccepted, Self::Approved | Self::Cancelled)
                | (Self::Approved, Self::InProgress | Self::Completed)
                | (Self::InProgress, Self::Completed)
        )
    }

    /// Returns `true` when no further status change is possible.
    ///
    /// Payment release happens within `Completed` and is not a status
    /// change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "bid_accepted" => Ok(Self::BidAccepted),
            "approved" => Ok(Self::Approved),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the budget is a fixed price or an hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    /// One fixed price for the whole task.
    Fixed,
    /// Budget is an hourly rate.
    Hourly,
}

impl BudgetType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Hourly => "hourly",
        }
    }
}

/// State of platform-held funds for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    /// Escrow record exists but funds are not yet held.
    Pending,
    /// Funds are held by the platform.
    Held,
    /// Funds have been paid out to the tasker.
    Released,
    /// Funds were returned to the customer.
    Refunded,
}

impl EscrowStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Held => "held",
            Self::Released => "released",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-held funds between approval and payment release.
///
/// Constructed only by [`Task::approve_and_hold_escrow`], which derives the
/// split from the task budget; a `Held` escrow therefore always satisfies
/// `commission + tasker_payment == amount` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    amount: Money,
    status: EscrowStatus,
    commission: Money,
    tasker_payment: Money,
}

impl Escrow {
    fn hold(budget: Money, rate: CommissionRate) -> Self {
        let split = compute_split(budget, rate);
        Self {
            amount: budget,
            status: EscrowStatus::Held,
            commission: split.commission,
            tasker_payment: split.tasker_payment,
        }
    }

    /// Returns the full held amount (equal to the task budget).
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the escrow status.
    #[must_use]
    pub const fn status(&self) -> EscrowStatus {
        self.status
    }

    /// Returns the platform commission portion.
    #[must_use]
    pub const fn commission(&self) -> Money {
        self.commission
    }

    /// Returns the tasker's net payment portion.
    #[must_use]
    pub const fn tasker_payment(&self) -> Money {
        self.tasker_payment
    }
}

/// Tasker assignment recorded when a bid is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedTasker {
    id: UserId,
    name: String,
}

impl AssignedTasker {
    /// Returns the assigned tasker's identity.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the assigned tasker's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The two independent parties whose agreement completes a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// The task-posting actor.
    Customer,
    /// The task-performing actor.
    Tasker,
}

impl Party {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Tasker => "tasker",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of recording one party's completion confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionProgress {
    /// The party had already confirmed; nothing changed.
    AlreadyRecorded,
    /// This party's confirmation was recorded; the other is still pending.
    AwaitingOtherParty,
    /// Both parties have confirmed; the task is now completed.
    Completed,
}

/// Validated descriptive and commercial fields of a task posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListing {
    title: String,
    description: String,
    category: String,
    skills: Vec<String>,
    images: Vec<String>,
    time_estimate: Option<String>,
    location: Option<String>,
    is_remote: bool,
    special_instructions: Option<String>,
    budget: Money,
    budget_type: BudgetType,
}

impl TaskListing {
    /// Creates a validated listing.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTitle`] when the title is empty after
    /// trimming, or [`ValidationError::NonPositiveBudget`] when the budget
    /// is zero.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        budget: Money,
        budget_type: BudgetType,
    ) -> Result<Self, ValidationError> {
        let raw_title = title.into();
        let normalized_title = raw_title.trim();
        if normalized_title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if budget.is_zero() {
            return Err(ValidationError::NonPositiveBudget);
        }

        Ok(Self {
            title: normalized_title.to_owned(),
            description: description.into(),
            category: category.into(),
            skills: Vec::new(),
            images: Vec::new(),
            time_estimate: None,
            location: None,
            is_remote: false,
            special_instructions: None,
            budget,
            budget_type,
        })
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

    /// Sets the estimated time to complete (free text).
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

/// Task aggregate root.
///
/// Lifecycle fields are mutated only through the methods below; every
/// method validates status and actor preconditions before touching state,
/// so a failed call leaves the aggregate exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    customer_id: UserId,
    listing: TaskListing,
    status: TaskStatus,
    assigned_tasker: Option<AssignedTasker>,
    accepted_bid_id: Option<BidId>,
    customer_completed: bool,
    tasker_completed: bool,
    completed_at: Option<DateTime<Utc>>,
    payment_released: bool,
    escrow: Option<Escrow>,
    bids_count: u64,
    views_count: u64,
    posted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Posts a new open task for the given customer.
    #[must_use]
    pub fn post(customer_id: UserId, listing: TaskListing, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            customer_id,
            listing,
            status: TaskStatus::Open,
            assigned_tasker: None,
            accepted_bid_id: None,
            customer_completed: false,
            tasker_completed: false,
            completed_at: None,
            payment_released: false,
            escrow: None,
            bids_count: 0,
            views_count: 0,
            posted_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the posting customer's identity.
    #[must_use]
    pub const fn customer_id(&self) -> &UserId {
        &self.customer_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.listing.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.listing.description
    }

    /// Returns the task category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.listing.category
    }

    /// Returns the required skills.
    #[must_use]
    pub fn skills(&self) -> &[String] {
        &self.listing.skills
    }

    /// Returns attached image references.
    #[must_use]
    pub fn images(&self) -> &[String] {
        &self.listing.images
    }

    /// Returns the estimated time to complete, if stated.
    #[must_use]
    pub fn time_estimate(&self) -> Option<&str> {
        self.listing.time_estimate.as_deref()
    }

    /// Returns the task location, if stated.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.listing.location.as_deref()
    }

    /// Returns whether the task can be performed remotely.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.listing.is_remote
    }

    /// Returns special instructions for the tasker, if any.
    #[must_use]
    pub fn special_instructions(&self) -> Option<&str> {
        self.listing.special_instructions.as_deref()
    }

    /// Returns the task budget.
    #[must_use]
    pub const fn budget(&self) -> Money {
        self.listing.budget
    }

    /// Returns the budget type.
    #[must_use]
    pub const fn budget_type(&self) -> BudgetType {
        self.listing.budget_type
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the assigned tasker, if a bid has been accepted.
    #[must_use]
    pub const fn assigned_tasker(&self) -> Option<&AssignedTasker> {
        self.assigned_tasker.as_ref()
    }

    /// Returns the accepted bid's identifier, if any.
    #[must_use]
    pub const fn accepted_bid_id(&self) -> Option<BidId> {
        self.accepted_bid_id
    }

    /// Returns whether the customer has confirmed completion.
    #[must_use]
    pub const fn customer_completed(&self) -> bool {
        self.customer_completed
    }

    /// Returns whether the tasker has confirmed completion.
    #[must_use]
    pub const fn tasker_completed(&self) -> bool {
        self.tasker_completed
    }

    /// Returns the completion timestamp, once both parties confirmed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns whether escrow funds have been paid out.
    #[must_use]
    pub const fn payment_released(&self) -> bool {
        self.payment_released
    }

    /// Returns the escrow record, present from approval onward.
    #[must_use]
    pub const fn escrow(&self) -> Option<&Escrow> {
        self.escrow.as_ref()
    }

    /// Returns the number of bids submitted against this task.
    #[must_use]
    pub const fn bids_count(&self) -> u64 {
        self.bids_count
    }

    /// Returns the number of recorded views.
    #[must_use]
    pub const fn views_count(&self) -> u64 {
        self.views_count
    }

    /// Returns the posting timestamp.
    #[must_use]
    pub const fn posted_at(&self) -> DateTime<Utc> {
        self.posted_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Accepts the winning bid, assigning its bidder to the task.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::InvalidStatus`] unless the task is
    /// `Open`, or [`PreconditionError::BidNotForTask`] when the bid was
    /// submitted against a different task.
    pub fn accept_bid(&mut self, bid: &Bid, clock: &impl Clock) -> Result<(), PreconditionError> {
        self.require_status(TaskStatus::Open, "accept a bid on", "open")?;
        if bid.task_id() != self.id {
            return Err(PreconditionError::BidNotForTask {
                bid_id: bid.id(),
                task_id: self.id,
            });
        }

        self.assigned_tasker = Some(AssignedTasker {
            id: bid.bidder().id().clone(),
            name: bid.bidder().name().to_owned(),
        });
        self.accepted_bid_id = Some(bid.id());
        self.status = TaskStatus::BidAccepted;
        self.touch(clock);
        Ok(())
    }

    /// Approves the accepted bid and holds the budget in escrow.
    ///
    /// The escrow amount equals the budget; the commission and tasker
    /// payment are derived from `rate` in a single update.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::InvalidStatus`] unless the task is
    /// `BidAccepted`, or [`PreconditionError::NotCustomer`] when `actor`
    /// is not the posting customer.
    pub fn approve_and_hold_escrow(
        &mut self,
        actor: &UserId,
        rate: CommissionRate,
        clock: &impl Clock,
    ) -> Result<(), PreconditionError> {
        self.require_status(TaskStatus::BidAccepted, "approve escrow for", "bid_accepted")?;
        self.require_customer(actor)?;

        self.escrow = Some(Escrow::hold(self.listing.budget, rate));
        self.status = TaskStatus::Approved;
        self.touch(clock);
        Ok(())
    }

    /// Records one party's completion confirmation.
    ///
    /// Re-confirming by the same party is a no-op, not an error (the UI may
    /// re-send the action), including after the task has already reached
    /// `Completed`. Once both parties have confirmed, the task moves to
    /// `Completed`; until then it sits in `InProgress`.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::InvalidStatus`] unless the task is
    /// `Approved`, `InProgress` or `Completed`,
    /// [`PreconditionError::NotCustomer`] or
    /// [`PreconditionError::NotAssignedTasker`] when `actor` does not match
    /// `party`.
    pub fn record_completion(
        &mut self,
        actor: &UserId,
        party: Party,
        clock: &impl Clock,
    ) -> Result<CompletionProgress, PreconditionError> {
        if !matches!(
            self.status,
            TaskStatus::Approved | TaskStatus::InProgress | TaskStatus::Completed
        ) {
            return Err(self.invalid_status("record completion for", "approved or in_progress"));
        }

        // In Completed both flags are set, so a re-send by either party is
        // caught below and only Approved or InProgress reach the mutation.
        let already_recorded = match party {
            Party::Customer => {
                self.require_customer(actor)?;
                self.customer_completed
            }
            Party::Tasker => {
                self.require_assigned_tasker(actor)?;
                self.tasker_completed
            }
        };
        if already_recorded {
            return Ok(CompletionProgress::AlreadyRecorded);
        }

        match party {
            Party::Customer => self.customer_completed = true,
            Party::Tasker => self.tasker_completed = true,
        }

        let progress = if self.customer_completed && self.tasker_completed {
            self.status = TaskStatus::Completed;
            self.completed_at = Some(clock.utc());
            CompletionProgress::Completed
        } else {
            self.status = TaskStatus::InProgress;
            CompletionProgress::AwaitingOtherParty
        };
        self.touch(clock);
        Ok(progress)
    }

    /// Releases the held escrow funds to the tasker.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::InvalidStatus`] unless the task is
    /// `Completed`, [`PreconditionError::NotCustomer`] when `actor` is not
    /// the posting customer, or [`PreconditionError::EscrowNotHeld`] when
    /// no held escrow exists (e.g. already released).
    pub fn release_payment(
        &mut self,
        actor: &UserId,
        clock: &impl Clock,
    ) -> Result<(), PreconditionError> {
        self.require_status(TaskStatus::Completed, "release payment for", "completed")?;
        self.require_customer(actor)?;
        let escrow = match self.escrow.as_mut() {
            Some(escrow) if escrow.status == EscrowStatus::Held => escrow,
            _ => return Err(PreconditionError::EscrowNotHeld { task_id: self.id }),
        };

        escrow.status = EscrowStatus::Released;
        self.payment_released = true;
        self.touch(clock);
        Ok(())
    }

    /// Cancels the task before escrow approval.
    ///
    /// Cancelling after a bid was accepted clears the assignment and the
    /// accepted-bid pointer; the previously accepted bid's identifier is
    /// returned so the ledger can demote it.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::InvalidStatus`] unless the task is
    /// `Open` or `BidAccepted`, or [`PreconditionError::NotCustomer`] when
    /// `actor` is not the posting customer.
    pub fn cancel(
        &mut self,
        actor: &UserId,
        clock: &impl Clock,
    ) -> Result<Option<BidId>, PreconditionError> {
        if !matches!(self.status, TaskStatus::Open | TaskStatus::BidAccepted) {
            return Err(self.invalid_status("cancel", "open or bid_accepted"));
        }
        self.require_customer(actor)?;

        let unaccepted_bid = self.accepted_bid_id.take();
        self.assigned_tasker = None;
        self.status = TaskStatus::Cancelled;
        self.touch(clock);
        Ok(unaccepted_bid)
    }

    /// Increments the bid counter (monotonic).
    pub const fn increment_bids_count(&mut self) {
        self.bids_count = self.bids_count.saturating_add(1);
    }

    /// Increments the view counter (monotonic).
    ///
    /// Deliberately does not touch `updated_at`: views are not lifecycle
    /// activity.
    pub const fn record_view(&mut self) {
        self.views_count = self.views_count.saturating_add(1);
    }

    fn require_status(
        &self,
        required: TaskStatus,
        operation: &'static str,
        required_label: &'static str,
    ) -> Result<(), PreconditionError> {
        if self.status == required {
            Ok(())
        } else {
            Err(self.invalid_status(operation, required_label))
        }
    }

    const fn invalid_status(
        &self,
        operation: &'static str,
        required: &'static str,
    ) -> PreconditionError {
        PreconditionError::InvalidStatus {
            task_id: self.id,
            operation,
            status: self.status,
            required,
        }
    }

    fn require_customer(&self, actor: &UserId) -> Result<(), PreconditionError> {
        if actor == &self.customer_id {
            Ok(())
        } else {
            Err(PreconditionError::NotCustomer {
                task_id: self.id,
                user_id: actor.clone(),
            })
        }
    }

    fn require_assigned_tasker(&self, actor: &UserId) -> Result<(), PreconditionError> {
        match self.assigned_tasker.as_ref() {
            Some(assigned) if assigned.id() == actor => Ok(()),
            _ => Err(PreconditionError::NotAssignedTasker {
                task_id: self.id,
                user_id: actor.clone(),
            }),
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
