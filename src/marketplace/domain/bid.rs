//! Bid aggregate and the bidder snapshot captured at submission time.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{BidId, Money, TaskId, UserId, ValidationError};

/// Acceptance state of a bid within its task's ledger.
///
/// At most one bid per task is `Accepted`, and that bid's identifier equals
/// the task's accepted-bid pointer. Both flags are amended only by the
/// accept-bid operation; bids are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidAcceptance {
    /// No acceptance decision has been made for the task yet.
    Pending,
    /// This bid won the task.
    Accepted,
    /// Another bid won, or the acceptance was withdrawn by cancellation.
    Rejected,
}

impl BidAcceptance {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `true` for the winning bid of a task.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl fmt::Display for BidAcceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the bidder taken when the bid is submitted.
///
/// Deliberately not live-joined against any user store; the marketplace
/// shows the reputation the tasker had at bidding time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidderProfile {
    id: UserId,
    name: String,
    rating_centi: u32,
    completed_tasks: u64,
    verified: bool,
}

impl BidderProfile {
    /// Creates a bidder snapshot with neutral reputation defaults.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rating_centi: 0,
            completed_tasks: 0,
            verified: false,
        }
    }

    /// Sets the bidder's rating in hundredths of a star (480 = 4.80).
    #[must_use]
    pub const fn with_rating_centi(mut self, rating_centi: u32) -> Self {
        self.rating_centi = rating_centi;
        self
    }

    /// Sets the bidder's completed-task count.
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

    /// Returns the bidder's identity.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the bidder's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rating in hundredths of a star.
    #[must_use]
    pub const fn rating_centi(&self) -> u32 {
        self.rating_centi
    }

    /// Returns the completed-task count at submission time.
    #[must_use]
    pub const fn completed_tasks(&self) -> u64 {
        self.completed_tasks
    }

    /// Returns whether the bidder was verified at submission time.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified
    }
}

/// Bid aggregate: one tasker's offer on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    id: BidId,
    task_id: TaskId,
    bidder: BidderProfile,
    amount: Money,
    message: String,
    delivery_time: String,
    response_time: Option<String>,
    acceptance: BidAcceptance,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Bid {
    /// Creates a new pending bid.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveBidAmount`] when the amount is
    /// zero, or [`ValidationError::EmptyBidMessage`] when the message is
    /// empty after trimming.
    pub fn submit(
        task_id: TaskId,
        bidder: BidderProfile,
        amount: Money,
        message: impl Into<String>,
        delivery_time: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, ValidationError> {
        if amount.is_zero() {
            return Err(ValidationError::NonPositiveBidAmount);
        }
        let raw_message = message.into();
        let normalized = raw_message.trim();
        if normalized.is_empty() {
            return Err(ValidationError::EmptyBidMessage);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: BidId::new(),
            task_id,
            bidder,
            amount,
            message: normalized.to_owned(),
            delivery_time: delivery_time.into(),
            response_time: None,
            acceptance: BidAcceptance::Pending,
            submitted_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Sets the bidder's estimated response time.
    #[must_use]
    pub fn with_response_time(mut self, response_time: impl Into<String>) -> Self {
        self.response_time = Some(response_time.into());
        self
    }

    /// Returns the bid identifier.
    #[must_use]
    pub const fn id(&self) -> BidId {
        self.id
    }

    /// Returns the task this bid was submitted against.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the bidder snapshot.
    #[must_use]
    pub const fn bidder(&self) -> &BidderProfile {
        &self.bidder
    }

    /// Returns the offered amount.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the bid message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the promised delivery time (free text).
    #[must_use]
    pub fn delivery_time(&self) -> &str {
        &self.delivery_time
    }

    /// Returns the estimated response time, if stated.
    #[must_use]
    pub fn response_time(&self) -> Option<&str> {
        self.response_time.as_deref()
    }

    /// Returns the acceptance state.
    #[must_use]
    pub const fn acceptance(&self) -> BidAcceptance {
        self.acceptance
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Returns the latest amendment timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Marks this bid as the winner of its task.
    pub fn mark_accepted(&mut self, clock: &impl Clock) {
        self.acceptance = BidAcceptance::Accepted;
        self.updated_at = clock.utc();
    }

    /// Marks this bid as rejected.
    pub fn mark_rejected(&mut self, clock: &impl Clock) {
        self.acceptance = BidAcceptance::Rejected;
        self.updated_at = clock.utc();
    }
}
