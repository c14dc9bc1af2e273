//! Error types for marketplace domain validation and lifecycle guards.

use super::{BidId, TaskId, TaskStatus, UserId};
use thiserror::Error;

/// Errors returned while constructing domain values from caller input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task budget is zero.
    #[error("task budget must be positive")]
    NonPositiveBudget,

    /// The bid amount is zero.
    #[error("bid amount must be positive")]
    NonPositiveBidAmount,

    /// The bid message is empty after trimming.
    #[error("bid message must not be empty")]
    EmptyBidMessage,

    /// The user identity is empty after trimming.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// A monetary amount exceeds the representable maximum.
    #[error("amount {0} exceeds the supported maximum")]
    AmountTooLarge(u64),

    /// A commission rate exceeds 100%.
    #[error("commission rate {0} basis points exceeds 100%")]
    RateTooLarge(u16),
}

/// Errors returned when a lifecycle operation is invoked from a state or by
/// an actor it does not permit. The operation leaves the task untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreconditionError {
    /// The task is not in a status the operation accepts.
    #[error("cannot {operation} task {task_id}: status is {status}, requires {required}")]
    InvalidStatus {
        /// Task the operation targeted.
        task_id: TaskId,
        /// Operation that was refused.
        operation: &'static str,
        /// Status the task was found in.
        status: TaskStatus,
        /// Status (or statuses) the operation requires.
        required: &'static str,
    },

    /// The actor is not the task's customer.
    #[error("user {user_id} is not the customer of task {task_id}")]
    NotCustomer {
        /// Task the operation targeted.
        task_id: TaskId,
        /// Actor that was refused.
        user_id: UserId,
    },

    /// The actor is not the tasker assigned to the task.
    #[error("user {user_id} is not the assigned tasker of task {task_id}")]
    NotAssignedTasker {
        /// Task the operation targeted.
        task_id: TaskId,
        /// Actor that was refused.
        user_id: UserId,
    },

    /// The referenced bid was submitted against a different task.
    #[error("bid {bid_id} does not belong to task {task_id}")]
    BidNotForTask {
        /// Bid supplied by the caller.
        bid_id: BidId,
        /// Task the operation targeted.
        task_id: TaskId,
    },

    /// Payment release requires held escrow funds.
    #[error("escrow for task {task_id} is not held")]
    EscrowNotHeld {
        /// Task the operation targeted.
        task_id: TaskId,
    },
}

/// Error returned while parsing task statuses from their canonical strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
