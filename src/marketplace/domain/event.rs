//! Domain events emitted after successful lifecycle transitions.

use serde::{Deserialize, Serialize};

use super::{BidId, Money, Party, TaskId, UserId};

/// Notification payload produced by the lifecycle engine.
///
/// Events describe committed transitions; delivery is fire-and-forget and
/// a delivery failure never rolls a transition back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketplaceEvent {
    /// A customer posted a new task.
    TaskCreated {
        /// The new task.
        task_id: TaskId,
        /// Posting customer.
        customer_id: UserId,
    },
    /// A tasker submitted a bid.
    BidSubmitted {
        /// Task the bid targets.
        task_id: TaskId,
        /// The new bid.
        bid_id: BidId,
        /// Bidding tasker.
        bidder_id: UserId,
    },
    /// The winning bid was accepted and its bidder assigned.
    BidAccepted {
        /// Task the bid targets.
        task_id: TaskId,
        /// Winning bid.
        bid_id: BidId,
        /// Assigned tasker.
        tasker_id: UserId,
    },
    /// The customer approved and the budget is held in escrow.
    EscrowHeld {
        /// Approved task.
        task_id: TaskId,
        /// Held amount (the task budget).
        amount: Money,
        /// Platform commission portion.
        commission: Money,
        /// Tasker's net payment portion.
        tasker_payment: Money,
    },
    /// One party confirmed completion; the other is still pending.
    CompletionRecorded {
        /// Task being completed.
        task_id: TaskId,
        /// Party that confirmed.
        party: Party,
    },
    /// Both parties confirmed completion.
    TaskCompleted {
        /// Completed task.
        task_id: TaskId,
    },
    /// Escrow funds were paid out to the tasker.
    PaymentReleased {
        /// Paid task.
        task_id: TaskId,
        /// Amount paid to the tasker.
        tasker_payment: Money,
    },
    /// The customer cancelled the task.
    TaskCancelled {
        /// Cancelled task.
        task_id: TaskId,
    },
}
