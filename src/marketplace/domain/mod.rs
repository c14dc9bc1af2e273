//! Domain model for the task-marketplace lifecycle and escrow core.
//!
//! The domain models task posting, bidding, bid acceptance, escrow holding,
//! two-party completion, payment release, and cancellation while keeping
//! all infrastructure concerns outside of the domain boundary.

mod bid;
mod error;
mod event;
mod ids;
mod money;
mod task;

pub use bid::{Bid, BidAcceptance, BidderProfile};
pub use error::{ParseTaskStatusError, PreconditionError, ValidationError};
pub use event::MarketplaceEvent;
pub use ids::{BidId, TaskId, UserId};
pub use money::{CommissionRate, CommissionSplit, Money, compute_split};
pub use task::{
    AssignedTasker, BudgetType, CompletionProgress, Escrow, EscrowStatus, Party, Task,
    TaskListing, TaskStatus,
};
