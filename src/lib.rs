//! Piazza: task marketplace lifecycle and escrow core.
//!
//! This crate provides the core functionality for running a task
//! marketplace: posting tasks, collecting bids, assigning a winning
//! tasker, holding the budget in escrow, confirming completion from both
//! parties, and releasing payment.
//!
//! # Architecture
//!
//! Piazza follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory store,
//!   notification sinks)
//!
//! # Modules
//!
//! - [`marketplace`]: Task lifecycle, bid ledger, and escrow state machine

pub mod marketplace;
