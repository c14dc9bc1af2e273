//! Task lifecycle and escrow management for Piazza.
//!
//! This module implements the marketplace core: customers post tasks,
//! taskers bid against them, and an accepted bid moves the task through
//! escrow approval, dual completion confirmation, and payment release.
//! Every transition is validated by the domain state machine before it is
//! persisted. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
