//! Monetary value types and the platform commission split.
//!
//! All amounts are integer minor units in a single currency; the crate
//! performs no float arithmetic. The commission is rounded half-up and the
//! tasker payment is derived by subtraction, so
//! `commission + tasker_payment == budget` holds exactly for every input.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Basis points in a whole (100%).
const RATE_SCALE: u64 = 10_000;

/// Non-negative monetary amount in minor units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Largest representable amount.
    ///
    /// Capped so that `amount * rate` in basis points, plus the half-up
    /// rounding term, cannot overflow `u64` inside [`compute_split`].
    #[expect(
        clippy::integer_division,
        reason = "exact integer bound derivation, no fractional part is wanted"
    )]
    pub const MAX_MINOR_UNITS: u64 = (u64::MAX - RATE_SCALE / 2) / RATE_SCALE;

    /// Creates a validated amount from minor units.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmountTooLarge`] when the value exceeds
    /// [`Self::MAX_MINOR_UNITS`].
    pub const fn new(minor_units: u64) -> Result<Self, ValidationError> {
        if minor_units > Self::MAX_MINOR_UNITS {
            return Err(ValidationError::AmountTooLarge(minor_units));
        }
        Ok(Self(minor_units))
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> u64 {
        self.0
    }

    /// Returns `true` when the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform commission rate in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommissionRate(u16);

impl CommissionRate {
    /// The platform default of 10%.
    pub const DEFAULT: Self = Self(1_000);

    /// Creates a validated rate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RateTooLarge`] when the rate exceeds
    /// 10 000 basis points (100%).
    pub const fn new(basis_points: u16) -> Result<Self, ValidationError> {
        if basis_points > 10_000 {
            return Err(ValidationError::RateTooLarge(basis_points));
        }
        Ok(Self(basis_points))
    }

    /// Returns the rate in basis points.
    #[must_use]
    pub const fn basis_points(self) -> u16 {
        self.0
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Result of splitting a budget between the platform and the tasker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSplit {
    /// Platform's cut of the budget.
    pub commission: Money,
    /// Net amount owed to the tasker.
    pub tasker_payment: Money,
}

/// Splits a budget into platform commission and tasker payment.
///
/// The commission is `budget * rate` rounded half-up; the tasker payment is
/// the remainder, never an independently rounded figure.
#[must_use]
#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "half-up rounding over basis points is exact integer arithmetic"
)]
pub fn compute_split(budget: Money, rate: CommissionRate) -> CommissionSplit {
    let scaled = budget.0 * u64::from(rate.0) + RATE_SCALE / 2;
    let commission = scaled / RATE_SCALE;
    CommissionSplit {
        commission: Money(commission),
        tasker_payment: Money(budget.0 - commission),
    }
}
