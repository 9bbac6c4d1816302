//! Currency rounding policy.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Decimal places and strategy used for money.
///
/// Amounts are rounded half away from zero. Internal arithmetic (per-unit tax)
/// uses `internal_dp`; values shown to people use `display_dp`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rounding {
    pub internal_dp: u32,
    pub display_dp: u32,
}

impl Default for Rounding {
    fn default() -> Self {
        Self {
            internal_dp: 3,
            display_dp: 2,
        }
    }
}

impl ValueObject for Rounding {}

impl Rounding {
    pub fn new(internal_dp: u32, display_dp: u32) -> Self {
        Self {
            internal_dp,
            display_dp,
        }
    }

    /// Round to internal precision.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.internal_dp, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Round to display precision.
    pub fn display(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.display_dp, RoundingStrategy::MidpointAwayFromZero)
    }
}
