use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::ValueObject;

/// Tax rate identifier (row id in the host's tax configuration).
///
/// `TaxRateId::INVALID` (-1) marks the zero-rate sentinel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRateId(pub i64);

impl TaxRateId {
    pub const INVALID: TaxRateId = TaxRateId(-1);

    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl core::fmt::Display for TaxRateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A tax percentage (e.g. `20.0` for 20%).
///
/// "No rate" is never modelled as an absent value: it is `TaxRate::zero()`,
/// whose id is `TaxRateId::INVALID`, so arithmetic never branches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    pub id: TaxRateId,
    pub title: String,
    pub rate: Decimal,
}

impl ValueObject for TaxRate {}

impl TaxRate {
    pub fn new(id: TaxRateId, title: impl Into<String>, rate: Decimal) -> Self {
        Self {
            id,
            title: title.into(),
            rate,
        }
    }

    /// The zero-rate sentinel.
    pub fn zero() -> Self {
        Self {
            id: TaxRateId::INVALID,
            title: String::new(),
            rate: Decimal::ZERO,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !self.id.is_valid()
    }

    /// Tax due on `amount` at this rate, unrounded.
    pub fn tax_on(&self, amount: Decimal) -> Decimal {
        amount / Decimal::ONE_HUNDRED * self.rate
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self::zero()
    }
}
