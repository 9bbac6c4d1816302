//! Deployment configuration handed to the factories at construction.

use serde::{Deserialize, Serialize};

use shopdesk_core::Rounding;
use shopdesk_tax::TaxCategoryId;

use crate::status::{OrderKind, StatusConfig};

/// Reference prefixes, e.g. `EST-12` / `INV-12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberPrefixes {
    pub estimate: String,
    pub invoice: String,
}

impl Default for NumberPrefixes {
    fn default() -> Self {
        Self {
            estimate: "EST-".to_string(),
            invoice: "INV-".to_string(),
        }
    }
}

impl NumberPrefixes {
    pub fn for_kind(&self, kind: OrderKind) -> &str {
        match kind {
            OrderKind::Estimate => &self.estimate,
            OrderKind::Invoice => &self.invoice,
        }
    }
}

/// Everything the order engine would otherwise read from global site settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderContext {
    pub prefixes: NumberPrefixes,
    /// Category whose default rate applies to products without a rate.
    pub default_tax_category: Option<TaxCategoryId>,
    /// Refuse to add more of a stock-tracked product than is on hand.
    pub stock_check: bool,
    pub rounding: Rounding,
    pub statuses: StatusConfig,
    /// Initial `allow_negative_value` for new orders.
    pub allow_negative_value: bool,
}

impl Default for OrderContext {
    fn default() -> Self {
        Self {
            prefixes: NumberPrefixes::default(),
            default_tax_category: None,
            stock_check: false,
            rounding: Rounding::default(),
            statuses: StatusConfig::default(),
            allow_negative_value: false,
        }
    }
}
