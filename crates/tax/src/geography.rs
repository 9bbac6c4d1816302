use serde::{Deserialize, Serialize};

use shopdesk_core::ValueObject;

/// Delivery geography of an order: ISO-ish country code plus region/county code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub country: String,
    pub region: String,
}

impl ValueObject for Delivery {}

impl Delivery {
    pub fn new(country: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            region: region.into(),
        }
    }

    /// Both codes present (at least two characters each).
    pub fn is_complete(&self) -> bool {
        is_code(&self.country) && is_code(&self.region)
    }
}

fn is_code(code: &str) -> bool {
    code.trim().chars().count() >= 2
}
