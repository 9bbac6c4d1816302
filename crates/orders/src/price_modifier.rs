//! Signed unit-price adjustments on a line item.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{Entity, EntityId, typed_id};

use crate::customisation::CustomisationId;
use crate::line_item::LineItemId;

typed_id!(
    /// Price modifier identifier.
    PriceModifierId(EntityId)
);

/// A discount (negative) or upcharge (positive) on the unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceModifier {
    pub id: PriceModifierId,
    pub line_item_id: LineItemId,
    pub name: String,
    pub modify_price: Decimal,
    /// Customisation this adjustment belongs to, if any ("Size: Large" → +2.00).
    pub customisation_id: Option<CustomisationId>,
}

impl PriceModifier {
    pub fn new(line_item_id: LineItemId, name: impl Into<String>, modify_price: Decimal) -> Self {
        Self {
            id: PriceModifierId::new(),
            line_item_id,
            name: name.into(),
            modify_price,
            customisation_id: None,
        }
    }
}

impl Entity for PriceModifier {
    type Id = PriceModifierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Ordered list of modifiers. Insertion order is kept for display; the sum
/// does not depend on it. No clamping happens here: a negative unit price is
/// legal and flows through to the order total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceModifierLedger {
    entries: Vec<PriceModifier>,
}

impl PriceModifierLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: PriceModifier) {
        self.entries.push(modifier);
    }

    pub fn entries(&self) -> &[PriceModifier] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceModifier> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Σ modify_price.
    pub fn total(&self) -> Decimal {
        self.entries.iter().map(|m| m.modify_price).sum()
    }

    /// `base + Σ modify_price`.
    pub fn apply(&self, base: Decimal) -> Decimal {
        base + self.total()
    }

    pub fn for_customisation(&self, id: CustomisationId) -> impl Iterator<Item = &PriceModifier> {
        self.entries
            .iter()
            .filter(move |m| m.customisation_id == Some(id))
    }
}

impl FromIterator<PriceModifier> for PriceModifierLedger {
    fn from_iter<T: IntoIterator<Item = PriceModifier>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
