//! Persistence boundary for orders and their line items.
//!
//! The store is a row store, not an event store: each write replaces one row
//! and bumps its version. Implementations live in `shopdesk-infra`.

use std::sync::Arc;

use thiserror::Error;

use shopdesk_core::{DomainError, ExpectedVersion};

use crate::customisation::Customisation;
use crate::line_item::{LineItem, LineItemId};
use crate::order::{Order, OrderId};
use crate::price_modifier::PriceModifier;

/// Store operation error.
///
/// These are infrastructure errors; they convert into [`DomainError`] at the
/// factory boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `(order_id, key)` is unique among line items.
    #[error("duplicate line item key '{key}' on order {order_id}")]
    DuplicateKey { order_id: OrderId, key: String },

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { .. } => DomainError::conflict(format!("DuplicateKey: {err}")),
            StoreError::Concurrency(_) => DomainError::conflict(format!("StaleVersion: {err}")),
            StoreError::NotFound(_) => DomainError::not_found(),
            StoreError::Backend(_) => DomainError::logic(format!("StoreFailure: {err}")),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row store for orders.
///
/// Writes return the new version of the row. `ExpectedVersion::Exact(0)` on an
/// insert means "must not exist yet".
pub trait OrderStore: Send + Sync {
    /// Next order reference; monotonically increasing, shared by both kinds.
    fn next_reference(&self) -> StoreResult<u64>;

    /// Insert or update the order header. Line items are written separately.
    fn save_order(&self, order: &Order, expected: ExpectedVersion) -> StoreResult<u64>;

    /// Order with its line items, customisations and modifiers.
    fn load_order(&self, id: OrderId) -> StoreResult<Option<Order>>;

    fn find_order_by_reference(&self, reference: u64) -> StoreResult<Option<Order>>;

    /// Delete an order and everything it owns.
    fn delete_order(&self, id: OrderId) -> StoreResult<()>;

    /// Insert a new line item row with its children. Fails with
    /// [`StoreError::DuplicateKey`] if the order already has an item with its key.
    fn insert_line_item(&self, item: &LineItem) -> StoreResult<u64>;

    /// Update an existing line item row (children are not touched).
    fn update_line_item(&self, item: &LineItem, expected: ExpectedVersion) -> StoreResult<u64>;

    fn load_line_item(&self, id: LineItemId) -> StoreResult<Option<LineItem>>;

    fn find_line_item_by_key(&self, order_id: OrderId, key: &str) -> StoreResult<Option<LineItem>>;

    /// Delete a line item and its customisations and modifiers.
    fn delete_line_item(&self, id: LineItemId) -> StoreResult<()>;

    fn insert_customisation(&self, customisation: &Customisation) -> StoreResult<()>;

    fn insert_price_modifier(&self, modifier: &PriceModifier) -> StoreResult<()>;
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn next_reference(&self) -> StoreResult<u64> {
        (**self).next_reference()
    }

    fn save_order(&self, order: &Order, expected: ExpectedVersion) -> StoreResult<u64> {
        (**self).save_order(order, expected)
    }

    fn load_order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        (**self).load_order(id)
    }

    fn find_order_by_reference(&self, reference: u64) -> StoreResult<Option<Order>> {
        (**self).find_order_by_reference(reference)
    }

    fn delete_order(&self, id: OrderId) -> StoreResult<()> {
        (**self).delete_order(id)
    }

    fn insert_line_item(&self, item: &LineItem) -> StoreResult<u64> {
        (**self).insert_line_item(item)
    }

    fn update_line_item(&self, item: &LineItem, expected: ExpectedVersion) -> StoreResult<u64> {
        (**self).update_line_item(item, expected)
    }

    fn load_line_item(&self, id: LineItemId) -> StoreResult<Option<LineItem>> {
        (**self).load_line_item(id)
    }

    fn find_line_item_by_key(&self, order_id: OrderId, key: &str) -> StoreResult<Option<LineItem>> {
        (**self).find_line_item_by_key(order_id, key)
    }

    fn delete_line_item(&self, id: LineItemId) -> StoreResult<()> {
        (**self).delete_line_item(id)
    }

    fn insert_customisation(&self, customisation: &Customisation) -> StoreResult<()> {
        (**self).insert_customisation(customisation)
    }

    fn insert_price_modifier(&self, modifier: &PriceModifier) -> StoreResult<()> {
        (**self).insert_price_modifier(modifier)
    }
}
