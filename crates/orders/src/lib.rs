//! Orders domain module: estimates, invoices and their line items.
//!
//! Pricing, tax and key reconciliation are deterministic domain logic. Storage,
//! the product catalog, tax configuration and notifications are reached only
//! through the traits in [`store`], [`notify`] and the products/tax crates.

pub mod context;
pub mod customisation;
pub mod events;
pub mod line_item;
pub mod line_item_factory;
pub mod notify;
pub mod order;
pub mod order_factory;
pub mod price_modifier;
pub mod services;
pub mod status;
pub mod store;

pub use context::{NumberPrefixes, OrderContext};
pub use customisation::{Customisation, CustomisationId};
pub use events::{OrderConverted, OrderEvent, OrderStatusChanged};
pub use line_item::{LineItem, LineItemId, LineItemRow, LinePricing, derive_key};
pub use line_item_factory::LineItemFactory;
pub use notify::{NoopNotifier, NotificationError, StatusNotifier};
pub use order::{Order, OrderId, OrderRow, OrderTotals};
pub use order_factory::{AddItemOptions, CustomisationSpec, MAX_ADD_ATTEMPTS, ModifierSpec, OrderFactory};
pub use price_modifier::{PriceModifier, PriceModifierId, PriceModifierLedger};
pub use services::OrderServices;
pub use status::{OrderKind, OrderStatus, StatusConfig};
pub use store::{OrderStore, StoreError, StoreResult};
