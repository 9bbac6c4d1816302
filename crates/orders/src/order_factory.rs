//! Finds or makes orders and reconciles their line items.
//!
//! Adding a product whose key already exists on the order merges quantities
//! into the existing item. The store enforces a unique `(order_id, key)`; when
//! a concurrent add wins that race the factory reloads and retries the add as
//! a merge.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion};
use shopdesk_products::ProductRef;
use shopdesk_tax::Delivery;

use crate::line_item::{LineItem, derive_key};
use crate::line_item_factory::LineItemFactory;
use crate::order::{Order, OrderId, OrderTotals};
use crate::services::OrderServices;
use crate::status::{OrderKind, OrderStatus};

/// Attempts for one `add_item` call before a conflict is surfaced.
pub const MAX_ADD_ATTEMPTS: u32 = 3;

/// A customisation requested when adding an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomisationSpec {
    pub title: String,
    pub value: String,
    #[serde(default)]
    pub extra: Option<serde_json::Value>,
}

impl CustomisationSpec {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = Some(extra);
        self
    }
}

/// A price modifier requested when adding an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSpec {
    pub name: String,
    pub amount: Decimal,
    /// Title of a customisation in the same request this modifier belongs to.
    #[serde(default)]
    pub customisation: Option<String>,
}

impl ModifierSpec {
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
            customisation: None,
        }
    }

    pub fn for_customisation(mut self, title: impl Into<String>) -> Self {
        self.customisation = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddItemOptions {
    pub lock: bool,
    /// Overrides the product's deliverable flag.
    pub deliverable: Option<bool>,
    pub customisations: Vec<CustomisationSpec>,
    /// Applied only when a new item is made; a merge keeps the existing
    /// item's modifiers.
    pub modifiers: Vec<ModifierSpec>,
}

#[derive(Debug)]
pub struct OrderFactory {
    services: OrderServices,
    order: Order,
}

impl OrderFactory {
    /// Load by id, else by reference, else start a new estimate.
    pub fn find_or_make(
        services: OrderServices,
        id: Option<OrderId>,
        reference: Option<u64>,
    ) -> DomainResult<Self> {
        Self::find_or_make_kind(services, id, reference, OrderKind::Estimate)
    }

    /// Like [`OrderFactory::find_or_make`], but a new order starts as an invoice.
    pub fn find_or_make_invoice(
        services: OrderServices,
        id: Option<OrderId>,
        reference: Option<u64>,
    ) -> DomainResult<Self> {
        Self::find_or_make_kind(services, id, reference, OrderKind::Invoice)
    }

    fn find_or_make_kind(
        services: OrderServices,
        id: Option<OrderId>,
        reference: Option<u64>,
        kind: OrderKind,
    ) -> DomainResult<Self> {
        let mut found = None;
        if let Some(id) = id {
            found = services.store.load_order(id)?;
        }
        if found.is_none() {
            if let Some(reference) = reference {
                found = services.store.find_order_by_reference(reference)?;
            }
        }

        let order = match found {
            Some(order) => order,
            None => {
                let order = Order::new(kind, &services.context);
                tracing::debug!(order_id = %order.id_typed(), kind = ?kind, "new order");
                order
            }
        };
        Ok(Self { services, order })
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn into_order(self) -> Order {
        self.order
    }

    pub fn totals(&self) -> OrderTotals {
        self.order
            .totals(self.services.products.as_ref(), self.services.context.rounding)
    }

    fn ensure_editable(&self) -> DomainResult<()> {
        if self.order.can_edit(&self.services.context.statuses) {
            Ok(())
        } else {
            Err(DomainError::unauthorized(format!(
                "EditNotAllowed: order {} is not editable",
                self.order.id_typed()
            )))
        }
    }

    fn ensure_persisted(&mut self) -> DomainResult<()> {
        if self.order.version() == 0 {
            self.write()?;
        }
        Ok(())
    }

    /// Refresh from the store. An order that was never written is kept as is.
    pub fn reload(&mut self) -> DomainResult<()> {
        if let Some(order) = self.services.store.load_order(self.order.id_typed())? {
            self.order = order;
        }
        Ok(())
    }

    fn not_enough_stock(title: &str, stock_id: &str, quantity: u32) -> DomainError {
        DomainError::validation(format!("NotEnoughStock: {title} x{quantity} ({stock_id})"))
    }

    /// Add `quantity` of a product. Merges into an existing item with the same
    /// key. Writes the order first if it has never been written.
    pub fn add_item(
        &mut self,
        product: &ProductRef,
        quantity: u32,
        options: AddItemOptions,
    ) -> DomainResult<LineItem> {
        self.ensure_editable()?;
        if quantity == 0 {
            return Err(DomainError::validation("InvalidQuantity: quantity must be positive"));
        }
        self.ensure_persisted()?;

        let mut attempt = 1;
        loop {
            match self.try_add_item(product, quantity, &options) {
                Err(DomainError::Conflict(reason)) if attempt < MAX_ADD_ATTEMPTS => {
                    tracing::warn!(
                        order_id = %self.order.id_typed(),
                        product = %product,
                        attempt,
                        %reason,
                        "line item conflict; retrying add"
                    );
                    self.reload()?;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn try_add_item(
        &mut self,
        product_ref: &ProductRef,
        quantity: u32,
        options: &AddItemOptions,
    ) -> DomainResult<LineItem> {
        let product = self
            .services
            .products
            .find(product_ref)
            .ok_or_else(|| DomainError::validation(format!("NoProductSet: {product_ref} not found")))?;

        let key = derive_key(
            &product.stock_id,
            options
                .customisations
                .iter()
                .map(|c| (c.title.as_str(), c.value.as_str())),
        );
        let order_id = self.order.id_typed();
        let existing = self.services.store.find_line_item_by_key(order_id, &key)?;

        let item = match existing {
            Some(existing) => {
                let merged = existing
                    .quantity()
                    .checked_add(quantity)
                    .ok_or_else(|| DomainError::validation("InvalidQuantity: quantity overflow"))?;
                let mut factory = LineItemFactory::for_item(self.services.clone(), existing, &self.order)
                    .with_quantity(merged)
                    .with_lock(options.lock);
                if let Some(deliverable) = options.deliverable {
                    factory = factory.with_deliverable(Some(deliverable));
                }
                if !factory.check_stock_level() {
                    return Err(Self::not_enough_stock(&product.title, &product.stock_id, merged));
                }
                factory.update()?;
                factory.write()?;
                tracing::info!(order_id = %order_id, key = %key, quantity = merged, "merged into existing line item");
                factory.into_item()
            }
            None => {
                let (title, stock_id) = (product.title.clone(), product.stock_id.clone());
                let mut factory = LineItemFactory::new(self.services.clone())
                    .with_product(product)
                    .with_parent(&self.order)
                    .with_quantity(quantity)
                    .with_lock(options.lock)
                    .with_deliverable(options.deliverable);
                if !factory.check_stock_level() {
                    return Err(Self::not_enough_stock(&title, &stock_id, quantity));
                }
                factory.make_item()?;

                let mut customisation_ids = Vec::with_capacity(options.customisations.len());
                for spec in &options.customisations {
                    let c = factory.customise(&spec.title, &spec.value, spec.extra.as_ref())?;
                    customisation_ids.push((spec.title.clone(), c.id));
                }
                for spec in &options.modifiers {
                    let customisation = match &spec.customisation {
                        Some(title) => Some(
                            customisation_ids
                                .iter()
                                .rev()
                                .find(|(t, _)| t == title)
                                .map(|(_, id)| *id)
                                .ok_or_else(|| {
                                    DomainError::logic(format!(
                                        "InvalidCustomisation: no customisation titled '{title}'"
                                    ))
                                })?,
                        ),
                        None => None,
                    };
                    factory.modify_price(&spec.name, spec.amount, customisation)?;
                }

                factory.update()?;
                factory.write()?;
                tracing::info!(order_id = %order_id, key = %key, quantity, "line item added");
                factory.into_item()
            }
        };

        let item = item.ok_or_else(|| DomainError::logic("NoItemSet: factory lost its item"))?;
        self.order.upsert_item(item.clone());
        Ok(item)
    }

    fn stored_item(&self, key: &str) -> DomainResult<LineItem> {
        self.services
            .store
            .find_line_item_by_key(self.order.id_typed(), key)?
            .ok_or_else(DomainError::not_found)
    }

    /// Set an item's absolute quantity. Zero removes the item.
    pub fn update_item(&mut self, key: &str, quantity: u32) -> DomainResult<Option<LineItem>> {
        self.ensure_editable()?;
        if quantity == 0 {
            self.remove_item(key)?;
            return Ok(None);
        }

        let existing = self.stored_item(key)?;
        let mut factory =
            LineItemFactory::for_item(self.services.clone(), existing, &self.order).with_quantity(quantity);
        if !factory.check_stock_level() {
            let stock_id = factory.item().map(|i| i.stock_id().to_string()).unwrap_or_default();
            let title = factory.item().map(|i| i.title().to_string()).unwrap_or_default();
            return Err(Self::not_enough_stock(&title, &stock_id, quantity));
        }
        factory.update()?;
        factory.write()?;

        let item = factory
            .into_item()
            .ok_or_else(|| DomainError::logic("NoItemSet: factory lost its item"))?;
        tracing::info!(order_id = %self.order.id_typed(), key, quantity, "line item quantity set");
        self.order.upsert_item(item.clone());
        Ok(Some(item))
    }

    pub fn remove_item(&mut self, key: &str) -> DomainResult<()> {
        self.ensure_editable()?;
        let existing = self.stored_item(key)?;
        let id = existing.id_typed();

        LineItemFactory::for_item(self.services.clone(), existing, &self.order).delete()?;
        self.order.remove_item(id);
        tracing::info!(order_id = %self.order.id_typed(), key, "line item removed");
        Ok(())
    }

    /// Set the delivery geography and re-resolve every item's tax rate.
    ///
    /// The order header is written first, so the stored items never carry
    /// rates for a geography the stored order does not have.
    pub fn set_delivery(&mut self, country: &str, region: &str) -> DomainResult<()> {
        self.ensure_editable()?;
        let mut next = self.order.clone();
        next.set_delivery(Delivery::new(country, region));
        self.commit(next)?;

        let items = self.order.items().to_vec();
        let mut refreshed = Vec::with_capacity(items.len());
        for item in items {
            let mut factory = LineItemFactory::for_item(self.services.clone(), item, &self.order);
            factory.update()?;
            if factory.item().is_some_and(LineItem::is_persisted) {
                factory.write()?;
            }
            refreshed.extend(factory.into_item());
        }
        self.order.set_items(refreshed);
        Ok(())
    }

    /// Order-level postage; kept until the next `write()`.
    pub fn set_postage(&mut self, cost: Decimal, tax: Decimal) -> DomainResult<()> {
        self.ensure_editable()?;
        self.order.set_postage(cost, tax);
        Ok(())
    }

    pub fn set_discount(&mut self, amount: Decimal) -> DomainResult<()> {
        self.ensure_editable()?;
        self.order.set_discount(amount);
        Ok(())
    }

    pub fn set_allow_negative_value(&mut self, allow: bool) -> DomainResult<()> {
        self.ensure_editable()?;
        self.order.set_allow_negative_value(allow);
        Ok(())
    }

    /// Set the invoice status in memory; `write()` persists and notifies.
    pub fn mark(&mut self, status: OrderStatus) -> DomainResult<()> {
        self.order.mark(status)
    }

    /// Persist the order header. If the status changed since the last write the
    /// notifier is called exactly once; its failure is logged, not returned.
    ///
    /// A new order draws its reference before saving. A failed save leaves the
    /// in-memory order without one, and the drawn number is not reused, so
    /// references can have gaps.
    pub fn write(&mut self) -> DomainResult<()> {
        let next = self.order.clone();
        self.commit(next)
    }

    /// Save `next` and adopt it as the factory's order only once the store
    /// has accepted it.
    fn commit(&mut self, mut next: Order) -> DomainResult<()> {
        let store = self.services.store.clone();
        if next.reference().is_none() {
            next.assign_reference(store.next_reference()?);
        }

        next.touch(Utc::now());
        let version = store.save_order(&next, ExpectedVersion::Exact(next.version()))?;
        let change = next.status_change();
        next.committed(version);
        self.order = next;

        if let Some((old, new)) = change {
            tracing::info!(
                order_id = %self.order.id_typed(),
                full_ref = ?self.order.full_ref(),
                old_status = %old,
                new_status = %new,
                "order status changed"
            );
            if let Err(err) = self.services.notifier.on_status_changed(&self.order, old, new) {
                tracing::warn!(
                    order_id = %self.order.id_typed(),
                    new_status = %new,
                    error = %err,
                    "status notification failed"
                );
            }
        }
        Ok(())
    }

    /// One-way Estimate → Invoice; keeps the id, reference and items. On a
    /// failed write the factory still holds the estimate.
    pub fn convert_to_invoice(&mut self) -> DomainResult<()> {
        let mut next = self.order.clone();
        next.convert_to_invoice(&self.services.context)?;
        self.commit(next)?;

        tracing::info!(
            order_id = %self.order.id_typed(),
            full_ref = ?self.order.full_ref(),
            "estimate converted to invoice"
        );
        if let Err(err) = self.services.notifier.on_converted(&self.order) {
            tracing::warn!(order_id = %self.order.id_typed(), error = %err, "conversion notification failed");
        }
        Ok(())
    }

    /// Delete the order with its items. Invoices are never deleted.
    pub fn delete(self) -> DomainResult<()> {
        if !self.order.can_delete() {
            return Err(DomainError::unauthorized(format!(
                "DeleteNotAllowed: invoice {} cannot be deleted",
                self.order.id_typed()
            )));
        }
        if self.order.version() > 0 {
            self.services.store.delete_order(self.order.id_typed())?;
        }
        tracing::info!(order_id = %self.order.id_typed(), "order deleted");
        Ok(())
    }
}
