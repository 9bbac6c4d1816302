//! Builds and updates line items.
//!
//! Line items are never mutated in place by callers: they are made, customised,
//! re-derived with `update()` and persisted with `write()` through this factory.

use rust_decimal::Decimal;

use shopdesk_core::{DomainError, DomainResult, ExpectedVersion};
use shopdesk_products::Product;
use shopdesk_tax::{Delivery, TaxRate};

use crate::customisation::{Customisation, CustomisationId};
use crate::line_item::LineItem;
use crate::order::{Order, OrderId};
use crate::price_modifier::PriceModifier;
use crate::services::OrderServices;

#[derive(Debug)]
pub struct LineItemFactory {
    services: OrderServices,
    item: Option<LineItem>,
    product: Option<Product>,
    /// Product was re-associated after the item was made; re-pin on update.
    repin: bool,
    parent: Option<(OrderId, Delivery)>,
    quantity: u32,
    lock: bool,
    deliverable: Option<bool>,
}

impl LineItemFactory {
    pub fn new(services: OrderServices) -> Self {
        Self {
            services,
            item: None,
            product: None,
            repin: false,
            parent: None,
            quantity: 1,
            lock: false,
            deliverable: None,
        }
    }

    /// Factory for an existing item, with its pinned product version.
    pub fn for_item(services: OrderServices, item: LineItem, order: &Order) -> Self {
        let product = item.find_stock_item(services.products.as_ref());
        Self {
            quantity: item.quantity(),
            lock: item.is_locked(),
            deliverable: Some(item.is_deliverable()),
            product,
            parent: Some((order.id_typed(), order.delivery().clone())),
            item: Some(item),
            repin: false,
            services,
        }
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.set_product(product);
        self
    }

    /// Associate a product. On an existing item this re-pins its price on the
    /// next `update()`.
    pub fn set_product(&mut self, product: Product) {
        self.repin = self.item.is_some();
        self.product = Some(product);
    }

    pub fn with_parent(mut self, order: &Order) -> Self {
        self.parent = Some((order.id_typed(), order.delivery().clone()));
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    /// Overrides the product's deliverable flag.
    pub fn with_deliverable(mut self, deliverable: Option<bool>) -> Self {
        self.deliverable = deliverable;
        self
    }

    pub fn item(&self) -> Option<&LineItem> {
        self.item.as_ref()
    }

    pub fn into_item(self) -> Option<LineItem> {
        self.item
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    fn resolve_tax(&self, product: &Product) -> TaxRate {
        let delivery = self.parent.as_ref().map(|(_, d)| d);
        self.services
            .resolver()
            .find_best_tax_rate(Some(product), delivery)
    }

    fn pinned_price(product: &Product) -> DomainResult<Decimal> {
        product.base_price.ok_or_else(|| {
            DomainError::validation(format!("MissingBasePrice: {}", product.product_ref()))
        })
    }

    fn item_mut(&mut self) -> DomainResult<&mut LineItem> {
        self.item
            .as_mut()
            .ok_or_else(|| DomainError::validation("NoItemSet"))
    }

    /// Snapshot the product onto a new, unsaved line item.
    pub fn make_item(&mut self) -> DomainResult<&LineItem> {
        let product = self
            .product
            .as_ref()
            .ok_or_else(|| DomainError::validation("NoProductSet"))?;
        let price = Self::pinned_price(product)?;
        let (order_id, _) = self
            .parent
            .as_ref()
            .ok_or_else(|| DomainError::validation("NoParentOrder"))?;

        let tax_rate = self.resolve_tax(product);
        let mut item = LineItem::snapshot(*order_id, product, price, tax_rate, self.quantity);
        item.set_locked(self.lock);
        if let Some(deliverable) = self.deliverable {
            item.set_deliverable(deliverable);
        }

        tracing::debug!(
            order_id = %order_id,
            key = %item.key(),
            product = %item.product(),
            quantity = self.quantity,
            "line item made"
        );

        self.repin = false;
        Ok(&*self.item.insert(item))
    }

    /// Attach a customisation. Allowed fields of `extra` are always mapped.
    pub fn customise(
        &mut self,
        title: &str,
        value: &str,
        extra: Option<&serde_json::Value>,
    ) -> DomainResult<Customisation> {
        let store = self.services.store.clone();
        let item = self.item_mut()?;

        let mut customisation = Customisation::new(item.id_typed(), title, value);
        if let Some(extra) = extra {
            customisation.apply_extra(extra)?;
        }
        if item.is_persisted() {
            store.insert_customisation(&customisation)?;
        }
        item.push_customisation(customisation.clone());
        Ok(customisation)
    }

    /// Attach a price modifier, optionally linked to one of this item's
    /// customisations.
    pub fn modify_price(
        &mut self,
        name: &str,
        amount: Decimal,
        customisation: Option<CustomisationId>,
    ) -> DomainResult<PriceModifier> {
        let store = self.services.store.clone();
        let item = self.item_mut()?;

        if let Some(id) = customisation {
            if !item.customisations().iter().any(|c| c.id == id) {
                return Err(DomainError::logic(format!(
                    "InvalidCustomisation: {id} does not belong to line item {}",
                    item.id_typed()
                )));
            }
        }

        let mut modifier = PriceModifier::new(item.id_typed(), name, amount);
        modifier.customisation_id = customisation;
        if item.is_persisted() {
            store.insert_price_modifier(&modifier)?;
        }
        item.push_modifier(modifier.clone());
        Ok(modifier)
    }

    /// Re-derive snapshot fields from the current product, quantity and lock
    /// state, then recompute the key. The pinned price only changes if a
    /// product was re-associated with `set_product`.
    pub fn update(&mut self) -> DomainResult<()> {
        let tax_rate = self.product.as_ref().map(|p| self.resolve_tax(p));
        let repin_price = match (&self.product, self.repin) {
            (Some(product), true) => Some(Self::pinned_price(product)?),
            _ => None,
        };

        let quantity = self.quantity;
        let lock = self.lock;
        let deliverable = self.deliverable;
        let product = self.product.clone();
        let item = self.item_mut()?;

        if let Some(product) = &product {
            item.refresh_from(product);
            if let Some(price) = repin_price {
                item.repin(product, price);
            }
            item.set_deliverable(deliverable.unwrap_or(product.deliverable));
        } else if let Some(deliverable) = deliverable {
            item.set_deliverable(deliverable);
        }
        if let Some(rate) = tax_rate {
            item.set_tax_rate(rate);
        }
        item.set_quantity(quantity);
        item.set_locked(lock);
        let key = item.generate_key();
        item.set_key(key);

        self.repin = false;
        Ok(())
    }

    /// `true` when stock checking is off, the product is not stock tracked, or
    /// enough live stock remains for the requested quantity.
    pub fn check_stock_level(&self) -> bool {
        if !self.services.context.stock_check {
            return true;
        }
        let products = self.services.products.as_ref();
        match (&self.item, &self.product) {
            (Some(item), _) if !item.is_stocked() => true,
            (Some(item), _) => item.check_stock_level(products, self.quantity) >= 0,
            (None, Some(product)) if !product.stock.stocked => true,
            (None, Some(product)) => {
                products.current_stock_level(product) - i64::from(self.quantity) >= 0
            }
            (None, None) => true,
        }
    }

    /// Insert or update the item. No-op without an item.
    pub fn write(&mut self) -> DomainResult<()> {
        let store = self.services.store.clone();
        let Some(item) = self.item.as_mut() else {
            return Ok(());
        };

        let version = if item.is_persisted() {
            store.update_line_item(item, ExpectedVersion::Exact(item.version()))?
        } else {
            store.insert_line_item(item)?
        };
        item.set_version(version);

        tracing::debug!(
            order_id = %item.order_id(),
            key = %item.key(),
            quantity = item.quantity(),
            version,
            "line item written"
        );
        Ok(())
    }

    /// Delete the item with its customisations and modifiers. No-op without an item.
    pub fn delete(&mut self) -> DomainResult<()> {
        let Some(item) = self.item.take() else {
            return Ok(());
        };
        if item.is_persisted() {
            self.services.store.delete_line_item(item.id_typed())?;
        }
        tracing::debug!(order_id = %item.order_id(), key = %item.key(), "line item deleted");
        Ok(())
    }
}
