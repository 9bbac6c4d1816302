//! Line items: one priced, quantified product on an order.
//!
//! Every amount is derived on demand from the stored snapshot; nothing here is
//! cached or written back.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{Entity, EntityId, Rounding, typed_id};
use shopdesk_products::{Product, ProductProvider, ProductRef};
use shopdesk_tax::TaxRate;

use crate::customisation::Customisation;
use crate::order::OrderId;
use crate::price_modifier::{PriceModifier, PriceModifierLedger};

typed_id!(
    /// Line item identifier.
    LineItemId(EntityId)
);

/// Reconciliation key: `stock_id + ":" + base64(json({title: value, ...}))`.
///
/// Titles are sorted, so the same set of customisations always gives the same
/// key. Price modifiers are not part of the key.
pub fn derive_key<'a, I>(stock_id: &str, customisations: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let map: BTreeMap<&str, &str> = customisations.into_iter().collect();
    // A map of strings always serializes.
    let json = serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string());
    format!("{stock_id}:{}", STANDARD.encode(json))
}

/// Flat storage row for a line item (children live in their own tables).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRow {
    pub id: LineItemId,
    pub order_id: OrderId,
    pub key: String,
    pub title: String,
    pub quantity: u32,
    pub unmodified_price: Decimal,
    pub locked: bool,
    pub stocked: bool,
    pub deliverable: bool,
    pub product: ProductRef,
    pub stock_id: String,
    pub weight: Decimal,
    pub tax_rate: TaxRate,
    pub version: u64,
}

/// Line item entity.
///
/// Fields are private: line items change only through the line item factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    id: LineItemId,
    order_id: OrderId,
    key: String,
    title: String,
    quantity: u32,
    /// Unit price pinned from the product version at creation.
    unmodified_price: Decimal,
    locked: bool,
    stocked: bool,
    deliverable: bool,
    product: ProductRef,
    stock_id: String,
    weight: Decimal,
    tax_rate: TaxRate,
    customisations: Vec<Customisation>,
    modifiers: PriceModifierLedger,
    version: u64,
}

impl LineItem {
    /// Snapshot a product version onto a new, unsaved line item.
    pub(crate) fn snapshot(
        order_id: OrderId,
        product: &Product,
        unmodified_price: Decimal,
        tax_rate: TaxRate,
        quantity: u32,
    ) -> Self {
        let mut item = Self {
            id: LineItemId::new(),
            order_id,
            key: String::new(),
            title: product.title.clone(),
            quantity,
            unmodified_price,
            locked: false,
            stocked: product.stock.stocked,
            deliverable: product.deliverable,
            product: product.product_ref(),
            stock_id: product.stock_id.clone(),
            weight: product.weight,
            tax_rate,
            customisations: Vec::new(),
            modifiers: PriceModifierLedger::new(),
            version: 0,
        };
        item.key = item.generate_key();
        item
    }

    /// Rebuild from storage.
    pub fn from_row(
        row: LineItemRow,
        customisations: Vec<Customisation>,
        modifiers: Vec<PriceModifier>,
    ) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            key: row.key,
            title: row.title,
            quantity: row.quantity,
            unmodified_price: row.unmodified_price,
            locked: row.locked,
            stocked: row.stocked,
            deliverable: row.deliverable,
            product: row.product,
            stock_id: row.stock_id,
            weight: row.weight,
            tax_rate: row.tax_rate,
            customisations,
            modifiers: modifiers.into_iter().collect(),
            version: row.version,
        }
    }

    pub fn row(&self) -> LineItemRow {
        LineItemRow {
            id: self.id,
            order_id: self.order_id,
            key: self.key.clone(),
            title: self.title.clone(),
            quantity: self.quantity,
            unmodified_price: self.unmodified_price,
            locked: self.locked,
            stocked: self.stocked,
            deliverable: self.deliverable,
            product: self.product.clone(),
            stock_id: self.stock_id.clone(),
            weight: self.weight,
            tax_rate: self.tax_rate.clone(),
            version: self.version,
        }
    }

    pub fn id_typed(&self) -> LineItemId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unmodified_price(&self) -> Decimal {
        self.unmodified_price
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_stocked(&self) -> bool {
        self.stocked
    }

    pub fn is_deliverable(&self) -> bool {
        self.deliverable
    }

    pub fn product(&self) -> &ProductRef {
        &self.product
    }

    pub fn stock_id(&self) -> &str {
        &self.stock_id
    }

    pub fn weight(&self) -> Decimal {
        self.weight
    }

    pub fn tax_rate(&self) -> &TaxRate {
        &self.tax_rate
    }

    pub fn customisations(&self) -> &[Customisation] {
        &self.customisations
    }

    pub fn modifiers(&self) -> &PriceModifierLedger {
        &self.modifiers
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_persisted(&self) -> bool {
        self.version > 0
    }

    /// Key for this item's current stock id and customisations.
    pub fn generate_key(&self) -> String {
        derive_key(
            &self.stock_id,
            self.customisations
                .iter()
                .map(|c| (c.title.as_str(), c.value.as_str())),
        )
    }

    /// Pinned unit price. Records from before prices were pinned have a zero
    /// price; those fall back to the live product's current price (read only).
    pub fn base_price(&self, products: &dyn ProductProvider) -> Decimal {
        if !self.unmodified_price.is_zero() {
            return self.unmodified_price;
        }
        products
            .live(&self.product)
            .and_then(|p| p.base_price)
            .unwrap_or(Decimal::ZERO)
    }

    /// Full price breakdown for this item.
    pub fn pricing(&self, products: &dyn ProductProvider, rounding: Rounding) -> LinePricing {
        LinePricing::new(
            self.base_price(products),
            &self.modifiers,
            &self.tax_rate,
            self.quantity,
            rounding,
        )
    }

    /// The product version this item was priced from.
    pub fn find_stock_item(&self, products: &dyn ProductProvider) -> Option<Product> {
        products.find(&self.product)
    }

    /// Live stock level minus `requested`; negative means not enough stock.
    pub fn check_stock_level(&self, products: &dyn ProductProvider, requested: u32) -> i64 {
        let level = products
            .live(&self.product)
            .map(|live| products.current_stock_level(&live))
            .unwrap_or(0);
        level - i64::from(requested)
    }

    pub(crate) fn set_key(&mut self, key: String) {
        self.key = key;
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub(crate) fn set_deliverable(&mut self, deliverable: bool) {
        self.deliverable = deliverable;
    }

    pub(crate) fn set_tax_rate(&mut self, rate: TaxRate) {
        self.tax_rate = rate;
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Copy descriptive fields from a product snapshot. Price is not touched.
    pub(crate) fn refresh_from(&mut self, product: &Product) {
        self.title = product.title.clone();
        self.stocked = product.stock.stocked;
        self.stock_id = product.stock_id.clone();
        self.weight = product.weight;
    }

    /// Re-pin price and product version.
    pub(crate) fn repin(&mut self, product: &Product, price: Decimal) {
        self.product = product.product_ref();
        self.unmodified_price = price;
    }

    pub(crate) fn push_customisation(&mut self, customisation: Customisation) {
        self.customisations.push(customisation);
    }

    pub(crate) fn push_modifier(&mut self, modifier: PriceModifier) {
        self.modifiers.push(modifier);
    }
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Price breakdown for one line item.
///
/// Tax is rounded once per unit and then multiplied by the quantity, so large
/// quantities never accumulate sub-precision drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinePricing {
    base_price: Decimal,
    no_tax_price: Decimal,
    unit_tax: Decimal,
    quantity: u32,
    rounding: Rounding,
}

impl LinePricing {
    pub fn new(
        base_price: Decimal,
        modifiers: &PriceModifierLedger,
        tax_rate: &TaxRate,
        quantity: u32,
        rounding: Rounding,
    ) -> Self {
        let no_tax_price = modifiers.apply(base_price);
        let unit_tax = rounding.round(tax_rate.tax_on(no_tax_price));
        Self {
            base_price,
            no_tax_price,
            unit_tax,
            quantity,
            rounding,
        }
    }

    pub fn base_price(&self) -> Decimal {
        self.base_price
    }

    /// Base price plus modifiers.
    pub fn no_tax_price(&self) -> Decimal {
        self.no_tax_price
    }

    pub fn unit_price(&self) -> Decimal {
        self.no_tax_price
    }

    pub fn unit_tax(&self) -> Decimal {
        self.unit_tax
    }

    pub fn unit_total(&self) -> Decimal {
        self.unit_price() + self.unit_tax
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn sub_total(&self) -> Decimal {
        self.no_tax_price * Decimal::from(self.quantity)
    }

    pub fn tax_total(&self) -> Decimal {
        self.unit_tax * Decimal::from(self.quantity)
    }

    pub fn total(&self) -> Decimal {
        self.sub_total() + self.tax_total()
    }

    /// An amount rounded for display.
    pub fn display(&self, amount: Decimal) -> Decimal {
        self.rounding.display(amount)
    }
}
