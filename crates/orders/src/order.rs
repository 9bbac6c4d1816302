use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{AggregateId, AggregateRoot, DomainError, DomainResult, Rounding, typed_id};
use shopdesk_products::ProductProvider;
use shopdesk_tax::Delivery;

use crate::context::OrderContext;
use crate::line_item::{LineItem, LineItemId};
use crate::status::{OrderKind, OrderStatus, StatusConfig};

typed_id!(
    /// Order identifier. Survives Estimate → Invoice conversion.
    OrderId(AggregateId)
);

/// Flat storage row for an order (line items live in their own table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: OrderId,
    pub kind: OrderKind,
    pub reference: Option<u64>,
    pub prefix: String,
    pub delivery: Delivery,
    pub status: OrderStatus,
    pub allow_negative_value: bool,
    pub postage_cost: Decimal,
    pub postage_tax: Decimal,
    pub discount_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

/// Order-level money, read-only, for documents and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub sub_total: Decimal,
    pub tax_total: Decimal,
    pub postage_cost: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Same totals rounded for display.
    pub fn display(&self, rounding: Rounding) -> Self {
        Self {
            sub_total: rounding.display(self.sub_total),
            tax_total: rounding.display(self.tax_total),
            postage_cost: rounding.display(self.postage_cost),
            discount: rounding.display(self.discount),
            total: rounding.display(self.total),
        }
    }
}

/// Aggregate root: an Estimate or an Invoice and the line items it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    kind: OrderKind,
    reference: Option<u64>,
    prefix: String,
    delivery: Delivery,
    status: OrderStatus,
    /// Status as of the last load or write.
    #[serde(skip)]
    committed_status: OrderStatus,
    allow_negative_value: bool,
    postage_cost: Decimal,
    postage_tax: Decimal,
    discount_amount: Decimal,
    items: Vec<LineItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Order {
    /// A new, unsaved order.
    pub fn new(kind: OrderKind, context: &OrderContext) -> Self {
        let now = Utc::now();
        let status = context.statuses.default_status;
        Self {
            id: OrderId::new(),
            kind,
            reference: None,
            prefix: context.prefixes.for_kind(kind).to_string(),
            delivery: Delivery::default(),
            status,
            committed_status: status,
            allow_negative_value: context.allow_negative_value,
            postage_cost: Decimal::ZERO,
            postage_tax: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Rebuild from storage.
    pub fn from_row(row: OrderRow, items: Vec<LineItem>) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            reference: row.reference,
            prefix: row.prefix,
            delivery: row.delivery,
            status: row.status,
            committed_status: row.status,
            allow_negative_value: row.allow_negative_value,
            postage_cost: row.postage_cost,
            postage_tax: row.postage_tax,
            discount_amount: row.discount_amount,
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        }
    }

    pub fn row(&self) -> OrderRow {
        OrderRow {
            id: self.id,
            kind: self.kind,
            reference: self.reference,
            prefix: self.prefix.clone(),
            delivery: self.delivery.clone(),
            status: self.status,
            allow_negative_value: self.allow_negative_value,
            postage_cost: self.postage_cost,
            postage_tax: self.postage_tax,
            discount_amount: self.discount_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn is_invoice(&self) -> bool {
        self.kind == OrderKind::Invoice
    }

    pub fn reference(&self) -> Option<u64> {
        self.reference
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prefixed reference (`INV-12`), once one has been assigned.
    pub fn full_ref(&self) -> Option<String> {
        self.reference.map(|r| format!("{}{r}", self.prefix))
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    /// Invoice status; estimates have none.
    pub fn status(&self) -> Option<OrderStatus> {
        self.is_invoice().then_some(self.status)
    }

    pub fn allows_negative_value(&self) -> bool {
        self.allow_negative_value
    }

    pub fn postage_cost(&self) -> Decimal {
        self.postage_cost
    }

    pub fn postage_tax(&self) -> Decimal {
        self.postage_tax
    }

    pub fn discount_amount(&self) -> Decimal {
        self.discount_amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id_typed() == id)
    }

    pub fn item_by_key(&self, key: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.key() == key)
    }

    pub fn totals(&self, products: &dyn ProductProvider, rounding: Rounding) -> OrderTotals {
        let (sub_total, item_tax) = self
            .items
            .iter()
            .map(|item| item.pricing(products, rounding))
            .fold((Decimal::ZERO, Decimal::ZERO), |(sub, tax), p| {
                (sub + p.sub_total(), tax + p.tax_total())
            });

        let tax_total = item_tax + self.postage_tax;
        let mut total = sub_total + tax_total + self.postage_cost - self.discount_amount;
        if total.is_sign_negative() && !self.allow_negative_value {
            total = Decimal::ZERO;
        }

        OrderTotals {
            sub_total,
            tax_total,
            postage_cost: self.postage_cost,
            discount: self.discount_amount,
            total,
        }
    }

    /// Σ quantity (a sum, not a count of lines).
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity())).sum()
    }

    pub fn total_weight(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| i.weight() * Decimal::from(i.quantity()))
            .sum()
    }

    /// At least one item needs delivering.
    pub fn is_deliverable(&self) -> bool {
        self.items.iter().any(LineItem::is_deliverable)
    }

    /// Every item is locked.
    pub fn is_locked(&self) -> bool {
        self.items.iter().all(LineItem::is_locked)
    }

    pub fn is_paid(&self, statuses: &StatusConfig) -> bool {
        self.is_invoice() && statuses.is_paid(self.status)
    }

    pub fn is_outstanding(&self, statuses: &StatusConfig) -> bool {
        self.is_invoice() && statuses.is_outstanding(self.status)
    }

    pub fn is_historic(&self, statuses: &StatusConfig) -> bool {
        self.is_invoice() && statuses.is_historic(self.status)
    }

    pub fn is_editable(&self, statuses: &StatusConfig) -> bool {
        self.is_invoice() && statuses.is_editable(self.status)
    }

    /// Estimates are always editable; invoices only in an editable status.
    pub fn can_edit(&self, statuses: &StatusConfig) -> bool {
        !self.is_invoice() || self.is_editable(statuses)
    }

    pub fn can_change_status(&self) -> bool {
        self.is_invoice()
    }

    /// Invoices are never deleted.
    pub fn can_delete(&self) -> bool {
        !self.is_invoice()
    }

    /// Set the status directly. Legality is a permission question, not a
    /// transition table.
    pub fn mark(&mut self, status: OrderStatus) -> DomainResult<()> {
        if !self.can_change_status() {
            return Err(DomainError::unauthorized(format!(
                "StatusChangeNotAllowed: estimates have no status (requested {status})"
            )));
        }
        self.status = status;
        Ok(())
    }

    pub fn mark_incomplete(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::Incomplete)
    }

    pub fn mark_pending(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::Pending)
    }

    pub fn mark_part_paid(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::PartPaid)
    }

    pub fn mark_paid(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::Paid)
    }

    pub fn mark_processing(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::Processing)
    }

    pub fn mark_ready(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::Ready)
    }

    pub fn mark_dispatched(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::Dispatched)
    }

    pub fn mark_collected(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::Collected)
    }

    pub fn mark_canceled(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::Cancelled)
    }

    pub fn mark_refunded(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::Refunded)
    }

    pub fn mark_failed(&mut self) -> DomainResult<()> {
        self.mark(OrderStatus::Failed)
    }

    /// `(old, new)` if the status differs from the last persisted one.
    pub fn status_change(&self) -> Option<(OrderStatus, OrderStatus)> {
        (self.is_invoice() && self.status != self.committed_status)
            .then_some((self.committed_status, self.status))
    }

    pub(crate) fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    /// Record a successful write.
    pub(crate) fn committed(&mut self, version: u64) {
        self.version = version;
        self.committed_status = self.status;
    }

    pub(crate) fn assign_reference(&mut self, reference: u64) {
        self.reference = Some(reference);
    }

    /// One-way Estimate → Invoice. Keeps id, reference and items.
    pub(crate) fn convert_to_invoice(&mut self, context: &OrderContext) -> DomainResult<()> {
        if self.is_invoice() {
            return Err(DomainError::conflict("AlreadyInvoice: order is already an invoice"));
        }
        self.kind = OrderKind::Invoice;
        self.prefix = context.prefixes.invoice.clone();
        self.status = context.statuses.default_status;
        self.committed_status = self.status;
        Ok(())
    }

    /// Insert or replace (by id) a line item.
    pub(crate) fn upsert_item(&mut self, item: LineItem) {
        match self.items.iter_mut().find(|i| i.id_typed() == item.id_typed()) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub(crate) fn remove_item(&mut self, id: LineItemId) -> Option<LineItem> {
        let pos = self.items.iter().position(|i| i.id_typed() == id)?;
        Some(self.items.remove(pos))
    }

    pub(crate) fn set_items(&mut self, items: Vec<LineItem>) {
        self.items = items;
    }

    pub(crate) fn set_delivery(&mut self, delivery: Delivery) {
        self.delivery = delivery;
    }

    pub(crate) fn set_postage(&mut self, cost: Decimal, tax: Decimal) {
        self.postage_cost = cost;
        self.postage_tax = tax;
    }

    pub(crate) fn set_discount(&mut self, amount: Decimal) {
        self.discount_amount = amount;
    }

    pub(crate) fn set_allow_negative_value(&mut self, allow: bool) {
        self.allow_negative_value = allow;
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
