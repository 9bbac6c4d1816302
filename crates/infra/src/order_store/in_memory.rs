use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use shopdesk_core::ExpectedVersion;
use shopdesk_orders::{
    Customisation, LineItem, LineItemId, LineItemRow, Order, OrderId, OrderRow, OrderStore,
    PriceModifier, StoreError, StoreResult,
};

#[derive(Debug, Default)]
struct Tables {
    orders: HashMap<OrderId, OrderRow>,
    items: HashMap<LineItemId, LineItemRow>,
    /// Item ids per order, in insertion order.
    order_items: HashMap<OrderId, Vec<LineItemId>>,
    customisations: HashMap<LineItemId, Vec<Customisation>>,
    modifiers: HashMap<LineItemId, Vec<PriceModifier>>,
    /// Unique `(order_id, key)` index.
    keys: HashMap<(OrderId, String), LineItemId>,
    last_reference: u64,
}

impl Tables {
    fn assemble_item(&self, id: LineItemId) -> Option<LineItem> {
        let row = self.items.get(&id)?.clone();
        let customisations = self.customisations.get(&id).cloned().unwrap_or_default();
        let modifiers = self.modifiers.get(&id).cloned().unwrap_or_default();
        Some(LineItem::from_row(row, customisations, modifiers))
    }

    fn assemble_order(&self, row: &OrderRow) -> Order {
        let items = self
            .order_items
            .get(&row.id)
            .map(|ids| ids.iter().filter_map(|id| self.assemble_item(*id)).collect())
            .unwrap_or_default();
        Order::from_row(row.clone(), items)
    }

    fn drop_item(&mut self, id: LineItemId) {
        if let Some(row) = self.items.remove(&id) {
            self.keys.remove(&(row.order_id, row.key));
            if let Some(ids) = self.order_items.get_mut(&row.order_id) {
                ids.retain(|i| *i != id);
            }
        }
        self.customisations.remove(&id);
        self.modifiers.remove(&id);
    }
}

/// In-memory row store.
///
/// Intended for tests/dev. One lock guards every table, so each call is atomic.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    tables: RwLock<Tables>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    /// Stored line item rows for an order.
    pub fn line_item_count(&self, order_id: OrderId) -> StoreResult<usize> {
        Ok(self.read()?.order_items.get(&order_id).map_or(0, Vec::len))
    }
}

impl OrderStore for InMemoryOrderStore {
    fn next_reference(&self) -> StoreResult<u64> {
        let mut tables = self.write()?;
        tables.last_reference += 1;
        Ok(tables.last_reference)
    }

    fn save_order(&self, order: &Order, expected: ExpectedVersion) -> StoreResult<u64> {
        let mut tables = self.write()?;
        let mut row = order.row();
        let current = tables.orders.get(&row.id).map_or(0, |r| r.version);

        if !expected.matches(current) {
            return Err(StoreError::Concurrency(format!(
                "order {}: expected {expected:?}, found {current}",
                row.id
            )));
        }

        row.version = current + 1;
        let version = row.version;
        tables.orders.insert(row.id, row);
        Ok(version)
    }

    fn load_order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let tables = self.read()?;
        Ok(tables.orders.get(&id).map(|row| tables.assemble_order(row)))
    }

    fn find_order_by_reference(&self, reference: u64) -> StoreResult<Option<Order>> {
        let tables = self.read()?;
        Ok(tables
            .orders
            .values()
            .find(|row| row.reference == Some(reference))
            .map(|row| tables.assemble_order(row)))
    }

    fn delete_order(&self, id: OrderId) -> StoreResult<()> {
        let mut tables = self.write()?;
        let item_ids = tables.order_items.remove(&id).unwrap_or_default();
        for item_id in item_ids {
            tables.drop_item(item_id);
        }
        tables.orders.remove(&id);
        Ok(())
    }

    fn insert_line_item(&self, item: &LineItem) -> StoreResult<u64> {
        let mut tables = self.write()?;
        let mut row = item.row();

        if !tables.orders.contains_key(&row.order_id) {
            return Err(StoreError::NotFound(format!("order {}", row.order_id)));
        }
        if tables.items.contains_key(&row.id) {
            return Err(StoreError::Concurrency(format!("line item {} already inserted", row.id)));
        }
        let index_key = (row.order_id, row.key.clone());
        if tables.keys.contains_key(&index_key) {
            return Err(StoreError::DuplicateKey {
                order_id: row.order_id,
                key: row.key,
            });
        }

        row.version = 1;
        let id = row.id;
        tables.keys.insert(index_key, id);
        tables.order_items.entry(row.order_id).or_default().push(id);
        tables.items.insert(id, row);
        tables
            .customisations
            .insert(id, item.customisations().to_vec());
        tables
            .modifiers
            .insert(id, item.modifiers().entries().to_vec());
        Ok(1)
    }

    fn update_line_item(&self, item: &LineItem, expected: ExpectedVersion) -> StoreResult<u64> {
        let mut tables = self.write()?;
        let mut row = item.row();

        let Some((current_version, old_key)) = tables
            .items
            .get(&row.id)
            .map(|current| (current.version, (current.order_id, current.key.clone())))
        else {
            return Err(StoreError::NotFound(format!("line item {}", row.id)));
        };
        if !expected.matches(current_version) {
            return Err(StoreError::Concurrency(format!(
                "line item {}: expected {expected:?}, found {current_version}",
                row.id
            )));
        }

        let new_key = (row.order_id, row.key.clone());
        if old_key != new_key {
            if tables.keys.get(&new_key).is_some_and(|owner| *owner != row.id) {
                return Err(StoreError::DuplicateKey {
                    order_id: row.order_id,
                    key: row.key,
                });
            }
            tables.keys.remove(&old_key);
            tables.keys.insert(new_key, row.id);
        }

        row.version = current_version + 1;
        let version = row.version;
        tables.items.insert(row.id, row);
        Ok(version)
    }

    fn load_line_item(&self, id: LineItemId) -> StoreResult<Option<LineItem>> {
        Ok(self.read()?.assemble_item(id))
    }

    fn find_line_item_by_key(&self, order_id: OrderId, key: &str) -> StoreResult<Option<LineItem>> {
        let tables = self.read()?;
        Ok(tables
            .keys
            .get(&(order_id, key.to_string()))
            .and_then(|id| tables.assemble_item(*id)))
    }

    fn delete_line_item(&self, id: LineItemId) -> StoreResult<()> {
        self.write()?.drop_item(id);
        Ok(())
    }

    fn insert_customisation(&self, customisation: &Customisation) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.items.contains_key(&customisation.line_item_id) {
            return Err(StoreError::NotFound(format!(
                "line item {}",
                customisation.line_item_id
            )));
        }
        tables
            .customisations
            .entry(customisation.line_item_id)
            .or_default()
            .push(customisation.clone());
        Ok(())
    }

    fn insert_price_modifier(&self, modifier: &PriceModifier) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.items.contains_key(&modifier.line_item_id) {
            return Err(StoreError::NotFound(format!("line item {}", modifier.line_item_id)));
        }
        tables
            .modifiers
            .entry(modifier.line_item_id)
            .or_default()
            .push(modifier.clone());
        Ok(())
    }
}
