//! Integration tests for the order engine over the in-memory backends.
//!
//! Tests: OrderFactory → LineItemFactory → InMemoryOrderStore / InMemoryCatalog → BusNotifier
//!
//! Verifies:
//! - Prices stay pinned to the product version an item was made from
//! - Repeated adds of the same key merge into one row, including under a race
//! - Tax follows delivery geography
//! - Status notifications fire once per write and never roll a write back

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use shopdesk_core::{AggregateRoot, DomainError, ExpectedVersion};
    use shopdesk_events::{EventBus, EventEnvelope, InMemoryEventBus, Subscription};
    use shopdesk_orders::{
        AddItemOptions, Customisation, CustomisationSpec, LineItem, LineItemFactory, LineItemId,
        ModifierSpec, NoopNotifier, NotificationError, Order, OrderContext, OrderEvent, OrderFactory,
        OrderId, OrderServices, OrderStatus, OrderStore, PriceModifier, StatusNotifier, StoreError,
        StoreResult,
    };
    use shopdesk_products::{Product, ProductRef};
    use shopdesk_tax::{TaxCategory, TaxCategoryId, TaxRate, TaxRateId, TaxZone};

    use crate::catalog::InMemoryCatalog;
    use crate::notifier::{BusNotifier, ORDER_AGGREGATE_TYPE};
    use crate::order_store::InMemoryOrderStore;

    type OrderBus = InMemoryEventBus<EventEnvelope<OrderEvent>>;

    struct Harness {
        services: OrderServices,
        store: Arc<InMemoryOrderStore>,
        catalog: Arc<InMemoryCatalog>,
        events: Subscription<EventEnvelope<OrderEvent>>,
    }

    fn vat() -> TaxRate {
        TaxRate::new(TaxRateId(1), "VAT", dec!(20))
    }

    fn test_category() -> TaxCategory {
        TaxCategory::new(TaxCategoryId(1), "Standard")
            .with_default(vat())
            .with_rate(
                TaxRate::new(TaxRateId(2), "Reduced", dec!(5)),
                vec![TaxZone::regions("NZ", ["AUK"])],
            )
    }

    fn test_socks(price: Decimal) -> Product {
        Product::new("Product", "Socks", "SOCKS", price)
            .with_tax(Some(TaxCategoryId(1)), Some(vat()))
            .with_weight(dec!(0.1))
    }

    fn setup_with(context: OrderContext) -> Harness {
        shopdesk_observability::init_pretty();

        let store = Arc::new(InMemoryOrderStore::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        assert!(catalog.add_category(test_category()));

        let bus: Arc<OrderBus> = Arc::new(InMemoryEventBus::new());
        let events = bus.subscribe();
        let services = OrderServices::new(
            context,
            store.clone(),
            catalog.clone(),
            catalog.clone(),
            Arc::new(BusNotifier::new(bus)),
        );

        Harness {
            services,
            store,
            catalog,
            events,
        }
    }

    fn setup() -> Harness {
        setup_with(OrderContext::default())
    }

    fn publish_socks(h: &Harness, price: Decimal) -> ProductRef {
        h.catalog.publish(test_socks(price)).unwrap().product_ref()
    }

    fn reload(h: &Harness, order: &Order) -> OrderFactory {
        OrderFactory::find_or_make(h.services.clone(), Some(order.id_typed()), None).unwrap()
    }

    #[test]
    fn pinned_price_survives_catalog_reprice() {
        let h = setup();
        let socks = publish_socks(&h, dec!(6.75));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.add_item(&socks, 1, AddItemOptions::default()).unwrap();

        h.catalog.reprice(&socks, dec!(7.50)).unwrap();

        let reloaded = reload(&h, factory.order());
        let item = &reloaded.order().items()[0];
        assert_eq!(item.base_price(h.catalog.as_ref()), dec!(6.75));
        let pinned = item.find_stock_item(h.catalog.as_ref()).unwrap();
        assert_eq!(pinned.base_price, Some(dec!(6.75)));
        assert_eq!(pinned.version, 1);
    }

    #[test]
    fn same_key_merges_into_one_row() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.99));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.add_item(&socks, 2, AddItemOptions::default()).unwrap();
        let merged = factory.add_item(&socks, 3, AddItemOptions::default()).unwrap();

        assert_eq!(merged.quantity(), 5);
        assert_eq!(factory.order().items().len(), 1);
        assert_eq!(h.store.line_item_count(factory.order().id_typed()).unwrap(), 1);
        assert_eq!(reload(&h, factory.order()).order().total_items(), 5);
    }

    #[test]
    fn customisation_order_does_not_split_items() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.99));
        let red_large = AddItemOptions {
            customisations: vec![
                CustomisationSpec::new("Colour", "Red"),
                CustomisationSpec::new("Size", "L"),
            ],
            ..AddItemOptions::default()
        };
        let large_red = AddItemOptions {
            customisations: vec![
                CustomisationSpec::new("Size", "L"),
                CustomisationSpec::new("Colour", "Red"),
            ],
            ..AddItemOptions::default()
        };
        let blue = AddItemOptions {
            customisations: vec![CustomisationSpec::new("Colour", "Blue")],
            ..AddItemOptions::default()
        };

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.add_item(&socks, 1, red_large).unwrap();
        factory.add_item(&socks, 1, large_red).unwrap();
        factory.add_item(&socks, 1, blue).unwrap();

        let order = reload(&h, factory.order()).into_order();
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.total_items(), 3);
    }

    #[test]
    fn socks_order_totals() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.99));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        let item = factory.add_item(&socks, 3, AddItemOptions::default()).unwrap();

        let pricing = item.pricing(h.catalog.as_ref(), h.services.context.rounding);
        assert_eq!(pricing.base_price(), dec!(5.99));
        assert_eq!(pricing.unit_tax(), dec!(1.198));

        let totals = factory.totals();
        assert_eq!(totals.sub_total, dec!(17.97));
        assert_eq!(totals.tax_total, dec!(3.594));
        assert_eq!(totals.total, dec!(21.564));
        assert_eq!(totals.display(h.services.context.rounding).total, dec!(21.56));
        assert_eq!(factory.order().total_weight(), dec!(0.3));
    }

    #[test]
    fn modifiers_and_customisations_are_persisted_with_the_item() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.00));
        let options = AddItemOptions {
            customisations: vec![
                CustomisationSpec::new("Size", "XL").with_extra(serde_json::json!({ "sort": 1 })),
            ],
            modifiers: vec![
                ModifierSpec::new("XL surcharge", dec!(1.50)).for_customisation("Size"),
                ModifierSpec::new("Promo", dec!(-0.50)),
            ],
            ..AddItemOptions::default()
        };

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.add_item(&socks, 2, options).unwrap();

        let order = reload(&h, factory.order()).into_order();
        let item = &order.items()[0];
        assert_eq!(item.customisations().len(), 1);
        assert_eq!(item.customisations()[0].sort, 1);
        assert_eq!(item.modifiers().len(), 2);
        let size = item.customisations()[0].id;
        assert_eq!(item.modifiers().for_customisation(size).count(), 1);

        let totals = order.totals(h.catalog.as_ref(), h.services.context.rounding);
        assert_eq!(totals.sub_total, dec!(12.00));
        assert_eq!(totals.tax_total, dec!(2.400));
    }

    #[test]
    fn modifier_for_unknown_customisation_is_a_logic_error() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.00));
        let options = AddItemOptions {
            modifiers: vec![ModifierSpec::new("Large", dec!(1)).for_customisation("Size")],
            ..AddItemOptions::default()
        };

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        let err = factory.add_item(&socks, 1, options).unwrap_err();
        assert!(err.is_logic("InvalidCustomisation"));
        assert_eq!(h.store.line_item_count(factory.order().id_typed()).unwrap(), 0);
    }

    #[test]
    fn delivery_geography_picks_zoned_rate() {
        let h = setup();
        let socks = publish_socks(&h, dec!(10));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        let item = factory.add_item(&socks, 1, AddItemOptions::default()).unwrap();
        assert_eq!(item.tax_rate().rate, dec!(20));

        factory.set_delivery("NZ", "AUK").unwrap();
        factory.write().unwrap();
        assert_eq!(factory.order().items()[0].tax_rate().rate, dec!(5));

        let reloaded = reload(&h, factory.order());
        assert_eq!(reloaded.order().delivery().country, "NZ");
        assert_eq!(reloaded.order().items()[0].tax_rate().rate, dec!(5));
    }

    #[test]
    fn category_default_applies_without_geography() {
        let h = setup();
        let hat = h
            .catalog
            .publish(Product::new("Product", "Hat", "HAT", dec!(10)).with_tax(Some(TaxCategoryId(1)), None))
            .unwrap()
            .product_ref();

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        let item = factory.add_item(&hat, 1, AddItemOptions::default()).unwrap();
        assert_eq!(item.tax_rate().rate, dec!(20));
        assert_eq!(item.tax_rate().id, TaxRateId(1));

        factory.set_delivery("NZ", "AUK").unwrap();
        assert_eq!(factory.order().items()[0].tax_rate().rate, dec!(5));
    }

    #[test]
    fn delivery_is_stored_with_the_retaxed_items() {
        let h = setup();
        let socks = publish_socks(&h, dec!(10));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.add_item(&socks, 1, AddItemOptions::default()).unwrap();
        factory.set_delivery("NZ", "AUK").unwrap();
        let order = factory.into_order();

        let reloaded = reload(&h, &order);
        assert_eq!(reloaded.order().delivery().country, "NZ");
        assert_eq!(reloaded.order().delivery().region, "AUK");
        assert_eq!(reloaded.order().items()[0].tax_rate().rate, dec!(5));
    }

    #[test]
    fn unmatched_geography_gives_zero_rate() {
        let h = setup();
        let socks = publish_socks(&h, dec!(10));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.add_item(&socks, 1, AddItemOptions::default()).unwrap();
        factory.set_delivery("DE", "BE").unwrap();

        let item = &factory.order().items()[0];
        assert!(item.tax_rate().is_sentinel());
        assert_eq!(factory.totals().tax_total, Decimal::ZERO);
    }

    #[test]
    fn store_rejects_duplicate_key() {
        let h = setup();
        let socks = h.catalog.publish(test_socks(dec!(5.99))).unwrap();

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.write().unwrap();
        let order = factory.order().clone();

        let mut first = LineItemFactory::new(h.services.clone())
            .with_product(socks.clone())
            .with_parent(&order);
        first.make_item().unwrap();
        first.write().unwrap();

        let mut second = LineItemFactory::new(h.services.clone())
            .with_product(socks)
            .with_parent(&order);
        second.make_item().unwrap();
        match second.write() {
            Err(DomainError::Conflict(msg)) => assert!(msg.starts_with("DuplicateKey")),
            other => panic!("expected duplicate key conflict, got {other:?}"),
        }
    }

    #[test]
    fn concurrent_adds_of_same_product_merge() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.99));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.write().unwrap();
        let order_id = factory.order().id_typed();

        let barrier = Barrier::new(2);
        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let services = h.services.clone();
                    let barrier = &barrier;
                    let socks = &socks;
                    scope.spawn(move || {
                        let mut factory = OrderFactory::find_or_make(services, Some(order_id), None)?;
                        barrier.wait();
                        factory.add_item(socks, 1, AddItemOptions::default())
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        assert!(results.iter().all(Result::is_ok), "{results:?}");
        assert_eq!(h.store.line_item_count(order_id).unwrap(), 1);
        let order = h.store.load_order(order_id).unwrap().unwrap();
        assert_eq!(order.items()[0].quantity(), 2);
    }

    #[test]
    fn status_change_notifies_once_per_write() {
        let h = setup();
        let mut factory = OrderFactory::find_or_make_invoice(h.services.clone(), None, None).unwrap();
        factory.write().unwrap();
        assert!(h.events.drain().is_empty());

        factory.mark(OrderStatus::Paid).unwrap();
        factory.mark(OrderStatus::Processing).unwrap();
        factory.write().unwrap();

        let events = h.events.drain();
        assert_eq!(events.len(), 1);
        let envelope = &events[0];
        assert_eq!(envelope.aggregate_type(), ORDER_AGGREGATE_TYPE);
        assert_eq!(envelope.event_type(), "orders.order.status_changed");
        assert_eq!(envelope.sequence_number(), factory.order().version());
        match envelope.payload() {
            OrderEvent::StatusChanged(e) => {
                assert_eq!(e.old_status, OrderStatus::Incomplete);
                assert_eq!(e.new_status, OrderStatus::Processing);
                assert_eq!(e.full_ref.as_deref(), Some("INV-1"));
            }
            other => panic!("unexpected event {other:?}"),
        }

        factory.write().unwrap();
        assert!(h.events.drain().is_empty());
    }

    struct FailingNotifier;

    impl StatusNotifier for FailingNotifier {
        fn on_status_changed(
            &self,
            _: &Order,
            _: OrderStatus,
            _: OrderStatus,
        ) -> Result<(), NotificationError> {
            Err(NotificationError::Delivery("smtp down".to_string()))
        }
    }

    #[test]
    fn failed_notification_keeps_the_status_write() {
        let h = setup();
        let services = OrderServices {
            notifier: Arc::new(FailingNotifier),
            ..h.services.clone()
        };

        let mut factory = OrderFactory::find_or_make_invoice(services.clone(), None, None).unwrap();
        factory.write().unwrap();
        factory.mark(OrderStatus::Paid).unwrap();
        factory.write().unwrap();

        let reloaded =
            OrderFactory::find_or_make(services, Some(factory.order().id_typed()), None).unwrap();
        assert_eq!(reloaded.order().status(), Some(OrderStatus::Paid));
        assert_eq!(reloaded.order().status_change(), None);
    }

    #[test]
    fn paid_invoice_refuses_edits_but_not_status_changes() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.99));

        let mut factory = OrderFactory::find_or_make_invoice(h.services.clone(), None, None).unwrap();
        factory.add_item(&socks, 1, AddItemOptions::default()).unwrap();
        factory.mark(OrderStatus::Paid).unwrap();
        factory.write().unwrap();

        assert!(matches!(
            factory.add_item(&socks, 1, AddItemOptions::default()),
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(factory.set_discount(dec!(1)), Err(DomainError::Unauthorized(_))));

        factory.mark(OrderStatus::Dispatched).unwrap();
        factory.write().unwrap();
        assert_eq!(factory.order().status(), Some(OrderStatus::Dispatched));
    }

    #[test]
    fn conversion_keeps_identity_and_items() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.99));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.add_item(&socks, 2, AddItemOptions::default()).unwrap();
        let id = factory.order().id_typed();
        assert_eq!(factory.order().full_ref().as_deref(), Some("EST-1"));

        factory.convert_to_invoice().unwrap();
        let events = h.events.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].payload(), OrderEvent::ConvertedToInvoice(_)));

        let reloaded = reload(&h, factory.order());
        let order = reloaded.order();
        assert!(order.is_invoice());
        assert_eq!(order.id_typed(), id);
        assert_eq!(order.full_ref().as_deref(), Some("INV-1"));
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.status(), Some(OrderStatus::Incomplete));

        assert!(matches!(factory.convert_to_invoice(), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn failed_conversion_keeps_the_estimate() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.99));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.add_item(&socks, 1, AddItemOptions::default()).unwrap();

        let mut other = reload(&h, factory.order());
        other.set_discount(dec!(1)).unwrap();
        other.write().unwrap();

        assert!(matches!(factory.convert_to_invoice(), Err(DomainError::Conflict(_))));
        assert!(!factory.order().is_invoice());
        assert_eq!(factory.order().full_ref().as_deref(), Some("EST-1"));
        assert!(!reload(&h, factory.order()).order().is_invoice());
        assert!(h.events.drain().is_empty());

        factory.reload().unwrap();
        factory.convert_to_invoice().unwrap();
        assert!(reload(&h, factory.order()).order().is_invoice());
    }

    #[test]
    fn estimates_delete_with_items_and_invoices_refuse() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.99));

        let mut estimate = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        estimate.add_item(&socks, 1, AddItemOptions::default()).unwrap();
        let id = estimate.order().id_typed();
        estimate.delete().unwrap();
        assert!(h.store.load_order(id).unwrap().is_none());
        assert_eq!(h.store.line_item_count(id).unwrap(), 0);

        let mut invoice = OrderFactory::find_or_make_invoice(h.services.clone(), None, None).unwrap();
        invoice.write().unwrap();
        let id = invoice.order().id_typed();
        assert!(matches!(invoice.delete(), Err(DomainError::Unauthorized(_))));
        assert!(h.store.load_order(id).unwrap().is_some());
    }

    #[test]
    fn stock_check_refuses_overselling() {
        let h = setup_with(OrderContext {
            stock_check: true,
            ..OrderContext::default()
        });
        let socks = h.catalog.publish(test_socks(dec!(5.99)).with_stock(4)).unwrap().product_ref();

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        let err = factory.add_item(&socks, 5, AddItemOptions::default()).unwrap_err();
        assert!(err.is_validation("NotEnoughStock"));
        assert_eq!(h.store.line_item_count(factory.order().id_typed()).unwrap(), 0);

        let item = factory.add_item(&socks, 3, AddItemOptions::default()).unwrap();
        let err = factory.add_item(&socks, 2, AddItemOptions::default()).unwrap_err();
        assert!(err.is_validation("NotEnoughStock"));
        assert!(factory.update_item(item.key(), 5).unwrap_err().is_validation("NotEnoughStock"));

        h.catalog.set_stock_level(&socks, 10);
        let item = factory.update_item(item.key(), 5).unwrap().unwrap();
        assert_eq!(item.quantity(), 5);
    }

    #[test]
    fn zero_quantity_update_removes_the_item() {
        let h = setup();
        let socks = publish_socks(&h, dec!(5.99));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        let item = factory.add_item(&socks, 2, AddItemOptions::default()).unwrap();
        assert!(factory.update_item(item.key(), 0).unwrap().is_none());

        assert!(factory.order().items().is_empty());
        assert_eq!(h.store.line_item_count(factory.order().id_typed()).unwrap(), 0);
        assert_eq!(factory.remove_item(item.key()), Err(DomainError::NotFound));
        assert!(factory
            .add_item(&socks, 0, AddItemOptions::default())
            .unwrap_err()
            .is_validation("InvalidQuantity"));
    }

    #[test]
    fn orders_are_found_by_reference() {
        let h = setup();
        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.write().unwrap();
        let reference = factory.order().reference().unwrap();

        let found = OrderFactory::find_or_make(h.services.clone(), None, Some(reference)).unwrap();
        assert_eq!(found.order().id_typed(), factory.order().id_typed());

        let fresh = OrderFactory::find_or_make(h.services.clone(), None, Some(reference + 100)).unwrap();
        assert_ne!(fresh.order().id_typed(), factory.order().id_typed());
        assert_eq!(fresh.order().version(), 0);
    }

    #[test]
    fn postage_and_discount_are_persisted() {
        let h = setup();
        let socks = publish_socks(&h, dec!(10));

        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.add_item(&socks, 1, AddItemOptions::default()).unwrap();
        factory.set_postage(dec!(4), dec!(0.80)).unwrap();
        factory.set_discount(dec!(20)).unwrap();
        factory.write().unwrap();

        let reloaded = reload(&h, factory.order());
        let totals = reloaded.totals();
        assert_eq!(totals.tax_total, dec!(2.80));
        assert_eq!(totals.total, Decimal::ZERO);

        let mut reloaded = reloaded;
        reloaded.set_allow_negative_value(true).unwrap();
        assert_eq!(reloaded.totals().total, dec!(-3.20));
    }

    #[test]
    fn stale_order_write_is_a_conflict() {
        let h = setup();
        let mut factory = OrderFactory::find_or_make(h.services.clone(), None, None).unwrap();
        factory.write().unwrap();

        let mut other = reload(&h, factory.order());
        other.set_discount(dec!(1)).unwrap();
        other.write().unwrap();

        factory.set_discount(dec!(2)).unwrap();
        assert!(matches!(factory.write(), Err(DomainError::Conflict(_))));
    }

    /// Accepts everything except order saves.
    struct RejectingSaves(InMemoryOrderStore);

    impl OrderStore for RejectingSaves {
        fn next_reference(&self) -> StoreResult<u64> {
            self.0.next_reference()
        }
        fn save_order(&self, _: &Order, _: ExpectedVersion) -> StoreResult<u64> {
            Err(StoreError::Backend("saves rejected".to_string()))
        }
        fn load_order(&self, id: OrderId) -> StoreResult<Option<Order>> {
            self.0.load_order(id)
        }
        fn find_order_by_reference(&self, reference: u64) -> StoreResult<Option<Order>> {
            self.0.find_order_by_reference(reference)
        }
        fn delete_order(&self, id: OrderId) -> StoreResult<()> {
            self.0.delete_order(id)
        }
        fn insert_line_item(&self, item: &LineItem) -> StoreResult<u64> {
            self.0.insert_line_item(item)
        }
        fn update_line_item(&self, item: &LineItem, expected: ExpectedVersion) -> StoreResult<u64> {
            self.0.update_line_item(item, expected)
        }
        fn load_line_item(&self, id: LineItemId) -> StoreResult<Option<LineItem>> {
            self.0.load_line_item(id)
        }
        fn find_line_item_by_key(&self, order_id: OrderId, key: &str) -> StoreResult<Option<LineItem>> {
            self.0.find_line_item_by_key(order_id, key)
        }
        fn delete_line_item(&self, id: LineItemId) -> StoreResult<()> {
            self.0.delete_line_item(id)
        }
        fn insert_customisation(&self, customisation: &Customisation) -> StoreResult<()> {
            self.0.insert_customisation(customisation)
        }
        fn insert_price_modifier(&self, modifier: &PriceModifier) -> StoreResult<()> {
            self.0.insert_price_modifier(modifier)
        }
    }

    #[test]
    fn failed_first_write_assigns_no_reference() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let services = OrderServices::new(
            OrderContext::default(),
            Arc::new(RejectingSaves(InMemoryOrderStore::new())),
            catalog.clone(),
            catalog,
            Arc::new(NoopNotifier),
        );

        let mut factory = OrderFactory::find_or_make(services, None, None).unwrap();
        assert!(matches!(factory.write(), Err(DomainError::Logic(_))));
        assert_eq!(factory.order().reference(), None);
        assert_eq!(factory.order().full_ref(), None);
        assert_eq!(factory.order().version(), 0);
    }
}
