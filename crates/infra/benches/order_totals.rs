use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use shopdesk_infra::{InMemoryCatalog, InMemoryOrderStore};
use shopdesk_orders::{
    AddItemOptions, CustomisationSpec, ModifierSpec, NoopNotifier, Order, OrderContext, OrderFactory,
    OrderServices,
};
use shopdesk_products::Product;
use shopdesk_tax::{TaxRate, TaxRateId};

fn services(catalog: Arc<InMemoryCatalog>) -> OrderServices {
    OrderServices::new(
        OrderContext::default(),
        Arc::new(InMemoryOrderStore::new()),
        catalog.clone(),
        catalog,
        Arc::new(NoopNotifier),
    )
}

/// An order with `lines` distinct items, each with one customisation and one modifier.
fn order_with_lines(lines: usize) -> (Order, Arc<InMemoryCatalog>) {
    let catalog = Arc::new(InMemoryCatalog::new());
    let vat = TaxRate::new(TaxRateId(1), "VAT", Decimal::new(20, 0));
    let product = catalog
        .publish(Product::new("Product", "Socks", "SOCKS", Decimal::new(599, 2)).with_tax(None, Some(vat)))
        .unwrap()
        .product_ref();

    let mut factory = OrderFactory::find_or_make(services(catalog.clone()), None, None)
        .unwrap_or_else(|e| panic!("order setup failed: {e}"));
    for i in 0..lines {
        let options = AddItemOptions {
            customisations: vec![CustomisationSpec::new("Variant", i.to_string())],
            modifiers: vec![ModifierSpec::new("Surcharge", Decimal::new(i as i64 % 7, 1))],
            ..AddItemOptions::default()
        };
        factory
            .add_item(&product, (i % 5 + 1) as u32, options)
            .unwrap_or_else(|e| panic!("add_item failed: {e}"));
    }
    (factory.into_order(), catalog)
}

fn bench_order_totals(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_totals");
    let rounding = OrderContext::default().rounding;

    for lines in [1usize, 10, 100, 1_000] {
        let (order, catalog) = order_with_lines(lines);
        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &order, |b, order| {
            b.iter(|| black_box(order.totals(catalog.as_ref(), rounding)))
        });
    }
    group.finish();
}

fn bench_merge_add(c: &mut Criterion) {
    let catalog = Arc::new(InMemoryCatalog::new());
    let product = catalog
        .publish(Product::new("Product", "Socks", "SOCKS", Decimal::new(599, 2)))
        .unwrap()
        .product_ref();
    let mut factory = OrderFactory::find_or_make(services(catalog), None, None)
        .unwrap_or_else(|e| panic!("order setup failed: {e}"));

    c.bench_function("add_item_merge", |b| {
        b.iter(|| {
            factory
                .add_item(black_box(&product), 1, AddItemOptions::default())
                .unwrap_or_else(|e| panic!("add_item failed: {e}"))
        })
    });
}

criterion_group!(benches, bench_order_totals, bench_merge_add);
criterion_main!(benches);
