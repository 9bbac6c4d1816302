use std::sync::Arc;

use shopdesk_products::ProductProvider;
use shopdesk_tax::{TaxCategoryProvider, TaxRateResolver};

use crate::context::OrderContext;
use crate::notify::StatusNotifier;
use crate::store::OrderStore;

/// Collaborators shared by the order and line item factories.
#[derive(Clone)]
pub struct OrderServices {
    pub context: Arc<OrderContext>,
    pub store: Arc<dyn OrderStore>,
    pub products: Arc<dyn ProductProvider>,
    pub taxes: Arc<dyn TaxCategoryProvider>,
    pub notifier: Arc<dyn StatusNotifier>,
}

impl OrderServices {
    pub fn new(
        context: OrderContext,
        store: Arc<dyn OrderStore>,
        products: Arc<dyn ProductProvider>,
        taxes: Arc<dyn TaxCategoryProvider>,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Self {
        Self {
            context: Arc::new(context),
            store,
            products,
            taxes,
            notifier,
        }
    }

    pub fn resolver(&self) -> TaxRateResolver<'_> {
        TaxRateResolver::new(self.taxes.as_ref()).with_default_category(self.context.default_tax_category)
    }
}

impl core::fmt::Debug for OrderServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OrderServices")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
