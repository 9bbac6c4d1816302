//! In-memory product catalog and tax configuration.

use std::collections::HashMap;
use std::sync::RwLock;

use rust_decimal::Decimal;

use shopdesk_products::{Product, ProductId, ProductProvider, ProductRef};
use shopdesk_tax::{TaxCategory, TaxCategoryId, TaxCategoryProvider};

/// Versioned products plus tax categories.
///
/// Every price change publishes a new product version; stock levels are
/// present-tense and updated in place on the live version.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    /// All versions of each product, oldest first.
    products: RwLock<HashMap<(String, ProductId), Vec<Product>>>,
    categories: RwLock<HashMap<TaxCategoryId, TaxCategory>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a product as its next version. Returns the stored snapshot, or
    /// `None` if the catalog lock is poisoned.
    pub fn publish(&self, mut product: Product) -> Option<Product> {
        let mut products = self.products.write().ok()?;
        let versions = products
            .entry((product.class.clone(), product.id))
            .or_default();
        if let Some(last) = versions.last() {
            product.version = last.version + 1;
        }
        versions.push(product.clone());
        Some(product)
    }

    /// Publish a new version of the live product with a changed price.
    pub fn reprice(&self, product: &ProductRef, price: Decimal) -> Option<Product> {
        let mut next = self.live(product)?;
        next.base_price = Some(price);
        self.publish(next)
    }

    /// Set the stock level of the live version.
    pub fn set_stock_level(&self, product: &ProductRef, level: i64) -> bool {
        let Ok(mut products) = self.products.write() else {
            return false;
        };
        match products
            .get_mut(&(product.class.clone(), product.id))
            .and_then(|versions| versions.last_mut())
        {
            Some(live) => {
                live.stock.level = level;
                true
            }
            None => false,
        }
    }

    /// Add or replace a category. `false` if the catalog lock is poisoned.
    pub fn add_category(&self, category: TaxCategory) -> bool {
        let Ok(mut categories) = self.categories.write() else {
            return false;
        };
        categories.insert(category.id, category);
        true
    }
}

impl ProductProvider for InMemoryCatalog {
    fn get_product(&self, class: &str, id: ProductId, version: Option<u32>) -> Option<Product> {
        let products = self.products.read().ok()?;
        let versions = products.get(&(class.to_string(), id))?;
        match version {
            Some(v) => versions.iter().find(|p| p.version == v).cloned(),
            None => versions.last().cloned(),
        }
    }
}

impl TaxCategoryProvider for InMemoryCatalog {
    fn category(&self, id: TaxCategoryId) -> Option<TaxCategory> {
        self.categories.read().ok()?.get(&id).cloned()
    }
}
