use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{AggregateId, ValueObject, typed_id};
use shopdesk_tax::{TaxCategoryId, TaxRate, Taxable};

typed_id!(
    /// Product identifier (stable across versions).
    ProductId(AggregateId)
);

/// Points at one historical version of a product.
///
/// `class` distinguishes product kinds in the host catalog ("Product",
/// "GiftVoucher", ...). Line items store a `ProductRef` so they can always reach
/// the exact version they were priced from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductRef {
    pub class: String,
    pub id: ProductId,
    pub version: u32,
}

impl ProductRef {
    pub fn new(class: impl Into<String>, id: ProductId, version: u32) -> Self {
        Self {
            class: class.into(),
            id,
            version,
        }
    }
}

impl core::fmt::Display for ProductRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}#{}@v{}", self.class, self.id, self.version)
    }
}

/// Whether a product's stock is tracked and how much is on hand.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    pub stocked: bool,
    pub level: i64,
}

impl ValueObject for StockInfo {}

/// Typed access to stock data.
pub trait Stockable {
    fn stock_info(&self) -> StockInfo;
}

/// Snapshot of one version of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub class: String,
    pub id: ProductId,
    pub version: u32,
    pub title: String,
    /// Identity used for stock keeping and line item keys (e.g. a SKU).
    pub stock_id: String,
    /// Unit price before modifiers and tax; `None` if the product cannot be priced.
    pub base_price: Option<Decimal>,
    pub stock: StockInfo,
    pub deliverable: bool,
    /// Unit weight.
    pub weight: Decimal,
    pub tax_category: Option<TaxCategoryId>,
    pub tax_rate: Option<TaxRate>,
}

impl Product {
    /// A deliverable, untracked product at version 1.
    pub fn new(
        class: impl Into<String>,
        title: impl Into<String>,
        stock_id: impl Into<String>,
        base_price: Decimal,
    ) -> Self {
        Self {
            class: class.into(),
            id: ProductId::new(),
            version: 1,
            title: title.into(),
            stock_id: stock_id.into(),
            base_price: Some(base_price),
            stock: StockInfo::default(),
            deliverable: true,
            weight: Decimal::ZERO,
            tax_category: None,
            tax_rate: None,
        }
    }

    pub fn product_ref(&self) -> ProductRef {
        ProductRef::new(self.class.clone(), self.id, self.version)
    }

    pub fn with_stock(mut self, level: i64) -> Self {
        self.stock = StockInfo {
            stocked: true,
            level,
        };
        self
    }

    pub fn with_tax(mut self, category: Option<TaxCategoryId>, rate: Option<TaxRate>) -> Self {
        self.tax_category = category;
        self.tax_rate = rate;
        self
    }

    pub fn with_weight(mut self, weight: Decimal) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_deliverable(mut self, deliverable: bool) -> Self {
        self.deliverable = deliverable;
        self
    }
}

impl Stockable for Product {
    fn stock_info(&self) -> StockInfo {
        self.stock
    }
}

impl Taxable for Product {
    fn tax_category(&self) -> Option<TaxCategoryId> {
        self.tax_category
    }

    fn default_tax_rate(&self) -> Option<TaxRate> {
        self.tax_rate.clone()
    }
}

/// Boundary to the host's (versioned) product catalog.
pub trait ProductProvider: Send + Sync {
    /// A specific version, or the live (latest) one when `version` is `None`.
    fn get_product(&self, class: &str, id: ProductId, version: Option<u32>) -> Option<Product>;

    /// Stock on hand right now. Stock is always read from the live product,
    /// never from a pinned version.
    fn current_stock_level(&self, product: &Product) -> i64 {
        self.get_product(&product.class, product.id, None)
            .map(|live| live.stock_info().level)
            .unwrap_or(0)
    }

    fn find(&self, product: &ProductRef) -> Option<Product> {
        self.get_product(&product.class, product.id, Some(product.version))
    }

    fn live(&self, product: &ProductRef) -> Option<Product> {
        self.get_product(&product.class, product.id, None)
    }
}
