use crate::category::{TaxCategory, TaxCategoryId};
use crate::rate::TaxRate;

/// Anything that can be taxed: exposes its category and its own default rate.
///
/// Products implement this; the resolver never needs the full product type.
pub trait Taxable {
    fn tax_category(&self) -> Option<TaxCategoryId>;

    fn default_tax_rate(&self) -> Option<TaxRate>;
}

/// Boundary to the host's tax configuration.
pub trait TaxCategoryProvider: Send + Sync {
    /// Look up a category; `None` if it does not exist.
    fn category(&self, id: TaxCategoryId) -> Option<TaxCategory>;

    /// Rate valid in `(country, region)` within a category.
    fn valid_tax(&self, category: TaxCategoryId, country: &str, region: &str) -> Option<TaxRate> {
        self.category(category)
            .and_then(|c| c.valid_tax(country, region).cloned())
    }

    /// The product's default rate: its own rate, else its category's default,
    /// else the fallback category's default, else the zero sentinel.
    fn default_rate(&self, product: &dyn Taxable, fallback: Option<TaxCategoryId>) -> TaxRate {
        let category_default = |id: Option<TaxCategoryId>| {
            id.and_then(|id| self.category(id))
                .and_then(|c| c.default_rate)
        };
        product
            .default_tax_rate()
            .or_else(|| category_default(product.tax_category()))
            .or_else(|| category_default(fallback))
            .unwrap_or_else(TaxRate::zero)
    }
}
