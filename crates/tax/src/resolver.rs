//! Picks the tax rate for a line item.
//!
//! Resolution order:
//!
//! 1. no product → zero sentinel
//! 2. no line item context (no delivery to look at) → product default
//!    (its own rate, else its category's default, else the configured
//!    default category's, else zero)
//! 3. product has no category, or the category does not exist → product default
//! 4. delivery country and region both given → the category's rate for that
//!    geography, or the zero sentinel if the category has none
//! 5. otherwise → product default
//!
//! A category that exists but has no rate for the delivery geography resolves
//! to zero, never to the product default: the default may belong to an
//! unrelated jurisdiction.

use crate::category::TaxCategoryId;
use crate::geography::Delivery;
use crate::provider::{TaxCategoryProvider, Taxable};
use crate::rate::TaxRate;

/// Deterministic, side-effect-free tax rate resolution.
#[derive(Clone, Copy)]
pub struct TaxRateResolver<'a> {
    provider: &'a dyn TaxCategoryProvider,
    default_category: Option<TaxCategoryId>,
}

impl core::fmt::Debug for TaxRateResolver<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaxRateResolver")
            .field("default_category", &self.default_category)
            .finish_non_exhaustive()
    }
}

impl<'a> TaxRateResolver<'a> {
    pub fn new(provider: &'a dyn TaxCategoryProvider) -> Self {
        Self {
            provider,
            default_category: None,
        }
    }

    /// Category whose default rate applies to products without a rate of their own.
    pub fn with_default_category(mut self, category: Option<TaxCategoryId>) -> Self {
        self.default_category = category;
        self
    }

    /// `delivery` is the parent order's geography; `None` means there is no
    /// line item (and so no order) to take it from.
    pub fn find_best_tax_rate(
        &self,
        product: Option<&dyn Taxable>,
        delivery: Option<&Delivery>,
    ) -> TaxRate {
        let Some(product) = product else {
            return TaxRate::zero();
        };

        let default = || self.provider.default_rate(product, self.default_category);

        let Some(delivery) = delivery else {
            return default();
        };

        let Some(category) = product
            .tax_category()
            .filter(|id| self.provider.category(*id).is_some())
        else {
            return default();
        };

        if !delivery.is_complete() {
            return default();
        }

        match self
            .provider
            .valid_tax(category, delivery.country.trim(), delivery.region.trim())
        {
            Some(rate) => rate,
            None => {
                tracing::debug!(
                    category = %category,
                    country = %delivery.country,
                    region = %delivery.region,
                    "no tax rate for delivery geography; using zero rate"
                );
                TaxRate::zero()
            }
        }
    }
}
