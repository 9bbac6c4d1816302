//! Tax rates, geography-scoped tax categories, and best-rate resolution.
//!
//! Pure domain logic: the host's tax configuration is reached only through
//! [`TaxCategoryProvider`].

pub mod category;
pub mod geography;
pub mod provider;
pub mod rate;
pub mod resolver;

pub use category::{TaxCategory, TaxCategoryId, TaxZone, ZonedRate};
pub use geography::Delivery;
pub use provider::{TaxCategoryProvider, Taxable};
pub use rate::{TaxRate, TaxRateId};
pub use resolver::TaxRateResolver;
