//! Infrastructure layer: in-memory backends for the order engine's
//! boundaries, event bus notification and environment configuration.

pub mod catalog;
pub mod config;
pub mod notifier;
pub mod order_store;

pub use catalog::InMemoryCatalog;
pub use notifier::BusNotifier;
pub use order_store::InMemoryOrderStore;

mod integration_tests;
