//! Order persistence.
//!
//! The boundary trait lives in `shopdesk-orders`; this module provides the
//! in-memory backend used by tests and development hosts.

pub mod in_memory;

pub use in_memory::InMemoryOrderStore;
