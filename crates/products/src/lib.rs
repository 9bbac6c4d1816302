//! Product catalog boundary: versioned product snapshots and stock data.
//!
//! The catalog itself belongs to the host application; this crate only defines
//! the shapes the order engine reads and the [`ProductProvider`] it reads them through.

pub mod product;

pub use product::{Product, ProductId, ProductProvider, ProductRef, StockInfo, Stockable};
