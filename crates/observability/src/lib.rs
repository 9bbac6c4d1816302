//! Tracing/logging setup shared by binaries and tests that embed the order engine.

/// Initialize process-wide structured (JSON) logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize human-readable logging (local development, test debugging).
pub fn init_pretty() {
    tracing::init_pretty();
}

/// Tracing configuration (filters, formatters).
pub mod tracing;
