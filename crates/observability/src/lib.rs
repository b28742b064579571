//! Process-wide tracing setup shared by the Stockarium binaries.

/// Subscriber configuration (filters, output format).
pub mod tracing;

/// Initialize process-wide tracing with the default `info` filter.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init_with_default("info");
}
