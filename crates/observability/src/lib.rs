//! Tracing and logging setup shared by binaries and test harnesses.

use roiforge_config::LoggingSettings;

/// Initialize process-wide logging with the default JSON subscriber.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize logging from configured level and format.
pub fn init_with(settings: &LoggingSettings) {
    tracing::init_with(settings);
}

/// Subscriber construction (filters, formats).
pub mod tracing;
