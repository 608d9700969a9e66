//! Process-wide logging setup shared by the API binary and tests.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize tracing with the format named by `LOG_FORMAT` (`json` by default).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    tracing::init(format);
}
