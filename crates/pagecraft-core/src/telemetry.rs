//! Tracing setup shared by hosts and tests.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes priority over `default_filter`. Output goes to stderr so
/// hosts can keep stdout for data. Returns an error when a global subscriber
/// is already installed.
pub fn init_tracing(default_filter: &str) -> Result<(), crate::LayoutError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| crate::LayoutError::Configuration(format!("Invalid log filter: {}", e)))?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| crate::LayoutError::Configuration(format!("Tracing already initialized: {}", e)))
}

/// Install a test-writer subscriber, ignoring repeated calls
pub fn init_test_tracing() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_tracing_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
        tracing::debug!("tracing ready");
    }
}
