// src/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Every event carries its source file and line. `RUST_LOG` overrides the
/// default filter.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .init();
}
