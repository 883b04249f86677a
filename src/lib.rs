//! Toy House - REST backend for a toy marketplace
//!
//! Toy House serves CRUD and listing endpoints over a single collection of
//! toy records. Listings can be filtered by category, seller, or title and
//! a seller's toys can be ordered by price.
#![warn(missing_docs)]

// Configure global allocator
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

// Core foundational modules
pub mod core;
pub mod types;

// Main functional modules
pub mod storage;
pub mod api;
pub mod system;

// Re-export commonly used items for convenience
pub use crate::core::{AppState, Config, Error, Result};

use crate::core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize tracing and the metrics registry
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init(logging: &LoggingConfig) -> Result<()> {
    init_logging(logging)?;

    tracing::info!("Initializing {} v{}", NAME, VERSION);

    system::metrics::init_registry();

    Ok(())
}

/// Install the global tracing subscriber
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| Error::config(format!("Invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match logging.format.as_str() {
        "compact" => builder.compact().try_init(),
        _ => builder.pretty().try_init(),
    };

    installed.map_err(|e| Error::config(format!("Failed to install logger: {}", e)))
}
