//! # Photo Classifier
//!
//! Plans how a folder of photos is sorted into directories and named.
//!
//! ## Core Philosophy
//! - **Never touch the source** - the pipeline produces a plan; nothing is
//!   moved or deleted
//! - **Missing data is routed, not rejected** - photos without a date,
//!   address or known owner go to fallback folders
//! - **Deterministic** - the same input always yields the same plan
//!
//! ## Architecture
//! - `core` - The classification engine
//! - `events` - Event-driven progress reporting
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ClassifierError, Result};

/// Initialize tracing for the binary
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects debug over warn.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
