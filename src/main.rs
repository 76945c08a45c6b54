//! # photo-classify CLI
//!
//! Command-line interface for the photo classifier.
//!
//! ## Usage
//! ```bash
//! photo-classify plan ~/Photos --group-by year-month-day --naming date-time-with-minutes
//! photo-classify archive ~/Photos --output json
//! ```

mod cli;

use photo_classifier::Result;

fn main() -> Result<()> {
    cli::run()
}
