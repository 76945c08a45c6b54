//! # Scanner Module
//!
//! Discovers photo files in the source folder.
//!
//! Supported photo and companion extensions come from the tool options
//! (jpg, jpeg, heic, png and mov by default). A companion file is paired
//! with the photo sharing its folder and file stem, so `IMG_1.HEIC` and
//! `IMG_1.MOV` are copied and named together.
//!
//! ## Example
//! ```rust,ignore
//! let collector = PhotoCollector::new(&ToolOptions::default(), ScanConfig::default());
//! let result = collector.collect(Path::new("/Users/me/photos"))?;
//! ```

mod filter;
mod walker;

pub use filter::{MediaFilter, MediaKind};
pub use walker::PhotoCollector;

use crate::core::photo::PhotoFile;
use crate::error::ScanError;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Descend into sub-folders
    pub recursive: bool,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
            include_hidden: false,
        }
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Discovered photos, sorted by path
    pub photos: Vec<PhotoFile>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    pub fn companion_count(&self) -> usize {
        self.photos.iter().map(|p| p.companions.len()).sum()
    }
}
