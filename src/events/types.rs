//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the classification pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Metadata extraction and hashing events
    Extract(ExtractEvent),
    /// Per target directory events
    Directory(DirectoryEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// Progress update during scanning
    Progress(ScanProgress),
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed {
        total_photos: usize,
        companion_files: usize,
    },
}

/// Progress information during scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of directories scanned so far
    pub directories_scanned: usize,
    /// Number of photos found so far
    pub photos_found: usize,
    /// Current directory being scanned
    pub current_path: PathBuf,
}

/// Events while metadata is read and content hashed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractEvent {
    Started { total_photos: usize },
    Progress(ExtractProgress),
    /// The file has no readable metadata
    InvalidFormat { path: PathBuf },
    /// Hashing failed; the photo is kept without a hash
    HashError { path: PathBuf, message: String },
    Completed { valid: usize, invalid: usize },
}

/// Progress information during extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractProgress {
    pub completed: usize,
    pub total: usize,
    pub current_path: PathBuf,
}

/// Events while one target directory is processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DirectoryEvent {
    Started { directory: String, photos: usize },
    /// Byte-identical photos were found in the directory
    DuplicatesFound {
        directory: String,
        hash: String,
        duplicate_count: usize,
    },
    /// The folder renamer gave the directory a new name
    Renamed { from: String, to: String },
    Completed {
        directory: String,
        named: usize,
        kept: usize,
        dropped: usize,
    },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Extracting,
    Hashing,
    Grouping,
    Naming,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total photos found
    pub total_photos: usize,
    /// Target directories in the plan
    pub directories: usize,
    /// Photos in the plan
    pub planned: usize,
    /// Photos dropped as duplicates
    pub duplicate_count: usize,
    /// Photos left out by a missing-data policy
    pub not_copied: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Extracting => write!(f, "Reading metadata"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
            PipelinePhase::Naming => write!(f, "Naming"),
        }
    }
}
