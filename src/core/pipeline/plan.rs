//! The result of a classification run.

use super::ClassifyMode;
use crate::core::duplicate::DuplicateGroup;
use crate::core::photo::NamedPhoto;
use crate::core::statistics::StatisticsSnapshot;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// One target directory and the photos copied into it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedDirectory {
    /// Relative to the output root, `/`-separated; empty for the root itself
    pub directory: String,
    pub photos: Vec<NamedPhoto>,
}

/// Where every photo of the source folder goes
///
/// Nothing is copied by the pipeline; the plan is for a caller to execute
/// or report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyPlan {
    pub id: Uuid,
    pub mode: ClassifyMode,
    pub source_root: PathBuf,
    /// In first-seen order
    pub directories: Vec<PlannedDirectory>,
    /// Photos a missing-data policy left out
    pub dropped: Vec<PathBuf>,
    pub duplicates: Vec<DuplicateGroup>,
    /// Non-fatal errors met while scanning and hashing
    pub errors: Vec<String>,
    pub statistics: StatisticsSnapshot,
    pub duration_ms: u64,
}

impl ClassifyPlan {
    pub fn directory(&self, directory: &str) -> Option<&PlannedDirectory> {
        self.directories.iter().find(|d| d.directory == directory)
    }

    pub fn photo_count(&self) -> usize {
        self.directories.iter().map(|d| d.photos.len()).sum()
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicates.iter().map(DuplicateGroup::duplicate_count).sum()
    }

    /// Every planned photo, in plan order
    pub fn photos(&self) -> impl Iterator<Item = &NamedPhoto> {
        self.directories.iter().flat_map(|d| d.photos.iter())
    }
}
