//! # Duplicate Detector
//!
//! Removes byte-identical photos within one target directory.
//!
//! Photos are partitioned by content hash. The first photo of each
//! partition (input order) is kept; the rest are reported as duplicates
//! and left on disk. A photo without a hash is never a duplicate.

mod hasher;

pub use hasher::hash_file;

use crate::core::photo::IdentifiedPhoto;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Photos sharing one content hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub hash: String,
    /// The photo that stays in the plan
    pub representative: PathBuf,
    /// Photos with the same content that are dropped from the plan
    pub duplicates: Vec<PathBuf>,
}

impl DuplicateGroup {
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }
}

/// Result of filtering one directory bucket
#[derive(Debug, Default)]
pub struct DuplicateFilterResult {
    /// One photo per content hash, plus every unhashed photo, in input order
    pub unique: Vec<IdentifiedPhoto>,
    /// Only partitions with at least one duplicate
    pub groups: Vec<DuplicateGroup>,
}

impl DuplicateFilterResult {
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::duplicate_count).sum()
    }
}

/// Keep the first photo per content hash
pub fn group_and_filter_by_hash(photos: Vec<IdentifiedPhoto>) -> DuplicateFilterResult {
    let mut unique = Vec::with_capacity(photos.len());
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    // hash -> index into `groups`
    let mut seen: HashMap<String, usize> = HashMap::new();

    for photo in photos {
        let Some(hash) = photo.photo.content_hash.clone() else {
            unique.push(photo);
            continue;
        };

        match seen.get(&hash) {
            Some(&index) => {
                debug!(
                    path = %photo.photo.path().display(),
                    representative = %groups[index].representative.display(),
                    "Duplicate content"
                );
                groups[index].duplicates.push(photo.photo.path().to_path_buf());
            }
            None => {
                seen.insert(hash.clone(), groups.len());
                groups.push(DuplicateGroup {
                    hash,
                    representative: photo.photo.path().to_path_buf(),
                    duplicates: Vec::new(),
                });
                unique.push(photo);
            }
        }
    }

    groups.retain(|group| !group.duplicates.is_empty());
    DuplicateFilterResult { unique, groups }
}
