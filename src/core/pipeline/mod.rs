//! # Pipeline Module
//!
//! Orchestrates a full classification run and produces a [`ClassifyPlan`].
//!
//! ## Pipeline Stages
//! 1. **Scan** - Discover photos and their companion files
//! 2. **Extract** - Read metadata (EXIF or a manifest)
//! 3. **Hash** - Content hashes, when duplicates are removed
//! 4. **Group** - Resolve identities and route into target directories
//! 5. **Name** - Per directory: drop duplicates, apply the missing-data
//!    actions, order, name, rename the folder
//!
//! ## Parallelism
//! Uses rayon for metadata extraction and hashing; grouping and naming
//! are single-threaded.

mod config;
mod executor;
mod plan;

pub use config::{ClassifyConfig, ClassifyMode, FolderAppend};
pub use executor::{Pipeline, PipelineBuilder};
pub use plan::{ClassifyPlan, PlannedDirectory};
