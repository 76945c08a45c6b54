//! # Core Module
//!
//! The classification engine, independent of any user interface.
//!
//! ## Modules
//! - `scanner` - Discovers photos and companion files
//! - `metadata` - Reads EXIF or manifest metadata
//! - `identity` - Author and device rosters and resolution
//! - `grouper` - Routes photos into target directories
//! - `duplicate` - Content hashing and per-directory duplicate removal
//! - `organize` - Missing-data actions and ordering
//! - `naming` - File names from naming styles
//! - `renamer` - Appends date or address tokens to folder names
//! - `pipeline` - Orchestrates the full workflow

pub mod bucket;
pub mod duplicate;
pub mod grouper;
pub mod identity;
pub mod metadata;
pub mod naming;
pub mod options;
pub mod organize;
pub mod photo;
pub mod pipeline;
pub mod renamer;
pub mod scanner;
pub mod statistics;

// Re-export commonly used types
pub use grouper::{FolderProcessType, GroupByFolderType};
pub use identity::{Author, Device, IdentityResolver, Roster};
pub use naming::{NamingEngine, NamingStyle};
pub use options::ToolOptions;
pub use photo::{IdentifiedPhoto, NamedPhoto, Photo, PhotoFile};
pub use pipeline::{ClassifyConfig, ClassifyMode, ClassifyPlan, Pipeline};
