//! # Error Module
//!
//! Error types for the photo classifier.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, ids, what went wrong
//! - **Missing data is not an error** - photos without a date, address or
//!   known owner are routed to fallback folders, not rejected
//! - **Programming errors are fatal** - calling a stage out of order aborts

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Grouping error: {0}")]
    Grouping(#[from] GroupingError),

    #[error("Naming error: {0}")]
    Naming(#[from] NamingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{count} photo(s) {reason}; processing was stopped by the configured policy")]
    PreventProcess { count: usize, reason: String },
}

/// Errors that occur while discovering photos
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while loading the author and device rosters
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Failed to read roster {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Roster {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Author {author} references unknown device {device}. Add the device to the device roster.")]
    UnknownDevice { author: String, device: String },
}

/// Errors raised by the identity resolver
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Metadata must be attached before resolving the identity of {path}")]
    MetadataNotAttached { path: PathBuf },
}

/// Errors raised by the directory grouper
#[derive(Error, Debug)]
pub enum GroupingError {
    #[error("Photo {path} is not inside the source folder {root}")]
    OutsideSourceRoot { path: PathBuf, root: PathBuf },
}

/// Errors raised by the naming engine
#[derive(Error, Debug)]
pub enum NamingError {
    #[error("Naming style {0} has no bucket key; use sequential numbering instead")]
    KeylessStyle(String),

    #[error("Photo {path} has no content hash, archive names require one")]
    MissingArchiveHash { path: PathBuf },
}

/// Errors in tool options or run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read options file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Options file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid date format `{pattern}` for {field}")]
    InvalidDateFormat { field: &'static str, pattern: String },

    #[error("Invalid option: {0}")]
    Invalid(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ClassifierError>;
