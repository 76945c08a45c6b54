//! # Photo Module
//!
//! A photo moves through the pipeline as a sequence of distinct types, one
//! per stage, so a later stage can't be reached without the data the
//! earlier ones attach:
//!
//! 1. [`PhotoFile`] - discovered on disk, with its companion files
//! 2. [`Photo`] - metadata extraction has run (and hashing, when enabled)
//! 3. [`IdentifiedPhoto`] - author and device resolved
//! 4. routed - held inside a directory bucket by the grouper
//! 5. [`NamedPhoto`] - final directory and file name assigned

use crate::core::identity::{Author, Device};
use crate::core::metadata::{ExifData, SubSeconds};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A discovered photo file and the files that travel with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoFile {
    pub path: PathBuf,
    /// Companion files (e.g. a live-photo video) sharing the photo's stem
    pub companions: Vec<PathBuf>,
}

impl PhotoFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            companions: Vec::new(),
        }
    }

    pub fn with_companions(mut self, companions: Vec<PathBuf>) -> Self {
        self.companions = companions;
        self
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn file_stem(&self) -> String {
        file_stem(&self.path)
    }

    /// Extension including the leading dot, or empty
    pub fn extension(&self) -> String {
        dotted_extension(&self.path)
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// A photo after metadata extraction
///
/// `exif` is `None` when extraction failed (invalid format).
#[derive(Debug, Clone)]
pub struct Photo {
    pub file: PhotoFile,
    pub exif: Option<ExifData>,
    pub content_hash: Option<String>,
}

impl Photo {
    pub fn new(file: PhotoFile, exif: Option<ExifData>) -> Self {
        Self {
            file,
            exif,
            content_hash: None,
        }
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    pub fn has_exif_data(&self) -> bool {
        self.exif.is_some()
    }

    pub fn taken_date(&self) -> Option<NaiveDateTime> {
        self.exif.as_ref().and_then(|e| e.taken_date)
    }

    pub fn has_taken_date(&self) -> bool {
        self.taken_date().is_some()
    }

    pub fn has_coordinate(&self) -> bool {
        self.exif.as_ref().is_some_and(|e| e.coordinate.is_some())
    }

    pub fn sub_seconds(&self) -> Option<&SubSeconds> {
        self.exif.as_ref().and_then(|e| e.sub_seconds.as_ref())
    }

    /// Sub-second precision in milliseconds, zero when absent
    pub fn sub_second_millis(&self) -> u32 {
        self.sub_seconds().map_or(0, SubSeconds::as_milliseconds)
    }

    pub fn reverse_geocodes(&self) -> Option<&[String]> {
        self.exif.as_ref().and_then(|e| e.reverse_geocodes())
    }

    pub fn has_reverse_geocode(&self) -> bool {
        self.exif.as_ref().is_some_and(ExifData::has_reverse_geocode)
    }

    pub fn reverse_geocode_formatted(&self) -> Option<String> {
        self.exif.as_ref().and_then(ExifData::reverse_geocode_formatted)
    }

    pub fn original_file_name(&self) -> Option<&str> {
        self.exif
            .as_ref()
            .and_then(|e| e.original_file_name.as_deref())
    }

    pub fn has_original_file_name(&self) -> bool {
        self.original_file_name().is_some()
    }
}

/// The author and device a photo belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub author: Arc<Author>,
    pub device: Arc<Device>,
}

/// A photo whose identity has been resolved
///
/// Photos without metadata carry no identity; they never reach the
/// resolver.
#[derive(Debug, Clone)]
pub struct IdentifiedPhoto {
    pub photo: Photo,
    pub identity: Option<Identity>,
}

impl IdentifiedPhoto {
    pub(crate) fn resolved(photo: Photo, identity: Identity) -> Self {
        Self {
            photo,
            identity: Some(identity),
        }
    }

    /// A photo with invalid metadata, which has no identity to resolve
    pub fn unresolved(photo: Photo) -> Self {
        Self {
            photo,
            identity: None,
        }
    }

    pub fn author(&self) -> Option<&Author> {
        self.identity.as_ref().map(|i| i.author.as_ref())
    }

    pub fn device(&self) -> Option<&Device> {
        self.identity.as_ref().map(|i| i.device.as_ref())
    }

    pub fn has_author(&self) -> bool {
        self.identity.is_some()
    }

    pub fn has_device(&self) -> bool {
        self.identity.is_some()
    }

    /// No roster author matched (unresolved or the sentinel)
    pub fn is_author_unknown(&self) -> bool {
        self.author().map_or(true, Author::is_unknown)
    }

    /// No roster device matched (unresolved or the sentinel)
    pub fn is_device_unknown(&self) -> bool {
        self.device().map_or(true, Device::is_unknown)
    }
}

/// A photo with its final location
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedPhoto {
    #[serde(skip)]
    pub photo: IdentifiedPhoto,
    pub source: PathBuf,
    /// Relative target directory, `/`-separated; empty for the output root
    pub target_directory: String,
    /// Final name without the extension
    pub base_name: String,
    /// Final file name including the extension
    pub file_name: String,
    /// Final names of the companion files, in companion order
    pub companion_file_names: Vec<String>,
}

impl NamedPhoto {
    /// Name the photo and its companions after `base_name`
    pub fn new(photo: IdentifiedPhoto, target_directory: &str, base_name: &str) -> Self {
        let file_name = format!("{}{}", base_name, photo.photo.file.extension());
        let companion_file_names = photo
            .photo
            .file
            .companions
            .iter()
            .map(|c| format!("{}{}", base_name, dotted_extension(c)))
            .collect();
        Self {
            source: photo.photo.file.path.clone(),
            photo,
            target_directory: target_directory.to_string(),
            base_name: base_name.to_string(),
            file_name,
            companion_file_names,
        }
    }

    /// Rename to a new base name, keeping extensions
    pub fn rename(&mut self, base_name: &str) {
        let photo = self.photo.clone();
        let target = std::mem::take(&mut self.target_directory);
        *self = NamedPhoto::new(photo, &target, base_name);
    }

    /// Move to another relative directory
    pub fn relocate(&mut self, target_directory: &str) {
        self.target_directory = target_directory.to_string();
    }

    /// Relative target path of the photo, `/`-separated
    pub fn target_relative_path(&self) -> String {
        if self.target_directory.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.target_directory, self.file_name)
        }
    }
}
