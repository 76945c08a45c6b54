//! Missing-data policy and ordering within a target directory.
//!
//! Before naming, each directory bucket is split three ways:
//! - **ordered** - photos the naming engine numbers, sorted by capture
//!   time, sub-second millis and source path
//! - **kept** - photos copied under their original name
//! - **dropped** - photos left out of the output

use crate::core::grouper::SubfolderFallbacks;
use crate::core::photo::IdentifiedPhoto;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// What to do with a file that has no readable metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidFormatAction {
    /// Copy it under its original name
    #[default]
    Continue,
    /// Abort the run before anything is planned
    PreventProcess,
    DontCopyToOutput,
    /// Route it to the invalid-format folder
    InSubFolder,
}

/// What to do with a photo without a capture date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoTakenDateAction {
    #[default]
    Continue,
    PreventProcess,
    DontCopyToOutput,
    InSubFolder,
    /// Number after the dated photos, ordered by file name
    AppendToEndOrderByFileName,
    /// Number before the dated photos, ordered by file name
    InsertToBeginningOrderByFileName,
}

/// What to do with a photo without an address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoAddressAction {
    #[default]
    Continue,
    PreventProcess,
    DontCopyToOutput,
    InSubFolder,
}

/// The three missing-data policies of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDataActions {
    pub invalid_format: InvalidFormatAction,
    pub no_taken_date: NoTakenDateAction,
    pub no_address: NoAddressAction,
}

impl MissingDataActions {
    /// Grouper flags for the `InSubFolder` actions
    pub fn subfolder_fallbacks(&self) -> SubfolderFallbacks {
        SubfolderFallbacks {
            invalid_format: self.invalid_format == InvalidFormatAction::InSubFolder,
            no_taken_date: self.no_taken_date == NoTakenDateAction::InSubFolder,
            no_address: self.no_address == NoAddressAction::InSubFolder,
            ..SubfolderFallbacks::default()
        }
    }
}

/// One directory bucket split by the missing-data policy
#[derive(Debug, Default)]
pub struct OrganizedPhotos {
    pub ordered: Vec<IdentifiedPhoto>,
    pub kept: Vec<IdentifiedPhoto>,
    pub dropped: Vec<IdentifiedPhoto>,
}

/// Apply the missing-data actions to one bucket and order what remains
pub fn filter_and_sort(
    photos: Vec<IdentifiedPhoto>,
    actions: &MissingDataActions,
    directory: &str,
) -> OrganizedPhotos {
    let mut result = OrganizedPhotos::default();
    let mut dated = Vec::new();
    let mut undated = Vec::new();

    for photo in photos {
        if !photo.photo.has_exif_data() {
            match actions.invalid_format {
                InvalidFormatAction::DontCopyToOutput => result.dropped.push(photo),
                _ => result.kept.push(photo),
            }
            continue;
        }

        if actions.no_address == NoAddressAction::DontCopyToOutput
            && !photo.photo.has_reverse_geocode()
        {
            result.dropped.push(photo);
            continue;
        }

        if photo.photo.has_taken_date() {
            dated.push(photo);
            continue;
        }

        match actions.no_taken_date {
            NoTakenDateAction::DontCopyToOutput => result.dropped.push(photo),
            NoTakenDateAction::AppendToEndOrderByFileName
            | NoTakenDateAction::InsertToBeginningOrderByFileName => undated.push(photo),
            _ => result.kept.push(photo),
        }
    }

    dated.sort_by(compare_by_capture);
    undated.sort_by(compare_by_file_name);

    result.ordered = match actions.no_taken_date {
        NoTakenDateAction::InsertToBeginningOrderByFileName => {
            undated.extend(dated);
            undated
        }
        _ => {
            dated.extend(undated);
            dated
        }
    };

    debug!(
        directory,
        ordered = result.ordered.len(),
        kept = result.kept.len(),
        dropped = result.dropped.len(),
        "Filtered and ordered photos"
    );
    result
}

fn compare_by_capture(a: &IdentifiedPhoto, b: &IdentifiedPhoto) -> Ordering {
    a.photo
        .taken_date()
        .cmp(&b.photo.taken_date())
        .then_with(|| a.photo.sub_second_millis().cmp(&b.photo.sub_second_millis()))
        .then_with(|| a.photo.path().cmp(b.photo.path()))
}

fn compare_by_file_name(a: &IdentifiedPhoto, b: &IdentifiedPhoto) -> Ordering {
    a.photo
        .file
        .file_name()
        .cmp(&b.photo.file.file_name())
        .then_with(|| a.photo.path().cmp(b.photo.path()))
}
