//! # Folder Renamer
//!
//! Appends a token computed from a directory's photos to the directory's
//! own name, e.g. `trip` -> `2024.01.05-2024.01.09-trip`.
//!
//! Only folders kept from the source hierarchy are renamed; flattened and
//! single-folder runs are left alone.

use crate::core::grouper::{format_date, sanitize_segment, FolderProcessType};
use crate::core::options::ToolOptions;
use crate::core::photo::NamedPhoto;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token appended to the folder name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderAppendType {
    /// Date of the earliest photo
    FirstYearMonthDay,
    FirstYearMonth,
    /// Earliest and latest day, or one day when they match
    DayRange,
    /// Address components shared by every located photo
    MatchingMinimumAddress,
}

/// Which side of the folder name the token goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderAppendLocationType {
    #[default]
    Prefix,
    Suffix,
}

pub struct FolderRenamer {
    options: ToolOptions,
    process_type: FolderProcessType,
    append_type: FolderAppendType,
    location: FolderAppendLocationType,
}

impl FolderRenamer {
    pub fn new(
        options: &ToolOptions,
        process_type: FolderProcessType,
        append_type: FolderAppendType,
        location: FolderAppendLocationType,
    ) -> Self {
        Self {
            options: options.clone(),
            process_type,
            append_type,
            location,
        }
    }

    /// Rename `directory` after its photos and move them along
    ///
    /// Returns the new directory, or `None` when nothing changed.
    pub fn rename(&self, photos: &mut [NamedPhoto], directory: &str) -> Option<String> {
        let renamed = self.renamed_directory(photos, directory)?;
        for photo in photos.iter_mut() {
            photo.relocate(&renamed);
        }
        debug!(from = directory, to = %renamed, "Renamed target folder");
        Some(renamed)
    }

    /// The name `directory` would get, without touching the photos
    pub fn renamed_directory(&self, photos: &[NamedPhoto], directory: &str) -> Option<String> {
        if self.process_type != FolderProcessType::SubFoldersPreserveFolderHierarchy
            || directory.is_empty()
        {
            return None;
        }

        let token = self.token(photos)?;
        let (parent, leaf) = match directory.rsplit_once('/') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, directory),
        };
        let separator = &self.options.folder_append_separator;
        let leaf = match self.location {
            FolderAppendLocationType::Prefix => format!("{token}{separator}{leaf}"),
            FolderAppendLocationType::Suffix => format!("{leaf}{separator}{token}"),
        };

        Some(match parent {
            Some(parent) => format!("{parent}/{leaf}"),
            None => leaf,
        })
    }

    fn token(&self, photos: &[NamedPhoto]) -> Option<String> {
        let o = &self.options;
        let dates = || photos.iter().filter_map(|p| p.photo.photo.taken_date());

        let token = match self.append_type {
            FolderAppendType::FirstYearMonthDay => {
                dates().min().map(|d| format_date(d, &o.date_format_with_day))
            }
            FolderAppendType::FirstYearMonth => {
                dates().min().map(|d| format_date(d, &o.date_format_with_month))
            }
            FolderAppendType::DayRange => {
                let first = dates().min()?;
                let last = dates().max()?;
                let first = format_date(first, &o.date_format_with_day);
                let last = format_date(last, &o.date_format_with_day);
                Some(if first == last {
                    first
                } else {
                    format!("{first}{}{last}", o.day_range_separator)
                })
            }
            FolderAppendType::MatchingMinimumAddress => self.common_address(photos),
        };

        token
            .map(|t| sanitize_segment(&t))
            .filter(|t| !t.is_empty())
    }

    /// Longest common prefix of the located photos' address components
    fn common_address(&self, photos: &[NamedPhoto]) -> Option<String> {
        let mut addresses = photos.iter().filter_map(|p| p.photo.photo.reverse_geocodes());
        let mut common: Vec<String> = addresses.next()?.to_vec();
        for components in addresses {
            let matching = common
                .iter()
                .zip(components)
                .take_while(|(a, b)| a == b)
                .count();
            common.truncate(matching);
        }
        if common.is_empty() {
            None
        } else {
            Some(common.join(&self.options.address_separator))
        }
    }
}
