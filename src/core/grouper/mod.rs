//! # Directory Grouper
//!
//! Computes each photo's target directory, relative to the output root,
//! and partitions the photo set by it.
//!
//! ## Precedence
//! 1. Invalid format with its fallback enabled -> the invalid-format folder
//!    at the output root, nothing else applies
//! 2. Any missing field whose fallback is enabled -> the fallback folder
//!    under the base path; enumerated combinations map to their dedicated
//!    folder, other combinations nest one folder per missing field
//! 3. A field the grouping needs is missing, fallback disabled -> the base
//!    path without grouping folders
//! 4. Otherwise -> base path plus the grouping folders
//!
//! The base path is the photo's folder relative to the source root when
//! the hierarchy is preserved, and the output root otherwise.

use crate::core::bucket::Buckets;
use crate::core::options::ToolOptions;
use crate::core::photo::IdentifiedPhoto;
use crate::error::GroupingError;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use tracing::{debug, info};

/// How the source folder's sub-folders are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FolderProcessType {
    /// Only the top level of the source folder
    #[default]
    Single,
    /// Recurse and keep each photo's relative folder
    SubFoldersPreserveFolderHierarchy,
    /// Recurse and put everything under the output root
    FlattenAllSubFolders,
}

impl FolderProcessType {
    pub fn is_recursive(self) -> bool {
        !matches!(self, FolderProcessType::Single)
    }
}

/// Which metadata becomes target sub-folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupByFolderType {
    YearMonthDay,
    YearMonth,
    Year,
    /// The whole address as one folder
    AddressFlat,
    /// One folder per address component
    AddressHierarchy,
    /// `2020s/2024/202401Jan/2024-01-05`
    DecadeYearYearShortMonthNameYearMonthDay,
    Author,
    Device,
    AuthorYearMonthDay,
    DeviceYearMonthDay,
    AuthorDeviceYearMonthDay,
}

impl GroupByFolderType {
    pub fn requires_taken_date(self) -> bool {
        !matches!(
            self,
            GroupByFolderType::AddressFlat
                | GroupByFolderType::AddressHierarchy
                | GroupByFolderType::Author
                | GroupByFolderType::Device
        )
    }

    pub fn requires_address(self) -> bool {
        matches!(
            self,
            GroupByFolderType::AddressFlat | GroupByFolderType::AddressHierarchy
        )
    }
}

/// Which missing fields get a dedicated fallback folder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubfolderFallbacks {
    pub invalid_format: bool,
    pub no_taken_date: bool,
    pub no_address: bool,
    pub no_author: bool,
    pub no_device: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct MissingFields {
    taken_date: bool,
    address: bool,
    author: bool,
    device: bool,
}

impl MissingFields {
    fn any(self) -> bool {
        self.taken_date || self.address || self.author || self.device
    }
}

/// Routes photos into target directories
pub struct DirectoryGrouper {
    options: ToolOptions,
    process_type: FolderProcessType,
    group_by: Option<GroupByFolderType>,
    fallbacks: SubfolderFallbacks,
}

impl DirectoryGrouper {
    pub fn new(
        options: &ToolOptions,
        process_type: FolderProcessType,
        group_by: Option<GroupByFolderType>,
        fallbacks: SubfolderFallbacks,
    ) -> Self {
        Self {
            options: options.clone(),
            process_type,
            group_by,
            fallbacks,
        }
    }

    /// Partition photos by target directory
    ///
    /// Buckets come out in first-seen order and keep the input order
    /// inside; every photo lands in exactly one bucket.
    pub fn group_files(
        &self,
        photos: Vec<IdentifiedPhoto>,
        source_root: &Path,
    ) -> Result<Buckets<IdentifiedPhoto>, GroupingError> {
        let mut buckets = Buckets::new();
        for photo in photos {
            let directory = self.target_directory(&photo, source_root)?;
            buckets.push(directory, photo);
        }
        info!(
            directories = buckets.len(),
            photos = buckets.item_count(),
            process_type = ?self.process_type,
            group_by = ?self.group_by,
            "Grouped photos into target directories"
        );
        Ok(buckets)
    }

    /// Target directory of one photo, `/`-separated, empty for the root
    pub fn target_directory(
        &self,
        photo: &IdentifiedPhoto,
        source_root: &Path,
    ) -> Result<String, GroupingError> {
        if !photo.photo.has_exif_data() && self.fallbacks.invalid_format {
            return Ok(sanitize_segment(&self.options.photo_format_invalid_folder_name));
        }

        let mut segments = self.base_segments(photo, source_root)?;

        if photo.photo.has_exif_data() {
            let missing = MissingFields {
                taken_date: self.fallbacks.no_taken_date && !photo.photo.has_taken_date(),
                address: self.fallbacks.no_address && !photo.photo.has_reverse_geocode(),
                author: self.fallbacks.no_author && photo.is_author_unknown(),
                device: self.fallbacks.no_device && photo.is_device_unknown(),
            };

            if missing.any() {
                let fallback = self.fallback_segments(missing);
                segments.extend(fallback.iter().map(|s| sanitize_segment(s)));
            } else if let Some(group_by) = self.group_by {
                if self.has_required_fields(photo, group_by) {
                    let generated = self.grouping_segments(photo, group_by);
                    segments.extend(generated.iter().map(|s| sanitize_segment(s)));
                } else {
                    debug!(
                        path = %photo.photo.path().display(),
                        group_by = ?group_by,
                        "Missing grouping field, keeping photo in its base folder"
                    );
                }
            }
        }

        Ok(join_segments(&segments))
    }

    fn base_segments(
        &self,
        photo: &IdentifiedPhoto,
        source_root: &Path,
    ) -> Result<Vec<String>, GroupingError> {
        if self.process_type != FolderProcessType::SubFoldersPreserveFolderHierarchy {
            return Ok(Vec::new());
        }

        let path = photo.photo.path();
        let parent = path.parent().unwrap_or(Path::new(""));
        let relative = parent
            .strip_prefix(source_root)
            .map_err(|_| GroupingError::OutsideSourceRoot {
                path: path.to_path_buf(),
                root: source_root.to_path_buf(),
            })?;

        Ok(relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect())
    }

    fn has_required_fields(&self, photo: &IdentifiedPhoto, group_by: GroupByFolderType) -> bool {
        (!group_by.requires_taken_date() || photo.photo.has_taken_date())
            && (!group_by.requires_address() || photo.photo.has_reverse_geocode())
    }

    fn fallback_segments(&self, missing: MissingFields) -> Vec<String> {
        let o = &self.options;
        let combined = match (missing.address, missing.taken_date, missing.author, missing.device) {
            (false, true, false, false) => Some(&o.no_photo_taken_date_folder_name),
            (true, false, false, false) => Some(&o.no_address_folder_name),
            (true, true, false, false) => Some(&o.no_address_and_photo_taken_date_folder_name),
            (false, false, true, false) => Some(&o.no_author_folder_name),
            (false, false, false, true) => Some(&o.no_device_folder_name),
            (false, true, true, false) => Some(&o.no_author_and_photo_taken_date_folder_name),
            (false, true, false, true) => Some(&o.no_device_and_photo_taken_date_folder_name),
            (false, true, true, true) => {
                Some(&o.no_author_and_device_and_photo_taken_date_folder_name)
            }
            _ => None,
        };
        if let Some(name) = combined {
            return vec![name.clone()];
        }

        // No dedicated folder for this combination: one level per field
        let mut segments = Vec::new();
        let mut date_consumed = false;
        if missing.address {
            if missing.taken_date {
                segments.push(o.no_address_and_photo_taken_date_folder_name.clone());
                date_consumed = true;
            } else {
                segments.push(o.no_address_folder_name.clone());
            }
        }
        if missing.taken_date && !date_consumed {
            segments.push(o.no_photo_taken_date_folder_name.clone());
        }
        if missing.author {
            segments.push(o.no_author_folder_name.clone());
        }
        if missing.device {
            segments.push(o.no_device_folder_name.clone());
        }
        segments
    }

    fn grouping_segments(&self, photo: &IdentifiedPhoto, group_by: GroupByFolderType) -> Vec<String> {
        let o = &self.options;
        let taken = photo.photo.taken_date();
        let author = photo.author().map(|a| a.display_alias().to_string()).unwrap_or_default();
        let device = photo.device().map(|d| d.display_alias().to_string()).unwrap_or_default();

        let year_month_day = |date: NaiveDateTime| {
            vec![
                format_date(date, &o.year_format),
                format_date(date, &o.month_format),
                format_date(date, &o.day_format),
            ]
        };

        match (group_by, taken) {
            (GroupByFolderType::YearMonthDay, Some(date)) => year_month_day(date),
            (GroupByFolderType::YearMonth, Some(date)) => vec![
                format_date(date, &o.year_format),
                format_date(date, &o.month_format),
            ],
            (GroupByFolderType::Year, Some(date)) => vec![format_date(date, &o.year_format)],
            (GroupByFolderType::AddressFlat, _) => {
                photo.photo.reverse_geocode_formatted().into_iter().collect()
            }
            (GroupByFolderType::AddressHierarchy, _) => photo
                .photo
                .reverse_geocodes()
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            (GroupByFolderType::DecadeYearYearShortMonthNameYearMonthDay, Some(date)) => vec![
                format!("{}s", date.year() / 10 * 10),
                format_date(date, "%Y"),
                format_date(date, "%Y%m%b"),
                format_date(date, "%Y-%m-%d"),
            ],
            (GroupByFolderType::Author, _) => vec![author],
            (GroupByFolderType::Device, _) => vec![device],
            (GroupByFolderType::AuthorYearMonthDay, Some(date)) => {
                let mut segments = vec![author];
                segments.extend(year_month_day(date));
                segments
            }
            (GroupByFolderType::DeviceYearMonthDay, Some(date)) => {
                let mut segments = vec![device];
                segments.extend(year_month_day(date));
                segments
            }
            (GroupByFolderType::AuthorDeviceYearMonthDay, Some(date)) => {
                let mut segments = vec![author, device];
                segments.extend(year_month_day(date));
                segments
            }
            (_, None) => Vec::new(),
        }
    }
}

pub(crate) fn format_date(date: NaiveDateTime, pattern: &str) -> String {
    date.format(pattern).to_string()
}

/// Folder name built from metadata or options
///
/// Trimmed, separators become `-` and the dot names `.`/`..` become `_`,
/// so a generated segment is always exactly one level below its parent.
pub(crate) fn sanitize_segment(segment: &str) -> String {
    match segment.trim() {
        "." | ".." => "_".to_string(),
        trimmed => trimmed.replace(['/', '\\'], "-"),
    }
}

/// Source folder names are joined as found; generated ones arrive sanitized
fn join_segments(segments: &[String]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{IdentityResolver, Roster};
    use crate::core::metadata::ExifData;
    use crate::core::photo::{Photo, PhotoFile};
    use chrono::NaiveDate;

    const ROOT: &str = "/photos";

    fn taken() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn photo(path: &str, date: bool, address: bool) -> IdentifiedPhoto {
        let mut exif = ExifData::new(date.then(taken), None, "-");
        if address {
            exif = exif.with_reverse_geocodes(vec!["Spain".to_string(), "Madrid".to_string()]);
        }
        let photo = Photo::new(PhotoFile::new(path), Some(exif));
        IdentityResolver::new(Roster::empty()).identify(photo)
    }

    fn invalid(path: &str) -> IdentifiedPhoto {
        IdentifiedPhoto::unresolved(Photo::new(PhotoFile::new(path), None))
    }

    fn grouper(
        process: FolderProcessType,
        group_by: Option<GroupByFolderType>,
        fallbacks: SubfolderFallbacks,
    ) -> DirectoryGrouper {
        DirectoryGrouper::new(&ToolOptions::default(), process, group_by, fallbacks)
    }

    fn dir(grouper: &DirectoryGrouper, photo: &IdentifiedPhoto) -> String {
        grouper.target_directory(photo, Path::new(ROOT)).unwrap()
    }

    #[test]
    fn year_month_day_uses_date_tokens() {
        let g = grouper(
            FolderProcessType::FlattenAllSubFolders,
            Some(GroupByFolderType::YearMonthDay),
            SubfolderFallbacks::default(),
        );
        assert_eq!(dir(&g, &photo("/photos/a/b.jpg", true, false)), "2024/01/05");
    }

    #[test]
    fn preserve_keeps_relative_folder() {
        let g = grouper(
            FolderProcessType::SubFoldersPreserveFolderHierarchy,
            Some(GroupByFolderType::YearMonth),
            SubfolderFallbacks::default(),
        );
        assert_eq!(
            dir(&g, &photo("/photos/trip/day1/b.jpg", true, false)),
            "trip/day1/2024/01"
        );
    }

    #[test]
    fn preserve_rejects_photo_outside_root() {
        let g = grouper(
            FolderProcessType::SubFoldersPreserveFolderHierarchy,
            None,
            SubfolderFallbacks::default(),
        );
        let result = g.target_directory(&photo("/elsewhere/b.jpg", true, false), Path::new(ROOT));
        assert!(matches!(result, Err(GroupingError::OutsideSourceRoot { .. })));
    }

    #[test]
    fn invalid_format_short_circuits() {
        let fallbacks = SubfolderFallbacks {
            invalid_format: true,
            no_taken_date: true,
            ..SubfolderFallbacks::default()
        };
        let g = grouper(
            FolderProcessType::SubFoldersPreserveFolderHierarchy,
            Some(GroupByFolderType::YearMonthDay),
            fallbacks,
        );
        assert_eq!(dir(&g, &invalid("/photos/trip/x.jpg")), "invalid-photo-format");
    }

    #[test]
    fn invalid_format_without_fallback_stays_in_base_folder() {
        let g = grouper(
            FolderProcessType::SubFoldersPreserveFolderHierarchy,
            Some(GroupByFolderType::YearMonthDay),
            SubfolderFallbacks::default(),
        );
        assert_eq!(dir(&g, &invalid("/photos/trip/x.jpg")), "trip");
    }

    #[test]
    fn missing_date_and_address_use_combined_folder() {
        let fallbacks = SubfolderFallbacks {
            no_taken_date: true,
            no_address: true,
            ..SubfolderFallbacks::default()
        };
        let g = grouper(
            FolderProcessType::FlattenAllSubFolders,
            Some(GroupByFolderType::AddressHierarchy),
            fallbacks,
        );
        assert_eq!(
            dir(&g, &photo("/photos/x.jpg", false, false)),
            "no-address-and-no-photo-taken-date"
        );
        assert_eq!(dir(&g, &photo("/photos/x.jpg", true, false)), "no-address");
        assert_eq!(dir(&g, &photo("/photos/x.jpg", false, true)), "no-photo-taken-date");
        assert_eq!(dir(&g, &photo("/photos/x.jpg", true, true)), "Spain/Madrid");
    }

    #[test]
    fn unknown_author_and_device_with_date_use_triple_folder() {
        let fallbacks = SubfolderFallbacks {
            no_taken_date: true,
            no_author: true,
            no_device: true,
            ..SubfolderFallbacks::default()
        };
        let g = grouper(FolderProcessType::FlattenAllSubFolders, None, fallbacks);
        assert_eq!(
            dir(&g, &photo("/photos/x.jpg", false, false)),
            "no-author-and-no-device-and-no-photo-taken-date"
        );
    }

    #[test]
    fn unlisted_combination_nests_fallback_folders() {
        let fallbacks = SubfolderFallbacks {
            no_address: true,
            no_author: true,
            ..SubfolderFallbacks::default()
        };
        let g = grouper(FolderProcessType::FlattenAllSubFolders, None, fallbacks);
        assert_eq!(dir(&g, &photo("/photos/x.jpg", true, false)), "no-address/no-author");
    }

    #[test]
    fn missing_required_field_without_fallback_drops_grouping() {
        let g = grouper(
            FolderProcessType::FlattenAllSubFolders,
            Some(GroupByFolderType::Year),
            SubfolderFallbacks::default(),
        );
        assert_eq!(dir(&g, &photo("/photos/x.jpg", false, true)), "");
    }

    fn located(path: &str, address: &[&str]) -> IdentifiedPhoto {
        let exif = ExifData::new(Some(taken()), None, "-")
            .with_reverse_geocodes(address.iter().map(|s| s.to_string()).collect());
        let photo = Photo::new(PhotoFile::new(path), Some(exif));
        IdentityResolver::new(Roster::empty()).identify(photo)
    }

    #[test]
    fn dot_address_components_stay_below_the_output_root() {
        let g = grouper(
            FolderProcessType::FlattenAllSubFolders,
            Some(GroupByFolderType::AddressHierarchy),
            SubfolderFallbacks::default(),
        );
        let target = dir(&g, &located("/photos/x.jpg", &["..", "..", "etc"]));
        assert_eq!(target, "_/_/etc");
        assert!(!target.split('/').any(|s| s == ".." || s == "."));

        assert_eq!(
            dir(&g, &located("/photos/x.jpg", &[" . ", "Madrid/Centro"])),
            "_/Madrid-Centro"
        );
    }

    #[test]
    fn flat_address_of_dots_is_neutralised() {
        let g = grouper(
            FolderProcessType::FlattenAllSubFolders,
            Some(GroupByFolderType::AddressFlat),
            SubfolderFallbacks::default(),
        );
        assert_eq!(dir(&g, &located("/photos/x.jpg", &[".."])), "_");
    }

    #[test]
    fn preserved_folder_names_are_not_trimmed() {
        let g = grouper(
            FolderProcessType::SubFoldersPreserveFolderHierarchy,
            None,
            SubfolderFallbacks::default(),
        );
        assert_eq!(dir(&g, &photo("/photos/trip /x.jpg", true, false)), "trip ");
        assert_eq!(dir(&g, &photo("/photos/trip/x.jpg", true, false)), "trip");
    }

    #[test]
    fn decade_composite_layout() {
        let g = grouper(
            FolderProcessType::Single,
            Some(GroupByFolderType::DecadeYearYearShortMonthNameYearMonthDay),
            SubfolderFallbacks::default(),
        );
        assert_eq!(
            dir(&g, &photo("/photos/x.jpg", true, false)),
            "2020s/2024/202401Jan/2024-01-05"
        );
    }

    #[test]
    fn author_device_grouping_uses_sentinel_aliases() {
        let g = grouper(
            FolderProcessType::Single,
            Some(GroupByFolderType::AuthorDeviceYearMonthDay),
            SubfolderFallbacks::default(),
        );
        assert_eq!(
            dir(&g, &photo("/photos/x.jpg", true, false)),
            "UNKN/UNK/2024/01/05"
        );
    }

    #[test]
    fn address_segments_are_sanitized() {
        let exif = ExifData::new(Some(taken()), None, "-")
            .with_reverse_geocodes(vec!["A/B".to_string(), "C".to_string()]);
        let photo = IdentityResolver::new(Roster::empty())
            .identify(Photo::new(PhotoFile::new("/photos/x.jpg"), Some(exif)));
        let g = grouper(
            FolderProcessType::Single,
            Some(GroupByFolderType::AddressHierarchy),
            SubfolderFallbacks::default(),
        );
        assert_eq!(dir(&g, &photo), "A-B/C");
    }

    #[test]
    fn grouping_is_total_and_ordered() {
        let photos = vec![
            photo("/photos/a.jpg", true, true),
            invalid("/photos/b.jpg"),
            photo("/photos/c.jpg", false, true),
            photo("/photos/d.jpg", true, true),
        ];
        let process_types = [
            FolderProcessType::Single,
            FolderProcessType::SubFoldersPreserveFolderHierarchy,
            FolderProcessType::FlattenAllSubFolders,
        ];
        let group_types = [
            None,
            Some(GroupByFolderType::YearMonthDay),
            Some(GroupByFolderType::AddressFlat),
            Some(GroupByFolderType::AuthorYearMonthDay),
        ];

        for process in process_types {
            for group_by in group_types {
                for bits in 0..32u8 {
                    let fallbacks = SubfolderFallbacks {
                        invalid_format: bits & 1 != 0,
                        no_taken_date: bits & 2 != 0,
                        no_address: bits & 4 != 0,
                        no_author: bits & 8 != 0,
                        no_device: bits & 16 != 0,
                    };
                    let buckets = grouper(process, group_by, fallbacks)
                        .group_files(photos.clone(), Path::new(ROOT))
                        .unwrap();
                    assert_eq!(buckets.item_count(), photos.len());

                    let mut seen: Vec<_> = buckets
                        .iter()
                        .flat_map(|(_, items)| items.iter().map(|p| p.photo.path().to_path_buf()))
                        .collect();
                    seen.sort();
                    seen.dedup();
                    assert_eq!(seen.len(), photos.len());
                }
            }
        }
    }
}
