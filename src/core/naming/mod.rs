//! # Naming Engine
//!
//! Assigns final file names inside one target directory.
//!
//! ## Flow
//! 1. [`NamingEngine::group`] buckets photos by the key their naming style
//!    builds. Photos missing a field the style needs are returned as
//!    unfiltered and keep their original name.
//! 2. [`NamingEngine::set_file_names`] names every bucket member after its
//!    key; members beyond the first are told apart by a number or letter
//!    suffix in bucket order.
//! 3. [`ensure_unique_names`] settles any remaining clash in a directory.
//!
//! `Numeric` has no key; it numbers the whole directory in order.
//! Archive names are `{capture time}{separator}{content hash}`.

mod key;
mod namer;

pub use namer::ensure_unique_names;

use crate::core::bucket::Buckets;
use crate::core::grouper::format_date;
use crate::core::options::ToolOptions;
use crate::core::photo::{IdentifiedPhoto, NamedPhoto};
use crate::error::NamingError;
use key::NameFragment;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which metadata a file name is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NamingStyle {
    /// Sequential numbers only
    Numeric,
    Day,
    #[default]
    DateTimeWithMinutes,
    DateTimeWithSeconds,
    Address,
    DayAddress,
    AddressDay,
    DateTimeWithMinutesAddress,
    AddressDateTimeWithMinutes,
    DateTimeWithSecondsAddress,
    AddressDateTimeWithSeconds,
    /// `20240105_103015_500`
    DateTimeWithSubseconds,
    /// Sub-second time, author name and device model
    DateTimeWithSubsecondsAuthorDevice,
    /// Sub-second time, author and device aliases, original file name
    DateTimeWithSubsecondsAuthorDeviceOriginalName,
}

/// Fields a naming style can't do without
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiredFields {
    pub taken_date: bool,
    pub address: bool,
    pub author: bool,
    pub device: bool,
    pub original_name: bool,
}

impl NamingStyle {
    pub(crate) fn fragments(self) -> &'static [NameFragment] {
        use NameFragment::*;
        match self {
            NamingStyle::Numeric => &[],
            NamingStyle::Day => &[Day],
            NamingStyle::DateTimeWithMinutes => &[DateTimeWithMinutes],
            NamingStyle::DateTimeWithSeconds => &[DateTimeWithSeconds],
            NamingStyle::Address => &[Address],
            NamingStyle::DayAddress => &[Day, Address],
            NamingStyle::AddressDay => &[Address, Day],
            NamingStyle::DateTimeWithMinutesAddress => &[DateTimeWithMinutes, Address],
            NamingStyle::AddressDateTimeWithMinutes => &[Address, DateTimeWithMinutes],
            NamingStyle::DateTimeWithSecondsAddress => &[DateTimeWithSeconds, Address],
            NamingStyle::AddressDateTimeWithSeconds => &[Address, DateTimeWithSeconds],
            NamingStyle::DateTimeWithSubseconds => &[DateTimeWithSubseconds],
            NamingStyle::DateTimeWithSubsecondsAuthorDevice => {
                &[DateTimeWithSubseconds, AuthorName, DeviceModel]
            }
            NamingStyle::DateTimeWithSubsecondsAuthorDeviceOriginalName => {
                &[DateTimeWithSubseconds, AuthorAlias, DeviceAlias, OriginalName]
            }
        }
    }

    pub fn required_fields(self) -> RequiredFields {
        let mut required = RequiredFields::default();
        for fragment in self.fragments() {
            match fragment {
                NameFragment::Address => required.address = true,
                NameFragment::AuthorName | NameFragment::AuthorAlias => required.author = true,
                NameFragment::DeviceModel | NameFragment::DeviceAlias => required.device = true,
                NameFragment::OriginalName => required.original_name = true,
                f if f.needs_taken_date() => required.taken_date = true,
                _ => {}
            }
        }
        required
    }

    pub fn is_keyed(self) -> bool {
        self != NamingStyle::Numeric
    }
}

/// How same-name suffixes are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumberNamingTextStyle {
    /// Zero-padded to the widest number in the bucket (`01`..`12`)
    #[default]
    AllNamesAreSameLength,
    OnlySequentialNumbers,
    /// `a`..`z`, `aa`..
    Letters,
}

/// Whether the first member of a multi-photo bucket gets a suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SameNameConvention {
    /// `key-1`, `key-2`, ...
    #[default]
    NumberAll,
    /// `key`, `key-2`, ...
    FirstUnsuffixed,
}

/// Photos bucketed by naming key
#[derive(Debug, Default)]
pub struct NameBuckets {
    pub buckets: Buckets<IdentifiedPhoto>,
    /// Photos missing a field the style needs, in input order
    pub unfiltered: Vec<IdentifiedPhoto>,
}

/// Names photos inside a target directory
#[derive(Debug, Clone)]
pub struct NamingEngine {
    options: ToolOptions,
    number_style: NumberNamingTextStyle,
    convention: SameNameConvention,
}

impl NamingEngine {
    pub fn new(
        options: &ToolOptions,
        number_style: NumberNamingTextStyle,
        convention: SameNameConvention,
    ) -> Self {
        Self {
            options: options.clone(),
            number_style,
            convention,
        }
    }

    /// Bucket photos by the key `style` builds
    ///
    /// `Numeric` has no key and is rejected.
    pub fn group(
        &self,
        photos: Vec<IdentifiedPhoto>,
        style: NamingStyle,
    ) -> Result<NameBuckets, NamingError> {
        if !style.is_keyed() {
            return Err(NamingError::KeylessStyle(format!("{style:?}")));
        }

        let mut result = NameBuckets::default();
        for photo in photos {
            let key = if key::has_required_fields(&photo, style) {
                key::bucket_key(&photo, style, &self.options)
            } else {
                None
            };
            match key {
                Some(key) => result.buckets.push(key, photo),
                None => result.unfiltered.push(photo),
            }
        }

        debug!(
            style = ?style,
            buckets = result.buckets.len(),
            unfiltered = result.unfiltered.len(),
            "Grouped photos by name"
        );
        Ok(result)
    }

    /// Name the photos [`group`](Self::group) bucketed for one directory
    ///
    /// Buckets come out in first-seen order with their members in input
    /// order, followed by the unfiltered photos under their original stem.
    pub fn set_file_names(&self, grouped: NameBuckets, directory: &str) -> Vec<NamedPhoto> {
        let NameBuckets {
            buckets,
            unfiltered,
        } = grouped;
        let (keys, photos) = (buckets.len(), buckets.item_count());

        let mut named = Vec::with_capacity(photos + unfiltered.len());
        for (key, members) in buckets {
            let names = namer::suffixed_names(
                &key,
                members.len(),
                &self.options.same_name_number_separator,
                self.number_style,
                self.convention,
            );
            named.extend(
                members
                    .into_iter()
                    .zip(names)
                    .map(|(photo, name)| NamedPhoto::new(photo, directory, &name)),
            );
        }
        let unnamed = unfiltered.len();
        named.extend(unfiltered.into_iter().map(|photo| {
            let stem = photo.photo.file.file_stem();
            NamedPhoto::new(photo, directory, &stem)
        }));

        info!(directory, photos, names = keys, unnamed, "Assigned file names");
        named
    }

    /// Number every photo of the directory in order
    pub fn set_numeric_file_names(
        &self,
        ordered: Vec<IdentifiedPhoto>,
        directory: &str,
    ) -> Vec<NamedPhoto> {
        let total = ordered.len();
        ordered
            .into_iter()
            .enumerate()
            .map(|(index, photo)| {
                let base = namer::format_number(index + 1, total, self.number_style);
                NamedPhoto::new(photo, directory, &base)
            })
            .collect()
    }

    /// `{capture time}{separator}{hash}`, or just the hash without a date
    pub fn set_archive_file_names(
        &self,
        photos: Vec<IdentifiedPhoto>,
        directory: &str,
    ) -> Result<Vec<NamedPhoto>, NamingError> {
        photos
            .into_iter()
            .map(|photo| {
                let Some(hash) = photo.photo.content_hash.clone() else {
                    return Err(NamingError::MissingArchiveHash {
                        path: photo.photo.path().to_path_buf(),
                    });
                };
                let base = match photo.photo.taken_date() {
                    Some(taken) => format!(
                        "{}{}{}",
                        format_date(taken, &self.options.archive_date_format),
                        self.options.archive_date_hash_separator,
                        hash
                    ),
                    None => hash,
                };
                Ok(NamedPhoto::new(photo, directory, &base))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::ExifData;
    use crate::core::photo::{Photo, PhotoFile};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::Path;

    fn at(minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, minute, second)
            .unwrap()
    }

    fn photo(path: &str, taken: Option<NaiveDateTime>, address: Option<&str>) -> IdentifiedPhoto {
        let mut exif = ExifData::new(taken, None, "-");
        if let Some(address) = address {
            exif = exif.with_reverse_geocodes(vec![address.to_string()]);
        }
        IdentifiedPhoto::unresolved(Photo::new(PhotoFile::new(path), Some(exif)))
    }

    fn engine(style: NumberNamingTextStyle, convention: SameNameConvention) -> NamingEngine {
        NamingEngine::new(&ToolOptions::default(), style, convention)
    }

    fn file_names(named: &[NamedPhoto]) -> Vec<&str> {
        named.iter().map(|n| n.file_name.as_str()).collect()
    }

    #[test]
    fn required_fields_follow_fragments() {
        let required = NamingStyle::DayAddress.required_fields();
        assert!(required.taken_date && required.address);
        assert!(!required.author);

        let required = NamingStyle::DateTimeWithSubsecondsAuthorDeviceOriginalName.required_fields();
        assert!(required.author && required.device && required.original_name);
        assert_eq!(NamingStyle::Numeric.required_fields(), RequiredFields::default());
    }

    #[test]
    fn numeric_style_cannot_be_grouped() {
        let engine = engine(
            NumberNamingTextStyle::default(),
            SameNameConvention::default(),
        );
        let result = engine.group(Vec::new(), NamingStyle::Numeric);
        assert!(matches!(result, Err(NamingError::KeylessStyle(_))));
    }

    #[test]
    fn group_returns_unfiltered_photos() {
        let engine = engine(
            NumberNamingTextStyle::default(),
            SameNameConvention::default(),
        );
        let photos = vec![
            photo("/a.jpg", Some(at(1, 0)), Some("X")),
            photo("/b.jpg", Some(at(1, 30)), None),
            photo("/c.jpg", Some(at(1, 59)), Some("X")),
        ];

        let grouped = engine
            .group(photos, NamingStyle::DateTimeWithMinutesAddress)
            .unwrap();

        assert_eq!(grouped.buckets.len(), 1);
        assert_eq!(grouped.buckets.get("2024.01.05_10.01-X").map(|b| b.len()), Some(2));
        assert_eq!(grouped.unfiltered.len(), 1);
    }

    #[test]
    fn same_key_members_are_numbered_in_order() {
        let engine = engine(
            NumberNamingTextStyle::OnlySequentialNumbers,
            SameNameConvention::NumberAll,
        );
        let photos = vec![
            photo("/a.jpg", Some(at(1, 0)), None),
            photo("/b.jpg", Some(at(2, 0)), None),
            photo("/c.jpg", Some(at(1, 30)), None),
        ];

        let grouped = engine.group(photos, NamingStyle::DateTimeWithMinutes).unwrap();
        let named = engine.set_file_names(grouped, "");

        assert_eq!(
            file_names(&named),
            vec!["2024.01.05_10.01-1.jpg", "2024.01.05_10.01-2.jpg", "2024.01.05_10.02.jpg"]
        );
        let sources: Vec<_> = named.iter().map(|n| n.photo.photo.path()).collect();
        assert_eq!(
            sources,
            vec![Path::new("/a.jpg"), Path::new("/c.jpg"), Path::new("/b.jpg")]
        );
    }

    #[test]
    fn photos_without_key_keep_original_name() {
        let engine = engine(
            NumberNamingTextStyle::default(),
            SameNameConvention::default(),
        );
        let photos = vec![
            photo("/IMG_7.jpg", None, None),
            photo("/IMG_8.jpg", Some(at(1, 0)), None),
        ];
        let grouped = engine.group(photos, NamingStyle::Day).unwrap();
        let named = engine.set_file_names(grouped, "d");
        assert_eq!(named[0].target_relative_path(), "d/2024.01.05.jpg");
        assert_eq!(named[1].target_relative_path(), "d/IMG_7.jpg");
    }

    #[test]
    fn numeric_style_numbers_whole_directory() {
        let engine = engine(
            NumberNamingTextStyle::AllNamesAreSameLength,
            SameNameConvention::default(),
        );
        let photos: Vec<_> = (0..10)
            .map(|i| photo(&format!("/{i}.jpg"), None, None))
            .collect();
        let named = engine.set_numeric_file_names(photos, "");
        assert_eq!(named[0].file_name, "01.jpg");
        assert_eq!(named[9].file_name, "10.jpg");
    }

    #[test]
    fn naming_is_idempotent() {
        let engine = engine(
            NumberNamingTextStyle::Letters,
            SameNameConvention::FirstUnsuffixed,
        );
        let photos = vec![
            photo("/a.jpg", Some(at(1, 0)), Some("X")),
            photo("/b.jpg", Some(at(1, 0)), Some("X")),
            photo("/c.jpg", Some(at(1, 0)), Some("Y")),
        ];

        let name_all = |photos: Vec<IdentifiedPhoto>| {
            let grouped = engine.group(photos, NamingStyle::DayAddress).unwrap();
            engine.set_file_names(grouped, "")
        };
        let first = name_all(photos.clone());
        let second = name_all(photos);

        assert_eq!(file_names(&first), file_names(&second));
        assert_eq!(
            file_names(&first),
            vec!["2024.01.05-X.jpg", "2024.01.05-X-b.jpg", "2024.01.05-Y.jpg"]
        );
    }

    #[test]
    fn archive_names_join_date_and_hash() {
        let engine = engine(
            NumberNamingTextStyle::default(),
            SameNameConvention::default(),
        );
        let dated = IdentifiedPhoto::unresolved(
            Photo::new(
                PhotoFile::new("/a.jpg"),
                Some(ExifData::new(Some(at(2, 3)), None, "-")),
            )
            .with_content_hash("abc123"),
        );
        let undated = IdentifiedPhoto::unresolved(
            Photo::new(PhotoFile::new("/b.jpg"), None).with_content_hash("def456"),
        );

        let named = engine
            .set_archive_file_names(vec![dated, undated], "2024/01/05")
            .unwrap();

        assert_eq!(named[0].file_name, "20240105_100203-abc123.jpg");
        assert_eq!(named[1].file_name, "def456.jpg");
    }

    #[test]
    fn archive_names_need_a_hash() {
        let engine = engine(
            NumberNamingTextStyle::default(),
            SameNameConvention::default(),
        );
        let photo = photo("/a.jpg", Some(at(0, 0)), None);
        let result = engine.set_archive_file_names(vec![photo], "");
        assert!(matches!(result, Err(NamingError::MissingArchiveHash { .. })));
    }
}
