//! Bucket keys: the fragments a naming style is built from.

use super::NamingStyle;
use crate::core::grouper::format_date;
use crate::core::options::ToolOptions;
use crate::core::photo::{file_stem, IdentifiedPhoto};
use std::path::Path;

/// One piece of a file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameFragment {
    Day,
    DateTimeWithMinutes,
    DateTimeWithSeconds,
    DateTimeWithSubseconds,
    Address,
    AuthorName,
    DeviceModel,
    AuthorAlias,
    DeviceAlias,
    OriginalName,
}

impl NameFragment {
    pub(crate) fn needs_taken_date(self) -> bool {
        matches!(
            self,
            NameFragment::Day
                | NameFragment::DateTimeWithMinutes
                | NameFragment::DateTimeWithSeconds
                | NameFragment::DateTimeWithSubseconds
        )
    }

    /// Render the fragment, or `None` when the photo lacks its field
    fn render(self, photo: &IdentifiedPhoto, options: &ToolOptions) -> Option<String> {
        let taken = photo.photo.taken_date();
        match self {
            NameFragment::Day => taken.map(|d| format_date(d, &options.date_format_with_day)),
            NameFragment::DateTimeWithMinutes => {
                taken.map(|d| format_date(d, &options.date_time_format_with_minutes))
            }
            NameFragment::DateTimeWithSeconds => {
                taken.map(|d| format_date(d, &options.date_time_format_with_seconds))
            }
            NameFragment::DateTimeWithSubseconds => taken.map(|d| {
                let millis = photo
                    .photo
                    .sub_seconds()
                    .map_or_else(|| "000".to_string(), |s| s.padded());
                format!(
                    "{}_{}",
                    format_date(d, &options.date_time_format_with_subseconds),
                    millis
                )
            }),
            NameFragment::Address => photo.photo.reverse_geocode_formatted(),
            NameFragment::AuthorName => photo.author().map(|a| {
                if a.name.is_empty() {
                    a.display_alias().to_string()
                } else {
                    a.name.clone()
                }
            }),
            NameFragment::DeviceModel => photo.device().map(|d| {
                if d.model.is_empty() {
                    d.display_alias().to_string()
                } else {
                    d.model.clone()
                }
            }),
            NameFragment::AuthorAlias => photo.author().map(|a| a.display_alias().to_string()),
            NameFragment::DeviceAlias => photo.device().map(|d| d.display_alias().to_string()),
            NameFragment::OriginalName => photo
                .photo
                .original_file_name()
                .map(|name| file_stem(Path::new(name)))
                .filter(|stem| !stem.is_empty()),
        }
    }
}

/// Whether the photo has every field the style's key needs
pub(crate) fn has_required_fields(photo: &IdentifiedPhoto, style: NamingStyle) -> bool {
    let required = style.required_fields();
    (!required.taken_date || photo.photo.has_taken_date())
        && (!required.address || photo.photo.has_reverse_geocode())
        && (!required.author || photo.has_author())
        && (!required.device || photo.has_device())
        && (!required.original_name || photo.photo.has_original_file_name())
}

/// Build the bucket key; `None` if a required fragment is missing
pub(crate) fn bucket_key(
    photo: &IdentifiedPhoto,
    style: NamingStyle,
    options: &ToolOptions,
) -> Option<String> {
    let fragments = style
        .fragments()
        .iter()
        .map(|fragment| fragment.render(photo, options))
        .collect::<Option<Vec<_>>>()?;
    Some(sanitize_name(&fragments.join(&options.name_fragment_separator)))
}

/// File names can't contain path separators
fn sanitize_name(name: &str) -> String {
    name.replace(['/', '\\'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{Author, AuthorDevice, Device, IdentityResolver, Roster};
    use crate::core::metadata::{ExifData, SubSeconds};
    use crate::core::photo::{Photo, PhotoFile};
    use chrono::NaiveDate;

    fn identified(exif: ExifData) -> IdentifiedPhoto {
        let device = Device {
            id: "cam".to_string(),
            name: "Camera".to_string(),
            alias: "CM".to_string(),
            make: "Canon".to_string(),
            model: "EOS R5".to_string(),
            ..Device::default()
        };
        let author = Author {
            id: "ana".to_string(),
            name: "Ana".to_string(),
            alias: "AN".to_string(),
            devices: vec![AuthorDevice::new("cam")],
        };
        let roster = Roster::new(vec![author], vec![device]).unwrap();
        IdentityResolver::new(roster).identify(Photo::new(PhotoFile::new("/p/IMG_1.jpg"), Some(exif)))
    }

    fn exif() -> ExifData {
        let taken = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 30, 15)
            .unwrap();
        ExifData::new(Some(taken), None, "-")
            .with_camera(Some("Canon".to_string()), Some("EOS R5".to_string()))
            .with_reverse_geocodes(vec!["Spain".to_string(), "Madrid".to_string()])
    }

    fn key(photo: &IdentifiedPhoto, style: NamingStyle) -> Option<String> {
        bucket_key(photo, style, &ToolOptions::default())
    }

    #[test]
    fn date_and_address_order_follows_style() {
        let photo = identified(exif());
        assert_eq!(
            key(&photo, NamingStyle::DateTimeWithMinutesAddress).as_deref(),
            Some("2024.01.05_10.30-Spain-Madrid")
        );
        assert_eq!(
            key(&photo, NamingStyle::AddressDay).as_deref(),
            Some("Spain-Madrid-2024.01.05")
        );
    }

    #[test]
    fn subseconds_pad_to_millis() {
        let photo = identified(exif().with_sub_seconds(Some(SubSeconds::new("5"))));
        assert_eq!(
            key(&photo, NamingStyle::DateTimeWithSubseconds).as_deref(),
            Some("20240105_103015_500")
        );

        let without = identified(exif());
        assert_eq!(
            key(&without, NamingStyle::DateTimeWithSubseconds).as_deref(),
            Some("20240105_103015_000")
        );
    }

    #[test]
    fn identity_fragments() {
        let photo = identified(
            exif()
                .with_sub_seconds(Some(SubSeconds::new("042")))
                .with_original_file_name(Some("DSC_0042.JPG".to_string())),
        );
        assert_eq!(
            key(&photo, NamingStyle::DateTimeWithSubsecondsAuthorDevice).as_deref(),
            Some("20240105_103015_042-Ana-EOS R5")
        );
        assert_eq!(
            key(&photo, NamingStyle::DateTimeWithSubsecondsAuthorDeviceOriginalName).as_deref(),
            Some("20240105_103015_042-AN-CM-DSC_0042")
        );
    }

    #[test]
    fn missing_field_has_no_key() {
        let photo = identified(ExifData::new(None, None, "-"));
        assert!(key(&photo, NamingStyle::Day).is_none());
        assert!(!has_required_fields(&photo, NamingStyle::Address));
    }

    #[test]
    fn separators_in_address_are_replaced() {
        let photo = identified(exif().with_reverse_geocodes(vec!["A/B".to_string()]));
        assert_eq!(key(&photo, NamingStyle::Address).as_deref(), Some("A-B"));
    }
}
