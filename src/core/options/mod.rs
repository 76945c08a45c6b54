//! # Options Module
//!
//! Tool-wide options: date patterns, separators, fallback folder names and
//! file extensions. Every field has a default, so an options file only
//! needs to list what it overrides.
//!
//! Date patterns use chrono's strftime syntax.

use crate::error::ConfigError;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Tool-wide options loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolOptions {
    pub year_format: String,
    pub month_format: String,
    pub day_format: String,
    pub date_format_with_month: String,
    pub date_format_with_day: String,
    pub date_time_format_with_minutes: String,
    pub date_time_format_with_seconds: String,
    /// Date part of the sub-second naming styles (`20240105_103000_500`)
    pub date_time_format_with_subseconds: String,
    /// Date part of archive file names
    pub archive_date_format: String,

    pub address_separator: String,
    pub folder_append_separator: String,
    pub day_range_separator: String,
    pub same_name_number_separator: String,
    /// Joins the fragments of a naming-style key (`date-address`)
    pub name_fragment_separator: String,
    pub archive_date_hash_separator: String,

    pub photo_format_invalid_folder_name: String,
    pub no_photo_taken_date_folder_name: String,
    pub no_address_folder_name: String,
    pub no_author_folder_name: String,
    pub no_device_folder_name: String,
    pub no_address_and_photo_taken_date_folder_name: String,
    pub no_author_and_photo_taken_date_folder_name: String,
    pub no_device_and_photo_taken_date_folder_name: String,
    pub no_author_and_device_and_photo_taken_date_folder_name: String,

    /// Decimal places kept when a coordinate is ingested
    pub coordinate_precision: u32,
    pub supported_extensions: Vec<String>,
    pub companion_extensions: Vec<String>,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            year_format: "%Y".to_string(),
            month_format: "%m".to_string(),
            day_format: "%d".to_string(),
            date_format_with_month: "%Y.%m".to_string(),
            date_format_with_day: "%Y.%m.%d".to_string(),
            date_time_format_with_minutes: "%Y.%m.%d_%H.%M".to_string(),
            date_time_format_with_seconds: "%Y.%m.%d_%H.%M.%S".to_string(),
            date_time_format_with_subseconds: "%Y%m%d_%H%M%S".to_string(),
            archive_date_format: "%Y%m%d_%H%M%S".to_string(),
            address_separator: "-".to_string(),
            folder_append_separator: "-".to_string(),
            day_range_separator: "-".to_string(),
            same_name_number_separator: "-".to_string(),
            name_fragment_separator: "-".to_string(),
            archive_date_hash_separator: "-".to_string(),
            photo_format_invalid_folder_name: "invalid-photo-format".to_string(),
            no_photo_taken_date_folder_name: "no-photo-taken-date".to_string(),
            no_address_folder_name: "no-address".to_string(),
            no_author_folder_name: "no-author".to_string(),
            no_device_folder_name: "no-device".to_string(),
            no_address_and_photo_taken_date_folder_name: "no-address-and-no-photo-taken-date"
                .to_string(),
            no_author_and_photo_taken_date_folder_name: "no-author-and-no-photo-taken-date"
                .to_string(),
            no_device_and_photo_taken_date_folder_name: "no-device-and-no-photo-taken-date"
                .to_string(),
            no_author_and_device_and_photo_taken_date_folder_name:
                "no-author-and-no-device-and-no-photo-taken-date".to_string(),
            coordinate_precision: 4,
            supported_extensions: ["jpg", "jpeg", "heic", "png"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            companion_extensions: vec!["mov".to_string()],
        }
    }
}

impl ToolOptions {
    /// Load options from a JSON file and validate them
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let options: ToolOptions =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        options.validate()?;
        debug!(path = %path.display(), "Loaded tool options");
        Ok(options)
    }

    /// Reject date patterns chrono cannot render and empty folder names
    pub fn validate(&self) -> Result<(), ConfigError> {
        let patterns: [(&'static str, &str); 9] = [
            ("yearFormat", &self.year_format),
            ("monthFormat", &self.month_format),
            ("dayFormat", &self.day_format),
            ("dateFormatWithMonth", &self.date_format_with_month),
            ("dateFormatWithDay", &self.date_format_with_day),
            ("dateTimeFormatWithMinutes", &self.date_time_format_with_minutes),
            ("dateTimeFormatWithSeconds", &self.date_time_format_with_seconds),
            (
                "dateTimeFormatWithSubseconds",
                &self.date_time_format_with_subseconds,
            ),
            ("archiveDateFormat", &self.archive_date_format),
        ];
        for (field, pattern) in patterns {
            if pattern.is_empty()
                || StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
            {
                return Err(ConfigError::InvalidDateFormat {
                    field,
                    pattern: pattern.to_string(),
                });
            }
        }

        let folder_names = [
            &self.photo_format_invalid_folder_name,
            &self.no_photo_taken_date_folder_name,
            &self.no_address_folder_name,
            &self.no_author_folder_name,
            &self.no_device_folder_name,
            &self.no_address_and_photo_taken_date_folder_name,
            &self.no_author_and_photo_taken_date_folder_name,
            &self.no_device_and_photo_taken_date_folder_name,
            &self.no_author_and_device_and_photo_taken_date_folder_name,
        ];
        if folder_names.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "fallback folder names can't be empty".to_string(),
            ));
        }

        if self.coordinate_precision > 10 {
            return Err(ConfigError::Invalid(format!(
                "coordinate precision {} is above 10 decimal places",
                self.coordinate_precision
            )));
        }

        Ok(())
    }

    /// Whether the extension (without dot) is a supported photo format
    pub fn is_supported_extension(&self, ext: &str) -> bool {
        self.supported_extensions
            .iter()
            .any(|s| s.eq_ignore_ascii_case(ext))
    }

    /// Whether the extension (without dot) is a companion file format
    pub fn is_companion_extension(&self, ext: &str) -> bool {
        self.companion_extensions
            .iter()
            .any(|s| s.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(ToolOptions::default().validate().is_ok());
    }

    #[test]
    fn invalid_date_pattern_is_rejected() {
        let options = ToolOptions {
            date_format_with_day: "%Y.%Q".to_string(),
            ..ToolOptions::default()
        };
        let error = options.validate().unwrap_err();
        assert!(error.to_string().contains("dateFormatWithDay"));
    }

    #[test]
    fn empty_fallback_folder_is_rejected() {
        let options = ToolOptions {
            no_address_folder_name: " ".to_string(),
            ..ToolOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "addressSeparator": ", ", "coordinatePrecision": 2 }}"#).unwrap();

        let options = ToolOptions::load(file.path()).unwrap();

        assert_eq!(options.address_separator, ", ");
        assert_eq!(options.coordinate_precision, 2);
        assert_eq!(options.no_address_folder_name, "no-address");
    }

    #[test]
    fn extension_checks_ignore_case() {
        let options = ToolOptions::default();
        assert!(options.is_supported_extension("JPG"));
        assert!(options.is_companion_extension("MOV"));
        assert!(!options.is_supported_extension("mov"));
    }
}
