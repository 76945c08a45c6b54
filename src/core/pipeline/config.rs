//! Per-run classification policy.

use crate::core::grouper::{FolderProcessType, GroupByFolderType, SubfolderFallbacks};
use crate::core::naming::{NamingStyle, NumberNamingTextStyle, SameNameConvention};
use crate::core::organize::{
    InvalidFormatAction, MissingDataActions, NoAddressAction, NoTakenDateAction,
};
use crate::core::renamer::{FolderAppendLocationType, FolderAppendType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What kind of plan a run produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifyMode {
    /// Group and name by the configured styles
    #[default]
    Copy,
    /// Flatten into year/month/day folders, name by capture time and
    /// content hash, drop duplicates
    Archive,
}

/// Token appended to renamed folders and where it goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderAppend {
    pub append_type: FolderAppendType,
    pub location: FolderAppendLocationType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifyConfig {
    pub source_root: PathBuf,
    pub mode: ClassifyMode,
    pub process_type: FolderProcessType,
    pub group_by: Option<GroupByFolderType>,
    pub naming_style: NamingStyle,
    pub number_style: NumberNamingTextStyle,
    pub same_name_convention: SameNameConvention,
    pub actions: MissingDataActions,
    /// Route photos of unknown authors to the no-author folder
    pub no_author_in_sub_folder: bool,
    /// Route photos of unknown devices to the no-device folder
    pub no_device_in_sub_folder: bool,
    pub folder_append: Option<FolderAppend>,
    /// Hash contents and drop duplicates per directory (always on in archive mode)
    pub remove_duplicates: bool,
    pub include_hidden: bool,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            mode: ClassifyMode::Copy,
            process_type: FolderProcessType::Single,
            group_by: None,
            naming_style: NamingStyle::default(),
            number_style: NumberNamingTextStyle::default(),
            same_name_convention: SameNameConvention::default(),
            actions: MissingDataActions::default(),
            no_author_in_sub_folder: false,
            no_device_in_sub_folder: false,
            folder_append: None,
            remove_duplicates: false,
            include_hidden: false,
        }
    }
}

impl ClassifyConfig {
    pub fn is_archive(&self) -> bool {
        self.mode == ClassifyMode::Archive
    }

    pub fn hashes_contents(&self) -> bool {
        self.is_archive() || self.remove_duplicates
    }

    /// Missing-data actions in effect; archive mode fixes its own
    pub fn effective_actions(&self) -> MissingDataActions {
        if !self.is_archive() {
            return self.actions;
        }
        MissingDataActions {
            invalid_format: InvalidFormatAction::InSubFolder,
            no_taken_date: NoTakenDateAction::InSubFolder,
            no_address: NoAddressAction::Continue,
        }
    }

    pub fn effective_process_type(&self) -> FolderProcessType {
        if self.is_archive() {
            FolderProcessType::FlattenAllSubFolders
        } else {
            self.process_type
        }
    }

    pub fn effective_group_by(&self) -> Option<GroupByFolderType> {
        if self.is_archive() {
            Some(GroupByFolderType::YearMonthDay)
        } else {
            self.group_by
        }
    }

    pub fn subfolder_fallbacks(&self) -> SubfolderFallbacks {
        let fallbacks = self.effective_actions().subfolder_fallbacks();
        if self.is_archive() {
            return fallbacks;
        }
        SubfolderFallbacks {
            no_author: self.no_author_in_sub_folder,
            no_device: self.no_device_in_sub_folder,
            ..fallbacks
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_mode_overrides_the_policy() {
        let config = ClassifyConfig {
            mode: ClassifyMode::Archive,
            process_type: FolderProcessType::SubFoldersPreserveFolderHierarchy,
            group_by: Some(GroupByFolderType::AddressFlat),
            no_author_in_sub_folder: true,
            ..ClassifyConfig::default()
        };

        assert!(config.hashes_contents());
        assert_eq!(
            config.effective_process_type(),
            FolderProcessType::FlattenAllSubFolders
        );
        assert_eq!(config.effective_group_by(), Some(GroupByFolderType::YearMonthDay));

        let fallbacks = config.subfolder_fallbacks();
        assert!(fallbacks.invalid_format);
        assert!(fallbacks.no_taken_date);
        assert!(!fallbacks.no_address);
        assert!(!fallbacks.no_author);
    }

    #[test]
    fn copy_mode_adds_identity_fallbacks() {
        let config = ClassifyConfig {
            no_device_in_sub_folder: true,
            actions: MissingDataActions {
                no_address: NoAddressAction::InSubFolder,
                ..MissingDataActions::default()
            },
            ..ClassifyConfig::default()
        };

        let fallbacks = config.subfolder_fallbacks();
        assert!(fallbacks.no_address);
        assert!(fallbacks.no_device);
        assert!(!fallbacks.no_author);
        assert!(!config.hashes_contents());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ClassifyConfig =
            serde_json::from_str(r#"{ "sourceRoot": "/photos", "mode": "Archive" }"#).unwrap();
        assert_eq!(config.source_root, PathBuf::from("/photos"));
        assert!(config.is_archive());
        assert_eq!(config.naming_style, NamingStyle::DateTimeWithMinutes);
    }
}
