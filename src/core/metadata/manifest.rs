//! Pre-extracted metadata supplied as a JSON manifest.
//!
//! Used when metadata comes from an external tool (exiftool, a geocoding
//! run) rather than being read from the files. Paths are relative to the
//! source folder.

use super::{Coordinate, ExifData, MetadataExtractor, SubSeconds};
use crate::core::options::ToolOptions;
use crate::error::ConfigError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One photo's metadata as listed in a manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestRecord {
    pub path: PathBuf,
    pub captured_at: Option<NaiveDateTime>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub sub_seconds: Option<String>,
    pub original_file_name: Option<String>,
    pub reverse_geocode: Option<Vec<String>>,
    /// The upstream extractor could not parse the file
    pub invalid: bool,
}

/// Serves metadata from a manifest instead of reading files
pub struct ManifestExtractor {
    root: PathBuf,
    records: HashMap<PathBuf, ManifestRecord>,
    address_separator: String,
    coordinate_precision: u32,
}

impl ManifestExtractor {
    pub fn new(root: &Path, records: Vec<ManifestRecord>, options: &ToolOptions) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.path.clone(), record))
            .collect();
        Self {
            root: root.to_path_buf(),
            records,
            address_separator: options.address_separator.clone(),
            coordinate_precision: options.coordinate_precision,
        }
    }

    /// Load a manifest file holding a JSON array of records
    pub fn load(manifest: &Path, root: &Path, options: &ToolOptions) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(manifest).map_err(|source| ConfigError::Read {
            path: manifest.to_path_buf(),
            source,
        })?;
        let records: Vec<ManifestRecord> =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: manifest.to_path_buf(),
                source,
            })?;
        info!(path = %manifest.display(), records = records.len(), "Loaded metadata manifest");
        Ok(Self::new(root, records, options))
    }

    fn record_to_exif(&self, record: &ManifestRecord) -> ExifData {
        let coordinate = match (record.latitude, record.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon, self.coordinate_precision)),
            _ => None,
        };

        let exif = ExifData::new(record.captured_at, coordinate, &self.address_separator)
            .with_camera(record.make.clone(), record.model.clone())
            .with_sub_seconds(record.sub_seconds.as_deref().map(SubSeconds::new))
            .with_original_file_name(record.original_file_name.clone());

        match &record.reverse_geocode {
            Some(components) => exif.with_reverse_geocodes(components.clone()),
            None => exif,
        }
    }
}

impl MetadataExtractor for ManifestExtractor {
    fn extract(&self, path: &Path) -> Option<ExifData> {
        let key = path.strip_prefix(&self.root).unwrap_or(path);
        match self.records.get(key) {
            Some(record) if !record.invalid => Some(self.record_to_exif(record)),
            Some(_) => None,
            None => {
                debug!(path = %path.display(), "Photo is not listed in the manifest");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(records: Vec<ManifestRecord>) -> ManifestExtractor {
        ManifestExtractor::new(Path::new("/photos"), records, &ToolOptions::default())
    }

    #[test]
    fn record_is_found_by_relative_path() {
        let records: Vec<ManifestRecord> = serde_json::from_str(
            r#"[{
                "path": "trip/a.jpg",
                "capturedAt": "2024-01-05T10:30:00",
                "latitude": 40.416775,
                "longitude": -3.70379,
                "make": "Apple",
                "model": "iPhone 15",
                "subSeconds": "42",
                "reverseGeocode": ["Spain", "Madrid"]
            }]"#,
        )
        .unwrap();

        let exif = extractor(records)
            .extract(Path::new("/photos/trip/a.jpg"))
            .unwrap();

        assert_eq!(exif.model.as_deref(), Some("iPhone 15"));
        assert_eq!(exif.coordinate.unwrap().latitude, 40.4168);
        assert_eq!(exif.sub_seconds.as_ref().unwrap().as_milliseconds(), 420);
        assert_eq!(exif.reverse_geocode_formatted().as_deref(), Some("Spain-Madrid"));
    }

    #[test]
    fn invalid_or_unlisted_records_have_no_metadata() {
        let records = vec![ManifestRecord {
            path: PathBuf::from("bad.jpg"),
            invalid: true,
            ..ManifestRecord::default()
        }];
        let extractor = extractor(records);

        assert!(extractor.extract(Path::new("/photos/bad.jpg")).is_none());
        assert!(extractor.extract(Path::new("/photos/missing.jpg")).is_none());
    }
}
