//! EXIF extraction backed by kamadak-exif.

use super::{Coordinate, ExifData, SubSeconds};
use crate::core::options::ToolOptions;
use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Produces the metadata record for a photo file
///
/// Returns `None` when the file can't be read as a metadata container
/// (invalid format). Missing individual fields are not failures.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Option<ExifData>;
}

/// Reads EXIF directly from the file container
pub struct ExifExtractor {
    address_separator: String,
    coordinate_precision: u32,
}

impl ExifExtractor {
    pub fn new(options: &ToolOptions) -> Self {
        Self {
            address_separator: options.address_separator.clone(),
            coordinate_precision: options.coordinate_precision,
        }
    }
}

impl MetadataExtractor for ExifExtractor {
    fn extract(&self, path: &Path) -> Option<ExifData> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to open photo");
                return None;
            }
        };

        let mut bufreader = BufReader::new(&file);
        let exif_reader = match Reader::new().read_from_container(&mut bufreader) {
            Ok(r) => r,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Invalid photo format");
                return None;
            }
        };

        let taken_date = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime]
            .into_iter()
            .find_map(|tag| read_date(&exif_reader, tag));
        if taken_date.is_none() {
            debug!(path = %path.display(), "No capture date found");
        }

        let coordinate = read_coordinate(&exif_reader)
            .map(|(lat, lon)| Coordinate::new(lat, lon, self.coordinate_precision));
        if coordinate.is_none() {
            debug!(path = %path.display(), "No coordinate found");
        }

        let make = read_string(&exif_reader, Tag::Make);
        let model = read_string(&exif_reader, Tag::Model);

        let sub_seconds = read_string(&exif_reader, Tag::SubSecTimeOriginal)
            .or_else(|| read_string(&exif_reader, Tag::SubSecTime))
            .map(|raw| SubSeconds::new(&raw));

        Some(
            ExifData::new(taken_date, coordinate, &self.address_separator)
                .with_camera(make, model)
                .with_sub_seconds(sub_seconds),
        )
    }
}

fn read_date(exif: &Exif, tag: Tag) -> Option<NaiveDateTime> {
    let value = read_string(exif, tag)?;
    // EXIF date format: "YYYY:MM:DD HH:MM:SS"
    NaiveDateTime::parse_from_str(&value, "%Y:%m:%d %H:%M:%S").ok()
}

fn read_coordinate(exif: &Exif) -> Option<(f64, f64)> {
    let latitude = read_degrees(exif, Tag::GPSLatitude)?;
    let longitude = read_degrees(exif, Tag::GPSLongitude)?;

    let latitude = match read_string(exif, Tag::GPSLatitudeRef).as_deref() {
        Some("S") => -latitude,
        _ => latitude,
    };
    let longitude = match read_string(exif, Tag::GPSLongitudeRef).as_deref() {
        Some("W") => -longitude,
        _ => longitude,
    };

    Some((latitude, longitude))
}

/// Degrees, minutes, seconds rationals to decimal degrees
fn read_degrees(exif: &Exif, tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Rational(ref parts) if parts.len() >= 3 => Some(
            parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0,
        ),
        _ => None,
    }
}

/// Helper to extract a trimmed string from an EXIF ASCII value
fn read_string(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    if let Value::Ascii(ref vec) = field.value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}
