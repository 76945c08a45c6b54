//! # Metadata Module
//!
//! The metadata record attached to each photo, and the adapters that
//! produce it.
//!
//! ## Fields
//! - Capture date/time (DateTimeOriginal, falling back to DateTimeDigitized
//!   and DateTime)
//! - GPS coordinate, rounded once at ingestion
//! - Camera make and model
//! - Sub-second fragment (SubSecTimeOriginal / SubSecTime)
//! - Original file name hint
//! - Reverse-geocode address components, attached by a geocoder
//!
//! A record is immutable once attached to a photo.

mod extractor;
mod manifest;

pub use extractor::{ExifExtractor, MetadataExtractor};
pub use manifest::{ManifestExtractor, ManifestRecord};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// GPS coordinate rounded to the configured precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Round both axes to `precision` decimal places (ties to even)
    pub fn new(latitude: f64, longitude: f64, precision: u32) -> Self {
        Self {
            latitude: round_to(latitude, precision),
            longitude: round_to(longitude, precision),
        }
    }
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round_ties_even() / factor
}

/// Sub-second fragment as captured by the camera
///
/// The digit count carries the unit: one digit is tenths, two are
/// hundredths and three are thousandths of a second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubSeconds {
    raw: String,
    value: u32,
    digits: usize,
}

impl SubSeconds {
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let digits = raw.len();
        let value = raw.parse().unwrap_or(0);
        Self { raw, value, digits }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn digits(&self) -> usize {
        self.digits
    }

    /// Millisecond equivalent; fragments longer than three digits are
    /// truncated to millisecond precision
    pub fn as_milliseconds(&self) -> u32 {
        match self.digits {
            0 => 0,
            1 => self.value * 100,
            2 => self.value * 10,
            3 => self.value,
            _ => self
                .raw
                .chars()
                .take(3)
                .collect::<String>()
                .parse()
                .unwrap_or(0),
        }
    }

    /// Milliseconds zero-padded to three digits (`"5"` -> `"500"`)
    pub fn padded(&self) -> String {
        format!("{:03}", self.as_milliseconds())
    }
}

impl std::fmt::Display for SubSeconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Metadata extracted from one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExifData {
    pub taken_date: Option<NaiveDateTime>,
    pub coordinate: Option<Coordinate>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub sub_seconds: Option<SubSeconds>,
    pub original_file_name: Option<String>,
    reverse_geocodes: Option<Vec<String>>,
    address_separator: String,
}

impl ExifData {
    /// Create a record; address components are joined with `address_separator`
    pub fn new(
        taken_date: Option<NaiveDateTime>,
        coordinate: Option<Coordinate>,
        address_separator: &str,
    ) -> Self {
        Self {
            taken_date,
            coordinate,
            make: None,
            model: None,
            sub_seconds: None,
            original_file_name: None,
            reverse_geocodes: None,
            address_separator: address_separator.to_string(),
        }
    }

    pub fn with_camera(mut self, make: Option<String>, model: Option<String>) -> Self {
        self.make = non_blank(make);
        self.model = non_blank(model);
        self
    }

    pub fn with_sub_seconds(mut self, sub_seconds: Option<SubSeconds>) -> Self {
        self.sub_seconds = sub_seconds.filter(|s| !s.raw().is_empty());
        self
    }

    pub fn with_original_file_name(mut self, name: Option<String>) -> Self {
        self.original_file_name = non_blank(name);
        self
    }

    /// Attach reverse-geocode components (most general first)
    pub fn with_reverse_geocodes(mut self, components: Vec<String>) -> Self {
        let components: Vec<String> = components
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        self.reverse_geocodes = Some(components);
        self
    }

    pub fn reverse_geocodes(&self) -> Option<&[String]> {
        self.reverse_geocodes.as_deref()
    }

    pub fn has_reverse_geocode(&self) -> bool {
        self.reverse_geocodes.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Address components joined with the configured separator
    pub fn reverse_geocode_formatted(&self) -> Option<String> {
        self.reverse_geocodes
            .as_ref()
            .filter(|c| !c.is_empty())
            .map(|c| c.join(&self.address_separator))
    }

    pub fn has_make_model(&self) -> bool {
        self.make.is_some() || self.model.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
