//! # Identity Module
//!
//! Resolves which author and device a photo belongs to.
//!
//! ## Rosters
//! Two JSON files, loaded once at startup:
//! - `devices.json` - cameras, matched by EXIF make and model
//! - `authors.json` - people, each owning devices over time ranges
//!
//! Authors reference devices by id. Both rosters always end with an
//! "Unknown" sentinel, which is what a photo resolves to when nothing in
//! the roster matches.
//!
//! ## Resolution
//! 1. Make and model both absent -> (Unknown author, Unknown device)
//! 2. Device: first roster device whose make and model match; an empty
//!    roster field matches anything
//! 3. Author: first roster author owning that device at the capture time;
//!    without a capture time the author is Unknown

mod roster;

pub use roster::Roster;

use crate::core::photo::{IdentifiedPhoto, Identity, Photo};
use crate::error::IdentityError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Id shared by both sentinels
pub const UNKNOWN_ID: &str = "Unknown";

/// A camera or phone listed in the device roster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    pub alias: String,
    pub make: String,
    pub model: String,
    pub serial_number: String,
}

impl Device {
    pub fn unknown() -> Self {
        Self {
            id: UNKNOWN_ID.to_string(),
            name: "Unknown Device".to_string(),
            alias: "UNK".to_string(),
            make: "3rdParty".to_string(),
            model: "Unknown".to_string(),
            serial_number: String::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.id == UNKNOWN_ID
    }

    /// Short name used in folder and file names; falls back to the id
    pub fn display_alias(&self) -> &str {
        if self.alias.is_empty() {
            &self.id
        } else {
            &self.alias
        }
    }

    fn matches(&self, make: Option<&str>, model: Option<&str>) -> bool {
        field_matches(&self.make, make) && field_matches(&self.model, model)
    }
}

/// An empty roster field is a wildcard; otherwise values must be equal
fn field_matches(roster_value: &str, photo_value: Option<&str>) -> bool {
    roster_value.is_empty() || photo_value == Some(roster_value)
}

/// An author's ownership of a device, optionally bounded in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDevice {
    pub device_id: String,
    /// `2024-01-01T08:00:00`, or a bare date for the start of that day
    #[serde(default, deserialize_with = "bound::start_of_day")]
    pub from: Option<NaiveDateTime>,
    /// `2024-12-31T18:00:00`, or a bare date for the end of that day
    #[serde(default, deserialize_with = "bound::end_of_day")]
    pub to: Option<NaiveDateTime>,
}

/// Ownership bounds accept either a date-time or a bare date
mod bound {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn start_of_day<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse(deserializer, |date| date.and_hms_opt(0, 0, 0))
    }

    pub fn end_of_day<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse(deserializer, |date| date.and_hms_nano_opt(23, 59, 59, 999_999_999))
    }

    fn parse<'de, D>(
        deserializer: D,
        time_of_day: fn(NaiveDate) -> Option<NaiveDateTime>,
    ) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        if let Ok(date_time) = raw.parse::<NaiveDateTime>() {
            return Ok(Some(date_time));
        }
        let date = raw.parse::<NaiveDate>().map_err(|e| {
            D::Error::custom(format!("invalid ownership bound `{raw}`: {e}"))
        })?;
        time_of_day(date)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid ownership bound `{raw}`")))
    }
}

impl AuthorDevice {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            from: None,
            to: None,
        }
    }

    pub fn between(mut self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Both bounds are inclusive; a missing bound is open
    pub fn covers(&self, captured_at: NaiveDateTime) -> bool {
        self.from.map_or(true, |from| from <= captured_at)
            && self.to.map_or(true, |to| captured_at <= to)
    }
}

/// A person listed in the author roster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    pub alias: String,
    pub devices: Vec<AuthorDevice>,
}

impl Author {
    pub fn unknown() -> Self {
        Self {
            id: UNKNOWN_ID.to_string(),
            name: "Unknown Author".to_string(),
            alias: "UNKN".to_string(),
            devices: vec![AuthorDevice::new(UNKNOWN_ID)],
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.id == UNKNOWN_ID
    }

    pub fn display_alias(&self) -> &str {
        if self.alias.is_empty() {
            &self.id
        } else {
            &self.alias
        }
    }

    /// Whether this author held `device_id` at `captured_at`
    pub fn owns(&self, device_id: &str, captured_at: NaiveDateTime) -> bool {
        self.devices
            .iter()
            .any(|d| d.device_id == device_id && d.covers(captured_at))
    }
}

/// Maps camera metadata to an author and device
pub struct IdentityResolver {
    roster: Roster,
}

impl IdentityResolver {
    pub fn new(roster: Roster) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Resolve the owner of a photo taken with `make`/`model` at `captured_at`
    pub fn resolve(
        &self,
        make: Option<&str>,
        model: Option<&str>,
        captured_at: Option<NaiveDateTime>,
    ) -> Identity {
        let make = make.filter(|m| !m.is_empty());
        let model = model.filter(|m| !m.is_empty());

        if make.is_none() && model.is_none() {
            return self.unknown_identity();
        }

        let device = self
            .roster
            .devices()
            .iter()
            .filter(|d| !d.is_unknown())
            .find(|d| d.matches(make, model))
            .cloned()
            .unwrap_or_else(|| self.roster.default_device());

        let author = captured_at
            .and_then(|at| {
                self.roster
                    .authors()
                    .iter()
                    .filter(|a| !a.is_unknown())
                    .find(|a| a.owns(&device.id, at))
                    .cloned()
            })
            .unwrap_or_else(|| self.roster.default_author());

        trace!(
            make = make.unwrap_or_default(),
            model = model.unwrap_or_default(),
            author = %author.id,
            device = %device.id,
            "Resolved identity"
        );

        Identity { author, device }
    }

    /// Attach an identity to a photo whose metadata has been extracted
    ///
    /// Photos with an invalid format (no metadata record) pass through
    /// unresolved.
    pub fn identify(&self, photo: Photo) -> IdentifiedPhoto {
        let identity = photo.exif.as_ref().map(|exif| {
            self.resolve(exif.make.as_deref(), exif.model.as_deref(), exif.taken_date)
        });
        match identity {
            Some(identity) => IdentifiedPhoto::resolved(photo, identity),
            None => IdentifiedPhoto::unresolved(photo),
        }
    }

    /// Like [`identify`](Self::identify), but a photo without metadata is an error
    pub fn require_identity(&self, photo: Photo) -> Result<IdentifiedPhoto, IdentityError> {
        if photo.exif.is_none() {
            return Err(IdentityError::MetadataNotAttached {
                path: photo.file.path.clone(),
            });
        }
        Ok(self.identify(photo))
    }

    fn unknown_identity(&self) -> Identity {
        Identity {
            author: self.roster.default_author(),
            device: self.roster.default_device(),
        }
    }
}
