//! Author and device rosters.

use super::{Author, Device};
use crate::error::RosterError;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const APP_DIR: &str = "photo-classifier";
const AUTHORS_FILE: &str = "authors.json";
const DEVICES_FILE: &str = "devices.json";

/// The loaded rosters, each ending with its "Unknown" sentinel
#[derive(Debug, Clone)]
pub struct Roster {
    authors: Vec<Arc<Author>>,
    devices: Vec<Arc<Device>>,
    default_author: Arc<Author>,
    default_device: Arc<Device>,
}

impl Roster {
    /// Build rosters from parsed entries, synthesizing missing sentinels
    ///
    /// Fails if an author references a device id the device roster doesn't
    /// contain.
    pub fn new(authors: Vec<Author>, devices: Vec<Device>) -> Result<Self, RosterError> {
        let mut devices: Vec<Arc<Device>> = devices.into_iter().map(Arc::new).collect();
        let default_device = match devices.iter().find(|d| d.is_unknown()).cloned() {
            Some(device) => device,
            None => {
                let sentinel = Arc::new(Device::unknown());
                devices.push(Arc::clone(&sentinel));
                sentinel
            }
        };

        let mut authors: Vec<Arc<Author>> = authors.into_iter().map(Arc::new).collect();
        let default_author = match authors.iter().find(|a| a.is_unknown()).cloned() {
            Some(author) => author,
            None => {
                let sentinel = Arc::new(Author::unknown());
                authors.push(Arc::clone(&sentinel));
                sentinel
            }
        };

        let device_ids: HashSet<&str> = devices.iter().map(|d| d.id.as_str()).collect();
        for author in &authors {
            for owned in &author.devices {
                if !device_ids.contains(owned.device_id.as_str()) {
                    return Err(RosterError::UnknownDevice {
                        author: author.id.clone(),
                        device: owned.device_id.clone(),
                    });
                }
            }
        }

        debug!(
            authors = authors.len(),
            devices = devices.len(),
            "Roster ready"
        );

        Ok(Self {
            authors,
            devices,
            default_author,
            default_device,
        })
    }

    /// Sentinel-only rosters
    pub fn empty() -> Self {
        let default_author = Arc::new(Author::unknown());
        let default_device = Arc::new(Device::unknown());
        Self {
            authors: vec![Arc::clone(&default_author)],
            devices: vec![Arc::clone(&default_device)],
            default_author,
            default_device,
        }
    }

    /// Load both rosters from JSON files; a missing file is an empty roster
    pub fn load(authors_path: &Path, devices_path: &Path) -> Result<Self, RosterError> {
        let devices: Vec<Device> = read_entries(devices_path)?;
        let authors: Vec<Author> = read_entries(authors_path)?;
        info!(
            authors = authors.len(),
            devices = devices.len(),
            "Loaded rosters"
        );
        Self::new(authors, devices)
    }

    /// Load `authors.json` and `devices.json` from `dir`
    pub fn load_from_dir(dir: &Path) -> Result<Self, RosterError> {
        Self::load(&dir.join(AUTHORS_FILE), &dir.join(DEVICES_FILE))
    }

    /// `<config dir>/photo-classifier`, when the platform has a config dir
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR))
    }

    pub fn authors(&self) -> &[Arc<Author>] {
        &self.authors
    }

    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    pub fn default_author(&self) -> Arc<Author> {
        Arc::clone(&self.default_author)
    }

    pub fn default_device(&self) -> Arc<Device> {
        Arc::clone(&self.default_device)
    }

    pub fn device(&self, id: &str) -> Option<Arc<Device>> {
        self.devices.iter().find(|d| d.id == id).cloned()
    }

    pub fn author(&self, id: &str) -> Option<Arc<Author>> {
        self.authors.iter().find(|a| a.id == id).cloned()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::empty()
    }
}

fn read_entries<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RosterError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Roster file not found, using the Unknown sentinel only");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(RosterError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content).map_err(|source| RosterError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
