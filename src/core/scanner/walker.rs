//! Directory walking implementation using walkdir.

use super::filter::{MediaFilter, MediaKind};
use super::{ScanConfig, ScanResult};
use crate::core::options::ToolOptions;
use crate::core::photo::{file_stem, PhotoFile};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent, ScanProgress};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Collects photos and their companion files from a source folder
pub struct PhotoCollector {
    config: ScanConfig,
    filter: MediaFilter,
}

impl PhotoCollector {
    pub fn new(options: &ToolOptions, config: ScanConfig) -> Self {
        let filter = MediaFilter::new(options).with_hidden(config.include_hidden);
        Self { config, filter }
    }

    pub fn collect(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.collect_with_events(root, &null_sender())
    }

    /// Walk `root`; photos come back sorted by path
    pub fn collect_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut photos = Vec::new();
        let mut companions = Vec::new();
        let mut errors = Vec::new();
        let mut directories_scanned = 0;

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let include_hidden = self.config.include_hidden;
        let walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|entry| {
                include_hidden || entry.depth() == 0 || !MediaFilter::is_hidden(entry.path())
            });

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_dir() {
                        directories_scanned += 1;
                        events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                            directories_scanned,
                            photos_found: photos.len(),
                            current_path: path.to_path_buf(),
                        })));
                        continue;
                    }

                    match self.filter.classify(path) {
                        Some(MediaKind::Photo) => photos.push(path.to_path_buf()),
                        Some(MediaKind::Companion) => companions.push(path.to_path_buf()),
                        None => {}
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let message = e.to_string();
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other(message.clone()));
                    warn!(path = %path.display(), error = %message, "Failed to read entry");
                    events.send(Event::Scan(ScanEvent::Error {
                        path: path.clone(),
                        message,
                    }));
                    errors.push(ScanError::ReadDirectory { path, source });
                }
            }
        }

        photos.sort();
        companions.sort();
        let photos = pair_companions(photos, companions);
        let companion_files = photos.iter().map(|p| p.companions.len()).sum();

        info!(
            root = %root.display(),
            photos = photos.len(),
            companion_files,
            errors = errors.len(),
            "Collected photos"
        );
        events.send(Event::Scan(ScanEvent::Completed {
            total_photos: photos.len(),
            companion_files,
        }));

        Ok(ScanResult { photos, errors })
    }
}

/// Attach each companion to the first photo (path order) with the same
/// directory and stem; unmatched companions are ignored
fn pair_companions(photos: Vec<PathBuf>, companions: Vec<PathBuf>) -> Vec<PhotoFile> {
    let mut by_stem: HashMap<(PathBuf, String), Vec<PathBuf>> = HashMap::new();
    for companion in companions {
        let key = (
            companion.parent().map(Path::to_path_buf).unwrap_or_default(),
            file_stem(&companion),
        );
        by_stem.entry(key).or_default().push(companion);
    }

    let mut claimed: HashSet<(PathBuf, String)> = HashSet::new();
    let files: Vec<PhotoFile> = photos
        .into_iter()
        .map(|path| {
            let key = (
                path.parent().map(Path::to_path_buf).unwrap_or_default(),
                file_stem(&path),
            );
            let file = PhotoFile::new(path);
            if claimed.contains(&key) {
                return file;
            }
            match by_stem.get(&key) {
                Some(found) => {
                    claimed.insert(key);
                    file.with_companions(found.clone())
                }
                None => file,
            }
        })
        .collect();

    for (key, unmatched) in by_stem.iter().filter(|(key, _)| !claimed.contains(*key)) {
        debug!(
            directory = %key.0.display(),
            count = unmatched.len(),
            "Companion files without a photo"
        );
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_photo(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    fn collector(recursive: bool) -> PhotoCollector {
        let config = ScanConfig {
            recursive,
            ..ScanConfig::default()
        };
        PhotoCollector::new(&ToolOptions::default(), config)
    }

    #[test]
    fn empty_directory_has_no_photos() {
        let temp_dir = TempDir::new().unwrap();
        let result = collector(true).collect(temp_dir.path()).unwrap();
        assert!(result.photos.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn photos_are_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        create_test_photo(temp_dir.path(), "b.jpg");
        create_test_photo(temp_dir.path(), "a.png");
        create_test_photo(temp_dir.path(), "notes.txt");

        let result = collector(true).collect(temp_dir.path()).unwrap();

        let names: Vec<_> = result.photos.iter().map(|p| p.file_name()).collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
    }

    #[test]
    fn single_folder_does_not_recurse() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        create_test_photo(temp_dir.path(), "root.jpg");
        create_test_photo(&sub, "nested.jpg");

        assert_eq!(collector(false).collect(temp_dir.path()).unwrap().photos.len(), 1);
        assert_eq!(collector(true).collect(temp_dir.path()).unwrap().photos.len(), 2);
    }

    #[test]
    fn companions_pair_by_stem_in_same_folder() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        create_test_photo(temp_dir.path(), "IMG_1.HEIC");
        create_test_photo(temp_dir.path(), "IMG_1.MOV");
        create_test_photo(&sub, "IMG_2.MOV");
        create_test_photo(temp_dir.path(), "IMG_2.jpg");

        let result = collector(true).collect(temp_dir.path()).unwrap();

        assert_eq!(result.photos.len(), 2);
        let heic = result
            .photos
            .iter()
            .find(|p| p.file_name() == "IMG_1.HEIC")
            .unwrap();
        assert_eq!(heic.companions.len(), 1);
        assert!(heic.companions[0].ends_with("IMG_1.MOV"));
        let jpg = result
            .photos
            .iter()
            .find(|p| p.file_name() == "IMG_2.jpg")
            .unwrap();
        assert!(jpg.companions.is_empty());
    }

    #[test]
    fn hidden_directories_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let hidden = temp_dir.path().join(".thumbnails");
        fs::create_dir(&hidden).unwrap();
        create_test_photo(&hidden, "a.jpg");
        create_test_photo(temp_dir.path(), "b.jpg");

        let result = collector(true).collect(temp_dir.path()).unwrap();
        assert_eq!(result.photos.len(), 1);
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = collector(true).collect(Path::new("/nonexistent/path/12345"));
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
