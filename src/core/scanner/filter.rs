//! Decides which files are photos and which travel with one.

use crate::core::options::ToolOptions;
use std::collections::HashSet;
use std::path::Path;

/// What a file found during the walk is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    /// E.g. the video half of a live photo
    Companion,
}

/// Classifies files by extension
pub struct MediaFilter {
    photo_extensions: HashSet<String>,
    companion_extensions: HashSet<String>,
    include_hidden: bool,
}

impl MediaFilter {
    pub fn new(options: &ToolOptions) -> Self {
        let lower = |extensions: &[String]| {
            extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect()
        };
        Self {
            photo_extensions: lower(&options.supported_extensions),
            companion_extensions: lower(&options.companion_extensions),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn is_hidden(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with('.'))
    }

    /// Classify a file, `None` if it takes no part in the run
    pub fn classify(&self, path: &Path) -> Option<MediaKind> {
        if !self.include_hidden && Self::is_hidden(path) {
            return None;
        }

        let extension = path.extension()?.to_str()?.to_lowercase();
        if self.photo_extensions.contains(&extension) {
            Some(MediaKind::Photo)
        } else if self.companion_extensions.contains(&extension) {
            Some(MediaKind::Companion)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> MediaFilter {
        MediaFilter::new(&ToolOptions::default())
    }

    #[test]
    fn photos_match_case_insensitively() {
        assert_eq!(filter().classify(Path::new("/p/a.JPG")), Some(MediaKind::Photo));
        assert_eq!(filter().classify(Path::new("/p/IMG_1.HEIC")), Some(MediaKind::Photo));
    }

    #[test]
    fn companions_are_recognized() {
        assert_eq!(filter().classify(Path::new("/p/IMG_1.MOV")), Some(MediaKind::Companion));
    }

    #[test]
    fn other_files_are_ignored() {
        assert_eq!(filter().classify(Path::new("/p/notes.txt")), None);
        assert_eq!(filter().classify(Path::new("/p/no_extension")), None);
    }

    #[test]
    fn hidden_files_are_excluded_by_default() {
        assert_eq!(filter().classify(Path::new("/p/.a.jpg")), None);
        assert_eq!(
            filter().with_hidden(true).classify(Path::new("/p/.a.jpg")),
            Some(MediaKind::Photo)
        );
    }
}
