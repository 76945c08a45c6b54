//! Run-wide counters.
//!
//! Extraction and hashing run on the rayon pool and bump these
//! concurrently, so every counter is atomic. Take a [`StatisticsSnapshot`]
//! for reporting.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct Statistics {
    photos_found: AtomicUsize,
    companion_files: AtomicUsize,
    invalid_format: AtomicUsize,
    taken_date_and_coordinate: AtomicUsize,
    taken_date_no_coordinate: AtomicUsize,
    coordinate_no_taken_date: AtomicUsize,
    no_coordinate_no_taken_date: AtomicUsize,
    duplicates: AtomicUsize,
    not_copied: AtomicUsize,
    named: AtomicUsize,
    directories_planned: AtomicUsize,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_photos_found(&self, count: usize) {
        self.photos_found.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_companion_files(&self, count: usize) {
        self.companion_files.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_invalid_format(&self) {
        self.invalid_format.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a valid photo under its date/coordinate combination
    pub fn record_metadata(&self, has_taken_date: bool, has_coordinate: bool) {
        let counter = match (has_taken_date, has_coordinate) {
            (true, true) => &self.taken_date_and_coordinate,
            (true, false) => &self.taken_date_no_coordinate,
            (false, true) => &self.coordinate_no_taken_date,
            (false, false) => &self.no_coordinate_no_taken_date,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_duplicates(&self, count: usize) {
        self.duplicates.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_not_copied(&self, count: usize) {
        self.not_copied.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_named(&self, count: usize) {
        self.named.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_directories_planned(&self, count: usize) {
        self.directories_planned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        let load = |counter: &AtomicUsize| counter.load(Ordering::Relaxed);
        StatisticsSnapshot {
            photos_found: load(&self.photos_found),
            companion_files: load(&self.companion_files),
            invalid_format: load(&self.invalid_format),
            taken_date_and_coordinate: load(&self.taken_date_and_coordinate),
            taken_date_no_coordinate: load(&self.taken_date_no_coordinate),
            coordinate_no_taken_date: load(&self.coordinate_no_taken_date),
            no_coordinate_no_taken_date: load(&self.no_coordinate_no_taken_date),
            duplicates: load(&self.duplicates),
            not_copied: load(&self.not_copied),
            named: load(&self.named),
            directories_planned: load(&self.directories_planned),
        }
    }
}

/// Point-in-time copy of [`Statistics`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub photos_found: usize,
    pub companion_files: usize,
    pub invalid_format: usize,
    pub taken_date_and_coordinate: usize,
    pub taken_date_no_coordinate: usize,
    pub coordinate_no_taken_date: usize,
    pub no_coordinate_no_taken_date: usize,
    pub duplicates: usize,
    pub not_copied: usize,
    pub named: usize,
    pub directories_planned: usize,
}

impl StatisticsSnapshot {
    pub fn has_coordinate_count(&self) -> usize {
        self.taken_date_and_coordinate + self.coordinate_no_taken_date
    }

    pub fn has_taken_date_count(&self) -> usize {
        self.taken_date_and_coordinate + self.taken_date_no_coordinate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn metadata_combinations_are_counted_separately() {
        let stats = Statistics::new();
        stats.record_metadata(true, true);
        stats.record_metadata(true, false);
        stats.record_metadata(false, true);
        stats.record_metadata(false, false);
        stats.record_metadata(false, false);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.no_coordinate_no_taken_date, 2);
        assert_eq!(snapshot.has_coordinate_count(), 2);
        assert_eq!(snapshot.has_taken_date_count(), 2);
    }

    #[test]
    fn counters_are_safe_to_bump_in_parallel() {
        let stats = Statistics::new();
        (0..1000).into_par_iter().for_each(|_| {
            stats.record_invalid_format();
            stats.add_duplicates(2);
        });

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.invalid_format, 1000);
        assert_eq!(snapshot.duplicates, 2000);
    }
}
