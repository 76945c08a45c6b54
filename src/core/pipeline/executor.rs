//! Pipeline execution implementation.

use super::{ClassifyConfig, ClassifyMode, ClassifyPlan, FolderAppend, PlannedDirectory};
use crate::core::bucket::Buckets;
use crate::core::duplicate::{group_and_filter_by_hash, hash_file, DuplicateGroup};
use crate::core::grouper::{DirectoryGrouper, FolderProcessType, GroupByFolderType};
use crate::core::identity::{IdentityResolver, Roster};
use crate::core::metadata::{ExifExtractor, MetadataExtractor};
use crate::core::naming::{
    ensure_unique_names, NamingEngine, NamingStyle, NumberNamingTextStyle, SameNameConvention,
};
use crate::core::options::ToolOptions;
use crate::core::organize::{
    filter_and_sort, InvalidFormatAction, MissingDataActions, NoAddressAction, NoTakenDateAction,
};
use crate::core::photo::{IdentifiedPhoto, NamedPhoto, Photo, PhotoFile};
use crate::core::renamer::{FolderAppendLocationType, FolderAppendType, FolderRenamer};
use crate::core::scanner::{PhotoCollector, ScanConfig};
use crate::core::statistics::Statistics;
use crate::error::{ClassifierError, Result};
use crate::events::{
    null_sender, DirectoryEvent, Event, EventSender, ExtractEvent, ExtractProgress,
    PipelineEvent, PipelinePhase, PipelineSummary,
};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: ClassifyConfig,
    options: ToolOptions,
    roster: Roster,
    extractor: Option<Box<dyn MetadataExtractor>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: ClassifyConfig::default(),
            options: ToolOptions::default(),
            roster: Roster::empty(),
            extractor: None,
        }
    }

    /// Replace the whole run policy
    pub fn config(mut self, config: ClassifyConfig) -> Self {
        self.config = config;
        self
    }

    /// Folder to classify
    pub fn source(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.config.source_root = source_root.into();
        self
    }

    pub fn mode(mut self, mode: ClassifyMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn process_type(mut self, process_type: FolderProcessType) -> Self {
        self.config.process_type = process_type;
        self
    }

    pub fn group_by(mut self, group_by: GroupByFolderType) -> Self {
        self.config.group_by = Some(group_by);
        self
    }

    pub fn naming_style(mut self, style: NamingStyle) -> Self {
        self.config.naming_style = style;
        self
    }

    pub fn number_style(mut self, style: NumberNamingTextStyle) -> Self {
        self.config.number_style = style;
        self
    }

    pub fn same_name_convention(mut self, convention: SameNameConvention) -> Self {
        self.config.same_name_convention = convention;
        self
    }

    pub fn actions(mut self, actions: MissingDataActions) -> Self {
        self.config.actions = actions;
        self
    }

    pub fn invalid_format_action(mut self, action: InvalidFormatAction) -> Self {
        self.config.actions.invalid_format = action;
        self
    }

    pub fn no_taken_date_action(mut self, action: NoTakenDateAction) -> Self {
        self.config.actions.no_taken_date = action;
        self
    }

    pub fn no_address_action(mut self, action: NoAddressAction) -> Self {
        self.config.actions.no_address = action;
        self
    }

    /// Route unknown authors and devices to their fallback folders
    pub fn identity_sub_folders(mut self, no_author: bool, no_device: bool) -> Self {
        self.config.no_author_in_sub_folder = no_author;
        self.config.no_device_in_sub_folder = no_device;
        self
    }

    pub fn folder_append(
        mut self,
        append_type: FolderAppendType,
        location: FolderAppendLocationType,
    ) -> Self {
        self.config.folder_append = Some(FolderAppend {
            append_type,
            location,
        });
        self
    }

    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.config.remove_duplicates = remove;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.include_hidden = include;
        self
    }

    pub fn options(mut self, options: ToolOptions) -> Self {
        self.options = options;
        self
    }

    pub fn roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    /// Set the metadata source (EXIF from the files by default)
    pub fn extractor(mut self, extractor: Box<dyn MetadataExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Build the pipeline, rejecting invalid tool options
    pub fn build(self) -> Result<Pipeline> {
        self.options.validate()?;
        let extractor: Box<dyn MetadataExtractor> = match self.extractor {
            Some(extractor) => extractor,
            None => Box::new(ExifExtractor::new(&self.options)),
        };
        Ok(Pipeline {
            config: self.config,
            options: self.options,
            resolver: IdentityResolver::new(self.roster),
            extractor,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The classification pipeline
///
/// Scan, read metadata, hash, resolve identities, route into target
/// directories, then filter, order and name each directory.
pub struct Pipeline {
    config: ClassifyConfig,
    options: ToolOptions,
    resolver: IdentityResolver,
    extractor: Box<dyn MetadataExtractor>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &ClassifyConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<ClassifyPlan> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<ClassifyPlan> {
        let result = self.execute(events);
        if let Err(e) = &result {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    fn execute(&self, events: &EventSender) -> Result<ClassifyPlan> {
        let start_time = Instant::now();
        let stats = Statistics::new();
        let mut errors = Vec::new();
        let source_root = self.config.source_root.as_path();
        let actions = self.config.effective_actions();

        events.send(Event::Pipeline(PipelineEvent::Started));
        info!(
            source = %source_root.display(),
            mode = ?self.config.mode,
            "Classification started"
        );

        // Phase 1: Scanning
        phase(events, PipelinePhase::Scanning);
        let scan_config = ScanConfig {
            recursive: self.config.effective_process_type().is_recursive(),
            include_hidden: self.config.include_hidden,
            ..ScanConfig::default()
        };
        let scan_result = PhotoCollector::new(&self.options, scan_config)
            .collect_with_events(source_root, events)?;
        stats.add_photos_found(scan_result.photos.len());
        stats.add_companion_files(scan_result.companion_count());
        errors.extend(scan_result.errors.iter().map(ToString::to_string));
        let total_photos = scan_result.photos.len();

        // Phase 2: Metadata
        phase(events, PipelinePhase::Extracting);
        let photos = self.extract(scan_result.photos, &stats, events);
        check_prevent_process(&photos, &actions)?;

        // Phase 3: Hashing
        let photos = if self.config.hashes_contents() {
            phase(events, PipelinePhase::Hashing);
            self.hash(photos, &mut errors, events)
        } else {
            photos
        };

        let photos: Vec<IdentifiedPhoto> = photos
            .into_iter()
            .map(|photo| self.resolver.identify(photo))
            .collect();

        // Phase 4: Grouping
        phase(events, PipelinePhase::Grouping);
        let grouper = DirectoryGrouper::new(
            &self.options,
            self.config.effective_process_type(),
            self.config.effective_group_by(),
            self.config.subfolder_fallbacks(),
        );
        let buckets = grouper.group_files(photos, source_root)?;

        // Phase 5: Naming
        phase(events, PipelinePhase::Naming);
        let mut planned: Buckets<NamedPhoto> = Buckets::new();
        let mut dropped = Vec::new();
        let mut duplicates = Vec::new();
        for (directory, photos) in buckets {
            let outcome = self.plan_directory(directory, photos, &actions, &stats, events)?;
            dropped.extend(outcome.dropped);
            duplicates.extend(outcome.duplicates);
            for photo in outcome.named {
                planned.push(photo.target_directory.clone(), photo);
            }
        }

        let separator = &self.options.same_name_number_separator;
        let directories: Vec<PlannedDirectory> = planned
            .into_iter()
            .map(|(directory, mut photos)| {
                ensure_unique_names(&mut photos, separator);
                PlannedDirectory { directory, photos }
            })
            .collect();

        let planned_photos = directories.iter().map(|d| d.photos.len()).sum();
        stats.add_named(planned_photos);
        stats.add_directories_planned(directories.len());
        let statistics = stats.snapshot();
        let duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            photos = total_photos,
            directories = directories.len(),
            planned = planned_photos,
            duplicates = statistics.duplicates,
            not_copied = statistics.not_copied,
            duration_ms,
            "Classification completed"
        );
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_photos,
                directories: directories.len(),
                planned: planned_photos,
                duplicate_count: statistics.duplicates,
                not_copied: statistics.not_copied,
                duration_ms,
            },
        }));

        Ok(ClassifyPlan {
            id: Uuid::new_v4(),
            mode: self.config.mode,
            source_root: source_root.to_path_buf(),
            directories,
            dropped,
            duplicates,
            errors,
            statistics,
            duration_ms,
        })
    }

    /// Read metadata on the rayon pool; output keeps the input order
    fn extract(&self, files: Vec<PhotoFile>, stats: &Statistics, events: &EventSender) -> Vec<Photo> {
        let total = files.len();
        let completed = AtomicUsize::new(0);
        events.send(Event::Extract(ExtractEvent::Started {
            total_photos: total,
        }));

        let photos: Vec<Photo> = files
            .into_par_iter()
            .map(|file| {
                let exif = self.extractor.extract(&file.path);
                match &exif {
                    Some(exif) => {
                        stats.record_metadata(exif.taken_date.is_some(), exif.coordinate.is_some())
                    }
                    None => {
                        stats.record_invalid_format();
                        events.send(Event::Extract(ExtractEvent::InvalidFormat {
                            path: file.path.clone(),
                        }));
                    }
                }

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Extract(ExtractEvent::Progress(ExtractProgress {
                    completed: done,
                    total,
                    current_path: file.path.clone(),
                })));
                Photo::new(file, exif)
            })
            .collect();

        let invalid = photos.iter().filter(|p| !p.has_exif_data()).count();
        events.send(Event::Extract(ExtractEvent::Completed {
            valid: total - invalid,
            invalid,
        }));
        info!(photos = total, invalid, "Read photo metadata");
        photos
    }

    /// Hash contents on the rayon pool; unreadable files stay unhashed
    fn hash(&self, photos: Vec<Photo>, errors: &mut Vec<String>, events: &EventSender) -> Vec<Photo> {
        let results: Vec<(Photo, Option<String>)> = photos
            .into_par_iter()
            .map(|photo| match hash_file(photo.path()) {
                Ok(hash) => (photo.with_content_hash(hash), None),
                Err(e) => {
                    warn!(path = %photo.path().display(), error = %e, "Failed to hash photo");
                    events.send(Event::Extract(ExtractEvent::HashError {
                        path: photo.path().to_path_buf(),
                        message: e.to_string(),
                    }));
                    (photo, Some(e.to_string()))
                }
            })
            .collect();

        let mut hashed = Vec::with_capacity(results.len());
        for (photo, error) in results {
            errors.extend(error);
            hashed.push(photo);
        }
        debug!(photos = hashed.len(), "Hashed photo contents");
        hashed
    }

    /// Deduplicate, filter, order, name and rename one target directory
    fn plan_directory(
        &self,
        directory: String,
        photos: Vec<IdentifiedPhoto>,
        actions: &MissingDataActions,
        stats: &Statistics,
        events: &EventSender,
    ) -> Result<DirectoryOutcome> {
        events.send(Event::Directory(DirectoryEvent::Started {
            directory: directory.clone(),
            photos: photos.len(),
        }));

        let (photos, duplicates) = if self.config.hashes_contents() {
            let filtered = group_and_filter_by_hash(photos);
            stats.add_duplicates(filtered.duplicate_count());
            for group in &filtered.groups {
                events.send(Event::Directory(DirectoryEvent::DuplicatesFound {
                    directory: directory.clone(),
                    hash: group.hash.clone(),
                    duplicate_count: group.duplicate_count(),
                }));
            }
            (filtered.unique, filtered.groups)
        } else {
            (photos, Vec::new())
        };

        let organized = filter_and_sort(photos, actions, &directory);
        stats.add_not_copied(organized.dropped.len());
        let dropped: Vec<PathBuf> = organized
            .dropped
            .iter()
            .map(|p| p.photo.path().to_path_buf())
            .collect();
        let (ordered_count, kept_count) = (organized.ordered.len(), organized.kept.len());

        let engine = NamingEngine::new(
            &self.options,
            self.config.number_style,
            self.config.same_name_convention,
        );
        let mut named = match self.config.mode {
            ClassifyMode::Archive => {
                let mut photos = organized.ordered;
                photos.extend(organized.kept);
                engine.set_archive_file_names(photos, &directory)?
            }
            ClassifyMode::Copy => {
                let style = self.config.naming_style;
                let mut named = if style.is_keyed() {
                    let grouped = engine.group(organized.ordered, style)?;
                    engine.set_file_names(grouped, &directory)
                } else {
                    engine.set_numeric_file_names(organized.ordered, &directory)
                };
                named.extend(organized.kept.into_iter().map(|photo| {
                    let stem = photo.photo.file.file_stem();
                    NamedPhoto::new(photo, &directory, &stem)
                }));
                named
            }
        };

        let mut final_directory = directory.clone();
        if let Some(append) = self.config.folder_append {
            let renamer = FolderRenamer::new(
                &self.options,
                self.config.effective_process_type(),
                append.append_type,
                append.location,
            );
            if let Some(renamed) = renamer.rename(&mut named, &directory) {
                events.send(Event::Directory(DirectoryEvent::Renamed {
                    from: directory.clone(),
                    to: renamed.clone(),
                }));
                final_directory = renamed;
            }
        }

        debug!(
            directory = %final_directory,
            named = ordered_count,
            kept = kept_count,
            dropped = dropped.len(),
            duplicates = duplicates.len(),
            "Planned directory"
        );
        events.send(Event::Directory(DirectoryEvent::Completed {
            directory: final_directory,
            named: ordered_count,
            kept: kept_count,
            dropped: dropped.len(),
        }));

        Ok(DirectoryOutcome {
            named,
            dropped,
            duplicates,
        })
    }
}

struct DirectoryOutcome {
    named: Vec<NamedPhoto>,
    dropped: Vec<PathBuf>,
    duplicates: Vec<DuplicateGroup>,
}

fn phase(events: &EventSender, phase: PipelinePhase) {
    debug!(%phase, "Pipeline phase");
    events.phase_changed(phase);
}

/// Abort when a `PreventProcess` action meets a photo with its condition
fn check_prevent_process(photos: &[Photo], actions: &MissingDataActions) -> Result<()> {
    let count = |condition: fn(&Photo) -> bool| photos.iter().filter(|p| condition(*p)).count();

    let checks: [(bool, fn(&Photo) -> bool, &str); 3] = [
        (
            actions.invalid_format == InvalidFormatAction::PreventProcess,
            |p| !p.has_exif_data(),
            "have an invalid format",
        ),
        (
            actions.no_taken_date == NoTakenDateAction::PreventProcess,
            |p| p.has_exif_data() && !p.has_taken_date(),
            "have no capture date",
        ),
        (
            actions.no_address == NoAddressAction::PreventProcess,
            |p| p.has_exif_data() && !p.has_reverse_geocode(),
            "have no address",
        ),
    ];

    for (enabled, condition, reason) in checks {
        if !enabled {
            continue;
        }
        let offending = count(condition);
        if offending > 0 {
            warn!(count = offending, reason, "Processing prevented");
            return Err(ClassifierError::PreventProcess {
                count: offending,
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::{ManifestExtractor, ManifestRecord};
    use crate::events::EventChannel;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::fs;
    use tempfile::TempDir;

    fn at(day: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(10, minute, 0)
            .unwrap()
    }

    fn record(path: &str, captured_at: Option<NaiveDateTime>) -> ManifestRecord {
        ManifestRecord {
            path: PathBuf::from(path),
            captured_at,
            ..ManifestRecord::default()
        }
    }

    fn source_with(files: &[(&str, &[u8])]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn builder(dir: &TempDir, records: Vec<ManifestRecord>) -> PipelineBuilder {
        let options = ToolOptions::default();
        let extractor = ManifestExtractor::new(dir.path(), records, &options);
        Pipeline::builder()
            .source(dir.path())
            .options(options)
            .extractor(Box::new(extractor))
    }

    #[test]
    fn empty_source_gives_empty_plan() {
        let dir = TempDir::new().unwrap();
        let plan = builder(&dir, Vec::new()).build().unwrap().run().unwrap();

        assert_eq!(plan.photo_count(), 0);
        assert!(plan.directories.is_empty());
        assert_eq!(plan.statistics.photos_found, 0);
    }

    #[test]
    fn missing_source_is_an_error() {
        let result = Pipeline::builder()
            .source("/nonexistent/path/12345")
            .build()
            .unwrap()
            .run();
        assert!(matches!(result, Err(ClassifierError::Scan(_))));
    }

    #[test]
    fn photos_are_grouped_and_named() {
        let dir = source_with(&[("a.jpg", b"a"), ("b.jpg", b"b"), ("c.jpg", b"c")]);
        let records = vec![
            record("a.jpg", Some(at(5, 30))),
            record("b.jpg", Some(at(5, 30))),
            record("c.jpg", Some(at(6, 0))),
        ];

        let plan = builder(&dir, records)
            .group_by(GroupByFolderType::YearMonthDay)
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(plan.directories.len(), 2);
        let day5 = plan.directory("2024/01/05").unwrap();
        let names: Vec<_> = day5.photos.iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(names, vec!["2024.01.05_10.30-1.jpg", "2024.01.05_10.30-2.jpg"]);
        let day6 = plan.directory("2024/01/06").unwrap();
        assert_eq!(day6.photos[0].file_name, "2024.01.06_10.00.jpg");
        assert_eq!(plan.statistics.named, 3);
        assert_eq!(plan.statistics.directories_planned, 2);
    }

    #[test]
    fn prevent_process_aborts_before_planning() {
        let dir = source_with(&[("a.jpg", b"a"), ("b.jpg", b"b")]);
        let records = vec![record("a.jpg", Some(at(5, 0))), record("b.jpg", None)];

        let result = builder(&dir, records)
            .no_taken_date_action(NoTakenDateAction::PreventProcess)
            .build()
            .unwrap()
            .run();

        match result {
            Err(ClassifierError::PreventProcess { count, .. }) => assert_eq!(count, 1),
            other => panic!("expected PreventProcess, got {other:?}"),
        }
    }

    #[test]
    fn dont_copy_drops_and_counts() {
        let dir = source_with(&[("a.jpg", b"a"), ("b.jpg", b"b")]);
        let records = vec![record("a.jpg", Some(at(5, 0)))];

        let plan = builder(&dir, records)
            .invalid_format_action(InvalidFormatAction::DontCopyToOutput)
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(plan.photo_count(), 1);
        assert_eq!(plan.dropped.len(), 1);
        assert!(plan.dropped[0].ends_with("b.jpg"));
        assert_eq!(plan.statistics.invalid_format, 1);
        assert_eq!(plan.statistics.not_copied, 1);
    }

    #[test]
    fn events_report_phases() {
        let dir = source_with(&[("a.jpg", b"a")]);
        let records = vec![record("a.jpg", Some(at(5, 0)))];
        let pipeline = builder(&dir, records).build().unwrap();
        let (sender, receiver) = EventChannel::new();

        pipeline.run_with_events(&sender).unwrap();
        drop(sender);

        let phases: Vec<PipelinePhase> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                PipelinePhase::Scanning,
                PipelinePhase::Extracting,
                PipelinePhase::Grouping,
                PipelinePhase::Naming,
            ]
        );
    }

    #[test]
    fn invalid_options_fail_the_build() {
        let options = ToolOptions {
            year_format: String::new(),
            ..ToolOptions::default()
        };
        let result = Pipeline::builder().options(options).build();
        assert!(matches!(result, Err(ClassifierError::Config(_))));
    }
}
