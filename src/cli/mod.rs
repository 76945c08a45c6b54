//! # CLI Module
//!
//! Command-line interface for the photo classifier.
//!
//! ## Usage
//! ```bash
//! # Plan with the default policy (single folder, date-time names)
//! photo-classify plan ~/Photos
//!
//! # Keep sub-folders, group by day, prefix folders with their day range
//! photo-classify plan ~/Photos --process preserve --group-by year-month-day \
//!     --folder-append day-range
//!
//! # Archive layout as JSON
//! photo-classify archive ~/Photos --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_classifier::core::grouper::{FolderProcessType, GroupByFolderType};
use photo_classifier::core::identity::Roster;
use photo_classifier::core::metadata::ManifestExtractor;
use photo_classifier::core::naming::{NamingStyle, NumberNamingTextStyle, SameNameConvention};
use photo_classifier::core::options::ToolOptions;
use photo_classifier::core::organize::{
    InvalidFormatAction, MissingDataActions, NoAddressAction, NoTakenDateAction,
};
use photo_classifier::core::pipeline::{
    ClassifyConfig, ClassifyMode, ClassifyPlan, FolderAppend, Pipeline,
};
use photo_classifier::core::renamer::{FolderAppendLocationType, FolderAppendType};
use photo_classifier::events::{
    DirectoryEvent, Event, EventChannel, ExtractEvent, PipelineEvent, ScanEvent,
};
use photo_classifier::Result;
use std::path::{Path, PathBuf};
use std::thread;

/// Photo Classifier - plan where every photo goes and what it is called
#[derive(Parser, Debug)]
#[command(name = "photo-classify")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan folders and names with a configurable policy
    Plan {
        #[command(flatten)]
        common: CommonArgs,

        /// How sub-folders of the source are treated
        #[arg(short, long, default_value = "single")]
        process: Process,

        /// Metadata that becomes target folders
        #[arg(short, long)]
        group_by: Option<GroupBy>,

        /// Metadata that becomes file names
        #[arg(short, long, default_value = "date-time-with-minutes")]
        naming: Naming,

        /// How same-name suffixes are written
        #[arg(long, default_value = "same-length")]
        numbers: Numbers,

        /// Leave the first photo of a same-name group unsuffixed
        #[arg(long)]
        first_unsuffixed: bool,

        /// Files without readable metadata
        #[arg(long, default_value = "continue")]
        invalid_format: Action,

        /// Photos without a capture date
        #[arg(long, default_value = "continue")]
        no_date: NoDateAction,

        /// Photos without an address
        #[arg(long, default_value = "continue")]
        no_address: Action,

        /// Route photos of unknown authors to their own folder
        #[arg(long)]
        no_author_folder: bool,

        /// Route photos of unknown devices to their own folder
        #[arg(long)]
        no_device_folder: bool,

        /// Token appended to preserved folder names
        #[arg(long)]
        folder_append: Option<Append>,

        /// Side of the folder name the token goes
        #[arg(long, default_value = "prefix")]
        append_location: AppendLocation,

        /// Drop byte-identical photos within a folder
        #[arg(long)]
        remove_duplicates: bool,
    },

    /// Plan the archive layout: year/month/day folders, time-and-hash names
    Archive {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Folder holding the photos
    source: PathBuf,

    /// Tool options JSON file
    #[arg(long)]
    options: Option<PathBuf>,

    /// Folder holding authors.json and devices.json
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Metadata manifest JSON to use instead of reading EXIF
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Process {
    /// Only the top level of the source
    Single,
    /// Recurse and keep each photo's relative folder
    Preserve,
    /// Recurse and put everything under the output root
    Flatten,
}

impl From<Process> for FolderProcessType {
    fn from(process: Process) -> Self {
        match process {
            Process::Single => FolderProcessType::Single,
            Process::Preserve => FolderProcessType::SubFoldersPreserveFolderHierarchy,
            Process::Flatten => FolderProcessType::FlattenAllSubFolders,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GroupBy {
    YearMonthDay,
    YearMonth,
    Year,
    AddressFlat,
    AddressHierarchy,
    /// 2020s/2024/202401Jan/2024-01-05
    Decade,
    Author,
    Device,
    AuthorYearMonthDay,
    DeviceYearMonthDay,
    AuthorDeviceYearMonthDay,
}

impl From<GroupBy> for GroupByFolderType {
    fn from(group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::YearMonthDay => GroupByFolderType::YearMonthDay,
            GroupBy::YearMonth => GroupByFolderType::YearMonth,
            GroupBy::Year => GroupByFolderType::Year,
            GroupBy::AddressFlat => GroupByFolderType::AddressFlat,
            GroupBy::AddressHierarchy => GroupByFolderType::AddressHierarchy,
            GroupBy::Decade => GroupByFolderType::DecadeYearYearShortMonthNameYearMonthDay,
            GroupBy::Author => GroupByFolderType::Author,
            GroupBy::Device => GroupByFolderType::Device,
            GroupBy::AuthorYearMonthDay => GroupByFolderType::AuthorYearMonthDay,
            GroupBy::DeviceYearMonthDay => GroupByFolderType::DeviceYearMonthDay,
            GroupBy::AuthorDeviceYearMonthDay => GroupByFolderType::AuthorDeviceYearMonthDay,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Naming {
    Numeric,
    Day,
    DateTimeWithMinutes,
    DateTimeWithSeconds,
    Address,
    DayAddress,
    AddressDay,
    DateTimeWithMinutesAddress,
    AddressDateTimeWithMinutes,
    DateTimeWithSecondsAddress,
    AddressDateTimeWithSeconds,
    DateTimeWithSubseconds,
    DateTimeWithSubsecondsAuthorDevice,
    DateTimeWithSubsecondsAuthorDeviceOriginalName,
}

impl From<Naming> for NamingStyle {
    fn from(naming: Naming) -> Self {
        match naming {
            Naming::Numeric => NamingStyle::Numeric,
            Naming::Day => NamingStyle::Day,
            Naming::DateTimeWithMinutes => NamingStyle::DateTimeWithMinutes,
            Naming::DateTimeWithSeconds => NamingStyle::DateTimeWithSeconds,
            Naming::Address => NamingStyle::Address,
            Naming::DayAddress => NamingStyle::DayAddress,
            Naming::AddressDay => NamingStyle::AddressDay,
            Naming::DateTimeWithMinutesAddress => NamingStyle::DateTimeWithMinutesAddress,
            Naming::AddressDateTimeWithMinutes => NamingStyle::AddressDateTimeWithMinutes,
            Naming::DateTimeWithSecondsAddress => NamingStyle::DateTimeWithSecondsAddress,
            Naming::AddressDateTimeWithSeconds => NamingStyle::AddressDateTimeWithSeconds,
            Naming::DateTimeWithSubseconds => NamingStyle::DateTimeWithSubseconds,
            Naming::DateTimeWithSubsecondsAuthorDevice => {
                NamingStyle::DateTimeWithSubsecondsAuthorDevice
            }
            Naming::DateTimeWithSubsecondsAuthorDeviceOriginalName => {
                NamingStyle::DateTimeWithSubsecondsAuthorDeviceOriginalName
            }
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Numbers {
    /// Zero-padded to the widest number (01..12)
    SameLength,
    /// 1..12
    Sequential,
    /// a..z, aa..
    Letters,
}

impl From<Numbers> for NumberNamingTextStyle {
    fn from(numbers: Numbers) -> Self {
        match numbers {
            Numbers::SameLength => NumberNamingTextStyle::AllNamesAreSameLength,
            Numbers::Sequential => NumberNamingTextStyle::OnlySequentialNumbers,
            Numbers::Letters => NumberNamingTextStyle::Letters,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    Continue,
    /// Stop before planning if any photo is affected
    Prevent,
    /// Leave affected photos out of the plan
    Skip,
    /// Route affected photos to their fallback folder
    SubFolder,
}

impl From<Action> for InvalidFormatAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Continue => InvalidFormatAction::Continue,
            Action::Prevent => InvalidFormatAction::PreventProcess,
            Action::Skip => InvalidFormatAction::DontCopyToOutput,
            Action::SubFolder => InvalidFormatAction::InSubFolder,
        }
    }
}

impl From<Action> for NoAddressAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Continue => NoAddressAction::Continue,
            Action::Prevent => NoAddressAction::PreventProcess,
            Action::Skip => NoAddressAction::DontCopyToOutput,
            Action::SubFolder => NoAddressAction::InSubFolder,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NoDateAction {
    Continue,
    Prevent,
    Skip,
    SubFolder,
    /// Number after the dated photos, by file name
    AppendToEnd,
    /// Number before the dated photos, by file name
    InsertAtBeginning,
}

impl From<NoDateAction> for NoTakenDateAction {
    fn from(action: NoDateAction) -> Self {
        match action {
            NoDateAction::Continue => NoTakenDateAction::Continue,
            NoDateAction::Prevent => NoTakenDateAction::PreventProcess,
            NoDateAction::Skip => NoTakenDateAction::DontCopyToOutput,
            NoDateAction::SubFolder => NoTakenDateAction::InSubFolder,
            NoDateAction::AppendToEnd => NoTakenDateAction::AppendToEndOrderByFileName,
            NoDateAction::InsertAtBeginning => NoTakenDateAction::InsertToBeginningOrderByFileName,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Append {
    FirstYearMonthDay,
    FirstYearMonth,
    DayRange,
    MatchingAddress,
}

impl From<Append> for FolderAppendType {
    fn from(append: Append) -> Self {
        match append {
            Append::FirstYearMonthDay => FolderAppendType::FirstYearMonthDay,
            Append::FirstYearMonth => FolderAppendType::FirstYearMonth,
            Append::DayRange => FolderAppendType::DayRange,
            Append::MatchingAddress => FolderAppendType::MatchingMinimumAddress,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AppendLocation {
    Prefix,
    Suffix,
}

impl From<AppendLocation> for FolderAppendLocationType {
    fn from(location: AppendLocation) -> Self {
        match location {
            AppendLocation::Prefix => FolderAppendLocationType::Prefix,
            AppendLocation::Suffix => FolderAppendLocationType::Suffix,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON plan for scripting
    Json,
    /// One `source<TAB>target` line per photo
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            common,
            process,
            group_by,
            naming,
            numbers,
            first_unsuffixed,
            invalid_format,
            no_date,
            no_address,
            no_author_folder,
            no_device_folder,
            folder_append,
            append_location,
            remove_duplicates,
        } => {
            let config = ClassifyConfig {
                source_root: common.source.clone(),
                mode: ClassifyMode::Copy,
                process_type: process.into(),
                group_by: group_by.map(Into::into),
                naming_style: naming.into(),
                number_style: numbers.into(),
                same_name_convention: if first_unsuffixed {
                    SameNameConvention::FirstUnsuffixed
                } else {
                    SameNameConvention::NumberAll
                },
                actions: MissingDataActions {
                    invalid_format: invalid_format.into(),
                    no_taken_date: no_date.into(),
                    no_address: no_address.into(),
                },
                no_author_in_sub_folder: no_author_folder,
                no_device_in_sub_folder: no_device_folder,
                folder_append: folder_append.map(|append| FolderAppend {
                    append_type: append.into(),
                    location: append_location.into(),
                }),
                remove_duplicates,
                include_hidden: common.include_hidden,
            };
            run_classify(config, &common)
        }
        Commands::Archive { common } => {
            let config = ClassifyConfig {
                source_root: common.source.clone(),
                mode: ClassifyMode::Archive,
                include_hidden: common.include_hidden,
                ..ClassifyConfig::default()
            };
            run_classify(config, &common)
        }
    }
}

fn run_classify(config: ClassifyConfig, common: &CommonArgs) -> Result<()> {
    photo_classifier::init_tracing(common.verbose);
    let term = Term::stderr();
    let output = common.output;
    let verbose = common.verbose;

    // Print header
    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Photo Classifier").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let options = match &common.options {
        Some(path) => ToolOptions::load(path)?,
        None => ToolOptions::default(),
    };

    let roster = match common.roster.clone().or_else(Roster::default_dir) {
        Some(dir) => Roster::load_from_dir(&dir)?,
        None => Roster::empty(),
    };

    // Build pipeline
    let mut builder = Pipeline::builder().config(config).roster(roster);
    if let Some(manifest) = &common.manifest {
        let extractor = ManifestExtractor::load(manifest, &common.source, &options)?;
        builder = builder.extractor(Box::new(extractor));
    }
    let pipeline = builder.options(options).build()?;

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            // Drain so the pipeline never sees a full channel
            for _ in receiver.iter() {}
            return;
        };
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Scan(ScanEvent::Completed { total_photos, .. }) => {
                    pb.set_length(total_photos as u64);
                }
                Event::Extract(ExtractEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Directory(DirectoryEvent::DuplicatesFound {
                    directory,
                    duplicate_count,
                    ..
                }) if verbose => {
                    pb.println(format!(
                        "  {} {} duplicate(s) in {}",
                        style("○").dim(),
                        duplicate_count,
                        display_directory(&directory)
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    let plan = result?;

    // Output results
    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &plan, verbose),
        OutputFormat::Json => print_json_results(&plan),
        OutputFormat::Minimal => print_minimal_results(&plan),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, plan: &ClassifyPlan, verbose: bool) {
    let stats = &plan.statistics;

    term.write_line(&format!("{} Plan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} photos found in {:.1}s ({} companion files)",
        style(stats.photos_found).cyan(),
        plan.duration_ms as f64 / 1000.0,
        stats.companion_files
    ))
    .ok();
    term.write_line(&format!(
        "  {} photos planned into {} folders",
        style(plan.photo_count()).cyan(),
        style(plan.directories.len()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} with date and location, {} with date only, {} with location only, {} with neither",
        stats.taken_date_and_coordinate,
        stats.taken_date_no_coordinate,
        stats.coordinate_no_taken_date,
        stats.no_coordinate_no_taken_date
    ))
    .ok();
    if stats.invalid_format > 0 {
        term.write_line(&format!(
            "  {} files without readable metadata",
            style(stats.invalid_format).yellow()
        ))
        .ok();
    }
    if stats.duplicates > 0 {
        term.write_line(&format!(
            "  {} duplicates left out",
            style(stats.duplicates).yellow()
        ))
        .ok();
    }
    if stats.not_copied > 0 {
        term.write_line(&format!(
            "  {} photos left out by policy",
            style(stats.not_copied).yellow()
        ))
        .ok();
    }
    for error in &plan.errors {
        term.write_line(&format!("  {} {}", style("!").red(), error))
            .ok();
    }
    term.write_line("").ok();

    // Show folders
    if plan.directories.is_empty() {
        term.write_line(&format!("  {}", style("No photos found.").dim()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Folders:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for directory in &plan.directories {
            term.write_line(&format!(
                "  {} ({} photos)",
                style(display_directory(&directory.directory)).bold(),
                directory.photos.len()
            ))
            .ok();

            if verbose {
                for photo in &directory.photos {
                    term.write_line(&format!(
                        "    {} {} {}",
                        display_path(&photo.source),
                        style("→").dim(),
                        photo.file_name
                    ))
                    .ok();
                }
            }
        }
        term.write_line("").ok();
    }

    if verbose && !plan.duplicates.is_empty() {
        term.write_line(&format!("{}", style("Duplicates:").bold().underlined()))
            .ok();
        for group in &plan.duplicates {
            term.write_line(&format!(
                "    {} {}",
                style("★").green(),
                display_path(&group.representative)
            ))
            .ok();
            for duplicate in &group.duplicates {
                term.write_line(&format!("    {} {}", style("○").dim(), display_path(duplicate)))
                    .ok();
            }
        }
        term.write_line("").ok();
    }

    // Footer
    term.write_line(&format!(
        "{}",
        style("Nothing was copied or renamed. Review the plan before applying it.").dim()
    ))
    .ok();
}

fn print_json_results(plan: &ClassifyPlan) {
    match serde_json::to_string_pretty(plan) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize plan: {e}"),
    }
}

fn print_minimal_results(plan: &ClassifyPlan) {
    for photo in plan.photos() {
        println!("{}\t{}", photo.source.display(), photo.target_relative_path());
    }
}

fn display_directory(directory: &str) -> &str {
    if directory.is_empty() {
        "."
    } else {
        directory
    }
}

fn display_path(path: &Path) -> String {
    let home = dirs::home_dir().unwrap_or_default();
    match path.strip_prefix(&home) {
        Ok(relative) if !home.as_os_str().is_empty() => format!("~/{}", relative.display()),
        _ => path.display().to_string(),
    }
}
