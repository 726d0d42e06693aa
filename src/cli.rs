//! Command-line interface module for namesort.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing
//! - Merging command-line flags with configuration defaults
//! - Running classification and undo on a worker thread while showing progress
//! - Previewing a pattern and listing saved journals

use crate::classifier::{ClassificationRequest, ClassifyReport, RunOutcome};
use crate::config::{Config, ExtensionPreset};
use crate::enumerate::ExtensionFilter;
use crate::events::{CancellationToken, RunEvent};
use crate::journal::{JournalStore, OperationMode};
use crate::output::OutputFormatter;
use crate::pattern::CompiledPattern;
use crate::preview;
use crate::undo::UndoReport;
use crate::worker::{self, RunHandle};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// namesort - sort files into folders named after part of their file name
///
/// The first capturing group of a regular expression picks the folder:
/// with `artist_([a-z]+)` the file `artist_Alice.jpg` goes to `Alice/`.
#[derive(Parser, Debug, Clone)]
#[command(name = "namesort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: .namesortrc.toml, then ~/.config/namesort/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding undo journals (default: classify_moves/ next to the executable)
    #[arg(long, global = true)]
    pub journal_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Move or copy matching files into group folders
    Classify(RunArgs),
    /// Show how files would be grouped without touching them
    Preview(RunArgs),
    /// Revert a classification run
    Undo {
        /// Journal file to undo (default: the most recent one)
        journal: Option<PathBuf>,
    },
    /// List saved undo journals
    Journals,
}

/// Settings for a classification or preview.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory whose files are sorted
    pub directory: PathBuf,

    /// Regular expression; its first capturing group names the folder
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Comma-separated extensions to include, e.g. "jpg, png" ("" for all files)
    #[arg(short, long = "ext", conflicts_with = "kind")]
    pub extensions: Option<String>,

    /// Use a predefined extension list
    #[arg(short, long, value_enum)]
    pub kind: Option<ExtensionPreset>,

    /// Move files (default) or leave originals and copy them
    #[arg(short, long, value_enum)]
    pub mode: Option<OperationMode>,

    /// Match the pattern case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,
}

impl RunArgs {
    /// Builds the request for a run, filling gaps from `config`.
    pub fn to_request(&self, config: &Config) -> ClassificationRequest {
        let defaults = &config.defaults;

        let extensions = match (&self.extensions, self.kind) {
            (Some(text), _) => ExtensionFilter::parse(text),
            (None, Some(kind)) => kind.filter(),
            (None, None) => ExtensionFilter::parse(&defaults.extensions),
        };

        let pattern = self.pattern.as_deref().unwrap_or(&defaults.pattern).trim();

        ClassificationRequest::new(&self.directory, pattern)
        .with_extensions(extensions)
        .with_mode(self.mode.unwrap_or(defaults.mode))
        .case_insensitive(!self.case_sensitive && defaults.case_insensitive)
    }
}

/// Runs the CLI application with a fresh cancellation token.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use namesort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["namesort", "classify", "/path/to/pictures", "-e", "jpg"]);
/// if let Err(e) = run_cli(cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: Cli) -> Result<(), String> {
    run_cli_with_cancellation(cli, CancellationToken::new())
}

/// Runs the CLI application; `cancel` stops a running classification or undo.
pub fn run_cli_with_cancellation(cli: Cli, cancel: CancellationToken) -> Result<(), String> {
    let config = Config::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;

    match &cli.command {
        Command::Classify(args) => {
            let store = journal_store(&config, cli.journal_dir.as_deref())?;
            classify_directory(args.to_request(&config), store, cancel)
        }
        Command::Preview(args) => preview_directory(&args.to_request(&config)),
        Command::Undo { journal } => {
            let store = journal_store(&config, cli.journal_dir.as_deref())?;
            undo_journal(journal.as_deref(), &store, cancel)
        }
        Command::Journals => {
            let store = journal_store(&config, cli.journal_dir.as_deref())?;
            list_journals(&store)
        }
    }
}

fn journal_store(config: &Config, override_dir: Option<&Path>) -> Result<JournalStore, String> {
    config
        .journal_store(override_dir)
        .map_err(|e| format!("Error locating journals: {}", e))
}

/// Classifies a directory on a worker thread and prints the outcome.
///
/// Invalid patterns and empty directories are reported in the run log rather
/// than returned as errors.
pub fn classify_directory(
    request: ClassificationRequest,
    store: JournalStore,
    cancel: CancellationToken,
) -> Result<(), String> {
    if request.pattern.trim().is_empty() {
        return Err("Please provide a pattern with a capturing group.".to_string());
    }

    OutputFormatter::info(&format!(
        "Classifying contents of: {}",
        request.source_directory.display()
    ));

    let run = worker::spawn_classify(request, store, cancel)
        .map_err(|e| format!("Could not start worker thread: {}", e))?;
    let report = follow(run)?;

    print_classify_report(&report);
    Ok(())
}

fn print_classify_report(report: &ClassifyReport) {
    if report.processed > 0 {
        OutputFormatter::summary_table(&report.group_counts, report.processed);
    }

    match &report.outcome {
        RunOutcome::Completed => OutputFormatter::success("Classification complete!"),
        RunOutcome::Cancelled => {
            OutputFormatter::warning("Classification cancelled; files already handled stay put.")
        }
        RunOutcome::Aborted { reason } => {
            OutputFormatter::warning(&format!("Nothing was classified: {}", reason))
        }
    }

    if !report.failed.is_empty() {
        OutputFormatter::warning(&format!(
            "{} files could not be classified. Please review errors above.",
            report.failed.len()
        ));
    }

    if let Some(path) = &report.journal_path {
        OutputFormatter::plain(&format!(
            "Use 'namesort undo \"{}\"' to revert changes.",
            path.display()
        ));
    }
}

/// Prints how each eligible file would be grouped.
pub fn preview_directory(request: &ClassificationRequest) -> Result<(), String> {
    let compiled = CompiledPattern::compile(&request.pattern, request.case_insensitive)
        .map_err(|e| e.to_string())?;

    let result = preview::preview(&request.source_directory, &compiled, &request.extensions)
        .map_err(|e| {
            format!(
                "Error reading directory {}: {}",
                request.source_directory.display(),
                e
            )
        })?;

    if result.entries.is_empty() {
        OutputFormatter::info("No files with a matching extension were found.");
        return Ok(());
    }

    OutputFormatter::header(&format!(
        "PREVIEW: {}",
        request.source_directory.display()
    ));
    for entry in &result.entries {
        OutputFormatter::plain(&OutputFormatter::preview_line(entry));
    }
    if result.has_more {
        OutputFormatter::plain(" … more files not shown");
    }

    let counts = result.group_counts();
    let matched: usize = counts.values().sum();
    if matched > 0 {
        OutputFormatter::summary_table(&counts, matched);
    }

    OutputFormatter::success("Preview complete. No files were modified.");
    Ok(())
}

/// Undoes `journal`, or the newest journal in `store` when none is given.
pub fn undo_journal(
    journal: Option<&Path>,
    store: &JournalStore,
    cancel: CancellationToken,
) -> Result<(), String> {
    let journal_path = match journal {
        Some(path) => path.to_path_buf(),
        None => store
            .latest()
            .map_err(|e| e.to_string())?
            .ok_or_else(|| {
                format!("No journal found to undo in {}", store.dir().display())
            })?,
    };

    OutputFormatter::info(&format!("Undoing {}", journal_path.display()));

    let run = worker::spawn_undo(journal_path, cancel)
        .map_err(|e| format!("Could not start worker thread: {}", e))?;
    let report = follow(run)?.map_err(|e| e.to_string())?;

    print_undo_report(&report);
    Ok(())
}

fn print_undo_report(report: &UndoReport) {
    OutputFormatter::header("UNDO");
    OutputFormatter::plain(&format!("  Restored: {}", report.restored_files));
    OutputFormatter::plain(&format!("  Copies deleted: {}", report.deleted_copies));

    if !report.skipped_files.is_empty() {
        OutputFormatter::plain(&format!("  Skipped: {}", report.skipped_files.len()));
        for (path, reason) in &report.skipped_files {
            OutputFormatter::plain(&format!("    - {}: {}", path.display(), reason));
        }
    }

    if !report.failed_restores.is_empty() {
        OutputFormatter::plain(&format!("  Failed: {}", report.failed_restores.len()));
        for (path, reason) in &report.failed_restores {
            OutputFormatter::error(&format!("    - {}: {}", path.display(), reason));
        }
    }

    match report.outcome {
        RunOutcome::Cancelled => OutputFormatter::warning("Undo cancelled."),
        _ => OutputFormatter::success("Undo complete!"),
    }
}

/// Lists the journals in `store`, oldest first.
pub fn list_journals(store: &JournalStore) -> Result<(), String> {
    let journals = store.list().map_err(|e| e.to_string())?;
    if journals.is_empty() {
        OutputFormatter::info(&format!("No journals in {}", store.dir().display()));
        return Ok(());
    }

    OutputFormatter::header(&format!("JOURNALS in {}", store.dir().display()));
    for path in &journals {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match JournalStore::load(path) {
            Ok(journal) => {
                let when = journal
                    .created_at_time()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or(journal.created_at.clone());
                OutputFormatter::plain(&format!(
                    " - {}  {}  {} {} action(s) in {}",
                    name,
                    when,
                    journal.operation_mode,
                    journal.actions.len(),
                    journal.source_directory.display()
                ));
            }
            Err(e) => OutputFormatter::warning(&format!(" - {}: {}", name, e)),
        }
    }
    Ok(())
}

/// Shows a run's log lines and progress until it finishes, then returns its result.
fn follow<T>(run: RunHandle<T>) -> Result<T, String> {
    let pb = OutputFormatter::create_progress_bar();

    for event in run.events().iter() {
        match event {
            RunEvent::Progress(percent) => pb.set_position(u64::from(percent)),
            RunEvent::Log(line) => pb.println(OutputFormatter::log_line(&line)),
            RunEvent::Finished(_) => {}
        }
    }
    pb.finish_and_clear();

    run.join()
        .map_err(|_| "The worker thread stopped unexpectedly.".to_string())
}
