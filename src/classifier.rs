/// Classification of files into group subfolders.
///
/// A run compiles the pattern, takes a snapshot of the eligible files in the
/// source directory, and moves or copies every matching file into
/// `source/<group>/`. Each completed action lands in a [`Journal`] that is
/// saved at the end so the run can be undone later.
use crate::enumerate::{self, ExtensionFilter};
use crate::events::{self, CancellationToken, EventSink, LogKind};
use crate::journal::{ActionRecord, Journal, JournalStore, OperationMode};
use crate::naming::{self, ActionResult};
use crate::pattern::CompiledPattern;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Everything one classification run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub source_directory: PathBuf,
    pub pattern: String,
    pub extensions: ExtensionFilter,
    pub mode: OperationMode,
    pub case_insensitive: bool,
}

impl ClassificationRequest {
    /// A move run over all files, matching case-insensitively.
    pub fn new(source_directory: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            source_directory: source_directory.into(),
            pattern: pattern.into(),
            extensions: ExtensionFilter::default(),
            mode: OperationMode::Move,
            case_insensitive: true,
        }
    }

    pub fn with_extensions(mut self, extensions: ExtensionFilter) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_mode(mut self, mode: OperationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every item was handled.
    Completed,
    /// Stopped early on request; actions already taken stand and are journaled.
    Cancelled,
    /// Nothing was touched.
    Aborted { reason: String },
}

/// Result of a classification run.
#[derive(Debug, Clone)]
pub struct ClassifyReport {
    pub journal: Journal,
    /// Where the journal was saved. `None` if nothing was recorded or saving failed.
    pub journal_path: Option<PathBuf>,
    /// Files moved or copied.
    pub processed: usize,
    /// Files the pattern did not classify.
    pub skipped: usize,
    /// Files whose action failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Files handled per group folder.
    pub group_counts: BTreeMap<String, usize>,
    pub outcome: RunOutcome,
}

impl ClassifyReport {
    fn aborted(journal: Journal, reason: String) -> Self {
        Self {
            journal,
            journal_path: None,
            processed: 0,
            skipped: 0,
            failed: Vec::new(),
            group_counts: BTreeMap::new(),
            outcome: RunOutcome::Aborted { reason },
        }
    }
}

/// Runs classifications, reporting to an event sink and saving journals to a store.
///
/// Only one run should touch a given directory at a time; nothing here locks it.
#[derive(Debug, Clone)]
pub struct Classifier {
    store: JournalStore,
    events: EventSink,
    cancel: CancellationToken,
}

impl Classifier {
    pub fn new(store: JournalStore) -> Self {
        Self {
            store,
            events: EventSink::silent(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Classifies the files described by `request`.
    ///
    /// Never fails as a whole: an invalid pattern or unreadable directory aborts
    /// with zero actions, and a failing file is logged and passed over.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use namesort::classifier::{ClassificationRequest, Classifier};
    /// use namesort::enumerate::ExtensionFilter;
    /// use namesort::journal::JournalStore;
    ///
    /// let request = ClassificationRequest::new("/home/me/Pictures", r"artist[_\s-]*([A-Za-z]+)")
    ///     .with_extensions(ExtensionFilter::parse("jpg, png"));
    /// let report = Classifier::new(JournalStore::new("/tmp/journals")).run(&request);
    /// println!("{} files sorted, journal at {:?}", report.processed, report.journal_path);
    /// ```
    pub fn run(&self, request: &ClassificationRequest) -> ClassifyReport {
        let mut journal = Journal::new(
            request.source_directory.clone(),
            request.pattern.clone(),
            request.extensions.sorted(),
            request.mode,
        );

        self.events.log(
            LogKind::Start,
            format!(
                "Classifying {} ({} mode)",
                request.source_directory.display(),
                request.mode
            ),
        );

        let compiled = match CompiledPattern::compile(&request.pattern, request.case_insensitive) {
            Ok(compiled) => compiled,
            Err(e) => return self.abort(journal, e.to_string()),
        };

        if !request.source_directory.is_dir() {
            let reason = format!("{} is not a directory", request.source_directory.display());
            return self.abort(journal, reason);
        }

        let files = match enumerate::snapshot(&request.source_directory, &request.extensions) {
            Ok(files) => files,
            Err(e) => {
                let reason = format!(
                    "Error reading directory {}: {}",
                    request.source_directory.display(),
                    e
                );
                return self.abort(journal, reason);
            }
        };

        if files.is_empty() {
            self.events
                .log(LogKind::Info, "No files with a matching extension were found.");
            return self.abort(journal, "no eligible files".to_string());
        }

        let total = files.len();
        let mut processed = 0;
        let mut skipped = 0;
        let mut failed = Vec::new();
        let mut group_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut handled = 0;

        for path in &files {
            if self.cancel.is_cancelled() {
                break;
            }
            handled += 1;

            let Some(file_name) = path.file_name() else {
                continue;
            };
            let display_name = file_name.to_string_lossy();

            match compiled.classify(&display_name).group() {
                None => {
                    self.events
                        .log(LogKind::Skipped, format!("No match: {}", display_name));
                    skipped += 1;
                }
                Some(group) => match self.apply(request, path, file_name, group) {
                    Ok(record) => {
                        self.log_action(&record, &display_name, group);
                        journal.record(record);
                        processed += 1;
                        *group_counts.entry(group.to_string()).or_insert(0) += 1;
                    }
                    Err(e) => {
                        self.events.log(
                            LogKind::Error,
                            format!("Could not process {}: {}", display_name, e),
                        );
                        failed.push((path.clone(), e.to_string()));
                    }
                },
            }

            self.events.progress(events::percent(handled, total));
        }

        let outcome = if handled < total {
            RunOutcome::Cancelled
        } else {
            RunOutcome::Completed
        };

        let summary = format!(
            "{} processed, {} unmatched, {} failed",
            processed,
            skipped,
            failed.len()
        );
        match outcome {
            RunOutcome::Cancelled => self.events.log(
                LogKind::Done,
                format!("Cancelled after {} of {} files: {}.", handled, total, summary),
            ),
            _ => self
                .events
                .log(LogKind::Done, format!("All {} files handled: {}.", total, summary)),
        }

        let journal_path = self.persist(&journal);
        self.events.finished(journal_path.clone());

        ClassifyReport {
            journal,
            journal_path,
            processed,
            skipped,
            failed,
            group_counts,
            outcome,
        }
    }

    /// Moves or copies one file into its group folder and returns the record.
    fn apply(
        &self,
        request: &ClassificationRequest,
        path: &Path,
        file_name: &OsStr,
        group: &str,
    ) -> ActionResult<ActionRecord> {
        let group_dir = request.source_directory.join(group);
        naming::ensure_dir(&group_dir)?;
        let desired = group_dir.join(file_name);

        match request.mode {
            OperationMode::Move => {
                let landed = naming::move_unique(path, &desired)?;
                let was_at = request.source_directory.join(file_name);
                Ok(ActionRecord::moved(landed, was_at))
            }
            OperationMode::Copy => {
                let copy = naming::copy_unique(path, &desired)?;
                Ok(ActionRecord::copied(copy))
            }
        }
    }

    fn log_action(&self, record: &ActionRecord, display_name: &str, group: &str) {
        let kind = match record.operation {
            OperationMode::Move => LogKind::Moved,
            OperationMode::Copy => LogKind::Copied,
        };
        let landed_name = record
            .origin
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if landed_name == display_name {
            self.events
                .log(kind, format!("{} → {}/", display_name, group));
        } else {
            self.events.log(
                kind,
                format!("{} → {}/{}", display_name, group, landed_name),
            );
        }
    }

    /// Saves a non-empty journal. A failure leaves the run's effects in place
    /// but makes it impossible to undo.
    fn persist(&self, journal: &Journal) -> Option<PathBuf> {
        if journal.is_empty() {
            self.events.log(LogKind::Info, "No files were moved or copied.");
            return None;
        }

        match self.store.save(journal) {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.events
                    .log(LogKind::Journal, format!("Undo journal: {}", name));
                Some(path)
            }
            Err(e) => {
                self.events.log(
                    LogKind::Warning,
                    format!("{}. Undo will not be available for this run.", e),
                );
                None
            }
        }
    }

    fn abort(&self, journal: Journal, reason: String) -> ClassifyReport {
        self.events.log(LogKind::Error, reason.clone());
        self.events.progress(0);
        self.events.log(
            LogKind::Done,
            format!("Aborted before processing: {}.", reason),
        );
        self.events.finished(None);
        ClassifyReport::aborted(journal, reason)
    }
}
