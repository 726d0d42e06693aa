/// Undo functionality for reverting classification runs.
///
/// This module replays a saved journal: moved files go back to the name and
/// folder they had before the run, copies are deleted. Records are handled in
/// the order they were written.
use crate::classifier::RunOutcome;
use crate::events::{self, CancellationToken, EventSink, LogKind};
use crate::journal::{ActionRecord, JournalResult, JournalStore, OperationMode};
use crate::naming;
use std::path::{Path, PathBuf};

/// Represents the result of an undo operation.
#[derive(Debug)]
pub struct UndoReport {
    /// Number of moved files put back.
    pub restored_files: usize,
    /// Number of copies deleted.
    pub deleted_copies: usize,
    /// Records whose action failed.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Records skipped because the file was no longer there.
    pub skipped_files: Vec<(PathBuf, String)>,
    pub outcome: RunOutcome,
}

impl UndoReport {
    /// Creates a new empty undo report.
    fn new() -> Self {
        Self {
            restored_files: 0,
            deleted_copies: 0,
            failed_restores: Vec::new(),
            skipped_files: Vec::new(),
            outcome: RunOutcome::Completed,
        }
    }

    /// Returns the total number of records processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files
            + self.deleted_copies
            + self.failed_restores.len()
            + self.skipped_files.len()
    }

    /// Returns true if every record was undone.
    pub fn is_complete_success(&self) -> bool {
        self.outcome == RunOutcome::Completed
            && self.failed_restores.is_empty()
            && self.skipped_files.is_empty()
    }
}

/// What happened to a single record.
enum Step {
    Restored { renamed_to: Option<PathBuf> },
    Deleted,
    Skipped(String),
}

/// Manages undo operations for classification runs.
#[derive(Debug, Clone, Default)]
pub struct UndoManager {
    events: EventSink,
    cancel: CancellationToken,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Undoes the run recorded in the journal at `journal_path`.
    ///
    /// # Returns
    ///
    /// Returns an `UndoReport` describing what was restored, deleted, skipped
    /// and what failed. Returns an error only if the journal cannot be loaded.
    ///
    /// # Edge Cases Handled
    ///
    /// * **File not found**: Skipped with a log line, not an error
    /// * **Name taken at the original location**: Restored under a ` (N)` suffixed name
    /// * **Permission denied**: Recorded as a failure with the error reason
    /// * **Group folders**: Left in place even when they end up empty
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use namesort::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// let result = UndoManager::new().undo(Path::new("classify_moves/_classify_moves_20261017_142530.json"));
    /// match result {
    ///     Ok(report) => println!("Restored {} files", report.restored_files),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo(&self, journal_path: &Path) -> JournalResult<UndoReport> {
        let journal = match JournalStore::load(journal_path) {
            Ok(journal) => journal,
            Err(e) => {
                self.events.log(LogKind::Error, e.to_string());
                self.events.finished(None);
                return Err(e);
            }
        };

        let name = journal_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.events.log(LogKind::Start, format!("Undoing {}", name));

        let mut report = UndoReport::new();
        let total = journal.actions.len();
        if total == 0 {
            self.events
                .log(LogKind::Info, "The journal has no actions to undo.");
            self.events.finished(None);
            return Ok(report);
        }

        let mut handled = 0;
        for record in &journal.actions {
            if self.cancel.is_cancelled() {
                report.outcome = RunOutcome::Cancelled;
                break;
            }
            handled += 1;

            match Self::revert(record) {
                Ok(Step::Restored { renamed_to }) => {
                    report.restored_files += 1;
                    let restored = display_name(&record.origin);
                    match renamed_to {
                        Some(path) => self.events.log(
                            LogKind::Restored,
                            format!("{} (as {})", restored, display_name(&path)),
                        ),
                        None => self.events.log(LogKind::Restored, restored),
                    }
                }
                Ok(Step::Deleted) => {
                    report.deleted_copies += 1;
                    self.events
                        .log(LogKind::Deleted, display_name(&record.origin));
                }
                Ok(Step::Skipped(reason)) => {
                    self.events.log(
                        LogKind::Skipped,
                        format!("{}: {}", reason, record.origin.display()),
                    );
                    report.skipped_files.push((record.origin.clone(), reason));
                }
                Err(reason) => {
                    self.events.log(
                        LogKind::Error,
                        format!("Could not undo {}: {}", record.origin.display(), reason),
                    );
                    report.failed_restores.push((record.origin.clone(), reason));
                }
            }

            self.events.progress(events::percent(handled, total));
        }

        let summary = format!(
            "{} restored, {} copies deleted, {} skipped, {} failed",
            report.restored_files,
            report.deleted_copies,
            report.skipped_files.len(),
            report.failed_restores.len()
        );
        match report.outcome {
            RunOutcome::Cancelled => self.events.log(
                LogKind::Done,
                format!("Cancelled after {} of {} records: {}.", handled, total, summary),
            ),
            _ => self.events.log(
                LogKind::Done,
                format!("Attempted to undo all {} records: {}.", total, summary),
            ),
        }
        self.events.finished(None);

        Ok(report)
    }

    /// Reverses a single record.
    ///
    /// # Returns
    ///
    /// Returns the step taken, or `Err(reason)` on failure.
    fn revert(record: &ActionRecord) -> Result<Step, String> {
        if record.origin.as_os_str().is_empty() {
            return Ok(Step::Skipped("Journal entry names no file".to_string()));
        }

        match record.operation {
            OperationMode::Copy => {
                if !Self::present(&record.origin) {
                    return Ok(Step::Skipped("Copy not found".to_string()));
                }
                naming::remove(&record.origin).map_err(|e| e.to_string())?;
                Ok(Step::Deleted)
            }
            OperationMode::Move => {
                let Some(destination) = &record.destination else {
                    return Err("journal entry has no original location".to_string());
                };

                if let Some(parent) = destination.parent() {
                    naming::ensure_dir(parent).map_err(|e| e.to_string())?;
                }

                if !Self::present(&record.origin) {
                    return Ok(Step::Skipped("File not found".to_string()));
                }

                let landed =
                    naming::move_unique(&record.origin, destination).map_err(|e| e.to_string())?;
                let renamed_to = (landed != *destination).then_some(landed);
                Ok(Step::Restored { renamed_to })
            }
        }
    }

    fn present(path: &Path) -> bool {
        path.exists()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
