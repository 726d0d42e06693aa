//! Runs classification and undo on their own thread.
//!
//! The caller keeps the event receiver and a cancellation token, so it can show
//! progress and stop the run while the filesystem work carries on.

use crate::classifier::{ClassificationRequest, Classifier, ClassifyReport};
use crate::events::{CancellationToken, EventSink, RunEvent};
use crate::journal::{JournalResult, JournalStore};
use crate::undo::{UndoManager, UndoReport};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

/// A run in progress.
pub struct RunHandle<T> {
    events: Receiver<RunEvent>,
    cancel: CancellationToken,
    handle: JoinHandle<T>,
}

impl<T> RunHandle<T> {
    /// The run's event stream. It ends once the run finishes.
    pub fn events(&self) -> &Receiver<RunEvent> {
        &self.events
    }

    /// A token that stops the run before its next file.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the run and returns its report.
    pub fn join(self) -> thread::Result<T> {
        self.handle.join()
    }
}

/// Starts a classification run on a new thread, stoppable through `cancel`.
pub fn spawn_classify(
    request: ClassificationRequest,
    store: JournalStore,
    cancel: CancellationToken,
) -> io::Result<RunHandle<ClassifyReport>> {
    let (sink, events) = EventSink::channel();
    let classifier = Classifier::new(store)
        .with_events(sink)
        .with_cancellation(cancel.clone());

    let handle = thread::Builder::new()
        .name("namesort-classify".to_string())
        .spawn(move || classifier.run(&request))?;

    Ok(RunHandle {
        events,
        cancel,
        handle,
    })
}

/// Starts undoing the journal at `journal_path` on a new thread.
pub fn spawn_undo(
    journal_path: PathBuf,
    cancel: CancellationToken,
) -> io::Result<RunHandle<JournalResult<UndoReport>>> {
    let (sink, events) = EventSink::channel();
    let manager = UndoManager::new()
        .with_events(sink)
        .with_cancellation(cancel.clone());

    let handle = thread::Builder::new()
        .name("namesort-undo".to_string())
        .spawn(move || manager.undo(&journal_path))?;

    Ok(RunHandle {
        events,
        cancel,
        handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RunOutcome;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_classify_then_undo_on_workers() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("artist_Alice.jpg"), "x").unwrap();
        let store = JournalStore::new(temp_dir.path().join("journals"));

        let request = ClassificationRequest::new(&src, r"artist_([a-z]+)");
        let run = spawn_classify(request, store, CancellationToken::new()).expect("Failed to spawn");
        let events: Vec<RunEvent> = run.events().iter().collect();
        let report = run.join().expect("Worker panicked");

        let journal = report.journal_path.clone().expect("Journal should be saved");
        assert_eq!(events.last(), Some(&RunEvent::Finished(Some(journal.clone()))));
        assert!(src.join("Alice").join("artist_Alice.jpg").exists());

        let undo = spawn_undo(journal, CancellationToken::new()).expect("Failed to spawn");
        let undo_events: Vec<RunEvent> = undo.events().iter().collect();
        let undo_report = undo.join().expect("Worker panicked").expect("Undo failed");

        assert_eq!(undo_report.restored_files, 1);
        assert_eq!(undo_events.last(), Some(&RunEvent::Finished(None)));
        assert!(src.join("artist_Alice.jpg").exists());
    }

    #[test]
    fn test_run_cancelled_midway_is_journaled_and_undoable() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).unwrap();
        let total = 200;
        for i in 0..total {
            fs::write(src.join(format!("artist_x{:03}.jpg", i)), "x").unwrap();
        }
        let store = JournalStore::new(temp_dir.path().join("journals"));

        let request = ClassificationRequest::new(&src, r"artist_([a-z])");
        let run = spawn_classify(request, store, CancellationToken::new()).expect("Failed to spawn");
        for event in run.events().iter() {
            if matches!(event, RunEvent::Progress(_)) {
                run.cancel();
            }
        }
        let report = run.join().expect("Worker panicked");

        assert!(report.processed >= 1);
        assert_eq!(report.journal.actions.len(), report.processed);
        assert_eq!(report.journal_path.is_some(), report.processed > 0);
        if report.processed < total {
            assert_eq!(report.outcome, RunOutcome::Cancelled);
        }
        let moved = fs::read_dir(src.join("x")).unwrap().count();
        assert_eq!(moved, report.processed);

        let journal = report.journal_path.clone().expect("Journal should be saved");
        let undo = spawn_undo(journal, CancellationToken::new()).expect("Failed to spawn");
        for _ in undo.events().iter() {}
        let undo_report = undo.join().expect("Worker panicked").expect("Undo failed");

        assert_eq!(undo_report.restored_files, report.processed);
        assert_eq!(fs::read_dir(src.join("x")).unwrap().count(), 0);
        for i in 0..total {
            assert!(src.join(format!("artist_x{:03}.jpg", i)).exists());
        }
    }

    #[test]
    fn test_cancelled_worker_reports_cancellation() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).unwrap();
        for i in 0..20 {
            fs::write(src.join(format!("artist_x{:02}.jpg", i)), "x").unwrap();
        }
        let store = JournalStore::new(temp_dir.path().join("journals"));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let request = ClassificationRequest::new(&src, r"artist_([a-z])");
        let run = spawn_classify(request, store, cancel).expect("Failed to spawn");
        assert!(run.cancellation().is_cancelled());
        let report = run.join().expect("Worker panicked");

        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert_eq!(report.processed, 0);
        assert!(report.journal_path.is_none());
        assert_eq!(report.journal.actions.len(), report.processed);
    }
}
