//! Progress and log events emitted by a run, and the token used to stop one.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

/// Category of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Start,
    Moved,
    Copied,
    Skipped,
    Error,
    Warning,
    Info,
    Done,
    Journal,
    Restored,
    Deleted,
}

impl LogKind {
    /// The bracketed tag printed in front of the message.
    pub fn tag(&self) -> &'static str {
        match self {
            LogKind::Start => "[start]",
            LogKind::Moved => "[moved]",
            LogKind::Copied => "[copied]",
            LogKind::Skipped => "[skipped]",
            LogKind::Error => "[error]",
            LogKind::Warning => "[warning]",
            LogKind::Info => "[info]",
            LogKind::Done => "[done]",
            LogKind::Journal => "[journal]",
            LogKind::Restored => "[restored]",
            LogKind::Deleted => "[deleted]",
        }
    }
}

/// One human-readable line of run output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LogKind,
    pub message: String,
}

impl std::fmt::Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind.tag(), self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Percentage of items handled so far, 0 to 100.
    Progress(u8),
    Log(LogLine),
    /// Sent once at the end. Carries the journal path for a classification run
    /// that recorded something, `None` otherwise.
    Finished(Option<PathBuf>),
}

/// Sending half of a run's event stream.
///
/// Events sent after the receiver is gone are dropped; a run never fails
/// because nobody is listening.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<Sender<RunEvent>>,
}

impl EventSink {
    /// Creates a connected sink/receiver pair.
    pub fn channel() -> (Self, Receiver<RunEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A sink that discards everything.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    pub fn progress(&self, percent: u8) {
        self.emit(RunEvent::Progress(percent.min(100)));
    }

    pub fn log(&self, kind: LogKind, message: impl Into<String>) {
        self.emit(RunEvent::Log(LogLine {
            kind,
            message: message.into(),
        }));
    }

    pub fn finished(&self, journal: Option<PathBuf>) {
        self.emit(RunEvent::Finished(journal));
    }
}

/// Integer percentage of `done` out of `total`; reaches 100 only when `done == total`.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done.min(total) * 100) / total) as u8
}

/// Cooperative stop flag shared between a run and whoever started it.
///
/// Clones share the same flag. Runs check it once per file.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
