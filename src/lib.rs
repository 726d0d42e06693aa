//! namesort - sort files into folders named after part of their file name
//!
//! This library provides the pieces behind the `namesort` tool: conflict-free
//! destination naming, single-level file enumeration, regex group extraction,
//! the classification and undo engines, and the journal store that links them.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod enumerate;
pub mod events;
pub mod journal;
pub mod naming;
pub mod output;
pub mod pattern;
pub mod preview;
pub mod undo;
pub mod worker;

pub use classifier::{ClassificationRequest, Classifier, ClassifyReport, RunOutcome};
pub use config::{Config, ConfigError};
pub use enumerate::ExtensionFilter;
pub use events::{CancellationToken, EventSink, LogKind, LogLine, RunEvent};
pub use journal::{ActionRecord, Journal, JournalError, JournalStore, OperationMode};
pub use pattern::{CompiledPattern, MatchOutcome, PatternError};
pub use undo::{UndoManager, UndoReport};

pub use cli::{Cli, run_cli};
