/// Journal persistence for undoing classification runs.
///
/// Each run that touched at least one file leaves one JSON document in the
/// journal directory, named after the time the run started:
///
/// ```json
/// {
///   "moves": [
///     { "op": "move", "from": "/pics/Alice/a.jpg", "to": "/pics/a.jpg" },
///     { "op": "copy", "from": "/pics/Bob/b.png" }
///   ],
///   "base": "/pics",
///   "regex": "artist[_\\s-]*([A-Za-z]+)",
///   "exts": ["jpg", "png"],
///   "time": "20261017_142530",
///   "op_mode": "move"
/// }
/// ```
use crate::naming;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the journal directory next to the executable.
pub const JOURNAL_DIR_NAME: &str = "classify_moves";

const FILE_PREFIX: &str = "_classify_moves_";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Whether files are moved into their group folder or copied there.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    #[default]
    Move,
    Copy,
}

impl OperationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationMode::Move => "move",
            OperationMode::Copy => "copy",
        }
    }
}

impl std::fmt::Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed filesystem action.
///
/// For a move, `origin` is where the file now lives and `destination` is the
/// path it had before the run, so undo moves it from `origin` back to
/// `destination`. For a copy, `origin` is the copy and there is no destination.
///
/// Reading never fails on a single entry: a missing or non-text `from` becomes
/// an empty path, and any `op` other than `"copy"` is a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ActionRecord {
    #[serde(rename = "op")]
    pub operation: OperationMode,
    #[serde(rename = "from")]
    pub origin: PathBuf,
    #[serde(rename = "to", skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
}

impl ActionRecord {
    /// Records a file moved to `now_at` from its pre-run location `was_at`.
    pub fn moved(now_at: PathBuf, was_at: PathBuf) -> Self {
        Self {
            operation: OperationMode::Move,
            origin: now_at,
            destination: Some(was_at),
        }
    }

    /// Records a new copy at `copy`.
    pub fn copied(copy: PathBuf) -> Self {
        Self {
            operation: OperationMode::Copy,
            origin: copy,
            destination: None,
        }
    }
}

impl From<Value> for ActionRecord {
    fn from(entry: Value) -> Self {
        let path = |key: &str| entry.get(key).and_then(Value::as_str).map(PathBuf::from);
        Self {
            operation: journal_mode(entry.get("op")),
            origin: path("from").unwrap_or_default(),
            destination: path("to"),
        }
    }
}

fn journal_mode(value: Option<&Value>) -> OperationMode {
    match value.and_then(Value::as_str) {
        Some("copy") => OperationMode::Copy,
        _ => OperationMode::Move,
    }
}

fn lenient_mode<'de, D>(deserializer: D) -> Result<OperationMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(journal_mode(Some(&value)))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The record of one classification run.
///
/// Absent or `null` fields read as empty values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    #[serde(rename = "moves", default, deserialize_with = "null_as_default")]
    pub actions: Vec<ActionRecord>,
    #[serde(rename = "base", default, deserialize_with = "null_as_default")]
    pub source_directory: PathBuf,
    #[serde(rename = "regex", default, deserialize_with = "null_as_default")]
    pub pattern: String,
    #[serde(rename = "exts", default, deserialize_with = "null_as_default")]
    pub extensions: Vec<String>,
    #[serde(rename = "time", default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(rename = "op_mode", default, deserialize_with = "lenient_mode")]
    pub operation_mode: OperationMode,
}

impl Journal {
    /// Starts an empty journal stamped with the current local time.
    pub fn new(
        source_directory: PathBuf,
        pattern: String,
        extensions: Vec<String>,
        operation_mode: OperationMode,
    ) -> Self {
        Self {
            actions: Vec::new(),
            source_directory,
            pattern,
            extensions,
            created_at: chrono::Local::now().format(STAMP_FORMAT).to_string(),
            operation_mode,
        }
    }

    pub fn record(&mut self, action: ActionRecord) {
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Parses `created_at` back into a timestamp, if it has the usual shape.
    pub fn created_at_time(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDateTime::parse_from_str(&self.created_at, STAMP_FORMAT).ok()
    }
}

/// Errors that can occur while saving or loading journals.
#[derive(Debug)]
pub enum JournalError {
    /// The journal file could not be read.
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The journal file is not a usable journal document.
    InvalidFormat { path: PathBuf, reason: String },
    /// The journal could not be written.
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The location of the running executable could not be determined.
    NoJournalDirectory { source: std::io::Error },
}

impl std::fmt::Display for JournalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailed { path, source } => {
                write!(f, "Failed to read journal {}: {}", path.display(), source)
            }
            Self::InvalidFormat { path, reason } => {
                write!(f, "Invalid journal {}: {}", path.display(), reason)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "Failed to write journal {}: {}", path.display(), source)
            }
            Self::NoJournalDirectory { source } => {
                write!(f, "Could not locate the journal directory: {}", source)
            }
        }
    }
}

impl std::error::Error for JournalError {}

pub type JournalResult<T> = Result<T, JournalError>;

/// A directory of journal files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalStore {
    dir: PathBuf,
}

impl JournalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The default store: `classify_moves/` next to the running executable.
    pub fn beside_executable() -> JournalResult<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| JournalError::NoJournalDirectory { source: e })?;
        let dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(dir.join(JOURNAL_DIR_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `journal` to a new file and returns its path.
    ///
    /// The name embeds `created_at`; a second run within the same second gets a
    /// ` (1)` suffix instead of overwriting the first.
    pub fn save(&self, journal: &Journal) -> JournalResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| JournalError::WriteFailed {
            path: self.dir.clone(),
            source: e,
        })?;

        let desired = self
            .dir
            .join(format!("{}{}.json", FILE_PREFIX, journal.created_at));
        let path = naming::resolve(&desired);

        let json = serde_json::to_string_pretty(journal).map_err(|e| JournalError::WriteFailed {
            path: path.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            ),
        })?;

        fs::write(&path, json).map_err(|e| JournalError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;

        Ok(path)
    }

    /// Reads a journal file.
    ///
    /// Absent or `null` fields fall back to empty values, and a malformed entry
    /// in `moves` is kept for undo to pass over. A document that is not a JSON
    /// object, or whose other fields have the wrong shape, is rejected.
    pub fn load(path: &Path) -> JournalResult<Journal> {
        let content = fs::read_to_string(path).map_err(|e| JournalError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|e| JournalError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!("JSON parse error: {}", e),
            })?;

        if !value.is_object() {
            return Err(JournalError::InvalidFormat {
                path: path.to_path_buf(),
                reason: "expected a JSON object at the top level".to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| JournalError::InvalidFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// All journal files in the store, oldest first.
    ///
    /// A store directory that does not exist yet simply has no journals.
    pub fn list(&self) -> JournalResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(JournalError::ReadFailed {
                    path: self.dir.clone(),
                    source: e,
                });
            }
        };

        let mut journals: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default();
                name.starts_with(FILE_PREFIX) && name.ends_with(".json") && path.is_file()
            })
            .collect();
        journals.sort_by_key(|path| sort_key(path));
        Ok(journals)
    }

    /// The most recent journal, if any.
    pub fn latest(&self) -> JournalResult<Option<PathBuf>> {
        Ok(self.list()?.pop())
    }
}

/// Orders `X.json` before `X (1).json` before `X (2).json`.
fn sort_key(path: &Path) -> (String, u64) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    if let Some(open) = stem.rfind(" (")
        && let Some(index) = stem[open + 2..]
            .strip_suffix(')')
            .and_then(|n| n.parse::<u64>().ok())
    {
        return (stem[..open].to_string(), index);
    }
    (stem, 0)
}
