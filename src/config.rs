//! Default settings loaded from a TOML configuration file.
//!
//! Nothing in here is global: the CLI loads a [`Config`] once and turns it,
//! together with its own flags, into an explicit
//! [`ClassificationRequest`](crate::classifier::ClassificationRequest).
//!
//! # Configuration File Format
//!
//! ```toml
//! [defaults]
//! pattern = 'artist[_\s-]*([^,]+)'
//! extensions = "jpg, jpeg, png, webp, bmp, gif"
//! mode = "move"
//! case_insensitive = true
//!
//! [journal]
//! directory = "/home/me/.local/share/namesort"
//! ```

use crate::enumerate::ExtensionFilter;
use crate::journal::{JournalResult, JournalStore, OperationMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Pattern used when neither the command line nor a config file names one.
pub const DEFAULT_PATTERN: &str = r"artist[_\s-]*([^,]+)";

/// Errors that can occur during configuration loading.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Named extension lists for common kinds of files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionPreset {
    Images,
    Documents,
    Other,
}

impl ExtensionPreset {
    pub fn extensions(&self) -> &'static str {
        match self {
            ExtensionPreset::Images => "jpg, jpeg, png, webp, bmp, gif",
            ExtensionPreset::Documents => "pdf, doc, docx, xls, xlsx, ppt, pptx, txt, md",
            ExtensionPreset::Other => "zip, 7z, rar, mp4, mp3, wav",
        }
    }

    pub fn filter(&self) -> ExtensionFilter {
        ExtensionFilter::parse(self.extensions())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: RunDefaults,
    #[serde(default)]
    pub journal: JournalSettings,
}

/// Values used for any run setting the command line leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDefaults {
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Comma-separated extension list. Empty means every file.
    #[serde(default = "default_extensions")]
    pub extensions: String,
    #[serde(default)]
    pub mode: OperationMode,
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            extensions: default_extensions(),
            mode: OperationMode::Move,
            case_insensitive: default_case_insensitive(),
        }
    }
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

fn default_extensions() -> String {
    ExtensionPreset::Images.extensions().to_string()
}

fn default_case_insensitive() -> bool {
    true
}

/// Where journals are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalSettings {
    /// Overrides the `classify_moves/` directory next to the executable.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.namesortrc.toml` in the current directory
    /// 3. Look for `~/.config/namesort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be
    /// read, or if any file found is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".namesortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("namesort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// The journal store to use, honoring an explicit override first.
    pub fn journal_store(&self, override_dir: Option<&Path>) -> JournalResult<JournalStore> {
        match override_dir.or(self.journal.directory.as_deref()) {
            Some(dir) => Ok(JournalStore::new(dir)),
            None => JournalStore::beside_executable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.pattern, DEFAULT_PATTERN);
        assert_eq!(config.defaults.mode, OperationMode::Move);
        assert!(config.defaults.case_insensitive);
        assert_eq!(
            ExtensionFilter::parse(&config.defaults.extensions),
            ExtensionPreset::Images.filter()
        );
        assert!(config.journal.directory.is_none());
    }

    #[test]
    fn test_load_full_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[defaults]
pattern = '#(\d+)'
extensions = "pdf"
mode = "copy"
case_insensitive = false

[journal]
directory = "/var/tmp/journals"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).expect("Config should load");
        assert_eq!(config.defaults.pattern, r"#(\d+)");
        assert_eq!(config.defaults.extensions, "pdf");
        assert_eq!(config.defaults.mode, OperationMode::Copy);
        assert!(!config.defaults.case_insensitive);
        assert_eq!(
            config.journal.directory,
            Some(PathBuf::from("/var/tmp/journals"))
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[defaults]\nmode = \"copy\"\n").unwrap();

        let config = Config::load(Some(&path)).expect("Config should load");
        assert_eq!(config.defaults.mode, OperationMode::Copy);
        assert_eq!(config.defaults.pattern, DEFAULT_PATTERN);
        assert!(config.defaults.case_insensitive);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::load(Some(Path::new("/non/existent/config.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[defaults\nmode = ").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_unknown_mode_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[defaults]\nmode = \"rename\"\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_journal_store_precedence() {
        let mut config = Config::default();
        config.journal.directory = Some(PathBuf::from("/from/config"));

        let store = config.journal_store(Some(Path::new("/from/flag"))).unwrap();
        assert_eq!(store.dir(), Path::new("/from/flag"));

        let store = config.journal_store(None).unwrap();
        assert_eq!(store.dir(), Path::new("/from/config"));

        let store = Config::default().journal_store(None).unwrap();
        assert!(store.dir().ends_with("classify_moves"));
    }

    #[test]
    fn test_presets() {
        assert!(ExtensionPreset::Images.filter().allows(Path::new("a.webp")));
        assert!(ExtensionPreset::Documents.filter().allows(Path::new("a.MD")));
        assert!(ExtensionPreset::Other.filter().allows(Path::new("a.7z")));
        assert!(!ExtensionPreset::Images.filter().allows(Path::new("a.pdf")));
    }
}
