//! Read-only look at how a pattern would classify a directory.

use crate::enumerate::{self, ExtensionFilter};
use crate::pattern::{CompiledPattern, MatchOutcome};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// Maximum number of files a preview annotates.
pub const PREVIEW_LIMIT: usize = 101;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub name: String,
    pub outcome: MatchOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    pub entries: Vec<PreviewEntry>,
    /// More eligible files exist beyond `entries`.
    pub has_more: bool,
}

impl Preview {
    /// How many previewed files would land in each group folder.
    pub fn group_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for group in self.entries.iter().filter_map(|e| e.outcome.group()) {
            *counts.entry(group.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Annotates up to [`PREVIEW_LIMIT`] eligible files in `dir`, in run order.
pub fn preview(
    dir: &Path,
    pattern: &CompiledPattern,
    filter: &ExtensionFilter,
) -> io::Result<Preview> {
    let files = enumerate::snapshot(dir, filter)?;
    let has_more = files.len() > PREVIEW_LIMIT;

    let entries = files
        .iter()
        .take(PREVIEW_LIMIT)
        .filter_map(|path| path.file_name())
        .map(|name| {
            let name = name.to_string_lossy().to_string();
            let outcome = pattern.classify(&name);
            PreviewEntry { name, outcome }
        })
        .collect();

    Ok(Preview { entries, has_more })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_preview_annotates_each_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("artist_Alice.jpg"), "x").unwrap();
        fs::write(base.join("bob.jpg"), "x").unwrap();
        fs::write(base.join("skip.txt"), "x").unwrap();

        let pattern = CompiledPattern::compile(r"artist_([a-z]+)|(bob)", true).unwrap();
        let result = preview(base, &pattern, &ExtensionFilter::parse("jpg")).unwrap();

        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].name, "artist_Alice.jpg");
        assert_eq!(result.entries[0].outcome.group(), Some("Alice"));
        assert_eq!(result.entries[1].outcome, MatchOutcome::NoGroup);
        assert!(!result.has_more);
        assert_eq!(result.group_counts().get("Alice"), Some(&1));
    }

    #[test]
    fn test_preview_is_capped() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for i in 0..(PREVIEW_LIMIT + 5) {
            fs::write(temp_dir.path().join(format!("f{:03}.jpg", i)), "x").unwrap();
        }

        let pattern = CompiledPattern::compile(r"f(\d)", true).unwrap();
        let result = preview(temp_dir.path(), &pattern, &ExtensionFilter::default()).unwrap();

        assert_eq!(result.entries.len(), PREVIEW_LIMIT);
        assert!(result.has_more);
    }

    #[test]
    fn test_preview_touches_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("artist_a.jpg"), "x").unwrap();

        let pattern = CompiledPattern::compile(r"artist_([a-z])", true).unwrap();
        preview(temp_dir.path(), &pattern, &ExtensionFilter::default()).unwrap();

        assert!(temp_dir.path().join("artist_a.jpg").exists());
        assert!(!temp_dir.path().join("a").exists());
    }
}
