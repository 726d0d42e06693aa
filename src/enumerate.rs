//! Single-level file enumeration with an extension allow-list.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A set of lowercase extensions without leading dots. Empty means every file passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Parses a comma-separated list such as `"jpg, .PNG ,gif"`.
    ///
    /// Entries are trimmed, lowercased and stripped of leading dots; blank entries
    /// are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use namesort::enumerate::ExtensionFilter;
    ///
    /// let filter = ExtensionFilter::parse("jpg, .PNG ,, gif");
    /// assert_eq!(filter.sorted(), vec!["gif", "jpg", "png"]);
    /// ```
    pub fn parse(text: &str) -> Self {
        text.split(',').collect()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// The extensions in sorted order, as stored in a journal.
    pub fn sorted(&self) -> Vec<String> {
        self.extensions.iter().cloned().collect()
    }

    /// Case-insensitive check of a path's final extension.
    pub fn allows(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.extensions.contains(&ext)
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExtensionFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let extensions = iter
            .into_iter()
            .map(|part| part.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|part| !part.is_empty())
            .collect();
        Self { extensions }
    }
}

/// Lazily lists the regular files directly inside `dir` that pass `filter`.
///
/// Subdirectories are never entered. Symlinks count as the file they point to,
/// so a link to a regular file is listed and a dangling link is not. Entries
/// that cannot be inspected are silently passed over.
pub fn enumerate<'a>(
    dir: &Path,
    filter: &'a ExtensionFilter,
) -> io::Result<impl Iterator<Item = PathBuf> + 'a> {
    let entries = fs::read_dir(dir)?;
    Ok(entries.flatten().filter_map(move |entry| {
        let path = entry.path();
        (path.is_file() && filter.allows(&path)).then_some(path)
    }))
}

/// Takes the fixed list a run works from, ordered by file name.
///
/// The list is captured before any file is touched, so subfolders created during
/// the run are never picked up.
pub fn snapshot(dir: &Path, filter: &ExtensionFilter) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = enumerate(dir, filter)?.collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_normalizes_entries() {
        let filter = ExtensionFilter::parse(" JPG, .png,..Gif , ,");
        assert_eq!(filter.sorted(), vec!["gif", "jpg", "png"]);
    }

    #[test]
    fn test_parse_empty_means_all() {
        let filter = ExtensionFilter::parse("  ");
        assert!(filter.is_empty());
        assert!(filter.allows(Path::new("anything.bin")));
        assert!(filter.allows(Path::new("no_extension")));
    }

    #[test]
    fn test_allows_is_case_insensitive() {
        let filter = ExtensionFilter::parse("jpg");
        assert!(filter.allows(Path::new("a.JPG")));
        assert!(filter.allows(Path::new("a.jpg")));
        assert!(!filter.allows(Path::new("a.jpeg")));
        assert!(!filter.allows(Path::new("jpg")));
    }

    #[test]
    fn test_allows_uses_last_extension() {
        let filter = ExtensionFilter::parse("gz");
        assert!(filter.allows(Path::new("archive.tar.gz")));
        assert!(!ExtensionFilter::parse("tar").allows(Path::new("archive.tar.gz")));
    }

    #[test]
    fn test_enumerate_skips_directories_and_filtered_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("b.jpg"), "x").expect("Failed to write file");
        fs::write(base.join("a.PNG"), "x").expect("Failed to write file");
        fs::write(base.join("note.txt"), "x").expect("Failed to write file");
        fs::create_dir(base.join("folder.jpg")).expect("Failed to create dir");
        fs::write(base.join("folder.jpg").join("inner.jpg"), "x").expect("Failed to write file");

        let filter = ExtensionFilter::parse("jpg,png");
        let files = snapshot(base, &filter).expect("Failed to enumerate");

        assert_eq!(files, vec![base.join("a.PNG"), base.join("b.jpg")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_enumerate_follows_symlinks_to_files() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let outside = TempDir::new().expect("Failed to create temp directory");
        fs::write(outside.path().join("real.jpg"), "x").expect("Failed to write file");
        fs::create_dir(outside.path().join("dir.jpg")).expect("Failed to create dir");

        symlink(outside.path().join("real.jpg"), base.join("link.jpg")).unwrap();
        symlink(outside.path().join("dir.jpg"), base.join("dirlink.jpg")).unwrap();
        symlink(outside.path().join("gone.jpg"), base.join("dangling.jpg")).unwrap();

        let files = snapshot(base, &ExtensionFilter::parse("jpg")).expect("Failed to enumerate");
        assert_eq!(files, vec![base.join("link.jpg")]);
    }

    #[test]
    fn test_enumerate_missing_directory_fails() {
        let filter = ExtensionFilter::default();
        assert!(enumerate(Path::new("/non/existent/path"), &filter).is_err());
    }
}
