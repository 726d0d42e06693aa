/// Conflict-free destination naming and the file actions built on it.
///
/// Every move or copy performed by namesort goes through [`resolve`] first, so an
/// existing file is never overwritten: a taken name `photo.jpg` becomes
/// `photo (1).jpg`, then `photo (2).jpg`, and so on.
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The kind of filesystem action that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Move,
    Copy,
    Delete,
    CreateDir,
}

impl ActionKind {
    fn verb(&self) -> &'static str {
        match self {
            ActionKind::Move => "move",
            ActionKind::Copy => "copy",
            ActionKind::Delete => "delete",
            ActionKind::CreateDir => "create directory",
        }
    }
}

/// A single file's action failed. The run that hit it carries on.
#[derive(Debug)]
pub struct ActionError {
    pub action: ActionKind,
    pub path: PathBuf,
    pub source: io::Error,
}

impl ActionError {
    fn new(action: ActionKind, path: &Path, source: io::Error) -> Self {
        Self {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to {} {}: {}",
            self.action.verb(),
            self.path.display(),
            self.source
        )
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

/// Returns true if anything (file, directory, or even a dangling symlink) sits at `path`.
pub fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Returns a path that does not collide with existing content.
///
/// If `desired` is free it is returned unchanged. Otherwise `stem (N)ext` is probed
/// for N = 1, 2, ... and the first free candidate is returned.
///
/// # Examples
///
/// ```no_run
/// use namesort::naming::resolve;
/// use std::path::Path;
///
/// // With "Alice/pic.jpg" already present this yields "Alice/pic (1).jpg".
/// let target = resolve(Path::new("Alice/pic.jpg"));
/// ```
pub fn resolve(desired: &Path) -> PathBuf {
    if !is_occupied(desired) {
        return desired.to_path_buf();
    }

    let mut index: u64 = 1;
    loop {
        let candidate = suffixed(desired, index);
        if !is_occupied(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

/// Builds `dir/stem (index)ext` from `dir/stem.ext`.
///
/// A leading-dot name such as `.profile` has no extension, so the suffix goes at
/// the end; `archive.tar.gz` becomes `archive.tar (1).gz`.
pub fn suffixed(path: &Path, index: u64) -> PathBuf {
    let mut name: OsString = path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(format!(" ({})", index));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }

    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Creates `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> ActionResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| ActionError::new(ActionKind::CreateDir, dir, e))
}

/// Moves `source` to a free name derived from `desired` and returns where it landed.
///
/// Resolution and the move happen back to back. Nothing stops another process from
/// claiming the name in between; namesort assumes one run per directory at a time.
pub fn move_unique(source: &Path, desired: &Path) -> ActionResult<PathBuf> {
    let target = resolve(desired);
    move_file(source, &target).map_err(|e| ActionError::new(ActionKind::Move, source, e))?;
    Ok(target)
}

/// Copies `source` to a free name derived from `desired` and returns the copy's path.
pub fn copy_unique(source: &Path, desired: &Path) -> ActionResult<PathBuf> {
    let target = resolve(desired);
    copy_file(source, &target).map_err(|e| ActionError::new(ActionKind::Copy, source, e))?;
    Ok(target)
}

/// Deletes a single file.
pub fn remove(path: &Path) -> ActionResult<()> {
    fs::remove_file(path).map_err(|e| ActionError::new(ActionKind::Delete, path, e))
}

fn move_file(source: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_file(source, target)?;
            fs::remove_file(source).inspect_err(|_| {
                let _ = fs::remove_file(target);
            })
        }
        Err(e) => Err(e),
    }
}

/// Copies contents and permissions, then carries over the modification time.
///
/// On failure no partial copy is left behind at `target`.
fn copy_file(source: &Path, target: &Path) -> io::Result<()> {
    fs::copy(source, target)?;
    carry_modified(source, target).inspect_err(|_| {
        let _ = fs::remove_file(target);
    })
}

// The copy may be read-only, so the handle is opened for reading. The owner
// can still set its times.
fn carry_modified(source: &Path, target: &Path) -> io::Result<()> {
    let modified = fs::metadata(source)?.modified()?;
    fs::File::open(target)?.set_modified(modified)
}
