mod local;

pub use local::{LocalFileSystem, DEFAULT_DIR_MODE};

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileSystemError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Not found: {0}")]
    NotFound(PathBuf),

    #[error("Is a directory: {0}")]
    IsADirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

/// Operations every storage adapter provides.
///
/// All calls block until the backing store answers. Adapters hold no
/// per-call state, so a single instance can serve the whole process.
pub trait FileSystem: Debug + Send + Sync {
    /// Short identifier of the adapter, e.g. `local`.
    fn name(&self) -> &'static str;

    /// Writes `data` to `dir/filename`, replacing an existing file.
    ///
    /// `dir` must already exist. Returns `dir` on success.
    fn write(&self, data: &[u8], filename: &str, dir: &Path) -> Result<PathBuf>;

    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Removes a file. Fails when the path is missing or is a directory.
    fn delete(&self, path: &Path) -> Result<()>;

    fn extension(&self, path: &Path) -> Option<String> {
        extension(path)
    }

    fn is_dir(&self, path: &Path) -> bool;

    /// Media type sniffed from the file contents, `None` if unreadable.
    fn mime(&self, path: &Path) -> Option<String>;

    /// Creates `path` and any missing parents.
    ///
    /// Returns `Ok(false)` without touching anything when `path` exists.
    fn mk_dir(&self, path: &Path) -> Result<bool>;

    fn relative_path(&self, full_path: &Path, file_name: &str, base_path: Option<&Path>) -> String {
        relative_path(full_path, file_name, base_path)
    }

    /// Copies a file to a file path, or a directory tree into a directory.
    ///
    /// Returns `Ok(false)` and changes nothing when the source is missing
    /// or when a directory would be copied onto an existing file.
    fn copy_path(&self, src: &Path, dst: &Path) -> Result<bool>;

    /// Sorted list of every file below `path`.
    ///
    /// Directories whose resolved path appears in `restrict` are neither
    /// listed nor descended into. Matching is exact, so `restrict` should
    /// hold canonical paths.
    fn dir(&self, path: &Path, restrict: &[PathBuf]) -> Result<Vec<PathBuf>>;
}

/// Text after the last dot of the final path component.
pub fn extension(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().into_owned())
}

/// `full_path` relative to `base_path`, with a trailing `/`.
///
/// A trailing `file_name` component is dropped first. Without a base the
/// parent of the remaining directory is used.
pub fn relative_path(full_path: &Path, file_name: &str, base_path: Option<&Path>) -> String {
    let mut dir = full_path.to_path_buf();
    if !file_name.is_empty() && dir.file_name().is_some_and(|name| name == file_name) {
        dir.pop();
    }

    let base = match base_path {
        Some(base) => base.to_path_buf(),
        None => dir.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    let relative = dir.strip_prefix(&base).unwrap_or(&dir);
    let relative = relative.to_string_lossy();
    format!("{}/", relative.trim_start_matches('/'))
}

/// Sorts paths by their string form, byte by byte.
///
/// `Path` ordering compares components, which puts `foo/bar.rs` before
/// `foo.rs`; listings use plain string order instead.
pub(crate) fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| a.as_os_str().as_encoded_bytes().cmp(b.as_os_str().as_encoded_bytes()));
}

/// Media type for a buffer: magic numbers first, then text or binary.
///
/// `content` may be a truncated head of the file, so a multi-byte
/// character cut off at the end still counts as text.
pub(crate) fn sniff_mime(content: &[u8]) -> String {
    if let Some(kind) = infer::get(content) {
        return kind.mime_type().to_string();
    }
    let is_text = match std::str::from_utf8(content) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    };
    if is_text {
        "text/plain".to_string()
    } else {
        "application/octet-stream".to_string()
    }
}
