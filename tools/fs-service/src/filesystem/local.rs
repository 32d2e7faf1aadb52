use log::{debug, warn};
use std::fs::{self, DirBuilder, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{sniff_mime, sort_paths, FileSystem, FileSystemError, Result};

/// Mode for directories created by `mk_dir` and `copy_path`.
pub const DEFAULT_DIR_MODE: u32 = 0o775;

/// Bytes read from the head of a file for media type detection.
const MIME_SNIFF_LEN: u64 = 8192;

/// Adapter backed by the local disk.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    dir_mode: u32,
}

impl LocalFileSystem {
    pub fn new() -> Self {
        Self::with_dir_mode(DEFAULT_DIR_MODE)
    }

    pub fn with_dir_mode(dir_mode: u32) -> Self {
        Self { dir_mode }
    }

    pub fn dir_mode(&self) -> u32 {
        self.dir_mode
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(self.dir_mode);
        }
        builder.create(path)?;
        Ok(())
    }

    fn copy_tree(&self, src: &Path, dst: &Path) -> Result<()> {
        for entry in WalkDir::new(src) {
            let entry = entry.map_err(io::Error::from)?;
            let relative = entry
                .path()
                .strip_prefix(src)
                .map_err(|e| FileSystemError::PathError(e.to_string()))?;
            let target = dst.join(relative);

            // WalkDir does not follow links, so a linked directory shows up here
            if entry.path_is_symlink() && entry.path().is_dir() {
                debug!("Skipping symlinked directory: {}", entry.path().display());
                continue;
            }

            if entry.file_type().is_dir() {
                self.create_dir_all(&target)?;
            } else {
                fs::copy(entry.path(), &target)?;
                debug!("Copied: {} -> {}", entry.path().display(), target.display());
            }
        }
        Ok(())
    }
}

impl Default for LocalFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn io_error(err: io::Error, path: &Path) -> FileSystemError {
    if err.kind() == io::ErrorKind::NotFound {
        FileSystemError::NotFound(path.to_path_buf())
    } else {
        err.into()
    }
}

/// Files under `path`, skipping restricted directories. Unsorted.
///
/// `ancestors` holds the resolved directories of the current descent, so a
/// link back to one of them is not entered again.
fn list_files(
    path: &Path,
    restrict: &[PathBuf],
    ancestors: &mut Vec<PathBuf>,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(path).map_err(|e| io_error(e, path))? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Skipping unreadable entry in {}: {}", path.display(), e);
                continue;
            }
        };

        let full_path = match fs::canonicalize(entry.path()) {
            Ok(p) => p,
            Err(e) => {
                debug!("Skipping unresolvable entry {}: {}", entry.path().display(), e);
                continue;
            }
        };

        if !full_path.is_dir() {
            files.push(full_path);
        } else if restrict.contains(&full_path) {
            debug!("Skipping restricted directory: {}", full_path.display());
        } else if ancestors.contains(&full_path) {
            warn!(
                "Skipping directory loop: {} -> {}",
                entry.path().display(),
                full_path.display()
            );
        } else {
            ancestors.push(full_path.clone());
            let nested = list_files(&full_path, restrict, ancestors)?;
            ancestors.pop();
            files.extend(nested);
        }
    }

    Ok(files)
}

impl FileSystem for LocalFileSystem {
    fn name(&self) -> &'static str {
        "local"
    }

    fn write(&self, data: &[u8], filename: &str, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(filename);
        fs::write(&path, data)?;
        debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(dir.to_path_buf())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        if path.is_dir() {
            return Err(FileSystemError::IsADirectory(path.to_path_buf()));
        }
        fs::read(path).map_err(|e| io_error(e, path))
    }

    fn delete(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            return Err(FileSystemError::IsADirectory(path.to_path_buf()));
        }
        fs::remove_file(path).map_err(|e| io_error(e, path))?;
        debug!("Deleted: {}", path.display());
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn mime(&self, path: &Path) -> Option<String> {
        let file = File::open(path).ok()?;
        let mut head = Vec::new();
        file.take(MIME_SNIFF_LEN).read_to_end(&mut head).ok()?;
        Some(sniff_mime(&head))
    }

    fn mk_dir(&self, path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        self.create_dir_all(path)?;
        debug!("Created directory: {}", path.display());
        Ok(true)
    }

    fn copy_path(&self, src: &Path, dst: &Path) -> Result<bool> {
        if !src.exists() {
            debug!("Copy source does not exist: {}", src.display());
            return Ok(false);
        }

        if !src.is_dir() {
            if dst.is_dir() {
                warn!("Cannot copy file {} onto directory {}", src.display(), dst.display());
                return Ok(false);
            }
            if let Some(parent) = dst.parent() {
                self.create_dir_all(parent)?;
            }
            fs::copy(src, dst)?;
            debug!("Copied: {} -> {}", src.display(), dst.display());
            return Ok(true);
        }

        if !dst.is_dir() {
            warn!("Cannot copy directory {} to non-directory {}", src.display(), dst.display());
            return Ok(false);
        }

        let src_real = fs::canonicalize(src)?;
        let dst_real = fs::canonicalize(dst)?;
        if dst_real.starts_with(&src_real) {
            warn!("Cannot copy directory {} into itself ({})", src.display(), dst.display());
            return Ok(false);
        }

        self.copy_tree(&src_real, &dst_real)?;
        Ok(true)
    }

    fn dir(&self, path: &Path, restrict: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let root = fs::canonicalize(path).map_err(|e| io_error(e, path))?;
        let mut ancestors = vec![root.clone()];
        let mut files = list_files(&root, restrict, &mut ancestors)?;
        sort_paths(&mut files);
        Ok(files)
    }
}
