use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::filesystem::{sniff_mime, sort_paths, FileSystem, FileSystemError, Result};

#[derive(Debug, Default)]
struct Tree {
    files: HashMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
}

impl Tree {
    fn is_dir(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }

    fn add_directory_all(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.directories.insert(ancestor.to_path_buf());
        }
    }

    /// Fails when a file sits where a parent directory of `path` would go.
    fn check_no_file_ancestor(&self, path: &Path) -> Result<()> {
        match path.ancestors().skip(1).find(|a| self.files.contains_key(*a)) {
            Some(file) => Err(FileSystemError::PathError(format!(
                "{} is a file, cannot create {}",
                file.display(),
                path.display()
            ))),
            None => Ok(()),
        }
    }
}

/// Adapter that keeps the whole tree in memory.
///
/// Clones share the same tree. Paths are taken as given: there is no
/// symlink or `..` resolution, so the listing's "resolved path" is the
/// path itself.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    tree: Arc<Mutex<Tree>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        let mut tree = Tree::default();
        tree.directories.insert(PathBuf::from("/"));
        Self {
            tree: Arc::new(Mutex::new(tree)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a file, creating its parent directories.
    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        let path = path.into();
        let mut tree = self.lock();
        if let Some(parent) = path.parent() {
            tree.add_directory_all(parent);
        }
        tree.files.insert(path, content.into());
    }

    pub fn add_directory(&self, path: impl Into<PathBuf>) {
        self.lock().add_directory_all(&path.into());
    }

    pub fn get_file_content(&self, path: &Path) -> Option<Vec<u8>> {
        self.lock().files.get(path).cloned()
    }

    pub fn list_all_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.lock().files.keys().cloned().collect();
        sort_paths(&mut files);
        files
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemoryFileSystem {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn write(&self, data: &[u8], filename: &str, dir: &Path) -> Result<PathBuf> {
        let mut tree = self.lock();
        if !tree.is_dir(dir) {
            return Err(FileSystemError::NotFound(dir.to_path_buf()));
        }

        let path = dir.join(filename);
        if tree.is_dir(&path) {
            return Err(FileSystemError::IsADirectory(path));
        }
        tree.check_no_file_ancestor(&path)?;
        if let Some(parent) = path.parent() {
            if !tree.is_dir(parent) {
                return Err(FileSystemError::NotFound(parent.to_path_buf()));
            }
        }

        debug!("Wrote {} bytes to {}", data.len(), path.display());
        tree.files.insert(path, data.to_vec());
        Ok(dir.to_path_buf())
    }

    fn exists(&self, path: &Path) -> bool {
        let tree = self.lock();
        tree.files.contains_key(path) || tree.is_dir(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let tree = self.lock();
        if let Some(content) = tree.files.get(path) {
            Ok(content.clone())
        } else if tree.is_dir(path) {
            Err(FileSystemError::IsADirectory(path.to_path_buf()))
        } else {
            Err(FileSystemError::NotFound(path.to_path_buf()))
        }
    }

    fn delete(&self, path: &Path) -> Result<()> {
        let mut tree = self.lock();
        if tree.files.remove(path).is_some() {
            debug!("Deleted: {}", path.display());
            Ok(())
        } else if tree.is_dir(path) {
            Err(FileSystemError::IsADirectory(path.to_path_buf()))
        } else {
            Err(FileSystemError::NotFound(path.to_path_buf()))
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.lock().is_dir(path)
    }

    fn mime(&self, path: &Path) -> Option<String> {
        self.lock().files.get(path).map(|content| sniff_mime(content))
    }

    fn mk_dir(&self, path: &Path) -> Result<bool> {
        let mut tree = self.lock();
        if tree.files.contains_key(path) || tree.is_dir(path) {
            return Ok(false);
        }
        tree.check_no_file_ancestor(path)?;
        tree.add_directory_all(path);
        debug!("Created directory: {}", path.display());
        Ok(true)
    }

    fn copy_path(&self, src: &Path, dst: &Path) -> Result<bool> {
        let mut tree = self.lock();

        if let Some(content) = tree.files.get(src).cloned() {
            if tree.is_dir(dst) {
                warn!("Cannot copy file {} onto directory {}", src.display(), dst.display());
                return Ok(false);
            }
            tree.check_no_file_ancestor(dst)?;
            if let Some(parent) = dst.parent() {
                tree.add_directory_all(parent);
            }
            tree.files.insert(dst.to_path_buf(), content);
            debug!("Copied: {} -> {}", src.display(), dst.display());
            return Ok(true);
        }

        if !tree.is_dir(src) {
            debug!("Copy source does not exist: {}", src.display());
            return Ok(false);
        }
        if !tree.is_dir(dst) {
            warn!("Cannot copy directory {} to non-directory {}", src.display(), dst.display());
            return Ok(false);
        }
        if dst.starts_with(src) {
            warn!("Cannot copy directory {} into itself ({})", src.display(), dst.display());
            return Ok(false);
        }

        let directories: Vec<PathBuf> = tree
            .directories
            .iter()
            .filter_map(|d| d.strip_prefix(src).ok())
            .map(|relative| dst.join(relative))
            .collect();
        let files: Vec<(PathBuf, Vec<u8>)> = tree
            .files
            .iter()
            .filter_map(|(path, content)| {
                path.strip_prefix(src)
                    .ok()
                    .map(|relative| (dst.join(relative), content.clone()))
            })
            .collect();

        for directory in directories {
            tree.directories.insert(directory);
        }
        for (path, content) in files {
            tree.files.insert(path, content);
        }
        Ok(true)
    }

    fn dir(&self, path: &Path, restrict: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let tree = self.lock();
        if !tree.is_dir(path) {
            return Err(FileSystemError::NotFound(path.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = tree
            .files
            .keys()
            .filter(|file| file.starts_with(path))
            .filter(|file| {
                // Any restricted directory between `path` and the file hides it.
                !file
                    .ancestors()
                    .skip(1)
                    .take_while(|ancestor| *ancestor != path)
                    .any(|ancestor| restrict.iter().any(|r| r.as_path() == ancestor))
            })
            .cloned()
            .collect();
        sort_paths(&mut files);
        Ok(files)
    }
}
