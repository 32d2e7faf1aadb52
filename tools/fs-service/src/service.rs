use log::{error, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{AdapterKind, ConfigError, FileServiceConfig};
use crate::filesystem::{FileSystem, LocalFileSystem, Result};
use crate::memory::MemoryFileSystem;

/// Identifier the facade reports itself under on the event channel.
pub const SERVICE_ID: &str = "fs";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Cannot initialize file system adapter[{name}]")]
    AdapterNotFound { name: String },

    #[error("Invalid file service configuration: {0}")]
    Config(ConfigError),
}

impl From<ConfigError> for ServiceError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownAdapter(name) => ServiceError::AdapterNotFound { name },
            other => ServiceError::Config(other),
        }
    }
}

/// Channel the surrounding application listens on for setup failures.
pub trait EventSink {
    fn error(&self, source: &str, message: &str);
}

/// Sink that forwards events to the `log` error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn error(&self, source: &str, message: &str) {
        error!("[{}] {}", source, message);
    }
}

/// Builds the adapter a configuration selects.
pub fn build_adapter(config: &FileServiceConfig) -> Box<dyn FileSystem> {
    match config.adapter {
        AdapterKind::Local => Box::new(LocalFileSystem::with_dir_mode(config.dir_mode)),
        AdapterKind::Memory => Box::new(MemoryFileSystem::new()),
    }
}

/// Facade owning one storage adapter and forwarding every call to it.
#[derive(Debug)]
pub struct FileService {
    adapter: Box<dyn FileSystem>,
}

impl FileService {
    pub fn new(config: &FileServiceConfig) -> Self {
        let adapter = build_adapter(config);
        info!("File service initialized with {} adapter", adapter.name());
        Self { adapter }
    }

    pub fn from_adapter(adapter: Box<dyn FileSystem>) -> Self {
        Self { adapter }
    }

    /// Builds the facade from a flat key/value configuration.
    pub fn configure<I, K, V>(pairs: I) -> std::result::Result<Self, ServiceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let config = FileServiceConfig::from_pairs(pairs)?;
        Ok(Self::new(&config))
    }

    /// Like [`FileService::configure`], but also reports a failure on `sink`.
    pub fn init<I, K, V>(pairs: I, sink: &dyn EventSink) -> std::result::Result<Self, ServiceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::configure(pairs).map_err(|err| {
            sink.error(SERVICE_ID, &err.to_string());
            err
        })
    }

    pub fn adapter(&self) -> &dyn FileSystem {
        self.adapter.as_ref()
    }

    pub fn adapter_name(&self) -> &'static str {
        self.adapter.name()
    }
}

impl Default for FileService {
    fn default() -> Self {
        Self::new(&FileServiceConfig::default())
    }
}

impl FileSystem for FileService {
    fn name(&self) -> &'static str {
        self.adapter.name()
    }

    fn write(&self, data: &[u8], filename: &str, dir: &Path) -> Result<PathBuf> {
        self.adapter.write(data, filename, dir)
    }

    fn exists(&self, path: &Path) -> bool {
        self.adapter.exists(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.adapter.read(path)
    }

    fn delete(&self, path: &Path) -> Result<()> {
        self.adapter.delete(path)
    }

    fn extension(&self, path: &Path) -> Option<String> {
        self.adapter.extension(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.adapter.is_dir(path)
    }

    fn mime(&self, path: &Path) -> Option<String> {
        self.adapter.mime(path)
    }

    fn mk_dir(&self, path: &Path) -> Result<bool> {
        self.adapter.mk_dir(path)
    }

    fn relative_path(&self, full_path: &Path, file_name: &str, base_path: Option<&Path>) -> String {
        self.adapter.relative_path(full_path, file_name, base_path)
    }

    fn copy_path(&self, src: &Path, dst: &Path) -> Result<bool> {
        self.adapter.copy_path(src, dst)
    }

    fn dir(&self, path: &Path, restrict: &[PathBuf]) -> Result<Vec<PathBuf>> {
        self.adapter.dir(path, restrict)
    }
}
