pub mod config;
pub mod filesystem;
pub mod memory;
pub mod service;

pub use config::{AdapterKind, ConfigError, FileServiceConfig};
pub use filesystem::{FileSystem, FileSystemError, LocalFileSystem};
pub use memory::MemoryFileSystem;
pub use service::{EventSink, FileService, LogEventSink, ServiceError};
