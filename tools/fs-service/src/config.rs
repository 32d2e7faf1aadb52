use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::filesystem::DEFAULT_DIR_MODE;

/// Environment variables the command-line front end reads.
pub const ADAPTER_ENV: &str = "FS_SERVICE_ADAPTER";
pub const DIR_MODE_ENV: &str = "FS_SERVICE_DIR_MODE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown file system adapter: {0}")]
    UnknownAdapter(String),

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Storage adapters the facade can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdapterKind {
    #[default]
    Local,
    Memory,
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Local => "local",
            AdapterKind::Memory => "memory",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "fs_service::localfilesystem" => Ok(AdapterKind::Local),
            "memory" | "fs_service::memoryfilesystem" => Ok(AdapterKind::Memory),
            _ => Err(ConfigError::UnknownAdapter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileServiceConfig {
    pub adapter: AdapterKind,
    /// Mode for directories the local adapter creates.
    pub dir_mode: u32,
}

impl Default for FileServiceConfig {
    fn default() -> Self {
        Self {
            adapter: AdapterKind::default(),
            dir_mode: DEFAULT_DIR_MODE,
        }
    }
}

impl FileServiceConfig {
    /// Builds a configuration from flat key/value pairs over the defaults.
    ///
    /// Keys: `adapter` (or `fileServiceClassName`) and `dir_mode`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            config.set(key.as_ref(), value.as_ref())?;
        }
        Ok(config)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "adapter" | "fileServiceClassName" => {
                self.adapter = value.parse()?;
            }
            "dir_mode" => {
                self.dir_mode = parse_mode(value).ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// Octal permission bits, with an optional `0o` or `0` prefix.
fn parse_mode(value: &str) -> Option<u32> {
    let value = value.trim();
    let digits = value.strip_prefix("0o").unwrap_or(value);
    let mode = u32::from_str_radix(digits, 8).ok()?;
    (mode <= 0o7777).then_some(mode)
}
