//! Database configuration.

use crate::error::{CoreError, CoreResult};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable selecting the backend.
pub const ENV_BACKEND: &str = "INVOICEDB_BACKEND";
/// Environment variable holding the data file path.
pub const ENV_FILE_PATH: &str = "INVOICEDB_FILE_PATH";
/// Environment variable toggling the advisory lock file.
pub const ENV_LOCK_FILE: &str = "INVOICEDB_LOCK_FILE";
/// Environment variable toggling fsync after every write.
pub const ENV_SYNC_ON_WRITE: &str = "INVOICEDB_SYNC_ON_WRITE";

/// Which [`crate::Database`] implementation to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Process-local map; nothing survives a restart.
    InMemory,
    /// One JSON line per invoice in a text file.
    InFile,
}

impl FromStr for Backend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-memory" | "memory" => Ok(Self::InMemory),
            "in-file" | "file" => Ok(Self::InFile),
            other => Err(CoreError::invalid_config(format!(
                "unknown backend {other:?}, expected \"in-memory\" or \"in-file\""
            ))),
        }
    }
}

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend to open.
    pub backend: Backend,

    /// Data file for the in-file backend.
    pub file_path: PathBuf,

    /// Whether to create missing parent directories of `file_path`.
    pub create_dirs: bool,

    /// Whether to hold an exclusive advisory lock on `<file_path>.lock`.
    pub lock_file: bool,

    /// Whether to correct the allocator seed with a full scan on open.
    ///
    /// The seed is read from the last line. After an update moves an older
    /// record to the end, the last line no longer carries the highest id; the
    /// scan restores it at the cost of reading the whole file once.
    pub verify_seed: bool,

    /// Whether to fsync after every append and rewrite.
    pub sync_on_write: bool,

    /// Whether to terminate a partial last line on open.
    ///
    /// Turning this off leaves the file byte-for-byte as found, for read-only
    /// tools. An insert through such a store is glued onto the partial line.
    pub repair_tail: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::InFile,
            file_path: PathBuf::from("invoices.db"),
            create_dirs: true,
            lock_file: true,
            verify_seed: true,
            sync_on_write: false,
            repair_tail: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-file configuration for `path`.
    #[must_use]
    pub fn in_file(path: impl Into<PathBuf>) -> Self {
        Self::default().file_path(path)
    }

    /// Creates an in-memory configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default().backend(Backend::InMemory)
    }

    /// Builds a configuration from defaults overlaid with `INVOICEDB_*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a variable is set to an unparsable value.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from defaults overlaid with values returned by
    /// `lookup` for the `INVOICEDB_*` keys.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_BACKEND) {
            config.backend = value.parse()?;
        }
        if let Some(value) = lookup(ENV_FILE_PATH) {
            if value.trim().is_empty() {
                return Err(CoreError::invalid_config(format!("{ENV_FILE_PATH} is empty")));
            }
            config.file_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_LOCK_FILE) {
            config.lock_file = parse_flag(ENV_LOCK_FILE, &value)?;
        }
        if let Some(value) = lookup(ENV_SYNC_ON_WRITE) {
            config.sync_on_write = parse_flag(ENV_SYNC_ON_WRITE, &value)?;
        }
        Ok(config)
    }

    /// Sets the backend.
    #[must_use]
    pub const fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the data file path.
    #[must_use]
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = path.into();
        self
    }

    /// Sets whether to create missing parent directories.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }

    /// Sets whether to hold the advisory lock file.
    #[must_use]
    pub const fn lock_file(mut self, value: bool) -> Self {
        self.lock_file = value;
        self
    }

    /// Sets whether to verify the allocator seed with a full scan.
    #[must_use]
    pub const fn verify_seed(mut self, value: bool) -> Self {
        self.verify_seed = value;
        self
    }

    /// Sets whether to fsync after every write.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets whether to terminate a partial last line on open.
    #[must_use]
    pub const fn repair_tail(mut self, value: bool) -> Self {
        self.repair_tail = value;
        self
    }
}

fn parse_flag(key: &str, value: &str) -> CoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CoreError::invalid_config(format!(
            "{key} must be a boolean, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::InFile);
        assert!(config.create_dirs);
        assert!(config.lock_file);
        assert!(config.verify_seed);
        assert!(!config.sync_on_write);
        assert!(config.repair_tail);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::in_file("/tmp/x.db")
            .lock_file(false)
            .sync_on_write(true)
            .verify_seed(false);

        assert_eq!(config.file_path, PathBuf::from("/tmp/x.db"));
        assert!(!config.lock_file);
        assert!(config.sync_on_write);
        assert!(!config.verify_seed);
    }

    #[test]
    fn backend_names() {
        assert_eq!("in-memory".parse::<Backend>().unwrap(), Backend::InMemory);
        assert_eq!("IN-FILE".parse::<Backend>().unwrap(), Backend::InFile);
        assert!("mongo".parse::<Backend>().is_err());
    }

    #[test]
    fn lookup_overlays_defaults() {
        let config = Config::from_lookup(lookup(&[
            (ENV_BACKEND, "in-memory"),
            (ENV_FILE_PATH, "data/invoices.db"),
            (ENV_SYNC_ON_WRITE, "yes"),
        ]))
        .unwrap();

        assert_eq!(config.backend, Backend::InMemory);
        assert_eq!(config.file_path, PathBuf::from("data/invoices.db"));
        assert!(config.sync_on_write);
        assert!(config.lock_file);
    }

    #[test]
    fn lookup_rejects_bad_values() {
        let err = Config::from_lookup(lookup(&[(ENV_LOCK_FILE, "maybe")])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));

        let err = Config::from_lookup(lookup(&[(ENV_FILE_PATH, " ")])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }
}
