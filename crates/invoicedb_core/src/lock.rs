//! Advisory lock for a data file.
//!
//! A store opened with `lock_file` enabled holds an exclusive `fs2` lock on
//! a sibling file named `<data file>.lock` for as long as it lives:
//!
//! ```text
//! data/
//! ├─ invoices.db        # One JSON line per invoice
//! └─ invoices.db.lock   # Held while a store has the file open
//! ```
//!
//! The in-process mutex serializes threads; this lock keeps a second process
//! from appending to the same file.

use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Suffix appended to the data file name.
const LOCK_SUFFIX: &str = "lock";

/// An exclusive advisory lock, released on drop.
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
    file: File,
}

impl FileLock {
    /// Takes the lock guarding `data_path`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseLocked` if another handle holds it, or a store
    /// failure if the lock file cannot be opened.
    pub fn acquire(data_path: &Path) -> CoreResult<Self> {
        let path = lock_path(data_path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        // Non-blocking: a held lock is reported, not waited on
        if file.try_lock_exclusive().is_err() {
            return Err(CoreError::DatabaseLocked);
        }

        Ok(Self { path, file })
    }

    /// Returns the path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Returns the lock file path for `data_path`.
#[must_use]
pub fn lock_path(data_path: &Path) -> PathBuf {
    let mut name = data_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(LOCK_SUFFIX);
    data_path.with_file_name(name)
}
