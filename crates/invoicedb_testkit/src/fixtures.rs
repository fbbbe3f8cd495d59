//! Test fixtures and store helpers.
//!
//! Provides temporary stores and common test scenarios.

use invoicedb_core::{Config, InFileDatabase, InMemoryDatabase};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the data file inside a fixture's temporary directory.
pub const DATA_FILE_NAME: &str = "invoices.db";

/// A file-backed test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub db: InFileDatabase,
    path: PathBuf,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestStore {
    /// Creates an empty store in a fresh temporary directory.
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// Creates a store whose data file starts with `content`.
    pub fn with_content(content: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(DATA_FILE_NAME);
        fs::write(&path, content).expect("Failed to seed data file");
        let db = InFileDatabase::open(&path).expect("Failed to open file store");

        Self {
            db,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Creates a store after letting `adjust` change the default config.
    pub fn with_config(adjust: impl FnOnce(Config) -> Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(DATA_FILE_NAME);
        let config = adjust(Config::in_file(&path));
        let db = InFileDatabase::open_with_config(&config).expect("Failed to open file store");

        Self {
            db,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the store and opens it again against the same file.
    ///
    /// This is how tests simulate a process restart.
    pub fn reopen(self) -> Self {
        let Self {
            db,
            path,
            _temp_dir,
        } = self;
        drop(db);

        let db = InFileDatabase::open(&path).expect("Failed to reopen file store");
        Self {
            db,
            path,
            _temp_dir,
        }
    }

    /// Returns the raw lines of the data file.
    pub fn raw_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.path)
            .expect("Failed to read data file")
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = InFileDatabase;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory store.
///
/// # Example
///
/// ```rust,ignore
/// use invoicedb_testkit::with_memory_db;
///
/// #[test]
/// fn my_test() {
///     with_memory_db(|db| {
///         db.save(sample_invoice("A1")).unwrap();
///     });
/// }
/// ```
pub fn with_memory_db<F, R>(f: F) -> R
where
    F: FnOnce(&InMemoryDatabase) -> R,
{
    f(&InMemoryDatabase::new())
}

/// Runs a test with a temporary file store.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&InFileDatabase, &Path) -> R,
{
    let store = TestStore::new();
    f(&store.db, store.path())
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use crate::generators::sample_invoice;
    use invoicedb_core::Database;

    /// Creates a file store holding `count` sample invoices with ids 1..=count.
    pub fn populated_store(count: usize) -> TestStore {
        let store = TestStore::new();
        for n in 1..=count {
            store
                .save(sample_invoice(&format!("FV/{n}")))
                .expect("Failed to save invoice");
        }
        store
    }

    /// Creates a file store whose last line is not its highest id.
    ///
    /// Invoice 1 is updated after invoice 2 is inserted, so the file ends
    /// with id 1.
    pub fn updated_after_insert() -> TestStore {
        let store = populated_store(2);
        let mut first = store
            .get_by_id(invoicedb_core::InvoiceId::new(1))
            .expect("Failed to read invoice")
            .expect("Invoice 1 should exist");
        first.number.push_str("-corrected");
        store.save(first).expect("Failed to update invoice");
        store
    }
}
