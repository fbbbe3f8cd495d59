//! File-backed database.

use super::{check_id, Database, IdAllocator};
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::lock::FileLock;
use crate::model::{Invoice, InvoiceId};
use invoicedb_codec::{JsonLineCodec, RecordCodec};
use invoicedb_storage::{LineBackend, LineFile};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Mutable state guarded by the store lock.
struct FileState {
    lines: Box<dyn LineBackend>,
    ids: IdAllocator,
}

/// Result of a full integrity scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Number of lines in the file, blank and malformed included.
    pub line_count: usize,
    /// Number of lines that decode to an invoice.
    pub record_count: usize,
    /// Lines that do not decode: 1-indexed line number and reason.
    pub malformed: Vec<(usize, String)>,
    /// Decoded invoices without an id.
    pub missing_ids: Vec<usize>,
    /// Ids carried by more than one line.
    pub duplicate_ids: Vec<InvoiceId>,
    /// Highest id on any line.
    pub max_id: Option<InvoiceId>,
}

impl ScanReport {
    /// Returns true if every line holds an invoice with a unique id.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty() && self.missing_ids.is_empty() && self.duplicate_ids.is_empty()
    }
}

/// A [`Database`] storing one encoded invoice per line of a text file.
///
/// # Storage Format
///
/// The file is a log of current records with no separate index. Line
/// position is the addressing mechanism at the moment of a mutation:
///
/// - Insert appends a line under a freshly allocated id
/// - Update removes the record's line and appends the new encoding, so an
///   updated invoice moves to the end of the file
/// - Delete removes the record's line; the file shrinks by one line
///
/// Lookups by id or number scan and decode the whole file. No secondary
/// index is kept; record counts are expected to be small enough that a
/// scan costs less than keeping an index consistent with the rewrites.
///
/// Lines that fail to decode are logged and treated as absent records.
///
/// # Identifiers
///
/// The id allocator is seeded once at open time from the record on the
/// file's last line (0 if the file is empty or the line does not decode).
/// With [`Config::verify_seed`] the seed is then raised to the highest id on
/// any line, since an update may have left an older record at the end. From
/// then on the in-memory counter is authoritative and ids are never reused
/// while the store is open, `delete_all` included.
///
/// # Thread Safety
///
/// Every operation, reads included, holds one store-wide mutex for its
/// whole duration, so no caller can observe a half-written line or a file
/// in the middle of a rewrite. With [`Config::lock_file`] an advisory lock
/// also keeps other processes out.
///
/// # Example
///
/// ```rust,no_run
/// use invoicedb_core::{Database, InFileDatabase, Invoice};
/// use std::path::Path;
///
/// let db = InFileDatabase::open(Path::new("invoices.db"))?;
/// let stored = db.save(Invoice::builder().number("A1").build())?;
/// assert!(db.exists(stored.id.unwrap())?);
/// # Ok::<(), invoicedb_core::CoreError>(())
/// ```
pub struct InFileDatabase<C = JsonLineCodec<Invoice>> {
    codec: C,
    path: Option<PathBuf>,
    state: Mutex<FileState>,
    _lock: Option<FileLock>,
}

impl InFileDatabase {
    /// Opens the store at `path` with default settings.
    ///
    /// The file is created if it does not exist; existing data is kept.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseLocked` if another store holds the file, or a store
    /// failure if the file cannot be opened or read.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(&Config::in_file(path))
    }

    /// Opens the store at `config.file_path`.
    ///
    /// A partial last line left by an interrupted append is terminated
    /// before anything else is written, so it stays a single malformed line.
    /// [`Config::repair_tail`] turns this off.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseLocked` if another store holds the file, or a store
    /// failure if the file cannot be opened or read.
    pub fn open_with_config(config: &Config) -> CoreResult<Self> {
        let path = &config.file_path;

        if config.create_dirs {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let lock = if config.lock_file {
            Some(FileLock::acquire(path)?)
        } else {
            None
        };

        let mut lines = LineFile::open(path)?.sync_on_write(config.sync_on_write);
        if config.repair_tail {
            lines.repair_tail()?;
        }
        let mut db = Self::with_backend(Box::new(lines), JsonLineCodec::new(), config.verify_seed)?;
        db.path = Some(path.clone());
        db._lock = lock;
        Ok(db)
    }
}

impl<C: RecordCodec<Invoice>> InFileDatabase<C> {
    /// Builds a store over any line backend and codec.
    ///
    /// Useful for tests that need hand-written or corrupt lines.
    ///
    /// # Errors
    ///
    /// Returns a store failure if the backend cannot be read.
    pub fn with_backend(
        lines: Box<dyn LineBackend>,
        codec: C,
        verify_seed: bool,
    ) -> CoreResult<Self> {
        let ids = seed_allocator(lines.as_ref(), &codec, verify_seed)?;
        Ok(Self {
            codec,
            path: None,
            state: Mutex::new(FileState { lines, ids }),
            _lock: None,
        })
    }

    /// Returns the data file path, if file-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the id the next insert will receive.
    #[must_use]
    pub fn next_id_hint(&self) -> InvoiceId {
        self.state.lock().ids.peek()
    }

    /// Decodes every line and reports what it found.
    ///
    /// # Errors
    ///
    /// Returns a store failure if the file cannot be read.
    pub fn scan(&self) -> CoreResult<ScanReport> {
        let state = self.state.lock();
        let lines = state.lines.read_lines()?;

        let mut report = ScanReport {
            line_count: lines.len(),
            ..ScanReport::default()
        };
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();

        for (index, line) in lines.iter().enumerate() {
            let line_number = index + 1;
            match self.codec.decode(line) {
                Ok(invoice) => {
                    report.record_count += 1;
                    match invoice.id {
                        Some(id) => {
                            if !seen.insert(id) {
                                duplicates.insert(id);
                            }
                        }
                        None => report.missing_ids.push(line_number),
                    }
                }
                Err(e) => report.malformed.push((line_number, e.to_string())),
            }
        }

        report.max_id = seen.last().copied();
        report.duplicate_ids = duplicates.into_iter().collect();
        Ok(report)
    }

    /// Decodes `lines`, skipping and logging the ones that do not parse.
    ///
    /// Yields the 1-indexed line number with each invoice.
    fn decode_lines<'a>(
        &'a self,
        lines: &'a [String],
    ) -> impl Iterator<Item = (usize, Invoice)> + 'a {
        decode_lines(&self.codec, lines)
    }

    /// Returns the line number of the first invoice matching `predicate`.
    fn find_line<F>(&self, lines: &[String], predicate: F) -> Option<(usize, Invoice)>
    where
        F: Fn(&Invoice) -> bool,
    {
        self.decode_lines(lines).find(|(_, invoice)| predicate(invoice))
    }
}

impl<C: RecordCodec<Invoice>> Database for InFileDatabase<C> {
    fn save(&self, invoice: Invoice) -> CoreResult<Invoice> {
        let mut state = self.state.lock();

        if let Some(id) = invoice.id {
            let lines = state.lines.read_lines()?;
            if let Some((line_number, _)) = self.find_line(&lines, |stored| stored.id == Some(id)) {
                // Encode first so a codec failure leaves the file untouched
                let line = self.codec.encode(&invoice)?;
                state.lines.remove_line(line_number)?;
                state.lines.write_line(&line)?;
                state.ids.observe(id);
                tracing::debug!(%id, line_number, "updated invoice");
                return Ok(invoice);
            }
        }

        let id = state.ids.next_id()?;
        let stored = invoice.with_id(id);
        let line = self.codec.encode(&stored)?;
        state.lines.write_line(&line)?;
        tracing::debug!(%id, number = %stored.number, "added invoice");
        Ok(stored)
    }

    fn get_by_id(&self, id: InvoiceId) -> CoreResult<Option<Invoice>> {
        check_id(id)?;
        let state = self.state.lock();
        let lines = state.lines.read_lines()?;
        Ok(self
            .find_line(&lines, |invoice| invoice.id == Some(id))
            .map(|(_, invoice)| invoice))
    }

    fn get_by_number(&self, number: &str) -> CoreResult<Option<Invoice>> {
        let state = self.state.lock();
        let lines = state.lines.read_lines()?;
        Ok(self
            .find_line(&lines, |invoice| invoice.number == number)
            .map(|(_, invoice)| invoice))
    }

    fn get_all(&self) -> CoreResult<Vec<Invoice>> {
        let state = self.state.lock();
        let lines = state.lines.read_lines()?;
        Ok(self.decode_lines(&lines).map(|(_, invoice)| invoice).collect())
    }

    fn delete(&self, id: InvoiceId) -> CoreResult<()> {
        check_id(id)?;
        let mut state = self.state.lock();
        let lines = state.lines.read_lines()?;
        let (line_number, _) = self
            .find_line(&lines, |invoice| invoice.id == Some(id))
            .ok_or(CoreError::InvoiceNotFound { id })?;
        state.lines.remove_line(line_number)?;
        tracing::debug!(%id, line_number, "deleted invoice");
        Ok(())
    }

    fn delete_all(&self) -> CoreResult<()> {
        let mut state = self.state.lock();
        state.lines.clear()?;
        tracing::debug!("deleted all invoices");
        Ok(())
    }

    fn exists(&self, id: InvoiceId) -> CoreResult<bool> {
        Ok(self.get_by_id(id)?.is_some())
    }

    fn count(&self) -> CoreResult<usize> {
        let state = self.state.lock();
        let lines = state.lines.read_lines()?;
        Ok(self.decode_lines(&lines).count())
    }
}

impl<C> fmt::Debug for InFileDatabase<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFileDatabase")
            .field("path", &self.path)
            .field("locked", &self._lock.is_some())
            .finish_non_exhaustive()
    }
}

fn decode_lines<'a, C: RecordCodec<Invoice>>(
    codec: &'a C,
    lines: &'a [String],
) -> impl Iterator<Item = (usize, Invoice)> + 'a {
    lines
        .iter()
        .enumerate()
        .filter_map(move |(index, line)| match codec.decode(line) {
            Ok(invoice) => Some((index + 1, invoice)),
            Err(e) => {
                tracing::warn!(line_number = index + 1, error = %e, "skipping malformed line");
                None
            }
        })
}

/// Seeds the allocator from the last line, optionally raised by a full scan.
fn seed_allocator<C: RecordCodec<Invoice>>(
    lines: &dyn LineBackend,
    codec: &C,
    verify: bool,
) -> CoreResult<IdAllocator> {
    let last_line_id = match lines.read_last_line()? {
        Some(line) => match codec.decode(&line) {
            Ok(invoice) => invoice.id,
            Err(e) => {
                tracing::warn!(error = %e, "last line does not decode, seeding ids from 0");
                None
            }
        },
        None => None,
    };

    let mut ids = IdAllocator::seeded(last_line_id);

    if verify {
        let all = lines.read_lines()?;
        let mut raised = false;
        for (_, invoice) in decode_lines(codec, &all) {
            if let Some(id) = invoice.id {
                raised |= ids.observe(id);
            }
        }
        if raised {
            tracing::info!(
                last_line_id = ?last_line_id,
                max_id = ?ids.last(),
                "last line does not carry the highest id, seed raised"
            );
        }
    }

    tracing::info!(next_id = %ids.peek(), "opened file database");
    Ok(ids)
}
