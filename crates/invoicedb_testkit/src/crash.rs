//! Crash recovery testing for InvoiceDB.
//!
//! A file store has no journal: whatever lines are on disk when it opens are
//! the data. These helpers damage a data file the way an interrupted writer
//! would and check what survives a reopen.
//!
//! ## Damage Kinds
//!
//! 1. **Torn append** - The last line stops partway, with no terminator
//! 2. **Garbage line** - A line that does not decode, anywhere in the file
//! 3. **Stale rewrite file** - A leftover scratch file from an interrupted
//!    delete or update
//!
//! ## Usage
//!
//! ```rust,ignore
//! use invoicedb_testkit::crash::{CrashPoint, CrashRecoveryHarness};
//!
//! let result = CrashRecoveryHarness::new(5).run(CrashPoint::TornAppend);
//! assert!(result.passed, "{result:?}");
//! ```

use crate::fixtures::scenarios::populated_store;
use crate::generators::sample_invoice;
use invoicedb_codec::to_json_line;
use invoicedb_core::{Database, InvoiceId};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Ways a data file can be damaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashPoint {
    /// The writer died partway through appending a record.
    TornAppend,
    /// A line in the middle of the file was corrupted.
    GarbageLine,
    /// The writer died after writing the scratch file of a rewrite but
    /// before renaming it over the data file.
    StaleRewrite,
}

impl CrashPoint {
    /// Every crash point.
    pub const ALL: [Self; 3] = [Self::TornAppend, Self::GarbageLine, Self::StaleRewrite];
}

/// Result of a crash recovery test.
#[derive(Debug, Clone)]
pub struct CrashRecoveryResult {
    /// Whether the test passed.
    pub passed: bool,
    /// What was tested.
    pub crash_point: CrashPoint,
    /// Invoices expected after recovery.
    pub expected_invoices: usize,
    /// Invoices found after recovery.
    pub actual_invoices: usize,
    /// Any error message.
    pub error: Option<String>,
}

impl CrashRecoveryResult {
    fn pass(crash_point: CrashPoint, invoices: usize) -> Self {
        Self {
            passed: true,
            crash_point,
            expected_invoices: invoices,
            actual_invoices: invoices,
            error: None,
        }
    }

    fn fail(crash_point: CrashPoint, expected: usize, actual: usize, error: String) -> Self {
        Self {
            passed: false,
            crash_point,
            expected_invoices: expected,
            actual_invoices: actual,
            error: Some(error),
        }
    }
}

/// Appends `bytes` to the file at `path` with no terminator.
pub fn append_raw(path: &Path, bytes: &[u8]) {
    OpenOptions::new()
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(bytes))
        .expect("Failed to append to data file");
}

/// Appends the first half of an encoded invoice, simulating a torn write.
pub fn append_torn_record(path: &Path, id: u64) {
    let line = to_json_line(&sample_invoice("TORN").with_id(InvoiceId::new(id)))
        .expect("Failed to encode invoice");
    append_raw(path, &line.as_bytes()[..line.len() / 2]);
}

/// Replaces line `line_number` (1-indexed) with bytes that are not JSON.
pub fn corrupt_line(path: &Path, line_number: usize) {
    let content = fs::read_to_string(path).expect("Failed to read data file");
    let mut lines: Vec<&str> = content.lines().collect();
    lines[line_number - 1] = "\u{0}\u{0}corrupt\u{0}";
    let mut rebuilt = lines.join("\n");
    rebuilt.push('\n');
    fs::write(path, rebuilt).expect("Failed to write data file");
}

/// Runs crash scenarios against a store populated with known invoices.
pub struct CrashRecoveryHarness {
    invoices: usize,
}

impl CrashRecoveryHarness {
    /// Creates a harness that populates `invoices` records before crashing.
    pub fn new(invoices: usize) -> Self {
        Self {
            invoices: invoices.max(2),
        }
    }

    /// Runs one crash scenario.
    pub fn run(&self, crash_point: CrashPoint) -> CrashRecoveryResult {
        let store = populated_store(self.invoices);
        let path = store.path().to_path_buf();

        let expected = match crash_point {
            CrashPoint::TornAppend => {
                append_torn_record(&path, self.invoices as u64 + 1);
                self.invoices
            }
            CrashPoint::GarbageLine => {
                corrupt_line(&path, 1);
                self.invoices - 1
            }
            CrashPoint::StaleRewrite => {
                let mut scratch = path.clone().into_os_string();
                scratch.push(".rewrite");
                fs::write(&scratch, "stale scratch content\n").expect("Failed to write scratch");
                self.invoices
            }
        };

        let store = store.reopen();
        let actual = match store.count() {
            Ok(count) => count,
            Err(e) => return CrashRecoveryResult::fail(crash_point, expected, 0, e.to_string()),
        };
        if actual != expected {
            return CrashRecoveryResult::fail(
                crash_point,
                expected,
                actual,
                "wrong number of invoices after reopen".into(),
            );
        }

        // A fresh insert must land on its own line, with a fresh id, and
        // read back intact.
        let stored = match store.save(sample_invoice("AFTER")) {
            Ok(stored) => stored,
            Err(e) => return CrashRecoveryResult::fail(crash_point, expected, actual, e.to_string()),
        };
        let Some(id) = stored.id else {
            return CrashRecoveryResult::fail(crash_point, expected, actual, "no id".into());
        };
        if id.get() <= self.invoices as u64 {
            return CrashRecoveryResult::fail(
                crash_point,
                expected,
                actual,
                format!("insert after recovery reused id {id}"),
            );
        }
        match store.get_by_id(id) {
            Ok(Some(found)) if found == stored => {}
            other => {
                return CrashRecoveryResult::fail(
                    crash_point,
                    expected,
                    actual,
                    format!("insert after recovery read back as {other:?}"),
                )
            }
        }

        CrashRecoveryResult::pass(crash_point, actual)
    }

    /// Runs every crash scenario.
    pub fn run_all(&self) -> Vec<CrashRecoveryResult> {
        CrashPoint::ALL.iter().map(|&point| self.run(point)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torn_append_recovers() {
        let result = CrashRecoveryHarness::new(4).run(CrashPoint::TornAppend);
        assert!(result.passed, "{result:?}");
    }

    #[test]
    fn garbage_line_recovers() {
        let result = CrashRecoveryHarness::new(4).run(CrashPoint::GarbageLine);
        assert!(result.passed, "{result:?}");
        assert_eq!(result.actual_invoices, 3);
    }

    #[test]
    fn all_crash_points_recover() {
        for result in CrashRecoveryHarness::new(3).run_all() {
            assert!(result.passed, "{result:?}");
        }
    }

    #[test]
    fn corrupt_line_keeps_line_count() {
        let store = populated_store(3);
        corrupt_line(store.path(), 2);
        assert_eq!(store.raw_lines().len(), 3);
        assert_eq!(store.count().unwrap(), 2);
    }
}
