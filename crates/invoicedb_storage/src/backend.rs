//! Line backend trait definition.

use crate::error::{StorageError, StorageResult};

/// A line-addressed text store.
///
/// Backends hold a sequence of UTF-8 lines and address them by 1-indexed
/// position. They do not interpret line contents; record encoding and
/// identifier bookkeeping live in the layers above.
///
/// # Invariants
///
/// - `write_line` appends exactly one line at the end
/// - `read_lines` returns lines in insertion order, terminators stripped
/// - `remove_line(n)` shifts every line after `n` up by one
/// - No stored line contains `\n` or `\r`
///
/// Mutations are not atomic with respect to each other. Callers that share
/// a backend across threads must serialize access themselves.
///
/// # Implementors
///
/// - [`super::LineFile`] - A text file on disk
/// - [`super::InMemoryLines`] - For testing
pub trait LineBackend: Send + Sync {
    /// Appends `text` as a new last line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `text` contains a line terminator, or
    /// an I/O error if the write fails.
    fn write_line(&mut self, text: &str) -> StorageResult<()>;

    /// Reads every line in order.
    ///
    /// An empty store yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the underlying file is missing, or an I/O error.
    fn read_lines(&self) -> StorageResult<Vec<String>>;

    /// Removes the `line_number`th line (1-indexed).
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `line_number` is 0 or greater than the
    /// current line count.
    fn remove_line(&mut self, line_number: usize) -> StorageResult<()>;

    /// Returns the last non-empty line, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn read_last_line(&self) -> StorageResult<Option<String>>;

    /// Removes every line. Succeeds on an already empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if truncation fails.
    fn clear(&mut self) -> StorageResult<()>;

    /// Returns true if the store holds no data.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the underlying file is missing.
    fn is_empty(&self) -> StorageResult<bool>;

    /// Returns the number of lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn line_count(&self) -> StorageResult<usize> {
        Ok(self.read_lines()?.len())
    }

    /// Flushes pending writes to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    fn sync(&mut self) -> StorageResult<()>;
}

/// Rejects text that would span more than one line.
pub(crate) fn check_single_line(text: &str) -> StorageResult<()> {
    if text.contains(['\n', '\r']) {
        return Err(StorageError::invalid_argument(
            "line must not contain a line terminator",
        ));
    }
    Ok(())
}

/// Validates a 1-indexed line number against the current line count.
pub(crate) fn check_line_number(line_number: usize, line_count: usize) -> StorageResult<()> {
    if line_number < 1 {
        return Err(StorageError::invalid_argument(
            "line number cannot be lower than one",
        ));
    }
    if line_number > line_count {
        return Err(StorageError::invalid_argument(format!(
            "line number {line_number} exceeds line count {line_count}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_accepts_plain_text() {
        assert!(check_single_line("{\"id\":1}").is_ok());
        assert!(check_single_line("").is_ok());
    }

    #[test]
    fn single_line_rejects_terminators() {
        assert!(matches!(
            check_single_line("a\nb"),
            Err(StorageError::InvalidArgument { .. })
        ));
        assert!(matches!(
            check_single_line("a\r"),
            Err(StorageError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn line_number_bounds() {
        assert!(check_line_number(0, 3).is_err());
        assert!(check_line_number(1, 3).is_ok());
        assert!(check_line_number(3, 3).is_ok());
        assert!(check_line_number(4, 3).is_err());
        assert!(check_line_number(1, 0).is_err());
    }
}
