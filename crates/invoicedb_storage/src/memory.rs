//! In-memory line storage for testing.

use crate::backend::{check_line_number, check_single_line, LineBackend};
use crate::error::StorageResult;
use parking_lot::RwLock;

/// An in-memory line backend.
///
/// Behaves like [`super::LineFile`] without touching the file system.
/// Suitable for unit tests and for recovery scenarios built from
/// hand-written lines.
///
/// # Example
///
/// ```rust
/// use invoicedb_storage::{InMemoryLines, LineBackend};
///
/// let mut lines = InMemoryLines::new();
/// lines.write_line("a").unwrap();
/// lines.write_line("b").unwrap();
/// lines.remove_line(1).unwrap();
/// assert_eq!(lines.read_lines().unwrap(), vec!["b"]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLines {
    lines: RwLock<Vec<String>>,
}

impl InMemoryLines {
    /// Creates a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with pre-existing lines.
    ///
    /// Lines are taken as-is, so tests can seed blank or corrupt entries.
    #[must_use]
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: RwLock::new(lines.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns a copy of all lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.read().clone()
    }
}

impl LineBackend for InMemoryLines {
    fn write_line(&mut self, text: &str) -> StorageResult<()> {
        check_single_line(text)?;
        self.lines.write().push(text.to_string());
        Ok(())
    }

    fn read_lines(&self) -> StorageResult<Vec<String>> {
        Ok(self.lines())
    }

    fn remove_line(&mut self, line_number: usize) -> StorageResult<()> {
        let mut lines = self.lines.write();
        check_line_number(line_number, lines.len())?;
        lines.remove(line_number - 1);
        Ok(())
    }

    fn read_last_line(&self) -> StorageResult<Option<String>> {
        Ok(self
            .lines
            .read()
            .iter()
            .rev()
            .find(|line| !line.is_empty())
            .cloned())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.lines.write().clear();
        Ok(())
    }

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.lines.read().is_empty())
    }

    fn line_count(&self) -> StorageResult<usize> {
        Ok(self.lines.read().len())
    }

    fn sync(&mut self) -> StorageResult<()> {
        // Nothing to flush
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::LineFile;
    use proptest::prelude::*;

    #[test]
    fn memory_new_is_empty() {
        let lines = InMemoryLines::new();
        assert!(lines.is_empty().unwrap());
        assert_eq!(lines.read_last_line().unwrap(), None);
    }

    #[test]
    fn memory_with_lines() {
        let lines = InMemoryLines::with_lines(["a", "", "b", ""]);
        assert_eq!(lines.line_count().unwrap(), 4);
        assert_eq!(lines.read_last_line().unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn memory_remove_out_of_range() {
        let mut lines = InMemoryLines::with_lines(["a"]);
        assert!(matches!(
            lines.remove_line(5),
            Err(StorageError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn memory_clear() {
        let mut lines = InMemoryLines::with_lines(["a", "b"]);
        lines.clear().unwrap();
        lines.clear().unwrap();
        assert!(lines.is_empty().unwrap());
    }

    #[derive(Debug, Clone)]
    enum LineOp {
        Write(String),
        Remove(usize),
        Clear,
    }

    fn line_op_strategy() -> impl Strategy<Value = LineOp> {
        prop_oneof![
            4 => "[a-z0-9 {}:\",]{0,24}".prop_map(LineOp::Write),
            2 => (0usize..8).prop_map(LineOp::Remove),
            1 => Just(LineOp::Clear),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn file_matches_memory_model(ops in prop::collection::vec(line_op_strategy(), 0..24)) {
            let dir = tempfile::tempdir().unwrap();
            let mut file = LineFile::open(&dir.path().join("model.db")).unwrap();
            let mut model = InMemoryLines::new();

            for op in ops {
                match op {
                    LineOp::Write(text) => {
                        file.write_line(&text).unwrap();
                        model.write_line(&text).unwrap();
                    }
                    LineOp::Remove(n) => {
                        let a = file.remove_line(n).is_ok();
                        let b = model.remove_line(n).is_ok();
                        prop_assert_eq!(a, b);
                    }
                    LineOp::Clear => {
                        file.clear().unwrap();
                        model.clear().unwrap();
                    }
                }
                prop_assert_eq!(file.read_lines().unwrap(), model.read_lines().unwrap());
                prop_assert_eq!(file.read_last_line().unwrap(), model.read_last_line().unwrap());
            }
        }
    }
}
