//! File-based line storage.

use crate::backend::{check_line_number, check_single_line, LineBackend};
use crate::error::{StorageError, StorageResult};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Terminator appended after every written line.
#[cfg(windows)]
pub const LINE_TERMINATOR: &str = "\r\n";
/// Terminator appended after every written line.
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &str = "\n";

/// Chunk size used when scanning a file backwards for its last line.
const REVERSE_CHUNK_SIZE: usize = 4096;

/// Suffix of the scratch file used while rewriting.
const REWRITE_SUFFIX: &str = "rewrite";

/// A UTF-8 text file addressed line by line.
///
/// `LineFile` keeps no open handle; every operation opens the file, does its
/// work and closes it again. This keeps the type trivially `Send + Sync` and
/// means an external truncation or deletion is observed by the next call.
///
/// # Complexity
///
/// - `write_line` is a single append, O(len of line)
/// - `read_lines` and `line_count` read the whole file
/// - `remove_line` reads the whole file and rewrites it through a temporary
///   sibling file that is renamed over the original
/// - `read_last_line` scans backwards from the end in 4 KiB chunks, so it
///   touches only the tail of the file regardless of its size
///
/// # Example
///
/// ```no_run
/// use invoicedb_storage::{LineBackend, LineFile};
/// use std::path::Path;
///
/// let mut file = LineFile::open(Path::new("invoices.db")).unwrap();
/// file.write_line("{\"id\":1}").unwrap();
/// assert_eq!(file.read_last_line().unwrap().as_deref(), Some("{\"id\":1}"));
/// ```
#[derive(Debug, Clone)]
pub struct LineFile {
    path: PathBuf,
    sync_on_write: bool,
}

impl LineFile {
    /// Creates a new empty file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if something is already at `path`; existing
    /// data is never truncated.
    pub fn create(path: &Path) -> StorageResult<Self> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => {
                tracing::debug!(path = %path.display(), "created line file");
                Ok(Self::at(path))
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(StorageError::AlreadyExists {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Opens the file at `path`, creating it empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if !Self::exists(path) {
            return Self::create(path);
        }
        Ok(Self::at(path))
    }

    /// Opens or creates the file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or file cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::open(path)
    }

    /// Returns true if a file exists at `path`.
    #[must_use]
    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    /// Deletes the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no file at `path`.
    pub fn delete(path: &Path) -> StorageResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::not_found(path)),
            Err(e) => Err(e.into()),
        }
    }

    /// Makes every append and rewrite call `sync_all` before returning.
    #[must_use]
    pub fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the size of the file in bytes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file is missing.
    pub fn size(&self) -> StorageResult<u64> {
        Ok(self.open_existing()?.metadata()?.len())
    }

    /// Terminates a final line that was left without a line terminator.
    ///
    /// A writer that dies mid-append can leave a partial last line with no
    /// newline. The next append would then be glued onto that fragment and
    /// both would read back as one malformed line. Call this once when taking
    /// ownership of a file to keep the fragment on a line of its own.
    ///
    /// Returns true if a terminator was appended.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file is missing.
    pub fn repair_tail(&mut self) -> StorageResult<bool> {
        let mut file = self.open_existing()?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(false);
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1))?;
        file.read_exact(&mut last)?;
        if last[0] == b'\n' {
            return Ok(false);
        }

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(LINE_TERMINATOR.as_bytes())?;
        if self.sync_on_write {
            file.sync_all()?;
        }
        tracing::warn!(path = %self.path.display(), "terminated unterminated last line");
        Ok(true)
    }

    fn at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            sync_on_write: false,
        }
    }

    fn open_existing(&self) -> StorageResult<File> {
        File::open(&self.path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::not_found(&self.path)
            } else {
                e.into()
            }
        })
    }

    fn rewrite_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(REWRITE_SUFFIX);
        self.path.with_file_name(name)
    }

    /// Reads every line as raw bytes, terminators stripped.
    fn read_raw_lines(&self) -> StorageResult<Vec<Vec<u8>>> {
        let reader = BufReader::new(self.open_existing()?);
        let mut lines = Vec::new();
        for bytes in reader.split(b'\n') {
            let mut bytes = bytes?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            lines.push(bytes);
        }
        Ok(lines)
    }

    /// Replaces the file contents with `lines` via write-then-rename.
    fn rewrite(&self, lines: &[Vec<u8>]) -> StorageResult<()> {
        let temp_path = self.rewrite_path();
        {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            for line in lines {
                writer.write_all(line)?;
                writer.write_all(LINE_TERMINATOR.as_bytes())?;
            }
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl LineBackend for LineFile {
    fn write_line(&mut self, text: &str) -> StorageResult<()> {
        check_single_line(text)?;

        let mut buffer = String::with_capacity(text.len() + LINE_TERMINATOR.len());
        buffer.push_str(text);
        buffer.push_str(LINE_TERMINATOR);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buffer.as_bytes())?;
        if self.sync_on_write {
            file.sync_all()?;
        }
        Ok(())
    }

    fn read_lines(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .read_raw_lines()?
            .into_iter()
            .enumerate()
            .map(|(index, bytes)| decode_line(bytes, index + 1))
            .collect())
    }

    // Untouched lines are copied byte for byte, invalid UTF-8 included.
    fn remove_line(&mut self, line_number: usize) -> StorageResult<()> {
        let mut lines = self.read_raw_lines()?;
        check_line_number(line_number, lines.len())?;
        lines.remove(line_number - 1);
        self.rewrite(&lines)
    }

    fn read_last_line(&self) -> StorageResult<Option<String>> {
        let mut file = self.open_existing()?;
        let mut pos = file.metadata()?.len();
        let mut chunk = vec![0u8; REVERSE_CHUNK_SIZE];
        // Bytes from the current scan position to the end of the last
        // non-empty line, trailing terminators removed.
        let mut tail: Vec<u8> = Vec::new();

        while pos > 0 {
            let step = pos.min(REVERSE_CHUNK_SIZE as u64);
            pos -= step;
            let buf = &mut chunk[..step as usize];
            file.seek(SeekFrom::Start(pos))?;
            file.read_exact(buf)?;

            let mut joined = Vec::with_capacity(buf.len() + tail.len());
            joined.extend_from_slice(buf);
            joined.extend_from_slice(&tail);
            tail = joined;

            while matches!(tail.last(), Some(b'\n' | b'\r')) {
                tail.pop();
            }
            if let Some(newline) = tail.iter().rposition(|&b| b == b'\n') {
                return Ok(Some(decode_line(tail.split_off(newline + 1), 0)));
            }
        }

        if tail.is_empty() {
            Ok(None)
        } else {
            Ok(Some(decode_line(tail, 0)))
        }
    }

    fn clear(&mut self) -> StorageResult<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        if self.sync_on_write {
            file.sync_all()?;
        }
        Ok(())
    }

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.size()? == 0)
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.open_existing()?.sync_all()?;
        Ok(())
    }
}

/// Decodes one line, replacing invalid UTF-8 so that a corrupt line stays a
/// single (unparsable) line instead of failing the whole read.
fn decode_line(bytes: Vec<u8>, line: usize) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(line, "line is not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn line_file(dir: &tempfile::TempDir) -> LineFile {
        LineFile::open(&dir.path().join("lines.db")).unwrap()
    }

    #[test]
    fn create_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");

        let file = LineFile::create(&path).unwrap();
        assert!(LineFile::exists(&path));
        assert!(file.is_empty().unwrap());
    }

    #[test]
    fn create_existing_fails_without_truncating() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");
        fs::write(&path, "keep me\n").unwrap();

        let result = LineFile::create(&path);
        assert!(matches!(result, Err(StorageError::AlreadyExists { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me\n");
    }

    #[test]
    fn open_keeps_existing_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");
        fs::write(&path, "a\nb\n").unwrap();

        let file = LineFile::open(&path).unwrap();
        assert_eq!(file.read_lines().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn delete_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");
        LineFile::create(&path).unwrap();

        LineFile::delete(&path).unwrap();
        assert!(!LineFile::exists(&path));
    }

    #[test]
    fn delete_missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = LineFile::delete(&dir.path().join("missing.db"));
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn is_empty_missing_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");
        let file = LineFile::create(&path).unwrap();
        LineFile::delete(&path).unwrap();

        assert!(matches!(file.is_empty(), Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn write_and_read_lines() {
        let dir = tempdir().unwrap();
        let mut file = line_file(&dir);

        file.write_line("first").unwrap();
        file.write_line("second").unwrap();
        file.write_line("").unwrap();
        file.write_line("fourth").unwrap();

        assert_eq!(
            file.read_lines().unwrap(),
            vec!["first", "second", "", "fourth"]
        );
        assert_eq!(file.line_count().unwrap(), 4);
        assert!(!file.is_empty().unwrap());
    }

    #[test]
    fn write_line_rejects_embedded_newline() {
        let dir = tempdir().unwrap();
        let mut file = line_file(&dir);

        let result = file.write_line("two\nlines");
        assert!(matches!(result, Err(StorageError::InvalidArgument { .. })));
        assert!(file.is_empty().unwrap());
    }

    #[test]
    fn read_lines_of_empty_file() {
        let dir = tempdir().unwrap();
        let file = line_file(&dir);
        assert!(file.read_lines().unwrap().is_empty());
    }

    #[test]
    fn read_lines_strips_crlf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");
        fs::write(&path, "a\r\nb\r\n").unwrap();

        let file = LineFile::open(&path).unwrap();
        assert_eq!(file.read_lines().unwrap(), vec!["a", "b"]);
        assert_eq!(file.read_last_line().unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn read_lines_replaces_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");
        fs::write(&path, b"ok\n\xff\xfe\n").unwrap();

        let file = LineFile::open(&path).unwrap();
        let lines = file.read_lines().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ok");
        assert!(lines[1].contains('\u{FFFD}'));
        assert!(file.read_last_line().unwrap().unwrap().contains('\u{FFFD}'));
    }

    #[test]
    fn remove_line_keeps_invalid_utf8_of_other_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");
        fs::write(&path, b"a\n\xff\xfebad\nb\n").unwrap();

        let mut file = LineFile::open(&path).unwrap();
        file.remove_line(3).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"a\n\xff\xfebad\n");

        file.remove_line(1).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"\xff\xfebad\n");
    }

    #[test]
    fn remove_middle_line() {
        let dir = tempdir().unwrap();
        let mut file = line_file(&dir);
        for line in ["1", "2", "3"] {
            file.write_line(line).unwrap();
        }

        file.remove_line(2).unwrap();
        assert_eq!(file.read_lines().unwrap(), vec!["1", "3"]);
        assert!(!file.rewrite_path().exists());
    }

    #[test]
    fn remove_first_and_last_line() {
        let dir = tempdir().unwrap();
        let mut file = line_file(&dir);
        for line in ["1", "2", "3"] {
            file.write_line(line).unwrap();
        }

        file.remove_line(3).unwrap();
        file.remove_line(1).unwrap();
        assert_eq!(file.read_lines().unwrap(), vec!["2"]);
    }

    #[test]
    fn remove_line_out_of_range() {
        let dir = tempdir().unwrap();
        let mut file = line_file(&dir);
        file.write_line("only").unwrap();

        assert!(matches!(
            file.remove_line(0),
            Err(StorageError::InvalidArgument { .. })
        ));
        assert!(matches!(
            file.remove_line(2),
            Err(StorageError::InvalidArgument { .. })
        ));
        assert_eq!(file.read_lines().unwrap(), vec!["only"]);
    }

    #[test]
    fn read_last_line_of_empty_file() {
        let dir = tempdir().unwrap();
        let file = line_file(&dir);
        assert_eq!(file.read_last_line().unwrap(), None);
    }

    #[test]
    fn read_last_line_skips_trailing_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");
        fs::write(&path, "a\nlast\n\n\n").unwrap();

        let file = LineFile::open(&path).unwrap();
        assert_eq!(file.read_last_line().unwrap().as_deref(), Some("last"));
    }

    #[test]
    fn read_last_line_without_trailing_terminator() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");
        fs::write(&path, "a\nb").unwrap();

        let file = LineFile::open(&path).unwrap();
        assert_eq!(file.read_last_line().unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn read_last_line_only_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.db");
        fs::write(&path, "\n\n\n").unwrap();

        let file = LineFile::open(&path).unwrap();
        assert_eq!(file.read_last_line().unwrap(), None);
    }

    #[test]
    fn read_last_line_spanning_chunks() {
        let dir = tempdir().unwrap();
        let mut file = line_file(&dir);
        let long = "x".repeat(REVERSE_CHUNK_SIZE * 2 + 17);
        file.write_line("short").unwrap();
        file.write_line(&long).unwrap();

        assert_eq!(file.read_last_line().unwrap(), Some(long));
    }

    #[test]
    fn read_last_line_multibyte_across_chunk_boundary() {
        let dir = tempdir().unwrap();
        let mut file = line_file(&dir);
        let line = "ż".repeat(REVERSE_CHUNK_SIZE);
        file.write_line("first").unwrap();
        file.write_line(&line).unwrap();

        assert_eq!(file.read_last_line().unwrap(), Some(line));
    }

    #[test]
    fn repair_tail_terminates_fragment() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("torn.db");
        fs::write(&path, "{\"id\":1}\n{\"id\":2,\"num").unwrap();

        let mut file = LineFile::open(&path).unwrap();
        assert!(file.repair_tail().unwrap());
        assert!(!file.repair_tail().unwrap());

        file.write_line("{\"id\":3}").unwrap();
        assert_eq!(
            file.read_lines().unwrap(),
            vec!["{\"id\":1}", "{\"id\":2,\"num", "{\"id\":3}"]
        );
    }

    #[test]
    fn repair_tail_leaves_clean_files_alone() {
        let dir = tempdir().unwrap();
        let mut file = line_file(&dir);
        assert!(!file.repair_tail().unwrap());

        file.write_line("a").unwrap();
        let size = file.size().unwrap();
        assert!(!file.repair_tail().unwrap());
        assert_eq!(file.size().unwrap(), size);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut file = line_file(&dir);
        file.write_line("data").unwrap();

        file.clear().unwrap();
        assert!(file.is_empty().unwrap());
        file.clear().unwrap();
        assert!(file.is_empty().unwrap());
    }

    #[test]
    fn create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("lines.db");

        let file = LineFile::open_with_create_dirs(&path).unwrap();
        assert!(file.is_empty().unwrap());
        assert_eq!(file.path(), path);
    }

    #[test]
    fn sync_on_write_appends() {
        let dir = tempdir().unwrap();
        let mut file = line_file(&dir).sync_on_write(true);
        file.write_line("durable").unwrap();
        assert!(file.sync().is_ok());
        assert_eq!(file.read_lines().unwrap(), vec!["durable"]);
    }
}
