//! Line-oriented backing files.
//!
//! Both stores persist the same way: single entries are appended, edits
//! rewrite the whole file. Rewrites go through a temp file and a rename so a
//! crash mid-write leaves the previous content in place.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackingFile {
    path: PathBuf,
}

impl BackingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file; `None` when it does not exist yet.
    pub fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io("read", &self.path, e)),
        }
    }

    /// Append one line without touching earlier content.
    pub fn append_line(&self, line: &str) -> Result<()> {
        let leading_newline = self.needs_leading_newline()?;
        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io("open", &self.path, e))?;
        let mut buffer = String::with_capacity(line.len() + 2);
        if leading_newline {
            buffer.push('\n');
        }
        buffer.push_str(line);
        buffer.push('\n');
        file.write_all(buffer.as_bytes())
            .map_err(|e| StoreError::io("write", &self.path, e))?;
        tracing::debug!(path = %self.path.display(), "appended line");
        Ok(())
    }

    /// Replace the file content with `lines`, one per line.
    pub fn rewrite<I, S>(&self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut content = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }
        self.replace_contents(content.as_bytes())
    }

    /// Atomically replace the file content (temp file + rename).
    pub fn replace_contents(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_parent()?;
        let temp_path = self.temp_path();

        let mut file =
            File::create(&temp_path).map_err(|e| StoreError::io("create", &temp_path, e))?;
        file.write_all(bytes)
            .map_err(|e| StoreError::io("write", &temp_path, e))?;
        file.sync_all()
            .map_err(|e| StoreError::io("sync", &temp_path, e))?;

        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::io("replace", &self.path, e))?;

        tracing::info!(path = %self.path.display(), bytes = bytes.len(), "rewrote file");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io("create directory", parent, e))?;
        }
        Ok(())
    }

    /// True when the file has content that does not end with a newline.
    fn needs_leading_newline(&self) -> Result<bool> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(StoreError::io("open", &self.path, e)),
        };
        let len = file
            .metadata()
            .map_err(|e| StoreError::io("read", &self.path, e))?
            .len();
        if len == 0 {
            return Ok(false);
        }
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))
            .and_then(|_| file.read_exact(&mut last))
            .map_err(|e| StoreError::io("read", &self.path, e))?;
        Ok(last[0] != b'\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let file = BackingFile::new(dir.path().join("absent.txt"));
        assert_eq!(file.read().unwrap(), None);
    }

    #[test]
    fn append_adds_separator_when_last_line_is_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.txt");
        fs::write(&path, "first").unwrap();
        let file = BackingFile::new(&path);
        file.append_line("second").unwrap();
        file.append_line("third").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\nthird\n");
    }

    #[test]
    fn append_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("records.txt");
        BackingFile::new(&path).append_line("only").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "only\n");
    }

    #[test]
    fn rewrite_replaces_content_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.txt");
        fs::write(&path, "old\nlines\n").unwrap();
        let file = BackingFile::new(&path);
        file.rewrite(["new"]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert!(!dir.path().join("catalog.txt.tmp").exists());
    }
}
