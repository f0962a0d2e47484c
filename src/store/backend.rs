//! Durable storage for the serialized log collection
//!
//! A backend holds exactly one named record: the JSON array written by
//! [`LogStore::save`](super::LogStore::save).

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

use super::StoreError;

/// Storage medium that survives across sessions
pub trait Backend {
    /// Read the persisted record, `None` if nothing has been stored yet
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replace the persisted record
    fn write(&self, content: &str) -> Result<(), StoreError>;
}

/// Stores the record as a JSON file
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Backend for FileBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io("Failed to read log store", e)),
        }
    }

    fn write(&self, content: &str) -> Result<(), StoreError> {
        // Write-then-rename so an interrupted write keeps the previous record
        let temp = self.temp_path();
        std::fs::write(&temp, content)
            .map_err(|e| StoreError::io("Failed to write log store", e))?;
        std::fs::rename(&temp, &self.path)
            .map_err(|e| StoreError::io("Failed to replace log store", e))
    }
}

/// In-process backend; contents vanish with the value
///
/// Writes can be made to fail on demand to exercise persistence error paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    record: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds a record
    pub fn with_record(content: impl Into<String>) -> Self {
        let backend = Self::default();
        backend.record.replace(Some(content.into()));
        backend
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Current record contents
    pub fn record(&self) -> Option<String> {
        self.record.borrow().clone()
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl Backend for MemoryBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.record.borrow().clone())
    }

    fn write(&self, content: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.record.replace(Some(content.to_string()));
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl<B: Backend + ?Sized> Backend for &B {
    fn read(&self) -> Result<Option<String>, StoreError> {
        (**self).read()
    }

    fn write(&self, content: &str) -> Result<(), StoreError> {
        (**self).write(content)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn read(&self) -> Result<Option<String>, StoreError> {
        (**self).read()
    }

    fn write(&self, content: &str) -> Result<(), StoreError> {
        (**self).write(content)
    }
}
