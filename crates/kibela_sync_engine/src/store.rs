//! Local document storage.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where documents are read from and written to.
pub trait DocumentStore {
    /// Writes `text` under `file_name`, replacing any existing file, and
    /// returns the full path written.
    fn write(&self, file_name: &str, text: &str) -> io::Result<PathBuf>;

    /// Reads the file at `path`.
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Stores documents as files in a directory.
///
/// The directory is created on first write.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The sync directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentStore for DirectoryStore {
    fn write(&self, file_name: &str, text: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(file_name);
        fs::write(&path, text)?;
        debug!(path = %path.display(), bytes = text.len(), "wrote document");
        Ok(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// An in-memory store for testing.
///
/// Can be told to fail a given write to exercise partial failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<PathBuf, String>>,
    writes: RwLock<usize>,
    fail_on_write: Option<usize>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`-th write (1-based) fail.
    pub fn failing_on_write(mut self, n: usize) -> Self {
        self.fail_on_write = Some(n);
        self
    }

    /// Adds a file.
    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.write().insert(path.into(), text.into());
    }

    /// Returns the contents of a file.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.read().get(path.as_ref()).cloned()
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.read().keys().cloned().collect()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn write(&self, file_name: &str, text: &str) -> io::Result<PathBuf> {
        let attempt = {
            let mut writes = self.writes.write();
            *writes += 1;
            *writes
        };
        if self.fail_on_write == Some(attempt) {
            return Err(io::Error::other(format!("injected failure on write {attempt}")));
        }
        let path = PathBuf::from(file_name);
        self.files.write().insert(path.clone(), text.to_string());
        Ok(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })
    }
}
