//! Filesystem capability.
//!
//! Opening a byte stream is the only platform-dependent step of loading a
//! page from disk, so it sits behind [`FileSystem`]. Sources and the loader
//! only ever talk to the trait.

use crate::error::{AtlasError, Result};
use std::collections::HashMap;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Read access to files by path.
pub trait FileSystem: Send + Sync {
    /// Open a buffered byte stream. Missing files fail with [`AtlasError::NotFound`].
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>>;
}

impl<T: FileSystem + ?Sized> FileSystem for std::sync::Arc<T> {
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        (**self).open(path)
    }
}

/// The host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let file = std::fs::File::open(path)
            .map_err(|e| AtlasError::io(path.display().to_string(), e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Files held in memory, keyed by path.
///
/// Useful where there is no host filesystem (WASM) and in tests.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, data: Vec<u8>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), data);
    }

    /// Check whether a file exists.
    pub fn contains(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        // Poisoning is ignored: the map is never left half-written.
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let data = files
            .get(path)
            .cloned()
            .ok_or_else(|| AtlasError::NotFound(path.display().to_string()))?;
        Ok(Box::new(Cursor::new(data)))
    }
}

/// Read a whole file as UTF-8 text through a filesystem capability.
pub fn read_to_string(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut text = String::new();
    fs.open(path)?
        .read_to_string(&mut text)
        .map_err(|e| AtlasError::io(path.display().to_string(), e))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_std_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StdFileSystem.open(&dir.path().join("nope.png")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_std_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.atlas");
        std::fs::write(&path, "page.png\n").unwrap();
        assert_eq!(read_to_string(&StdFileSystem, &path).unwrap(), "page.png\n");
    }

    #[test]
    fn test_memory_filesystem() {
        let fs = MemoryFileSystem::new();
        fs.insert("atlas/a.atlas", b"a.png\n".to_vec());
        assert!(fs.contains(Path::new("atlas/a.atlas")));
        assert_eq!(read_to_string(&fs, Path::new("atlas/a.atlas")).unwrap(), "a.png\n");

        let err = fs.open(Path::new("atlas/b.atlas")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_memory_filesystem_survives_poisoned_lock() {
        let fs = std::sync::Arc::new(MemoryFileSystem::new());
        fs.insert("a.atlas", b"old".to_vec());

        let writer = fs.clone();
        let _ = std::thread::spawn(move || {
            let _files = writer.files.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(fs.files.is_poisoned());

        fs.insert("a.atlas", b"new".to_vec());
        assert!(fs.contains(Path::new("a.atlas")));
        assert_eq!(read_to_string(fs.as_ref(), Path::new("a.atlas")).unwrap(), "new");
    }
}
