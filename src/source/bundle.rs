//! Asset bundles: read-only trees of files addressed by relative path.
//!
//! A bundle is either a directory on disk or a ZIP archive held in memory
//! (an APK's `assets/` folder is the latter).

use super::ImageAcquirer;
use crate::error::{AtlasError, Result};
use crate::texture::Texture;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Read access to bundled assets.
pub trait AssetBundle: Send + Sync {
    /// Open an asset by its bundle-relative path.
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>>;
}

impl<T: AssetBundle + ?Sized> AssetBundle for Arc<T> {
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        (**self).open(path)
    }
}

/// Strip one leading path separator.
///
/// "/sub/img.png" -> "sub/img.png"
pub fn strip_leading_separator(path: &str) -> &str {
    path.strip_prefix('/')
        .or_else(|| path.strip_prefix('\\'))
        .unwrap_or(path)
}

/// A bundle rooted at a directory.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetBundle for DirectoryBundle {
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        let full = self.root.join(path);
        let file = std::fs::File::open(&full).map_err(|e| AtlasError::io(path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// A bundle backed by ZIP archive bytes.
pub struct ZipBundle {
    archive: Mutex<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl ZipBundle {
    /// Open a bundle from ZIP data.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: Mutex::new(archive),
        })
    }

    /// Open a bundle from a ZIP file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| AtlasError::io(path.display().to_string(), e))?;
        Self::from_bytes(data)
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.archive.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ZipBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipBundle").field("entries", &self.len()).finish()
    }
}

impl AssetBundle for ZipBundle {
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        // Poisoning is ignored: every lookup seeks from the central directory.
        let mut archive = self.archive.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entry = match archive.by_name(path) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(AtlasError::NotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        // Entries borrow the archive, so copy the bytes out before unlocking.
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| AtlasError::io(path, e))?;
        Ok(Box::new(Cursor::new(data)))
    }
}

/// Acquires page images from an asset bundle.
#[derive(Clone)]
pub struct BundleSource {
    bundle: Arc<dyn AssetBundle>,
}

impl BundleSource {
    pub fn new(bundle: Arc<dyn AssetBundle>) -> Self {
        Self { bundle }
    }

    /// Open a bundle entry, ignoring a leading separator.
    pub fn open(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        self.bundle.open(strip_leading_separator(path))
    }
}

impl ImageAcquirer for BundleSource {
    fn acquire(&self, texture_path: &str) -> Result<Texture> {
        let path = strip_leading_separator(texture_path);
        let reader = self.bundle.open(path)?;
        Texture::decode(reader, path)
    }
}

impl std::fmt::Debug for BundleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleSource").finish_non_exhaustive()
    }
}
