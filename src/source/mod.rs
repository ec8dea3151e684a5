//! Page image acquisition.
//!
//! Each atlas page names an image file. Where the bytes come from depends on
//! how the atlas itself was loaded: an asset bundle, the local filesystem, or
//! a remote server. All three share the [`ImageAcquirer`] contract and differ
//! only in the byte source.

pub mod bundle;
pub mod fs;
#[cfg(feature = "http")]
pub mod remote;

pub use bundle::{AssetBundle, BundleSource, DirectoryBundle, ZipBundle};
pub use fs::{FileSystem, MemoryFileSystem, StdFileSystem};
#[cfg(feature = "http")]
pub use remote::{Fetcher, HttpFetcher, RemoteSource};

use crate::error::Result;
use crate::texture::Texture;
use std::path::Path;
use std::sync::Arc;

/// Turns a page's texture path into a decoded image.
pub trait ImageAcquirer: Sync {
    fn acquire(&self, texture_path: &str) -> Result<Texture>;
}

impl<T: ImageAcquirer + ?Sized> ImageAcquirer for &T {
    fn acquire(&self, texture_path: &str) -> Result<Texture> {
        (**self).acquire(texture_path)
    }
}

/// Acquires page images from the filesystem.
///
/// Texture paths already carry the atlas file's directory, so they are
/// opened as-is.
#[derive(Clone)]
pub struct FileSource {
    fs: Arc<dyn FileSystem>,
}

impl FileSource {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(Arc::new(StdFileSystem))
    }
}

impl ImageAcquirer for FileSource {
    fn acquire(&self, texture_path: &str) -> Result<Texture> {
        let reader = self.fs.open(Path::new(texture_path))?;
        Texture::decode(reader, texture_path)
    }
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource").finish_non_exhaustive()
    }
}

/// The closed set of page image origins.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bundle(BundleSource),
    File(FileSource),
    #[cfg(feature = "http")]
    Remote(RemoteSource),
}

impl ImageSource {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            ImageSource::Bundle(_) => "bundle",
            ImageSource::File(_) => "file",
            #[cfg(feature = "http")]
            ImageSource::Remote(_) => "remote",
        }
    }
}

impl ImageAcquirer for ImageSource {
    fn acquire(&self, texture_path: &str) -> Result<Texture> {
        match self {
            ImageSource::Bundle(source) => source.acquire(texture_path),
            ImageSource::File(source) => source.acquire(texture_path),
            #[cfg(feature = "http")]
            ImageSource::Remote(source) => source.acquire(texture_path),
        }
    }
}

impl From<BundleSource> for ImageSource {
    fn from(source: BundleSource) -> Self {
        ImageSource::Bundle(source)
    }
}

impl From<FileSource> for ImageSource {
    fn from(source: FileSource) -> Self {
        ImageSource::File(source)
    }
}

#[cfg(feature = "http")]
impl From<RemoteSource> for ImageSource {
    fn from(source: RemoteSource) -> Self {
        ImageSource::Remote(source)
    }
}
