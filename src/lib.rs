//! # Atlas Loader
//!
//! A Rust library for loading libGDX / Spine texture atlases.
//!
//! ## Overview
//!
//! This library takes a `.atlas` description and the page images it names,
//! and produces a [`TextureAtlas`]: one decoded texture per page plus the
//! named regions packed into them, with rotation and flip already applied to
//! the region geometry.
//!
//! Page images can come from an asset bundle (a directory or a ZIP archive),
//! the local filesystem, or a remote HTTP server.
//!
//! ## Quick Start
//!
//! ```ignore
//! use atlas_loader::{load_atlas, LoadOptions};
//!
//! // Load an atlas and its pages from disk
//! let atlas = load_atlas("assets/spineboy.atlas", &LoadOptions::default())?;
//!
//! // Look regions up once and keep them
//! let head = atlas.find_region("head").expect("no head region");
//! let texture = atlas.texture_for(head).unwrap();
//! println!("head uses a {}x{} page", texture.width, texture.height);
//! ```
//!
//! ## Other Sources
//!
//! ```ignore
//! use atlas_loader::{load_atlas_from_bundle, load_atlas_from_url, LoadOptions, ZipBundle};
//! use std::sync::Arc;
//!
//! // From an APK-style ZIP of assets
//! let bundle = Arc::new(ZipBundle::from_path("app.apk")?);
//! let atlas = load_atlas_from_bundle("assets/spineboy.atlas", bundle, &LoadOptions::default())?;
//!
//! // From a web server, caching files in a local directory
//! let atlas = load_atlas_from_url(
//!     "https://example.com/skeletons/spineboy.atlas",
//!     "/tmp/atlas-cache",
//!     &LoadOptions::default(),
//! )?;
//! ```

pub mod error;
pub mod config;
pub mod description;
pub mod texture;
pub mod source;
pub mod atlas;
pub mod loader;

// Re-export main types for convenience
pub use error::{AtlasError, ErrorKind, LoadError, Result};
pub use config::{HttpOptions, LoadOptions};
pub use description::{parse_atlas, AtlasDescription, PageDescription, ParseOptions, RegionDescription};
pub use texture::Texture;
pub use source::{
    AssetBundle, BundleSource, DirectoryBundle, FileSource, FileSystem, ImageAcquirer, ImageSource,
    MemoryFileSystem, StdFileSystem, ZipBundle,
};
#[cfg(feature = "http")]
pub use source::{Fetcher, HttpFetcher, RemoteSource};
pub use atlas::{resolve, AtlasRegion, TextureAtlas};

use std::path::Path;
use std::sync::Arc;

/// Load an atlas file and its page images from disk.
pub fn load_atlas<P: AsRef<Path>>(path: P, options: &LoadOptions) -> std::result::Result<TextureAtlas, LoadError> {
    loader::load_from_file(path, options)
}

/// Load an atlas and its page images from an asset bundle.
pub fn load_atlas_from_bundle(
    path: &str,
    bundle: Arc<dyn AssetBundle>,
    options: &LoadOptions,
) -> std::result::Result<TextureAtlas, LoadError> {
    loader::load_from_bundle(path, bundle, options)
}

/// Download an atlas and its page images into `target_dir`.
#[cfg(feature = "http")]
pub fn load_atlas_from_url<P: AsRef<Path>>(
    url: &str,
    target_dir: P,
    options: &LoadOptions,
) -> std::result::Result<TextureAtlas, LoadError> {
    loader::load_from_remote(url, target_dir, options)
}

#[cfg(feature = "wasm")]
pub mod wasm;

#[cfg(test)]
mod test_support;
