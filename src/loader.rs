//! Atlas loading from asset bundles, local files, and remote URLs.
//!
//! Every entry point reads the `.atlas` text, parses it, and resolves it
//! against the matching [`ImageSource`]. Whatever fails along the way comes
//! back as a single [`LoadError`].

use crate::atlas::{resolve, TextureAtlas};
use crate::config::LoadOptions;
use crate::description::{parent_dir, parse_atlas, AtlasDescription};
use crate::error::{AtlasError, LoadError, Result};
use crate::source::fs::{read_to_string, FileSystem, StdFileSystem};
use crate::source::{AssetBundle, BundleSource, FileSource, ImageSource};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "http")]
use crate::source::remote::{self, Fetcher, HttpFetcher, RemoteSource};

/// Load an atlas stored in an asset bundle.
///
/// Page images are looked up next to the atlas entry. A leading `/` on
/// `atlas_path` or on derived page paths is ignored.
pub fn load_from_bundle(
    atlas_path: &str,
    bundle: Arc<dyn AssetBundle>,
    options: &LoadOptions,
) -> std::result::Result<TextureAtlas, LoadError> {
    try_load_from_bundle(atlas_path, bundle, options).map_err(|e| LoadError::new(atlas_path, e))
}

fn try_load_from_bundle(
    atlas_path: &str,
    bundle: Arc<dyn AssetBundle>,
    options: &LoadOptions,
) -> Result<TextureAtlas> {
    let source = BundleSource::new(bundle);
    let mut text = String::new();
    source
        .open(atlas_path)?
        .read_to_string(&mut text)
        .map_err(|e| AtlasError::io(atlas_path, e))?;

    let description = parse_atlas(&text, parent_dir(atlas_path), &options.parse_options())?;
    resolve_from(atlas_path, &description, source.into(), options)
}

/// Load an atlas file from the host filesystem.
pub fn load_from_file<P: AsRef<Path>>(
    atlas_path: P,
    options: &LoadOptions,
) -> std::result::Result<TextureAtlas, LoadError> {
    load_from_file_with(atlas_path, Arc::new(StdFileSystem), options)
}

/// Load an atlas file through a filesystem capability.
pub fn load_from_file_with<P: AsRef<Path>>(
    atlas_path: P,
    fs: Arc<dyn FileSystem>,
    options: &LoadOptions,
) -> std::result::Result<TextureAtlas, LoadError> {
    let atlas_path = atlas_path.as_ref();
    try_load_from_file(atlas_path, fs, options)
        .map_err(|e| LoadError::new(atlas_path.display().to_string(), e))
}

fn try_load_from_file(
    atlas_path: &Path,
    fs: Arc<dyn FileSystem>,
    options: &LoadOptions,
) -> Result<TextureAtlas> {
    let text = read_to_string(fs.as_ref(), atlas_path)?;
    let image_dir = atlas_path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let description = parse_atlas(&text, &image_dir, &options.parse_options())?;
    let origin = atlas_path.display().to_string();
    resolve_from(&origin, &description, FileSource::new(fs).into(), options)
}

/// Download an atlas and its pages over HTTP into `target_dir`.
#[cfg(feature = "http")]
pub fn load_from_remote<P: AsRef<Path>>(
    atlas_url: &str,
    target_dir: P,
    options: &LoadOptions,
) -> std::result::Result<TextureAtlas, LoadError> {
    let fetcher = HttpFetcher::new(&options.http).map_err(|e| LoadError::new(atlas_url, e))?;
    load_from_remote_with(
        atlas_url,
        target_dir,
        Arc::new(fetcher),
        Arc::new(StdFileSystem),
        options,
    )
}

/// Download an atlas and its pages through a custom fetcher.
#[cfg(feature = "http")]
pub fn load_from_remote_with<P: AsRef<Path>>(
    atlas_url: &str,
    target_dir: P,
    fetcher: Arc<dyn Fetcher>,
    fs: Arc<dyn FileSystem>,
    options: &LoadOptions,
) -> std::result::Result<TextureAtlas, LoadError> {
    try_load_from_remote(atlas_url, target_dir.as_ref(), fetcher, fs, options)
        .map_err(|e| LoadError::new(atlas_url, e))
}

#[cfg(feature = "http")]
fn try_load_from_remote(
    atlas_url: &str,
    target_dir: &Path,
    fetcher: Arc<dyn Fetcher>,
    fs: Arc<dyn FileSystem>,
    options: &LoadOptions,
) -> Result<TextureAtlas> {
    let url = remote::parse_url(atlas_url)?;
    let local = fetcher.download(&url, target_dir)?;
    let text = read_to_string(fs.as_ref(), &local)?;

    let image_dir = target_dir.to_string_lossy();
    let description = parse_atlas(&text, &image_dir, &options.parse_options())?;
    let source = RemoteSource::new(url, target_dir, fetcher, fs);
    resolve_from(atlas_url, &description, source.into(), options)
}

fn resolve_from(
    origin: &str,
    description: &AtlasDescription,
    source: ImageSource,
    options: &LoadOptions,
) -> Result<TextureAtlas> {
    let atlas = resolve(description, &source, options)?;
    log::info!(
        "Loaded atlas {} ({}): {} pages, {} regions",
        origin,
        source.label(),
        atlas.page_count(),
        atlas.region_count()
    );
    Ok(atlas)
}

impl TextureAtlas {
    /// See [`load_from_bundle`].
    pub fn from_bundle(
        atlas_path: &str,
        bundle: Arc<dyn AssetBundle>,
        options: &LoadOptions,
    ) -> std::result::Result<Self, LoadError> {
        load_from_bundle(atlas_path, bundle, options)
    }

    /// See [`load_from_file`].
    pub fn from_file<P: AsRef<Path>>(
        atlas_path: P,
        options: &LoadOptions,
    ) -> std::result::Result<Self, LoadError> {
        load_from_file(atlas_path, options)
    }

    /// See [`load_from_remote`].
    #[cfg(feature = "http")]
    pub fn from_remote<P: AsRef<Path>>(
        atlas_url: &str,
        target_dir: P,
        options: &LoadOptions,
    ) -> std::result::Result<Self, LoadError> {
        load_from_remote(atlas_url, target_dir, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::source::{DirectoryBundle, MemoryFileSystem, ZipBundle};
    use crate::test_support::{png_bytes, zip_bytes};

    const HERO_ATLAS: &str = "
hero.png
size: 32, 32
filter: Linear, Linear
head
  bounds: 0, 0, 16, 16
torso
  bounds: 16, 0, 8, 24
  rotate: 90
head
  bounds: 0, 16, 16, 16

hero_2.png
size: 16, 16
weapon
  bounds: 0, 0, 16, 8
";

    fn write_fixture(dir: &Path) {
        std::fs::write(dir.join("hero.atlas"), HERO_ATLAS).unwrap();
        std::fs::write(dir.join("hero.png"), png_bytes(32, 32)).unwrap();
        std::fs::write(dir.join("hero_2.png"), png_bytes(16, 16)).unwrap();
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());

        let atlas = load_from_file(dir.path().join("hero.atlas"), &LoadOptions::default()).unwrap();
        assert_eq!(atlas.page_count(), 2);
        assert_eq!(atlas.region_count(), 4);

        let head = atlas.find_region("head").unwrap();
        assert_eq!(head.top, 0);
        let weapon = atlas.find_region("weapon").unwrap();
        assert_eq!(atlas.texture_for(weapon).unwrap().width, 16);
    }

    #[test]
    fn test_load_from_file_missing_page() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        std::fs::remove_file(dir.path().join("hero_2.png")).unwrap();

        let atlas_path = dir.path().join("hero.atlas");
        let err = load_from_file(&atlas_path, &LoadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.origin, atlas_path.display().to_string());
        assert!(matches!(err.cause, AtlasError::NotFound(ref p) if p.ends_with("hero_2.png")));
    }

    #[test]
    fn test_load_from_file_missing_atlas() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_file(dir.path().join("nothing.atlas"), &LoadOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_load_from_memory_filesystem() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("mem/hero.atlas", HERO_ATLAS.as_bytes().to_vec());
        fs.insert("mem/hero.png", png_bytes(32, 32));
        fs.insert("mem/hero_2.png", png_bytes(16, 16));

        let options = LoadOptions::default().with_flip(true);
        let atlas = load_from_file_with("mem/hero.atlas", fs, &options).unwrap();
        assert!(atlas.regions().iter().all(|r| r.is_flip_y()));
    }

    #[test]
    fn test_load_from_file_parse_error() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("bad.atlas", b"a.png\nsize: wide, tall\n".to_vec());
        let err = load_from_file_with("bad.atlas", fs, &LoadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_load_overflowing_bounds_is_load_error() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("far.atlas", b"a.png\nr\n  bounds: 2147483600, 0, 100, 4\n".to_vec());
        fs.insert("a.png", png_bytes(4, 4));
        let err = load_from_file_with("far.atlas", fs, &LoadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.origin, "far.atlas");
    }

    #[test]
    fn test_load_from_zip_bundle() {
        let data = zip_bytes(&[
            ("sub/hero.atlas", HERO_ATLAS.as_bytes().to_vec()),
            ("sub/hero.png", png_bytes(32, 32)),
            ("sub/hero_2.png", png_bytes(16, 16)),
        ]);
        let bundle = Arc::new(ZipBundle::from_bytes(data).unwrap());

        let atlas = load_from_bundle("/sub/hero.atlas", bundle, &LoadOptions::default()).unwrap();
        assert_eq!(atlas.page_count(), 2);
        assert_eq!(atlas.find_regions("head").len(), 2);
    }

    #[test]
    fn test_load_from_directory_bundle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("atlases")).unwrap();
        write_fixture(&dir.path().join("atlases"));

        let bundle = Arc::new(DirectoryBundle::new(dir.path()));
        let atlas = TextureAtlas::from_bundle("atlases/hero.atlas", bundle, &LoadOptions::default())
            .unwrap();
        assert_eq!(atlas.region_count(), 4);
    }

    #[test]
    fn test_bundle_missing_page_is_single_error() {
        let data = zip_bytes(&[
            ("hero.atlas", HERO_ATLAS.as_bytes().to_vec()),
            ("hero.png", png_bytes(32, 32)),
        ]);
        let bundle = Arc::new(ZipBundle::from_bytes(data).unwrap());
        let err = load_from_bundle("hero.atlas", bundle, &LoadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.origin, "hero.atlas");
    }

    #[cfg(feature = "http")]
    mod remote_loading {
        use super::*;
        use crate::test_support::MapFetcher;

        #[test]
        fn test_load_from_remote() {
            let dir = tempfile::tempdir().unwrap();
            let fetcher = Arc::new(MapFetcher::new(&[
                ("http://host/path/hero.atlas", HERO_ATLAS.as_bytes().to_vec()),
                ("http://host/path/hero.png", png_bytes(32, 32)),
                ("http://host/path/hero_2.png", png_bytes(16, 16)),
            ]));

            let atlas = load_from_remote_with(
                "http://host/path/hero.atlas",
                dir.path(),
                fetcher.clone(),
                Arc::new(StdFileSystem),
                &LoadOptions::default(),
            )
            .unwrap();

            assert_eq!(atlas.page_count(), 2);
            assert_eq!(
                fetcher.requests(),
                vec![
                    "http://host/path/hero.atlas".to_string(),
                    "http://host/path/hero.png".to_string(),
                    "http://host/path/hero_2.png".to_string(),
                ]
            );
            assert!(dir.path().join("hero.atlas").exists());
            assert!(dir.path().join("hero_2.png").exists());
        }

        #[test]
        fn test_load_from_remote_missing_page() {
            let dir = tempfile::tempdir().unwrap();
            let fetcher = Arc::new(MapFetcher::new(&[
                ("http://host/path/hero.atlas", HERO_ATLAS.as_bytes().to_vec()),
                ("http://host/path/hero.png", png_bytes(32, 32)),
            ]));
            let err = load_from_remote_with(
                "http://host/path/hero.atlas",
                dir.path(),
                fetcher,
                Arc::new(StdFileSystem),
                &LoadOptions::default(),
            )
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
            assert_eq!(err.origin, "http://host/path/hero.atlas");
        }

        #[test]
        fn test_load_from_remote_malformed_url() {
            let dir = tempfile::tempdir().unwrap();
            let err = load_from_remote_with(
                "host/path/hero.atlas",
                dir.path(),
                Arc::new(MapFetcher::new(&[])),
                Arc::new(StdFileSystem),
                &LoadOptions::default(),
            )
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedReference);
        }
    }
}
