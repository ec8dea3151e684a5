//! Error types for atlas loading.

use thiserror::Error;

/// Result type alias using AtlasError.
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Broad category of an [`AtlasError`], stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The atlas description, a page image, or a referenced page is missing.
    NotFound,
    /// Bytes do not form a valid image.
    Decode,
    /// The network fetch failed.
    Transport,
    /// A path or URL could not be built from the atlas references.
    MalformedReference,
    /// The atlas description text is malformed.
    Parse,
    /// Any other I/O or archive failure.
    Io,
}

/// Main error type for atlas operations.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// Description or image not present in its source.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A region refers to a page the description does not declare.
    #[error("Region '{region}' references missing page {page}")]
    MissingPage { region: String, page: usize },

    /// Failed to decode image bytes.
    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Network fetch failed.
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Path or URL construction failed.
    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    /// Atlas description could not be parsed.
    #[error("Atlas parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// I/O error while reading a specific path.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to parse JSON configuration.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl AtlasError {
    /// Map this error onto its kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AtlasError::NotFound(_) | AtlasError::MissingPage { .. } => ErrorKind::NotFound,
            AtlasError::Decode { .. } => ErrorKind::Decode,
            AtlasError::Transport { .. } => ErrorKind::Transport,
            AtlasError::MalformedReference(_) => ErrorKind::MalformedReference,
            AtlasError::Parse { .. } | AtlasError::Config(_) => ErrorKind::Parse,
            AtlasError::Io { .. } => ErrorKind::Io,
            AtlasError::Zip(zip::result::ZipError::FileNotFound) => ErrorKind::NotFound,
            AtlasError::Zip(_) => ErrorKind::Io,
        }
    }

    /// Wrap an I/O error for `path`, turning `NotFound` into [`AtlasError::NotFound`].
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            AtlasError::NotFound(path)
        } else {
            AtlasError::Io { path, source }
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        AtlasError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// The single error surfaced by the load entry points.
///
/// Whatever stage failed (reading the description, parsing it, acquiring a
/// page image, building regions), the caller sees one `LoadError` naming the
/// atlas that was being loaded, with the original failure as its source.
#[derive(Error, Debug)]
#[error("Failed to load atlas {origin}: {cause}")]
pub struct LoadError {
    /// Path or URL of the atlas being loaded.
    pub origin: String,
    /// The failure that aborted the load.
    #[source]
    pub cause: AtlasError,
}

impl LoadError {
    pub fn new(origin: impl Into<String>, cause: AtlasError) -> Self {
        Self {
            origin: origin.into(),
            cause,
        }
    }

    /// Kind of the underlying failure.
    pub fn kind(&self) -> ErrorKind {
        self.cause.kind()
    }
}
