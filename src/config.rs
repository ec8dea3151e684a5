//! Load configuration.

use crate::description::ParseOptions;
use crate::error::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP settings used by the remote loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpOptions {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Honor `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("atlas-loader/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}

/// Options for loading an atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Flip every region vertically (for y-up texture coordinates).
    pub flip: bool,
    /// Stable-sort regions by `index` when parsing.
    pub sort_by_index: bool,
    /// Acquire pages on the rayon pool. Output order is unaffected.
    pub parallel: bool,
    /// HTTP settings for remote loads.
    pub http: HttpOptions,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            flip: false,
            sort_by_index: true,
            parallel: false,
            http: HttpOptions::default(),
        }
    }
}

impl LoadOptions {
    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_sort_by_index(mut self, sort_by_index: bool) -> Self {
        self.sort_by_index = sort_by_index;
        self
    }

    pub fn with_http_timeout(mut self, secs: u64) -> Self {
        self.http.timeout_secs = secs;
        self
    }

    /// Parser settings derived from these options.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            flip: self.flip,
            sort_by_index: self.sort_by_index,
        }
    }

    /// Read options from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read options from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AtlasError::io(path.display().to_string(), e))?;
        Self::from_json_str(&json)
    }
}
