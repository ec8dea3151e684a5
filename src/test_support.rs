//! Fixtures shared by unit tests.

use crate::texture::Texture;
use std::io::Write;

#[cfg(feature = "http")]
use crate::error::{AtlasError, Result};
#[cfg(feature = "http")]
use std::collections::HashMap;
#[cfg(feature = "http")]
use std::path::Path;
#[cfg(feature = "http")]
use std::sync::Mutex;

/// PNG bytes of a solid texture.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    Texture::new(width, height, vec![128; (width * height * 4) as usize])
        .to_png()
        .unwrap()
}

/// ZIP archive bytes holding the given entries.
pub fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }
    buffer.into_inner()
}

/// A fetcher serving fixed bodies by URL, writing them into the target directory.
#[cfg(feature = "http")]
pub struct MapFetcher {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

#[cfg(feature = "http")]
impl MapFetcher {
    pub fn new(bodies: &[(&str, Vec<u8>)]) -> Self {
        Self {
            bodies: bodies
                .iter()
                .map(|(url, body)| (url.to_string(), body.clone()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(feature = "http")]
impl crate::source::remote::Fetcher for MapFetcher {
    fn download(&self, url: &reqwest::Url, target_dir: &Path) -> Result<std::path::PathBuf> {
        self.requests.lock().unwrap().push(url.to_string());
        let body = self
            .bodies
            .get(url.as_str())
            .ok_or_else(|| AtlasError::NotFound(url.to_string()))?;
        let name = crate::source::remote::file_name_of(url)?;
        std::fs::create_dir_all(target_dir).unwrap();
        let local = target_dir.join(name);
        std::fs::write(&local, body).unwrap();
        Ok(local)
    }
}
