//! Decoded page images.

use crate::error::{AtlasError, Result};
use image::ImageEncoder;
use std::io::Read;

/// An owned RGBA8 image backing one atlas page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl Texture {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode a texture from a byte stream.
    ///
    /// `path` only labels the error.
    pub fn decode<R: Read>(mut reader: R, path: &str) -> Result<Self> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| AtlasError::io(path, e))?;
        Self::decode_bytes(&data, path)
    }

    /// Decode a texture from encoded image bytes (PNG or JPEG).
    pub fn decode_bytes(data: &[u8], path: &str) -> Result<Self> {
        let img = image::load_from_memory(data).map_err(|source| AtlasError::Decode {
            path: path.to_string(),
            source,
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self::new(width, height, rgba.into_raw()))
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Copy out a rectangle, clipped to the texture bounds.
    pub fn crop(&self, left: u32, top: u32, width: u32, height: u32) -> Texture {
        let right = (left + width).min(self.width);
        let bottom = (top + height).min(self.height);
        let left = left.min(right);
        let top = top.min(bottom);
        let row_bytes = ((right - left) * 4) as usize;

        let mut pixels = Vec::with_capacity(row_bytes * (bottom - top) as usize);
        for y in top..bottom {
            let start = ((y * self.width + left) * 4) as usize;
            pixels.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }

        Texture::new(right - left, bottom - top, pixels)
    }

    /// Encode the texture as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder
            .write_image(
                &self.pixels,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|source| AtlasError::Decode {
                path: "<png encode>".to_string(),
                source,
            })?;

        Ok(bytes)
    }
}
