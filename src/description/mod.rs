//! Atlas description parsing.
//!
//! This module handles the libGDX / Spine `.atlas` text format and the
//! immutable description it parses into: a list of pages (one image each)
//! and the regions packed into them.

pub mod parser;

pub use parser::{parse_atlas, ParseOptions};

use crate::error::{AtlasError, Result};
use serde::{Deserialize, Serialize};

/// Pixel format declared for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    Alpha,
    Intensity,
    LuminanceAlpha,
    #[serde(rename = "RGB565")]
    Rgb565,
    #[serde(rename = "RGBA4444")]
    Rgba4444,
    #[serde(rename = "RGB888")]
    Rgb888,
    #[default]
    #[serde(rename = "RGBA8888")]
    Rgba8888,
}

impl PixelFormat {
    /// Parse the format name used in `.atlas` files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Alpha" => Some(PixelFormat::Alpha),
            "Intensity" => Some(PixelFormat::Intensity),
            "LuminanceAlpha" => Some(PixelFormat::LuminanceAlpha),
            "RGB565" => Some(PixelFormat::Rgb565),
            "RGBA4444" => Some(PixelFormat::Rgba4444),
            "RGB888" => Some(PixelFormat::Rgb888),
            "RGBA8888" => Some(PixelFormat::Rgba8888),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::Alpha => "Alpha",
            PixelFormat::Intensity => "Intensity",
            PixelFormat::LuminanceAlpha => "LuminanceAlpha",
            PixelFormat::Rgb565 => "RGB565",
            PixelFormat::Rgba4444 => "RGBA4444",
            PixelFormat::Rgb888 => "RGB888",
            PixelFormat::Rgba8888 => "RGBA8888",
        }
    }
}

/// Texture filter declared for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureFilter {
    #[default]
    Nearest,
    Linear,
    MipMap,
    MipMapNearestNearest,
    MipMapLinearNearest,
    MipMapNearestLinear,
    MipMapLinearLinear,
}

impl TextureFilter {
    /// Parse the filter name used in `.atlas` files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Nearest" => Some(TextureFilter::Nearest),
            "Linear" => Some(TextureFilter::Linear),
            "MipMap" => Some(TextureFilter::MipMap),
            "MipMapNearestNearest" => Some(TextureFilter::MipMapNearestNearest),
            "MipMapLinearNearest" => Some(TextureFilter::MipMapLinearNearest),
            "MipMapNearestLinear" => Some(TextureFilter::MipMapNearestLinear),
            "MipMapLinearLinear" => Some(TextureFilter::MipMapLinearLinear),
            _ => None,
        }
    }

    /// Whether sampling with this filter needs mipmaps.
    pub fn is_mip_map(&self) -> bool {
        !matches!(self, TextureFilter::Nearest | TextureFilter::Linear)
    }
}

/// Texture wrap mode for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureWrap {
    #[default]
    ClampToEdge,
    Repeat,
}

/// One atlas page: an image file plus its declared settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDescription {
    /// File name as written in the atlas.
    pub file_name: String,
    /// File name joined onto the image directory given to the parser.
    pub texture_path: String,
    /// Declared width in pixels (0 when absent).
    pub width: u32,
    /// Declared height in pixels (0 when absent).
    pub height: u32,
    pub format: PixelFormat,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub u_wrap: TextureWrap,
    pub v_wrap: TextureWrap,
    pub use_mip_maps: bool,
    /// Premultiplied alpha.
    pub pma: bool,
}

impl PageDescription {
    /// Create a page with default settings.
    pub fn new(file_name: &str, texture_path: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            texture_path: texture_path.to_string(),
            width: 0,
            height: 0,
            format: PixelFormat::default(),
            min_filter: TextureFilter::default(),
            mag_filter: TextureFilter::default(),
            u_wrap: TextureWrap::default(),
            v_wrap: TextureWrap::default(),
            use_mip_maps: false,
            pma: false,
        }
    }
}

/// A custom `name: values` entry attached to a region (e.g. `split`, `pad`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionValue {
    pub name: String,
    pub values: Vec<i32>,
}

/// One named rectangle inside a page, as stored in the atlas file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDescription {
    /// Index of the owning page in [`AtlasDescription::pages`].
    pub page: usize,
    pub name: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub original_width: i32,
    pub original_height: i32,
    pub degrees: i32,
    /// True when `degrees == 90`.
    pub rotate: bool,
    /// Disambiguates regions sharing a name; -1 when absent.
    pub index: i32,
    /// Apply a vertical flip when resolving.
    pub flip: bool,
    pub values: Vec<RegionValue>,
}

impl RegionDescription {
    /// Create an unrotated, untrimmed region covering the given rectangle.
    pub fn new(page: usize, name: &str, left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            page,
            name: name.to_string(),
            left,
            top,
            width,
            height,
            offset_x: 0.0,
            offset_y: 0.0,
            original_width: width,
            original_height: height,
            degrees: 0,
            rotate: false,
            index: -1,
            flip: false,
            values: Vec::new(),
        }
    }

    /// Set rotation in degrees; `rotate` follows `degrees == 90`.
    pub fn with_degrees(mut self, degrees: i32) -> Self {
        self.degrees = degrees;
        self.rotate = degrees == 90;
        self
    }

    pub fn with_index(mut self, index: i32) -> Self {
        self.index = index;
        self
    }

    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    /// Look up a custom value by name.
    pub fn find_value(&self, name: &str) -> Option<&[i32]> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.values.as_slice())
    }
}

/// A parsed atlas description. Produced once, consumed by reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtlasDescription {
    pub pages: Vec<PageDescription>,
    pub regions: Vec<RegionDescription>,
}

impl AtlasDescription {
    pub fn new(pages: Vec<PageDescription>, regions: Vec<RegionDescription>) -> Self {
        Self { pages, regions }
    }

    /// Get the page a region belongs to.
    pub fn page_of(&self, region: &RegionDescription) -> Result<&PageDescription> {
        self.pages
            .get(region.page)
            .ok_or_else(|| AtlasError::MissingPage {
                region: region.name.clone(),
                page: region.page,
            })
    }
}

/// Join a file name onto an image directory using `/` separators.
///
/// "sub" + "a.png" -> "sub/a.png"
/// "" + "a.png" -> "a.png"
/// "/" + "a.png" -> "/a.png"
pub fn join_path(dir: &str, file_name: &str) -> String {
    if dir.is_empty() {
        file_name.to_string()
    } else if dir.ends_with('/') || dir.ends_with('\\') {
        format!("{}{}", dir, file_name)
    } else {
        format!("{}/{}", dir, file_name)
    }
}

/// Parent directory of a `/`-separated path, or "" when there is none.
///
/// "sub/a.atlas" -> "sub"
/// "/a.atlas" -> "/"
/// "a.atlas" -> ""
pub fn parent_dir(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(0) => &path[..1],
        Some(i) => &path[..i],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("sub", "a.png"), "sub/a.png");
        assert_eq!(join_path("", "a.png"), "a.png");
        assert_eq!(join_path("/", "a.png"), "/a.png");
        assert_eq!(join_path("assets/", "a.png"), "assets/a.png");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("sub/a.atlas"), "sub");
        assert_eq!(parent_dir("/sub/a.atlas"), "/sub");
        assert_eq!(parent_dir("/a.atlas"), "/");
        assert_eq!(parent_dir("a.atlas"), "");
    }

    #[test]
    fn test_page_of_missing() {
        let desc = AtlasDescription::new(
            vec![PageDescription::new("a.png", "a.png")],
            vec![RegionDescription::new(2, "orphan", 0, 0, 4, 4)],
        );
        let err = desc.page_of(&desc.regions[0]).unwrap_err();
        assert!(matches!(err, AtlasError::MissingPage { page: 2, .. }));
    }

    #[test]
    fn test_filter_mip_map() {
        assert!(!TextureFilter::Linear.is_mip_map());
        assert!(TextureFilter::MipMapLinearLinear.is_mip_map());
        assert_eq!(PixelFormat::from_name("RGB565"), Some(PixelFormat::Rgb565));
        assert_eq!(PixelFormat::from_name("rgb565"), None);
    }
}
