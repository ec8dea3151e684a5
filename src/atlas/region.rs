//! Resolved atlas regions.

use crate::description::RegionValue;
use glam::Vec2;

/// A named rectangle in a page texture, ready for drawing.
///
/// UVs are normalized against the decoded texture size. `packed_width` and
/// `packed_height` describe the region's footprint in the image, so for a
/// rotated region they are the stored size swapped.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasRegion {
    pub name: String,
    /// Disambiguates regions sharing a name; -1 when absent.
    pub index: i32,
    /// Index of the owning page texture in the atlas.
    pub page: usize,
    pub left: i32,
    pub top: i32,
    pub packed_width: i32,
    pub packed_height: i32,
    pub u: f32,
    pub v: f32,
    pub u2: f32,
    pub v2: f32,
    /// Size in pixels derived from the UVs.
    pub region_width: i32,
    pub region_height: i32,
    /// Offset of the packed image within the original image.
    pub offset_x: f32,
    pub offset_y: f32,
    pub original_width: i32,
    pub original_height: i32,
    pub rotate: bool,
    pub degrees: i32,
    pub values: Vec<RegionValue>,
}

impl AtlasRegion {
    /// Create a region covering `left..left+width`, `top..top+height` of a
    /// texture sized `texture_width` x `texture_height`.
    ///
    /// The original size starts out equal to the packed size.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        page: usize,
        texture_width: u32,
        texture_height: u32,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
    ) -> Self {
        let mut region = Self {
            name: name.to_string(),
            index: -1,
            page,
            left,
            top,
            packed_width: width,
            packed_height: height,
            u: 0.0,
            v: 0.0,
            u2: 0.0,
            v2: 0.0,
            region_width: 0,
            region_height: 0,
            offset_x: 0.0,
            offset_y: 0.0,
            original_width: width,
            original_height: height,
            rotate: false,
            degrees: 0,
            values: Vec::new(),
        };
        region.set_uvs(texture_width, texture_height);
        region
    }

    fn set_uvs(&mut self, texture_width: u32, texture_height: u32) {
        let texture_width = texture_width.max(1) as f32;
        let texture_height = texture_height.max(1) as f32;
        let inv_width = 1.0 / texture_width;
        let inv_height = 1.0 / texture_height;

        let mut u = self.left as f32 * inv_width;
        let mut v = self.top as f32 * inv_height;
        // Widened so edges past i32::MAX cannot overflow.
        let mut u2 = (i64::from(self.left) + i64::from(self.packed_width)) as f32 * inv_width;
        let mut v2 = (i64::from(self.top) + i64::from(self.packed_height)) as f32 * inv_height;

        self.region_width = ((u2 - u).abs() * texture_width).round() as i32;
        self.region_height = ((v2 - v).abs() * texture_height).round() as i32;

        // A 1x1 region samples from the texel center to avoid bleeding.
        if self.region_width == 1 && self.region_height == 1 {
            let adjust_x = 0.25 * inv_width;
            u += adjust_x;
            u2 -= adjust_x;
            let adjust_y = 0.25 * inv_height;
            v += adjust_y;
            v2 -= adjust_y;
        }

        self.u = u;
        self.v = v;
        self.u2 = u2;
        self.v2 = v2;
    }

    /// Stored width: the packed width before the rotate swap.
    pub fn rotated_packed_width(&self) -> i32 {
        if self.rotate {
            self.packed_height
        } else {
            self.packed_width
        }
    }

    /// Stored height: the packed height before the rotate swap.
    pub fn rotated_packed_height(&self) -> i32 {
        if self.rotate {
            self.packed_width
        } else {
            self.packed_height
        }
    }

    /// Mirror the region's texture coordinates and rewrite the trim offsets
    /// so the image still lands inside its original bounds.
    pub fn flip(&mut self, x: bool, y: bool) {
        if x {
            std::mem::swap(&mut self.u, &mut self.u2);
            self.offset_x =
                self.original_width as f32 - self.offset_x - self.rotated_packed_width() as f32;
        }
        if y {
            std::mem::swap(&mut self.v, &mut self.v2);
            self.offset_y =
                self.original_height as f32 - self.offset_y - self.rotated_packed_height() as f32;
        }
    }

    pub fn is_flip_x(&self) -> bool {
        self.u > self.u2
    }

    pub fn is_flip_y(&self) -> bool {
        self.v > self.v2
    }

    /// Top-left UV corner.
    pub fn uv_min(&self) -> Vec2 {
        Vec2::new(self.u, self.v)
    }

    /// Bottom-right UV corner.
    pub fn uv_max(&self) -> Vec2 {
        Vec2::new(self.u2, self.v2)
    }

    /// Transform a local UV coordinate (0-1) to atlas coordinate.
    pub fn transform_uv(&self, u: f32, v: f32) -> Vec2 {
        self.uv_min() + (self.uv_max() - self.uv_min()) * Vec2::new(u, v)
    }

    /// Look up a custom value by name (e.g. `split`, `pad`).
    pub fn find_value(&self, name: &str) -> Option<&[i32]> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.values.as_slice())
    }
}
