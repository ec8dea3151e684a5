//! Resolved texture atlases.
//!
//! A [`TextureAtlas`] owns one decoded texture per page and a list of
//! regions pointing into them. It is built once by [`resolver::resolve`]
//! and then only read.

mod region;
pub mod resolver;

pub use region::AtlasRegion;
pub use resolver::resolve;

use crate::texture::Texture;

/// Decoded page textures plus the regions that index into them.
#[derive(Debug, Default)]
pub struct TextureAtlas {
    textures: Vec<Texture>,
    regions: Vec<AtlasRegion>,
}

impl TextureAtlas {
    pub(crate) fn from_parts(textures: Vec<Texture>, regions: Vec<AtlasRegion>) -> Self {
        Self { textures, regions }
    }

    /// All page textures, in page order.
    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// All regions, in description order.
    pub fn regions(&self) -> &[AtlasRegion] {
        &self.regions
    }

    pub fn page_count(&self) -> usize {
        self.textures.len()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Returns the first region with the given name.
    ///
    /// This scans every region, so cache the result instead of calling it
    /// each frame.
    pub fn find_region(&self, name: &str) -> Option<&AtlasRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Returns the first region with the given name and index.
    pub fn find_region_with_index(&self, name: &str, index: i32) -> Option<&AtlasRegion> {
        self.regions
            .iter()
            .find(|r| r.name == name && r.index == index)
    }

    /// Returns every region with the given name, in order.
    pub fn find_regions(&self, name: &str) -> Vec<&AtlasRegion> {
        self.regions.iter().filter(|r| r.name == name).collect()
    }

    /// Regions packed into one page, in order.
    pub fn regions_on_page(&self, page: usize) -> impl Iterator<Item = &AtlasRegion> {
        self.regions.iter().filter(move |r| r.page == page)
    }

    /// The page texture a region points into.
    pub fn texture_for(&self, region: &AtlasRegion) -> Option<&Texture> {
        self.textures.get(region.page)
    }

    /// Copy a region's packed pixels out of its page texture.
    pub fn region_pixels(&self, region: &AtlasRegion) -> Option<Texture> {
        let texture = self.texture_for(region)?;
        Some(texture.crop(
            region.left.max(0) as u32,
            region.top.max(0) as u32,
            region.packed_width.max(0) as u32,
            region.packed_height.max(0) as u32,
        ))
    }

    /// Check if the atlas has released its textures.
    pub fn is_disposed(&self) -> bool {
        self.textures.is_empty() && self.regions.is_empty()
    }

    /// Release every owned texture. Returns how many were released; calling
    /// again releases nothing.
    pub fn dispose(&mut self) -> usize {
        let released = self.textures.len();
        self.textures.clear();
        self.textures.shrink_to_fit();
        self.regions.clear();
        if released > 0 {
            log::debug!("Disposed atlas: released {} textures", released);
        }
        released
    }
}
