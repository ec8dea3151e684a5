//! Resolve a parsed description into textures and regions.

use super::{AtlasRegion, TextureAtlas};
use crate::config::LoadOptions;
use crate::description::{AtlasDescription, PageDescription, RegionDescription};
use crate::error::Result;
use crate::source::ImageAcquirer;
use crate::texture::Texture;

/// Acquire every page image and build every region.
///
/// Pages are acquired once each, in order; regions keep description order.
/// Any failure aborts the whole resolve and nothing acquired so far survives.
pub fn resolve<A: ImageAcquirer + ?Sized>(
    description: &AtlasDescription,
    acquirer: &A,
    options: &LoadOptions,
) -> Result<TextureAtlas> {
    // Check page references before doing any I/O.
    for region in &description.regions {
        description.page_of(region)?;
    }

    let textures = acquire_pages(&description.pages, acquirer, options.parallel)?;

    let regions = description
        .regions
        .iter()
        .map(|region| build_region(region, &textures[region.page]))
        .collect();

    Ok(TextureAtlas::from_parts(textures, regions))
}

fn acquire_page<A: ImageAcquirer + ?Sized>(page: &PageDescription, acquirer: &A) -> Result<Texture> {
    let texture = acquirer.acquire(&page.texture_path)?;
    if (page.width, page.height) != (0, 0) && (page.width, page.height) != (texture.width, texture.height) {
        log::debug!(
            "Page {} declares {}x{} but decoded to {}x{}",
            page.file_name,
            page.width,
            page.height,
            texture.width,
            texture.height
        );
    }
    log::debug!("Acquired page {} ({}x{})", page.texture_path, texture.width, texture.height);
    Ok(texture)
}

fn acquire_pages<A: ImageAcquirer + ?Sized>(
    pages: &[PageDescription],
    acquirer: &A,
    parallel: bool,
) -> Result<Vec<Texture>> {
    #[cfg(feature = "parallel")]
    {
        if parallel && pages.len() > 1 {
            use rayon::prelude::*;
            // Indexed collect keeps page order.
            return pages
                .par_iter()
                .map(|page| acquire_page(page, acquirer))
                .collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    {
        if parallel {
            log::debug!("Parallel page loading requested without the `parallel` feature");
        }
    }

    pages.iter().map(|page| acquire_page(page, acquirer)).collect()
}

/// Build one region against its page texture.
pub fn build_region(region: &RegionDescription, texture: &Texture) -> AtlasRegion {
    let (width, height) = if region.rotate {
        (region.height, region.width)
    } else {
        (region.width, region.height)
    };

    let mut atlas_region = AtlasRegion::new(
        &region.name,
        region.page,
        texture.width,
        texture.height,
        region.left,
        region.top,
        width,
        height,
    );
    atlas_region.index = region.index;
    atlas_region.offset_x = region.offset_x;
    atlas_region.offset_y = region.offset_y;
    atlas_region.original_width = region.original_width;
    atlas_region.original_height = region.original_height;
    atlas_region.rotate = region.rotate;
    atlas_region.degrees = region.degrees;
    atlas_region.values = region.values.clone();
    if region.flip {
        atlas_region.flip(false, true);
    }
    atlas_region
}
