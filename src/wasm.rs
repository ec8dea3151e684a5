//! WASM bindings for atlas-loader.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use crate::description::parse_atlas;
use crate::source::{BundleSource, ZipBundle};
use crate::{resolve, LoadOptions, TextureAtlas};
use std::sync::Arc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// A resolved atlas whose pages were read from a ZIP archive.
#[wasm_bindgen]
pub struct AtlasHandle {
    inner: TextureAtlas,
}

#[wasm_bindgen]
impl AtlasHandle {
    /// Parse atlas text and decode its pages from a ZIP file's bytes.
    ///
    /// Page file names are looked up at the root of the archive.
    #[wasm_bindgen(constructor)]
    pub fn new(atlas_text: &str, zip_data: &[u8], flip: Option<bool>) -> Result<AtlasHandle, JsError> {
        let options = LoadOptions::default().with_flip(flip.unwrap_or(false));
        let bundle = ZipBundle::from_bytes(zip_data.to_vec())
            .map_err(|e| JsError::new(&e.to_string()))?;
        let description = parse_atlas(atlas_text, "", &options.parse_options())
            .map_err(|e| JsError::new(&e.to_string()))?;
        let source = BundleSource::new(Arc::new(bundle));
        let atlas = resolve(&description, &source, &options)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(AtlasHandle { inner: atlas })
    }

    /// Get the number of pages.
    #[wasm_bindgen(getter)]
    pub fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    /// Get the number of regions.
    #[wasm_bindgen(getter)]
    pub fn region_count(&self) -> usize {
        self.inner.region_count()
    }

    /// Get every region name, in atlas order.
    pub fn region_names(&self) -> Vec<String> {
        self.inner.regions().iter().map(|r| r.name.clone()).collect()
    }

    /// Get `[u, v, u2, v2]` for the first region with this name.
    pub fn region_uvs(&self, name: &str) -> Option<Vec<f32>> {
        self.inner
            .find_region(name)
            .map(|r| vec![r.u, r.v, r.u2, r.v2])
    }

    /// Get the page index of the first region with this name.
    pub fn region_page(&self, name: &str) -> Option<usize> {
        self.inner.find_region(name).map(|r| r.page)
    }

    /// Get a page's width and height.
    pub fn page_size(&self, index: usize) -> Option<Vec<u32>> {
        self.inner
            .textures()
            .get(index)
            .map(|t| vec![t.width, t.height])
    }

    /// Get a page's RGBA pixels.
    pub fn page_rgba(&self, index: usize) -> Option<Vec<u8>> {
        self.inner.textures().get(index).map(|t| t.pixels.clone())
    }

    /// Release the page textures.
    pub fn dispose(&mut self) -> usize {
        self.inner.dispose()
    }
}
