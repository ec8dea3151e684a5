//! Parser for the libGDX / Spine `.atlas` text format.
//!
//! Both the current field names (`bounds`, `offsets`) and the legacy ones
//! (`xy`, `size`, `orig`, `offset`) are accepted.

use super::{
    join_path, AtlasDescription, PageDescription, PixelFormat, RegionDescription, RegionValue,
    TextureFilter, TextureWrap,
};
use crate::error::{AtlasError, Result};
use serde::{Deserialize, Serialize};

/// Options that change how an atlas is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Mark every region for a vertical flip.
    pub flip: bool,
    /// Stable-sort regions by `index` when any region declares one.
    pub sort_by_index: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            flip: false,
            sort_by_index: true,
        }
    }
}

/// A `key: v1, v2, ...` line, holding at most four values.
#[derive(Debug, PartialEq)]
struct Entry<'a> {
    key: &'a str,
    values: Vec<&'a str>,
}

impl<'a> Entry<'a> {
    fn int(&self, i: usize, line: usize) -> Result<i32> {
        let raw = self.values.get(i).ok_or_else(|| {
            AtlasError::parse(line, format!("'{}' needs at least {} values", self.key, i + 1))
        })?;
        raw.parse::<i32>().map_err(|_| {
            AtlasError::parse(line, format!("invalid integer '{}' for '{}'", raw, self.key))
        })
    }

    fn first(&self) -> &'a str {
        self.values.first().copied().unwrap_or("")
    }
}

/// Split a line at its first colon into a key and up to four comma-separated values.
fn read_entry(line: &str) -> Option<Entry<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (key, rest) = line.split_once(':')?;
    let mut values = Vec::with_capacity(4);
    let mut rest = rest;
    loop {
        match rest.split_once(',') {
            Some((value, tail)) if values.len() < 3 => {
                values.push(value.trim());
                rest = tail;
            }
            Some((value, _)) => {
                values.push(value.trim());
                break;
            }
            None => {
                values.push(rest.trim());
                break;
            }
        }
    }
    Some(Entry {
        key: key.trim(),
        values,
    })
}

/// Parse atlas text into a description.
///
/// `image_dir` is joined onto every page file name to form
/// [`PageDescription::texture_path`].
pub fn parse_atlas(text: &str, image_dir: &str, options: &ParseOptions) -> Result<AtlasDescription> {
    let lines: Vec<&str> = text.lines().collect();
    let mut pos = 0;

    // Leading blank lines, then header entries, are ignored.
    while pos < lines.len() && lines[pos].trim().is_empty() {
        pos += 1;
    }
    while pos < lines.len() && read_entry(lines[pos]).is_some() {
        pos += 1;
    }

    let mut pages: Vec<PageDescription> = Vec::new();
    let mut regions: Vec<RegionDescription> = Vec::new();
    let mut current_page: Option<usize> = None;
    let mut has_indexes = false;

    while pos < lines.len() {
        let line = lines[pos];
        if line.trim().is_empty() {
            current_page = None;
            pos += 1;
            continue;
        }

        match current_page {
            None => {
                let file_name = line.trim();
                let mut page = PageDescription::new(file_name, &join_path(image_dir, file_name));
                pos += 1;
                while let Some(entry) = lines.get(pos).and_then(|l| read_entry(l)) {
                    apply_page_field(&mut page, &entry, pos + 1)?;
                    pos += 1;
                }
                pages.push(page);
                current_page = Some(pages.len() - 1);
            }
            Some(page_index) => {
                let name_line = pos + 1;
                let mut region = RegionDescription {
                    page: page_index,
                    name: line.trim().to_string(),
                    left: 0,
                    top: 0,
                    width: 0,
                    height: 0,
                    offset_x: 0.0,
                    offset_y: 0.0,
                    original_width: 0,
                    original_height: 0,
                    degrees: 0,
                    rotate: false,
                    index: -1,
                    flip: options.flip,
                    values: Vec::new(),
                };
                pos += 1;
                while let Some(entry) = lines.get(pos).and_then(|l| read_entry(l)) {
                    apply_region_field(&mut region, &entry, pos + 1)?;
                    pos += 1;
                }
                if region.left.checked_add(region.width).is_none()
                    || region.top.checked_add(region.height).is_none()
                {
                    return Err(AtlasError::parse(
                        name_line,
                        format!("bounds of region '{}' overflow", region.name),
                    ));
                }
                if region.original_width == 0 && region.original_height == 0 {
                    region.original_width = region.width;
                    region.original_height = region.height;
                }
                if region.index != -1 {
                    has_indexes = true;
                }
                regions.push(region);
            }
        }
    }

    if has_indexes && options.sort_by_index {
        // Unindexed regions (-1) sort last; other negative indexes sort first.
        regions.sort_by_key(|r| if r.index == -1 { i32::MAX } else { r.index });
    }

    log::debug!(
        "Parsed atlas description: {} pages, {} regions",
        pages.len(),
        regions.len()
    );

    Ok(AtlasDescription::new(pages, regions))
}

fn apply_page_field(page: &mut PageDescription, entry: &Entry<'_>, line: usize) -> Result<()> {
    match entry.key {
        "size" => {
            page.width = non_negative(entry.int(0, line)?, line)?;
            page.height = non_negative(entry.int(1, line)?, line)?;
        }
        "format" => {
            page.format = PixelFormat::from_name(entry.first()).ok_or_else(|| {
                AtlasError::parse(line, format!("unknown pixel format '{}'", entry.first()))
            })?;
        }
        "filter" => {
            let min = entry.first();
            let mag = entry.values.get(1).copied().unwrap_or(min);
            page.min_filter = parse_filter(min, line)?;
            page.mag_filter = parse_filter(mag, line)?;
            page.use_mip_maps = page.min_filter.is_mip_map();
        }
        "repeat" => {
            let value = entry.first();
            if value.contains('x') {
                page.u_wrap = TextureWrap::Repeat;
            }
            if value.contains('y') {
                page.v_wrap = TextureWrap::Repeat;
            }
        }
        "pma" => page.pma = entry.first() == "true",
        other => log::debug!("Ignoring page field '{}' on line {}", other, line),
    }
    Ok(())
}

fn apply_region_field(region: &mut RegionDescription, entry: &Entry<'_>, line: usize) -> Result<()> {
    match entry.key {
        "xy" => {
            region.left = entry.int(0, line)?;
            region.top = entry.int(1, line)?;
        }
        "size" => {
            region.width = entry.int(0, line)?;
            region.height = entry.int(1, line)?;
        }
        "bounds" => {
            region.left = entry.int(0, line)?;
            region.top = entry.int(1, line)?;
            region.width = entry.int(2, line)?;
            region.height = entry.int(3, line)?;
        }
        "offset" => {
            region.offset_x = entry.int(0, line)? as f32;
            region.offset_y = entry.int(1, line)? as f32;
        }
        "orig" => {
            region.original_width = entry.int(0, line)?;
            region.original_height = entry.int(1, line)?;
        }
        "offsets" => {
            region.offset_x = entry.int(0, line)? as f32;
            region.offset_y = entry.int(1, line)? as f32;
            region.original_width = entry.int(2, line)?;
            region.original_height = entry.int(3, line)?;
        }
        "rotate" => {
            let degrees = match entry.first() {
                "true" => 90,
                "false" => 0,
                _ => entry.int(0, line)?,
            };
            region.degrees = degrees;
            region.rotate = degrees == 90;
        }
        "index" => region.index = entry.int(0, line)?,
        name => {
            // Non-integer values are kept as 0 so positions stay meaningful.
            let values = entry
                .values
                .iter()
                .map(|v| v.parse::<i32>().unwrap_or(0))
                .collect();
            region.values.push(RegionValue {
                name: name.to_string(),
                values,
            });
        }
    }
    Ok(())
}

fn parse_filter(name: &str, line: usize) -> Result<TextureFilter> {
    TextureFilter::from_name(name)
        .ok_or_else(|| AtlasError::parse(line, format!("unknown texture filter '{}'", name)))
}

fn non_negative(value: i32, line: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| AtlasError::parse(line, format!("negative size {}", value)))
}
