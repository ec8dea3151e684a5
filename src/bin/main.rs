//! Atlas Loader CLI
//!
//! Inspect libGDX / Spine texture atlases and extract regions.

use atlas_loader::{
    load_atlas, load_atlas_from_bundle, AssetBundle, AtlasRegion, DirectoryBundle, LoadOptions,
    TextureAtlas, ZipBundle,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "atlas-loader")]
#[command(author, version, about = "Inspect libGDX / Spine texture atlases", long_about = None)]
struct Cli {
    /// JSON file with load options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read the atlas from an asset bundle (ZIP or directory)
    #[arg(short, long, global = true)]
    bundle: Option<PathBuf>,

    /// Download directory for remote atlases
    #[arg(long, global = true)]
    target_dir: Option<PathBuf>,

    /// Flip regions vertically
    #[arg(long, global = true)]
    flip: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show pages and regions of an atlas
    Info {
        /// Atlas path, bundle entry, or http(s) URL
        atlas: String,

        /// Print a JSON summary instead of text
        #[arg(long)]
        json: bool,
    },

    /// Look up a region by name
    Find {
        /// Atlas path, bundle entry, or http(s) URL
        atlas: String,

        /// Region name
        name: String,

        /// Region index, for regions sharing a name
        #[arg(short, long)]
        index: Option<i32>,
    },

    /// Write a region's packed pixels to a PNG file
    Extract {
        /// Atlas path, bundle entry, or http(s) URL
        atlas: String,

        /// Region name
        name: String,

        /// Region index, for regions sharing a name
        #[arg(short, long)]
        index: Option<i32>,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut options = match &cli.config {
        Some(path) => LoadOptions::from_json_file(path)?,
        None => LoadOptions::default(),
    };
    if cli.flip {
        options.flip = true;
    }

    match &cli.command {
        Commands::Info { atlas, json } => {
            let loaded = load(&cli, atlas, &options)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&AtlasSummary::new(&loaded))?);
            } else {
                print_info(atlas, &loaded);
            }
        }
        Commands::Find { atlas, name, index } => {
            let loaded = load(&cli, atlas, &options)?;
            let region = find(&loaded, name, *index)?;
            print_region(region);
        }
        Commands::Extract {
            atlas,
            name,
            index,
            output,
        } => {
            let loaded = load(&cli, atlas, &options)?;
            let region = find(&loaded, name, *index)?;
            let pixels = loaded
                .region_pixels(region)
                .ok_or_else(|| format!("region {} has no page texture", name))?;
            let png = pixels.to_png()?;
            fs::write(output, &png)?;
            println!(
                "Extracted {} ({}x{}) to {:?}",
                name, pixels.width, pixels.height, output
            );
        }
    }

    Ok(())
}

fn load(
    cli: &Cli,
    atlas: &str,
    options: &LoadOptions,
) -> Result<TextureAtlas, Box<dyn std::error::Error>> {
    if let Some(bundle_path) = &cli.bundle {
        let bundle: Arc<dyn AssetBundle> = if bundle_path.is_dir() {
            Arc::new(DirectoryBundle::new(bundle_path))
        } else {
            Arc::new(ZipBundle::from_path(bundle_path)?)
        };
        return Ok(load_atlas_from_bundle(atlas, bundle, options)?);
    }

    if atlas.starts_with("http://") || atlas.starts_with("https://") {
        return load_remote(cli, atlas, options);
    }

    Ok(load_atlas(atlas, options)?)
}

#[cfg(feature = "http")]
fn load_remote(
    cli: &Cli,
    atlas: &str,
    options: &LoadOptions,
) -> Result<TextureAtlas, Box<dyn std::error::Error>> {
    let target_dir = cli
        .target_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("atlas-loader"));
    Ok(atlas_loader::load_atlas_from_url(atlas, target_dir, options)?)
}

#[cfg(not(feature = "http"))]
fn load_remote(
    _cli: &Cli,
    atlas: &str,
    _options: &LoadOptions,
) -> Result<TextureAtlas, Box<dyn std::error::Error>> {
    Err(format!("cannot load {}: built without the `http` feature", atlas).into())
}

fn find<'a>(
    atlas: &'a TextureAtlas,
    name: &str,
    index: Option<i32>,
) -> Result<&'a AtlasRegion, String> {
    let region = match index {
        Some(index) => atlas.find_region_with_index(name, index),
        None => atlas.find_region(name),
    };
    region.ok_or_else(|| match index {
        Some(index) => format!("no region named {} with index {}", name, index),
        None => format!("no region named {}", name),
    })
}

fn print_info(origin: &str, atlas: &TextureAtlas) {
    println!("\nAtlas Info: {}", origin);
    println!("  Pages: {}", atlas.page_count());
    for (i, texture) in atlas.textures().iter().enumerate() {
        let regions = atlas.regions_on_page(i).count();
        println!(
            "    [{}] {}x{} ({} regions)",
            i, texture.width, texture.height, regions
        );
    }
    println!("  Regions: {}", atlas.region_count());
    for region in atlas.regions() {
        if region.index >= 0 {
            println!("    {} #{}", region.name, region.index);
        } else {
            println!("    {}", region.name);
        }
    }
}

fn print_region(region: &AtlasRegion) {
    println!("Region {}:", region.name);
    println!("  - Page: {}", region.page);
    println!("  - Index: {}", region.index);
    println!(
        "  - Bounds: {}, {}, {}x{}",
        region.left, region.top, region.packed_width, region.packed_height
    );
    println!(
        "  - UV: ({:.4}, {:.4}) - ({:.4}, {:.4})",
        region.u, region.v, region.u2, region.v2
    );
    println!(
        "  - Original: {}x{} at offset ({}, {})",
        region.original_width, region.original_height, region.offset_x, region.offset_y
    );
    if region.rotate {
        println!("  - Rotated: {} degrees", region.degrees);
    }
    for value in &region.values {
        println!("  - {}: {:?}", value.name, value.values);
    }
}

// JSON output format
#[derive(serde::Serialize)]
struct AtlasSummary {
    pages: Vec<PageSummary>,
    regions: Vec<RegionSummary>,
}

#[derive(serde::Serialize)]
struct PageSummary {
    width: u32,
    height: u32,
}

#[derive(serde::Serialize)]
struct RegionSummary {
    name: String,
    index: i32,
    page: usize,
    bounds: [i32; 4],
    uv: [f32; 4],
    original_size: [i32; 2],
    offset: [f32; 2],
    degrees: i32,
}

impl AtlasSummary {
    fn new(atlas: &TextureAtlas) -> Self {
        Self {
            pages: atlas
                .textures()
                .iter()
                .map(|t| PageSummary {
                    width: t.width,
                    height: t.height,
                })
                .collect(),
            regions: atlas
                .regions()
                .iter()
                .map(|r| RegionSummary {
                    name: r.name.clone(),
                    index: r.index,
                    page: r.page,
                    bounds: [r.left, r.top, r.packed_width, r.packed_height],
                    uv: [r.u, r.v, r.u2, r.v2],
                    original_size: [r.original_width, r.original_height],
                    offset: [r.offset_x, r.offset_y],
                    degrees: r.degrees,
                })
                .collect(),
        }
    }
}
