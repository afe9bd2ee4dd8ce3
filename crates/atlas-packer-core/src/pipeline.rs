use crate::compositing::composite;
use crate::config::Settings;
use crate::error::Result;
use crate::model::{
    AtlasPage, AtlasPageDescriptor, AtlasRegionDescriptor, Bounds, PackedResult, PageResult,
    Rectangle, SourceImage,
};
use crate::packer::pack_rectangles;
use crate::source::{ImageSourceProvider, load_sources};
use crate::trim::strip_whitespace;
use std::path::Path;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Packs in-memory `sources` into atlas pages.
///
/// Stages run strictly in order: validate, trim, pack, composite, assemble. Any failure aborts
/// the whole call; partial atlases are never returned. An empty source list yields no pages.
/// Region order inside a page follows placement order, which is deterministic for a given source
/// order and settings.
#[instrument(skip_all, fields(sources = sources.len()))]
pub fn pack(sources: Vec<SourceImage>, settings: Settings) -> Result<PackedResult> {
    settings.validate()?;

    debug!(stage = "trimming");
    let sources = trim_sources(sources, &settings);

    debug!(stage = "packing");
    let rectangles: Vec<Rectangle> = sources
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let (w, h) = s.pixels.dimensions();
            Rectangle::new(s.name(), i, w, h)
        })
        .collect();
    let placed = pack_rectangles(rectangles, &settings)?;

    debug!(stage = "compositing", pages = placed.len());
    let mut pages = Vec::with_capacity(placed.len());
    for page in &placed {
        let pixels = composite(page, &sources, &settings)?;
        pages.push((pixels, page));
    }

    debug!(stage = "assembling");
    let pages: Vec<AtlasPage> = pages
        .into_iter()
        .map(|(pixels, page)| AtlasPage {
            pixels,
            descriptor: describe_page(page, &sources, &settings),
        })
        .collect();

    info!(pages = pages.len(), regions = sources.len(), "atlas packed");
    Ok(PackedResult { pages, settings })
}

/// Lists, loads and packs every supported image under `root`.
///
/// Settings are validated before anything is read from disk.
#[instrument(skip_all, fields(root = %root.as_ref().display()))]
pub fn pack_directory<P: ImageSourceProvider + ?Sized>(
    provider: &P,
    root: impl AsRef<Path>,
    settings: Settings,
) -> Result<PackedResult> {
    debug!(stage = "validating");
    settings.validate()?;
    debug!(stage = "loading");
    let sources = load_sources(provider, root.as_ref(), &settings)?;
    pack(sources, settings)
}

fn trim_source(mut source: SourceImage, settings: &Settings) -> SourceImage {
    let (pixels, trimmed) = strip_whitespace(source.pixels, settings);
    source.pixels = pixels;
    for (pad, t) in source.padding.iter_mut().zip(trimmed) {
        *pad += t;
    }
    source
}

#[cfg(not(feature = "parallel"))]
fn trim_sources(sources: Vec<SourceImage>, settings: &Settings) -> Vec<SourceImage> {
    sources
        .into_iter()
        .map(|s| trim_source(s, settings))
        .collect()
}

#[cfg(feature = "parallel")]
fn trim_sources(sources: Vec<SourceImage>, settings: &Settings) -> Vec<SourceImage> {
    // indexed collect keeps discovery order
    sources
        .into_par_iter()
        .map(|s| trim_source(s, settings))
        .collect()
}

fn describe_page(
    page: &PageResult,
    sources: &[SourceImage],
    settings: &Settings,
) -> AtlasPageDescriptor {
    let regions = page
        .regions
        .iter()
        .map(|r| {
            let source = &sources[r.original_index];
            AtlasRegionDescriptor {
                name: r.name.clone(),
                bounds: Bounds {
                    x: r.x,
                    y: r.y,
                    width: r.width,
                    height: r.height,
                },
                is_rotated: r.is_rotated,
                splits: source.metadata.map(|m| m.splits),
                padding: source.padding,
            }
        })
        .collect();
    AtlasPageDescriptor {
        width: page.width,
        height: page.height,
        pixel_format: settings.pixel_format,
        premultiplied_alpha: settings.premultiplied_alpha,
        filter_min: settings.filter_min,
        filter_mag: settings.filter_mag,
        has_white_pixel: settings.algorithm_settings.add_white_pixel,
        regions,
    }
}
