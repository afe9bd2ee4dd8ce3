use atlas_packer_core::prelude::*;
use atlas_packer_core::trim::compute_trim;
use image::{Rgba, RgbaImage};

fn block_image() -> PixelBuffer {
    let mut img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
    for y in 3..7 {
        for x in 3..7 {
            img.put_pixel(x, y, Rgba([0, 255, 0, 255]));
        }
    }
    PixelBuffer::from_rgba(img)
}

#[test]
fn block_trims_to_three_on_every_side() {
    assert_eq!(compute_trim(&block_image(), 0.0), [3, 3, 3, 3]);
}

#[test]
fn stripped_region_records_padding() {
    let sources = vec![
        SourceImage::new("block.png", block_image()),
        SourceImage::new("ghost.png", PixelBuffer::from_rgba(RgbaImage::new(5, 7))),
    ];
    let s = Settings::builder()
        .with_max_dimensions(64, 64)
        .padding(0, 0)
        .strip_whitespace(true)
        .build();
    let out = pack(sources, s).expect("pack");
    let (page, block) = out.find_region("block").expect("block");
    assert_eq!((block.bounds.width, block.bounds.height), (4, 4));
    assert_eq!(block.padding, [3, 3, 3, 3]);

    // fully transparent input survives as one pixel
    let (_, ghost) = out.find_region("ghost").expect("ghost");
    assert_eq!((ghost.bounds.width, ghost.bounds.height), (1, 1));
    assert_eq!(ghost.padding, [0, 0, 4, 6]);

    let pixels = &out.pages[page].pixels;
    assert_eq!(
        pixels.get_pixel(block.bounds.x, block.bounds.y),
        Rgba([0, 255, 0, 255])
    );
    assert_eq!(out.stats().num_trimmed, 2);
}

#[test]
fn stripping_disabled_keeps_full_size() {
    let sources = vec![SourceImage::new("block.png", block_image())];
    let s = Settings::builder().padding(0, 0).strip_whitespace(false).build();
    let out = pack(sources, s).expect("pack");
    let r = &out.pages[0].descriptor.regions[0];
    assert_eq!((r.bounds.width, r.bounds.height), (10, 10));
    assert_eq!(r.padding, [0; 4]);
}

#[test]
fn area_matches_trimmed_source_under_rotation() {
    let mut img = RgbaImage::from_pixel(12, 40, Rgba([0, 0, 0, 0]));
    for y in 2..38 {
        for x in 1..11 {
            img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    let sources = vec![SourceImage::new("tall.png", PixelBuffer::from_rgba(img))];
    let s = Settings::builder()
        .with_max_dimensions(64, 16)
        .padding(0, 0)
        .allow_rotation(true)
        .strip_whitespace(true)
        .build();
    let out = pack(sources, s).expect("pack");
    let r = &out.pages[0].descriptor.regions[0];
    assert!(r.is_rotated);
    assert_eq!(r.padding, [1, 2, 1, 2]);
    assert_eq!(r.bounds.width * r.bounds.height, 10 * 36);
}
