use atlas_packer_core::prelude::*;
use atlas_packer_core::{page_file_names, to_atlas_text, to_json};
use image::{Rgba, RgbaImage};

fn result() -> PackedResult {
    let sources = vec![
        SourceImage::new("ui/button.png", PixelBuffer::from_rgba(RgbaImage::from_pixel(32, 16, Rgba([1, 2, 3, 255]))))
            .with_metadata(Some(ImageMetadata { splits: [4.0, 4.0, 28.0, 12.0] })),
        SourceImage::new("icon.png", PixelBuffer::from_rgba(RgbaImage::from_pixel(10, 10, Rgba([9, 9, 9, 255])))),
    ];
    let s = Settings::builder()
        .with_max_dimensions(256, 256)
        .filters(TextureFilter::Linear, TextureFilter::Linear)
        .build();
    pack(sources, s).expect("pack")
}

#[test]
fn json_descriptor_matches_schema() {
    let out = result();
    let names = page_file_names("atlas", out.pages.len());
    assert_eq!(names, vec!["atlas.png"]);
    let v = to_json(&out, &names).expect("json");
    let page = &v["pages"][0];
    assert_eq!(page["image"], "atlas.png");
    assert_eq!(page["pixelFormat"], "RGBA");
    assert_eq!(page["premultipliedAlpha"], false);
    assert_eq!(page["hasWhitePixel"], false);
    assert_eq!(page["filterMin"], "Linear");
    let regions = page["regions"].as_array().expect("regions");
    assert_eq!(regions.len(), 2);
    let button = regions.iter().find(|r| r["name"] == "ui/button").expect("button");
    assert_eq!(button["bounds"]["width"], 32);
    assert_eq!(button["bounds"]["height"], 16);
    assert_eq!(button["isRotated"], false);
    assert_eq!(button["splits"][2], 28.0);
    assert_eq!(button["padding"], serde_json::json!([0, 0, 0, 0]));
    let icon = regions.iter().find(|r| r["name"] == "icon").expect("icon");
    assert!(icon["splits"].is_null());
    assert!(v["settings"].is_object());
}

#[test]
fn descriptor_round_trips_through_serde() {
    let out = result();
    let d = &out.pages[0].descriptor;
    let text = serde_json::to_string(d).expect("serialize");
    let back: AtlasPageDescriptor = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(&back, d);
}

#[test]
fn text_atlas_lists_pages_and_regions() {
    let out = result();
    let names = page_file_names("atlas", out.pages.len());
    let text = to_atlas_text(&out, &names);
    assert!(text.starts_with("atlas.png\n"));
    assert!(text.contains("filter: Linear, Linear"));
    assert!(text.contains("ui/button\n  rotate: false\n"));
    // split lines 28 and 12 are 4 px from the right and bottom of a 32x16 image
    assert!(text.contains("  split: 4, 4, 4, 4\n"));
    assert!(text.contains("  orig: 10, 10\n"));
}

#[test]
fn multi_page_file_names() {
    assert_eq!(page_file_names("a", 3), vec!["a_0.png", "a_1.png", "a_2.png"]);
}

#[test]
fn stats_summarize_occupancy() {
    let out = result();
    let stats = out.stats();
    assert_eq!(stats.num_pages, 1);
    assert_eq!(stats.num_regions, 2);
    assert_eq!(stats.used_region_area, 32 * 16 + 10 * 10);
    assert!(stats.occupancy > 0.0 && stats.occupancy <= 1.0);
    assert_eq!(stats.wasted_area(), stats.total_page_area - stats.used_region_area);
    assert!(stats.summary().contains("Regions: 2"));
}
