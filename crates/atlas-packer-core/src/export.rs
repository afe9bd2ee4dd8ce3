use crate::config::{PixelFormat, TextureFilter};
use crate::error::Result;
use crate::model::PackedResult;
use serde_json::{Map, Value};
use std::fmt::Write as _;

/// Page image file names: `name.png` for a single page, `name_<i>.png` otherwise.
pub fn page_file_names(base: &str, count: usize) -> Vec<String> {
    if count == 1 {
        vec![format!("{base}.png")]
    } else {
        (0..count).map(|i| format!("{base}_{i}.png")).collect()
    }
}

/// Serialize the result as `{ pages: [ { image, width, height, pixelFormat, …, regions } ],
/// settings }`. Page objects are the serialized page descriptors plus their image file name.
pub fn to_json(result: &PackedResult, page_names: &[String]) -> Result<Value> {
    let mut pages = Vec::with_capacity(result.pages.len());
    for (i, page) in result.pages.iter().enumerate() {
        let mut v = serde_json::to_value(&page.descriptor)?;
        if let (Some(obj), Some(name)) = (v.as_object_mut(), page_names.get(i)) {
            obj.insert("image".into(), Value::String(name.clone()));
        }
        pages.push(v);
    }
    let mut root = Map::new();
    root.insert("pages".into(), Value::Array(pages));
    root.insert("settings".into(), serde_json::to_value(&result.settings)?);
    Ok(Value::Object(root))
}

fn format_name(f: PixelFormat) -> &'static str {
    match f {
        PixelFormat::Rgba => "RGBA8888",
        PixelFormat::Rgb => "RGB888",
    }
}

fn filter_name(f: TextureFilter) -> &'static str {
    match f {
        TextureFilter::Nearest => "Nearest",
        TextureFilter::Linear => "Linear",
        TextureFilter::MipMap => "MipMap",
        TextureFilter::MipMapNearestNearest => "MipMapNearestNearest",
        TextureFilter::MipMapLinearNearest => "MipMapLinearNearest",
        TextureFilter::MipMapNearestLinear => "MipMapNearestLinear",
        TextureFilter::MipMapLinearLinear => "MipMapLinearLinear",
    }
}

/// Converts split lines `[left, top, right, bottom]` into edge insets `[left, right, top, bottom]`.
fn split_insets(splits: [f32; 4], width: u32, height: u32) -> [f32; 4] {
    let [l, t, r, b] = splits;
    [
        l.max(0.0),
        (width as f32 - r).max(0.0),
        t.max(0.0),
        (height as f32 - b).max(0.0),
    ]
}

/// Render a libGDX-style text atlas.
///
/// Per region: `xy`/`size` are the packed bounds, `orig` the untrimmed size and `offset` the
/// trimmed whitespace at the left and bottom edges. `split` gives the 9-slice insets as distances
/// from the left, right, top and bottom edges of the untrimmed image.
pub fn to_atlas_text(result: &PackedResult, page_names: &[String]) -> String {
    let mut s = String::new();
    for (i, page) in result.pages.iter().enumerate() {
        let d = &page.descriptor;
        let image = page_names
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("page_{i}.png"));
        if i > 0 {
            s.push('\n');
        }
        let _ = writeln!(s, "{image}");
        let _ = writeln!(s, "size: {}, {}", d.width, d.height);
        let _ = writeln!(s, "format: {}", format_name(d.pixel_format));
        let _ = writeln!(
            s,
            "filter: {}, {}",
            filter_name(d.filter_min),
            filter_name(d.filter_mag)
        );
        let _ = writeln!(s, "repeat: none");
        if d.premultiplied_alpha {
            let _ = writeln!(s, "pma: true");
        }
        for r in &d.regions {
            let [left, top, right, bottom] = r.padding;
            // orig is the unrotated source size
            let (w, h) = if r.is_rotated {
                (r.bounds.height, r.bounds.width)
            } else {
                (r.bounds.width, r.bounds.height)
            };
            let _ = writeln!(s, "{}", r.name);
            let _ = writeln!(s, "  rotate: {}", r.is_rotated);
            let _ = writeln!(s, "  xy: {}, {}", r.bounds.x, r.bounds.y);
            let _ = writeln!(s, "  size: {}, {}", w, h);
            let (orig_w, orig_h) = (w + left + right, h + top + bottom);
            if let Some(splits) = r.splits {
                let [l, rr, t, b] = split_insets(splits, orig_w, orig_h);
                let _ = writeln!(s, "  split: {l}, {rr}, {t}, {b}");
            }
            let _ = writeln!(s, "  orig: {orig_w}, {orig_h}");
            let _ = writeln!(s, "  offset: {}, {}", left, bottom);
            let _ = writeln!(s, "  index: -1");
        }
    }
    s
}
