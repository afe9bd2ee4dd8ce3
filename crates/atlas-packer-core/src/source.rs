use crate::config::Settings;
use crate::error::{AtlasError, Result};
use crate::model::{ImageMetadata, SourceImage};
use crate::pixel::PixelBuffer;
use image::ImageReader;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use walkdir::WalkDir;

/// Raster extensions picked up by directory listing (case-insensitive).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga", "gif"];

/// A discovered image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub path: PathBuf,
    /// `/`-separated path relative to the listing root.
    pub relative_path: String,
}

/// Where source images and their sidecars come from.
pub trait ImageSourceProvider {
    /// Lists supported images under `root`, descending at most `max_depth` subdirectory levels.
    fn list_images(&self, root: &Path, max_depth: usize) -> Result<Vec<ImageEntry>>;
    fn load_pixel_buffer(&self, path: &Path) -> Result<PixelBuffer>;
    /// Returns `None` when the image has no sidecar.
    fn load_sidecar_metadata(&self, path: &Path) -> Result<Option<ImageMetadata>>;
}

/// Reads images and `<image>.json` sidecars from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageSource;

pub fn is_supported_image(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Sidecar path for an image: the image file name with `.json` appended.
pub fn sidecar_path(image: &Path) -> PathBuf {
    let mut s = image.as_os_str().to_owned();
    s.push(".json");
    PathBuf::from(s)
}

fn relative_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl ImageSourceProvider for FsImageSource {
    fn list_images(&self, root: &Path, max_depth: usize) -> Result<Vec<ImageEntry>> {
        let mut list: Vec<ImageEntry> = Vec::new();
        for entry in WalkDir::new(root).max_depth(max_depth.saturating_add(1)) {
            let entry = entry.map_err(|e| {
                let at = e.path().unwrap_or(root).to_path_buf();
                AtlasError::image_load(at, e)
            })?;
            let p = entry.path();
            if entry.file_type().is_file() && is_supported_image(p) {
                list.push(ImageEntry {
                    path: p.to_path_buf(),
                    relative_path: relative_string(root, p),
                });
            }
        }
        list.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(list)
    }

    fn load_pixel_buffer(&self, path: &Path) -> Result<PixelBuffer> {
        let img = ImageReader::open(path)
            .map_err(|e| AtlasError::image_load(path, e))?
            .with_guessed_format()
            .map_err(|e| AtlasError::image_load(path, e))?
            .decode()
            .map_err(|e| AtlasError::image_load(path, e))?;
        Ok(PixelBuffer::from_dynamic(img))
    }

    fn load_sidecar_metadata(&self, path: &Path) -> Result<Option<ImageMetadata>> {
        let sidecar = sidecar_path(path);
        if !sidecar.is_file() {
            return Ok(None);
        }
        let text =
            std::fs::read_to_string(&sidecar).map_err(|e| AtlasError::image_load(&sidecar, e))?;
        let meta: ImageMetadata =
            serde_json::from_str(&text).map_err(|e| AtlasError::image_load(&sidecar, e))?;
        Ok(Some(meta))
    }
}

/// Loads every image under `root` in discovery order. The first failure aborts the whole load.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn load_sources<P: ImageSourceProvider + ?Sized>(
    provider: &P,
    root: &Path,
    settings: &Settings,
) -> Result<Vec<SourceImage>> {
    let entries = provider.list_images(root, settings.max_directory_depth)?;
    debug!(count = entries.len(), "listed images");
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let pixels = provider.load_pixel_buffer(&entry.path)?;
        let metadata = provider.load_sidecar_metadata(&entry.path)?;
        out.push(SourceImage {
            path: entry.path,
            relative_path: entry.relative_path,
            pixels,
            metadata,
            padding: [0; 4],
        });
    }
    Ok(out)
}
