use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Page coordinate of the opaque white guard pixel stamped when `add_white_pixel` is on.
///
/// The packer reserves this pixel (plus gutter) on every page and the compositor paints it,
/// so both read the position from here.
pub const GUARD_PIXEL: (u32, u32) = (0, 0);

/// Conventional file name of the settings sidecar placed at the root of an input directory.
pub const SETTINGS_FILE_NAME: &str = "_packSettings.json";

/// Packing strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum PackAlgorithm {
    /// Best-area-fit over maximal free rectangles (MaxRects). Denser, slower.
    Best,
    /// Shelf rows filled left to right. Fast; used as a fallback/debug mode.
    Greedy,
}

impl FromStr for PackAlgorithm {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "best" | "maxrects" => Ok(Self::Best),
            "greedy" | "shelf" => Ok(Self::Greedy),
            _ => Err(()),
        }
    }
}

/// Pixel layout of produced pages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    #[serde(rename = "RGBA")]
    Rgba,
    #[serde(rename = "RGB")]
    Rgb,
}

impl PixelFormat {
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba)
    }
}

impl FromStr for PixelFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgba" | "rgba8888" => Ok(Self::Rgba),
            "rgb" | "rgb888" => Ok(Self::Rgb),
            _ => Err(()),
        }
    }
}

/// Texture sampling filters recorded in the page descriptor for the runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
    MipMap,
    MipMapNearestNearest,
    MipMapLinearNearest,
    MipMapNearestLinear,
    MipMapLinearLinear,
}

impl FromStr for TextureFilter {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "linear" => Ok(Self::Linear),
            "mipmap" => Ok(Self::MipMap),
            "mipmapnearestnearest" => Ok(Self::MipMapNearestNearest),
            "mipmaplinearnearest" => Ok(Self::MipMapLinearNearest),
            "mipmapnearestlinear" => Ok(Self::MipMapNearestLinear),
            "mipmaplinearlinear" => Ok(Self::MipMapLinearLinear),
            _ => Err(()),
        }
    }
}

/// Geometry knobs consumed by the rectangle packer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlgorithmSettings {
    /// Allow 90° clockwise rotations where they fit better.
    pub allow_rotation: bool,
    /// Horizontal gutter between regions, in pixels.
    pub padding_x: u32,
    /// Vertical gutter between regions, in pixels.
    pub padding_y: u32,
    /// Keep the same gutter between the page edges and edge-adjacent regions.
    pub edge_padding: bool,
    /// Maximum page width in pixels.
    pub page_max_width: u32,
    /// Maximum page height in pixels.
    pub page_max_height: u32,
    /// Round final page dimensions up to powers of two.
    pub power_of_two: bool,
    /// Reserve and stamp an opaque white pixel at [`GUARD_PIXEL`] on every page.
    pub add_white_pixel: bool,
}

impl Default for AlgorithmSettings {
    fn default() -> Self {
        Self {
            allow_rotation: false,
            padding_x: 2,
            padding_y: 2,
            edge_padding: false,
            page_max_width: 1024,
            page_max_height: 1024,
            power_of_two: false,
            add_white_pixel: false,
        }
    }
}

/// Settings for a whole pack invocation, typically read from `_packSettings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Pixels whose normalized alpha is `<=` this are whitespace (`0.0` = fully transparent only).
    pub alpha_threshold: f32,
    pub pixel_format: PixelFormat,
    pub premultiplied_alpha: bool,
    /// Subdirectory levels below the input root that are scanned (`0` = root only).
    pub max_directory_depth: usize,
    pub pack_algorithm: PackAlgorithm,
    pub strip_whitespace: bool,
    pub filter_min: TextureFilter,
    pub filter_mag: TextureFilter,
    pub algorithm_settings: AlgorithmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alpha_threshold: 0.0,
            pixel_format: PixelFormat::Rgba,
            premultiplied_alpha: false,
            max_directory_depth: 8,
            pack_algorithm: PackAlgorithm::Best,
            strip_whitespace: false,
            filter_min: TextureFilter::Nearest,
            filter_mag: TextureFilter::Nearest,
            algorithm_settings: AlgorithmSettings::default(),
        }
    }
}

impl Settings {
    /// Validates the settings; called before any image is loaded.
    ///
    /// Returns an error if:
    /// - A page dimension is zero
    /// - `power_of_two` is set but a page maximum is not a power of two
    /// - Edge padding leaves no usable space
    /// - A gutter is as wide or tall as the page itself
    /// - `alpha_threshold` is outside `[0, 1]`
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;
        let a = &self.algorithm_settings;

        if a.page_max_width == 0 || a.page_max_height == 0 {
            return Err(AtlasError::InvalidDimensions {
                width: a.page_max_width,
                height: a.page_max_height,
            });
        }

        if a.power_of_two
            && (!a.page_max_width.is_power_of_two() || !a.page_max_height.is_power_of_two())
        {
            return Err(AtlasError::InvalidConfig(format!(
                "power_of_two requires power-of-two page maximums, got {}x{}",
                a.page_max_width, a.page_max_height
            )));
        }

        if a.edge_padding {
            let total_x = a.padding_x.saturating_mul(2);
            let total_y = a.padding_y.saturating_mul(2);
            if total_x >= a.page_max_width || total_y >= a.page_max_height {
                return Err(AtlasError::InvalidConfig(format!(
                    "edge padding ({}x{}) * 2 leaves no usable space in a {}x{} page",
                    a.padding_x, a.padding_y, a.page_max_width, a.page_max_height
                )));
            }
        }

        if a.padding_x >= a.page_max_width || a.padding_y >= a.page_max_height {
            return Err(AtlasError::InvalidConfig(format!(
                "padding {}x{} leaves no room for a single pixel in a {}x{} page",
                a.padding_x, a.padding_y, a.page_max_width, a.page_max_height
            )));
        }

        if !(0.0..=1.0).contains(&self.alpha_threshold) {
            return Err(AtlasError::InvalidConfig(format!(
                "alpha_threshold must be within [0, 1], got {}",
                self.alpha_threshold
            )));
        }

        Ok(())
    }

    /// Parses and validates settings from a JSON document.
    pub fn from_json_str(s: &str) -> crate::error::Result<Self> {
        let settings: Settings = serde_json::from_str(s)
            .map_err(|e| crate::error::AtlasError::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a settings file.
    pub fn load(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Create a fluent builder for `Settings`.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }
}

/// Builder for `Settings` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
        }
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.settings.algorithm_settings.page_max_width = w;
        self.settings.algorithm_settings.page_max_height = h;
        self
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.settings.algorithm_settings.allow_rotation = v;
        self
    }
    pub fn padding(mut self, x: u32, y: u32) -> Self {
        self.settings.algorithm_settings.padding_x = x;
        self.settings.algorithm_settings.padding_y = y;
        self
    }
    pub fn edge_padding(mut self, v: bool) -> Self {
        self.settings.algorithm_settings.edge_padding = v;
        self
    }
    pub fn pow2(mut self, v: bool) -> Self {
        self.settings.algorithm_settings.power_of_two = v;
        self
    }
    pub fn add_white_pixel(mut self, v: bool) -> Self {
        self.settings.algorithm_settings.add_white_pixel = v;
        self
    }
    pub fn algorithm(mut self, v: PackAlgorithm) -> Self {
        self.settings.pack_algorithm = v;
        self
    }
    pub fn strip_whitespace(mut self, v: bool) -> Self {
        self.settings.strip_whitespace = v;
        self
    }
    pub fn alpha_threshold(mut self, v: f32) -> Self {
        self.settings.alpha_threshold = v;
        self
    }
    pub fn pixel_format(mut self, v: PixelFormat) -> Self {
        self.settings.pixel_format = v;
        self
    }
    pub fn premultiplied_alpha(mut self, v: bool) -> Self {
        self.settings.premultiplied_alpha = v;
        self
    }
    pub fn max_directory_depth(mut self, v: usize) -> Self {
        self.settings.max_directory_depth = v;
        self
    }
    pub fn filters(mut self, min: TextureFilter, mag: TextureFilter) -> Self {
        self.settings.filter_min = min;
        self.settings.filter_mag = mag;
        self
    }
    pub fn build(self) -> Settings {
        self.settings
    }
}
