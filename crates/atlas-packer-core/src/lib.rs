//! Texture atlas packing engine.
//!
//! - Whitespace stripping by alpha threshold, recorded as per-region padding
//! - Packing: greedy shelf rows or best-area-fit MaxRects, with 90° rotation, gutters, edge
//!   padding, power-of-two pages and multi-page overflow
//! - Compositing of pages and assembly of serde-serializable page/region descriptors
//!
//! Quick example:
//! ```ignore
//! use atlas_packer_core::prelude::*;
//! # fn main() -> atlas_packer_core::Result<()> {
//! let settings = Settings::load("sprites/_packSettings.json")?;
//! let out = pack_directory(&FsImageSource, "sprites", settings)?;
//! for page in &out.pages {
//!     println!("{}x{}: {} regions", page.descriptor.width, page.descriptor.height, page.descriptor.regions.len());
//! }
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod pixel;
pub mod source;
pub mod trim;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::pack_rectangles;
pub use pipeline::*;
pub use pixel::PixelBuffer;

/// Convenience prelude for common types and functions.
/// Importing `atlas_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        AlgorithmSettings, PackAlgorithm, PixelFormat, Settings, SettingsBuilder, TextureFilter,
    };
    pub use crate::error::{AtlasError, Result};
    pub use crate::model::{
        AtlasPage, AtlasPageDescriptor, AtlasRegionDescriptor, Bounds, ImageMetadata,
        PackStats, PackedResult, PageResult, Rect, Rectangle, SourceImage,
    };
    pub use crate::pixel::PixelBuffer;
    pub use crate::source::{FsImageSource, ImageSourceProvider};
    pub use crate::{pack, pack_directory, pack_rectangles};
}
