use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid page dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to load image {path}: {reason}")]
    ImageLoad { path: PathBuf, reason: String },
    #[error(
        "Image '{name}' ({width}x{height} with padding) does not fit a {max_width}x{max_height} page in any rotation"
    )]
    Packing {
        name: String,
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AtlasError {
    pub(crate) fn image_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ImageLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Invalid settings; raised before any image is loaded.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidDimensions { .. } | Self::InvalidConfig(_))
    }

    /// A source image or its sidecar could not be read or decoded.
    pub fn is_image_load(&self) -> bool {
        matches!(self, Self::ImageLoad { .. } | Self::Image(_))
    }

    /// A single image can never fit on a page.
    pub fn is_packing(&self) -> bool {
        matches!(self, Self::Packing { .. })
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;
