// ============================================================================
// ERROR TAXONOMY — every failure the remapping engine can surface
// ============================================================================

use std::fmt;

use image::ImageError;

/// Which of the two decoded rasters an operation refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    /// The indirection table whose channels encode texture coordinates.
    Map,
    /// The raster sampled through the map.
    Texture,
}

impl ImageSlot {
    pub fn index(self) -> usize {
        match self {
            ImageSlot::Map => 0,
            ImageSlot::Texture => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageSlot::Map => "map",
            ImageSlot::Texture => "texture",
        }
    }
}

#[derive(Debug)]
pub enum RemapError {
    /// Wrong file type. Recovered locally; nothing is mutated.
    InputRejected(String),
    /// Malformed image bytes. The slot keeps its previous buffer.
    DecodeFailed(String),
    EncodeFailed(String),
    Io(std::io::Error),
    /// A coordinate outside the raster extents. Always a no-op for callers.
    OutOfBounds { x: i64, y: i64 },
    /// Map or texture not loaded yet; the previous output stays displayed.
    CompositorInputMissing(ImageSlot),
}

impl fmt::Display for RemapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemapError::InputRejected(why) => write!(f, "input rejected: {}", why),
            RemapError::DecodeFailed(why) => write!(f, "decode failed: {}", why),
            RemapError::EncodeFailed(why) => write!(f, "encode failed: {}", why),
            RemapError::Io(e) => write!(f, "I/O error: {}", e),
            RemapError::OutOfBounds { x, y } => write!(f, "coordinate ({}, {}) is out of bounds", x, y),
            RemapError::CompositorInputMissing(slot) => {
                write!(f, "compositor skipped: no {} image loaded", slot.label())
            }
        }
    }
}

impl std::error::Error for RemapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RemapError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RemapError {
    fn from(e: std::io::Error) -> Self {
        RemapError::Io(e)
    }
}

impl From<ImageError> for RemapError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::IoError(io) => RemapError::Io(io),
            ImageError::Encoding(enc) => RemapError::EncodeFailed(enc.to_string()),
            other => RemapError::DecodeFailed(other.to_string()),
        }
    }
}
