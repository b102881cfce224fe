//! Thumbnail dimension resolution.
//!
//! The destination's mobile clients refuse to render image, video and
//! sticker messages whose transport descriptor lacks a thumbnail size, and
//! iOS additionally wants it non-zero. The size advertised is the media's
//! own size scaled down to fit a 400px box.

use serde::{Deserialize, Serialize};

/// Largest thumbnail edge, in pixels.
pub const MAX_THUMBNAIL_EDGE: u32 = 400;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailDimensions {
    pub width: u32,
    pub height: u32,
}

impl ThumbnailDimensions {
    /// Derive display dimensions from the media's pixel size.
    ///
    /// Still images with an unknown width fall back to a 400×400 square.
    #[must_use]
    pub fn resolve(width: u32, height: u32, still_image: bool) -> Self {
        let (width, height) = clamp_to_max(width, height);
        if width == 0 && still_image {
            return Self {
                width: MAX_THUMBNAIL_EDGE,
                height: MAX_THUMBNAIL_EDGE,
            };
        }
        Self { width, height }
    }
}

/// Scale `(w, h)` down so neither edge exceeds [`MAX_THUMBNAIL_EDGE`].
///
/// The width pass runs first and the height pass works on its result, so
/// the two clamps compose rather than both reading the original size.
/// Integer division truncates.
pub fn clamp_to_max(w: u32, h: u32) -> (u32, u32) {
    let max = u64::from(MAX_THUMBNAIL_EDGE);
    let (mut w, mut h) = (u64::from(w), u64::from(h));
    if w > max {
        h = h * max / w;
        w = max;
    }
    if h > max {
        w = w * max / h;
        h = max;
    }
    // Both edges are now <= 400.
    (w as u32, h as u32)
}
