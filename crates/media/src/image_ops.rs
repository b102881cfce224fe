//! Header-only image inspection.
//!
//! Outbound image messages need pixel dimensions even when the source event
//! did not declare them. Decoding the whole image just for that is wasteful,
//! so only the header is read.

use std::io::Cursor;

use image::ImageReader;

use crate::error::{Context, Result};

/// Image metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
}

/// Read pixel dimensions from an image header without decoding pixel data.
pub fn probe_dimensions(data: &[u8]) -> Result<ImageMetadata> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("failed to guess image format")?;

    let (width, height) = reader
        .into_dimensions()
        .context("failed to read image dimensions")?;

    Ok(ImageMetadata { width, height })
}
