//! MIME detection from magic bytes.

use image::ImageFormat;

/// Fallback when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess a MIME type from the leading bytes of a media blob.
///
/// Only image formats are recognised; anything else yields `None` and the
/// caller decides the fallback.
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data).ok().and_then(format_to_mime)
}

/// Convert an [`ImageFormat`] to its MIME type string.
pub fn format_to_mime(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::Bmp => Some("image/bmp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::image_ops::tests::TINY_JPEG, rstest::rstest};

    #[rstest]
    #[case(b"GIF89a\x01\x00\x01\x00".as_slice(), Some("image/gif"))]
    #[case(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".as_slice(), Some("image/png"))]
    #[case(b"RIFF\x24\0\0\0WEBPVP8 ".as_slice(), Some("image/webp"))]
    #[case(b"%PDF-1.7".as_slice(), None)]
    #[case(b"".as_slice(), None)]
    fn sniffs_magic_bytes(#[case] data: &[u8], #[case] expected: Option<&str>) {
        assert_eq!(sniff_mime(data), expected);
    }

    #[test]
    fn sniffs_jpeg() {
        assert_eq!(sniff_mime(TINY_JPEG), Some("image/jpeg"));
    }

    #[test]
    fn unknown_formats_have_no_mime() {
        assert_eq!(format_to_mime(ImageFormat::Tiff), None);
    }
}
