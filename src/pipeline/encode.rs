//! PNG encoding of rendered pages, to bytes or straight to disk.

use crate::error::ConvertError;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Encode an image as PNG bytes.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

/// Write `img` as a PNG file at `path`, replacing any existing file.
pub fn save_png(img: &DynamicImage, path: &Path) -> Result<(), ConvertError> {
    let bytes = encode_png(img).map_err(|e| {
        ConvertError::write_failed(path, std::io::Error::new(std::io::ErrorKind::Other, e))
    })?;
    std::fs::write(path, bytes).map_err(|e| ConvertError::write_failed(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let data = encode_png(&img).expect("encode should succeed");
        assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
        let back = image::load_from_memory(&data).expect("decodes");
        assert_eq!(back.width(), 10);
    }

    #[test]
    fn save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.png");
        let small = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        let big = DynamicImage::ImageRgba8(RgbaImage::new(16, 8));
        save_png(&small, &path).unwrap();
        save_png(&big, &path).unwrap();
        let back = image::open(&path).unwrap();
        assert_eq!((back.width(), back.height()), (16, 8));
    }

    #[test]
    fn save_into_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("p.png");
        let img = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        let err = save_png(&img, &path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
