//! Slide-deck assembly from trimmed page images.
//!
//! Each image is written to a `<base>_temp*.png` file beside the source, read
//! into the deck, and removed before the next page is touched. The temp file
//! is a [`tempfile::NamedTempFile`], so it is also removed when an error
//! unwinds out of the loop.

use crate::config::SlideSize;
use crate::error::ConvertError;
use crate::output::sibling_with_suffix;
use crate::pipeline::encode::encode_png;
use crate::writer::pptx::SlideDeck;
use image::DynamicImage;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Build a deck with one slide per image, in order.
pub fn assemble_deck(
    source: &Path,
    images: &[DynamicImage],
    size: SlideSize,
) -> Result<SlideDeck, ConvertError> {
    let mut deck = SlideDeck::new(size);
    let temp_base = sibling_with_suffix(source, "_temp");
    let dir = match source.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = temp_base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "slide_temp".to_string());

    for (idx, image) in images.iter().enumerate() {
        let mut tmp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".png")
            .tempfile_in(dir)
            .map_err(|e| ConvertError::write_failed(dir.join(&prefix), e))?;

        let png = encode_png(image).map_err(|e| ConvertError::ConversionFailed {
            detail: format!("encoding slide {}: {e}", idx + 1),
        })?;
        let staged = tmp.path().to_path_buf();
        if let Err(e) = tmp.write_all(&png).and_then(|_| tmp.flush()) {
            return Err(ConvertError::write_failed(staged, e));
        }

        deck.add_picture_slide(tmp.path())?;
        debug!("Slide {} staged via {}", idx + 1, staged.display());

        tmp.close()
            .map_err(|e| ConvertError::write_failed(staged, e))?;
    }

    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.contains("_temp"))
            .collect()
    }

    #[test]
    fn temp_files_do_not_outlive_assembly() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("talk.pdf");
        let images: Vec<DynamicImage> = (1..=3)
            .map(|n| DynamicImage::ImageRgb8(RgbImage::new(n * 4, n * 3)))
            .collect();

        let deck = assemble_deck(&source, &images, SlideSize::STANDARD).unwrap();
        assert_eq!(deck.len(), 3);
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn failed_slide_removes_earlier_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("talk.pdf");
        std::fs::write(&source, b"%PDF-1.7\n").unwrap();
        let images = vec![
            DynamicImage::ImageRgb8(RgbImage::new(20, 20)),
            DynamicImage::ImageRgb8(RgbImage::new(0, 0)),
            DynamicImage::ImageRgb8(RgbImage::new(20, 20)),
        ];

        let err = assemble_deck(&source, &images, SlideSize::STANDARD).unwrap_err();
        assert!(err.to_string().contains("slide 2"), "{err}");
        assert!(leftovers(dir.path()).is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_source_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("gone").join("talk.pdf");
        let images = vec![DynamicImage::ImageRgb8(RgbImage::new(2, 2))];
        let err = assemble_deck(&source, &images, SlideSize::STANDARD).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
