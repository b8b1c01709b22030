//! Optical character recognition for scanned documents.
//!
//! The scanned flow-document path renders every page and runs each image
//! through a [`TextRecognizer`]. Page texts are joined in page order with a
//! single `\n`; the first failing page aborts the whole pass so no partial
//! text is ever written.
//!
//! With the `tesseract` feature the production recognizer is
//! [`TesseractRecognizer`]; without it [`default_recognizer`] fails up front,
//! before any page is rendered.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, info};

/// Failure reported by a recognizer for a single image.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct OcrError(pub String);

/// Extracts plain text from one page image.
pub trait TextRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Run `recognizer` over every page and join the texts with `\n`.
pub fn recognize_pages(
    recognizer: &dyn TextRecognizer,
    pages: &[DynamicImage],
) -> Result<String, ConvertError> {
    let mut texts = Vec::with_capacity(pages.len());

    for (idx, page) in pages.iter().enumerate() {
        let text = recognizer
            .recognize(page)
            .map_err(|e| ConvertError::RecognitionFailed {
                page: idx + 1,
                detail: e.to_string(),
            })?;
        debug!("OCR page {} → {} chars", idx + 1, text.len());
        texts.push(text);
    }

    info!("OCR complete: {} pages", texts.len());
    Ok(texts.join("\n"))
}

/// The recognizer `convert` uses when the caller does not supply one.
pub fn default_recognizer(
    config: &ConversionConfig,
) -> Result<Box<dyn TextRecognizer>, ConvertError> {
    #[cfg(feature = "tesseract")]
    {
        let engine = TesseractRecognizer::new(config)
            .map_err(|e| ConvertError::RecognizerUnavailable(e.to_string()))?;
        Ok(Box::new(engine))
    }

    #[cfg(not(feature = "tesseract"))]
    {
        let _ = config;
        Err(ConvertError::RecognizerUnavailable(
            "this build has no OCR engine; rebuild with `--features tesseract`".into(),
        ))
    }
}

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractRecognizer;

#[cfg(feature = "tesseract")]
mod tesseract {
    use super::{OcrError, TextRecognizer};
    use crate::config::{ConversionConfig, OcrSettings};
    use crate::pipeline::encode::encode_png;
    use image::DynamicImage;
    use leptess::{LepTess, Variable};

    /// Tesseract 4/5 through `leptess`.
    pub struct TesseractRecognizer {
        settings: OcrSettings,
        dpi: u32,
    }

    impl TesseractRecognizer {
        /// Check that Tesseract starts with the configured language data.
        pub fn new(config: &ConversionConfig) -> Result<Self, OcrError> {
            LepTess::new(None, &config.ocr.language).map_err(|e| {
                OcrError(format!(
                    "failed to initialise Tesseract with language '{}': {}. \
                     Make sure the language data is installed (e.g. 'apt install tesseract-ocr-eng')",
                    config.ocr.language, e
                ))
            })?;

            Ok(Self {
                settings: config.ocr.clone(),
                dpi: config.dpi,
            })
        }
    }

    impl TextRecognizer for TesseractRecognizer {
        fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
            if image.width() == 0 || image.height() == 0 {
                return Err(OcrError(format!(
                    "image dimensions must be non-zero (got {}x{})",
                    image.width(),
                    image.height()
                )));
            }

            let mut lt = LepTess::new(None, &self.settings.language)
                .map_err(|e| OcrError(format!("failed to initialise Tesseract: {}", e)))?;

            lt.set_variable(
                Variable::TesseditPagesegMode,
                &self.settings.page_segmentation_mode.to_string(),
            )
            .map_err(|e| OcrError(format!("failed to set PSM: {}", e)))?;

            // leptess decodes encoded image data, not raw pixels
            let png = encode_png(image)
                .map_err(|e| OcrError(format!("failed to encode image to PNG: {}", e)))?;
            lt.set_image_from_mem(&png)
                .map_err(|e| OcrError(format!("failed to set image: {}", e)))?;
            lt.set_source_resolution(self.dpi as i32);

            lt.get_utf8_text()
                .map_err(|e| OcrError(format!("recognised text is not UTF-8: {}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::cell::Cell;

    struct Scripted {
        calls: Cell<usize>,
        fail_on: Option<usize>,
    }

    impl TextRecognizer for Scripted {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if Some(n) == self.fail_on {
                return Err(OcrError("blurred".into()));
            }
            Ok(format!("text of page {n}"))
        }
    }

    fn blank_pages(n: usize) -> Vec<DynamicImage> {
        (0..n)
            .map(|_| DynamicImage::ImageRgb8(RgbImage::new(4, 4)))
            .collect()
    }

    #[test]
    fn pages_joined_with_single_newline() {
        let r = Scripted {
            calls: Cell::new(0),
            fail_on: None,
        };
        let text = recognize_pages(&r, &blank_pages(3)).unwrap();
        assert_eq!(text, "text of page 1\ntext of page 2\ntext of page 3");
    }

    #[test]
    fn one_failure_aborts_the_pass() {
        let r = Scripted {
            calls: Cell::new(0),
            fail_on: Some(2),
        };
        let err = recognize_pages(&r, &blank_pages(4)).unwrap_err();
        match err {
            ConvertError::RecognitionFailed { page, detail } => {
                assert_eq!(page, 2);
                assert_eq!(detail, "blurred");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(r.calls.get(), 2, "no page after the failure is recognised");
    }

    #[test]
    fn empty_document_yields_empty_text() {
        let r = Scripted {
            calls: Cell::new(0),
            fail_on: None,
        };
        assert_eq!(recognize_pages(&r, &[]).unwrap(), "");
    }

    #[cfg(not(feature = "tesseract"))]
    #[test]
    fn unavailable_engine_explains_itself() {
        let err = match default_recognizer(&ConversionConfig::default()) {
            Ok(_) => panic!("no engine in this build"),
            Err(e) => e,
        };
        assert!(matches!(err, ConvertError::RecognizerUnavailable(_)));
        assert!(err.to_string().contains("tesseract"));
    }
}
