//! Seams between the conversion pipelines and the native libraries.
//!
//! The dispatcher only talks to PDFs through [`DocumentBackend`] and to OCR
//! through [`crate::pipeline::ocr::TextRecognizer`]. The production backend is
//! [`crate::pipeline::render::PdfiumBackend`]; tests drive the pipelines with
//! in-memory implementations.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::DocumentMetadata;
use image::DynamicImage;
use std::path::Path;

/// Access to the pages of one PDF.
pub trait DocumentBackend {
    /// Rasterise every page, in page order.
    ///
    /// Either every page renders or the whole call fails.
    fn render_pages(
        &self,
        pdf_path: &Path,
        config: &ConversionConfig,
    ) -> Result<Vec<DynamicImage>, ConvertError>;

    /// Positioned text runs for every page, in page order.
    fn page_text(
        &self,
        pdf_path: &Path,
        config: &ConversionConfig,
    ) -> Result<Vec<PageText>, ConvertError>;

    /// Document metadata without rendering.
    fn metadata(
        &self,
        pdf_path: &Path,
        config: &ConversionConfig,
    ) -> Result<DocumentMetadata, ConvertError>;
}

/// A piece of text with its box on the page.
///
/// Coordinates are PDF points with a top-left origin: `y` grows downwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TextRun {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// All text runs of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    /// 0-based page index.
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub runs: Vec<TextRun>,
}
