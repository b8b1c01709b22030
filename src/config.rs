//! Configuration types for PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The *what* of a conversion (target
//! format, scanned or native) is not part of the config: it is passed to the
//! entry point as a [`TargetFormat`] so the same config can drive any run.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for one conversion.
///
/// # Example
/// ```rust
/// use edgequake_pdfconv::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(300)
///     .ocr_language("eng+deu")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each page. Range: 72–600. Default: 200.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 4000.
    ///
    /// Applied after the DPI scale; the other edge is scaled proportionally.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    #[serde(skip)]
    pub password: Option<String>,

    /// Border trimming applied to images and slides.
    pub trim: TrimSettings,

    /// Table detection tolerances for the spreadsheet target.
    pub tables: TableDetection,

    /// OCR settings for scanned documents.
    pub ocr: OcrSettings,

    /// Slide canvas for the slide-deck target.
    pub slide_size: SlideSize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 4000,
            password: None,
            trim: TrimSettings::default(),
            tables: TableDetection::default(),
            ocr: OcrSettings::default(),
            slide_size: SlideSize::default(),
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn trim_background(mut self, rgb: [u8; 3]) -> Self {
        self.config.trim.background = rgb;
        self
    }

    pub fn trim_tolerance(mut self, tolerance: u8) -> Self {
        self.config.trim.tolerance = tolerance;
        self
    }

    pub fn tables(mut self, tables: TableDetection) -> Self {
        self.config.tables = tables;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr.language = lang.into();
        self
    }

    pub fn ocr_page_segmentation_mode(mut self, psm: u32) -> Self {
        self.config.ocr.page_segmentation_mode = psm;
        self
    }

    pub fn slide_size(mut self, size: SlideSize) -> Self {
        self.config.slide_size = size;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ConvertError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.ocr.language.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.ocr.page_segmentation_mode > 13 {
            return Err(ConvertError::InvalidConfig(format!(
                "Tesseract page segmentation mode must be 0–13, got {}",
                c.ocr.page_segmentation_mode
            )));
        }
        if c.tables.min_rows < 1 || c.tables.min_cols < 1 {
            return Err(ConvertError::InvalidConfig(
                "Table min_rows and min_cols must be ≥ 1".into(),
            ));
        }
        if c.slide_size.width_emu == 0 || c.slide_size.height_emu == 0 {
            return Err(ConvertError::InvalidConfig(
                "Slide size must be non-zero".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Sub-settings ─────────────────────────────────────────────────────────

/// Background colour that [`crate::pipeline::trim::trim_image`] crops away.
///
/// A pixel is background when every RGB channel is within `tolerance` of
/// `background`, or when it is fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimSettings {
    pub background: [u8; 3],
    pub tolerance: u8,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            background: [255, 255, 255],
            // anti-aliased page edges render a few levels off pure white
            tolerance: 10,
        }
    }
}

/// Tolerances for the text-alignment table heuristic, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableDetection {
    /// Runs whose vertical centres are within this distance share a row.
    pub row_tolerance: f32,
    /// Left edges within this distance share a column.
    pub col_tolerance: f32,
    /// Minimum rows for a region to count as a table.
    pub min_rows: usize,
    /// Minimum cells per row for the row to take part in a table.
    pub min_cols: usize,
}

impl Default for TableDetection {
    fn default() -> Self {
        Self {
            row_tolerance: 5.0,
            col_tolerance: 10.0,
            min_rows: 2,
            min_cols: 2,
        }
    }
}

/// Tesseract settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Tesseract language codes, e.g. `"eng"` or `"eng+fra"`.
    pub language: String,
    /// Tesseract page segmentation mode (3 = fully automatic).
    pub page_segmentation_mode: u32,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            page_segmentation_mode: 3,
        }
    }
}

/// Slide canvas in English Metric Units (914 400 EMU per inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSize {
    pub width_emu: u64,
    pub height_emu: u64,
}

impl SlideSize {
    pub const EMU_PER_INCH: u64 = 914_400;

    /// 10in × 7.5in, the classic 4:3 deck.
    pub const STANDARD: SlideSize = SlideSize {
        width_emu: 9_144_000,
        height_emu: 6_858_000,
    };

    /// 13.333in × 7.5in.
    pub const WIDESCREEN: SlideSize = SlideSize {
        width_emu: 12_192_000,
        height_emu: 6_858_000,
    };
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Whether the caller says the document is a scan.
///
/// Never inferred from content: the caller asserts it, and only the
/// flow-document target asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    /// Page images go through OCR; output is plain text.
    Scanned,
    /// Embedded text is laid out into paragraphs.
    Native,
}

/// The representation to convert into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFormat {
    /// `<base>_images/page_<n>.png`, one trimmed image per page.
    Images,
    /// `<base>.docx`, or `<base>_scanned.docx` for scans.
    FlowDocument(ScanMode),
    /// `<base>.xlsx`, one sheet per detected table.
    Spreadsheet,
    /// `<base>.pptx`, one slide per page.
    SlideDeck,
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFormat::Images => f.write_str("images"),
            TargetFormat::FlowDocument(ScanMode::Native) => f.write_str("docx"),
            TargetFormat::FlowDocument(ScanMode::Scanned) => f.write_str("docx (ocr)"),
            TargetFormat::Spreadsheet => f.write_str("xlsx"),
            TargetFormat::SlideDeck => f.write_str("pptx"),
        }
    }
}
