//! # edgequake-pdfconv
//!
//! Convert PDF documents into page images, DOCX, XLSX or PPTX.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ images  rasterise every page, trim borders, page_<n>.png
//!  ├─ docx    scanned: OCR each page image, one paragraph per text line
//!  │          native:  reflow embedded text into headings and paragraphs
//!  ├─ xlsx    detect tables from text alignment, one sheet per table
//!  └─ pptx    one trimmed page image per slide, stretched to the canvas
//! ```
//!
//! Artifacts land beside the source and are named from its base name, so
//! converting `report.pdf` to a spreadsheet always writes `report.xlsx`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfconv::{convert, ConversionConfig, ScanMode, TargetFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let artifact = convert(
//!         "contract.pdf",
//!         TargetFormat::FlowDocument(ScanMode::Native),
//!         &config,
//!     )?;
//!     println!("{}", artifact.location().display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature     | Default | Description |
//! |-------------|---------|-------------|
//! | `cli`       | on      | Enables the `pdfconv` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `tesseract` | off     | OCR for scanned documents via Tesseract (`leptess`); needs libtesseract and leptonica |
//!
//! Without `tesseract`, scanned flow-document conversion fails with a
//! recognition error; every other target works.
//!
//! ## Runtime requirements
//!
//! pdfium is loaded at runtime. Set `PDFIUM_LIB_PATH` to a specific copy, or
//! place `libpdfium` in the working directory or on the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod writer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{DocumentBackend, PageText, TextRun};
pub use config::{
    ConversionConfig, ConversionConfigBuilder, OcrSettings, ScanMode, SlideSize, TableDetection,
    TargetFormat, TrimSettings,
};
pub use convert::{convert, convert_async, convert_with, inspect, inspect_with};
pub use error::{ConvertError, ErrorKind};
pub use output::{artifact_path, ConversionArtifact, DocumentMetadata};
pub use pipeline::ocr::{OcrError, TextRecognizer};
pub use pipeline::render::PdfiumBackend;
