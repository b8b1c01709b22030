//! Pipeline stages for PDF conversion.
//!
//! Each submodule implements exactly one transformation step, so every stage
//! can be tested on its own with in-memory inputs.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ render ─▶ trim ─┬─▶ encode ─▶ page_<n>.png
//!            │                   └─▶ slides ─▶ pptx
//! input ─────┼─▶ render ─▶ ocr ──────────────▶ docx
//!            ├─▶ text ─▶ flow ───────────────▶ docx
//!            └─▶ text ─▶ tables ─────────────▶ xlsx
//! ```
//!
//! 1. [`input`]  — check the source exists, is readable and starts with `%PDF`
//! 2. [`render`] — pdfium access: page bitmaps, positioned text, metadata
//! 3. [`trim`]   — crop background-coloured borders
//! 4. [`encode`] — PNG encoding to bytes or files
//! 5. [`ocr`]    — page images to plain text
//! 6. [`flow`]   — positioned text to headings and paragraphs
//! 7. [`tables`] — positioned text to row/column grids
//! 8. [`slides`] — trimmed images to an in-memory slide deck

pub mod encode;
pub mod flow;
pub mod input;
pub mod ocr;
pub mod render;
pub mod slides;
pub mod tables;
pub mod trim;
