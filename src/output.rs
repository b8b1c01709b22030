//! Conversion results and artifact naming.
//!
//! Every artifact lands beside its source and is named from the source's
//! base name, so the same (source, target) pair always maps to the same path
//! and a re-run overwrites instead of accumulating files.

use crate::config::{ScanMode, TargetFormat};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// The artifact produced by one successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversionArtifact {
    /// A directory of `page_<n>.png` files, in page order.
    Images { dir: PathBuf, pages: Vec<PathBuf> },
    /// A single DOCX file.
    FlowDocument { path: PathBuf, mode: ScanMode },
    /// A single XLSX workbook; `sheets` lists the sheet names in order.
    Spreadsheet { path: PathBuf, sheets: Vec<String> },
    /// A single PPTX deck with `slides` slides.
    SlideDeck { path: PathBuf, slides: usize },
}

impl ConversionArtifact {
    /// The path reported to the user: the directory for images, the file otherwise.
    pub fn location(&self) -> &Path {
        match self {
            ConversionArtifact::Images { dir, .. } => dir,
            ConversionArtifact::FlowDocument { path, .. }
            | ConversionArtifact::Spreadsheet { path, .. }
            | ConversionArtifact::SlideDeck { path, .. } => path,
        }
    }
}

/// Document metadata extracted without converting content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Where the artifact for `target` goes.
///
/// | Target                    | Path                    |
/// |---------------------------|-------------------------|
/// | Images                    | `<base>_images/`        |
/// | FlowDocument(Native)      | `<base>.docx`           |
/// | FlowDocument(Scanned)     | `<base>_scanned.docx`   |
/// | Spreadsheet               | `<base>.xlsx`           |
/// | SlideDeck                 | `<base>.pptx`           |
pub fn artifact_path(source: &Path, target: TargetFormat) -> PathBuf {
    let suffix = match target {
        TargetFormat::Images => "_images",
        TargetFormat::FlowDocument(ScanMode::Native) => ".docx",
        TargetFormat::FlowDocument(ScanMode::Scanned) => "_scanned.docx",
        TargetFormat::Spreadsheet => ".xlsx",
        TargetFormat::SlideDeck => ".pptx",
    };
    sibling_with_suffix(source, suffix)
}

/// File name of the n-th (1-based) page image.
pub fn page_image_name(page_num: usize) -> String {
    format!("page_{page_num}.png")
}

/// `<dir>/<stem><suffix>` for a source path `<dir>/<stem>.<ext>`.
pub(crate) fn sibling_with_suffix(source: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = source
        .file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("document"));
    name.push(suffix);
    match source.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
