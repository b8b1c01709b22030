//! Error types for the edgequake-pdfconv library.
//!
//! Every pipeline step returns `Result<_, ConvertError>` and the dispatcher
//! hands the first failure straight back to its caller. There is no page-level
//! tolerance: one bad page fails the whole conversion.
//!
//! The variants are fine-grained so messages can say exactly what went wrong,
//! while [`ConvertError::kind`] folds them into the five failure classes a
//! caller usually branches on:
//!
//! | [`ErrorKind`]     | Meaning                                          |
//! |-------------------|--------------------------------------------------|
//! | `SourceRead`      | the PDF could not be opened, parsed or rendered  |
//! | `Recognition`     | the OCR backend failed on a page                 |
//! | `Conversion`      | DOCX/PPTX assembly failed                        |
//! | `NoTablesFound`   | table extraction found nothing to write          |
//! | `Io`              | the artifact could not be written                |

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdfconv library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Source errors ─────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Install pdfium from https://github.com/bblanchon/pdfium-binaries and put it on the library path.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use a specific copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Recognition errors ────────────────────────────────────────────────
    /// The OCR backend could not process a page image.
    #[error("Text recognition failed on page {page}: {detail}")]
    RecognitionFailed { page: usize, detail: String },

    /// No OCR engine could be initialised.
    #[error("OCR engine unavailable: {0}")]
    RecognizerUnavailable(String),

    // ── Assembly errors ───────────────────────────────────────────────────
    /// DOCX or PPTX assembly failed.
    #[error("Document assembly failed: {detail}")]
    ConversionFailed { detail: String },

    /// Table extraction found no tables anywhere in the document.
    #[error("No tables found in '{path}'")]
    NoTablesFound { path: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse failure class of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    SourceRead,
    Recognition,
    Conversion,
    NoTablesFound,
    Io,
    /// Configuration or internal failures that precede any pipeline work.
    Other,
}

impl ConvertError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::FileNotFound { .. }
            | ConvertError::PermissionDenied { .. }
            | ConvertError::NotAPdf { .. }
            | ConvertError::CorruptPdf { .. }
            | ConvertError::PasswordRequired { .. }
            | ConvertError::WrongPassword { .. }
            | ConvertError::RasterisationFailed { .. }
            | ConvertError::PdfiumBindingFailed(_) => ErrorKind::SourceRead,
            ConvertError::RecognitionFailed { .. } | ConvertError::RecognizerUnavailable(_) => {
                ErrorKind::Recognition
            }
            ConvertError::ConversionFailed { .. } => ErrorKind::Conversion,
            ConvertError::NoTablesFound { .. } => ErrorKind::NoTablesFound,
            ConvertError::OutputWriteFailed { .. } => ErrorKind::Io,
            ConvertError::InvalidConfig(_) | ConvertError::Internal(_) => ErrorKind::Other,
        }
    }

    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tables_display() {
        let e = ConvertError::NoTablesFound {
            path: PathBuf::from("/tmp/report.pdf"),
        };
        assert!(e.to_string().contains("No tables found"));
        assert!(e.to_string().contains("report.pdf"));
        assert_eq!(e.kind(), ErrorKind::NoTablesFound);
    }

    #[test]
    fn recognition_display() {
        let e = ConvertError::RecognitionFailed {
            page: 3,
            detail: "bad image".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert_eq!(e.kind(), ErrorKind::Recognition);
    }

    #[test]
    fn source_errors_share_a_kind() {
        let path = PathBuf::from("x.pdf");
        let errors = [
            ConvertError::FileNotFound { path: path.clone() },
            ConvertError::CorruptPdf {
                path: path.clone(),
                detail: "xref".into(),
            },
            ConvertError::PasswordRequired { path },
            ConvertError::PdfiumBindingFailed("missing".into()),
        ];
        for e in &errors {
            assert_eq!(e.kind(), ErrorKind::SourceRead, "{e}");
        }
    }

    #[test]
    fn write_failure_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let e = ConvertError::write_failed("/out/deck.pptx", io);
        assert_eq!(e.kind(), ErrorKind::Io);
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.to_string().contains("deck.pptx"));
    }
}
