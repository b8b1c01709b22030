//! Conversion entry points.
//!
//! One call converts one PDF into one artifact. The dispatcher validates the
//! source, runs exactly the pipeline the [`TargetFormat`] selects, and returns
//! the artifact or the first error:
//!
//! ```text
//! Images            render ─▶ trim ─▶ page_<n>.png
//! FlowDocument(Scan) render ─▶ ocr ─▶ docx
//! FlowDocument(Nat)  text ─▶ flow ─▶ docx
//! Spreadsheet        text ─▶ tables ─▶ xlsx
//! SlideDeck          render ─▶ trim ─▶ slides ─▶ pptx
//! ```
//!
//! Calls share no state; two conversions of different files can run on
//! different threads at the same time.

use crate::backend::DocumentBackend;
use crate::config::{ConversionConfig, ScanMode, TargetFormat};
use crate::error::ConvertError;
use crate::output::{artifact_path, page_image_name, ConversionArtifact, DocumentMetadata};
use crate::pipeline::ocr::{self, TextRecognizer};
use crate::pipeline::render::PdfiumBackend;
use crate::pipeline::{encode, flow, input, slides, tables, trim};
use crate::writer::{docx, xlsx};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert the PDF at `source` into `target`, writing the artifact beside it.
///
/// Uses pdfium for PDF access and, on the scanned flow-document path only,
/// the default OCR engine.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdfconv::{convert, ConversionConfig, TargetFormat};
///
/// let config = ConversionConfig::default();
/// let artifact = convert("slides.pdf", TargetFormat::SlideDeck, &config)?;
/// println!("wrote {}", artifact.location().display());
/// # Ok::<(), edgequake_pdfconv::ConvertError>(())
/// ```
///
/// # Errors
/// The first failure of the selected pipeline; see [`ConvertError::kind`].
pub fn convert(
    source: impl AsRef<Path>,
    target: TargetFormat,
    config: &ConversionConfig,
) -> Result<ConversionArtifact, ConvertError> {
    convert_with(source, target, config, &PdfiumBackend::new(), None)
}

/// [`convert`] with an explicit backend and, optionally, recognizer.
///
/// When `recognizer` is `None` and the target is a scanned flow document,
/// the default engine from [`ocr::default_recognizer`] is created.
pub fn convert_with(
    source: impl AsRef<Path>,
    target: TargetFormat,
    config: &ConversionConfig,
    backend: &dyn DocumentBackend,
    recognizer: Option<&dyn TextRecognizer>,
) -> Result<ConversionArtifact, ConvertError> {
    let start = Instant::now();
    let pdf_path = input::resolve_local(source)?;
    let out = artifact_path(&pdf_path, target);
    info!(
        "Converting {} → {} ({})",
        pdf_path.display(),
        out.display(),
        target
    );

    let artifact = match target {
        TargetFormat::Images => to_images(&pdf_path, out, config, backend)?,
        TargetFormat::FlowDocument(ScanMode::Scanned) => match recognizer {
            Some(r) => to_scanned_document(&pdf_path, out, config, backend, r)?,
            None => {
                let engine = ocr::default_recognizer(config)?;
                to_scanned_document(&pdf_path, out, config, backend, engine.as_ref())?
            }
        },
        TargetFormat::FlowDocument(ScanMode::Native) => {
            to_native_document(&pdf_path, out, config, backend)?
        }
        TargetFormat::Spreadsheet => to_spreadsheet(&pdf_path, out, config, backend)?,
        TargetFormat::SlideDeck => to_slide_deck(&pdf_path, out, config, backend)?,
    };

    info!(
        "Conversion complete: {} in {}ms",
        artifact.location().display(),
        start.elapsed().as_millis()
    );
    Ok(artifact)
}

/// Run [`convert`] on tokio's blocking pool.
///
/// pdfium and Tesseract are blocking C libraries; this keeps them off the
/// async worker threads.
pub async fn convert_async(
    source: impl Into<PathBuf>,
    target: TargetFormat,
    config: &ConversionConfig,
) -> Result<ConversionArtifact, ConvertError> {
    let source = source.into();
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert(&source, target, &config))
        .await
        .map_err(|e| ConvertError::Internal(format!("spawn_blocking join error: {e}")))?
}

/// Read PDF metadata without converting anything.
pub fn inspect(
    source: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentMetadata, ConvertError> {
    inspect_with(source, config, &PdfiumBackend::new())
}

/// [`inspect`] with an explicit backend.
pub fn inspect_with(
    source: impl AsRef<Path>,
    config: &ConversionConfig,
    backend: &dyn DocumentBackend,
) -> Result<DocumentMetadata, ConvertError> {
    let pdf_path = input::resolve_local(source)?;
    backend.metadata(&pdf_path, config)
}

// ── Pipelines ────────────────────────────────────────────────────────────

fn to_images(
    pdf_path: &Path,
    dir: PathBuf,
    config: &ConversionConfig,
    backend: &dyn DocumentBackend,
) -> Result<ConversionArtifact, ConvertError> {
    let images = backend.render_pages(pdf_path, config)?;
    std::fs::create_dir_all(&dir).map_err(|e| ConvertError::write_failed(&dir, e))?;

    let mut pages = Vec::with_capacity(images.len());
    for (idx, image) in images.into_iter().enumerate() {
        let trimmed = trim::trim_image(image, &config.trim);
        let path = dir.join(page_image_name(idx + 1));
        encode::save_png(&trimmed, &path)?;
        debug!(
            "Page {} → {} ({}x{})",
            idx + 1,
            path.display(),
            trimmed.width(),
            trimmed.height()
        );
        pages.push(path);
    }

    Ok(ConversionArtifact::Images { dir, pages })
}

fn to_scanned_document(
    pdf_path: &Path,
    path: PathBuf,
    config: &ConversionConfig,
    backend: &dyn DocumentBackend,
    recognizer: &dyn TextRecognizer,
) -> Result<ConversionArtifact, ConvertError> {
    let images = backend.render_pages(pdf_path, config)?;
    let text = ocr::recognize_pages(recognizer, &images)?;
    docx::write_plain_text(&text, &path)?;
    Ok(ConversionArtifact::FlowDocument {
        path,
        mode: ScanMode::Scanned,
    })
}

fn to_native_document(
    pdf_path: &Path,
    path: PathBuf,
    config: &ConversionConfig,
    backend: &dyn DocumentBackend,
) -> Result<ConversionArtifact, ConvertError> {
    let pages = backend.page_text(pdf_path, config)?;
    let laid_out = flow::layout_pages(&pages);
    docx::write_flow_document(&laid_out, &path)?;
    Ok(ConversionArtifact::FlowDocument {
        path,
        mode: ScanMode::Native,
    })
}

fn to_spreadsheet(
    pdf_path: &Path,
    path: PathBuf,
    config: &ConversionConfig,
    backend: &dyn DocumentBackend,
) -> Result<ConversionArtifact, ConvertError> {
    let pages = backend.page_text(pdf_path, config)?;
    let found = tables::extract_tables(&pages, &config.tables);
    if found.is_empty() {
        return Err(ConvertError::NoTablesFound {
            path: pdf_path.to_path_buf(),
        });
    }
    info!("Found {} tables across {} pages", found.len(), pages.len());

    let sheets = xlsx::write_workbook(&found, &path)?;
    Ok(ConversionArtifact::Spreadsheet { path, sheets })
}

fn to_slide_deck(
    pdf_path: &Path,
    path: PathBuf,
    config: &ConversionConfig,
    backend: &dyn DocumentBackend,
) -> Result<ConversionArtifact, ConvertError> {
    let images: Vec<_> = backend
        .render_pages(pdf_path, config)?
        .into_iter()
        .map(|img| trim::trim_image(img, &config.trim))
        .collect();

    let deck = slides::assemble_deck(pdf_path, &images, config.slide_size)?;
    let slides = deck.write(&path)?;
    Ok(ConversionArtifact::SlideDeck { path, slides })
}
