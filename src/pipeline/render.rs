//! PDF access via pdfium: rasterisation, positioned text and metadata.
//!
//! [`PdfiumBackend`] is the production [`DocumentBackend`]. Each call binds
//! pdfium, opens the document, does its work and drops everything again, so
//! no pdfium state outlives a request.
//!
//! ## Binding
//!
//! `PDFIUM_LIB_PATH` names a specific library file. Without it the backend
//! tries `./libpdfium.*` next to the working directory, then the system
//! library path.
//!
//! ## Render size
//!
//! Pages are scaled by `dpi / 72` and then capped so neither edge exceeds
//! `max_rendered_pixels`; an A0 poster at 200 DPI would otherwise need
//! several hundred megabytes of pixels.

use crate::backend::{DocumentBackend, PageText, TextRun};
use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::DocumentMetadata;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// [`DocumentBackend`] backed by the pdfium C++ library.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumBackend;

impl PdfiumBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentBackend for PdfiumBackend {
    fn render_pages(
        &self,
        pdf_path: &Path,
        config: &ConversionConfig,
    ) -> Result<Vec<DynamicImage>, ConvertError> {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, pdf_path, config.password.as_deref())?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        let max_pixels = pixel_limit(config.max_rendered_pixels);
        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(config.dpi as f32 / 72.0)
            .set_maximum_width(max_pixels)
            .set_maximum_height(max_pixels);

        let mut results = Vec::with_capacity(total_pages);

        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ConvertError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            results.push(image);
        }

        Ok(results)
    }

    fn page_text(
        &self,
        pdf_path: &Path,
        config: &ConversionConfig,
    ) -> Result<Vec<PageText>, ConvertError> {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, pdf_path, config.password.as_deref())?;

        let mut out = Vec::new();

        for (idx, page) in document.pages().iter().enumerate() {
            let width = page.width().value;
            let height = page.height().value;

            let text = page.text().map_err(|e| ConvertError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("page {}: failed to read text: {:?}", idx + 1, e),
            })?;

            let mut runs = Vec::new();
            for segment in text.segments().iter() {
                let content = segment.text();
                let content = content.trim();
                if content.is_empty() {
                    continue;
                }

                // PDF space has a bottom-left origin; flip to top-left.
                let bounds = segment.bounds();
                let left = bounds.left().value;
                let right = bounds.right().value;
                let top = height - bounds.top().value;
                let bottom = height - bounds.bottom().value;

                runs.push(TextRun::new(
                    content,
                    left,
                    top.min(bottom),
                    (right - left).abs(),
                    (bottom - top).abs(),
                ));
            }

            debug!("Page {}: {} text runs", idx + 1, runs.len());
            out.push(PageText {
                index: idx,
                width,
                height,
                runs,
            });
        }

        Ok(out)
    }

    fn metadata(
        &self,
        pdf_path: &Path,
        config: &ConversionConfig,
    ) -> Result<DocumentMetadata, ConvertError> {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, pdf_path, config.password.as_deref())?;

        let metadata = document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        Ok(DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            page_count: document.pages().len() as usize,
            pdf_version: format!("{:?}", document.version()),
        })
    }
}

/// pdfium takes the render cap as `i32`; larger values mean "no cap".
fn pixel_limit(px: u32) -> i32 {
    i32::try_from(px).unwrap_or(i32::MAX)
}

/// Bind to a pdfium library: `PDFIUM_LIB_PATH`, then `./`, then the system.
fn bind_pdfium() -> Result<Pdfium, ConvertError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => Pdfium::bind_to_library(Path::new(&p)),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ConvertError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Open a PDF, mapping pdfium's load error onto the password/corrupt variants.
fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ConvertError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ConvertError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                ConvertError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            ConvertError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}
