//! Office Open XML writers for the single-file artifacts.
//!
//! | Module   | Artifact | Built with            |
//! |----------|----------|-----------------------|
//! | [`docx`] | `.docx`  | `docx-rs`             |
//! | [`xlsx`] | `.xlsx`  | `zip` + SpreadsheetML |
//! | [`pptx`] | `.pptx`  | `zip` + PresentationML|
//!
//! Each artifact is written to a temp file beside its final path and renamed
//! into place, so a failed write never leaves a truncated document behind.

pub mod docx;
pub mod pptx;
pub mod xlsx;

use crate::error::ConvertError;
use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

#[cfg(unix)]
const ARTIFACT_MODE: u32 = 0o644;

/// Write `path` atomically: `fill` writes into a sibling temp file which then
/// replaces `path`. On error the temp file is removed and `path` is untouched.
pub(crate) fn write_atomically<F>(path: &Path, fill: F) -> Result<(), ConvertError>
where
    F: FnOnce(&mut File) -> Result<(), ConvertError>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".pdfconv-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| ConvertError::write_failed(path, e))?;

    fill(tmp.as_file_mut())?;
    tmp.as_file_mut()
        .flush()
        .map_err(|e| ConvertError::write_failed(path, e))?;

    // tempfile stages with 0600; artifacts get the usual file mode
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(ARTIFACT_MODE))
            .map_err(|e| ConvertError::write_failed(path, e))?;
    }

    tmp.persist(path)
        .map_err(|e| ConvertError::write_failed(path, e.error))?;
    debug!("Committed {}", path.display());
    Ok(())
}

/// Parts of an OPC package, in write order.
pub(crate) type Parts = Vec<(String, Vec<u8>)>;

/// Zip `parts` into `out` as a deflated OPC package.
pub(crate) fn write_package(out: &mut File, parts: Parts) -> Result<(), ConvertError> {
    let mut zip = ZipWriter::new(out);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, data) in parts {
        zip.start_file(name.as_str(), options).map_err(package_error)?;
        zip.write_all(&data)
            .map_err(|e| ConvertError::ConversionFailed {
                detail: format!("writing part {name}: {e}"),
            })?;
    }
    zip.finish().map_err(package_error)?;
    Ok(())
}

fn package_error(e: zip::result::ZipError) -> ConvertError {
    ConvertError::ConversionFailed {
        detail: format!("packaging failed: {e}"),
    }
}

/// Drop the control characters XML 1.0 cannot carry at all.
pub(crate) fn xml_safe(s: &str) -> Cow<'_, str> {
    let legal = |c: char| matches!(c, '\t' | '\n' | '\r') || c >= ' ';
    if s.chars().all(legal) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|&c| legal(c)).collect())
    }
}

/// XML-escape text for element content and attribute values.
pub(crate) fn xml_text(s: &str) -> String {
    quick_xml::escape::escape(xml_safe(s).as_ref()).into_owned()
}
