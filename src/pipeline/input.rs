//! Input validation: make sure the source path is a readable PDF.
//!
//! pdfium reports a missing file, a permission problem and a JPEG renamed to
//! `.pdf` all as the same opaque load failure. Checking existence, read access
//! and the `%PDF` magic bytes up front lets each case carry its own message.

use crate::error::ConvertError;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate `path` as a readable PDF and return it as an owned path.
pub fn resolve_local(path: impl AsRef<Path>) -> Result<PathBuf, ConvertError> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
        return Err(ConvertError::FileNotFound { path });
    }

    match File::open(&path) {
        Ok(f) => {
            let mut head = Vec::with_capacity(4);
            // a failed read leaves `head` short, which is rejected below
            let _ = f.take(4).read_to_end(&mut head);
            if head.as_slice() != b"%PDF" {
                let mut magic = [0u8; 4];
                magic[..head.len()].copy_from_slice(&head);
                return Err(ConvertError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(ConvertError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ConvertError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
