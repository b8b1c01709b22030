//! End-to-end integration tests for edgequake-pdfconv.
//!
//! These tests use real PDF files in `./test_cases/` and a real pdfium
//! library. They are gated behind the `E2E_ENABLED` environment variable so
//! they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 LD_LIBRARY_PATH=. cargo test --test e2e -- --nocapture
//!
//! Artifacts land beside their source, so every test copies its PDF into a
//! scratch directory first.

use edgequake_pdfconv::{
    convert, convert_async, inspect, ConversionArtifact, ConversionConfig, ErrorKind, ScanMode,
    TargetFormat,
};
use std::io::Read;
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

/// Copy `pdf` into a fresh scratch dir; returns the dir guard and the copy.
fn staged(pdf: &Path) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("scratch dir");
    let copy = dir.path().join(pdf.file_name().expect("file name"));
    std::fs::copy(pdf, &copy).expect("copy test PDF");
    (dir, copy)
}

fn zip_entries(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("open package");
    let archive = zip::ZipArchive::new(file).expect("valid zip");
    archive.file_names().map(str::to_string).collect()
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[test]
fn test_inspect_sample() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let meta = inspect(&pdf, &ConversionConfig::default()).expect("inspect should succeed");
    assert!(meta.page_count >= 1);
    println!("✓ {} pages, PDF {}", meta.page_count, meta.pdf_version);
}

#[test]
fn test_inspect_nonexistent() {
    let err = inspect("/no/such/file.pdf", &ConversionConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceRead);
}

// ── Conversions ──────────────────────────────────────────────────────────────

#[test]
fn test_images_one_per_page() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let (_dir, src) = staged(&pdf);
    let config = ConversionConfig::default();
    let pages = inspect(&src, &config).unwrap().page_count;

    let artifact = convert(&src, TargetFormat::Images, &config).expect("images");
    let ConversionArtifact::Images { dir, pages: files } = artifact else {
        panic!("wrong artifact kind");
    };
    assert_eq!(files.len(), pages);
    for (i, f) in files.iter().enumerate() {
        assert_eq!(f, &dir.join(format!("page_{}.png", i + 1)));
        let img = image::open(f).expect("readable PNG");
        assert!(img.width() > 0 && img.height() > 0);
    }
}

#[test]
fn test_native_docx() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let (_dir, src) = staged(&pdf);
    let artifact = convert(
        &src,
        TargetFormat::FlowDocument(ScanMode::Native),
        &ConversionConfig::default(),
    )
    .expect("docx");

    let path = artifact.location().to_path_buf();
    assert_eq!(path, src.with_extension("docx"));

    let file = std::fs::File::open(&path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert!(xml.contains("<w:t"), "document has text runs");
}

#[test]
fn test_tables_to_xlsx() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("tables.pdf"));
    let (_dir, src) = staged(&pdf);
    match convert(&src, TargetFormat::Spreadsheet, &ConversionConfig::default()) {
        Ok(ConversionArtifact::Spreadsheet { path, sheets }) => {
            assert!(!sheets.is_empty());
            assert_eq!(sheets[0], "Table_1");
            let entries = zip_entries(&path);
            let sheet_parts = entries
                .iter()
                .filter(|e| e.starts_with("xl/worksheets/"))
                .count();
            assert_eq!(sheet_parts, sheets.len());
        }
        Ok(other) => panic!("wrong artifact kind: {other:?}"),
        Err(e) => {
            assert_eq!(e.kind(), ErrorKind::NoTablesFound, "{e}");
            assert!(!src.with_extension("xlsx").exists());
        }
    }
}

#[test]
fn test_slides_match_pages() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let (dir, src) = staged(&pdf);
    let config = ConversionConfig::default();
    let pages = inspect(&src, &config).unwrap().page_count;

    let artifact = convert(&src, TargetFormat::SlideDeck, &config).expect("pptx");
    let ConversionArtifact::SlideDeck { path, slides } = artifact else {
        panic!("wrong artifact kind");
    };
    assert_eq!(slides, pages);
    let slide_parts = zip_entries(&path)
        .iter()
        .filter(|e| e.starts_with("ppt/slides/slide"))
        .count();
    assert_eq!(slide_parts, pages);

    let leftovers = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains("_temp"))
        .count();
    assert_eq!(leftovers, 0, "no staged slide images remain");
}

#[tokio::test]
async fn test_async_wrapper() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let (_dir, src) = staged(&pdf);
    let artifact = convert_async(src.clone(), TargetFormat::SlideDeck, &ConversionConfig::default())
        .await
        .expect("async pptx");
    assert_eq!(artifact.location(), src.with_extension("pptx"));
}

#[cfg(feature = "tesseract")]
#[test]
fn test_scanned_docx() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("scanned.pdf"));
    let (_dir, src) = staged(&pdf);
    let artifact = convert(
        &src,
        TargetFormat::FlowDocument(ScanMode::Scanned),
        &ConversionConfig::default(),
    )
    .expect("ocr docx");
    assert!(artifact
        .location()
        .to_string_lossy()
        .ends_with("scanned_scanned.docx"));
}
