//! DOCX output via `docx-rs`.

use super::{write_atomically, xml_safe};
use crate::error::ConvertError;
use crate::pipeline::flow::{BlockKind, FlowPage};
use docx_rs::{BreakType, Docx, Paragraph, Run};
use std::path::Path;
use tracing::info;

/// Body text size used for OCR output, in points.
const PLAIN_TEXT_PT: f32 = 11.0;

/// Write laid-out pages: headings bold, a page break before every page after the first.
pub fn write_flow_document(pages: &[FlowPage], path: &Path) -> Result<(), ConvertError> {
    let mut doc = Docx::new();
    let mut paragraphs = 0usize;

    for (idx, page) in pages.iter().enumerate() {
        if idx > 0 {
            doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
        }
        for block in &page.blocks {
            let mut run = Run::new()
                .add_text(xml_safe(&block.text))
                .size(half_points(block.size_pt));
            if block.kind == BlockKind::Heading {
                run = run.bold();
            }
            doc = doc.add_paragraph(Paragraph::new().add_run(run));
            paragraphs += 1;
        }
    }

    pack(doc, path)?;
    info!(
        "Wrote {} ({} pages, {} paragraphs)",
        path.display(),
        pages.len(),
        paragraphs
    );
    Ok(())
}

/// Write recognised text, one paragraph per line.
pub fn write_plain_text(text: &str, path: &Path) -> Result<(), ConvertError> {
    let mut doc = Docx::new();
    let mut lines = 0usize;
    for line in text.lines() {
        let mut para = Paragraph::new();
        if !line.is_empty() {
            para = para.add_run(
                Run::new()
                    .add_text(xml_safe(line))
                    .size(half_points(PLAIN_TEXT_PT)),
            );
        }
        doc = doc.add_paragraph(para);
        lines += 1;
    }

    pack(doc, path)?;
    info!("Wrote {} ({} lines of text)", path.display(), lines);
    Ok(())
}

fn pack(doc: Docx, path: &Path) -> Result<(), ConvertError> {
    write_atomically(path, |file| {
        doc.build()
            .pack(file)
            .map_err(|e| ConvertError::ConversionFailed {
                detail: format!("DOCX packaging failed: {e}"),
            })
    })
}

/// docx-rs measures run size in half-points.
fn half_points(pt: f32) -> usize {
    (pt * 2.0).round().max(2.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::flow::FlowBlock;
    use std::io::Read;

    fn document_xml(path: &Path) -> String {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn plain_text_keeps_every_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan_scanned.docx");
        write_plain_text("first line\nsecond & last", &path).unwrap();

        let xml = document_xml(&path);
        assert!(xml.contains("first line"));
        assert!(xml.contains("second &amp; last"));
    }

    #[test]
    fn flow_pages_are_separated_by_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("native.docx");
        let page = |text: &str| FlowPage {
            blocks: vec![FlowBlock {
                kind: BlockKind::Heading,
                text: text.to_string(),
                size_pt: 18.0,
            }],
        };
        write_flow_document(&[page("One"), page("Two"), page("Three")], &path).unwrap();

        let xml = document_xml(&path);
        assert_eq!(xml.matches("w:type=\"page\"").count(), 2);
        assert!(xml.contains("<w:b"), "headings are bold");
        let one = xml.find("One").unwrap();
        let three = xml.find("Three").unwrap();
        assert!(one < three);
    }

    fn all_parts(path: &Path) -> Vec<(String, String)> {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut part = archive.by_index(i).unwrap();
                let mut body = String::new();
                part.read_to_string(&mut body).unwrap();
                (part.name().to_string(), body)
            })
            .collect()
    }

    fn illegal_chars(xml: &str) -> Vec<char> {
        xml.chars()
            .filter(|&c| c < ' ' && !matches!(c, '\t' | '\n' | '\r'))
            .collect()
    }

    #[test]
    fn control_chars_never_reach_the_package() {
        let dir = tempfile::tempdir().unwrap();
        let flow = dir.path().join("native.docx");
        let page = FlowPage {
            blocks: vec![FlowBlock {
                kind: BlockKind::Body,
                text: "extra\u{2}ordinary\u{c}".to_string(),
                size_pt: 11.0,
            }],
        };
        write_flow_document(&[page], &flow).unwrap();

        let plain = dir.path().join("scan_scanned.docx");
        write_plain_text("form\u{c}feed\nbell\u{7}", &plain).unwrap();

        for path in [&flow, &plain] {
            for (name, body) in all_parts(path) {
                assert!(illegal_chars(&body).is_empty(), "{name} in {}", path.display());
            }
        }
        assert!(document_xml(&flow).contains("extraordinary"));
        assert!(document_xml(&plain).contains("formfeed"));
    }

    #[test]
    fn half_point_conversion() {
        assert_eq!(half_points(11.0), 22);
        assert_eq!(half_points(10.4), 21);
        assert_eq!(half_points(0.0), 2);
    }
}
