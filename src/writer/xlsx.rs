//! XLSX output: a minimal SpreadsheetML package, one worksheet per table.
//!
//! Cells that read as plain numbers are stored as numeric cells so formulas
//! work on them; everything else is an inline string. Empty cells are
//! omitted, as spreadsheet applications do.

use super::{write_atomically, write_package, xml_text, Parts};
use crate::error::ConvertError;
use crate::pipeline::tables::ExtractedTable;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// Plain decimals with optional thousands separators: `42`, `-1,234.50`, `.5`.
static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:\d{1,3}(?:,\d{3})+|\d+)?(?:\.\d+)?$").unwrap());

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Write every table as its own sheet, in order.
pub fn write_workbook(tables: &[ExtractedTable], path: &Path) -> Result<Vec<String>, ConvertError> {
    let names: Vec<String> = tables.iter().map(ExtractedTable::sheet_name).collect();

    let mut parts: Parts = vec![
        ("[Content_Types].xml".into(), content_types(tables.len()).into_bytes()),
        ("_rels/.rels".into(), root_rels().into_bytes()),
        ("xl/workbook.xml".into(), workbook(&names).into_bytes()),
        (
            "xl/_rels/workbook.xml.rels".into(),
            workbook_rels(tables.len()).into_bytes(),
        ),
        ("xl/styles.xml".into(), styles().into_bytes()),
    ];
    for (i, table) in tables.iter().enumerate() {
        parts.push((
            format!("xl/worksheets/sheet{}.xml", i + 1),
            worksheet(&table.rows).into_bytes(),
        ));
    }

    write_atomically(path, |file| write_package(file, parts))?;
    info!("Wrote {} ({} sheets)", path.display(), names.len());
    Ok(names)
}

/// Spreadsheet column letters: 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn column_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// The numeric value of `cell`, if it should be stored as a number.
fn numeric_value(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "." || !NUMERIC.is_match(trimmed) {
        return None;
    }
    let digits = trimmed.trim_start_matches('-');
    // identifiers such as zip codes keep their leading zeros as text
    if digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.") {
        return None;
    }
    let plain = trimmed.replace(',', "");
    plain.parse::<f64>().ok().map(|_| plain)
}

fn worksheet(rows: &[Vec<String>]) -> String {
    let mut xml = String::with_capacity(256 + rows.len() * 64);
    xml.push_str(XML_DECL);
    xml.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        let _ = write!(xml, r#"<row r="{}">"#, r + 1);
        for (c, cell) in row.iter().enumerate() {
            if cell.trim().is_empty() {
                continue;
            }
            let cell_ref = format!("{}{}", column_letter(c), r + 1);
            match numeric_value(cell) {
                Some(n) => {
                    let _ = write!(xml, r#"<c r="{cell_ref}"><v>{n}</v></c>"#);
                }
                None => {
                    let _ = write!(
                        xml,
                        r#"<c r="{cell_ref}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                        xml_text(cell)
                    );
                }
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn content_types(sheets: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(concat!(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    ));
    for i in 1..=sheets {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        "{XML_DECL}{}",
        concat!(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
            "</Relationships>"
        )
    )
}

fn workbook(names: &[String]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(concat!(
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#
    ));
    for (i, name) in names.iter().enumerate() {
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            xml_text(name),
            i + 1,
            i + 1
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels(sheets: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for i in 1..=sheets {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheets + 1
    );
    xml.push_str("</Relationships>");
    xml
}

fn styles() -> String {
    format!(
        "{XML_DECL}{}",
        concat!(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
            r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
            r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
            r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
            "</styleSheet>"
        )
    )
}
