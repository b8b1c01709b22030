//! Heuristic table extraction from positioned text.
//!
//! No ruling lines or ML model are needed; tables are found from how text
//! lines up:
//!
//! 1. Cluster the runs of a page into rows by vertical centre.
//! 2. Collect consecutive rows that have at least `min_cols` cells and whose
//!    cell counts stay within ±1 of the region's first row.
//! 3. Regions of at least `min_rows` rows become tables; their columns come
//!    from clustering the left edges of every cell in the region.
//!
//! Tables are returned in document order: page by page, top to bottom.

use crate::backend::{PageText, TextRun};
use crate::config::TableDetection;
use std::cmp::Ordering;
use tracing::debug;

/// One table found in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    /// 0-based position among all tables of the document.
    pub index: usize,
    /// 0-based page the table sits on.
    pub page: usize,
    /// Row-major cells; every row has the same length.
    pub rows: Vec<Vec<String>>,
}

impl ExtractedTable {
    /// Sheet name for this table: `Table_1`, `Table_2`, …
    pub fn sheet_name(&self) -> String {
        format!("Table_{}", self.index + 1)
    }

    pub fn num_cols(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }
}

/// Find every table on every page.
pub fn extract_tables(pages: &[PageText], settings: &TableDetection) -> Vec<ExtractedTable> {
    let mut tables = Vec::new();

    for page in pages {
        let rows = cluster_rows(&page.runs, settings.row_tolerance);
        let regions = find_table_regions(&rows, settings);
        debug!(
            "Page {}: {} rows, {} table regions",
            page.index + 1,
            rows.len(),
            regions.len()
        );

        for region in regions {
            if let Some(grid) = build_grid(&region, settings) {
                tables.push(ExtractedTable {
                    index: tables.len(),
                    page: page.index,
                    rows: grid,
                });
            }
        }
    }

    tables
}

fn by_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Group runs into rows, top to bottom, each row sorted left to right.
fn cluster_rows(runs: &[TextRun], tolerance: f32) -> Vec<Vec<&TextRun>> {
    let mut sorted: Vec<&TextRun> = runs.iter().collect();
    sorted.sort_by(|a, b| by_f32(a.center_y(), b.center_y()).then(by_f32(a.x, b.x)));

    let mut rows: Vec<Vec<&TextRun>> = Vec::new();
    for run in sorted {
        match rows.last_mut() {
            Some(row) if (run.center_y() - row[0].center_y()).abs() <= tolerance => row.push(run),
            _ => rows.push(vec![run]),
        }
    }

    for row in &mut rows {
        row.sort_by(|a, b| by_f32(a.x, b.x));
    }
    rows
}

/// Runs of consecutive rows with a consistent multi-cell structure.
fn find_table_regions<'a>(
    rows: &[Vec<&'a TextRun>],
    settings: &TableDetection,
) -> Vec<Vec<Vec<&'a TextRun>>> {
    let mut regions = Vec::new();
    let mut current: Vec<Vec<&'a TextRun>> = Vec::new();
    let mut expected_cols: Option<usize> = None;

    let mut close = |current: &mut Vec<Vec<&'a TextRun>>| {
        if current.len() >= settings.min_rows {
            regions.push(std::mem::take(current));
        } else {
            current.clear();
        }
    };

    for row in rows {
        let cells = row.len();

        if cells < settings.min_cols {
            close(&mut current);
            expected_cols = None;
            continue;
        }

        match expected_cols {
            Some(exp) if cells.abs_diff(exp) <= 1 => current.push(row.clone()),
            _ => {
                close(&mut current);
                current.push(row.clone());
                expected_cols = Some(cells);
            }
        }
    }
    close(&mut current);

    regions
}

/// Lay a region's runs onto a rectangular grid.
fn build_grid(region: &[Vec<&TextRun>], settings: &TableDetection) -> Option<Vec<Vec<String>>> {
    let boundaries = column_boundaries(region, settings.col_tolerance);
    let num_cols = boundaries.len().saturating_sub(1);
    if num_cols < settings.min_cols {
        return None;
    }

    let grid = region
        .iter()
        .map(|row| {
            let mut cells = vec![String::new(); num_cols];
            for run in row {
                let col = column_index(run, &boundaries);
                let cell = &mut cells[col];
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(&run.text);
            }
            cells
        })
        .collect();

    Some(grid)
}

/// Left edges of each column plus the right edge of the last one.
fn column_boundaries(region: &[Vec<&TextRun>], tolerance: f32) -> Vec<f32> {
    let mut xs: Vec<f32> = region.iter().flatten().map(|r| r.x).collect();
    xs.sort_by(|a, b| by_f32(*a, *b));

    let Some(&first) = xs.first() else {
        return Vec::new();
    };

    // each boundary anchors a cluster; a new column starts once a left edge
    // drifts past the tolerance from the previous edge
    let mut boundaries = vec![first];
    let mut prev = first;
    for &x in &xs[1..] {
        if x - prev > tolerance {
            boundaries.push(x);
        }
        prev = x;
    }

    let right = region
        .iter()
        .flatten()
        .map(|r| r.right())
        .fold(f32::MIN, f32::max);
    boundaries.push(right.max(prev + 1.0));
    boundaries
}

fn column_index(run: &TextRun, boundaries: &[f32]) -> usize {
    let last = boundaries.len().saturating_sub(2);
    // a run belongs to the last column whose left edge it reaches
    boundaries[..=last]
        .iter()
        .rposition(|&b| run.x + 0.5 >= b)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A grid of runs: `rows` × `cols`, cells 80pt apart, rows 14pt apart.
    fn grid_runs(top: f32, rows: usize, cols: usize, label: &str) -> Vec<TextRun> {
        let mut runs = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                runs.push(TextRun::new(
                    format!("{label}{r}{c}"),
                    50.0 + c as f32 * 80.0,
                    top + r as f32 * 14.0,
                    30.0,
                    10.0,
                ));
            }
        }
        runs
    }

    fn paragraph(top: f32, text: &str) -> TextRun {
        TextRun::new(text, 50.0, top, 400.0, 10.0)
    }

    fn page(index: usize, runs: Vec<TextRun>) -> PageText {
        PageText {
            index,
            width: 612.0,
            height: 792.0,
            runs,
        }
    }

    #[test]
    fn finds_a_simple_grid() {
        let pages = vec![page(0, grid_runs(100.0, 3, 3, "a"))];
        let tables = extract_tables(&pages, &TableDetection::default());
        assert_eq!(tables.len(), 1);
        let t = &tables[0];
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.num_cols(), 3);
        assert_eq!(t.rows[0], vec!["a00", "a01", "a02"]);
        assert_eq!(t.rows[2][1], "a21");
        assert_eq!(t.sheet_name(), "Table_1");
    }

    #[test]
    fn prose_is_not_a_table() {
        let runs = (0..6)
            .map(|i| paragraph(100.0 + i as f32 * 14.0, "Lorem ipsum dolor sit amet"))
            .collect();
        let tables = extract_tables(&[page(0, runs)], &TableDetection::default());
        assert!(tables.is_empty());
    }

    #[test]
    fn two_tables_on_one_page_in_reading_order() {
        let mut runs = grid_runs(400.0, 2, 2, "low");
        runs.push(paragraph(300.0, "Separating paragraph"));
        runs.extend(grid_runs(100.0, 3, 4, "up"));
        let tables = extract_tables(&[page(0, runs)], &TableDetection::default());

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows[0][0], "up00", "upper table comes first");
        assert_eq!(tables[0].num_cols(), 4);
        assert_eq!(tables[1].rows[0][0], "low00");
        assert_eq!(tables[1].index, 1);
    }

    #[test]
    fn numbering_spans_pages_without_gaps() {
        let pages = vec![
            page(0, grid_runs(100.0, 2, 2, "p")),
            page(1, vec![paragraph(80.0, "no table here")]),
            page(2, grid_runs(100.0, 2, 3, "q")),
        ];
        let tables = extract_tables(&pages, &TableDetection::default());
        let names: Vec<String> = tables.iter().map(ExtractedTable::sheet_name).collect();
        assert_eq!(names, vec!["Table_1", "Table_2"]);
        assert_eq!(tables[0].page, 0);
        assert_eq!(tables[1].page, 2);
    }

    #[test]
    fn ragged_row_lands_in_matching_columns() {
        let mut runs = grid_runs(100.0, 3, 3, "c");
        // the middle row misses its last cell
        runs.retain(|r| r.text != "c12");
        let tables = extract_tables(&[page(0, runs)], &TableDetection::default());
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows[1], vec!["c10", "c11", ""]);
    }

    #[test]
    fn single_row_is_below_min_rows() {
        let runs = grid_runs(100.0, 1, 5, "x");
        assert!(extract_tables(&[page(0, runs)], &TableDetection::default()).is_empty());
    }

    #[test]
    fn runs_within_row_tolerance_merge() {
        let mut runs = grid_runs(100.0, 2, 2, "m");
        // slightly offset baseline still belongs to row 0
        runs.push(TextRun::new("extra", 210.0, 102.0, 20.0, 10.0));
        let tables = extract_tables(&[page(0, runs)], &TableDetection::default());
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].num_cols(), 3);
        assert_eq!(tables[0].rows[0][2], "extra");
    }
}
