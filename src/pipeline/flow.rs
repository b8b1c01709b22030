//! Layout-to-reflow mapping for native (text-bearing) PDFs.
//!
//! Positioned runs become lines, lines become paragraphs, and paragraphs set
//! in noticeably larger type than the page's body text become headings. The
//! result is a list of [`FlowPage`]s that [`crate::writer::docx`] turns into a
//! DOCX with one page break between source pages.
//!
//! Run height stands in for font size: pdfium's segment boxes span ascender
//! to descender, which tracks the point size closely enough for ranking.

use crate::backend::{PageText, TextRun};
use std::cmp::Ordering;

/// Headings are set at least this much larger than the body text.
const HEADING_RATIO: f32 = 1.25;

/// Longer "headings" are treated as body text in large type.
const HEADING_MAX_LINES: usize = 3;

/// Vertical gap, relative to line height, that starts a new paragraph.
const PARAGRAPH_GAP_RATIO: f32 = 0.6;

/// Line-height change that starts a new paragraph.
const SIZE_CHANGE_RATIO: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Body,
}

/// A paragraph of reflowable text.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowBlock {
    pub kind: BlockKind,
    pub text: String,
    /// Approximate type size in points.
    pub size_pt: f32,
}

/// The paragraphs of one source page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowPage {
    pub blocks: Vec<FlowBlock>,
}

#[derive(Debug)]
struct Line {
    text: String,
    top: f32,
    bottom: f32,
    height: f32,
}

/// Lay out every page.
pub fn layout_pages(pages: &[PageText]) -> Vec<FlowPage> {
    pages.iter().map(layout_page).collect()
}

/// Lay out a single page.
pub fn layout_page(page: &PageText) -> FlowPage {
    let lines = build_lines(&page.runs);
    if lines.is_empty() {
        return FlowPage::default();
    }

    let body = median(lines.iter().map(|l| l.height).collect());

    let mut groups: Vec<Vec<&Line>> = Vec::new();
    for line in &lines {
        let starts_new = match groups.last().and_then(|g| g.last()) {
            None => true,
            Some(prev) => {
                let gap = line.top - prev.bottom;
                let ratio = line.height.max(prev.height) / line.height.min(prev.height).max(0.1);
                gap > PARAGRAPH_GAP_RATIO * prev.height.max(line.height)
                    || ratio > SIZE_CHANGE_RATIO
            }
        };
        if starts_new {
            groups.push(vec![line]);
        } else if let Some(group) = groups.last_mut() {
            group.push(line);
        }
    }

    let blocks = groups
        .into_iter()
        .map(|group| {
            let size = median(group.iter().map(|l| l.height).collect());
            let kind = if size >= body * HEADING_RATIO && group.len() <= HEADING_MAX_LINES {
                BlockKind::Heading
            } else {
                BlockKind::Body
            };
            FlowBlock {
                kind,
                text: join_lines(group.iter().map(|l| l.text.as_str())),
                size_pt: size.clamp(6.0, 72.0),
            }
        })
        .collect();

    FlowPage { blocks }
}

fn by_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn median(mut values: Vec<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| by_f32(*a, *b));
    values[values.len() / 2]
}

/// Cluster runs into visual lines, top to bottom.
fn build_lines(runs: &[TextRun]) -> Vec<Line> {
    let mut sorted: Vec<&TextRun> = runs.iter().filter(|r| !r.text.trim().is_empty()).collect();
    sorted.sort_by(|a, b| by_f32(a.center_y(), b.center_y()).then(by_f32(a.x, b.x)));

    let mut clusters: Vec<Vec<&TextRun>> = Vec::new();
    for run in sorted {
        match clusters.last_mut() {
            Some(line)
                if (run.center_y() - line[0].center_y()).abs()
                    <= 0.5 * run.height.max(line[0].height) =>
            {
                line.push(run)
            }
            _ => clusters.push(vec![run]),
        }
    }

    clusters
        .into_iter()
        .map(|mut runs| {
            runs.sort_by(|a, b| by_f32(a.x, b.x));
            let mut text = String::new();
            let mut prev_right: Option<f32> = None;
            for run in &runs {
                if let Some(right) = prev_right {
                    // adjacent glyph runs of one word touch; anything wider is a space
                    if run.x - right > 0.1 * run.height && !text.ends_with(' ') {
                        text.push(' ');
                    }
                }
                text.push_str(run.text.trim());
                prev_right = Some(run.right());
            }
            let top = runs.iter().map(|r| r.y).fold(f32::MAX, f32::min);
            let bottom = runs.iter().map(|r| r.bottom()).fold(f32::MIN, f32::max);
            let height = runs.iter().map(|r| r.height).fold(0.0, f32::max);
            Line {
                text,
                top,
                bottom,
                height,
            }
        })
        .collect()
}

/// Join wrapped lines, undoing end-of-line hyphenation before lowercase letters.
fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for line in lines {
        if out.is_empty() {
            out.push_str(line);
            continue;
        }
        let continues_word = out.ends_with('-')
            && line.chars().next().is_some_and(char::is_lowercase)
            && out
                .chars()
                .rev()
                .nth(1)
                .is_some_and(char::is_alphabetic);
        if continues_word {
            out.pop();
        } else {
            out.push(' ');
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(runs: Vec<TextRun>) -> PageText {
        PageText {
            index: 0,
            width: 612.0,
            height: 792.0,
            runs,
        }
    }

    fn body_line(top: f32, text: &str) -> TextRun {
        TextRun::new(text, 72.0, top, 300.0, 10.0)
    }

    #[test]
    fn heading_then_paragraphs() {
        let runs = vec![
            TextRun::new("Annual Report", 72.0, 60.0, 200.0, 20.0),
            body_line(100.0, "First line of the first"),
            body_line(112.0, "paragraph continues here."),
            body_line(150.0, "Second paragraph."),
        ];
        let flow = layout_page(&page(runs));
        assert_eq!(flow.blocks.len(), 3);
        assert_eq!(flow.blocks[0].kind, BlockKind::Heading);
        assert_eq!(flow.blocks[0].text, "Annual Report");
        assert_eq!(flow.blocks[1].kind, BlockKind::Body);
        assert_eq!(
            flow.blocks[1].text,
            "First line of the first paragraph continues here."
        );
        assert_eq!(flow.blocks[2].text, "Second paragraph.");
    }

    #[test]
    fn runs_on_one_baseline_form_a_line() {
        let runs = vec![
            TextRun::new("world", 130.0, 100.0, 40.0, 10.0),
            TextRun::new("Hello", 72.0, 101.0, 40.0, 10.0),
        ];
        let flow = layout_page(&page(runs));
        assert_eq!(flow.blocks.len(), 1);
        assert_eq!(flow.blocks[0].text, "Hello world");
    }

    #[test]
    fn touching_runs_are_not_spaced() {
        let runs = vec![
            TextRun::new("Con", 72.0, 100.0, 20.0, 10.0),
            TextRun::new("tinued", 92.0, 100.0, 35.0, 10.0),
        ];
        let flow = layout_page(&page(runs));
        assert_eq!(flow.blocks[0].text, "Continued");
    }

    #[test]
    fn hyphenated_wrap_is_joined() {
        let runs = vec![
            body_line(100.0, "an extra-"),
            body_line(112.0, "ordinary claim"),
        ];
        let flow = layout_page(&page(runs));
        assert_eq!(flow.blocks[0].text, "an extraordinary claim");
    }

    #[test]
    fn capitalised_continuation_keeps_hyphen() {
        assert_eq!(
            join_lines(["Jean-", "Paul"].into_iter()),
            "Jean- Paul",
            "only lowercase continuations are dehyphenated"
        );
    }

    #[test]
    fn empty_page_has_no_blocks() {
        let flow = layout_page(&page(Vec::new()));
        assert!(flow.blocks.is_empty());
    }

    #[test]
    fn pages_keep_order() {
        let pages = vec![
            PageText {
                index: 0,
                ..page(vec![body_line(100.0, "one")])
            },
            PageText {
                index: 1,
                ..page(vec![body_line(100.0, "two")])
            },
        ];
        let flow = layout_pages(&pages);
        assert_eq!(flow.len(), 2);
        assert_eq!(flow[0].blocks[0].text, "one");
        assert_eq!(flow[1].blocks[0].text, "two");
    }
}
