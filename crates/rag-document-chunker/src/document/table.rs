//! Table extraction: HTML markup -> grid -> compact markdown + packing text.

use super::chunk::TableLink;
use crate::nlp::segmenter::{SegmentationOutcome, SentenceSegmenterAdapter};
use crate::utils::error::{IngestError, Result};
use crate::utils::hashing::table_id;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Marks where the partitioner spilled the next row's text into a cell.
pub const CONTINUATION_DELIMITER: &str = " L ";

/// Separator used when flattening a table for packing.
pub const CELL_SEPARATOR: &str = " ; ";

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("valid selector"));

static PIPES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|+").expect("valid regex"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static HEADER_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|:-{3,}").expect("valid regex"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w\.-]+@[\w\.-]+\.[a-zA-Z]{2,}").expect("valid regex"));

/// Rectangular table: one header row plus body rows of equal width.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableGrid {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut grid = Self { headers, rows };
        grid.pad();
        grid
    }

    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Pad short rows (and the header) with empty cells up to the widest row.
    fn pad(&mut self) {
        let width = self.width();
        self.headers.resize(width, String::new());
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }

    /// Parse `<table>` markup. The header is the `<thead>` row, or a first row made
    /// only of `<th>` cells; without one the header is blank.
    pub fn from_html(html: &str) -> Result<Self> {
        let fragment = Html::parse_fragment(html);
        let rows: Vec<ElementRef> = fragment.select(&ROW_SELECTOR).collect();

        if rows.is_empty() {
            return Err(IngestError::MalformedTable(
                "table markup contains no rows".to_string(),
            ));
        }

        let header_in_first_row = is_header_row(&rows[0]);
        let mut parsed: Vec<Vec<String>> = rows.iter().map(row_cells).collect();

        let headers = if header_in_first_row {
            parsed.remove(0)
        } else {
            Vec::new()
        };

        let grid = Self::new(headers, parsed);
        debug!(
            "Parsed table grid: {} columns, {} rows",
            grid.width(),
            grid.rows.len()
        );

        Ok(grid)
    }
}

fn is_header_row(row: &ElementRef) -> bool {
    let in_thead = row
        .parent()
        .and_then(ElementRef::wrap)
        .map(|parent| parent.value().name() == "thead")
        .unwrap_or(false);

    let mut cells = row.select(&CELL_SELECTOR).peekable();
    let all_th = cells.peek().is_some() && cells.all(|cell| cell.value().name() == "th");

    in_thead || all_th
}

fn row_cells(row: &ElementRef) -> Vec<String> {
    let mut cells = Vec::new();

    for cell in row.select(&CELL_SELECTOR) {
        let text = cell_text(&cell);
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);

        // Spanned columns repeat the value
        for _ in 0..span {
            cells.push(text.clone());
        }
    }

    cells
}

fn cell_text(cell: &ElementRef) -> String {
    let joined = cell
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    WHITESPACE.replace_all(&joined, " ").into_owned()
}

/// Move text that follows the continuation delimiter into the same column of the
/// next body row.
///
/// Runs top to bottom, so text moved into a row is itself examined when that row's
/// turn comes. A leading `"L "` left over from a previous move is dropped.
pub fn repair_continuations(grid: &mut TableGrid, delimiter: &str) {
    let row_count = grid.rows.len();
    if row_count < 2 {
        return;
    }

    for row_idx in 0..row_count - 1 {
        let (current, rest) = grid.rows.split_at_mut(row_idx + 1);
        let row = &mut current[row_idx];
        let next_row = &mut rest[0];

        for (col_idx, cell) in row.iter_mut().enumerate() {
            if cell.is_empty() {
                continue;
            }

            if let Some(stripped) = cell.strip_prefix("L ") {
                *cell = stripped.to_string();
            }

            let Some((head, tail)) = cell.split_once(delimiter) else {
                continue;
            };
            let (head, tail) = (head.trim().to_string(), tail.trim().to_string());
            *cell = head;

            if let Some(next_cell) = next_row.get_mut(col_idx) {
                *next_cell = format!("{} {}", tail, next_cell);
            }
        }
    }
}

/// Replace runs of `|` with a space, collapse whitespace and trim.
pub fn clean_cells(grid: &mut TableGrid) {
    let cells = grid.headers.iter_mut().chain(grid.rows.iter_mut().flatten());
    for cell in cells {
        let without_pipes = PIPES.replace_all(cell.as_str(), " ");
        *cell = WHITESPACE.replace_all(&without_pipes, " ").trim().to_string();
    }
}

/// OCR renders `@` as `(` plus a stray character. Restore the addresses found in the
/// element's plain text, first occurrence per address.
pub fn restore_email_addresses(grid: &mut TableGrid, plain_text: &str) {
    for email in EMAIL.find_iter(plain_text) {
        let Some((_, domain)) = email.as_str().split_once('@') else {
            continue;
        };

        let Ok(pattern) = Regex::new(&format!(r"\([\w\.-]+{}", regex::escape(domain))) else {
            continue;
        };
        let replacement = format!("@{}", domain);

        let cells = grid.headers.iter_mut().chain(grid.rows.iter_mut().flatten());
        for cell in cells {
            if pattern.is_match(cell.as_str()) {
                *cell = pattern
                    .replacen(cell.as_str(), 1, replacement.as_str())
                    .into_owned();
                break;
            }
        }
    }
}

/// Render as a pipe table with left-aligned, padded columns.
pub fn to_markdown(grid: &TableGrid) -> String {
    let width = grid.width();
    let widths: Vec<usize> = (0..width)
        .map(|col| {
            grid.rows
                .iter()
                .chain(std::iter::once(&grid.headers))
                .map(|row| row.get(col).map(|c| c.chars().count()).unwrap_or(0))
                .max()
                .unwrap_or(0)
                .max(3)
        })
        .collect();

    let render_row = |cells: &[String]| -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, w)| {
                let cell = cells.get(col).map(String::as_str).unwrap_or("");
                format!("{:<w$}", cell, w = *w)
            })
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let rule: Vec<String> = widths
        .iter()
        .map(|w| format!(":{}", "-".repeat(w + 1)))
        .collect();

    let mut lines = Vec::with_capacity(grid.rows.len() + 2);
    lines.push(render_row(&grid.headers));
    lines.push(format!("|{}|", rule.join("|")));
    lines.extend(grid.rows.iter().map(|row| render_row(row)));

    lines.join("\n")
}

/// Collapse space runs and shorten header rules to `|:--`.
pub fn compact_markdown(markdown: &str) -> String {
    let collapsed = SPACES.replace_all(markdown, " ");
    HEADER_RULE.replace_all(&collapsed, "|:--").into_owned()
}

/// Headers followed by every cell in row-major order, joined by `" ; "`.
pub fn flatten(grid: &TableGrid) -> String {
    grid.headers
        .iter()
        .chain(grid.rows.iter().flatten())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(CELL_SEPARATOR)
}

/// A table ready for packing.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    pub grid: TableGrid,
    /// Compact markdown, stored on every chunk of the table
    pub markdown: String,
    pub table_id: String,
    /// Flattened cell text fed to the segmenter
    pub flattened: String,
}

impl ExtractedTable {
    pub fn link(&self) -> TableLink {
        TableLink {
            table_id: self.table_id.clone(),
            table_text: self.markdown.clone(),
        }
    }
}

#[derive(Clone)]
pub struct TableExtractor {
    segmenter: SentenceSegmenterAdapter,
}

impl TableExtractor {
    pub fn new(segmenter: SentenceSegmenterAdapter) -> Self {
        Self { segmenter }
    }

    /// Cleanup stage for one table element: parse, repair, clean.
    pub fn clean(html: &str, plain_text: &str, cells_extracted: bool) -> Result<TableGrid> {
        let mut grid = TableGrid::from_html(html)?;

        if cells_extracted {
            repair_continuations(&mut grid, CONTINUATION_DELIMITER);
        }
        clean_cells(&mut grid);
        restore_email_addresses(&mut grid, plain_text);

        Ok(grid)
    }

    pub fn extract(&self, grid: TableGrid) -> ExtractedTable {
        let markdown = compact_markdown(&to_markdown(&grid));
        let table_id = table_id(&markdown);
        let flattened = flatten(&grid);

        ExtractedTable {
            grid,
            markdown,
            table_id,
            flattened,
        }
    }

    pub fn sentences(&self, table: &ExtractedTable, page_number: u32) -> SegmentationOutcome {
        self.segmenter.segment(&table.flattened, page_number)
    }
}
