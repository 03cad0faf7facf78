use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::core::model::{Line, Table};
use crate::parser::RawTable;

static RE_TRAILING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*%?$").expect("valid trailing number regex")
});

pub fn import_native(page_idx: usize, raw: &RawTable) -> Option<Table> {
    let table = Table::native(page_idx, raw.cells.clone(), raw.y0, raw.y1);
    if table.is_none() {
        debug!("dropping single-row native table on page {}", page_idx + 1);
    }
    table
}

/// A line reads as a pseudo-table row when its right half ends in a number
/// and its left half carries more than three characters of label.
fn row_cells(line: &Line) -> Option<Vec<String>> {
    let right = line.right_text();
    let left = line.left_text();
    let right = right.trim();
    let left = left.trim();
    if RE_TRAILING_NUMBER.is_match(right) && left.chars().count() > 3 {
        Some(vec![left.to_string(), right.to_string()])
    } else {
        None
    }
}

/// Collects right-aligned number rows on each page into (Item, Weight)
/// tables. Pages with fewer than two such rows produce nothing.
pub fn reconstruct_tables(lines: &[Line]) -> Vec<Table> {
    let mut by_page: BTreeMap<usize, Vec<&Line>> = BTreeMap::new();
    for line in lines {
        by_page.entry(line.page_idx).or_default().push(line);
    }

    let mut tables = Vec::new();
    for (page_idx, page_lines) in by_page {
        let rows: Vec<(f32, Vec<String>)> = page_lines
            .iter()
            .filter_map(|line| row_cells(line).map(|cells| (line.anchor_y, cells)))
            .collect();
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            continue;
        };
        let (y0, y1) = (first.0, last.0);
        let cells = rows.into_iter().map(|(_, cells)| cells).collect();
        if let Some(table) = Table::reconstructed(page_idx, cells, y0, y1) {
            tables.push(table);
        }
    }
    tables
}
