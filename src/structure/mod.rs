pub mod headings;
pub mod sections;

use tracing::{debug, info};

use crate::config::ExtractionTuning;
use crate::core::document::{mean_font_size, DocumentStructure};
use crate::core::model::{Line, PageInfo};
use crate::parser::line_builder::build_lines;
use crate::parser::table_builder::{import_native, reconstruct_tables};
use crate::parser::RawLayout;

use headings::HeadingDetector;

pub fn build_structure(layout: RawLayout, tuning: &ExtractionTuning) -> DocumentStructure {
    let mut pages: Vec<PageInfo> = Vec::with_capacity(layout.pages.len());
    let mut fragments = Vec::with_capacity(layout.fragment_count());
    let mut tables = Vec::new();

    for page in layout.pages {
        let page_idx = page.info.page_idx;
        tables.extend(page.tables.iter().filter_map(|raw| import_native(page_idx, raw)));
        fragments.extend(page.fragments);
        pages.push(page.info);
    }

    let lines = build_lines(&fragments, tuning.line_tolerance);
    tables.extend(reconstruct_tables(&lines));

    let detector = HeadingDetector::new(
        mean_font_size(fragments.iter()),
        tuning.heading_font_ratio,
    );
    let heading_lines: Vec<&Line> = lines.iter().filter(|l| detector.is_heading(l)).collect();
    debug!("{} heading lines", heading_lines.len());

    let last_page = pages.iter().map(|p| p.page_idx).max().unwrap_or(0);
    let sections = sections::segment(&heading_lines, last_page);

    info!(
        pages = pages.len(),
        fragments = fragments.len(),
        lines = lines.len(),
        tables = tables.len(),
        sections = sections.len(),
        "document structure built"
    );

    DocumentStructure {
        pages,
        fragments,
        lines,
        tables,
        sections,
    }
}
