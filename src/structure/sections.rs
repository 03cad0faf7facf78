use crate::core::geometry::DocPosition;
use crate::core::model::{Line, Section};
use crate::structure::headings::categorize;

/// Partitions the document at heading lines.
///
/// Each heading opens a section that runs up to the next heading, the last
/// one up to the end of `last_page`. Headings sharing a position with their
/// successor produce no section.
pub fn segment(headings: &[&Line], last_page: usize) -> Vec<Section> {
    let mut ordered: Vec<&Line> = headings.to_vec();
    ordered.sort_by(|a, b| {
        a.page_idx
            .cmp(&b.page_idx)
            .then(a.anchor_y.total_cmp(&b.anchor_y))
    });

    let document_end = DocPosition::new(last_page, f32::MAX);
    ordered
        .iter()
        .enumerate()
        .filter_map(|(i, heading)| {
            let end = ordered
                .get(i + 1)
                .map(|next| next.position())
                .unwrap_or(document_end);
            let text = heading.text();
            Section::new(categorize(&text), text, heading.position(), end)
        })
        .collect()
}
