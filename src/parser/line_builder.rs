use crate::core::model::{Line, TextFragment};

/// Clusters fragments into visual lines, page by page.
///
/// Fragments are visited top to bottom. A line is anchored at the top edge of
/// its first fragment and takes every following fragment whose top edge lies
/// within `tolerance` of that anchor; the first fragment past the tolerance
/// opens the next line.
pub fn build_lines(fragments: &[TextFragment], tolerance: f32) -> Vec<Line> {
    let mut ordered: Vec<&TextFragment> = fragments.iter().collect();
    ordered.sort_by(|a, b| {
        a.page_idx
            .cmp(&b.page_idx)
            .then(a.bbox.y0.total_cmp(&b.bbox.y0))
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextFragment> = Vec::new();
    let mut anchor: Option<(usize, f32)> = None;

    for fragment in ordered {
        let joins = match anchor {
            Some((page, y)) => {
                page == fragment.page_idx && (fragment.bbox.y0 - y).abs() <= tolerance
            }
            None => false,
        };
        if !joins {
            if let Some((page, y)) = anchor {
                lines.push(Line::new(page, y, std::mem::take(&mut current)));
            }
            anchor = Some((fragment.page_idx, fragment.bbox.y0));
        }
        current.push(fragment.clone());
    }
    if let Some((page, y)) = anchor {
        lines.push(Line::new(page, y, current));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use pretty_assertions::assert_eq;

    fn fragment(text: &str, page_idx: usize, x0: f32, y0: f32) -> TextFragment {
        TextFragment {
            text: text.to_string(),
            page_idx,
            bbox: BBox::new(x0, y0, x0 + 40.0, y0 + 10.0),
            font_size: 10.0,
            bold: false,
            font_name: String::new(),
        }
    }

    #[test]
    fn groups_by_anchor_tolerance() {
        let fragments = vec![
            fragment("30%", 0, 400.0, 102.0),
            fragment("Midterm", 0, 72.0, 100.0),
            fragment("drift", 0, 200.0, 105.0),
            fragment("Final", 0, 72.0, 105.5),
            fragment("Other page", 1, 72.0, 100.0),
        ];
        let lines = build_lines(&fragments, 5.0);
        let texts: Vec<String> = lines.iter().map(Line::text).collect();
        assert_eq!(texts, vec!["Midterm drift 30%", "Final", "Other page"]);
        assert_eq!(lines[1].anchor_y, 105.5);
        assert_eq!(lines[2].page_idx, 1);
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(build_lines(&[], 5.0).is_empty());
    }
}
