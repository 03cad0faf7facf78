//! Linear-scan strategy: no sections, no tables, just `Title NN%` lines.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::assessment::candidate::{AssessmentCandidate, SourceMethod};
use crate::assessment::generator::{duplicates_existing, title_case};
use crate::assessment::vocabulary::is_garbage_fallback_title;
use crate::config::ExtractionTuning;
use crate::core::course::Weight;
use crate::core::document::DocumentStructure;

const FALLBACK_PAGES: usize = 8;
const EVIDENCE_CHARS: usize = 100;

static RE_TITLE_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Za-z\s\-]+?)\s+(\d+(?:\.\d+)?)\s*%").expect("valid title-percent regex")
});

/// "Quizzes (best 5 of 6) 2% each for up to 10%"
static RE_UP_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(Quiz(?:zes)?|Assignments?|Labs?|Tests?|Homeworks?|Exercises?)\s*\([^)]*(?:\([^)]*\)[^)]*)*\)[^%]*\d+%[^%]*for\s+up\s+to\s+(\d+(?:\.\d+)?)\s*%",
    )
    .expect("valid up-to regex")
});

fn push_candidate(
    candidates: &mut Vec<AssessmentCandidate>,
    threshold: f32,
    title: &str,
    raw_weight: &str,
    page_idx: Option<usize>,
    evidence: &str,
) {
    let Some(weight) = raw_weight.parse::<f64>().ok().and_then(Weight::new) else {
        return;
    };
    if duplicates_existing(candidates, title, weight, threshold) {
        return;
    }
    let mut builder = AssessmentCandidate::builder(title, SourceMethod::RawFallback)
        .weight(Some(weight))
        .evidence(evidence)
        .in_evaluation(true);
    if let Some(page_idx) = page_idx {
        builder = builder.page(page_idx);
    }
    candidates.push(builder.build());
}

pub fn generate_fallback(
    doc: &DocumentStructure,
    tuning: &ExtractionTuning,
) -> Vec<AssessmentCandidate> {
    let threshold = tuning.near_duplicate_similarity;
    let mut candidates: Vec<AssessmentCandidate> = Vec::new();

    for line in doc.lines.iter().filter(|l| l.page_idx < FALLBACK_PAGES) {
        let text = line.text();
        let Some(caps) = RE_TITLE_PERCENT.captures(&text) else {
            continue;
        };
        let title = caps[1].trim();
        if is_garbage_fallback_title(title) {
            continue;
        }
        push_candidate(&mut candidates, threshold, title, &caps[2], Some(line.page_idx), &text);
    }

    let joined = doc.text_of_pages(FALLBACK_PAGES);
    for caps in RE_UP_TO.captures_iter(&joined) {
        let evidence: String = caps[0].chars().take(EVIDENCE_CHARS).collect();
        let title = title_case(&caps[1]);
        push_candidate(&mut candidates, threshold, &title, &caps[2], None, &evidence);
    }

    debug!(count = candidates.len(), "fallback scan finished");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use crate::core::model::{Line, TextFragment};
    use pretty_assertions::assert_eq;

    fn line(page_idx: usize, text: &str, y: f32) -> Line {
        Line::new(
            page_idx,
            y,
            vec![TextFragment {
                text: text.to_string(),
                page_idx,
                bbox: BBox::new(72.0, y, 400.0, y + 10.0),
                font_size: 10.0,
                bold: false,
                font_name: String::new(),
            }],
        )
    }

    #[test]
    fn scans_title_lines_and_up_to_clauses() {
        let doc = DocumentStructure {
            lines: vec![
                line(0, "Midterm Test 30%", 100.0),
                line(0, "Late penalty 10% per day", 120.0),
                line(1, "Final Examination 45%", 140.0),
                line(1, "Quizzes (best 5 of 6, see (a) below) 2% each for up to 10%", 160.0),
                line(9, "Project 15%", 100.0),
            ],
            ..DocumentStructure::default()
        };
        let candidates = generate_fallback(&doc, &ExtractionTuning::default());
        let found: Vec<(&str, f64)> = candidates
            .iter()
            .map(|c| (c.title(), c.weight_value()))
            .collect();
        assert_eq!(
            found,
            vec![("Midterm Test", 30.0), ("Final Examination", 45.0), ("Quizzes", 10.0)]
        );
        assert!(candidates.iter().all(|c| c.features().in_evaluation));
    }

    #[test]
    fn up_to_clause_ignores_case() {
        let doc = DocumentStructure {
            lines: vec![line(0, "QUIZZES (best 4 of 5) 2.5% each FOR UP TO 10%", 100.0)],
            ..DocumentStructure::default()
        };
        let candidates = generate_fallback(&doc, &ExtractionTuning::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title(), "Quizzes");
        assert_eq!(candidates[0].weight_value(), 10.0);
    }
}
