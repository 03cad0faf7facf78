use std::sync::LazyLock;

use regex::Regex;

use crate::core::model::{Line, SectionCategory};

/// Heading vocabulary per section category, checked in this order.
pub const SECTION_VOCABULARY: &[(SectionCategory, &[&str])] = &[
    (
        SectionCategory::Evaluation,
        &[
            "evaluation",
            "assessment",
            "grading",
            "grade breakdown",
            "methods of evaluation",
            "course evaluation",
            "grading scheme",
        ],
    ),
    (
        SectionCategory::CourseInfo,
        &[
            "course information",
            "course description",
            "course details",
            "course overview",
        ],
    ),
    (
        SectionCategory::Schedule,
        &[
            "schedule",
            "calendar",
            "important dates",
            "key dates",
            "course schedule",
            "lecture schedule",
        ],
    ),
    (
        SectionCategory::Outcomes,
        &["learning outcomes", "course objectives", "objectives"],
    ),
    (
        SectionCategory::Requirements,
        &["requirements", "prerequisites", "essential requirements"],
    ),
    (
        SectionCategory::Policies,
        &["policies", "academic integrity", "accommodations"],
    ),
];

static RE_NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.?\s+[A-Z]").expect("valid numbered heading regex"));

/// First category whose vocabulary occurs in `text`.
pub fn categorize(text: &str) -> SectionCategory {
    let lower = text.to_lowercase();
    SECTION_VOCABULARY
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(SectionCategory::Other)
}

#[derive(Debug, Clone, Copy)]
pub struct HeadingDetector {
    threshold: f32,
}

impl HeadingDetector {
    /// `mean_font_size` is the document-wide mean; `None` disables the size test.
    pub fn new(mean_font_size: Option<f32>, ratio: f32) -> Self {
        let threshold = match mean_font_size {
            Some(mean) => mean * ratio,
            None => f32::INFINITY,
        };
        Self { threshold }
    }

    fn is_large(&self, size: f32) -> bool {
        // Relative slack so a size at exactly the ratio survives f32 rounding.
        size >= self.threshold - self.threshold.abs() * 1e-5
    }

    pub fn is_heading(&self, line: &Line) -> bool {
        if self.is_large(line.max_font_size()) || line.has_bold() {
            return true;
        }
        let text = line.text();
        RE_NUMBERED.is_match(&text) || categorize(&text) != SectionCategory::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use crate::core::model::TextFragment;

    fn line(text: &str, size: f32, bold: bool) -> Line {
        Line::new(
            0,
            100.0,
            vec![TextFragment {
                text: text.to_string(),
                page_idx: 0,
                bbox: BBox::new(72.0, 100.0, 300.0, 112.0),
                font_size: size,
                bold,
                font_name: String::new(),
            }],
        )
    }

    #[test]
    fn size_threshold_is_inclusive() {
        let detector = HeadingDetector::new(Some(10.0), 1.2);
        assert!(detector.is_heading(&line("Overview", 12.0, false)));
        assert!(!detector.is_heading(&line("Overview", 11.9, false)));
    }

    #[test]
    fn keyword_numbered_and_bold_headings() {
        let detector = HeadingDetector::new(Some(10.0), 1.2);
        assert!(detector.is_heading(&line("Methods of Evaluation", 10.0, false)));
        assert!(detector.is_heading(&line("3. Textbooks", 10.0, false)));
        assert!(detector.is_heading(&line("Office Hours", 10.0, true)));
        assert!(detector.is_heading(&line("Assessment 1: 15%", 10.0, false)));
        assert!(detector.is_heading(&line(
            "The course schedule below lists every topic we will cover in this term",
            10.0,
            false
        )));
        assert!(detector.is_heading(&line("2. Weekly Quizzes 10%", 10.0, false)));
        assert!(!detector.is_heading(&line("Plain body text here", 10.0, false)));
    }

    #[test]
    fn categories_follow_vocabulary_order() {
        assert_eq!(categorize("Grading Scheme"), SectionCategory::Evaluation);
        assert_eq!(categorize("Course Schedule"), SectionCategory::Schedule);
        assert_eq!(categorize("Learning Outcomes"), SectionCategory::Outcomes);
        assert_eq!(categorize("Textbooks"), SectionCategory::Other);
    }
}
