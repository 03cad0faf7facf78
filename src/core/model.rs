use serde::{Deserialize, Serialize};

use crate::core::geometry::{BBox, DocPosition};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub page_idx: usize,
    pub bbox: BBox,
    pub font_size: f32,
    pub bold: bool,
    #[serde(default)]
    pub font_name: String,
}

impl TextFragment {
    pub fn position(&self) -> DocPosition {
        DocPosition::new(self.page_idx, self.bbox.y0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageInfo {
    pub page_idx: usize,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub page_idx: usize,
    pub anchor_y: f32,
    pub fragments: Vec<TextFragment>,
}

impl Line {
    pub fn new(page_idx: usize, anchor_y: f32, mut fragments: Vec<TextFragment>) -> Self {
        fragments.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
        Self {
            page_idx,
            anchor_y,
            fragments,
        }
    }

    pub fn position(&self) -> DocPosition {
        DocPosition::new(self.page_idx, self.anchor_y)
    }

    pub fn text(&self) -> String {
        join_fragments(self.fragments.iter())
    }

    pub fn left_text(&self) -> String {
        let mid = self.midpoint();
        join_fragments(self.fragments.iter().filter(|f| f.bbox.x0 < mid))
    }

    pub fn right_text(&self) -> String {
        let mid = self.midpoint();
        join_fragments(self.fragments.iter().filter(|f| f.bbox.x0 >= mid))
    }

    pub fn max_font_size(&self) -> f32 {
        self.fragments
            .iter()
            .map(|f| f.font_size)
            .fold(0.0_f32, f32::max)
    }

    pub fn has_bold(&self) -> bool {
        self.fragments.iter().any(|f| f.bold)
    }

    pub fn bbox(&self) -> Option<BBox> {
        let first = self.fragments.first()?.bbox;
        Some(
            self.fragments
                .iter()
                .skip(1)
                .fold(first, |acc, f| acc.union(&f.bbox)),
        )
    }

    fn midpoint(&self) -> f32 {
        match self.bbox() {
            Some(bbox) => (bbox.x0 + bbox.x1) * 0.5,
            None => 0.0,
        }
    }
}

fn join_fragments<'a>(fragments: impl Iterator<Item = &'a TextFragment>) -> String {
    fragments
        .map(|f| f.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TableSource {
    Native,
    Reconstructed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub page_idx: usize,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub source: TableSource,
    pub y0: f32,
    pub y1: f32,
}

impl Table {
    pub fn native(page_idx: usize, mut cells: Vec<Vec<String>>, y0: f32, y1: f32) -> Option<Self> {
        if cells.len() < 2 {
            return None;
        }
        let header = cells.remove(0);
        Some(Self {
            page_idx,
            header,
            rows: cells,
            source: TableSource::Native,
            y0,
            y1,
        })
    }

    pub fn reconstructed(page_idx: usize, rows: Vec<Vec<String>>, y0: f32, y1: f32) -> Option<Self> {
        if rows.len() < 2 {
            return None;
        }
        Some(Self {
            page_idx,
            header: vec!["Item".to_string(), "Weight".to_string()],
            rows,
            source: TableSource::Reconstructed,
            y0,
            y1,
        })
    }

    pub fn position(&self) -> DocPosition {
        DocPosition::new(self.page_idx, self.y0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    Evaluation,
    CourseInfo,
    Schedule,
    Outcomes,
    Requirements,
    Policies,
    Other,
}

impl SectionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SectionCategory::Evaluation => "evaluation",
            SectionCategory::CourseInfo => "course_info",
            SectionCategory::Schedule => "schedule",
            SectionCategory::Outcomes => "learning_outcomes",
            SectionCategory::Requirements => "requirements",
            SectionCategory::Policies => "policies",
            SectionCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub category: SectionCategory,
    pub heading: String,
    pub start: DocPosition,
    pub end: DocPosition,
    pub confidence: f32,
}

impl Section {
    pub fn new(
        category: SectionCategory,
        heading: String,
        start: DocPosition,
        end: DocPosition,
    ) -> Option<Self> {
        if !start.is_before(&end) {
            return None;
        }
        let confidence = if category == SectionCategory::Other {
            0.5
        } else {
            0.8
        };
        Some(Self {
            category,
            heading,
            start,
            end,
            confidence,
        })
    }

    pub fn contains(&self, page_idx: usize, y: f32) -> bool {
        let pos = DocPosition::new(page_idx, y);
        !pos.is_before(&self.start) && pos.is_before(&self.end)
    }
}
