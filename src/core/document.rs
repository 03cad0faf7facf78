use serde::Serialize;

use crate::core::model::{Line, PageInfo, Section, SectionCategory, Table, TextFragment};

const EVALUATION_LOOKUPS: &[&str] = &[
    "evaluation",
    "assessment",
    "grading",
    "grade breakdown",
    "methods of evaluation",
    "course evaluation",
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentStructure {
    pub pages: Vec<PageInfo>,
    pub fragments: Vec<TextFragment>,
    pub lines: Vec<Line>,
    pub tables: Vec<Table>,
    pub sections: Vec<Section>,
}

impl DocumentStructure {
    pub fn section_by_keyword(&self, keyword: &str) -> Option<&Section> {
        let keyword = keyword.to_lowercase();
        self.sections.iter().find(|section| {
            section.category.label().contains(&keyword)
                || section.heading.to_lowercase().contains(&keyword)
        })
    }

    pub fn evaluation_section(&self) -> Option<&Section> {
        if let Some(section) = self
            .sections
            .iter()
            .find(|s| s.category == SectionCategory::Evaluation)
        {
            return Some(section);
        }
        EVALUATION_LOOKUPS
            .iter()
            .find_map(|keyword| self.section_by_keyword(keyword))
    }

    pub fn lines_in_section<'a>(&'a self, section: &'a Section) -> impl Iterator<Item = &'a Line> {
        self.lines
            .iter()
            .filter(move |line| section.contains(line.page_idx, line.anchor_y))
    }

    pub fn text_in_section(&self, section: &Section) -> String {
        self.lines_in_section(section)
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tables_in_section<'a>(&'a self, section: &'a Section) -> Vec<&'a Table> {
        self.tables
            .iter()
            .filter(|table| section.contains(table.page_idx, table.y0))
            .collect()
    }

    pub fn full_text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn text_of_pages(&self, page_count: usize) -> String {
        self.lines
            .iter()
            .filter(|line| line.page_idx < page_count)
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn lines_on_page(&self, page_idx: usize) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(move |line| line.page_idx == page_idx)
    }

    pub fn fragments_on_page(&self, page_idx: usize) -> impl Iterator<Item = &TextFragment> {
        self.fragments
            .iter()
            .filter(move |fragment| fragment.page_idx == page_idx)
    }

    pub fn page(&self, page_idx: usize) -> Option<&PageInfo> {
        self.pages.iter().find(|page| page.page_idx == page_idx)
    }

    pub fn mean_font_size(&self) -> Option<f32> {
        mean_font_size(self.fragments.iter())
    }
}

pub fn mean_font_size<'a>(fragments: impl Iterator<Item = &'a TextFragment>) -> Option<f32> {
    let (sum, count) = fragments
        .filter(|f| f.font_size > 0.0)
        .fold((0.0_f64, 0usize), |(sum, count), f| (sum + f.font_size as f64, count + 1));
    if count == 0 {
        None
    } else {
        Some((sum / count as f64) as f32)
    }
}
