use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::assessment::candidate::{AssessmentCandidate, DueInfo, SourceMethod};
use crate::assessment::compare::is_near_duplicate;
use crate::assessment::vocabulary::{
    clean_cell, has_assessment_noun, is_garbage_title, is_summary_row, ASSESSMENT_TABLE_HEADERS,
    NAME_HEADERS, WEIGHT_HEADERS,
};
use crate::config::ExtractionTuning;
use crate::core::course::{CourseTerm, Weight};
use crate::core::document::DocumentStructure;
use crate::core::model::{Line, Section, Table, TableSource};
use crate::course::dates::{is_relative_phrase, parse_due_datetime};
use crate::resolver::rule::anchor_keyword;

static RE_CELL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%?").expect("valid cell number regex"));

/// "Assignment 1: 25%", "Midterm Test 25%"
static RE_NAME_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][A-Za-z\s]+(?:\d+\b)?)\s*[:\-]?\s*(\d+(?:\.\d+)?)\s*%")
        .expect("valid name-percent regex")
});

/// "25% - Final Exam"
static RE_PERCENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*%\s*[:\-]?\s*([A-Z][A-Za-z\s]+)")
        .expect("valid percent-name regex")
});

/// "Participation 10% Participation in class activities"
static RE_PSEUDO_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Za-z\-\s]{2,25}?)\s+(\d+(?:\.\d+)?)\s*%")
        .expect("valid pseudo-row regex")
});

/// "Final Exam 40%", "Labs 10%"
static RE_KEYWORD_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b((?:final\s+)?(?:exam|midterm|quiz|test|lab|assignment|participation|research|project)(?:s|ination)?(?:\s+\d+\b)?)\s*[:\-]?\s*(\d+(?:\.\d+)?)\s*%",
    )
    .expect("valid keyword-percent regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub weight: Option<usize>,
    pub date: Option<usize>,
}

pub fn is_assessment_table(table: &Table) -> bool {
    let header = table.header.join(" ").to_lowercase();
    ASSESSMENT_TABLE_HEADERS.iter().any(|kw| header.contains(kw))
}

/// Maps header cells to name/weight/date columns. The name column falls
/// back to the first one; a "due" header beats a plain "date" header.
pub fn map_columns(header: &[String]) -> ColumnMap {
    let mut name = None;
    let mut weight = None;
    let mut due = None;
    let mut date = None;
    for (idx, cell) in header.iter().enumerate() {
        let lower = cell.to_lowercase();
        if NAME_HEADERS.iter().any(|kw| lower.contains(kw)) {
            name.get_or_insert(idx);
        } else if WEIGHT_HEADERS.iter().any(|kw| lower.contains(kw)) {
            weight.get_or_insert(idx);
        } else if lower.contains("due") {
            due.get_or_insert(idx);
        } else if lower.contains("date") {
            date.get_or_insert(idx);
        }
    }
    ColumnMap {
        name: name.unwrap_or(0),
        weight,
        date: due.or(date),
    }
}

pub fn parse_weight_cell(cell: &str) -> Option<Weight> {
    let caps = RE_CELL_NUMBER.captures(cell)?;
    Weight::new(caps[1].parse().ok()?)
}

fn cell(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i)).map(String::as_str)
}

pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Whether `title` at `weight` repeats a candidate already captured.
pub fn duplicates_existing(
    existing: &[AssessmentCandidate],
    title: &str,
    weight: Weight,
    threshold: f32,
) -> bool {
    existing.iter().any(|c| {
        c.weight() == Some(weight) && is_near_duplicate(c.title(), title, threshold)
    })
}

pub struct CandidateGenerator<'a> {
    doc: &'a DocumentStructure,
    term: Option<&'a CourseTerm>,
    tuning: &'a ExtractionTuning,
    evaluation: Option<&'a Section>,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(
        doc: &'a DocumentStructure,
        term: Option<&'a CourseTerm>,
        tuning: &'a ExtractionTuning,
    ) -> Self {
        Self {
            doc,
            term,
            tuning,
            evaluation: doc.evaluation_section(),
        }
    }

    pub fn evaluation_section(&self) -> Option<&'a Section> {
        self.evaluation
    }

    pub fn generate(&self) -> Vec<AssessmentCandidate> {
        let mut candidates = self.from_tables();
        let table_count = candidates.len();
        self.extend_from_inline(&mut candidates);
        debug!(
            tables = table_count,
            inline = candidates.len() - table_count,
            "generated assessment candidates"
        );
        candidates
    }

    pub fn from_tables(&self) -> Vec<AssessmentCandidate> {
        self.doc
            .tables
            .iter()
            .filter(|table| is_assessment_table(table))
            .flat_map(|table| self.from_table(table))
            .collect()
    }

    fn due_from_cell(&self, cell: &str) -> DueInfo {
        let cell = cell.trim();
        if cell.is_empty() {
            return DueInfo::Unknown;
        }
        if is_relative_phrase(cell) {
            return DueInfo::Rule {
                text: cell.to_string(),
                anchor: anchor_keyword(cell).map(str::to_string),
            };
        }
        match parse_due_datetime(cell, self.term, self.tuning.default_due_time) {
            Some(datetime) => DueInfo::At { datetime },
            None => {
                debug!("unparseable date cell \"{}\"", cell);
                DueInfo::Unknown
            }
        }
    }

    fn from_table(&self, table: &Table) -> Vec<AssessmentCandidate> {
        let columns = map_columns(&table.header);
        let source = match table.source {
            TableSource::Native => SourceMethod::Table,
            TableSource::Reconstructed => SourceMethod::ReconstructedTable,
        };
        let mut candidates = Vec::new();
        for row in &table.rows {
            let Some(name) = cell(row, Some(columns.name)) else {
                continue;
            };
            let title = clean_cell(name);
            if title.chars().count() < 3 || is_summary_row(&title) || is_garbage_title(&title) {
                continue;
            }
            let weight = cell(row, columns.weight).and_then(parse_weight_cell);
            let due = cell(row, columns.date)
                .map(|c| self.due_from_cell(c))
                .unwrap_or_default();

            candidates.push(
                AssessmentCandidate::builder(title, source)
                    .weight(weight)
                    .due(due)
                    .page(table.page_idx)
                    .evidence(row.join(" | "))
                    .in_evaluation(self.evaluation.is_some())
                    .build(),
            );
        }
        candidates
    }

    fn inline_lines(&self) -> Vec<&'a Line> {
        match self.evaluation {
            Some(section) => self.doc.lines_in_section(section).collect(),
            None => self.doc.lines.iter().collect(),
        }
    }

    fn push_inline(
        &self,
        candidates: &mut Vec<AssessmentCandidate>,
        title: String,
        raw_weight: &str,
        source: SourceMethod,
        page_idx: usize,
        evidence: &str,
    ) {
        let Some(weight) = raw_weight.parse::<f64>().ok().and_then(Weight::new) else {
            return;
        };
        if duplicates_existing(candidates, &title, weight, self.tuning.near_duplicate_similarity) {
            return;
        }
        candidates.push(
            AssessmentCandidate::builder(title, source)
                .weight(Some(weight))
                .page(page_idx)
                .evidence(evidence)
                .in_evaluation(self.evaluation.is_some())
                .build(),
        );
    }

    /// Runs the four inline patterns in order over each line of the
    /// evaluation text, skipping matches that repeat an earlier capture.
    pub fn extend_from_inline(&self, candidates: &mut Vec<AssessmentCandidate>) {
        let lines = self.inline_lines();
        let texts: Vec<(usize, String)> = lines.iter().map(|l| (l.page_idx, l.text())).collect();

        for (page_idx, text) in &texts {
            for caps in RE_NAME_PERCENT.captures_iter(text) {
                let title = caps[1].trim().to_string();
                if has_assessment_noun(&title) {
                    self.push_inline(candidates, title, &caps[2], SourceMethod::Inline, *page_idx, &caps[0]);
                }
            }
        }
        for (page_idx, text) in &texts {
            for caps in RE_PERCENT_NAME.captures_iter(text) {
                let title = caps[2].trim().to_string();
                if has_assessment_noun(&title) {
                    self.push_inline(candidates, title, &caps[1], SourceMethod::Inline, *page_idx, &caps[0]);
                }
            }
        }
        for (page_idx, text) in &texts {
            if let Some(caps) = RE_PSEUDO_ROW.captures(text) {
                let title = caps[1].trim().to_string();
                if !is_garbage_title(&title) {
                    self.push_inline(
                        candidates,
                        title,
                        &caps[2],
                        SourceMethod::InlineTable,
                        *page_idx,
                        &caps[0],
                    );
                }
            }
        }
        for (page_idx, text) in &texts {
            for caps in RE_KEYWORD_PERCENT.captures_iter(text) {
                let title = title_case(caps[1].trim());
                self.push_inline(
                    candidates,
                    title,
                    &caps[2],
                    SourceMethod::InlineKeyword,
                    *page_idx,
                    &truncate_chars(&caps[0], 200),
                );
            }
        }
    }
}
