//! Run statistics and completeness metrics for tuning and review.

use serde::Serialize;

use crate::assessment::{AssessmentCandidate, AssessmentOutcome, SourceMethod, Strategy};
use crate::core::course::ExtractedCourseData;
use crate::core::document::DocumentStructure;
use crate::core::model::TableSource;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub title: String,
    pub source: SourceMethod,
    pub weight: Option<f64>,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    pub evidence: String,
}

impl From<&AssessmentCandidate> for CandidateSummary {
    fn from(candidate: &AssessmentCandidate) -> Self {
        Self {
            title: candidate.title().to_string(),
            source: candidate.payload().source,
            weight: candidate.weight().map(|w| w.value()),
            score: candidate.score(),
            rejection: candidate.rejection().map(str::to_string),
            evidence: candidate.payload().evidence.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub page_count: usize,
    pub fragment_count: usize,
    pub line_count: usize,
    pub native_table_count: usize,
    pub reconstructed_table_count: usize,
    pub section_count: usize,
    pub evaluation_section: Option<String>,
    pub strategy: Strategy,
    pub structural_fitness: f32,
    pub fallback_fitness: f32,
    pub rejected: Vec<CandidateSummary>,
    pub selected: Vec<CandidateSummary>,
    pub total_selected_weight: f64,
    pub under_extracted: bool,
    pub text_rules_attached: usize,
}

impl RunStats {
    pub fn collect(doc: &DocumentStructure, outcome: &AssessmentOutcome) -> Self {
        let native_table_count = doc
            .tables
            .iter()
            .filter(|t| t.source == TableSource::Native)
            .count();
        Self {
            page_count: doc.pages.len(),
            fragment_count: doc.fragments.len(),
            line_count: doc.lines.len(),
            native_table_count,
            reconstructed_table_count: doc.tables.len() - native_table_count,
            section_count: doc.sections.len(),
            evaluation_section: outcome.evaluation_heading.clone(),
            strategy: outcome.strategy,
            structural_fitness: outcome.structural_fitness,
            fallback_fitness: outcome.fallback_fitness,
            rejected: outcome.rejected.iter().map(CandidateSummary::from).collect(),
            selected: outcome.selected.iter().map(CandidateSummary::from).collect(),
            total_selected_weight: outcome
                .selected
                .iter()
                .map(AssessmentCandidate::weight_value)
                .sum(),
            under_extracted: outcome.under_extracted,
            text_rules_attached: outcome.text_rules_attached,
        }
    }

    pub fn table_count(&self) -> usize {
        self.native_table_count + self.reconstructed_table_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessReport {
    pub course_code_found: bool,
    pub course_name_found: bool,
    pub term_found: bool,
    pub lecture_sections_found: bool,
    pub lab_sections_found: bool,
    pub assessment_count: usize,
    pub with_weight: usize,
    pub with_date: usize,
    pub complete: usize,
    pub needs_review: usize,
    pub total_weight: f64,
    pub weight_coverage_percent: f64,
    pub weight_missing_percent: f64,
    pub has_extra_credit: bool,
    pub assessment_completeness: f64,
    pub overall_completeness: f64,
}

impl CompletenessReport {
    pub fn assess(data: &ExtractedCourseData) -> Self {
        let tasks = &data.assessments;
        let with_weight = tasks.iter().filter(|t| t.weight.is_some()).count();
        let with_date = tasks.iter().filter(|t| t.due_datetime.is_some()).count();
        let complete = tasks
            .iter()
            .filter(|t| t.weight.is_some() && t.due_datetime.is_some())
            .count();
        let total_weight = data.total_weight();
        let coverage = total_weight.clamp(0.0, 100.0);

        let found = [
            data.course_code.is_some(),
            data.course_name.is_some(),
            data.term.is_some(),
            !data.lecture_sections.is_empty(),
            !data.lab_sections.is_empty(),
        ];
        let found_count = found.iter().filter(|f| **f).count();

        Self {
            course_code_found: found[0],
            course_name_found: found[1],
            term_found: found[2],
            lecture_sections_found: found[3],
            lab_sections_found: found[4],
            assessment_count: tasks.len(),
            with_weight,
            with_date,
            complete,
            needs_review: tasks.iter().filter(|t| t.needs_review).count(),
            total_weight,
            weight_coverage_percent: coverage,
            weight_missing_percent: 100.0 - coverage,
            has_extra_credit: total_weight > 100.0,
            assessment_completeness: if tasks.is_empty() {
                0.0
            } else {
                complete as f64 / tasks.len() as f64 * 100.0
            },
            overall_completeness: found_count as f64 / found.len() as f64 * 100.0,
        }
    }
}
