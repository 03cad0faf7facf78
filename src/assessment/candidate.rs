use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::core::confidence::ScoreSignals;
use crate::core::course::Weight;
use crate::assessment::vocabulary::{has_assessment_noun, is_bonus, looks_like_title};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMethod {
    Table,
    ReconstructedTable,
    Inline,
    InlineTable,
    InlineKeyword,
    RawFallback,
}

impl SourceMethod {
    pub fn is_table(&self) -> bool {
        matches!(self, SourceMethod::Table | SourceMethod::ReconstructedTable)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceMethod::Table => "table",
            SourceMethod::ReconstructedTable => "reconstructed_table",
            SourceMethod::Inline => "inline",
            SourceMethod::InlineTable => "inline_table",
            SourceMethod::InlineKeyword => "inline_keyword",
            SourceMethod::RawFallback => "raw_fallback",
        }
    }
}

impl fmt::Display for SourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DueInfo {
    #[default]
    Unknown,
    At { datetime: NaiveDateTime },
    Rule { text: String, anchor: Option<String> },
}

impl DueInfo {
    pub fn is_known(&self) -> bool {
        !matches!(self, DueInfo::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePayload {
    pub title: String,
    pub weight: Option<Weight>,
    pub due: DueInfo,
    pub source: SourceMethod,
    pub page_idx: Option<usize>,
    pub evidence: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CandidateFeatures {
    pub has_noun: bool,
    pub in_evaluation: bool,
    pub in_table: bool,
    pub bonus: bool,
    pub looks_like_title: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Annotation {
    pub score: f32,
    pub rejection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentCandidate {
    payload: CandidatePayload,
    features: CandidateFeatures,
    annotation: Annotation,
}

impl AssessmentCandidate {
    pub fn builder(title: impl Into<String>, source: SourceMethod) -> CandidateBuilder {
        CandidateBuilder {
            title: title.into(),
            source,
            weight: None,
            due: DueInfo::Unknown,
            page_idx: None,
            evidence: String::new(),
            in_evaluation: false,
        }
    }

    pub fn payload(&self) -> &CandidatePayload {
        &self.payload
    }

    pub fn title(&self) -> &str {
        &self.payload.title
    }

    pub fn weight(&self) -> Option<Weight> {
        self.payload.weight
    }

    pub fn weight_value(&self) -> f64 {
        self.payload.weight.map(|w| w.value()).unwrap_or(0.0)
    }

    pub fn features(&self) -> &CandidateFeatures {
        &self.features
    }

    pub fn is_bonus(&self) -> bool {
        self.features.bonus
    }

    pub fn score(&self) -> f32 {
        self.annotation.score
    }

    pub fn rejection(&self) -> Option<&str> {
        self.annotation.rejection.as_deref()
    }

    pub fn signals(&self) -> ScoreSignals {
        ScoreSignals {
            valid_weight: self.payload.weight.is_some(),
            has_noun: self.features.has_noun,
            in_evaluation: self.features.in_evaluation,
            table_sourced: self.features.in_table,
            title_shaped: self.features.looks_like_title,
        }
    }

    pub(crate) fn set_score(&mut self, score: f32) {
        self.annotation.score = score;
    }

    pub(crate) fn reject(&mut self, reason: impl Into<String>) {
        self.annotation.rejection = Some(reason.into());
    }

    pub fn into_payload(self) -> (CandidatePayload, Annotation) {
        (self.payload, self.annotation)
    }
}

#[derive(Debug, Clone)]
pub struct CandidateBuilder {
    title: String,
    source: SourceMethod,
    weight: Option<Weight>,
    due: DueInfo,
    page_idx: Option<usize>,
    evidence: String,
    in_evaluation: bool,
}

impl CandidateBuilder {
    pub fn weight(mut self, weight: Option<Weight>) -> Self {
        self.weight = weight;
        self
    }

    pub fn due(mut self, due: DueInfo) -> Self {
        self.due = due;
        self
    }

    pub fn page(mut self, page_idx: usize) -> Self {
        self.page_idx = Some(page_idx);
        self
    }

    pub fn evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    pub fn in_evaluation(mut self, in_evaluation: bool) -> Self {
        self.in_evaluation = in_evaluation;
        self
    }

    pub fn build(self) -> AssessmentCandidate {
        let features = CandidateFeatures {
            has_noun: has_assessment_noun(&self.title),
            in_evaluation: self.in_evaluation,
            in_table: self.source.is_table(),
            bonus: is_bonus(&self.title),
            looks_like_title: looks_like_title(&self.title),
        };
        AssessmentCandidate {
            payload: CandidatePayload {
                title: self.title,
                weight: self.weight,
                due: self.due,
                source: self.source,
                page_idx: self.page_idx,
                evidence: self.evidence,
            },
            features,
            annotation: Annotation::default(),
        }
    }
}
