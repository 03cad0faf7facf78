use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A grade weight in percent, always within (0, 100].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Weight(f64);

impl Weight {
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value > 0.0 && value <= 100.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Weight {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Weight::new(value).ok_or_else(|| format!("weight {value} outside (0, 100]"))
    }
}

impl From<Weight> for f64 {
    fn from(weight: Weight) -> f64 {
        weight.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

pub fn total_weight<'a>(weights: impl IntoIterator<Item = Option<&'a Weight>>) -> f64 {
    weights.into_iter().flatten().map(Weight::value).sum()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseTerm {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub timezone: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MeetingType {
    Lecture,
    Lab,
}

impl MeetingType {
    pub fn label(&self) -> &'static str {
        match self {
            MeetingType::Lecture => "lecture",
            MeetingType::Lab => "lab",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionOption {
    pub meeting_type: MeetingType,
    pub id: String,
    pub weekdays: BTreeSet<u8>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    FinalExam,
    Midterm,
    Quiz,
    Assignment,
    Lab,
    Project,
    Participation,
    Presentation,
    Exam,
    Other,
}

impl AssessmentType {
    pub fn infer(title: &str) -> Self {
        let lower = title.to_lowercase();
        let has = |kw: &str| lower.contains(kw);
        if has("final") && has("exam") {
            AssessmentType::FinalExam
        } else if has("midterm") || has("mid-term") {
            AssessmentType::Midterm
        } else if has("quiz") || has("test") {
            AssessmentType::Quiz
        } else if has("assignment") || has("homework") {
            AssessmentType::Assignment
        } else if has("lab") {
            AssessmentType::Lab
        } else if has("project") {
            AssessmentType::Project
        } else if has("participation") || has("attendance") {
            AssessmentType::Participation
        } else if has("presentation") {
            AssessmentType::Presentation
        } else if has("exam") {
            AssessmentType::Exam
        } else {
            AssessmentType::Other
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentTask {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    pub weight: Option<Weight>,
    pub due_datetime: Option<NaiveDateTime>,
    pub due_rule: Option<String>,
    pub rule_anchor: Option<String>,
    pub confidence: f32,
    pub evidence: String,
    pub needs_review: bool,
}

impl AssessmentTask {
    pub fn has_due_info(&self) -> bool {
        self.due_datetime.is_some() || self.due_rule.is_some()
    }

    pub fn is_unresolved(&self) -> bool {
        self.due_rule.is_some() && self.due_datetime.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedCourseData {
    pub term: Option<CourseTerm>,
    pub lecture_sections: Vec<SectionOption>,
    pub lab_sections: Vec<SectionOption>,
    pub assessments: Vec<AssessmentTask>,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
}

impl ExtractedCourseData {
    pub fn total_weight(&self) -> f64 {
        total_weight(self.assessments.iter().map(|a| a.weight.as_ref()))
    }
}
