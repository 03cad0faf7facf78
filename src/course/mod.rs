pub mod dates;
pub mod identity;
pub mod schedule;
pub mod term;

use serde::Serialize;
use tracing::info;

use crate::config::ExtractionTuning;
use crate::core::course::{CourseTerm, SectionOption};
use crate::core::document::DocumentStructure;

pub use identity::{CourseCode, CourseIdentity, TitleCandidate};

const TERM_PAGES: usize = 3;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseProfile {
    pub identity: CourseIdentity,
    pub term: Option<CourseTerm>,
    pub lecture_sections: Vec<SectionOption>,
    pub lab_sections: Vec<SectionOption>,
}

pub fn extract_profile(doc: &DocumentStructure, tuning: &ExtractionTuning) -> CourseProfile {
    let identity = identity::extract_identity(doc, tuning);
    let term = term::extract_term(&doc.text_of_pages(TERM_PAGES), &tuning.timezone);
    let lecture_sections = schedule::extract_lecture_sections(doc);
    let lab_sections = schedule::extract_lab_sections(doc);

    info!(
        code = identity.code.as_ref().map(|c| c.code.as_str()).unwrap_or("-"),
        term = term.as_ref().map(|t| t.name.as_str()).unwrap_or("-"),
        lectures = lecture_sections.len(),
        labs = lab_sections.len(),
        "course profile extracted"
    );

    CourseProfile {
        identity,
        term,
        lecture_sections,
        lab_sections,
    }
}
