//! Turns relative due rules ("24 hours after lab") into one concrete task
//! per meeting occurrence.

pub mod rule;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::course::{AssessmentTask, CourseTerm, MeetingType, SectionOption};

use rule::{anchor_keyword, RuleOffset};

/// Why a rule could not be turned into dates. The task is kept and
/// flagged for review in every case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    #[error("rule names no lab, tutorial or lecture")]
    NoAnchor,
    #[error("no {0} section to anchor the rule")]
    NoSection(String),
    #[error("rule has no fixed offset")]
    NoOffset,
    #[error("no term or section dates to enumerate meetings")]
    NoDateRange,
    #[error("section never meets within its date range")]
    NoOccurrences,
    #[error("offset moves a due date outside the representable range")]
    OffsetOverflow,
}

/// Section for an anchor keyword. Tutorials are scheduled as labs, so a
/// tutorial anchor prefers a tutorial-labelled lab and falls back to any lab.
pub fn find_section<'s>(anchor: &str, sections: &'s [SectionOption]) -> Option<&'s SectionOption> {
    let labs = || sections.iter().filter(|s| s.meeting_type == MeetingType::Lab);
    match anchor {
        "lab" => labs().next(),
        "tutorial" => labs()
            .find(|s| s.id.to_lowercase().starts_with('t'))
            .or_else(|| labs().next()),
        "lecture" => sections
            .iter()
            .find(|s| s.meeting_type == MeetingType::Lecture),
        _ => None,
    }
}

/// Every meeting start of `section` between the range bounds, inclusive.
pub fn meeting_occurrences(
    section: &SectionOption,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<NaiveDateTime> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| {
            let weekday = day.weekday().num_days_from_monday() as u8;
            section.weekdays.contains(&weekday)
        })
        .map(|day| day.and_time(section.start_time))
        .collect()
}

pub fn resolve_task(
    task: &AssessmentTask,
    term: Option<&CourseTerm>,
    sections: &[SectionOption],
) -> Result<Vec<AssessmentTask>, ResolutionFailure> {
    let rule = task.due_rule.as_deref().unwrap_or_default();
    let anchor = task
        .rule_anchor
        .as_deref()
        .or_else(|| anchor_keyword(rule))
        .ok_or(ResolutionFailure::NoAnchor)?;
    let section = find_section(anchor, sections)
        .ok_or_else(|| ResolutionFailure::NoSection(anchor.to_string()))?;
    let offset = RuleOffset::parse(rule).ok_or(ResolutionFailure::NoOffset)?;

    let (start, end) = section
        .date_range
        .or_else(|| term.map(|t| (t.start_date, t.end_date)))
        .ok_or(ResolutionFailure::NoDateRange)?;
    let occurrences = meeting_occurrences(section, start, end);
    if occurrences.is_empty() {
        return Err(ResolutionFailure::NoOccurrences);
    }

    let shift = offset.duration().ok_or(ResolutionFailure::NoOffset)?;
    occurrences
        .into_iter()
        .enumerate()
        .map(|(idx, meeting)| {
            let due = meeting
                .checked_add_signed(shift)
                .ok_or(ResolutionFailure::OffsetOverflow)?;
            Ok(AssessmentTask {
                title: format!("{} {}", task.title, idx + 1),
                kind: task.kind,
                weight: task.weight,
                due_datetime: Some(due),
                due_rule: None,
                rule_anchor: None,
                confidence: task.confidence,
                evidence: task.evidence.clone(),
                needs_review: true,
            })
        })
        .collect()
}

pub fn resolve_rules(
    tasks: Vec<AssessmentTask>,
    term: Option<&CourseTerm>,
    sections: &[SectionOption],
) -> Vec<AssessmentTask> {
    let mut resolved = Vec::with_capacity(tasks.len());
    let (mut expanded, mut failed) = (0usize, 0usize);
    for mut task in tasks {
        if !task.is_unresolved() {
            resolved.push(task);
            continue;
        }
        match resolve_task(&task, term, sections) {
            Ok(occurrences) => {
                debug!("\"{}\" expanded into {} tasks", task.title, occurrences.len());
                expanded += 1;
                resolved.extend(occurrences);
            }
            Err(failure) => {
                debug!("could not resolve \"{}\": {}", task.title, failure);
                failed += 1;
                task.needs_review = true;
                resolved.push(task);
            }
        }
    }
    if expanded + failed > 0 {
        info!(expanded, failed, "relative due rules processed");
    }
    resolved
}
