use crate::assessment::candidate::{AssessmentCandidate, DueInfo};
use crate::core::course::{AssessmentTask, AssessmentType};

/// Freezes a selected candidate into a task. Missing weight or due
/// information flags the task for review.
pub fn finalize(candidate: AssessmentCandidate) -> AssessmentTask {
    let (payload, annotation) = candidate.into_payload();
    let (due_datetime, due_rule, rule_anchor) = match payload.due {
        DueInfo::Unknown => (None, None, None),
        DueInfo::At { datetime } => (Some(datetime), None, None),
        DueInfo::Rule { text, anchor } => (None, Some(text), anchor),
    };
    let needs_review = payload.weight.is_none() || (due_datetime.is_none() && due_rule.is_none());
    AssessmentTask {
        kind: AssessmentType::infer(&payload.title),
        title: payload.title,
        weight: payload.weight,
        due_datetime,
        due_rule,
        rule_anchor,
        confidence: annotation.score,
        evidence: payload.evidence,
        needs_review,
    }
}

pub fn finalize_all(candidates: Vec<AssessmentCandidate>) -> Vec<AssessmentTask> {
    candidates.into_iter().map(finalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::candidate::SourceMethod;
    use crate::core::course::Weight;
    use chrono::NaiveDate;

    #[test]
    fn carries_due_fields() {
        let due = NaiveDate::from_ymd_opt(2025, 10, 15)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let mut candidate = AssessmentCandidate::builder("Midterm Exam", SourceMethod::Table)
            .weight(Weight::new(30.0))
            .due(DueInfo::At { datetime: due })
            .build();
        candidate.set_score(0.9);
        let task = finalize(candidate);
        assert_eq!(task.kind, AssessmentType::Midterm);
        assert_eq!(task.due_datetime, Some(due));
        assert!(!task.needs_review);
        assert_eq!(task.confidence, 0.9);
    }

    #[test]
    fn rule_without_weight_needs_review() {
        let candidate = AssessmentCandidate::builder("Lab Reports", SourceMethod::Table)
            .due(DueInfo::Rule {
                text: "24 hours after lab".to_string(),
                anchor: Some("lab".to_string()),
            })
            .build();
        let task = finalize(candidate);
        assert!(task.needs_review);
        assert!(task.is_unresolved());
        assert_eq!(task.rule_anchor.as_deref(), Some("lab"));
    }
}
