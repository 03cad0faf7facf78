use std::sync::LazyLock;

use regex::{Regex, RegexSet};
use tracing::debug;

use crate::assessment::candidate::AssessmentCandidate;

const POLICY_TERMS: &[&str] = &[
    "passing",
    "pass",
    "minimum",
    "eligible",
    "eligibility",
    "must",
    "achieve",
    "obtain",
    "requirement",
    "required",
    "weighted",
    "average",
    "threshold",
    "fail",
    "reweighted",
    "hurdle",
    "grade",
    "grading",
    "least",
    "need",
    "needs",
];

const POLICY_STARTERS: &[&str] = &[
    "to be",
    "to obtain",
    "to pass",
    "must",
    "should",
    "will be",
    "students",
    "you must",
    "a minimum",
    "the minimum",
    "minimum",
    "at least",
    "achieve",
    "eligible",
];

static POLICY_PHRASES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"to\s+(?:be\s+)?eligible",
        r"to\s+obtain",
        r"to\s+pass",
        r"must\s+achieve",
        r"must\s+obtain",
        r"must\s+have",
        r"passing\s+grade",
        r"minimum\s+(?:grade|mark|score)",
        r"weighted\s+average",
        r"at\s+least",
        r"will\s+be\s+reweighted",
        r"result\s+in",
        r"a\s+(?:grade|mark)\s+of",
    ])
    .expect("valid policy phrases")
});

static SENTENCE_TITLES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"\b(?:is|are|was|were|will|shall|should|must|may|can)\b.*\b(?:be|have|get|receive)\b",
        r"\bto\s+(?:be|have|get|receive|pass|obtain|achieve)\b",
    ])
    .expect("valid sentence title patterns")
});

static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?\s*%").expect("valid percent regex"));

/// Rejects grading-policy prose that a generator mistook for a graded item.
#[derive(Debug, Clone)]
pub struct PolicyFilter {
    window: usize,
}

fn bare_token(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

impl PolicyFilter {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn is_policy_context(&self, evidence: &str) -> bool {
        let lower = evidence.to_lowercase();
        let Some(percent) = PERCENT.find(&lower) else {
            return false;
        };

        let tokens: Vec<&str> = lower.split_whitespace().collect();
        // Index of the token holding the percentage
        let mut offset = 0;
        let mut center = tokens.len().saturating_sub(1);
        for (idx, token) in tokens.iter().enumerate() {
            let Some(found) = lower[offset..].find(token) else {
                break;
            };
            let end = offset + found + token.len();
            if end > percent.start() {
                center = idx;
                break;
            }
            offset = end;
        }

        let start = center.saturating_sub(self.window);
        let end = (center + self.window + 1).min(tokens.len());
        let window = &tokens[start..end];

        if window
            .iter()
            .map(|t| bare_token(t))
            .any(|t| POLICY_TERMS.contains(&t))
        {
            return true;
        }
        POLICY_PHRASES.is_match(&window.join(" "))
    }

    pub fn title_rejection(&self, title: &str) -> Option<String> {
        let lower = title.trim().to_lowercase();
        if let Some(starter) = POLICY_STARTERS.iter().find(|s| lower.starts_with(*s)) {
            return Some(format!("title starts with policy word: {starter}"));
        }
        if SENTENCE_TITLES.is_match(&lower) {
            return Some("title is sentence-like".to_string());
        }
        None
    }

    pub fn apply(
        &self,
        candidates: Vec<AssessmentCandidate>,
    ) -> (Vec<AssessmentCandidate>, Vec<AssessmentCandidate>) {
        let mut kept = Vec::with_capacity(candidates.len());
        let mut rejected = Vec::new();
        for mut candidate in candidates {
            let reason = if self.is_policy_context(&candidate.payload().evidence) {
                Some("policy context around percentage".to_string())
            } else {
                self.title_rejection(candidate.title())
            };
            match reason {
                Some(reason) => {
                    debug!("rejected \"{}\": {}", candidate.title(), reason);
                    candidate.reject(reason);
                    rejected.push(candidate);
                }
                None => kept.push(candidate),
            }
        }
        (kept, rejected)
    }
}
