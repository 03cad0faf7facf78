//! Fixed word lists and title checks shared by the assessment stages.

use std::sync::LazyLock;

use regex::{Regex, RegexSet};

pub const ASSESSMENT_NOUNS: &[&str] = &[
    "exam",
    "examination",
    "midterm",
    "final",
    "test",
    "quiz",
    "assignment",
    "homework",
    "hw",
    "project",
    "lab",
    "laboratory",
    "participation",
    "attendance",
    "presentation",
    "essay",
    "report",
    "paper",
    "portfolio",
    "tutorial",
    "exercise",
    "practicum",
    "rotation",
    "clinical",
    "practical",
    "total",
];

pub const BONUS_INDICATORS: &[&str] = &["bonus", "extra credit", "extra-credit", "optional", "up to"];

pub const ASSESSMENT_TABLE_HEADERS: &[&str] = &[
    "assessment",
    "evaluation",
    "grading",
    "weight",
    "%",
    "grade",
    "component",
    "worth",
    "weighting",
];

pub const NAME_HEADERS: &[&str] = &["assessment", "component", "item", "task", "name", "activity"];
pub const WEIGHT_HEADERS: &[&str] = &["weight", "%", "worth", "value", "percentage"];

const SHORT_TITLE_WORDS: &[&str] = &[
    "exam",
    "midterm",
    "quiz",
    "test",
    "lab",
    "assignment",
    "participation",
    "research",
    "project",
    "final",
    "report",
];

static GARBAGE_TITLES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^[a-z]\.\s",
        r"^\d+\.\s*[a-z]",
        r"^(understand|design|apply|analyze|demonstrate|develop|explain)",
        r"^(course|academic|student|you|we|the|a|an)\s",
        r"^(not|need|must|should|will|may|can)",
        r"(submitted|request|consideration|accommodation)",
        r"^(office|room|email|phone|www\.|http)",
        r"^(january|february|march|april|may|june|july|august|september|october|november|december)\s*\d",
        r"^(mon|tue|wed|thu|fri|sat|sun)",
        r"reading\s*week",
        r"^(classes|exam\s*period)",
        r"^\d+%$",
    ])
    .expect("valid garbage title patterns")
});

static GARBAGE_FALLBACK_TITLES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^(the|a|an|to|for|of|in|on|at|by|with)\s",
        r"^(january|february|march|april|may|june|july|august|september|october|november|december)",
        r"^(monday|tuesday|wednesday|thursday|friday|saturday|sunday)",
        r"^(week|page|section|chapter)",
        r"^(past|will|can|may|must|should)",
        r"penalty|deadline|late|applied|consideration",
        r"^assessment",
    ])
    .expect("valid fallback garbage patterns")
});

static SUMMARY_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(total|course\s+total|grand\s+total|overall|sum)$").expect("valid summary regex")
});

static LEADING_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d.):\-]+\s*").expect("valid bullet regex"));

static SPECIAL_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\s\-():]").expect("valid special char regex"));

pub fn has_assessment_noun(title: &str) -> bool {
    let lower = title.to_lowercase();
    ASSESSMENT_NOUNS.iter().any(|noun| lower.contains(noun))
}

pub fn is_bonus(title: &str) -> bool {
    let lower = title.to_lowercase();
    BONUS_INDICATORS.iter().any(|word| lower.contains(word))
}

pub fn looks_like_title(title: &str) -> bool {
    title.split_whitespace().count() <= 10 && !title.trim_end().ends_with('.')
}

pub fn is_summary_row(title: &str) -> bool {
    SUMMARY_ROW.is_match(title.trim().to_lowercase().as_str())
}

pub fn clean_cell(cell: &str) -> String {
    let trimmed = cell.trim();
    let stripped = LEADING_BULLET.replace(trimmed, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_garbage_title(title: &str) -> bool {
    let lower = title.trim().to_lowercase();
    if GARBAGE_TITLES.is_match(&lower) {
        return true;
    }
    if title.chars().filter(|c| c.is_alphanumeric() || *c == '_').count() < 3 {
        return true;
    }
    if title == title.to_lowercase() && !has_assessment_noun(title) {
        return true;
    }
    let length = title.chars().count().max(1);
    let special = SPECIAL_CHAR.find_iter(title).count();
    special as f64 / length as f64 > 0.3
}

pub fn is_garbage_fallback_title(title: &str) -> bool {
    let lower = title.trim().to_lowercase();
    if GARBAGE_FALLBACK_TITLES.is_match(&lower) {
        return true;
    }
    title.chars().count() < 12 && !SHORT_TITLE_WORDS.iter().any(|word| lower.contains(word))
}
