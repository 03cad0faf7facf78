use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::ExtractionTuning;
use crate::core::document::{mean_font_size, DocumentStructure};
use crate::core::model::Line;

static RE_COURSE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]{2,5})\s*[\-/]?\s*(\d{3,4}[A-Z]?(?:/[A-Z])?)\b")
        .expect("valid course code regex")
});

static RE_LETTER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]{3}").expect("valid letter run regex"));

static RE_ALLOWED_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z\s\-:&,'"()]+$"#).expect("valid title charset regex")
});

const STOP_KEYWORDS: &[&str] = &[
    "course outline",
    "syllabus",
    "faculty of",
    "department of",
    "university",
    "western",
    "school of",
    "course information",
    "fall 2",
    "winter 2",
    "summer 2",
    "academic year",
    "www.",
    "http",
    "@",
    "email",
    "phone",
    "office hours",
    "instructor",
    "professor",
    "dr.",
    "outline",
    "calendar",
    "department",
    "faculty",
    "engineering",
    "sciences",
    "science",
    "arts",
    "humanities",
    "london",
    "ontario",
    "canada",
    "academic",
    "information",
    "acknowledgment",
    "acknowledgement",
];

const GENERIC_WORDS: &[&str] = &[
    "department",
    "faculty",
    "engineering",
    "sciences",
    "science",
    "academic",
    "information",
    "arts",
    "humanities",
    "medicine",
];

const TITLE_KEYWORDS: &[&str] = &[
    "introduction",
    "methods",
    "analysis",
    "theory",
    "principles",
    "fundamentals",
    "advanced",
    "applied",
    "computational",
    "organic",
    "inorganic",
    "biochemistry",
    "physiology",
    "anatomy",
    "calculus",
    "algebra",
    "statistics",
    "programming",
    "systems",
    "design",
];

const MIN_TITLE_CHARS: usize = 8;
const MAX_TITLE_CHARS: usize = 120;
const FALLBACK_PAGE_HEIGHT: f32 = 800.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseCode {
    pub code: String,
    pub page_idx: usize,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleCandidate {
    pub text: String,
    pub page_idx: usize,
    pub y: f32,
    pub font_size: f32,
    pub bold: bool,
    pub near_code: bool,
    pub in_top_third: bool,
    pub score: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseIdentity {
    pub code: Option<CourseCode>,
    pub title: Option<String>,
    pub candidates: Vec<TitleCandidate>,
}

pub fn find_course_code(doc: &DocumentStructure) -> Option<CourseCode> {
    doc.lines_on_page(0).find_map(|line| {
        let text = line.text();
        let caps = RE_COURSE_CODE.captures(&text)?;
        Some(CourseCode {
            code: format!("{} {}", &caps[1], &caps[2]),
            page_idx: line.page_idx,
            y: line.anchor_y,
        })
    })
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn score_title(
    text: &str,
    font_size: f32,
    bold: bool,
    near_code: bool,
    in_top_third: bool,
    page_mean_font: f32,
) -> f32 {
    let lower = text.to_lowercase();
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut score = 0.0_f32;

    if contains_any(&lower, STOP_KEYWORDS) {
        score -= 0.8;
    }
    if words.len() == 1 && GENERIC_WORDS.contains(&lower.trim()) {
        score -= 1.0;
    }

    if font_size > page_mean_font * 1.3 {
        score += 0.3;
    } else if font_size > page_mean_font * 1.1 {
        score += 0.15;
    }
    if bold {
        score += 0.15;
    }
    if near_code {
        score += 0.25;
    }
    if in_top_third {
        score += 0.15;
    }
    if RE_ALLOWED_CHARS.is_match(text) {
        score += 0.1;
    }
    let length = text.chars().count();
    if (MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&length) {
        score += 0.1;
    }
    if words.len() >= 2 && text.chars().next().is_some_and(char::is_uppercase) {
        score += 0.1;
    }
    if contains_any(&lower, TITLE_KEYWORDS) {
        score += 0.25;
    }

    if words.len() > 12 || text.ends_with('.') {
        score -= 0.2;
    }
    if text == text.to_uppercase() && words.len() <= 2 {
        score -= 0.15;
    }

    score
}

pub fn rank_title_candidates(
    doc: &DocumentStructure,
    code: Option<&CourseCode>,
    tuning: &ExtractionTuning,
) -> Vec<TitleCandidate> {
    let Some(page_mean) = mean_font_size(doc.fragments_on_page(0)) else {
        return Vec::new();
    };
    let page_height = doc
        .page(0)
        .map(|p| p.height)
        .filter(|h| *h > 0.0)
        .unwrap_or(FALLBACK_PAGE_HEIGHT);
    let top_third = page_height / 3.0;

    let mut candidates: Vec<TitleCandidate> = doc
        .lines_on_page(0)
        .filter_map(|line: &Line| {
            let text = line.text();
            let length = text.chars().count();
            if !(MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&length)
                || !RE_LETTER_RUN.is_match(&text)
            {
                return None;
            }
            let near_code = code.is_some_and(|c| {
                c.page_idx == line.page_idx
                    && (line.anchor_y - c.y).abs() < tuning.code_anchor_distance
            });
            let in_top_third = line.anchor_y < top_third;
            let font_size = line.max_font_size();
            let bold = line.has_bold();
            let score = score_title(&text, font_size, bold, near_code, in_top_third, page_mean);
            Some(TitleCandidate {
                text,
                page_idx: line.page_idx,
                y: line.anchor_y,
                font_size,
                bold,
                near_code,
                in_top_third,
                score,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}

pub fn extract_identity(doc: &DocumentStructure, tuning: &ExtractionTuning) -> CourseIdentity {
    let code = find_course_code(doc);
    let candidates = rank_title_candidates(doc, code.as_ref(), tuning);
    let title = candidates
        .first()
        .filter(|best| best.score >= tuning.title_min_score)
        .map(|best| best.text.clone());

    match (&code, &title) {
        (Some(code), Some(title)) => debug!("course {} \"{}\"", code.code, title),
        (code, None) => debug!(
            "no title above {} (code {:?})",
            tuning.title_min_score,
            code.as_ref().map(|c| c.code.as_str())
        ),
        (None, Some(title)) => debug!("title \"{}\" without course code", title),
    }

    CourseIdentity {
        code,
        title,
        candidates,
    }
}
