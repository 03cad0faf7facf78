use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use tracing::debug;

use crate::core::course::CourseTerm;
use crate::course::dates::month_number;

static RE_SEASON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(fall|winter|summer)\s+(?:(?:term|semester)\s+)?(\d{4})\b")
        .expect("valid season regex")
});

static RE_MONTH_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2})\s*(?:-|to)\s*(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2}),?\s+(\d{4})",
    )
    .expect("valid month range regex")
});

static RE_ISO_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})-(\d{2})-(\d{2})\s*(?:-|to)\s*(\d{4})-(\d{2})-(\d{2})")
        .expect("valid iso range regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Fall,
    Winter,
    Summer,
}

impl Season {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "fall" => Some(Season::Fall),
            "winter" => Some(Season::Winter),
            "summer" => Some(Season::Summer),
            _ => None,
        }
    }

    fn from_month(month: u32) -> Self {
        match month {
            1..=4 => Season::Winter,
            5..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::Fall => "Fall",
            Season::Winter => "Winter",
            Season::Summer => "Summer",
        }
    }

    pub fn window(&self, year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let (start, end) = match self {
            Season::Fall => ((9, 1), (12, 15)),
            Season::Winter => ((1, 8), (4, 30)),
            Season::Summer => ((5, 1), (8, 31)),
        };
        Some((
            NaiveDate::from_ymd_opt(year, start.0, start.1)?,
            NaiveDate::from_ymd_opt(year, end.0, end.1)?,
        ))
    }
}

fn explicit_range(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    if let Some(caps) = RE_MONTH_RANGE.captures(text) {
        let start_month = month_number(&caps[1])?;
        let end_month = month_number(&caps[3])?;
        let end_year: i32 = caps[5].parse().ok()?;
        // "September 8 - December 9, 2025" and "December 1 - January 20, 2026"
        let start_year = if start_month > end_month {
            end_year - 1
        } else {
            end_year
        };
        let start = NaiveDate::from_ymd_opt(start_year, start_month, caps[2].parse().ok()?)?;
        let end = NaiveDate::from_ymd_opt(end_year, end_month, caps[4].parse().ok()?)?;
        return (start < end).then_some((start, end));
    }

    let caps = RE_ISO_RANGE.captures(text)?;
    let field = |i: usize| caps[i].parse::<u32>().ok();
    let start = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, field(2)?, field(3)?)?;
    let end = NaiveDate::from_ymd_opt(caps[4].parse().ok()?, field(5)?, field(6)?)?;
    (start < end).then_some((start, end))
}

pub fn extract_term(text: &str, timezone: &str) -> Option<CourseTerm> {
    let season = RE_SEASON.captures(text).and_then(|caps| {
        let season = Season::parse(&caps[1])?;
        let year: i32 = caps[2].parse().ok()?;
        Some((season, year))
    });
    let range = explicit_range(text);

    let (name, start_date, end_date) = match (season, range) {
        (Some((season, year)), Some((start, end))) => {
            (format!("{} {}", season.label(), year), start, end)
        }
        (Some((season, year)), None) => {
            let (start, end) = season.window(year)?;
            (format!("{} {}", season.label(), year), start, end)
        }
        (None, Some((start, end))) => {
            let season = Season::from_month(start.month());
            (format!("{} {}", season.label(), start.year()), start, end)
        }
        (None, None) => {
            debug!("no term name or date range found");
            return None;
        }
    };

    Some(CourseTerm {
        name,
        start_date,
        end_date,
        timezone: timezone.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn infers_window_from_season() {
        let term = extract_term("CS 1026\nWINTER TERM 2026\nInstructor", "America/Toronto")
            .expect("season present");
        assert_eq!(term.name, "Winter 2026");
        assert_eq!(term.start_date, ymd(2026, 1, 8));
        assert_eq!(term.end_date, ymd(2026, 4, 30));
        assert_eq!(term.timezone, "America/Toronto");
    }

    #[test]
    fn explicit_range_overrides_window() {
        let text = "Fall Semester 2025\nClasses run September 4 - December 8, 2025";
        let term = extract_term(text, "UTC").expect("term present");
        assert_eq!(term.name, "Fall 2025");
        assert_eq!((term.start_date, term.end_date), (ymd(2025, 9, 4), ymd(2025, 12, 8)));

        let term = extract_term("Term: 2026-05-04 to 2026-08-14", "UTC").expect("iso range");
        assert_eq!(term.name, "Summer 2026");
        assert_eq!(term.end_date, ymd(2026, 8, 14));
    }

    #[test]
    fn nothing_found_is_a_soft_miss() {
        assert!(extract_term("Course outline without dates", "UTC").is_none());
    }
}
