use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::core::course::CourseTerm;

const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const RELATIVE_KEYWORDS: &[&str] = &[
    "after",
    "before",
    "following",
    "hrs",
    "hours",
    "days",
    "week",
];

static RE_ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid iso date regex")
});

static RE_NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid numeric date regex")
});

static RE_MONTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4}))?",
    )
    .expect("valid month date regex")
});

static RE_CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(a\.?m\.?|p\.?m\.?)").expect("valid clock regex")
});

pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim_end_matches('.').to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    if lower == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|month| month.starts_with(lower.as_str()))
        .map(|idx| idx as u32 + 1)
}

pub fn is_relative_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    RELATIVE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

pub fn apply_meridiem(hour: u32, meridiem: Option<&str>) -> u32 {
    let pm = meridiem.map(|m| m.to_lowercase().starts_with('p'));
    match pm {
        Some(true) if hour < 12 => hour + 12,
        Some(false) if hour == 12 => 0,
        _ => hour,
    }
}

pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    let caps = RE_CLOCK.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
    if hour == 0 || hour > 12 {
        return None;
    }
    NaiveTime::from_hms_opt(apply_meridiem(hour, caps.get(3).map(|m| m.as_str())), minute, 0)
}

fn year_within_term(month: u32, day: u32, term: &CourseTerm) -> Option<i32> {
    let years = [term.start_date.year(), term.end_date.year()];
    years
        .iter()
        .copied()
        .find(|year| {
            NaiveDate::from_ymd_opt(*year, month, day)
                .is_some_and(|d| d >= term.start_date && d <= term.end_date)
        })
        .or_else(|| {
            NaiveDate::from_ymd_opt(years[0], month, day).map(|_| years[0])
        })
}

pub fn parse_date(text: &str, term: Option<&CourseTerm>) -> Option<NaiveDate> {
    if let Some(caps) = RE_ISO_DATE.captures(text) {
        return NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
    }
    if let Some(caps) = RE_NUMERIC_DATE.captures(text) {
        return NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
        );
    }

    let caps = RE_MONTH_DATE.captures(text)?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year = match caps.get(3) {
        Some(year) => year.as_str().parse().ok()?,
        None => year_within_term(month, day, term?)?,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn parse_due_datetime(
    text: &str,
    term: Option<&CourseTerm>,
    default_time: NaiveTime,
) -> Option<NaiveDateTime> {
    let date = parse_date(text, term)?;
    let time = parse_clock(text).unwrap_or(default_time);
    Some(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winter() -> CourseTerm {
        CourseTerm {
            name: "Winter 2026".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
            timezone: "America/Toronto".to_string(),
        }
    }

    fn fall_spanning() -> CourseTerm {
        CourseTerm {
            name: "Fall 2025".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            timezone: "America/Toronto".to_string(),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_cell_formats() {
        let term = winter();
        assert_eq!(parse_date("Feb 12", Some(&term)), Some(ymd(2026, 2, 12)));
        assert_eq!(parse_date("Fri, Mar 6th", Some(&term)), Some(ymd(2026, 3, 6)));
        assert_eq!(parse_date("October 15, 2025", None), Some(ymd(2025, 10, 15)));
        assert_eq!(parse_date("2025-10-15", None), Some(ymd(2025, 10, 15)));
        assert_eq!(parse_date("10/15/2025", None), Some(ymd(2025, 10, 15)));
        assert_eq!(parse_date("Sept. 9", Some(&fall_spanning())), Some(ymd(2025, 9, 9)));
    }

    #[test]
    fn year_follows_term_window() {
        assert_eq!(parse_date("Jan 10", Some(&fall_spanning())), Some(ymd(2026, 1, 10)));
        assert_eq!(parse_date("Oct 15", None), None);
        assert_eq!(parse_date("TBA", Some(&winter())), None);
    }

    #[test]
    fn explicit_clock_overrides_default() {
        let default = NaiveTime::from_hms_opt(23, 59, 0).unwrap();
        let due = parse_due_datetime("Mar 3, 2026 at 2:30 pm", None, default).unwrap();
        assert_eq!(due.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        let due = parse_due_datetime("Mar 3, 2026", None, default).unwrap();
        assert_eq!(due.time(), default);
        assert_eq!(
            parse_clock("12 am"),
            NaiveTime::from_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn relative_cells_are_detected() {
        assert!(is_relative_phrase("24 hours after lab"));
        assert!(is_relative_phrase("One week following the tutorial"));
        assert!(!is_relative_phrase("Oct 15"));
        assert!(!is_relative_phrase("Friday, Oct 17"));
        assert_eq!(month_number("Sept"), Some(9));
        assert_eq!(month_number("may"), Some(5));
        assert_eq!(month_number("Ma"), None);
    }
}
