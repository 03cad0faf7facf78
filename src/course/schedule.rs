use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::{Captures, Regex};
use tracing::debug;

use crate::core::course::{MeetingType, SectionOption};
use crate::core::document::DocumentStructure;
use crate::course::dates::apply_meridiem;

const SCHEDULE_PAGES: usize = 5;

const DAY_TOKEN: &str = r"(?:(?i:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?|(?-i:Th|Tu|Su|[MTWRFSU]))";

const TIME_TAIL: &str = r"\s+(?P<sh>\d{1,2})(?::(?P<smin>\d{2}))?\s*(?P<sm>(?i:am|pm))?\s*(?:-|(?i:to))\s*(?P<eh>\d{1,2})(?::(?P<emin>\d{2}))?\s*(?P<em>(?i:am|pm))?(?:\s*(?:,|(?i:in)|@|(?i:at))?\s*(?P<loc>(?i:room|rm\.?)\s+[\w\-]+|[A-Z]{2,5}\s*-?\s*\d{2,4}[A-Z]?))?";

fn meeting_regex(keywords: &str) -> Regex {
    let pattern = format!(
        r"\b(?i:{keywords})\b\s*(?P<id>\d{{3}})?\s*:?\s*(?P<days>{day}(?:\s*[/,&]?\s*{day})*){tail}",
        day = DAY_TOKEN,
        tail = TIME_TAIL,
    );
    Regex::new(&pattern).expect("valid meeting regex")
}

static RE_LECTURE: LazyLock<Regex> = LazyLock::new(|| meeting_regex("lectures?|lec|class(?:es)?"));

static RE_LAB: LazyLock<Regex> =
    LazyLock::new(|| meeting_regex("labs?|laboratory|laboratories|tutorials?|tut"));

fn named_day(token: &str) -> Option<u8> {
    const NAMES: &[&str] = &[
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ];
    let lower = token.trim_end_matches('.').to_lowercase();
    match lower.as_str() {
        "th" => return Some(3),
        "tu" => return Some(1),
        "su" => return Some(6),
        _ => {}
    }
    if lower.len() < 3 {
        return None;
    }
    if lower == "tues" || lower == "thur" || lower == "thurs" {
        return Some(if lower.starts_with("tu") { 1 } else { 3 });
    }
    NAMES
        .iter()
        .position(|name| name.starts_with(lower.as_str()))
        .map(|idx| idx as u8)
}

fn compact_days(token: &str) -> Option<Vec<u8>> {
    let chars: Vec<char> = token.chars().collect();
    let mut days = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let next = chars.get(i + 1).map(|c| c.to_ascii_lowercase());
        let day = match chars[i] {
            'M' => 0,
            'T' if next == Some('h') => {
                i += 1;
                3
            }
            'T' if next == Some('u') => {
                i += 1;
                1
            }
            'T' => 1,
            'W' => 2,
            'R' => 3,
            'F' => 4,
            'S' if next == Some('u') => {
                i += 1;
                6
            }
            'S' => 5,
            'U' => 6,
            _ => return None,
        };
        days.push(day);
        i += 1;
    }
    Some(days)
}

pub fn parse_weekdays(text: &str) -> BTreeSet<u8> {
    let mut days = BTreeSet::new();
    for token in text
        .split(|c: char| c == '/' || c == ',' || c == '&' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if let Some(day) = named_day(token) {
            days.insert(day);
        } else if let Some(run) = compact_days(token) {
            days.extend(run);
        }
    }
    days
}

fn clock(hour: &str, minute: Option<&str>, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.map_or(Some(0), |m| m.parse().ok())?;
    NaiveTime::from_hms_opt(apply_meridiem(hour, meridiem), minute, 0)
}

fn group<'h>(caps: &Captures<'h>, name: &str) -> Option<&'h str> {
    caps.name(name).map(|m| m.as_str())
}

fn time_range(caps: &Captures) -> Option<(NaiveTime, NaiveTime)> {
    let text = |name| group(caps, name);
    let end = clock(text("eh")?, text("emin"), text("em"))?;
    let start_meridiem = text("sm");
    let start = match start_meridiem {
        Some(_) => clock(text("sh")?, text("smin"), start_meridiem)?,
        None => {
            let inherited = clock(text("sh")?, text("smin"), text("em"))?;
            if inherited <= end {
                inherited
            } else {
                clock(text("sh")?, text("smin"), None)?
            }
        }
    };
    Some((start, end))
}

fn section_from(caps: &Captures, meeting_type: MeetingType, ordinal: usize) -> Option<SectionOption> {
    let weekdays = parse_weekdays(caps.name("days")?.as_str());
    if weekdays.is_empty() {
        return None;
    }
    let (start_time, end_time) = time_range(caps)?;
    let id = caps
        .name("id")
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| format!("{:03}", ordinal));
    Some(SectionOption {
        meeting_type,
        id,
        weekdays,
        start_time,
        end_time,
        location: caps.name("loc").map(|m| m.as_str().trim().to_string()),
        date_range: None,
    })
}

fn same_slot(a: &SectionOption, b: &SectionOption) -> bool {
    a.weekdays == b.weekdays && a.start_time == b.start_time && a.end_time == b.end_time
}

fn extract_meetings(
    doc: &DocumentStructure,
    regex: &Regex,
    meeting_type: MeetingType,
) -> Vec<SectionOption> {
    let mut sections: Vec<SectionOption> = Vec::new();
    for line in doc.lines.iter().filter(|l| l.page_idx < SCHEDULE_PAGES) {
        let text = line.text();
        for caps in regex.captures_iter(&text) {
            match section_from(&caps, meeting_type, sections.len() + 1) {
                Some(section) if !sections.iter().any(|s| same_slot(s, &section)) => {
                    sections.push(section)
                }
                Some(_) => {}
                None => debug!("unreadable {} schedule: {}", meeting_type.label(), &caps[0]),
            }
        }
    }
    sections
}

pub fn extract_lecture_sections(doc: &DocumentStructure) -> Vec<SectionOption> {
    extract_meetings(doc, &RE_LECTURE, MeetingType::Lecture)
}

pub fn extract_lab_sections(doc: &DocumentStructure) -> Vec<SectionOption> {
    extract_meetings(doc, &RE_LAB, MeetingType::Lab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use crate::core::model::{Line, TextFragment};
    use pretty_assertions::assert_eq;

    fn days(list: &[u8]) -> BTreeSet<u8> {
        list.iter().copied().collect()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn doc_with(lines: &[&str]) -> DocumentStructure {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let y = 100.0 + 20.0 * i as f32;
                Line::new(
                    0,
                    y,
                    vec![TextFragment {
                        text: text.to_string(),
                        page_idx: 0,
                        bbox: BBox::new(72.0, y, 500.0, y + 10.0),
                        font_size: 10.0,
                        bold: false,
                        font_name: String::new(),
                    }],
                )
            })
            .collect();
        DocumentStructure {
            lines,
            ..DocumentStructure::default()
        }
    }

    #[test]
    fn parses_day_notations() {
        assert_eq!(parse_weekdays("MWF"), days(&[0, 2, 4]));
        assert_eq!(parse_weekdays("TTh"), days(&[1, 3]));
        assert_eq!(parse_weekdays("TR"), days(&[1, 3]));
        assert_eq!(parse_weekdays("Mon/Wed"), days(&[0, 2]));
        assert_eq!(parse_weekdays("Tuesday, Thursday"), days(&[1, 3]));
        assert_eq!(parse_weekdays("Thurs."), days(&[3]));
        assert!(parse_weekdays("xyz").is_empty());
    }

    #[test]
    fn extracts_lecture_and_lab_lines() {
        let doc = doc_with(&[
            "Lecture 001: MWF 9:30-10:20 in UC 202",
            "Lectures Tue/Thu 1:30 - 2:50 pm",
            "Lab 002 W 2:30-5:30 pm Room MC-105",
            "Tutorial: Friday 11:30 - 12:20 pm",
        ]);
        let lectures = extract_lecture_sections(&doc);
        assert_eq!(lectures.len(), 2);
        assert_eq!(lectures[0].id, "001");
        assert_eq!(lectures[0].weekdays, days(&[0, 2, 4]));
        assert_eq!(lectures[0].start_time, time(9, 30));
        assert_eq!(lectures[0].location.as_deref(), Some("UC 202"));
        assert_eq!(lectures[1].weekdays, days(&[1, 3]));
        assert_eq!(lectures[1].start_time, time(13, 30));
        assert_eq!(lectures[1].end_time, time(14, 50));

        let labs = extract_lab_sections(&doc);
        assert_eq!(labs.len(), 2);
        assert_eq!(labs[0].id, "002");
        assert_eq!(labs[0].weekdays, days(&[2]));
        assert_eq!(labs[0].start_time, time(14, 30));
        assert_eq!(labs[0].location.as_deref(), Some("Room MC-105"));
        assert_eq!(labs[1].start_time, time(11, 30));
        assert_eq!(labs[1].end_time, time(12, 20));
        assert!(labs.iter().all(|s| s.meeting_type == MeetingType::Lab));
    }

    #[test]
    fn duplicate_slots_collapse() {
        let doc = doc_with(&["Lecture MWF 9:30-10:20", "Class MWF 9:30-10:20"]);
        assert_eq!(extract_lecture_sections(&doc).len(), 1);
    }
}
