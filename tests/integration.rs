use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use pretty_assertions::assert_eq;

use coursestruct::assessment::{AssessmentCandidate, Selector, SourceMethod, Strategy};
use coursestruct::config::ExtractionTuning;
use coursestruct::core::course::{
    AssessmentTask, AssessmentType, CourseTerm, ExtractedCourseData, MeetingType, SectionOption,
    Weight,
};
use coursestruct::core::geometry::BBox;
use coursestruct::core::model::{Line, PageInfo, TextFragment};
use coursestruct::export::{Exporter, JsonExporter};
use coursestruct::parser::{RawLayout, RawPage, RawTable};
use coursestruct::pipeline::{extract_course, extract_from_layout, PipelineConfig};
use coursestruct::resolver::resolve_rules;
use coursestruct::structure::headings::HeadingDetector;

fn temp_output_dir(prefix: &str) -> PathBuf {
    let mut out = std::env::temp_dir();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let pid = std::process::id();
    out.push(format!("{prefix}-{pid}-{now}"));
    out
}

fn fragment(text: &str, y: f32, size: f32, bold: bool) -> TextFragment {
    TextFragment {
        text: text.to_string(),
        page_idx: 0,
        bbox: BBox::new(72.0, y, 72.0 + 7.0 * text.len() as f32, y + size),
        font_size: size,
        bold,
        font_name: String::new(),
    }
}

fn body(text: &str, y: f32) -> TextFragment {
    fragment(text, y, 10.0, false)
}

fn table(rows: &[&[&str]], y0: f32, y1: f32) -> RawTable {
    RawTable {
        cells: rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
        y0,
        y1,
    }
}

fn one_page(fragments: Vec<TextFragment>, tables: Vec<RawTable>) -> RawLayout {
    RawLayout {
        pages: vec![RawPage {
            info: PageInfo {
                page_idx: 0,
                width: 612.0,
                height: 792.0,
            },
            fragments,
            tables,
        }],
    }
}

fn native_table_outline() -> RawLayout {
    one_page(
        vec![
            fragment("CS 1026 Introduction to Computer Science", 40.0, 18.0, true),
            body("Fall 2025", 70.0),
            fragment("Evaluation", 300.0, 12.0, true),
        ],
        vec![table(
            &[
                &["Assessment", "Weight", "Due Date"],
                &["Midterm", "30%", "Oct 15"],
                &["Final Exam", "40%", "Dec 10"],
                &["Participation", "10%", "—"],
            ],
            320.0,
            400.0,
        )],
    )
}

/// Native table end-to-end: three items summing to 80% are kept as-is and
/// the run is reported as under-extracted.
#[test]
fn native_table_end_to_end() {
    let report = extract_from_layout(native_table_outline(), &ExtractionTuning::default(), true);
    let data = &report.data;

    let titles: Vec<&str> = data.assessments.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Midterm", "Final Exam", "Participation"]);
    assert!((data.total_weight() - 80.0).abs() < 1e-9);
    assert!(report.stats.under_extracted);
    assert_eq!(report.stats.strategy, Strategy::Structural);

    assert_eq!(data.course_code.as_deref(), Some("CS 1026"));
    assert_eq!(data.term.as_ref().map(|t| t.name.as_str()), Some("Fall 2025"));

    let midterm = &data.assessments[0];
    assert_eq!(midterm.kind, AssessmentType::Midterm);
    assert_eq!(
        midterm.due_datetime,
        NaiveDate::from_ymd_opt(2025, 10, 15).and_then(|d| d.and_hms_opt(23, 59, 0))
    );
    assert!(!midterm.needs_review);
    assert_eq!(data.assessments[1].kind, AssessmentType::FinalExam);

    let participation = &data.assessments[2];
    assert!(participation.due_datetime.is_none());
    assert!(participation.needs_review);
    assert!((report.completeness.weight_missing_percent - 20.0).abs() < 1e-9);
}

/// Grading-policy prose with a percentage is rejected and reported.
#[test]
fn policy_prose_is_rejected() {
    let layout = one_page(
        vec![
            fragment("Evaluation", 80.0, 12.0, true),
            body("Assignment 1: 15%", 100.0),
            body("Final exam eligibility requires a minimum of 50%", 120.0),
        ],
        Vec::new(),
    );
    let report = extract_from_layout(layout, &ExtractionTuning::default(), true);

    let titles: Vec<&str> = report
        .data
        .assessments
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Assignment 1"]);
    assert_eq!(report.stats.evaluation_section.as_deref(), Some("Evaluation"));

    let rejected = &report.stats.rejected;
    assert_eq!(rejected.len(), 1);
    assert!(rejected[0].title.starts_with("Final exam eligibility"));
    assert!(rejected[0].rejection.is_some());
}

/// A relative rule in a table cell expands into one dated task per lab.
#[test]
fn lab_rule_expands_per_meeting() {
    let layout = one_page(
        vec![
            fragment("BIOL 2290 Cell Biology Methods", 40.0, 18.0, true),
            body("Winter 2026", 70.0),
            body("Lab 002 W 2:00-5:00 pm", 100.0),
            fragment("Evaluation", 300.0, 12.0, true),
        ],
        vec![table(
            &[
                &["Assessment", "Weight", "Due Date"],
                &["Lab Reports", "20%", "24 hours after lab"],
                &["Midterm", "30%", "Feb 12"],
                &["Final Exam", "50%", "Apr 20"],
            ],
            320.0,
            400.0,
        )],
    );
    let report = extract_from_layout(layout, &ExtractionTuning::default(), true);
    let data = &report.data;
    assert_eq!(data.lab_sections.len(), 1);

    let labs: Vec<&AssessmentTask> = data
        .assessments
        .iter()
        .filter(|t| t.kind == AssessmentType::Lab)
        .collect();
    // Wednesdays from Jan 14 to Apr 29, 2026
    assert_eq!(labs.len(), 16);
    assert_eq!(labs[0].title, "Lab Reports 1");
    for task in &labs {
        let due = task.due_datetime.unwrap();
        assert_eq!(due.weekday(), Weekday::Thu);
        assert_eq!(due.time(), NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert!(task.needs_review);
    }
    assert_eq!(data.assessments.len(), 18);

    let unresolved = extract_from_layout(
        one_page(
            vec![body("Lab 002 W 2:00-5:00 pm", 100.0)],
            vec![table(
                &[&["Assessment", "Weight", "Due Date"], &["Lab Reports", "20%", "24 hours after lab"]],
                320.0,
                400.0,
            )],
        ),
        &ExtractionTuning::default(),
        false,
    );
    assert_eq!(unresolved.data.assessments.len(), 1);
    assert!(unresolved.data.assessments[0].is_unresolved());
}

/// An offset too large for a timestamp leaves the rule for review.
#[test]
fn oversized_rule_offset_is_left_for_review() {
    let layout = one_page(
        vec![
            body("Winter 2026", 70.0),
            body("Lab 002 W 2:00-5:00 pm", 100.0),
            fragment("Evaluation", 300.0, 12.0, true),
        ],
        vec![table(
            &[
                &["Assessment", "Weight", "Due Date"],
                &["Lab Reports", "20%", "due 100000000 weeks after lab"],
                &["Final Exam", "50%", "Apr 20"],
            ],
            320.0,
            400.0,
        )],
    );
    let report = extract_from_layout(layout, &ExtractionTuning::default(), true);
    let lab = report
        .data
        .assessments
        .iter()
        .find(|t| t.title == "Lab Reports")
        .expect("lab task kept");
    assert!(lab.due_datetime.is_none());
    assert!(lab.needs_review);
    assert_eq!(lab.due_rule.as_deref(), Some("due 100000000 weeks after lab"));
    assert_eq!(report.data.assessments.len(), 2);
}

#[test]
fn resolver_with_caller_supplied_schedule() {
    let term = CourseTerm {
        name: "Winter 2026".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(),
        timezone: "America/Toronto".to_string(),
    };
    let lab = SectionOption {
        meeting_type: MeetingType::Lab,
        id: "001".to_string(),
        weekdays: BTreeSet::from([2]),
        start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        location: None,
        date_range: None,
    };
    let task = AssessmentTask {
        title: "Prelab".to_string(),
        kind: AssessmentType::Lab,
        weight: Weight::new(10.0),
        due_datetime: None,
        due_rule: Some("24 hours after lab".to_string()),
        rule_anchor: Some("lab".to_string()),
        confidence: 0.85,
        evidence: "Prelab | 10% | 24 hours after lab".to_string(),
        needs_review: false,
    };

    let tasks = resolve_rules(vec![task], Some(&term), &[lab]);
    assert_eq!(tasks.len(), 13);
    assert!(tasks.iter().all(|t| t.needs_review));
    assert!(tasks
        .iter()
        .all(|t| t.due_datetime.map(|d| d.weekday()) == Some(Weekday::Thu)));
}

#[test]
fn heading_font_ratio_boundary() {
    let detector = HeadingDetector::new(Some(10.0), 1.2);
    let line_at = |size: f32| Line::new(0, 100.0, vec![fragment("plain words here", 100.0, size, false)]);
    assert!(detector.is_heading(&line_at(12.0)));
    assert!(!detector.is_heading(&line_at(11.9)));
}

fn candidate(title: &str, weight: f64) -> AssessmentCandidate {
    AssessmentCandidate::builder(title, SourceMethod::Inline)
        .weight(Weight::new(weight))
        .build()
}

#[test]
fn selector_identity_and_trim() {
    let selector = Selector::new(100.0, 10.0);

    let within = vec![
        candidate("Midterm", 30.0),
        candidate("Final Exam", 40.0),
        candidate("Assignments", 35.0),
    ];
    assert_eq!(selector.select(within.clone()), within);

    let over = vec![
        candidate("Quiz 1", 15.0),
        candidate("Final Exam", 50.0),
        candidate("Quiz 2", 15.0),
        candidate("Midterm", 40.0),
        candidate("Labs", 10.0),
    ];
    let selected = selector.select(over);
    let titles: Vec<&str> = selected.iter().map(|c| c.title()).collect();
    assert_eq!(titles, vec!["Final Exam", "Midterm", "Quiz 1"]);
    let total: f64 = selected.iter().map(|c| c.weight_value()).sum();
    assert!(total <= 110.0);
}

#[test]
fn json_export_round_trips() -> Result<()> {
    let output = temp_output_dir("coursestruct-export");
    let report = extract_from_layout(native_table_outline(), &ExtractionTuning::default(), true);

    JsonExporter::new(output.clone()).export(&report)?;

    let course: ExtractedCourseData =
        serde_json::from_str(&fs::read_to_string(output.join("course.json"))?)?;
    assert_eq!(course, report.data);

    let diagnostics: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join("diagnostics.json"))?)?;
    assert_eq!(diagnostics["stats"]["strategy"], "structural");
    assert_eq!(diagnostics["stats"]["under_extracted"], true);
    assert_eq!(diagnostics["completeness"]["assessment_count"], 3);

    let _ = fs::remove_dir_all(&output);
    Ok(())
}

#[test]
fn layout_dump_file_through_pipeline() -> Result<()> {
    let dir = temp_output_dir("coursestruct-dump");
    fs::create_dir_all(&dir)?;
    let input = dir.join("outline.json");
    fs::write(
        &input,
        r#"{"pages": [{
            "width": 612, "height": 792,
            "fragments": [
                {"text": "Grading", "x0": 72, "y0": 80, "x1": 130, "y1": 94, "font_name": "Helvetica-Bold"},
                {"text": "Assignments", "x0": 72, "y0": 100, "x1": 160, "y1": 110},
                {"text": "40%", "x0": 400, "y0": 101, "x1": 430, "y1": 111},
                {"text": "Final Exam", "x0": 72, "y0": 120, "x1": 150, "y1": 130},
                {"text": "60%", "x0": 400, "y0": 120, "x1": 430, "y1": 130}
            ]
        }]}"#,
    )?;

    let config = PipelineConfig::new(input, dir.join("out"), ExtractionTuning::default());
    let report = extract_course(&config)?;
    let titles: Vec<&str> = report
        .data
        .assessments
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Assignments", "Final Exam"]);
    assert_eq!(report.stats.reconstructed_table_count, 1);

    let _ = fs::remove_dir_all(&dir);
    Ok(())
}
