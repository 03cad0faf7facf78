use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::course::{AssessmentTask, SectionOption};
use crate::export::Exporter;
use crate::pipeline::ExtractionReport;

#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

fn or_missing(value: Option<&str>) -> &str {
    value.unwrap_or("(not found)")
}

fn format_section(section: &SectionOption) -> String {
    const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let days: Vec<&str> = section
        .weekdays
        .iter()
        .filter_map(|d| DAYS.get(*d as usize).copied())
        .collect();
    let mut line = format!(
        "{} {}: {} {}-{}",
        section.meeting_type.label(),
        section.id,
        days.join("/"),
        section.start_time.format("%H:%M"),
        section.end_time.format("%H:%M")
    );
    if let Some(location) = &section.location {
        line.push_str(&format!(" ({location})"));
    }
    line
}

fn format_task(task: &AssessmentTask) -> String {
    let weight = task
        .weight
        .map(|w| w.to_string())
        .unwrap_or_else(|| "?".to_string());
    let due = match (&task.due_datetime, &task.due_rule) {
        (Some(at), _) => at.format("%Y-%m-%d %H:%M").to_string(),
        (None, Some(rule)) => format!("rule: {rule}"),
        (None, None) => "no due date".to_string(),
    };
    let flag = if task.needs_review { " [review]" } else { "" };
    format!(
        "{:<32} {:>7}  {:<28} conf {:.2}{}",
        task.title, weight, due, task.confidence, flag
    )
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    pub fn render(report: &ExtractionReport) -> String {
        let data = &report.data;
        let stats = &report.stats;
        let completeness = &report.completeness;
        let mut out = String::new();

        let _ = writeln!(out, "Course code: {}", or_missing(data.course_code.as_deref()));
        let _ = writeln!(out, "Course name: {}", or_missing(data.course_name.as_deref()));
        match &data.term {
            Some(term) => {
                let _ = writeln!(
                    out,
                    "Term:        {} ({} to {})",
                    term.name, term.start_date, term.end_date
                );
            }
            None => {
                let _ = writeln!(out, "Term:        (not found)");
            }
        }

        out.push_str("\n=== Sections ===\n");
        for section in data.lecture_sections.iter().chain(&data.lab_sections) {
            let _ = writeln!(out, "{}", format_section(section));
        }

        out.push_str("\n=== Assessments ===\n");
        for task in &data.assessments {
            let _ = writeln!(out, "{}", format_task(task));
        }
        let _ = writeln!(out, "Total weight: {:.1}%", completeness.total_weight);
        if stats.under_extracted {
            let _ = writeln!(
                out,
                "Warning: selected weight {:.1}% is under the expected total; items may be missing",
                stats.total_selected_weight
            );
        }

        out.push_str("\n=== Diagnostics ===\n");
        let _ = writeln!(
            out,
            "pages {}, lines {}, tables {}, sections {}",
            stats.page_count,
            stats.line_count,
            stats.table_count(),
            stats.section_count
        );
        let _ = writeln!(
            out,
            "strategy {} (structural {:.2}, fallback {:.2})",
            stats.strategy, stats.structural_fitness, stats.fallback_fitness
        );
        for rejected in &stats.rejected {
            let _ = writeln!(
                out,
                "rejected \"{}\": {}",
                rejected.title,
                rejected.rejection.as_deref().unwrap_or("-")
            );
        }
        let _ = writeln!(
            out,
            "completeness {:.0}%, {} of {} assessments need review",
            completeness.overall_completeness,
            completeness.needs_review,
            completeness.assessment_count
        );
        out
    }
}

impl Exporter for TextExporter {
    fn export(&self, report: &ExtractionReport) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join("report.txt"), Self::render(report))?;
        Ok(())
    }
}
