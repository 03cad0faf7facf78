use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;

use crate::assessment::AssessmentPipeline;
use crate::config::ExtractionTuning;
use crate::core::course::{AssessmentTask, CourseTerm, ExtractedCourseData, SectionOption};
use crate::core::document::DocumentStructure;
use crate::course::{extract_profile, TitleCandidate};
use crate::diagnostics::{CompletenessReport, RunStats};
use crate::error::{ExtractionError, Result};
use crate::export::json_export::JsonExporter;
use crate::export::text_export::TextExporter;
use crate::export::Exporter;
use crate::parser::{ingestor_for, RawLayout};
use crate::resolver::resolve_rules;
use crate::structure::build_structure;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub tuning: ExtractionTuning,
    pub resolve_deadlines: bool,
}

impl PipelineConfig {
    pub fn new(input: PathBuf, output: PathBuf, tuning: ExtractionTuning) -> Self {
        Self {
            input,
            output,
            tuning,
            resolve_deadlines: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub data: ExtractedCourseData,
    pub stats: RunStats,
    pub completeness: CompletenessReport,
    pub title_candidates: Vec<TitleCandidate>,
}

fn ingest(config: &PipelineConfig) -> Result<RawLayout> {
    config.tuning.validate()?;
    ingestor_for(&config.input, config.tuning.default_font_size).ingest(&config.input)
}

pub fn build_document(config: &PipelineConfig) -> Result<DocumentStructure> {
    let layout = ingest(config)?;
    Ok(build_structure(layout, &config.tuning))
}

pub fn extract_course(config: &PipelineConfig) -> Result<ExtractionReport> {
    let layout = ingest(config)?;
    Ok(extract_from_layout(
        layout,
        &config.tuning,
        config.resolve_deadlines,
    ))
}

pub fn extract_from_layout(
    layout: RawLayout,
    tuning: &ExtractionTuning,
    resolve_deadlines: bool,
) -> ExtractionReport {
    let doc = build_structure(layout, tuning);
    analyze_document(&doc, tuning, resolve_deadlines)
}

pub fn analyze_document(
    doc: &DocumentStructure,
    tuning: &ExtractionTuning,
    resolve_deadlines: bool,
) -> ExtractionReport {
    let profile = extract_profile(doc, tuning);
    let outcome = AssessmentPipeline::new(doc, profile.term.as_ref(), tuning).run();
    let stats = RunStats::collect(doc, &outcome);

    let sections: Vec<SectionOption> = profile
        .lecture_sections
        .iter()
        .chain(&profile.lab_sections)
        .cloned()
        .collect();
    let assessments = if resolve_deadlines {
        resolve_rules(outcome.tasks, profile.term.as_ref(), &sections)
    } else {
        outcome.tasks
    };

    let data = ExtractedCourseData {
        term: profile.term,
        lecture_sections: profile.lecture_sections,
        lab_sections: profile.lab_sections,
        assessments,
        course_code: profile.identity.code.map(|c| c.code),
        course_name: profile.identity.title,
    };
    let completeness = CompletenessReport::assess(&data);
    info!(
        assessments = data.assessments.len(),
        total_weight = completeness.total_weight,
        completeness = completeness.overall_completeness,
        "extraction finished"
    );

    ExtractionReport {
        data,
        stats,
        completeness,
        title_candidates: profile.identity.candidates,
    }
}

pub fn export_report(report: &ExtractionReport, output: &Path) -> anyhow::Result<()> {
    let json_exporter = JsonExporter::new(output.to_path_buf());
    json_exporter.export(report)?;

    let text_exporter = TextExporter::new(output.to_path_buf());
    text_exporter.export(report)?;

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| ExtractionError::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn resolve_from_files(
    tasks: &Path,
    term: Option<&Path>,
    sections: &Path,
) -> Result<Vec<AssessmentTask>> {
    let tasks: Vec<AssessmentTask> = read_json(tasks)?;
    let term = term.map(read_json::<CourseTerm>).transpose()?;
    let sections: Vec<SectionOption> = read_json(sections)?;
    Ok(resolve_rules(tasks, term.as_ref(), &sections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::core::geometry::BBox;
    use crate::core::model::{PageInfo, TextFragment};
    use crate::parser::RawPage;

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

    fn single_line_layout(text: &str) -> RawLayout {
        RawLayout {
            pages: vec![RawPage {
                info: PageInfo {
                    page_idx: 0,
                    width: 612.0,
                    height: 792.0,
                },
                fragments: vec![TextFragment {
                    text: text.to_string(),
                    page_idx: 0,
                    bbox: BBox::new(72.0, 100.0, 300.0, 112.0),
                    font_size: 12.0,
                    bold: false,
                    font_name: String::new(),
                }],
                tables: Vec::new(),
            }],
        }
    }

    #[test]
    fn missing_input_is_fatal() {
        let config = PipelineConfig::new(
            PathBuf::from("/nonexistent/outline.json"),
            temp_output_dir("coursestruct-missing"),
            ExtractionTuning::default(),
        );
        assert!(matches!(
            extract_course(&config),
            Err(ExtractionError::Io { .. })
        ));
    }

    #[test]
    fn export_report_writes_outputs() -> anyhow::Result<()> {
        let output = temp_output_dir("coursestruct-pipeline");
        let report = extract_from_layout(
            single_line_layout("Final Exam 100%"),
            &ExtractionTuning::default(),
            true,
        );
        assert_eq!(report.data.assessments.len(), 1);

        export_report(&report, &output)?;

        assert!(output.join("course.json").exists());
        assert!(output.join("diagnostics.json").exists());
        let text = fs::read_to_string(output.join("report.txt"))?;
        assert!(text.contains("Final Exam"));

        let _ = fs::remove_dir_all(&output);
        Ok(())
    }
}
