use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::course::TitleCandidate;
use crate::diagnostics::{CompletenessReport, RunStats};
use crate::export::Exporter;
use crate::pipeline::ExtractionReport;

const TITLE_CANDIDATES: usize = 5;

#[derive(Serialize)]
struct DiagnosticsFile<'a> {
    stats: &'a RunStats,
    completeness: &'a CompletenessReport,
    title_candidates: &'a [TitleCandidate],
}

#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, report: &ExtractionReport) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;

        let data = serde_json::to_string_pretty(&report.data)?;
        fs::write(self.out_dir.join("course.json"), data)?;

        let candidates = &report.title_candidates;
        let diagnostics = DiagnosticsFile {
            stats: &report.stats,
            completeness: &report.completeness,
            title_candidates: &candidates[..candidates.len().min(TITLE_CANDIDATES)],
        };
        let data = serde_json::to_string_pretty(&diagnostics)?;
        fs::write(self.out_dir.join("diagnostics.json"), data)?;
        Ok(())
    }
}
