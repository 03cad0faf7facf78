//! Candidate generation, filtering, scoring and selection of graded items.

pub mod candidate;
pub mod compare;
pub mod fallback;
pub mod finalize;
pub mod generator;
pub mod policy;
pub mod rules;
pub mod selector;
pub mod vocabulary;

pub use candidate::{AssessmentCandidate, DueInfo, SourceMethod};
pub use selector::{normalize_title, Selector, WeightBand};

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ExtractionTuning;
use crate::core::confidence::{score_confidence, strategy_fitness};
use crate::core::course::{AssessmentTask, CourseTerm};
use crate::core::document::DocumentStructure;

use generator::CandidateGenerator;
use policy::PolicyFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Structural,
    Fallback,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Structural => f.write_str("structural"),
            Strategy::Fallback => f.write_str("fallback"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub strategy: Strategy,
    pub selected: Vec<AssessmentCandidate>,
    pub rejected: Vec<AssessmentCandidate>,
    pub fitness: f32,
    pub band: WeightBand,
}

impl StrategyRun {
    pub fn total_weight(&self) -> f64 {
        self.selected.iter().map(AssessmentCandidate::weight_value).sum()
    }
}

#[derive(Debug, Clone)]
pub struct AssessmentOutcome {
    pub tasks: Vec<AssessmentTask>,
    pub strategy: Strategy,
    pub structural_fitness: f32,
    pub fallback_fitness: f32,
    pub selected: Vec<AssessmentCandidate>,
    pub rejected: Vec<AssessmentCandidate>,
    pub evaluation_heading: Option<String>,
    pub under_extracted: bool,
    pub text_rules_attached: usize,
}

pub struct AssessmentPipeline<'a> {
    doc: &'a DocumentStructure,
    term: Option<&'a CourseTerm>,
    tuning: &'a ExtractionTuning,
    policy: PolicyFilter,
    selector: Selector,
}

impl<'a> AssessmentPipeline<'a> {
    pub fn new(
        doc: &'a DocumentStructure,
        term: Option<&'a CourseTerm>,
        tuning: &'a ExtractionTuning,
    ) -> Self {
        Self {
            doc,
            term,
            tuning,
            policy: PolicyFilter::new(tuning.policy_window),
            selector: Selector::new(tuning.weight_target, tuning.weight_tolerance),
        }
    }

    pub fn refine(&self, strategy: Strategy, candidates: Vec<AssessmentCandidate>) -> StrategyRun {
        let generated = candidates.len();
        let (mut kept, rejected) = self.policy.apply(candidates);
        for candidate in &mut kept {
            candidate.set_score(score_confidence(&candidate.signals()));
        }

        let core_total: f64 = kept
            .iter()
            .filter(|c| !c.is_bonus())
            .map(AssessmentCandidate::weight_value)
            .sum();
        let band = self.selector.band(core_total);
        let selected = self.selector.select(kept);

        let total: f64 = selected.iter().map(AssessmentCandidate::weight_value).sum();
        let fitness = strategy_fitness(total, selected.len(), self.tuning.weight_target);
        debug!(
            %strategy,
            generated,
            rejected = rejected.len(),
            selected = selected.len(),
            total,
            fitness,
            "strategy refined"
        );
        StrategyRun {
            strategy,
            selected,
            rejected,
            fitness,
            band,
        }
    }

    pub fn run(&self) -> AssessmentOutcome {
        let generator = CandidateGenerator::new(self.doc, self.term, self.tuning);
        let evaluation = generator.evaluation_section();

        let structural = self.refine(Strategy::Structural, generator.generate());
        let fallback = self.refine(
            Strategy::Fallback,
            fallback::generate_fallback(self.doc, self.tuning),
        );
        let (structural_fitness, fallback_fitness) = (structural.fitness, fallback.fitness);

        let chosen = if fallback.fitness > structural.fitness {
            fallback
        } else {
            structural
        };
        info!(
            strategy = %chosen.strategy,
            structural = structural_fitness,
            fallback = fallback_fitness,
            tasks = chosen.selected.len(),
            "assessment strategy chosen"
        );

        let mut tasks = finalize::finalize_all(chosen.selected.clone());
        let rule_text = match evaluation {
            Some(section) => self.doc.text_in_section(section),
            None => self.doc.full_text(),
        };
        let text_rules_attached = rules::attach_text_rules(&mut tasks, &rule_text);

        AssessmentOutcome {
            tasks,
            strategy: chosen.strategy,
            structural_fitness,
            fallback_fitness,
            under_extracted: chosen.band == WeightBand::Under,
            selected: chosen.selected,
            rejected: chosen.rejected,
            evaluation_heading: evaluation.map(|s| s.heading.clone()),
            text_rules_attached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::course::Weight;

    fn candidate(title: &str, weight: f64, evidence: &str) -> AssessmentCandidate {
        AssessmentCandidate::builder(title, SourceMethod::Inline)
            .weight(Weight::new(weight))
            .evidence(evidence)
            .in_evaluation(true)
            .build()
    }

    #[test]
    fn refine_rejects_scores_and_selects() {
        let doc = DocumentStructure::default();
        let tuning = ExtractionTuning::default();
        let pipeline = AssessmentPipeline::new(&doc, None, &tuning);
        let run = pipeline.refine(
            Strategy::Structural,
            vec![
                candidate("Assignments", 40.0, "Assignments: 40%"),
                candidate("Final Exam", 60.0, "Final Exam: 60%"),
                candidate("Passing", 50.0, "you need a minimum of 50% on the final exam"),
            ],
        );
        assert_eq!(run.selected.len(), 2);
        assert_eq!(run.rejected.len(), 1);
        assert_eq!(run.band, WeightBand::Within);
        assert!((run.selected[1].score() - 0.85).abs() < 1e-6);
        assert!((run.total_weight() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_document_yields_no_tasks() {
        let doc = DocumentStructure::default();
        let tuning = ExtractionTuning::default();
        let outcome = AssessmentPipeline::new(&doc, None, &tuning).run();
        assert!(outcome.tasks.is_empty());
        assert_eq!(outcome.strategy, Strategy::Structural);
        assert_eq!(outcome.structural_fitness, 0.0);
        assert!(outcome.under_extracted);
    }
}
