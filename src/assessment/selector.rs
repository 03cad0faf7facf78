use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::assessment::candidate::AssessmentCandidate;

static RE_IN_CLASS_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:in[\s-]class\s+)+").expect("valid in-class regex"));
static RE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digits regex"));

/// Dedup key for a title: lowercase, no "in-class" prefix, digit runs
/// collapsed to `#`, single spaces.
pub fn normalize_title(title: &str) -> String {
    let lower = title.to_lowercase();
    let collapsed = lower.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = RE_IN_CLASS_PREFIX.replace(&collapsed, "");
    RE_DIGITS.replace_all(stripped.trim(), "#").into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightBand {
    Under,
    Within,
    Over,
}

/// Picks a subset of scored candidates whose core weights sum near the target.
#[derive(Debug, Clone, Copy)]
pub struct Selector {
    target: f64,
    tolerance: f64,
}

impl Selector {
    pub fn new(target: f64, tolerance: f64) -> Self {
        Self { target, tolerance }
    }

    pub fn ceiling(&self) -> f64 {
        self.target + self.tolerance
    }

    pub fn band(&self, core_total: f64) -> WeightBand {
        if core_total > self.ceiling() {
            WeightBand::Over
        } else if core_total < self.target - self.tolerance {
            WeightBand::Under
        } else {
            WeightBand::Within
        }
    }

    pub fn select(&self, candidates: Vec<AssessmentCandidate>) -> Vec<AssessmentCandidate> {
        let core_total: f64 = candidates
            .iter()
            .filter(|c| !c.is_bonus())
            .map(AssessmentCandidate::weight_value)
            .sum();

        match self.band(core_total) {
            WeightBand::Within => candidates,
            WeightBand::Under => {
                info!(
                    "core weight {:.1}% is under {:.1}%, keeping all {} candidates",
                    core_total,
                    self.target - self.tolerance,
                    candidates.len()
                );
                candidates
            }
            WeightBand::Over => self.trim_over_extraction(candidates, core_total),
        }
    }

    fn trim_over_extraction(
        &self,
        candidates: Vec<AssessmentCandidate>,
        core_total: f64,
    ) -> Vec<AssessmentCandidate> {
        let (bonus, mut core): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(AssessmentCandidate::is_bonus);

        core.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    b.weight_value()
                        .partial_cmp(&a.weight_value())
                        .unwrap_or(Ordering::Equal)
                })
        });

        let mut seen = HashSet::new();
        let mut selected = Vec::with_capacity(core.len() + bonus.len());
        let mut running = 0.0;
        for candidate in core {
            if !seen.insert(normalize_title(candidate.title())) {
                debug!("dropping duplicate title \"{}\"", candidate.title());
                continue;
            }
            let weight = candidate.weight_value();
            if running + weight <= self.ceiling() {
                running += weight;
                selected.push(candidate);
            } else {
                debug!(
                    "\"{}\" ({:.1}%) does not fit under {:.1}%",
                    candidate.title(),
                    weight,
                    self.ceiling()
                );
            }
        }
        info!(
            "core weight {:.1}% over {:.1}%, selected {} candidates totalling {:.1}%",
            core_total,
            self.ceiling(),
            selected.len(),
            running
        );
        selected.extend(bonus);
        selected
    }
}
