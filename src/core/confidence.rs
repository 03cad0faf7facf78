#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreSignals {
    pub valid_weight: bool,
    pub has_noun: bool,
    pub in_evaluation: bool,
    pub table_sourced: bool,
    pub title_shaped: bool,
}

pub fn score_confidence(signals: &ScoreSignals) -> f32 {
    let mut score = 0.0;
    if signals.valid_weight {
        score += 0.30;
    }
    if signals.has_noun {
        score += 0.25;
    }
    if signals.in_evaluation {
        score += 0.20;
    }
    if signals.table_sourced {
        score += 0.15;
    }
    if signals.title_shaped {
        score += 0.10;
    }

    f32::clamp(score, 0.0, 1.0)
}

pub fn strategy_fitness(total_weight: f64, task_count: usize, target: f64) -> f32 {
    if task_count == 0 {
        return 0.0;
    }
    let distance = (total_weight - target).abs().min(100.0);
    let closeness = 1.0 - distance / 100.0;
    let breadth = 0.02 * task_count.min(10) as f64;
    (closeness + breadth) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_signals_reach_one() {
        let signals = ScoreSignals {
            valid_weight: true,
            has_noun: true,
            in_evaluation: true,
            table_sourced: true,
            title_shaped: true,
        };
        assert!((score_confidence(&signals) - 1.0).abs() < 1e-6);
        assert_eq!(score_confidence(&ScoreSignals::default()), 0.0);
    }

    #[test]
    fn fitness_prefers_sum_near_target() {
        let exact = strategy_fitness(100.0, 4, 100.0);
        let short = strategy_fitness(80.0, 4, 100.0);
        let far_over = strategy_fitness(450.0, 4, 100.0);
        assert!(exact > short);
        assert!(short > far_over);
        assert!((far_over - 0.08).abs() < 1e-6);
        assert_eq!(strategy_fitness(100.0, 0, 100.0), 0.0);
    }
}
