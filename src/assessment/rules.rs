use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::core::course::AssessmentTask;
use crate::resolver::rule::anchor_keyword;

static RE_TEXT_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bdue\s+(\d+)\s*(hours?|hrs?|days?|weeks?)\s+(after|before|following)\s+(?:the\s+|each\s+|your\s+)?(labs?|laboratory|tutorials?|lectures?|class)\b",
    )
    .expect("valid text rule regex")
});

static RE_SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.;!?](?:\s+|$)").expect("valid sentence break regex"));

fn stem(word: &str) -> String {
    let lower = word.to_lowercase();
    lower.strip_suffix('s').map(str::to_string).unwrap_or(lower)
}

fn title_words(title: &str) -> Vec<String> {
    title
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.chars().count() >= 3)
        .map(stem)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    pub subject: String,
    pub rule: String,
}

pub fn find_text_rules(text: &str) -> Vec<TextRule> {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    RE_SENTENCE_BREAK
        .split(&flattened)
        .filter_map(|sentence| {
            let caps = RE_TEXT_RULE.captures(sentence)?;
            let start = caps.get(0)?.start();
            Some(TextRule {
                subject: sentence[..start].trim().to_string(),
                rule: format!(
                    "{} {} {} {}",
                    &caps[1],
                    caps[2].to_lowercase(),
                    caps[3].to_lowercase(),
                    caps[4].to_lowercase()
                ),
            })
        })
        .collect()
}

pub fn attach_text_rules(tasks: &mut [AssessmentTask], text: &str) -> usize {
    let mut attached = 0;
    for rule in find_text_rules(text) {
        let subject: Vec<String> = rule.subject.split_whitespace().map(|w| {
            stem(w.trim_matches(|c: char| !c.is_alphanumeric()))
        }).collect();
        let target = tasks.iter_mut().find(|task| {
            !task.has_due_info()
                && title_words(&task.title)
                    .iter()
                    .any(|word| subject.contains(word))
        });
        let Some(task) = target else {
            debug!("no task for text rule \"{}\"", rule.rule);
            continue;
        };
        debug!("attaching rule \"{}\" to \"{}\"", rule.rule, task.title);
        task.rule_anchor = anchor_keyword(&rule.rule).map(str::to_string);
        task.due_rule = Some(rule.rule);
        task.needs_review = task.weight.is_none();
        attached += 1;
    }
    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::course::{AssessmentType, Weight};
    use pretty_assertions::assert_eq;

    fn task(title: &str) -> AssessmentTask {
        AssessmentTask {
            title: title.to_string(),
            kind: AssessmentType::infer(title),
            weight: Weight::new(20.0),
            due_datetime: None,
            due_rule: None,
            rule_anchor: None,
            confidence: 0.8,
            evidence: String::new(),
            needs_review: true,
        }
    }

    #[test]
    fn finds_rules_in_prose() {
        let rules = find_text_rules(
            "Lab reports are due 48 hours after the lab.\nThe midterm is in class. Pre-labs are\ndue 1 day before each Tutorial.",
        );
        assert_eq!(
            rules,
            vec![
                TextRule {
                    subject: "Lab reports are".to_string(),
                    rule: "48 hours after lab".to_string(),
                },
                TextRule {
                    subject: "Pre-labs are".to_string(),
                    rule: "1 day before tutorial".to_string(),
                },
            ]
        );
    }

    #[test]
    fn attaches_to_matching_task_only() {
        let mut tasks = vec![task("Midterm"), task("Lab Report"), task("Final Exam")];
        let attached = attach_text_rules(&mut tasks, "Lab reports are due 24 hours after the lab.");
        assert_eq!(attached, 1);
        assert_eq!(tasks[1].due_rule.as_deref(), Some("24 hours after lab"));
        assert_eq!(tasks[1].rule_anchor.as_deref(), Some("lab"));
        assert!(!tasks[1].needs_review);
        assert!(tasks[0].due_rule.is_none());

        let attached = attach_text_rules(&mut tasks, "Essays are due 2 days after class.");
        assert_eq!(attached, 0);
        assert_eq!(tasks.len(), 3);
    }
}
