use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;

static RE_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(hours?|hrs?|days?|weeks?)\b").expect("valid offset regex")
});

static RE_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(labs?|laboratory|laboratories|tutorials?|lectures?|class(?:es)?)\b")
        .expect("valid anchor regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Hours,
    Days,
    Weeks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOffset {
    pub amount: i64,
    pub unit: OffsetUnit,
    pub before: bool,
}

impl RuleOffset {
    pub fn parse(rule: &str) -> Option<Self> {
        let caps = RE_OFFSET.captures(rule)?;
        let amount: i64 = caps[1].parse().ok()?;
        let unit = match caps[2].to_lowercase().chars().next()? {
            'h' => OffsetUnit::Hours,
            'd' => OffsetUnit::Days,
            'w' => OffsetUnit::Weeks,
            _ => return None,
        };
        let lower = rule.to_lowercase();
        let before = lower.contains("before") && !lower.contains("after") && !lower.contains("following");
        Some(Self {
            amount,
            unit,
            before,
        })
    }

    pub fn duration(&self) -> Option<TimeDelta> {
        let magnitude = match self.unit {
            OffsetUnit::Hours => TimeDelta::try_hours(self.amount),
            OffsetUnit::Days => TimeDelta::try_days(self.amount),
            OffsetUnit::Weeks => TimeDelta::try_weeks(self.amount),
        }?;
        Some(if self.before { -magnitude } else { magnitude })
    }
}

pub fn anchor_keyword(rule: &str) -> Option<&'static str> {
    let caps = RE_ANCHOR.captures(rule)?;
    let word = caps[1].to_lowercase();
    if word.starts_with("lab") {
        Some("lab")
    } else if word.starts_with("tutorial") {
        Some("tutorial")
    } else {
        Some("lecture")
    }
}
