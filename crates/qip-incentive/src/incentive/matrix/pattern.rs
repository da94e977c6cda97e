use crate::incentive::domain::PositionPath;
use serde::{Deserialize, Serialize};

/// Canonical form used on both sides of every title comparison.
pub fn normalize_title(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '\u{a0}'], " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_uppercase()
}

/// Position-level constraints; every field that is set must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third: Option<String>,
}

impl Combination {
    fn constrained_fields(&self) -> usize {
        [&self.first, &self.second, &self.third]
            .into_iter()
            .filter(|field| field.is_some())
            .count()
    }

    fn matches(&self, position: &PositionPath) -> bool {
        level_matches(self.first.as_deref(), Some(position.first.as_str()))
            && level_matches(self.second.as_deref(), position.second.as_deref())
            && level_matches(self.third.as_deref(), position.third.as_deref())
    }
}

fn level_matches(expected: Option<&str>, actual: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => actual
            .map(|actual| normalize_title(actual) == normalize_title(expected))
            .unwrap_or(false),
    }
}

/// How strongly a pattern matched. Later variants always outrank earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "weight", rename_all = "snake_case")]
pub enum Specificity {
    Contains(usize),
    Exact(usize),
    Combination(usize),
}

/// One way of recognising a position title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionPattern {
    Exact(String),
    Contains(String),
    Combination(Combination),
}

impl PositionPattern {
    pub fn specificity(&self, position: &PositionPath) -> Option<Specificity> {
        match self {
            Self::Exact(alias) => {
                let alias = normalize_title(alias);
                (normalize_title(position.title()) == alias)
                    .then(|| Specificity::Exact(alias.len()))
            }
            Self::Contains(fragment) => {
                let fragment = normalize_title(fragment);
                (!fragment.is_empty() && normalize_title(position.title()).contains(&fragment))
                    .then(|| Specificity::Contains(fragment.len()))
            }
            Self::Combination(combination) => {
                let fields = combination.constrained_fields();
                (fields > 0 && combination.matches(position))
                    .then_some(Specificity::Combination(fields))
            }
        }
    }
}
