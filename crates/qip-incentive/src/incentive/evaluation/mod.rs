mod rules;

use super::conditions::{ConditionId, ConditionSet, ConditionThresholds};
use super::metrics::Metrics;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Final runs assess everything strictly; interim runs are produced mid-month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Final,
    Interim,
}

impl RunMode {
    pub fn from_interim_flag(interim: bool) -> Self {
        if interim {
            Self::Interim
        } else {
            Self::Final
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Final => f.write_str("final"),
            Self::Interim => f.write_str("interim"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionVerdict {
    Pass,
    Fail,
    NotApplicable,
}

/// Measured value or threshold attached to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Observed {
    Flag(bool),
    Count(u64),
    Rate(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    AtMost,
    Below,
    IsFalse,
}

/// Why a condition ended up with its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum VerdictBasis {
    /// The position rule excludes the condition.
    Excluded,
    /// Applicable, but the metric could not be derived from the inputs.
    MetricUnavailable,
    /// Interim run with attendance not yet knowable.
    InterimRelaxation,
    Measured {
        observed: Observed,
        threshold: Observed,
        comparison: Comparison,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionCheck {
    pub condition: ConditionId,
    pub verdict: ConditionVerdict,
    #[serde(flatten)]
    pub basis: VerdictBasis,
}

/// One check for each of the ten conditions, in ID order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionVerdicts(Vec<ConditionCheck>);

impl ConditionVerdicts {
    pub fn get(&self, condition: ConditionId) -> Option<&ConditionCheck> {
        self.0.iter().find(|check| check.condition == condition)
    }

    pub fn verdict(&self, condition: ConditionId) -> Option<ConditionVerdict> {
        self.get(condition).map(|check| check.verdict)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConditionCheck> {
        self.0.iter()
    }

    /// Applicable conditions whose metric was missing.
    pub fn unavailable(&self) -> impl Iterator<Item = ConditionId> + '_ {
        self.0
            .iter()
            .filter(|check| check.basis == VerdictBasis::MetricUnavailable)
            .map(|check| check.condition)
    }

    pub fn failed(&self) -> ConditionSet {
        self.0
            .iter()
            .filter(|check| check.verdict == ConditionVerdict::Fail)
            .map(|check| check.condition)
            .collect()
    }
}

/// Aggregate over the assessed (PASS or FAIL) conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibilitySummary {
    pub applicable_count: usize,
    pub passed_count: usize,
    pub pass_rate: f64,
}

impl EligibilitySummary {
    /// Every assessed condition passed. Partial pass rates never qualify.
    pub fn is_eligible(&self) -> bool {
        self.passed_count == self.applicable_count
    }
}

/// Applies condition thresholds to metrics; shared by every employee in a run.
pub struct ConditionEvaluator<'m> {
    thresholds: &'m ConditionThresholds,
    mode: RunMode,
}

impl<'m> ConditionEvaluator<'m> {
    pub fn new(thresholds: &'m ConditionThresholds, mode: RunMode) -> Self {
        Self { thresholds, mode }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn evaluate(&self, metrics: &Metrics, applicable: ConditionSet) -> ConditionVerdicts {
        let checks = ConditionId::ALL
            .into_iter()
            .map(|condition| self.check(condition, metrics, applicable))
            .collect();
        ConditionVerdicts(checks)
    }

    fn check(
        &self,
        condition: ConditionId,
        metrics: &Metrics,
        applicable: ConditionSet,
    ) -> ConditionCheck {
        if !applicable.contains(condition) {
            return ConditionCheck {
                condition,
                verdict: ConditionVerdict::NotApplicable,
                basis: VerdictBasis::Excluded,
            };
        }

        match rules::measure(condition, metrics, self.thresholds) {
            Some(measurement) => ConditionCheck {
                condition,
                verdict: if measurement.passed {
                    ConditionVerdict::Pass
                } else {
                    ConditionVerdict::Fail
                },
                basis: VerdictBasis::Measured {
                    observed: measurement.observed,
                    threshold: measurement.threshold,
                    comparison: measurement.comparison,
                },
            },
            None if self.relaxed_for_interim(condition) => {
                debug!(%condition, "interim run: unassessable attendance treated as pass");
                ConditionCheck {
                    condition,
                    verdict: ConditionVerdict::Pass,
                    basis: VerdictBasis::InterimRelaxation,
                }
            }
            None => ConditionCheck {
                condition,
                verdict: ConditionVerdict::NotApplicable,
                basis: VerdictBasis::MetricUnavailable,
            },
        }
    }

    /// Attendance rate and minimum days cannot be judged before the month closes.
    fn relaxed_for_interim(&self, condition: ConditionId) -> bool {
        self.mode == RunMode::Interim
            && matches!(
                condition,
                ConditionId::ATTENDANCE_RATE | ConditionId::MINIMUM_WORKING_DAYS
            )
    }

    pub fn summarize(&self, verdicts: &ConditionVerdicts) -> EligibilitySummary {
        let applicable_count = verdicts
            .iter()
            .filter(|check| check.verdict != ConditionVerdict::NotApplicable)
            .count();
        let passed_count = verdicts
            .iter()
            .filter(|check| check.verdict == ConditionVerdict::Pass)
            .count();
        let pass_rate = if applicable_count == 0 {
            100.0
        } else {
            passed_count as f64 / applicable_count as f64 * 100.0
        };

        EligibilitySummary {
            applicable_count,
            passed_count,
            pass_rate,
        }
    }
}
