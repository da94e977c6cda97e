//! Monthly amounts from eligibility, position incentive rules and prior-month history.

mod progressive;
mod supervisory;

use super::evaluation::EligibilitySummary;
use super::matrix::{IncentiveRule, PositionConditionMatrix};
use super::metrics::MetricValue;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Last month's paid amount and qualifying streak for one employee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorResult {
    pub amount: u64,
    pub continuous_months: u32,
}

/// How the amount was reached, for audit in the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AmountBasis {
    /// The position carries no incentive.
    Unpaid,
    /// At least one assessed condition failed.
    Ineligible,
    /// Someone in the buildings this employee answers for is on a 3-month AQL streak.
    AreaStreak,
    Fixed,
    Progressive {
        progression: String,
        tier: usize,
    },
    Supervisory {
        subordinates: usize,
        paid_subordinates: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        average: Option<f64>,
        multiplier: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveResult {
    pub amount: u64,
    pub previous_amount: u64,
    pub continuous_months: u32,
    pub basis: AmountBasis,
}

impl IncentiveResult {
    pub fn prior(&self) -> PriorResult {
        PriorResult {
            amount: self.amount,
            continuous_months: self.continuous_months,
        }
    }
}

/// Everything an amount may depend on besides the rule itself.
#[derive(Debug, Clone, Copy)]
pub struct PayInputs<'a> {
    pub summary: &'a EligibilitySummary,
    pub prior: Option<&'a PriorResult>,
    /// Streak status of the employee's area of responsibility.
    pub area_streak: MetricValue<bool>,
    /// Amounts already settled for the subordinates a supervisory rule averages.
    pub subordinate_amounts: &'a [u64],
}

pub struct IncentiveCalculator<'m> {
    matrix: &'m PositionConditionMatrix,
}

impl<'m> IncentiveCalculator<'m> {
    pub fn new(matrix: &'m PositionConditionMatrix) -> Self {
        Self { matrix }
    }

    pub fn calculate(&self, rule: &IncentiveRule, inputs: PayInputs<'_>) -> IncentiveResult {
        let eligible = inputs.summary.is_eligible();
        let previous_amount = inputs.prior.map_or(0, |prior| prior.amount);

        let (amount, qualified, basis) = match rule {
            IncentiveRule::None => (0, eligible, AmountBasis::Unpaid),
            _ if !eligible => (0, false, AmountBasis::Ineligible),
            IncentiveRule::Fixed { amount } => (*amount, true, AmountBasis::Fixed),
            IncentiveRule::Progressive {
                progression,
                area_responsibility,
            } => {
                if *area_responsibility && inputs.area_streak.value() == Some(true) {
                    (0, false, AmountBasis::AreaStreak)
                } else {
                    let months = progressive::continuous_months(true, inputs.prior);
                    let table = self.matrix.progression(progression).unwrap_or(&[]);
                    let (tier, amount) = progressive::tier(table, months).unwrap_or((0, 0));
                    (
                        amount,
                        true,
                        AmountBasis::Progressive {
                            progression: progression.clone(),
                            tier,
                        },
                    )
                }
            }
            IncentiveRule::Supervisory { multiplier, .. } => {
                let average = supervisory::average_paid(inputs.subordinate_amounts);
                let amount = average.map_or(0, |average| supervisory::scaled(average, *multiplier));
                (
                    amount,
                    true,
                    AmountBasis::Supervisory {
                        subordinates: inputs.subordinate_amounts.len(),
                        paid_subordinates: inputs
                            .subordinate_amounts
                            .iter()
                            .filter(|amount| **amount > 0)
                            .count(),
                        average,
                        multiplier: *multiplier,
                    },
                )
            }
        };

        let continuous_months = progressive::continuous_months(qualified, inputs.prior);
        debug!(amount, continuous_months, ?basis, "incentive calculated");

        IncentiveResult {
            amount,
            previous_amount,
            continuous_months,
            basis,
        }
    }
}
