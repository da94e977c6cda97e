use crate::incentive::calculator::IncentiveResult;
use crate::incentive::diagnostics::RunDiagnostics;
use crate::incentive::domain::{EmployeeId, OrgType, PositionPath, ReportingMonth};
use crate::incentive::evaluation::{ConditionVerdicts, EligibilitySummary, RunMode};
use crate::incentive::metrics::Metrics;
use serde::{Deserialize, Serialize};

/// Everything the renderer needs about one employee for the month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeOutcome {
    pub employee: EmployeeId,
    pub name: String,
    pub org_type: OrgType,
    pub position: PositionPath,
    pub rule: String,
    pub metrics: Metrics,
    pub checks: ConditionVerdicts,
    pub eligibility: EligibilitySummary,
    pub incentive: IncentiveResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub employees: usize,
    pub eligible: usize,
    pub paid: usize,
    pub total_amount: u64,
}

impl RunTotals {
    pub fn tally<'a>(outcomes: impl IntoIterator<Item = &'a EmployeeOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut totals, outcome| {
                totals.employees += 1;
                if outcome.eligibility.is_eligible() {
                    totals.eligible += 1;
                }
                if outcome.incentive.amount > 0 {
                    totals.paid += 1;
                    totals.total_amount += outcome.incentive.amount;
                }
                totals
            })
    }
}

/// Output of one calculation run. Outcomes are sorted by employee number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub month: ReportingMonth,
    pub mode: RunMode,
    pub matrix_fingerprint: String,
    pub outcomes: Vec<EmployeeOutcome>,
    pub diagnostics: RunDiagnostics,
    pub totals: RunTotals,
}

impl RunReport {
    pub fn outcome(&self, employee: &EmployeeId) -> Option<&EmployeeOutcome> {
        self.outcomes
            .binary_search_by(|outcome| outcome.employee.cmp(employee))
            .ok()
            .and_then(|index| self.outcomes.get(index))
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Conventional file name for the month, e.g. `qip-incentive-2025-09.json`.
    pub fn file_name(&self) -> String {
        match self.mode {
            RunMode::Final => format!("qip-incentive-{}.json", self.month),
            RunMode::Interim => format!("qip-incentive-{}-interim.json", self.month),
        }
    }
}
