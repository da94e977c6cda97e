use super::report::RunReport;
use crate::incentive::calculator::PriorResult;
use crate::incentive::domain::{EmployeeId, ReportingMonth};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;

/// Prior-month amounts and qualifying streaks, taken from the previous run report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunHistory {
    month: Option<ReportingMonth>,
    prior: BTreeMap<EmployeeId, PriorResult>,
}

#[derive(Deserialize)]
struct HistoryDocument {
    month: ReportingMonth,
    outcomes: Vec<HistoryOutcome>,
}

#[derive(Deserialize)]
struct HistoryOutcome {
    employee: EmployeeId,
    incentive: PriorResult,
}

impl RunHistory {
    pub fn new(month: ReportingMonth) -> Self {
        Self {
            month: Some(month),
            prior: BTreeMap::new(),
        }
    }

    pub fn from_report(report: &RunReport) -> Self {
        Self {
            month: Some(report.month),
            prior: report
                .outcomes
                .iter()
                .map(|outcome| (outcome.employee.clone(), outcome.incentive.prior()))
                .collect(),
        }
    }

    /// Reads only the fields progression needs, so older reports stay usable.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        let document: HistoryDocument = serde_json::from_reader(reader)?;
        Ok(Self {
            month: Some(document.month),
            prior: document
                .outcomes
                .into_iter()
                .map(|outcome| (outcome.employee, outcome.incentive))
                .collect(),
        })
    }

    pub fn with_prior(mut self, employee: EmployeeId, prior: PriorResult) -> Self {
        self.prior.insert(employee, prior);
        self
    }

    pub fn month(&self) -> Option<ReportingMonth> {
        self.month
    }

    pub fn is_empty(&self) -> bool {
        self.prior.is_empty()
    }

    pub fn prior(&self, employee: &EmployeeId) -> Option<&PriorResult> {
        self.prior.get(employee)
    }
}
