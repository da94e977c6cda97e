use super::MetricValue;
use crate::incentive::diagnostics::{DataQualityWarning, SourceKind};
use crate::incentive::domain::{EmployeeId, ReportingMonth};
use crate::incentive::roster::Roster;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 5PRS inspection tally reported for an inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrsRecord {
    pub employee: EmployeeId,
    pub inspected_on: NaiveDate,
    pub pass_qty: u32,
    pub total_qty: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrsTotals {
    pub pass_qty: u64,
    pub total_qty: u64,
}

impl PrsTotals {
    pub fn pass_rate(&self) -> MetricValue<f64> {
        if self.total_qty == 0 {
            return MetricValue::NotAvailable;
        }
        MetricValue::Available(self.pass_qty as f64 / self.total_qty as f64 * 100.0)
    }
}

/// Aggregate 5PRS rows for `month`. Rows from adjacent months are dropped and reported;
/// the feed is expected to be month-scoped already.
pub(crate) fn aggregate(
    records: &[PrsRecord],
    month: ReportingMonth,
    roster: &Roster,
) -> (BTreeMap<EmployeeId, PrsTotals>, Vec<DataQualityWarning>) {
    let mut totals: BTreeMap<EmployeeId, PrsTotals> = BTreeMap::new();
    let mut unknown = BTreeSet::new();
    let mut dropped = 0usize;

    for record in records {
        if !month.contains(record.inspected_on) {
            dropped += 1;
            continue;
        }
        if !roster.contains(&record.employee) {
            unknown.insert(record.employee.clone());
            continue;
        }

        let entry = totals.entry(record.employee.clone()).or_default();
        entry.pass_qty += u64::from(record.pass_qty);
        entry.total_qty += u64::from(record.total_qty);
    }

    let mut warnings = Vec::new();
    if dropped > 0 {
        warnings.push(DataQualityWarning::OutOfMonthRecords {
            source: SourceKind::Prs,
            month,
            dropped,
        });
    }
    warnings.extend(
        unknown
            .into_iter()
            .map(|employee| DataQualityWarning::UnknownEmployee {
                source: SourceKind::Prs,
                employee,
            }),
    );

    (totals, warnings)
}
