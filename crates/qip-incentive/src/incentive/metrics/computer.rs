use super::aql::AqlHistory;
use super::attendance::AttendanceLedger;
use super::prs::{self, PrsTotals};
use super::{MetricValue, Metrics, SourceData};
use crate::incentive::diagnostics::{DataQualityWarning, RunDiagnostics, SourceKind};
use crate::incentive::domain::{AreaScope, Employee, EmployeeId, ReportingMonth};
use crate::incentive::matrix::PositionConditionMatrix;
use crate::incentive::roster::Roster;
use std::collections::BTreeMap;
use tracing::debug;

/// Derives [`Metrics`] for roster members from month-scoped source indexes.
///
/// Indexes are built once in [`MetricComputer::new`]; a source that is absent leaves its
/// metrics `NotAvailable` for every employee.
pub struct MetricComputer<'a> {
    month: ReportingMonth,
    roster: &'a Roster,
    attendance: Option<AttendanceLedger>,
    aql: Option<AqlHistory>,
    prs: Option<BTreeMap<EmployeeId, PrsTotals>>,
}

impl<'a> MetricComputer<'a> {
    pub fn new(
        month: ReportingMonth,
        matrix: &PositionConditionMatrix,
        roster: &'a Roster,
        sources: &SourceData,
        diagnostics: &mut RunDiagnostics,
    ) -> Self {
        let attendance = match &sources.attendance {
            Some(records) => {
                let (ledger, warnings) =
                    AttendanceLedger::build(records, month, matrix.attendance_policy(), roster);
                diagnostics.extend(warnings);
                Some(ledger)
            }
            None => {
                diagnostics.warn(DataQualityWarning::MissingSource {
                    source: SourceKind::Attendance,
                });
                None
            }
        };

        let aql = match &sources.aql {
            Some(records) => {
                let (history, warnings) = AqlHistory::build(records, month, roster);
                diagnostics.extend(warnings);
                Some(history)
            }
            None => {
                diagnostics.warn(DataQualityWarning::MissingSource {
                    source: SourceKind::Aql,
                });
                None
            }
        };

        let prs = match &sources.prs {
            Some(records) => {
                let (totals, warnings) = prs::aggregate(records, month, roster);
                diagnostics.extend(warnings);
                Some(totals)
            }
            None => {
                diagnostics.warn(DataQualityWarning::MissingSource {
                    source: SourceKind::Prs,
                });
                None
            }
        };

        Self {
            month,
            roster,
            attendance,
            aql,
            prs,
        }
    }

    pub fn month(&self) -> ReportingMonth {
        self.month
    }

    pub fn aql_history(&self) -> Option<&AqlHistory> {
        self.aql.as_ref()
    }

    pub fn compute(&self, employee: &Employee) -> Metrics {
        let mut metrics = Metrics::unavailable();

        if let Some(ledger) = &self.attendance {
            let summary = ledger.summary(&employee.id);
            metrics.attendance_rate = summary.attendance_rate();
            metrics.unapproved_absences = MetricValue::Available(summary.unapproved_absences);
            metrics.actual_working_days = MetricValue::Available(summary.actual_working_days);
            metrics.total_working_days = MetricValue::Available(summary.total_working_days);
        }

        if let Some(history) = &self.aql {
            metrics.personal_aql_failures =
                MetricValue::Available(history.personal_failures(&employee.id));
            metrics.consecutive_aql_failure = history.has_streak(&employee.id).into();
            metrics.area_consecutive_failure = self.team_streak(history, employee);
            metrics.area_reject_rate = history.reject_rate_for(&employee.area).into();
        }

        if let Some(totals) = &self.prs {
            let totals = totals.get(&employee.id).copied().unwrap_or_default();
            metrics.prs_pass_rate = totals.pass_rate();
            metrics.prs_inspection_qty = MetricValue::Available(totals.total_qty);
        }

        debug!(employee = %employee.id, ?metrics, "metrics computed");
        metrics
    }

    /// Whether anyone in the employee's team (area members and reporting subtree) is on a
    /// 3-month streak.
    fn team_streak(&self, history: &AqlHistory, employee: &Employee) -> MetricValue<bool> {
        let Some(streak) = history.streak_members() else {
            return MetricValue::NotAvailable;
        };
        let team = self.roster.team(employee);
        MetricValue::Available(team.iter().any(|member| streak.contains(member)))
    }

    /// Whether any employee based in the buildings `employee` is responsible for is on a
    /// 3-month streak. Factory-wide for `ALL`; unknown for an unassigned area.
    pub fn responsibility_streak(&self, employee: &Employee) -> MetricValue<bool> {
        let Some(streak) = self.aql.as_ref().and_then(AqlHistory::streak_members) else {
            return MetricValue::NotAvailable;
        };

        match &employee.area {
            AreaScope::All => MetricValue::Available(
                self.roster.iter().any(|member| streak.contains(&member.id)),
            ),
            AreaScope::Buildings(_) => MetricValue::Available(
                self.roster
                    .area_members(&employee.area)
                    .any(|member| streak.contains(&member.id)),
            ),
            AreaScope::Unassigned => MetricValue::NotAvailable,
        }
    }
}
