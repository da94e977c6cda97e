use super::conditions::ConditionId;
use super::domain::{EmployeeId, OrgType, ReportingMonth};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Input feed a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Roster,
    Attendance,
    Aql,
    Prs,
    PreviousRun,
}

impl SourceKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Roster => "roster",
            Self::Attendance => "attendance",
            Self::Aql => "AQL",
            Self::Prs => "5PRS",
            Self::PreviousRun => "previous run",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Non-fatal input problem; the affected metrics degrade to NOT_AVAILABLE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    MissingSource {
        source: SourceKind,
    },
    MissingColumn {
        source: SourceKind,
        column: String,
    },
    InvalidRows {
        source: SourceKind,
        rows: usize,
    },
    OutOfMonthRecords {
        source: SourceKind,
        month: ReportingMonth,
        dropped: usize,
    },
    UnknownEmployee {
        source: SourceKind,
        employee: EmployeeId,
    },
    UnknownOrgType {
        employee: EmployeeId,
        value: String,
    },
    UnknownManager {
        employee: EmployeeId,
        manager: EmployeeId,
    },
    IncompleteAqlHistory {
        missing_months: Vec<ReportingMonth>,
    },
    HistoryMonthMismatch {
        expected: ReportingMonth,
        found: ReportingMonth,
    },
    MetricUnavailable {
        employee: EmployeeId,
        condition: ConditionId,
    },
    AreaResponsibilityUnavailable {
        employee: EmployeeId,
    },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSource { source } => write!(f, "{source} source not provided"),
            Self::MissingColumn { source, column } => {
                write!(f, "{source} source is missing column '{column}'")
            }
            Self::InvalidRows { source, rows } => {
                write!(f, "{rows} unreadable row(s) skipped in {source} source")
            }
            Self::OutOfMonthRecords {
                source,
                month,
                dropped,
            } => write!(
                f,
                "{dropped} {source} row(s) outside {month} dropped from a month-scoped source"
            ),
            Self::UnknownEmployee { source, employee } => {
                write!(f, "{source} references {employee} who is not on the roster")
            }
            Self::UnknownOrgType { employee, value } => {
                write!(f, "{employee} has unknown TYPE '{value}' and was skipped")
            }
            Self::UnknownManager { employee, manager } => {
                write!(f, "{employee} reports to {manager} who is not on the roster")
            }
            Self::IncompleteAqlHistory { missing_months } => {
                let months: Vec<String> = missing_months.iter().map(|m| m.to_string()).collect();
                write!(
                    f,
                    "AQL history has no records for {}; streak flags unavailable",
                    months.join(", ")
                )
            }
            Self::HistoryMonthMismatch { expected, found } => write!(
                f,
                "previous run covers {found}, expected {expected}; progression history ignored"
            ),
            Self::MetricUnavailable {
                employee,
                condition,
            } => write!(
                f,
                "{condition} for {employee} could not be assessed (metric not available)"
            ),
            Self::AreaResponsibilityUnavailable { employee } => write!(
                f,
                "area streak check for {employee} could not be assessed (AQL data not available)"
            ),
        }
    }
}

/// A title matched several rules with the same specificity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationAmbiguity {
    pub employee: EmployeeId,
    pub org_type: OrgType,
    pub title: String,
    pub candidates: Vec<String>,
    pub chosen: String,
}

/// Run-level collection of non-fatal findings, surfaced in the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub data_quality: Vec<DataQualityWarning>,
    pub ambiguities: Vec<EvaluationAmbiguity>,
}

impl RunDiagnostics {
    pub fn warn(&mut self, warning: DataQualityWarning) {
        warn!(%warning, "data quality");
        self.data_quality.push(warning);
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = DataQualityWarning>) {
        for warning in warnings {
            self.warn(warning);
        }
    }

    pub fn ambiguity(&mut self, ambiguity: EvaluationAmbiguity) {
        warn!(
            employee = %ambiguity.employee,
            title = %ambiguity.title,
            candidates = ?ambiguity.candidates,
            chosen = %ambiguity.chosen,
            "position matched several rules with equal specificity"
        );
        self.ambiguities.push(ambiguity);
    }

    pub fn is_clean(&self) -> bool {
        self.data_quality.is_empty() && self.ambiguities.is_empty()
    }
}
