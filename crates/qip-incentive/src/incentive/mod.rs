//! Monthly QIP incentive engine.
//!
//! The pipeline is a sequence of value transformations over one roster:
//! metrics are derived from the month's feeds, evaluated against the conditions the
//! [`PositionConditionMatrix`] marks applicable for each position, summarised, and finally
//! turned into an amount by the [`IncentiveCalculator`]. [`IncentiveRun`] drives the whole
//! pipeline and settles supervisory roles after everyone they average over.

pub mod calculator;
pub mod conditions;
pub mod diagnostics;
pub mod domain;
pub mod evaluation;
pub mod matrix;
pub mod metrics;
pub mod roster;
pub mod run;

#[cfg(test)]
mod tests;

pub use calculator::{AmountBasis, IncentiveCalculator, IncentiveResult, PayInputs, PriorResult};
pub use conditions::{ConditionId, ConditionSet, ConditionThresholds, UnknownCondition};
pub use diagnostics::{DataQualityWarning, EvaluationAmbiguity, RunDiagnostics, SourceKind};
pub use domain::{
    AreaScope, Employee, EmployeeId, MonthParseError, OrgType, PositionPath, ReportingMonth,
};
pub use evaluation::{
    Comparison, ConditionCheck, ConditionEvaluator, ConditionVerdict, ConditionVerdicts,
    EligibilitySummary, Observed, RunMode, VerdictBasis,
};
pub use matrix::{
    IncentiveRule, MatrixDocument, MatrixError, PositionConditionMatrix, PositionPattern,
    PositionRule, Resolution, ResolutionTrace, Specificity,
};
pub use metrics::{
    AqlRecord, AqlResult, AttendancePolicy, AttendanceRecord, AttendanceStatus, MetricComputer,
    MetricValue, Metrics, PrsRecord, SourceData,
};
pub use roster::Roster;
pub use run::{EmployeeOutcome, IncentiveRun, RunHistory, RunInputs, RunReport, RunTotals};
