mod aql;
mod attendance;
mod computer;
mod prs;

pub use aql::{area_reject_rate, AqlHistory, AqlRecord, AqlResult, AreaTally};
pub use attendance::{
    AttendanceLedger, AttendancePolicy, AttendanceRecord, AttendanceStatus, AttendanceSummary,
};
pub use computer::MetricComputer;
pub use prs::{PrsRecord, PrsTotals};

use serde::{Deserialize, Serialize};

/// A metric that is either measured or could not be derived from the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue<T> {
    Available(T),
    NotAvailable,
}

impl<T: Copy> MetricValue<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Self::Available(value) => Some(*value),
            Self::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MetricValue<U> {
        match self {
            Self::Available(value) => MetricValue::Available(f(value)),
            Self::NotAvailable => MetricValue::NotAvailable,
        }
    }
}

impl<T> From<Option<T>> for MetricValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Available(value),
            None => Self::NotAvailable,
        }
    }
}

/// Per-employee measurements for one reporting month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub attendance_rate: MetricValue<f64>,
    pub unapproved_absences: MetricValue<u32>,
    pub actual_working_days: MetricValue<u32>,
    pub total_working_days: MetricValue<u32>,
    pub personal_aql_failures: MetricValue<u32>,
    pub consecutive_aql_failure: MetricValue<bool>,
    pub area_consecutive_failure: MetricValue<bool>,
    pub area_reject_rate: MetricValue<f64>,
    pub prs_pass_rate: MetricValue<f64>,
    pub prs_inspection_qty: MetricValue<u64>,
}

impl Metrics {
    pub const fn unavailable() -> Self {
        Self {
            attendance_rate: MetricValue::NotAvailable,
            unapproved_absences: MetricValue::NotAvailable,
            actual_working_days: MetricValue::NotAvailable,
            total_working_days: MetricValue::NotAvailable,
            personal_aql_failures: MetricValue::NotAvailable,
            consecutive_aql_failure: MetricValue::NotAvailable,
            area_consecutive_failure: MetricValue::NotAvailable,
            area_reject_rate: MetricValue::NotAvailable,
            prs_pass_rate: MetricValue::NotAvailable,
            prs_inspection_qty: MetricValue::NotAvailable,
        }
    }
}

/// Raw records handed over by ingestion; `None` means the source was not usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceData {
    pub attendance: Option<Vec<AttendanceRecord>>,
    pub aql: Option<Vec<AqlRecord>>,
    pub prs: Option<Vec<PrsRecord>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_serializes_as_null() {
        let json = serde_json::to_string(&Metrics::unavailable()).expect("serialize");
        assert!(json.contains("\"attendance_rate\":null"));

        let value: MetricValue<f64> = serde_json::from_str("92.5").expect("deserialize");
        assert_eq!(value, MetricValue::Available(92.5));
        let value: MetricValue<f64> = serde_json::from_str("null").expect("deserialize");
        assert_eq!(value, MetricValue::NotAvailable);
    }
}
