use super::{Comparison, Observed};
use crate::incentive::conditions::{ConditionId, ConditionThresholds};
use crate::incentive::metrics::{MetricValue, Metrics};

/// Result of comparing one measured metric against its threshold.
pub(crate) struct Measurement {
    pub passed: bool,
    pub observed: Observed,
    pub threshold: Observed,
    pub comparison: Comparison,
}

/// Compare the metric behind `condition`; `None` when that metric is not available.
pub(crate) fn measure(
    condition: ConditionId,
    metrics: &Metrics,
    thresholds: &ConditionThresholds,
) -> Option<Measurement> {
    match condition {
        ConditionId::ATTENDANCE_RATE => at_least_rate(
            metrics.attendance_rate,
            thresholds.min_attendance_rate,
        ),
        ConditionId::UNAPPROVED_ABSENCE => at_most(
            metrics.unapproved_absences,
            thresholds.max_unapproved_absences,
        ),
        ConditionId::ACTUAL_WORKING_DAYS => at_least(
            metrics.actual_working_days,
            thresholds.min_actual_working_days,
        ),
        ConditionId::MINIMUM_WORKING_DAYS => {
            at_least(metrics.actual_working_days, thresholds.minimum_working_days)
        }
        ConditionId::PERSONAL_AQL_FAILURES => at_most(
            metrics.personal_aql_failures,
            thresholds.max_personal_aql_failures,
        ),
        ConditionId::PERSONAL_AQL_STREAK => is_false(metrics.consecutive_aql_failure),
        ConditionId::AREA_AQL_STREAK => is_false(metrics.area_consecutive_failure),
        ConditionId::AREA_REJECT_RATE => {
            let observed = metrics.area_reject_rate.value()?;
            Some(Measurement {
                passed: observed < thresholds.max_area_reject_rate,
                observed: Observed::Rate(observed),
                threshold: Observed::Rate(thresholds.max_area_reject_rate),
                comparison: Comparison::Below,
            })
        }
        ConditionId::PRS_PASS_RATE => {
            at_least_rate(metrics.prs_pass_rate, thresholds.min_prs_pass_rate)
        }
        ConditionId::PRS_INSPECTION_QTY => at_least(
            metrics.prs_inspection_qty,
            thresholds.min_prs_inspection_qty,
        ),
        _ => None,
    }
}

fn at_least_rate(metric: MetricValue<f64>, minimum: f64) -> Option<Measurement> {
    let observed = metric.value()?;
    Some(Measurement {
        passed: observed >= minimum,
        observed: Observed::Rate(observed),
        threshold: Observed::Rate(minimum),
        comparison: Comparison::AtLeast,
    })
}

fn at_least<T: Copy + Into<u64>>(metric: MetricValue<T>, minimum: T) -> Option<Measurement> {
    let observed = metric.value()?.into();
    let minimum = minimum.into();
    Some(Measurement {
        passed: observed >= minimum,
        observed: Observed::Count(observed),
        threshold: Observed::Count(minimum),
        comparison: Comparison::AtLeast,
    })
}

fn at_most(metric: MetricValue<u32>, maximum: u32) -> Option<Measurement> {
    let observed = metric.value()?;
    Some(Measurement {
        passed: observed <= maximum,
        observed: Observed::Count(u64::from(observed)),
        threshold: Observed::Count(u64::from(maximum)),
        comparison: Comparison::AtMost,
    })
}

fn is_false(metric: MetricValue<bool>) -> Option<Measurement> {
    let observed = metric.value()?;
    Some(Measurement {
        passed: !observed,
        observed: Observed::Flag(observed),
        threshold: Observed::Flag(false),
        comparison: Comparison::IsFalse,
    })
}
