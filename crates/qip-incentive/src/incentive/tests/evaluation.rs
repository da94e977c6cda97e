use super::common::*;
use crate::incentive::conditions::{ConditionId, ConditionSet};
use crate::incentive::domain::{OrgType, PositionPath};
use crate::incentive::evaluation::{
    Comparison, ConditionEvaluator, ConditionVerdict, Observed, RunMode, VerdictBasis,
};
use crate::incentive::matrix::PositionConditionMatrix;
use crate::incentive::metrics::{MetricValue, Metrics};

fn conditions(ids: &[u8]) -> ConditionSet {
    ids.iter()
        .map(|raw| ConditionId::new(*raw).expect("known condition"))
        .collect()
}

#[test]
fn every_condition_gets_exactly_one_verdict() {
    let matrix = PositionConditionMatrix::standard();
    let evaluator = ConditionEvaluator::new(matrix.thresholds(), RunMode::Final);
    let applicable = conditions(&[1, 2, 3, 4, 7]);

    let verdicts = evaluator.evaluate(&passing_metrics(), applicable);

    assert_eq!(verdicts.iter().count(), 10);
    for check in verdicts.iter() {
        let expected = if applicable.contains(check.condition) {
            ConditionVerdict::Pass
        } else {
            ConditionVerdict::NotApplicable
        };
        assert_eq!(check.verdict, expected, "{}", check.condition);
        if !applicable.contains(check.condition) {
            assert_eq!(check.basis, VerdictBasis::Excluded);
        }
    }
}

#[test]
fn line_leader_with_team_streak_fails_at_eighty_percent() {
    let matrix = PositionConditionMatrix::standard();
    let resolution = matrix.resolve(OrgType::Type1, &PositionPath::new("LINE LEADER"));
    assert_eq!(resolution.applicable(), conditions(&[1, 2, 3, 4, 7]));

    let evaluator = ConditionEvaluator::new(matrix.thresholds(), RunMode::Final);
    let metrics = Metrics {
        area_consecutive_failure: MetricValue::Available(true),
        ..passing_metrics()
    };

    let verdicts = evaluator.evaluate(&metrics, resolution.applicable());
    let summary = evaluator.summarize(&verdicts);

    assert_eq!(
        verdicts.verdict(ConditionId::AREA_AQL_STREAK),
        Some(ConditionVerdict::Fail)
    );
    assert_eq!(summary.applicable_count, 5);
    assert_eq!(summary.passed_count, 4);
    assert_eq!(summary.pass_rate, 80.0);
    assert!(!summary.is_eligible());
}

#[test]
fn interim_run_relaxes_unknown_attendance_only() {
    let matrix = PositionConditionMatrix::standard();
    let metrics = Metrics {
        attendance_rate: MetricValue::NotAvailable,
        unapproved_absences: MetricValue::NotAvailable,
        actual_working_days: MetricValue::NotAvailable,
        total_working_days: MetricValue::NotAvailable,
        ..passing_metrics()
    };
    let applicable = conditions(&[1, 2, 3, 4]);

    let interim = ConditionEvaluator::new(matrix.thresholds(), RunMode::Interim);
    let verdicts = interim.evaluate(&metrics, applicable);
    for condition in [ConditionId::ATTENDANCE_RATE, ConditionId::MINIMUM_WORKING_DAYS] {
        let check = verdicts.get(condition).expect("checked");
        assert_eq!(check.verdict, ConditionVerdict::Pass);
        assert_eq!(check.basis, VerdictBasis::InterimRelaxation);
    }
    assert_eq!(
        verdicts.verdict(ConditionId::UNAPPROVED_ABSENCE),
        Some(ConditionVerdict::NotApplicable)
    );
    let summary = interim.summarize(&verdicts);
    assert_eq!((summary.applicable_count, summary.passed_count), (2, 2));

    let final_run = ConditionEvaluator::new(matrix.thresholds(), RunMode::Final);
    let verdicts = final_run.evaluate(&metrics, applicable);
    let check = verdicts.get(ConditionId::ATTENDANCE_RATE).expect("checked");
    assert_eq!(check.verdict, ConditionVerdict::NotApplicable);
    assert_eq!(check.basis, VerdictBasis::MetricUnavailable);
    assert_eq!(verdicts.unavailable().count(), 4);
}

#[test]
fn interim_run_still_fails_measured_attendance() {
    let matrix = PositionConditionMatrix::standard();
    let evaluator = ConditionEvaluator::new(matrix.thresholds(), RunMode::Interim);
    let metrics = Metrics {
        attendance_rate: MetricValue::Available(50.0),
        ..passing_metrics()
    };

    let verdicts = evaluator.evaluate(&metrics, conditions(&[1]));
    assert_eq!(
        verdicts.verdict(ConditionId::ATTENDANCE_RATE),
        Some(ConditionVerdict::Fail)
    );
}

#[test]
fn zero_applicable_conditions_is_vacuously_eligible() {
    let matrix = PositionConditionMatrix::standard();
    let evaluator = ConditionEvaluator::new(matrix.thresholds(), RunMode::Final);

    let verdicts = evaluator.evaluate(&Metrics::unavailable(), ConditionSet::empty());
    let summary = evaluator.summarize(&verdicts);

    assert_eq!(summary.applicable_count, 0);
    assert_eq!(summary.pass_rate, 100.0);
    assert!(summary.is_eligible());
    assert_eq!(verdicts.unavailable().count(), 0);
}

#[test]
fn thresholds_are_inclusive_except_reject_rate() {
    let matrix = PositionConditionMatrix::standard();
    let evaluator = ConditionEvaluator::new(matrix.thresholds(), RunMode::Final);
    let metrics = Metrics {
        attendance_rate: MetricValue::Available(88.0),
        unapproved_absences: MetricValue::Available(2),
        actual_working_days: MetricValue::Available(12),
        area_reject_rate: MetricValue::Available(3.0),
        prs_pass_rate: MetricValue::Available(95.0),
        prs_inspection_qty: MetricValue::Available(100),
        ..passing_metrics()
    };

    let verdicts = evaluator.evaluate(&metrics, ConditionSet::full());

    assert_eq!(verdicts.failed(), conditions(&[8]));
    let check = verdicts.get(ConditionId::AREA_REJECT_RATE).expect("checked");
    assert_eq!(
        check.basis,
        VerdictBasis::Measured {
            observed: Observed::Rate(3.0),
            threshold: Observed::Rate(3.0),
            comparison: Comparison::Below,
        }
    );
}
