//! Two-phase calculation over a whole roster.
//!
//! Phase one resolves, measures and evaluates every employee independently. Phase two settles
//! amounts in supervisory rank order so each averaging role sees its subordinates' final pay.

mod history;
mod report;

pub use history::RunHistory;
pub use report::{EmployeeOutcome, RunReport, RunTotals};

use super::calculator::{IncentiveCalculator, IncentiveResult, PayInputs};
use super::diagnostics::{DataQualityWarning, EvaluationAmbiguity, RunDiagnostics};
use super::domain::{Employee, EmployeeId, ReportingMonth};
use super::evaluation::{ConditionEvaluator, ConditionVerdicts, EligibilitySummary, RunMode};
use super::matrix::{normalize_title, IncentiveRule, PositionConditionMatrix, PositionRule};
use super::metrics::{MetricComputer, MetricValue, Metrics, SourceData};
use super::roster::Roster;
use std::collections::BTreeMap;
use tracing::{info, info_span};

/// Fully loaded inputs for one month.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub roster: Roster,
    pub sources: SourceData,
    pub history: RunHistory,
    /// Findings raised while loading the inputs.
    pub diagnostics: RunDiagnostics,
}

struct Assessment<'r, 'm> {
    employee: &'r Employee,
    rule: &'m PositionRule,
    metrics: Metrics,
    checks: ConditionVerdicts,
    eligibility: EligibilitySummary,
}

pub struct IncentiveRun<'m> {
    matrix: &'m PositionConditionMatrix,
    month: ReportingMonth,
    mode: RunMode,
}

impl<'m> IncentiveRun<'m> {
    pub fn new(matrix: &'m PositionConditionMatrix, month: ReportingMonth, mode: RunMode) -> Self {
        Self {
            matrix,
            month,
            mode,
        }
    }

    pub fn execute(&self, inputs: RunInputs) -> RunReport {
        let RunInputs {
            roster,
            sources,
            history,
            mut diagnostics,
        } = inputs;
        let span = info_span!("incentive_run", month = %self.month, mode = %self.mode);
        let _guard = span.enter();

        let history = self.checked_history(history, &mut diagnostics);
        diagnostics.extend(roster.dangling_managers());

        let computer =
            MetricComputer::new(self.month, self.matrix, &roster, &sources, &mut diagnostics);
        let evaluator = ConditionEvaluator::new(self.matrix.thresholds(), self.mode);

        let assessments: BTreeMap<&EmployeeId, Assessment<'_, 'm>> = roster
            .iter()
            .map(|employee| {
                let assessment = self.assess(employee, &computer, &evaluator, &mut diagnostics);
                (&employee.id, assessment)
            })
            .collect();

        let settled = self.settle(&assessments, &roster, &computer, &history, &mut diagnostics);

        let outcomes: Vec<EmployeeOutcome> = assessments
            .into_values()
            .filter_map(|assessment| {
                let incentive = settled.get(&assessment.employee.id)?.clone();
                Some(EmployeeOutcome {
                    employee: assessment.employee.id.clone(),
                    name: assessment.employee.name.clone(),
                    org_type: assessment.employee.org_type,
                    position: assessment.employee.position.clone(),
                    rule: assessment.rule.key.clone(),
                    metrics: assessment.metrics,
                    checks: assessment.checks,
                    eligibility: assessment.eligibility,
                    incentive,
                })
            })
            .collect();

        let totals = RunTotals::tally(&outcomes);
        info!(
            employees = totals.employees,
            eligible = totals.eligible,
            paid = totals.paid,
            total_amount = totals.total_amount,
            warnings = diagnostics.data_quality.len(),
            ambiguities = diagnostics.ambiguities.len(),
            "incentive run complete"
        );

        RunReport {
            month: self.month,
            mode: self.mode,
            matrix_fingerprint: self.matrix.fingerprint().to_string(),
            outcomes,
            diagnostics,
            totals,
        }
    }

    /// History must describe the month immediately before this run.
    fn checked_history(&self, history: RunHistory, diagnostics: &mut RunDiagnostics) -> RunHistory {
        let expected = self.month.previous();
        match history.month() {
            Some(found) if found != expected => {
                diagnostics.warn(DataQualityWarning::HistoryMonthMismatch { expected, found });
                RunHistory::default()
            }
            _ => history,
        }
    }

    fn assess<'r>(
        &self,
        employee: &'r Employee,
        computer: &MetricComputer<'_>,
        evaluator: &ConditionEvaluator<'_>,
        diagnostics: &mut RunDiagnostics,
    ) -> Assessment<'r, 'm> {
        let _span = info_span!("employee", employee = %employee.id).entered();

        let resolution = self.matrix.resolve(employee.org_type, &employee.position);
        if resolution.is_ambiguous() {
            diagnostics.ambiguity(EvaluationAmbiguity {
                employee: employee.id.clone(),
                org_type: employee.org_type,
                title: normalize_title(employee.position.title()),
                candidates: self
                    .matrix
                    .tied_candidates(employee.org_type, &employee.position),
                chosen: resolution.rule.key.clone(),
            });
        }

        let metrics = computer.compute(employee);
        let checks = evaluator.evaluate(&metrics, resolution.applicable());
        for condition in checks.unavailable() {
            diagnostics.warn(DataQualityWarning::MetricUnavailable {
                employee: employee.id.clone(),
                condition,
            });
        }
        let eligibility = evaluator.summarize(&checks);

        Assessment {
            employee,
            rule: resolution.rule,
            metrics,
            checks,
            eligibility,
        }
    }

    fn settle(
        &self,
        assessments: &BTreeMap<&EmployeeId, Assessment<'_, 'm>>,
        roster: &Roster,
        computer: &MetricComputer<'_>,
        history: &RunHistory,
        diagnostics: &mut RunDiagnostics,
    ) -> BTreeMap<EmployeeId, IncentiveResult> {
        let calculator = IncentiveCalculator::new(self.matrix);

        let mut order: Vec<&Assessment<'_, 'm>> = assessments.values().collect();
        order.sort_by(|a, b| {
            self.matrix
                .supervisory_rank(&a.rule.key)
                .cmp(&self.matrix.supervisory_rank(&b.rule.key))
                .then_with(|| a.employee.id.cmp(&b.employee.id))
        });

        let mut settled: BTreeMap<EmployeeId, IncentiveResult> = BTreeMap::new();
        for assessment in order {
            let employee = assessment.employee;
            let _span = info_span!("employee", employee = %employee.id).entered();

            let area_streak = match &assessment.rule.incentive {
                IncentiveRule::Progressive {
                    area_responsibility: true,
                    ..
                } => {
                    let streak = computer.responsibility_streak(employee);
                    if !streak.is_available() {
                        diagnostics.warn(DataQualityWarning::AreaResponsibilityUnavailable {
                            employee: employee.id.clone(),
                        });
                    }
                    streak
                }
                _ => MetricValue::NotAvailable,
            };

            let subordinate_amounts: Vec<u64> = match &assessment.rule.incentive {
                IncentiveRule::Supervisory {
                    subordinate_position,
                    transitive,
                    ..
                } => roster
                    .subordinates(&employee.id, *transitive)
                    .into_iter()
                    .filter(|subordinate| {
                        assessments
                            .get(&subordinate.id)
                            .is_some_and(|sub| sub.rule.key == *subordinate_position)
                    })
                    .map(|subordinate| {
                        settled
                            .get(&subordinate.id)
                            .map_or(0, |result| result.amount)
                    })
                    .collect(),
                _ => Vec::new(),
            };

            let result = calculator.calculate(
                &assessment.rule.incentive,
                PayInputs {
                    summary: &assessment.eligibility,
                    prior: history.prior(&employee.id),
                    area_streak,
                    subordinate_amounts: &subordinate_amounts,
                },
            );
            settled.insert(employee.id.clone(), result);
        }

        settled
    }
}
