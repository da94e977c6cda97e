use crate::incentive::diagnostics::{DataQualityWarning, SourceKind};
use crate::incentive::domain::{AreaScope, EmployeeId, ReportingMonth};
use crate::incentive::roster::Roster;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AqlResult {
    Pass,
    Fail,
}

/// One AQL inspection outcome attributed to an inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqlRecord {
    pub employee: EmployeeId,
    pub inspected_on: NaiveDate,
    pub result: AqlResult,
    /// Building recorded on the inspection; falls back to the inspector's home building.
    pub building: Option<String>,
}

/// Test and pass counts for one area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaTally {
    pub tests: u64,
    pub passes: u64,
}

impl AreaTally {
    pub fn record(&mut self, result: AqlResult) {
        self.tests = self.tests.saturating_add(1);
        if result == AqlResult::Pass {
            self.passes = self.passes.saturating_add(1);
        }
    }

    /// `(tests - passes) / tests * 100`, undefined for an area with no tests.
    pub fn reject_rate(&self) -> Option<f64> {
        if self.tests == 0 {
            return None;
        }
        let rejects = self.tests.saturating_sub(self.passes);
        Some(rejects as f64 / self.tests as f64 * 100.0)
    }
}

impl Add for AreaTally {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            tests: self.tests.saturating_add(rhs.tests),
            passes: self.passes.saturating_add(rhs.passes),
        }
    }
}

/// Reject rate over several tallies pooled together.
pub fn area_reject_rate(tallies: &[AreaTally]) -> Option<f64> {
    tallies
        .iter()
        .copied()
        .fold(AreaTally::default(), Add::add)
        .reject_rate()
}

/// Monthly FAIL sets plus current-month tallies, built once per run.
#[derive(Debug)]
pub struct AqlHistory {
    month: ReportingMonth,
    covered: BTreeSet<ReportingMonth>,
    fail_sets: BTreeMap<ReportingMonth, BTreeSet<EmployeeId>>,
    failures: BTreeMap<EmployeeId, u32>,
    buildings: BTreeMap<String, AreaTally>,
    factory: AreaTally,
    streak: Option<BTreeSet<EmployeeId>>,
}

impl AqlHistory {
    pub fn build(
        records: &[AqlRecord],
        month: ReportingMonth,
        roster: &Roster,
    ) -> (Self, Vec<DataQualityWarning>) {
        let window = month.trailing_window();
        let mut warnings = Vec::new();
        let mut covered = BTreeSet::new();
        let mut fail_sets: BTreeMap<ReportingMonth, BTreeSet<EmployeeId>> = BTreeMap::new();
        let mut failures: BTreeMap<EmployeeId, u32> = BTreeMap::new();
        let mut buildings: BTreeMap<String, AreaTally> = BTreeMap::new();
        let mut factory = AreaTally::default();
        let mut unknown = BTreeSet::new();

        for record in records {
            let record_month = ReportingMonth::of(record.inspected_on);
            if !window.contains(&record_month) {
                continue;
            }
            covered.insert(record_month);

            if !roster.contains(&record.employee) {
                unknown.insert(record.employee.clone());
            }

            if record.result == AqlResult::Fail {
                fail_sets
                    .entry(record_month)
                    .or_default()
                    .insert(record.employee.clone());
            }

            if record_month != month {
                continue;
            }

            if record.result == AqlResult::Fail {
                *failures.entry(record.employee.clone()).or_default() += 1;
            }

            factory.record(record.result);
            let building = record
                .building
                .as_deref()
                .map(|building| building.trim().to_ascii_uppercase())
                .filter(|building| !building.is_empty())
                .or_else(|| {
                    roster
                        .get(&record.employee)
                        .and_then(|employee| employee.area.home_building())
                        .map(str::to_string)
                });
            if let Some(building) = building {
                buildings.entry(building).or_default().record(record.result);
            }
        }

        warnings.extend(
            unknown
                .into_iter()
                .map(|employee| DataQualityWarning::UnknownEmployee {
                    source: SourceKind::Aql,
                    employee,
                }),
        );

        let missing_months: Vec<ReportingMonth> = window
            .iter()
            .copied()
            .filter(|window_month| !covered.contains(window_month))
            .collect();

        let streak = if missing_months.is_empty() {
            let empty = BTreeSet::new();
            let [oldest, prior, current] =
                window.map(|window_month| fail_sets.get(&window_month).unwrap_or(&empty));
            Some(
                current
                    .iter()
                    .filter(|employee| prior.contains(*employee) && oldest.contains(*employee))
                    .cloned()
                    .collect(),
            )
        } else {
            warnings.push(DataQualityWarning::IncompleteAqlHistory { missing_months });
            None
        };

        (
            Self {
                month,
                covered,
                fail_sets,
                failures,
                buildings,
                factory,
                streak,
            },
            warnings,
        )
    }

    pub fn month(&self) -> ReportingMonth {
        self.month
    }

    pub fn covers(&self, month: ReportingMonth) -> bool {
        self.covered.contains(&month)
    }

    pub fn failed_in(&self, month: ReportingMonth) -> Option<&BTreeSet<EmployeeId>> {
        self.fail_sets.get(&month)
    }

    /// FAIL count for the reporting month.
    pub fn personal_failures(&self, employee: &EmployeeId) -> u32 {
        self.failures.get(employee).copied().unwrap_or(0)
    }

    /// Members of F(m-2) ∩ F(m-1) ∩ F(m); `None` when any month of the window has no data.
    pub fn streak_members(&self) -> Option<&BTreeSet<EmployeeId>> {
        self.streak.as_ref()
    }

    pub fn has_streak(&self, employee: &EmployeeId) -> Option<bool> {
        self.streak.as_ref().map(|members| members.contains(employee))
    }

    pub fn building_tally(&self, building: &str) -> AreaTally {
        self.buildings
            .get(&building.to_ascii_uppercase())
            .copied()
            .unwrap_or_default()
    }

    pub fn factory_tally(&self) -> AreaTally {
        self.factory
    }

    /// Pooled reject rate over the buildings in `scope`; factory-wide for `ALL`.
    pub fn reject_rate_for(&self, scope: &AreaScope) -> Option<f64> {
        match scope {
            AreaScope::All => self.factory.reject_rate(),
            AreaScope::Buildings(buildings) => {
                let tallies: Vec<AreaTally> = buildings
                    .iter()
                    .map(|building| self.building_tally(building))
                    .collect();
                area_reject_rate(&tallies)
            }
            AreaScope::Unassigned => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incentive::domain::{Employee, OrgType, PositionPath};

    fn roster() -> Roster {
        Roster::from_employees([("E1", "B1"), ("E2", "B1"), ("E3", "B2")].into_iter().map(
            |(id, area)| Employee {
                id: EmployeeId::new(id),
                name: id.to_string(),
                org_type: OrgType::Type1,
                position: PositionPath::new("ASSEMBLY INSPECTOR"),
                area: AreaScope::parse(area),
                manager: None,
            },
        ))
    }

    fn record(id: &str, year: i32, month: u32, day: u32, result: AqlResult) -> AqlRecord {
        AqlRecord {
            employee: EmployeeId::new(id),
            inspected_on: NaiveDate::from_ymd_opt(year, month, day).expect("valid"),
            result,
            building: None,
        }
    }

    fn september() -> ReportingMonth {
        ReportingMonth::new(2025, 9).expect("month")
    }

    #[test]
    fn pooled_reject_rate_matches_hand_calculation() {
        let tallies = [
            AreaTally {
                tests: 100,
                passes: 90,
            },
            AreaTally {
                tests: 50,
                passes: 50,
            },
        ];
        let rate = area_reject_rate(&tallies).expect("tests present");
        assert!((rate - 6.666_666_666_666_667).abs() < 1e-9);
        assert_eq!(area_reject_rate(&[]), None);
    }

    #[test]
    fn pooling_large_tallies_does_not_wrap() {
        let busy = AreaTally {
            tests: u64::from(u32::MAX),
            passes: u64::from(u32::MAX),
        };
        let mut failing = AreaTally {
            tests: u64::from(u32::MAX),
            passes: u64::from(u32::MAX) - 1,
        };
        failing.record(AqlResult::Fail);

        let pooled = busy + failing;
        assert_eq!(pooled.tests, 2 * u64::from(u32::MAX) + 1);
        assert_eq!(pooled.passes, 2 * u64::from(u32::MAX) - 1);
        let rate = area_reject_rate(&[busy, failing]).expect("tests present");
        assert!(rate > 0.0 && rate < 1e-6);
    }

    #[test]
    fn streak_requires_failure_in_each_of_three_months() {
        let records = vec![
            record("E1", 2025, 7, 3, AqlResult::Fail),
            record("E1", 2025, 8, 3, AqlResult::Fail),
            record("E1", 2025, 9, 3, AqlResult::Fail),
            record("E2", 2025, 7, 3, AqlResult::Fail),
            record("E2", 2025, 8, 3, AqlResult::Pass),
            record("E2", 2025, 9, 3, AqlResult::Fail),
            record("E3", 2025, 8, 3, AqlResult::Fail),
            record("E3", 2025, 9, 3, AqlResult::Fail),
        ];
        let (history, warnings) = AqlHistory::build(&records, september(), &roster());
        assert!(warnings.is_empty());
        assert_eq!(history.has_streak(&EmployeeId::new("E1")), Some(true));
        assert_eq!(history.has_streak(&EmployeeId::new("E2")), Some(false));
        assert_eq!(history.has_streak(&EmployeeId::new("E3")), Some(false));
        assert_eq!(history.personal_failures(&EmployeeId::new("E2")), 1);
    }

    #[test]
    fn missing_month_makes_streak_unavailable() {
        let records = vec![
            record("E1", 2025, 8, 3, AqlResult::Fail),
            record("E1", 2025, 9, 3, AqlResult::Fail),
        ];
        let (history, warnings) = AqlHistory::build(&records, september(), &roster());
        assert!(history.streak_members().is_none());
        assert_eq!(
            warnings,
            vec![DataQualityWarning::IncompleteAqlHistory {
                missing_months: vec![ReportingMonth::new(2025, 7).expect("month")],
            }]
        );
    }

    #[test]
    fn tallies_attribute_to_record_or_home_building() {
        let mut tagged = record("E3", 2025, 9, 4, AqlResult::Fail);
        tagged.building = Some("b1".to_string());
        let records = vec![
            record("E1", 2025, 9, 3, AqlResult::Pass),
            record("E2", 2025, 9, 3, AqlResult::Pass),
            record("E3", 2025, 9, 3, AqlResult::Pass),
            tagged,
            record("E1", 2025, 8, 3, AqlResult::Fail),
        ];
        let (history, _) = AqlHistory::build(&records, september(), &roster());

        assert_eq!(
            history.building_tally("B1"),
            AreaTally {
                tests: 3,
                passes: 2
            }
        );
        assert_eq!(
            history.building_tally("B2"),
            AreaTally {
                tests: 1,
                passes: 1
            }
        );
        assert_eq!(history.factory_tally().tests, 4);
        assert_eq!(history.reject_rate_for(&AreaScope::All), Some(25.0));
        assert_eq!(history.reject_rate_for(&AreaScope::parse("B2")), Some(0.0));
        assert_eq!(history.reject_rate_for(&AreaScope::Unassigned), None);
    }
}
