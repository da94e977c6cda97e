use chrono::NaiveDate;

use crate::incentive::calculator::PriorResult;
use crate::incentive::domain::{
    AreaScope, Employee, EmployeeId, OrgType, PositionPath, ReportingMonth,
};
use crate::incentive::metrics::{
    AqlRecord, AqlResult, AttendanceRecord, AttendanceStatus, MetricValue, Metrics, PrsRecord,
    SourceData,
};
use crate::incentive::roster::Roster;
use crate::incentive::run::{RunHistory, RunInputs};

pub(super) fn september() -> ReportingMonth {
    ReportingMonth::new(2025, 9).expect("valid month")
}

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

pub(super) fn id(raw: &str) -> EmployeeId {
    EmployeeId::new(raw)
}

/// Metrics that clear every standard threshold.
pub(super) fn passing_metrics() -> Metrics {
    Metrics {
        attendance_rate: MetricValue::Available(100.0),
        unapproved_absences: MetricValue::Available(0),
        actual_working_days: MetricValue::Available(20),
        total_working_days: MetricValue::Available(20),
        personal_aql_failures: MetricValue::Available(0),
        consecutive_aql_failure: MetricValue::Available(false),
        area_consecutive_failure: MetricValue::Available(false),
        area_reject_rate: MetricValue::Available(1.0),
        prs_pass_rate: MetricValue::Available(98.0),
        prs_inspection_qty: MetricValue::Available(150),
    }
}

pub(super) fn employee(
    raw_id: &str,
    position: PositionPath,
    area: &str,
    manager: Option<&str>,
) -> Employee {
    Employee {
        id: id(raw_id),
        name: format!("Employee {raw_id}"),
        org_type: OrgType::Type1,
        position,
        area: AreaScope::parse(area),
        manager: manager.map(id),
    }
}

/// S1 supervises line leaders L1 (B1) and L2 (B2).
/// L1 leads inspectors I1 and I2; L2 leads I3, who has failed AQL three months running.
/// A1 is an audit & training specialist responsible for B2.
pub(super) fn factory_roster() -> Roster {
    Roster::from_employees([
        employee("S1", PositionPath::new("(V) SUPERVISOR"), "ALL", None),
        employee("L1", PositionPath::new("LINE LEADER"), "B1", Some("S1")),
        employee("L2", PositionPath::new("LINE LEADER"), "B2", Some("S1")),
        employee("I1", PositionPath::new("ASSEMBLY INSPECTOR"), "B1", Some("L1")),
        employee("I2", PositionPath::new("ASSEMBLY INSPECTOR"), "B1", Some("L1")),
        employee("I3", PositionPath::new("ASSEMBLY INSPECTOR"), "B2", Some("L2")),
        employee(
            "A1",
            PositionPath::new("ASSEMBLY INSPECTOR").with_second("AUDIT & TRAINING TEAM"),
            "B2",
            None,
        ),
    ])
}

pub(super) fn full_attendance(roster: &Roster) -> Vec<AttendanceRecord> {
    roster
        .iter()
        .flat_map(|employee| {
            (1..=20).map(move |day| AttendanceRecord {
                employee: employee.id.clone(),
                work_date: date(9, day),
                status: AttendanceStatus::Present,
                reason_code: None,
            })
        })
        .collect()
}

fn aql(raw_id: &str, month: u32, day: u32, result: AqlResult, building: Option<&str>) -> AqlRecord {
    AqlRecord {
        employee: id(raw_id),
        inspected_on: date(month, day),
        result,
        building: building.map(str::to_string),
    }
}

/// I3 fails in July, August and September; B2 otherwise passes, keeping its reject rate at 2%.
pub(super) fn aql_history() -> Vec<AqlRecord> {
    let mut records = vec![
        aql("I1", 7, 10, AqlResult::Pass, None),
        aql("I1", 8, 10, AqlResult::Pass, None),
        aql("I1", 9, 10, AqlResult::Pass, None),
        aql("I3", 7, 11, AqlResult::Fail, None),
        aql("I3", 8, 11, AqlResult::Fail, None),
        aql("I3", 9, 11, AqlResult::Fail, None),
    ];
    records.extend((0..49).map(|n| aql("I1", 9, 1 + n % 20, AqlResult::Pass, Some("B2"))));
    records
}

pub(super) fn prs_totals() -> Vec<PrsRecord> {
    ["I1", "I2", "I3"]
        .into_iter()
        .map(|raw_id| PrsRecord {
            employee: id(raw_id),
            inspected_on: date(9, 15),
            pass_qty: 147,
            total_qty: 150,
        })
        .collect()
}

/// I1 has qualified for the two previous months.
pub(super) fn august_history() -> RunHistory {
    RunHistory::new(ReportingMonth::new(2025, 8).expect("valid month")).with_prior(
        id("I1"),
        PriorResult {
            amount: 250_000,
            continuous_months: 2,
        },
    )
}

pub(super) fn factory_inputs() -> RunInputs {
    let roster = factory_roster();
    let attendance = full_attendance(&roster);
    RunInputs {
        roster,
        sources: SourceData {
            attendance: Some(attendance),
            aql: Some(aql_history()),
            prs: Some(prs_totals()),
        },
        history: august_history(),
        diagnostics: Default::default(),
    }
}
