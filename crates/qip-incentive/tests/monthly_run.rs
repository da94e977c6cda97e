use qip_incentive::incentive::{
    AmountBasis, ConditionId, ConditionVerdict, DataQualityWarning, EmployeeId, IncentiveRun,
    PositionConditionMatrix, ReportingMonth, RunDiagnostics, RunHistory, RunInputs, RunMode,
    RunReport, SourceData, SourceKind, VerdictBasis,
};
use qip_incentive::sources::{read_aql, read_attendance, read_prs, read_roster};

const ROSTER: &str = "Employee No,Full Name,TYPE,QIP POSITION 1ST  NAME,Building,Boss ID
E100,Lan Nguyen,TYPE-1,ASSEMBLY INSPECTOR,B1,E200
E200,Minh Tran,TYPE-1,LINE LEADER,B1,
E300,Hoa Le,TYPE-1,ASSEMBLY INSPECTOR,B1,E200
";

/// Twenty working days; E300 misses the last three without approval.
fn attendance_csv(month: u32) -> String {
    let mut csv = String::from("Employee No,Date,Status,Reason\n");
    for employee in ["E100", "E200", "E300"] {
        for day in 1..=20 {
            if employee == "E300" && day > 17 {
                csv.push_str(&format!("{employee},2025-{month:02}-{day:02},ABSENT,AR1\n"));
            } else {
                csv.push_str(&format!("{employee},2025-{month:02}-{day:02},PRESENT,\n"));
            }
        }
    }
    csv
}

/// Clean three-month AQL window ending at `month`.
fn aql_csv(month: u32) -> String {
    let mut csv = String::from("Inspector No,Inspection Date,Result,Building\n");
    for window_month in month - 2..=month {
        csv.push_str(&format!("E100,2025-{window_month:02}-10,PASS,\n"));
        csv.push_str(&format!("E300,2025-{window_month:02}-11,PASS,B1\n"));
    }
    csv
}

/// One stale row from the previous month leaks into the export.
fn prs_csv(month: u32) -> String {
    format!(
        "Employee No,Inspection Date,Pass Qty,Validation Qty
E100,2025-{month:02}-05,98,100
E300,2025-{month:02}-06,100,100
E100,2025-{previous:02}-28,10,40
",
        previous = month - 1
    )
}

fn inputs(month: u32, history: RunHistory) -> RunInputs {
    let mut diagnostics = RunDiagnostics::default();
    let roster = read_roster(ROSTER.as_bytes(), &mut diagnostics).expect("roster parses");
    let attendance = read_attendance(attendance_csv(month).as_bytes(), &mut diagnostics)
        .expect("attendance parses");
    let aql = read_aql(aql_csv(month).as_bytes(), &mut diagnostics).expect("aql parses");
    let prs = read_prs(prs_csv(month).as_bytes(), &mut diagnostics).expect("prs parses");

    RunInputs {
        roster,
        sources: SourceData {
            attendance,
            aql,
            prs,
        },
        history,
        diagnostics,
    }
}

fn month(raw: &str) -> ReportingMonth {
    ReportingMonth::parse(raw).expect("valid month")
}

fn execute(raw_month: &str, inputs: RunInputs) -> RunReport {
    let matrix = PositionConditionMatrix::standard();
    IncentiveRun::new(&matrix, month(raw_month), RunMode::Final).execute(inputs)
}

fn amount(report: &RunReport, id: &str) -> u64 {
    report
        .outcome(&EmployeeId::new(id))
        .expect("employee in report")
        .incentive
        .amount
}

#[test]
fn csv_exports_produce_a_complete_run_report() {
    let report = execute("2025-09", inputs(9, RunHistory::default()));

    assert_eq!(amount(&report, "E100"), 150_000);
    assert_eq!(amount(&report, "E300"), 0);
    assert_eq!(amount(&report, "E200"), 225_000);

    let absentee = report
        .outcome(&EmployeeId::new("E300"))
        .expect("employee in report");
    assert_eq!(absentee.metrics.unapproved_absences.value(), Some(3));
    assert_eq!(
        absentee.checks.verdict(ConditionId::UNAPPROVED_ABSENCE),
        Some(ConditionVerdict::Fail)
    );
    assert_eq!(absentee.incentive.basis, AmountBasis::Ineligible);

    let ids: Vec<&str> = report
        .outcomes
        .iter()
        .map(|outcome| outcome.employee.as_str())
        .collect();
    assert_eq!(ids, vec!["E100", "E200", "E300"]);
    assert_eq!(report.totals.paid, 2);
    assert_eq!(report.totals.total_amount, 375_000);
    assert_eq!(
        report.diagnostics.data_quality,
        vec![DataQualityWarning::OutOfMonthRecords {
            source: SourceKind::Prs,
            month: month("2025-09"),
            dropped: 1,
        }]
    );
    assert_eq!(report.file_name(), "qip-incentive-2025-09.json");
}

#[test]
fn previous_report_carries_progression_into_next_month() {
    let september = execute("2025-09", inputs(9, RunHistory::default()));
    let json = september.to_json_pretty().expect("report serializes");
    let history = RunHistory::from_reader(json.as_bytes()).expect("history parses");

    let october = execute("2025-10", inputs(10, history));

    let inspector = october
        .outcome(&EmployeeId::new("E100"))
        .expect("employee in report");
    assert_eq!(inspector.incentive.amount, 250_000);
    assert_eq!(inspector.incentive.previous_amount, 150_000);
    assert_eq!(inspector.incentive.continuous_months, 2);
    assert_eq!(amount(&october, "E200"), 375_000);
    assert_eq!(
        october.outcome(&EmployeeId::new("E300")).expect("present").incentive.continuous_months,
        0
    );
}

#[test]
fn missing_prs_column_degrades_to_unavailable_metrics() {
    let mut run_inputs = inputs(9, RunHistory::default());
    let mut diagnostics = RunDiagnostics::default();
    let prs = read_prs(
        "Employee No,Inspection Date,Validation Qty\nE100,2025-09-05,100\n".as_bytes(),
        &mut diagnostics,
    )
    .expect("prs parses");
    assert!(prs.is_none());
    run_inputs.sources.prs = prs;
    run_inputs.diagnostics = diagnostics;

    let report = execute("2025-09", run_inputs);

    assert!(report
        .diagnostics
        .data_quality
        .contains(&DataQualityWarning::MissingColumn {
            source: SourceKind::Prs,
            column: "pass_qty".to_string(),
        }));
    assert!(report
        .diagnostics
        .data_quality
        .contains(&DataQualityWarning::MissingSource {
            source: SourceKind::Prs,
        }));

    let inspector = report
        .outcome(&EmployeeId::new("E100"))
        .expect("employee in report");
    let check = inspector
        .checks
        .get(ConditionId::PRS_PASS_RATE)
        .expect("condition checked");
    assert_eq!(check.verdict, ConditionVerdict::NotApplicable);
    assert_eq!(check.basis, VerdictBasis::MetricUnavailable);
    assert!(report
        .diagnostics
        .data_quality
        .contains(&DataQualityWarning::MetricUnavailable {
            employee: EmployeeId::new("E100"),
            condition: ConditionId::PRS_INSPECTION_QTY,
        }));
}

#[test]
fn loaded_matrix_document_replaces_the_standard_thresholds() {
    let mut document = PositionConditionMatrix::standard().document().clone();
    document.thresholds.min_prs_pass_rate = 99.0;
    let json = serde_json::to_string(&document).expect("document serializes");
    let matrix = PositionConditionMatrix::from_reader(json.as_bytes()).expect("matrix loads");

    let report = IncentiveRun::new(&matrix, month("2025-09"), RunMode::Final)
        .execute(inputs(9, RunHistory::default()));

    assert_eq!(amount(&report, "E100"), 0);
    assert_eq!(amount(&report, "E200"), 0);
    assert_ne!(
        report.matrix_fingerprint,
        PositionConditionMatrix::standard().fingerprint()
    );
}
