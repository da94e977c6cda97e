//! CSV loaders for the roster and the three month-scoped feeds.
//!
//! Only an unreadable roster aborts loading. A missing feed file or column is recorded as a
//! data-quality warning and leaves that feed absent, so its metrics become NOT_AVAILABLE.

mod headers;
mod parser;

use crate::incentive::{
    AqlRecord, AreaScope, AttendanceRecord, DataQualityWarning, Employee, EmployeeId, OrgType,
    PositionPath, PrsRecord, Roster, RunDiagnostics, RunHistory, RunInputs, SourceData,
    SourceKind,
};
use parser::{AqlRow, AttendanceRow, PrsRow, RosterRow, Table};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub enum SourceError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingRosterColumn(String),
    History(serde_json::Error),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io(err) => write!(f, "failed to read source file: {}", err),
            SourceError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            SourceError::MissingRosterColumn(column) => {
                write!(f, "roster is missing required column '{}'", column)
            }
            SourceError::History(err) => write!(f, "unreadable previous run report: {}", err),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(err) => Some(err),
            SourceError::Csv(err) => Some(err),
            SourceError::MissingRosterColumn(_) => None,
            SourceError::History(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// File locations for one run; feeds and history are optional.
#[derive(Debug, Clone, Default)]
pub struct SourcePaths {
    pub roster: PathBuf,
    pub attendance: Option<PathBuf>,
    pub aql: Option<PathBuf>,
    pub prs: Option<PathBuf>,
    pub previous: Option<PathBuf>,
}

pub fn load_inputs(paths: &SourcePaths) -> Result<RunInputs, SourceError> {
    let mut diagnostics = RunDiagnostics::default();

    let roster = read_roster(File::open(&paths.roster)?, &mut diagnostics)?;

    let attendance = match open_optional(paths.attendance.as_deref())? {
        Some(file) => read_attendance(file, &mut diagnostics)?,
        None => None,
    };
    let aql = match open_optional(paths.aql.as_deref())? {
        Some(file) => read_aql(file, &mut diagnostics)?,
        None => None,
    };
    let prs = match open_optional(paths.prs.as_deref())? {
        Some(file) => read_prs(file, &mut diagnostics)?,
        None => None,
    };

    let history = match paths.previous.as_deref() {
        None => RunHistory::default(),
        Some(path) => match open_optional(Some(path))? {
            Some(file) => RunHistory::from_reader(file).map_err(SourceError::History)?,
            None => {
                diagnostics.warn(DataQualityWarning::MissingSource {
                    source: SourceKind::PreviousRun,
                });
                RunHistory::default()
            }
        },
    };

    info!(
        employees = roster.len(),
        attendance = attendance.as_ref().map_or(0, Vec::len),
        aql = aql.as_ref().map_or(0, Vec::len),
        prs = prs.as_ref().map_or(0, Vec::len),
        history = !history.is_empty(),
        "sources loaded"
    );

    Ok(RunInputs {
        roster,
        sources: SourceData {
            attendance,
            aql,
            prs,
        },
        history,
        diagnostics,
    })
}

/// `None` for an unset path or a file that does not exist.
fn open_optional(path: Option<&Path>) -> Result<Option<File>, SourceError> {
    let Some(path) = path else {
        return Ok(None);
    };
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn read_roster<R: Read>(
    reader: R,
    diagnostics: &mut RunDiagnostics,
) -> Result<Roster, SourceError> {
    let required = ["employee_no", "type", "position_1st"];
    let (rows, invalid) = match parser::read_table::<_, RosterRow>(reader, &required)? {
        Table::Rows { records, invalid } => (records, invalid),
        Table::MissingColumn(column) => return Err(SourceError::MissingRosterColumn(column)),
    };
    if invalid > 0 {
        diagnostics.warn(DataQualityWarning::InvalidRows {
            source: SourceKind::Roster,
            rows: invalid,
        });
    }

    let mut employees = Vec::with_capacity(rows.len());
    for row in rows {
        let id = EmployeeId::new(&row.employee_no);
        if id.as_str().is_empty() {
            diagnostics.warn(DataQualityWarning::InvalidRows {
                source: SourceKind::Roster,
                rows: 1,
            });
            continue;
        }
        let Some(org_type) = OrgType::parse(&row.org_type) else {
            diagnostics.warn(DataQualityWarning::UnknownOrgType {
                employee: id,
                value: row.org_type,
            });
            continue;
        };

        let mut position = PositionPath::new(row.position_1st);
        if let Some(second) = row.position_2nd {
            position = position.with_second(second);
        }
        if let Some(third) = row.position_3rd {
            position = position.with_third(third);
        }

        employees.push(Employee {
            name: row.full_name.unwrap_or_else(|| id.to_string()),
            id,
            org_type,
            position,
            area: AreaScope::parse(row.area.as_deref().unwrap_or_default()),
            manager: row.manager_no.as_deref().map(EmployeeId::new),
        });
    }

    Ok(Roster::from_employees(employees))
}

pub fn read_attendance<R: Read>(
    reader: R,
    diagnostics: &mut RunDiagnostics,
) -> Result<Option<Vec<AttendanceRecord>>, SourceError> {
    read_feed(
        reader,
        SourceKind::Attendance,
        &["employee_no", "work_date", "status"],
        diagnostics,
        |row: AttendanceRow| {
            Some(AttendanceRecord {
                employee: EmployeeId::new(&row.employee_no),
                work_date: parser::parse_date(&row.work_date)?,
                status: parser::parse_status(&row.status)?,
                reason_code: row.reason_code,
            })
        },
    )
}

pub fn read_aql<R: Read>(
    reader: R,
    diagnostics: &mut RunDiagnostics,
) -> Result<Option<Vec<AqlRecord>>, SourceError> {
    read_feed(
        reader,
        SourceKind::Aql,
        &["employee_no", "inspection_date", "result"],
        diagnostics,
        |row: AqlRow| {
            Some(AqlRecord {
                employee: EmployeeId::new(&row.employee_no),
                inspected_on: parser::parse_date(&row.inspection_date)?,
                result: parser::parse_result(&row.result)?,
                building: row.building,
            })
        },
    )
}

pub fn read_prs<R: Read>(
    reader: R,
    diagnostics: &mut RunDiagnostics,
) -> Result<Option<Vec<PrsRecord>>, SourceError> {
    read_feed(
        reader,
        SourceKind::Prs,
        &["employee_no", "inspection_date", "pass_qty", "total_qty"],
        diagnostics,
        |row: PrsRow| {
            let pass_qty = parser::parse_quantity(&row.pass_qty)?;
            let total_qty = parser::parse_quantity(&row.total_qty)?;
            if pass_qty > total_qty {
                return None;
            }
            Some(PrsRecord {
                employee: EmployeeId::new(&row.employee_no),
                inspected_on: parser::parse_date(&row.inspection_date)?,
                pass_qty,
                total_qty,
            })
        },
    )
}

fn read_feed<R, Row, T>(
    reader: R,
    source: SourceKind,
    required: &[&str],
    diagnostics: &mut RunDiagnostics,
    convert: impl Fn(Row) -> Option<T>,
) -> Result<Option<Vec<T>>, SourceError>
where
    R: Read,
    Row: DeserializeOwned,
{
    let (rows, mut invalid) = match parser::read_table::<_, Row>(reader, required)? {
        Table::Rows { records, invalid } => (records, invalid),
        Table::MissingColumn(column) => {
            diagnostics.warn(DataQualityWarning::MissingColumn { source, column });
            return Ok(None);
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match convert(row) {
            Some(record) => records.push(record),
            None => invalid += 1,
        }
    }

    if invalid > 0 {
        diagnostics.warn(DataQualityWarning::InvalidRows {
            source,
            rows: invalid,
        });
    }

    Ok(Some(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incentive::{AqlResult, AttendanceStatus};
    use chrono::NaiveDate;
    use std::io::Cursor;

    const ROSTER: &str = "\u{feff}Employee No,Full Name,TYPE,\
                          QIP POSITION 1ST  NAME,QIP POSITION 2ND  NAME,Building,Boss ID\n\
E100,Lan Nguyen,TYPE-1,ASSEMBLY INSPECTOR,,B1,E200\n\
E200,Minh Tran,TYPE-1,LINE LEADER,,B1,\n\
E300,Hoa Le,TYPE-1,ASSEMBLY INSPECTOR,AUDIT & TRAINING TEAM,ALL,\n\
E400,Unknown Tier,TYPE-9,PACKER,,B2,\n";

    #[test]
    fn roster_rows_map_to_employees() {
        let mut diagnostics = RunDiagnostics::default();
        let roster = read_roster(Cursor::new(ROSTER), &mut diagnostics).expect("roster parses");

        assert_eq!(roster.len(), 3);
        let inspector = roster.get(&EmployeeId::new("E100")).expect("present");
        assert_eq!(inspector.name, "Lan Nguyen");
        assert_eq!(inspector.org_type, OrgType::Type1);
        assert_eq!(inspector.area, AreaScope::parse("B1"));
        assert_eq!(inspector.manager, Some(EmployeeId::new("E200")));

        let auditor = roster.get(&EmployeeId::new("E300")).expect("present");
        assert_eq!(auditor.position.title(), "ASSEMBLY INSPECTOR");
        assert_eq!(auditor.position.second.as_deref(), Some("AUDIT & TRAINING TEAM"));
        assert_eq!(auditor.area, AreaScope::All);

        assert_eq!(
            diagnostics.data_quality,
            vec![DataQualityWarning::UnknownOrgType {
                employee: EmployeeId::new("E400"),
                value: "TYPE-9".to_string(),
            }]
        );
    }

    #[test]
    fn roster_without_type_column_is_fatal() {
        let mut diagnostics = RunDiagnostics::default();
        let csv = "Employee No,Position\nE1,LINE LEADER\n";
        match read_roster(Cursor::new(csv), &mut diagnostics) {
            Err(SourceError::MissingRosterColumn(column)) => assert_eq!(column, "type"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn feed_missing_a_column_is_absent_with_warning() {
        let mut diagnostics = RunDiagnostics::default();
        let csv = "Employee No,Inspection Date\nE100,2025-09-02\n";
        let records = read_aql(Cursor::new(csv), &mut diagnostics).expect("io ok");

        assert!(records.is_none());
        assert_eq!(
            diagnostics.data_quality,
            vec![DataQualityWarning::MissingColumn {
                source: SourceKind::Aql,
                column: "result".to_string(),
            }]
        );
    }

    #[test]
    fn unreadable_rows_are_counted_not_fatal() {
        let mut diagnostics = RunDiagnostics::default();
        let csv = "employee_no,work_date,status,reason_code\n\
E100,2025-09-01,PRESENT,\n\
E100,2025-09-02,ABSENT,AR1\n\
E100,not-a-date,PRESENT,\n\
E100,2025-09-03,ON BREAK,\n";
        let records = read_attendance(Cursor::new(csv), &mut diagnostics)
            .expect("io ok")
            .expect("columns present");

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].status, AttendanceStatus::Absent);
        assert_eq!(records[1].reason_code.as_deref(), Some("AR1"));
        assert_eq!(
            records[0].work_date,
            NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid")
        );
        assert_eq!(
            diagnostics.data_quality,
            vec![DataQualityWarning::InvalidRows {
                source: SourceKind::Attendance,
                rows: 2,
            }]
        );
    }

    #[test]
    fn prs_rows_with_more_passes_than_inspections_are_rejected() {
        let mut diagnostics = RunDiagnostics::default();
        let csv = "Employee No,Inspection Date,Pass Qty,Total Qty\n\
E100,2025-09-05,98,100\n\
E100,2025-09-06,120,100\n";
        let records = read_prs(Cursor::new(csv), &mut diagnostics)
            .expect("io ok")
            .expect("columns present");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_qty, 100);
        assert_eq!(diagnostics.data_quality.len(), 1);
    }

    #[test]
    fn aql_results_accept_short_codes() {
        let mut diagnostics = RunDiagnostics::default();
        let csv = "employee_no,inspection_date,result,building\n\
                   E100,2025-09-05,NG,b2\n\
                   E100,2025-09-06,OK,\n";
        let records = read_aql(Cursor::new(csv), &mut diagnostics)
            .expect("io ok")
            .expect("columns present");
        assert_eq!(records[0].result, AqlResult::Fail);
        assert_eq!(records[0].building.as_deref(), Some("b2"));
        assert_eq!(records[1].result, AqlResult::Pass);
        assert_eq!(records[1].building, None);
    }
}
