use super::MetricValue;
use crate::incentive::diagnostics::{DataQualityWarning, SourceKind};
use crate::incentive::domain::{EmployeeId, ReportingMonth};
use crate::incentive::roster::Roster;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Reason-code policy for attendance; part of the matrix document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePolicy {
    /// Absences counted against condition 2.
    pub unapproved_reason_codes: Vec<String>,
    /// Leave categories removed from both sides of the attendance ratio.
    pub exempt_reason_codes: Vec<String>,
}

impl AttendancePolicy {
    pub fn is_unapproved(&self, code: &str) -> bool {
        matches_code(&self.unapproved_reason_codes, code)
    }

    pub fn is_exempt(&self, code: &str) -> bool {
        matches_code(&self.exempt_reason_codes, code)
    }
}

fn matches_code(codes: &[String], code: &str) -> bool {
    let code = code.trim();
    !code.is_empty() && codes.iter().any(|known| known.eq_ignore_ascii_case(code))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One employee-day from the attendance feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee: EmployeeId,
    pub work_date: NaiveDate,
    pub status: AttendanceStatus,
    pub reason_code: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total_working_days: u32,
    pub actual_working_days: u32,
    pub unapproved_absences: u32,
    pub exempt_days: u32,
}

impl AttendanceSummary {
    pub fn attendance_rate(&self) -> MetricValue<f64> {
        if self.total_working_days == 0 {
            return MetricValue::NotAvailable;
        }
        MetricValue::Available(
            f64::from(self.actual_working_days) / f64::from(self.total_working_days) * 100.0,
        )
    }
}

#[derive(Debug, Default)]
struct DayBook {
    present: BTreeSet<NaiveDate>,
    unapproved: BTreeSet<NaiveDate>,
    exempt: BTreeSet<NaiveDate>,
}

/// Month-scoped attendance indexed by employee.
#[derive(Debug)]
pub struct AttendanceLedger {
    calendar: BTreeSet<NaiveDate>,
    books: BTreeMap<EmployeeId, DayBook>,
}

impl AttendanceLedger {
    pub fn build(
        records: &[AttendanceRecord],
        month: ReportingMonth,
        policy: &AttendancePolicy,
        roster: &Roster,
    ) -> (Self, Vec<DataQualityWarning>) {
        let mut warnings = Vec::new();
        let mut calendar = BTreeSet::new();
        let mut books: BTreeMap<EmployeeId, DayBook> = BTreeMap::new();
        let mut unknown = BTreeSet::new();
        let mut dropped = 0usize;

        for record in records {
            if !month.contains(record.work_date) {
                dropped += 1;
                continue;
            }

            calendar.insert(record.work_date);
            if !roster.contains(&record.employee) {
                unknown.insert(record.employee.clone());
                continue;
            }

            let book = books.entry(record.employee.clone()).or_default();
            let code = record.reason_code.as_deref().unwrap_or_default();
            if policy.is_exempt(code) {
                book.exempt.insert(record.work_date);
                continue;
            }

            match record.status {
                AttendanceStatus::Present => {
                    book.present.insert(record.work_date);
                }
                AttendanceStatus::Absent => {
                    if policy.is_unapproved(code) {
                        book.unapproved.insert(record.work_date);
                    }
                }
            }
        }

        if dropped > 0 {
            warnings.push(DataQualityWarning::OutOfMonthRecords {
                source: SourceKind::Attendance,
                month,
                dropped,
            });
        }
        warnings.extend(
            unknown
                .into_iter()
                .map(|employee| DataQualityWarning::UnknownEmployee {
                    source: SourceKind::Attendance,
                    employee,
                }),
        );

        (Self { calendar, books }, warnings)
    }

    /// Company working days observed in the feed for the month.
    pub fn calendar_days(&self) -> usize {
        self.calendar.len()
    }

    pub fn summary(&self, employee: &EmployeeId) -> AttendanceSummary {
        let calendar_days = self.calendar.len() as u32;
        let Some(book) = self.books.get(employee) else {
            return AttendanceSummary {
                total_working_days: calendar_days,
                ..AttendanceSummary::default()
            };
        };

        let exempt_days = book.exempt.len() as u32;
        AttendanceSummary {
            total_working_days: calendar_days.saturating_sub(exempt_days),
            actual_working_days: book.present.difference(&book.exempt).count() as u32,
            unapproved_absences: book
                .unapproved
                .iter()
                .filter(|day| !book.exempt.contains(*day) && !book.present.contains(*day))
                .count() as u32,
            exempt_days,
        }
    }
}
