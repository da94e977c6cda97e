use super::headers::canonical_header;
use crate::incentive::{AqlResult, AttendanceStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::debug;

/// Rows of one CSV source, or the first required column it lacks.
pub(crate) enum Table<T> {
    Rows { records: Vec<T>, invalid: usize },
    MissingColumn(String),
}

pub(crate) fn read_table<R: Read, T: DeserializeOwned>(
    reader: R,
    required: &[&str],
) -> Result<Table<T>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: csv::StringRecord = csv_reader.headers()?.iter().map(canonical_header).collect();
    if let Some(missing) = required
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Ok(Table::MissingColumn(missing.to_string()));
    }

    let mut records = Vec::new();
    let mut invalid = 0usize;
    for row in csv_reader.records() {
        let row = row?;
        match row.deserialize::<T>(Some(&headers)) {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!(%err, "skipping unreadable row");
                invalid += 1;
            }
        }
    }

    Ok(Table::Rows { records, invalid })
}

#[derive(Debug, Deserialize)]
pub(crate) struct RosterRow {
    pub(crate) employee_no: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) full_name: Option<String>,
    #[serde(rename = "type")]
    pub(crate) org_type: String,
    pub(crate) position_1st: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) position_2nd: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) position_3rd: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) area: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) manager_no: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttendanceRow {
    pub(crate) employee_no: String,
    pub(crate) work_date: String,
    pub(crate) status: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) reason_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AqlRow {
    pub(crate) employee_no: String,
    pub(crate) inspection_date: String,
    pub(crate) result: String,
    #[serde(rename = "area", default, deserialize_with = "empty_string_as_none")]
    pub(crate) building: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PrsRow {
    pub(crate) employee_no: String,
    pub(crate) inspection_date: String,
    pub(crate) pass_qty: String,
    pub(crate) total_qty: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"]
        .into_iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

pub(crate) fn parse_status(value: &str) -> Option<AttendanceStatus> {
    match value.trim().to_ascii_uppercase().as_str() {
        "PRESENT" | "P" | "WORK" | "WORKED" | "1" => Some(AttendanceStatus::Present),
        "ABSENT" | "A" | "ABSENCE" | "0" => Some(AttendanceStatus::Absent),
        _ => None,
    }
}

pub(crate) fn parse_result(value: &str) -> Option<AqlResult> {
    match value.trim().to_ascii_uppercase().as_str() {
        "PASS" | "P" | "OK" => Some(AqlResult::Pass),
        "FAIL" | "F" | "NG" | "REJECT" => Some(AqlResult::Fail),
        _ => None,
    }
}

/// Whole, non-negative quantity; spreadsheet exports often write `120.0`.
pub(crate) fn parse_quantity(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if let Ok(quantity) = trimmed.parse::<u32>() {
        return Some(quantity);
    }
    let float = trimmed.parse::<f64>().ok()?;
    if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= f64::from(u32::MAX) {
        Some(float as u32)
    } else {
        None
    }
}
