use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Employee number as printed on the HR roster.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Organizational TYPE (management tier) that selects the rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrgType {
    #[serde(rename = "TYPE-1")]
    Type1,
    #[serde(rename = "TYPE-2")]
    Type2,
    #[serde(rename = "TYPE-3")]
    Type3,
}

impl OrgType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Type1, Self::Type2, Self::Type3]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Type1 => "TYPE-1",
            Self::Type2 => "TYPE-2",
            Self::Type3 => "TYPE-3",
        }
    }

    /// Accepts `TYPE-1`, `type 1`, `TYPE1` and bare `1`.
    pub fn parse(raw: &str) -> Option<Self> {
        let compact: String = raw
            .chars()
            .filter(|ch| !ch.is_whitespace() && *ch != '-' && *ch != '_')
            .collect::<String>()
            .to_ascii_uppercase();
        let digit = compact.strip_prefix("TYPE").unwrap_or(&compact);
        match digit {
            "1" => Some(Self::Type1),
            "2" => Some(Self::Type2),
            "3" => Some(Self::Type3),
            _ => None,
        }
    }
}

impl fmt::Display for OrgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a reporting month (expected YYYY-MM)")]
pub struct MonthParseError(pub String);

/// Calendar month a calculation run reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportingMonth {
    year: i32,
    month: u32,
}

impl ReportingMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, MonthParseError> {
        let trimmed = raw.trim();
        let (year, month) = trimmed
            .split_once(['-', '/'])
            .ok_or_else(|| MonthParseError(raw.to_string()))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| MonthParseError(raw.to_string()))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| MonthParseError(raw.to_string()))?;
        Self::new(year, month).ok_or_else(|| MonthParseError(raw.to_string()))
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The month itself and the two before it, oldest first.
    pub fn trailing_window(self) -> [Self; 3] {
        let prior = self.previous();
        [prior.previous(), prior, self]
    }
}

impl fmt::Display for ReportingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for ReportingMonth {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReportingMonth> for String {
    fn from(value: ReportingMonth) -> Self {
        value.to_string()
    }
}

/// Position title levels as recorded by HR (1st is the broad family).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionPath {
    pub first: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third: Option<String>,
}

impl PositionPath {
    pub fn new(first: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: None,
            third: None,
        }
    }

    pub fn with_second(mut self, second: impl Into<String>) -> Self {
        self.second = Some(second.into());
        self
    }

    pub fn with_third(mut self, third: impl Into<String>) -> Self {
        self.third = Some(third.into());
        self
    }

    /// Primary title (1st level). Single-field patterns match against it; the deeper levels
    /// only take part through combination patterns.
    pub fn title(&self) -> &str {
        self.first.trim()
    }
}

impl fmt::Display for PositionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.first)?;
        for level in [&self.second, &self.third].into_iter().flatten() {
            write!(f, " / {level}")?;
        }
        Ok(())
    }
}

/// Buildings an employee belongs to, or factory-wide responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "buildings")]
pub enum AreaScope {
    All,
    Buildings(Vec<String>),
    Unassigned,
}

impl AreaScope {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Unassigned;
        }

        let upper = trimmed.to_ascii_uppercase();
        if upper == "ALL" || upper == "ALL BUILDINGS" {
            return Self::All;
        }

        let mut buildings: Vec<String> = upper
            .split([';', ','])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        buildings.sort();
        buildings.dedup();

        if buildings.is_empty() {
            Self::Unassigned
        } else {
            Self::Buildings(buildings)
        }
    }

    pub fn covers(&self, building: &str) -> bool {
        match self {
            Self::All => true,
            Self::Buildings(buildings) => buildings
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(building)),
            Self::Unassigned => false,
        }
    }

    /// Building an employee's own inspections are attributed to.
    pub fn home_building(&self) -> Option<&str> {
        match self {
            Self::Buildings(buildings) => buildings.first().map(String::as_str),
            Self::All | Self::Unassigned => None,
        }
    }
}

/// Roster entry reconstructed from HR data for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub org_type: OrgType,
    pub position: PositionPath,
    pub area: AreaScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<EmployeeId>,
}
