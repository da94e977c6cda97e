use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("condition id {0} is outside 1..=10")]
pub struct UnknownCondition(pub u8);

/// Identifier of one of the ten fixed eligibility conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ConditionId(u8);

impl ConditionId {
    pub const ATTENDANCE_RATE: Self = Self(1);
    pub const UNAPPROVED_ABSENCE: Self = Self(2);
    pub const ACTUAL_WORKING_DAYS: Self = Self(3);
    pub const MINIMUM_WORKING_DAYS: Self = Self(4);
    pub const PERSONAL_AQL_FAILURES: Self = Self(5);
    pub const PERSONAL_AQL_STREAK: Self = Self(6);
    pub const AREA_AQL_STREAK: Self = Self(7);
    pub const AREA_REJECT_RATE: Self = Self(8);
    pub const PRS_PASS_RATE: Self = Self(9);
    pub const PRS_INSPECTION_QTY: Self = Self(10);

    pub const ALL: [Self; 10] = [
        Self::ATTENDANCE_RATE,
        Self::UNAPPROVED_ABSENCE,
        Self::ACTUAL_WORKING_DAYS,
        Self::MINIMUM_WORKING_DAYS,
        Self::PERSONAL_AQL_FAILURES,
        Self::PERSONAL_AQL_STREAK,
        Self::AREA_AQL_STREAK,
        Self::AREA_REJECT_RATE,
        Self::PRS_PASS_RATE,
        Self::PRS_INSPECTION_QTY,
    ];

    pub fn new(raw: u8) -> Result<Self, UnknownCondition> {
        if (1..=10).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(UnknownCondition(raw))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn name(self) -> &'static str {
        match self.0 {
            1 => "attendance_rate",
            2 => "unapproved_absence",
            3 => "actual_working_days",
            4 => "minimum_working_days",
            5 => "personal_aql_failures",
            6 => "personal_aql_streak",
            7 => "area_aql_streak",
            8 => "area_reject_rate",
            9 => "prs_pass_rate",
            10 => "prs_inspection_qty",
            _ => "unknown_condition",
        }
    }

    pub const fn description(self) -> &'static str {
        match self.0 {
            1 => "Attendance rate meets the minimum",
            2 => "Unapproved absences within the allowance",
            3 => "Worked at least one day",
            4 => "Worked the minimum number of days",
            5 => "No personal AQL failures this month",
            6 => "No 3-month consecutive personal AQL failure",
            7 => "No 3-month consecutive AQL failure in team or area",
            8 => "Area reject rate below the limit",
            9 => "5PRS pass rate meets the minimum",
            10 => "5PRS inspection quantity meets the minimum",
            _ => "Unknown condition",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self.0 - 1)
    }
}

impl TryFrom<u8> for ConditionId {
    type Error = UnknownCondition;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConditionId> for u8 {
    fn from(value: ConditionId) -> Self {
        value.0
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Subset of the ten conditions, iterated in ascending ID order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<ConditionId>", into = "Vec<ConditionId>")]
pub struct ConditionSet(u16);

impl ConditionSet {
    const FULL_MASK: u16 = (1 << 10) - 1;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn full() -> Self {
        Self(Self::FULL_MASK)
    }

    pub fn insert(&mut self, condition: ConditionId) -> bool {
        let fresh = !self.contains(condition);
        self.0 |= condition.bit();
        fresh
    }

    pub const fn contains(self, condition: ConditionId) -> bool {
        self.0 & condition.bit() != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Conditions outside this set.
    pub const fn complement(self) -> Self {
        Self(!self.0 & Self::FULL_MASK)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_full(self) -> bool {
        self.0 == Self::FULL_MASK
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = ConditionId> {
        ConditionId::ALL
            .into_iter()
            .filter(move |condition| self.contains(*condition))
    }
}

impl FromIterator<ConditionId> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = ConditionId>>(iter: I) -> Self {
        let mut set = Self::empty();
        for condition in iter {
            set.insert(condition);
        }
        set
    }
}

impl From<Vec<ConditionId>> for ConditionSet {
    fn from(value: Vec<ConditionId>) -> Self {
        value.into_iter().collect()
    }
}

impl From<ConditionSet> for Vec<ConditionId> {
    fn from(value: ConditionSet) -> Self {
        value.iter().collect()
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.iter().map(|id| id.get().to_string()).collect();
        write!(f, "{{{}}}", ids.join(","))
    }
}

/// Numeric cut-offs for the ten conditions; sourced only from the matrix document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionThresholds {
    pub min_attendance_rate: f64,
    pub max_unapproved_absences: u32,
    pub min_actual_working_days: u32,
    pub minimum_working_days: u32,
    pub max_personal_aql_failures: u32,
    pub max_area_reject_rate: f64,
    pub min_prs_pass_rate: f64,
    pub min_prs_inspection_qty: u64,
}
