use super::pattern::Combination;
use crate::incentive::conditions::ConditionThresholds;
use crate::incentive::domain::OrgType;
use crate::incentive::metrics::AttendancePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized form of the position/condition matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixDocument {
    pub thresholds: ConditionThresholds,
    pub attendance: AttendancePolicy,
    #[serde(default)]
    pub progressions: BTreeMap<String, Vec<u64>>,
    pub types: Vec<TypeSection>,
}

/// Rules of one organizational TYPE, in definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSection {
    #[serde(rename = "type")]
    pub org_type: OrgType,
    #[serde(default)]
    pub default: Option<RuleDocument>,
    #[serde(default)]
    pub positions: Vec<RuleDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exact: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combinations: Vec<Combination>,
    pub applicable_conditions: Vec<u8>,
    pub excluded_conditions: Vec<u8>,
    pub incentive: IncentiveRule,
}

/// Amount formula attached to a position rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncentiveRule {
    /// Position is tracked but never paid.
    None,
    Fixed {
        amount: u64,
    },
    /// Escalates along a named progression while the employee keeps qualifying.
    Progressive {
        progression: String,
        #[serde(default)]
        area_responsibility: bool,
    },
    /// Average of paid subordinates holding `subordinate_position`, times `multiplier`.
    Supervisory {
        subordinate_position: String,
        multiplier: f64,
        #[serde(default = "default_transitive")]
        transitive: bool,
    },
}

fn default_transitive() -> bool {
    true
}

impl IncentiveRule {
    pub fn is_supervisory(&self) -> bool {
        matches!(self, Self::Supervisory { .. })
    }

    pub fn subordinate_position(&self) -> Option<&str> {
        match self {
            Self::Supervisory {
                subordinate_position,
                ..
            } => Some(subordinate_position),
            _ => None,
        }
    }
}
