//! Position/condition applicability matrix.
//!
//! The matrix is built once per run from a [`MatrixDocument`], validated eagerly and then
//! shared by reference with the metric computer, evaluator and calculator. Every rule
//! classifies all ten conditions as applicable or excluded, and every TYPE carries a default
//! rule, so resolution itself cannot fail.

mod document;
mod pattern;
mod standard;

pub use document::{IncentiveRule, MatrixDocument, RuleDocument, TypeSection};
pub use pattern::{normalize_title, Combination, PositionPattern, Specificity};

use super::conditions::{ConditionId, ConditionSet, ConditionThresholds};
use super::domain::{OrgType, PositionPath};
use super::metrics::AttendancePolicy;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Configuration errors; any of them aborts the run before employees are processed.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("failed to read matrix document: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid matrix document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} has no default rule")]
    MissingDefault(OrgType),
    #[error("{0} is defined more than once")]
    DuplicateType(OrgType),
    #[error("rule key '{0}' is defined more than once")]
    DuplicateRuleKey(String),
    #[error("rule '{rule}' references unknown condition id {condition}")]
    UnknownCondition { rule: String, condition: u8 },
    #[error("rule '{rule}' leaves condition {condition} unclassified")]
    UnclassifiedCondition { rule: String, condition: ConditionId },
    #[error("rule '{rule}' lists condition {condition} as both applicable and excluded")]
    ConditionClassifiedTwice { rule: String, condition: ConditionId },
    #[error("rule '{0}' has no position patterns")]
    EmptyPatterns(String),
    #[error("rule '{rule}' references undefined subordinate position '{subordinate}'")]
    UnknownSubordinatePosition { rule: String, subordinate: String },
    #[error("rule '{rule}' has invalid multiplier {multiplier}")]
    InvalidMultiplier { rule: String, multiplier: f64 },
    #[error("rule '{rule}' references undefined progression '{progression}'")]
    UnknownProgression { rule: String, progression: String },
    #[error("progression '{0}' has no tiers")]
    EmptyProgression(String),
    #[error("supervisory rules form a cycle through '{0}'")]
    SupervisoryCycle(String),
}

/// Validated rule for one canonical position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRule {
    pub key: String,
    pub name: String,
    pub org_type: OrgType,
    pub patterns: Vec<PositionPattern>,
    pub applicable: ConditionSet,
    pub excluded: ConditionSet,
    pub incentive: IncentiveRule,
}

#[derive(Debug, Clone)]
struct TypeRules {
    default: PositionRule,
    positions: Vec<PositionRule>,
}

/// Outcome of resolving a (TYPE, position) pair.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'m> {
    pub rule: &'m PositionRule,
    /// `None` when the TYPE default applied.
    pub specificity: Option<Specificity>,
    tied: usize,
}

impl<'m> Resolution<'m> {
    pub fn applicable(&self) -> ConditionSet {
        self.rule.applicable
    }

    pub fn excluded(&self) -> ConditionSet {
        self.rule.excluded
    }

    pub fn incentive(&self) -> &'m IncentiveRule {
        &self.rule.incentive
    }

    pub fn is_default(&self) -> bool {
        self.specificity.is_none()
    }

    pub fn is_ambiguous(&self) -> bool {
        self.tied > 1
    }
}

/// Human-readable trace of a resolution, including the rules that tied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionTrace {
    pub org_type: OrgType,
    pub title: String,
    pub rule_key: String,
    pub rule_name: String,
    pub specificity: Option<Specificity>,
    pub candidates: Vec<String>,
    pub applicable: ConditionSet,
    pub excluded: ConditionSet,
    pub incentive: IncentiveRule,
}

#[derive(Debug, Clone)]
pub struct PositionConditionMatrix {
    thresholds: ConditionThresholds,
    attendance: AttendancePolicy,
    progressions: BTreeMap<String, Vec<u64>>,
    types: BTreeMap<OrgType, TypeRules>,
    supervisory_rank: BTreeMap<String, usize>,
    fingerprint: String,
    document: MatrixDocument,
}

impl PositionConditionMatrix {
    /// Matrix shipped with the crate.
    pub fn standard() -> Self {
        match Self::from_document(standard::standard_document()) {
            Ok(matrix) => matrix,
            Err(err) => panic!("built-in matrix is invalid: {err}"),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MatrixError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MatrixError> {
        let document: MatrixDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_document(document: MatrixDocument) -> Result<Self, MatrixError> {
        for (name, tiers) in &document.progressions {
            if tiers.is_empty() {
                return Err(MatrixError::EmptyProgression(name.clone()));
            }
        }

        let mut keys = BTreeSet::new();
        let mut types = BTreeMap::new();
        for section in &document.types {
            if types.contains_key(&section.org_type) {
                return Err(MatrixError::DuplicateType(section.org_type));
            }

            let default_doc = section
                .default
                .as_ref()
                .ok_or(MatrixError::MissingDefault(section.org_type))?;
            let default = build_rule(section.org_type, default_doc, true)?;
            register_key(&mut keys, &default.key)?;

            let mut positions = Vec::with_capacity(section.positions.len());
            for rule_doc in &section.positions {
                let rule = build_rule(section.org_type, rule_doc, false)?;
                register_key(&mut keys, &rule.key)?;
                positions.push(rule);
            }

            types.insert(section.org_type, TypeRules { default, positions });
        }

        for org_type in OrgType::ordered() {
            if !types.contains_key(&org_type) {
                return Err(MatrixError::MissingDefault(org_type));
            }
        }

        let all_rules: Vec<&PositionRule> = types
            .values()
            .flat_map(|rules| std::iter::once(&rules.default).chain(rules.positions.iter()))
            .collect();

        for rule in &all_rules {
            validate_incentive(rule, &keys, &document.progressions)?;
        }

        let supervisory_rank = rank_supervisory(&all_rules)?;
        let fingerprint = hex::encode(Sha256::digest(serde_json::to_vec(&document)?));

        info!(
            rules = all_rules.len(),
            progressions = document.progressions.len(),
            fingerprint = %fingerprint,
            "position condition matrix loaded"
        );

        Ok(Self {
            thresholds: document.thresholds.clone(),
            attendance: document.attendance.clone(),
            progressions: document.progressions.clone(),
            types,
            supervisory_rank,
            fingerprint,
            document,
        })
    }

    pub fn thresholds(&self) -> &ConditionThresholds {
        &self.thresholds
    }

    pub fn attendance_policy(&self) -> &AttendancePolicy {
        &self.attendance
    }

    pub fn progression(&self, name: &str) -> Option<&[u64]> {
        self.progressions.get(name).map(Vec::as_slice)
    }

    /// SHA-256 of the canonical JSON document; recorded in every run report.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn document(&self) -> &MatrixDocument {
        &self.document
    }

    pub fn rules(&self) -> impl Iterator<Item = &PositionRule> {
        self.types
            .values()
            .flat_map(|rules| std::iter::once(&rules.default).chain(rules.positions.iter()))
    }

    pub fn rule(&self, key: &str) -> Option<&PositionRule> {
        self.rules().find(|rule| rule.key == key)
    }

    /// Dependency depth of a rule: 0 unless it averages another position's incentives.
    pub fn supervisory_rank(&self, key: &str) -> usize {
        self.supervisory_rank.get(key).copied().unwrap_or(0)
    }

    /// Most specific matching rule wins; on a tie the later-defined rule is chosen.
    pub fn resolve(&self, org_type: OrgType, position: &PositionPath) -> Resolution<'_> {
        let Some(rules) = self.types.get(&org_type) else {
            // Validation guarantees every TYPE is present.
            unreachable!("matrix validated without {org_type}")
        };

        let mut best: Option<(Specificity, &PositionRule)> = None;
        let mut tied = 0usize;

        for rule in &rules.positions {
            let Some(specificity) = rule
                .patterns
                .iter()
                .filter_map(|pattern| pattern.specificity(position))
                .max()
            else {
                continue;
            };

            match best {
                Some((current, _)) if specificity < current => {}
                Some((current, _)) if specificity == current => {
                    best = Some((specificity, rule));
                    tied += 1;
                }
                _ => {
                    best = Some((specificity, rule));
                    tied = 1;
                }
            }
        }

        match best {
            Some((specificity, rule)) => {
                debug!(
                    %org_type,
                    position = %position,
                    rule = %rule.key,
                    ?specificity,
                    "position resolved"
                );
                Resolution {
                    rule,
                    specificity: Some(specificity),
                    tied,
                }
            }
            None => {
                debug!(
                    %org_type,
                    position = %position,
                    rule = %rules.default.key,
                    "position fell back to default"
                );
                Resolution {
                    rule: &rules.default,
                    specificity: None,
                    tied: 0,
                }
            }
        }
    }

    /// Keys of every rule sharing the winning specificity, in definition order.
    pub fn tied_candidates(&self, org_type: OrgType, position: &PositionPath) -> Vec<String> {
        let resolution = self.resolve(org_type, position);
        let Some(winning) = resolution.specificity else {
            return Vec::new();
        };

        self.types
            .get(&org_type)
            .map(|rules| {
                rules
                    .positions
                    .iter()
                    .filter(|rule| {
                        rule.patterns
                            .iter()
                            .filter_map(|pattern| pattern.specificity(position))
                            .max()
                            == Some(winning)
                    })
                    .map(|rule| rule.key.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn explain(&self, org_type: OrgType, position: &PositionPath) -> ResolutionTrace {
        let resolution = self.resolve(org_type, position);
        ResolutionTrace {
            org_type,
            title: normalize_title(position.title()),
            rule_key: resolution.rule.key.clone(),
            rule_name: resolution.rule.name.clone(),
            specificity: resolution.specificity,
            candidates: self.tied_candidates(org_type, position),
            applicable: resolution.applicable(),
            excluded: resolution.excluded(),
            incentive: resolution.rule.incentive.clone(),
        }
    }
}

fn register_key(keys: &mut BTreeSet<String>, key: &str) -> Result<(), MatrixError> {
    if keys.insert(key.to_string()) {
        Ok(())
    } else {
        Err(MatrixError::DuplicateRuleKey(key.to_string()))
    }
}

fn build_rule(
    org_type: OrgType,
    document: &RuleDocument,
    is_default: bool,
) -> Result<PositionRule, MatrixError> {
    let applicable = condition_set(&document.key, &document.applicable_conditions)?;
    let excluded = condition_set(&document.key, &document.excluded_conditions)?;

    if let Some(condition) = applicable.intersection(excluded).iter().next() {
        return Err(MatrixError::ConditionClassifiedTwice {
            rule: document.key.clone(),
            condition,
        });
    }
    if let Some(condition) = applicable.union(excluded).complement().iter().next() {
        return Err(MatrixError::UnclassifiedCondition {
            rule: document.key.clone(),
            condition,
        });
    }

    let patterns: Vec<PositionPattern> = document
        .combinations
        .iter()
        .cloned()
        .map(PositionPattern::Combination)
        .chain(document.exact.iter().cloned().map(PositionPattern::Exact))
        .chain(document.contains.iter().cloned().map(PositionPattern::Contains))
        .collect();

    if patterns.is_empty() && !is_default {
        return Err(MatrixError::EmptyPatterns(document.key.clone()));
    }

    Ok(PositionRule {
        key: document.key.clone(),
        name: document.name.clone(),
        org_type,
        patterns,
        applicable,
        excluded,
        incentive: document.incentive.clone(),
    })
}

fn condition_set(rule: &str, ids: &[u8]) -> Result<ConditionSet, MatrixError> {
    ids.iter()
        .map(|raw| {
            ConditionId::new(*raw).map_err(|_| MatrixError::UnknownCondition {
                rule: rule.to_string(),
                condition: *raw,
            })
        })
        .collect()
}

fn validate_incentive(
    rule: &PositionRule,
    keys: &BTreeSet<String>,
    progressions: &BTreeMap<String, Vec<u64>>,
) -> Result<(), MatrixError> {
    match &rule.incentive {
        IncentiveRule::None | IncentiveRule::Fixed { .. } => Ok(()),
        IncentiveRule::Progressive { progression, .. } => {
            if progressions.contains_key(progression) {
                Ok(())
            } else {
                Err(MatrixError::UnknownProgression {
                    rule: rule.key.clone(),
                    progression: progression.clone(),
                })
            }
        }
        IncentiveRule::Supervisory {
            subordinate_position,
            multiplier,
            ..
        } => {
            if !keys.contains(subordinate_position) {
                return Err(MatrixError::UnknownSubordinatePosition {
                    rule: rule.key.clone(),
                    subordinate: subordinate_position.clone(),
                });
            }
            if !multiplier.is_finite() || *multiplier < 0.0 {
                return Err(MatrixError::InvalidMultiplier {
                    rule: rule.key.clone(),
                    multiplier: *multiplier,
                });
            }
            Ok(())
        }
    }
}

fn rank_supervisory(rules: &[&PositionRule]) -> Result<BTreeMap<String, usize>, MatrixError> {
    let edges: BTreeMap<&str, &str> = rules
        .iter()
        .filter_map(|rule| {
            rule.incentive
                .subordinate_position()
                .map(|subordinate| (rule.key.as_str(), subordinate))
        })
        .collect();

    let mut ranks = BTreeMap::new();
    for rule in rules {
        let mut chain = Vec::new();
        let mut current = rule.key.as_str();
        while let Some(next) = edges.get(current).copied() {
            if chain.contains(&current) {
                return Err(MatrixError::SupervisoryCycle(current.to_string()));
            }
            chain.push(current);
            current = next;
        }
        ranks.insert(rule.key.clone(), chain.len());
    }

    Ok(ranks)
}
