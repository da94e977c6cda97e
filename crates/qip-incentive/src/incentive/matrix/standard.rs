use super::document::{IncentiveRule, MatrixDocument, RuleDocument, TypeSection};
use super::pattern::Combination;
use crate::incentive::conditions::ConditionThresholds;
use crate::incentive::domain::OrgType;
use crate::incentive::metrics::AttendancePolicy;
use std::collections::BTreeMap;

const INSPECTOR_PROGRESSION: [u64; 12] = [
    150_000, 250_000, 300_000, 350_000, 400_000, 450_000, 500_000, 650_000, 750_000, 850_000,
    950_000, 1_000_000,
];

const SPECIALIST_PROGRESSION: [u64; 12] = [
    250_000, 350_000, 400_000, 450_000, 500_000, 550_000, 600_000, 700_000, 800_000, 900_000,
    1_000_000, 1_100_000,
];

pub(crate) fn standard_document() -> MatrixDocument {
    let mut progressions = BTreeMap::new();
    progressions.insert("inspector".to_string(), INSPECTOR_PROGRESSION.to_vec());
    progressions.insert("specialist".to_string(), SPECIALIST_PROGRESSION.to_vec());

    MatrixDocument {
        thresholds: ConditionThresholds {
            min_attendance_rate: 88.0,
            max_unapproved_absences: 2,
            min_actual_working_days: 1,
            minimum_working_days: 12,
            max_personal_aql_failures: 0,
            max_area_reject_rate: 3.0,
            min_prs_pass_rate: 95.0,
            min_prs_inspection_qty: 100,
        },
        attendance: AttendancePolicy {
            unapproved_reason_codes: vec!["AR1".to_string(), "UNAPPROVED".to_string()],
            exempt_reason_codes: vec!["MATERNITY".to_string()],
        },
        progressions,
        types: vec![type1_section(), type2_section(), type3_section()],
    }
}

fn type1_section() -> TypeSection {
    TypeSection {
        org_type: OrgType::Type1,
        default: Some(rule(
            "type1.default",
            "TYPE-1 (unlisted position)",
            &[],
            &[1, 2, 3, 4],
            IncentiveRule::None,
        )),
        positions: vec![
            rule(
                "type1.assembly_inspector",
                "ASSEMBLY INSPECTOR",
                &["ASSEMBLY INSPECTOR"],
                &[1, 2, 3, 4, 5, 6, 9, 10],
                IncentiveRule::Progressive {
                    progression: "inspector".to_string(),
                    area_responsibility: false,
                },
            ),
            rule(
                "type1.aql_inspector",
                "AQL INSPECTOR",
                &["AQL INSPECTOR"],
                &[1, 2, 3, 4, 5],
                IncentiveRule::Fixed { amount: 350_000 },
            ),
            rule(
                "type1.line_leader",
                "LINE LEADER",
                &["LINE LEADER", "(V) LINE LEADER"],
                &[1, 2, 3, 4, 7],
                IncentiveRule::Supervisory {
                    subordinate_position: "type1.assembly_inspector".to_string(),
                    multiplier: 1.5,
                    transitive: false,
                },
            ),
            rule(
                "type1.group_leader",
                "GROUP LEADER",
                &["GROUP LEADER", "(V) GROUP LEADER"],
                &[1, 2, 3, 4],
                IncentiveRule::Supervisory {
                    subordinate_position: "type1.line_leader".to_string(),
                    multiplier: 2.0,
                    transitive: true,
                },
            ),
            rule(
                "type1.supervisor",
                "SUPERVISOR",
                &["SUPERVISOR", "(V) SUPERVISOR", "V.SUPERVISOR"],
                &[1, 2, 3, 4],
                IncentiveRule::Supervisory {
                    subordinate_position: "type1.line_leader".to_string(),
                    multiplier: 2.5,
                    transitive: true,
                },
            ),
            rule(
                "type1.assistant_manager",
                "A.MANAGER",
                &["A.MANAGER", "ASSISTANT MANAGER", "(V) A.MANAGER"],
                &[1, 2, 3, 4],
                IncentiveRule::Supervisory {
                    subordinate_position: "type1.line_leader".to_string(),
                    multiplier: 3.0,
                    transitive: true,
                },
            ),
            rule(
                "type1.manager",
                "MANAGER",
                &["MANAGER", "QIP MANAGER", "SENIOR MANAGER"],
                &[1, 2, 3, 4],
                IncentiveRule::Supervisory {
                    subordinate_position: "type1.line_leader".to_string(),
                    multiplier: 3.5,
                    transitive: true,
                },
            ),
            combination_rule(
                "type1.model_master",
                "MODEL MASTER",
                &["MODEL MASTER"],
                Combination {
                    first: Some("ASSEMBLY INSPECTOR".to_string()),
                    second: Some("MODEL MASTER".to_string()),
                    third: None,
                },
                &[1, 2, 3, 4, 8],
                IncentiveRule::Progressive {
                    progression: "specialist".to_string(),
                    area_responsibility: false,
                },
            ),
            combination_rule(
                "type1.audit_training",
                "AUDIT & TRAINING TEAM",
                &["AUDIT & TRAINING TEAM", "AUDIT AND TRAINING TEAM"],
                Combination {
                    first: Some("ASSEMBLY INSPECTOR".to_string()),
                    second: Some("AUDIT & TRAINING TEAM".to_string()),
                    third: None,
                },
                &[1, 2, 3, 4, 8],
                IncentiveRule::Progressive {
                    progression: "specialist".to_string(),
                    area_responsibility: true,
                },
            ),
        ],
    }
}

fn type2_section() -> TypeSection {
    TypeSection {
        org_type: OrgType::Type2,
        default: Some(rule(
            "type2.default",
            "TYPE-2 (unlisted position)",
            &[],
            &[1, 2, 3, 4],
            IncentiveRule::Fixed { amount: 200_000 },
        )),
        positions: vec![rule(
            "type2.line_leader",
            "TYPE-2 LINE LEADER",
            &["LINE LEADER", "(V) LINE LEADER"],
            &[1, 2, 3, 4],
            IncentiveRule::Fixed { amount: 300_000 },
        )],
    }
}

fn type3_section() -> TypeSection {
    TypeSection {
        org_type: OrgType::Type3,
        default: Some(rule(
            "type3.default",
            "TYPE-3 (no incentive)",
            &[],
            &[],
            IncentiveRule::None,
        )),
        positions: Vec::new(),
    }
}

fn rule(
    key: &str,
    name: &str,
    exact: &[&str],
    applicable: &[u8],
    incentive: IncentiveRule,
) -> RuleDocument {
    RuleDocument {
        key: key.to_string(),
        name: name.to_string(),
        exact: exact.iter().map(|alias| alias.to_string()).collect(),
        contains: Vec::new(),
        combinations: Vec::new(),
        applicable_conditions: applicable.to_vec(),
        excluded_conditions: (1..=10).filter(|id| !applicable.contains(id)).collect(),
        incentive,
    }
}

fn combination_rule(
    key: &str,
    name: &str,
    exact: &[&str],
    combination: Combination,
    applicable: &[u8],
    incentive: IncentiveRule,
) -> RuleDocument {
    let mut document = rule(key, name, exact, applicable, incentive);
    document.combinations.push(combination);
    document
}
