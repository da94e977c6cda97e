use crate::infra::parse_org_type;
use clap::Args;
use qip_incentive::config::CalculationConfig;
use qip_incentive::error::AppError;
use qip_incentive::incentive::{OrgType, PositionConditionMatrix, PositionPath};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Matrix document to validate (defaults to QIP_MATRIX_PATH, then the standard matrix)
    #[arg(long)]
    pub(crate) matrix: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ResolveArgs {
    /// Organizational TYPE (TYPE-1, TYPE-2 or TYPE-3)
    #[arg(long = "type", value_parser = parse_org_type)]
    pub(crate) org_type: OrgType,
    /// 1st position level
    #[arg(long)]
    pub(crate) position: String,
    /// 2nd position level
    #[arg(long)]
    pub(crate) second: Option<String>,
    /// 3rd position level
    #[arg(long)]
    pub(crate) third: Option<String>,
    /// Matrix document to resolve against
    #[arg(long)]
    pub(crate) matrix: Option<PathBuf>,
}

fn load(
    override_path: Option<PathBuf>,
    calculation: &CalculationConfig,
) -> Result<PositionConditionMatrix, AppError> {
    let mut calculation = calculation.clone();
    if override_path.is_some() {
        calculation.matrix_path = override_path;
    }
    Ok(calculation.load_matrix()?)
}

pub(crate) fn validate_matrix(
    args: ValidateArgs,
    calculation: &CalculationConfig,
) -> Result<(), AppError> {
    let matrix = load(args.matrix, calculation)?;

    println!("Matrix is valid ({})", matrix.fingerprint());
    for org_type in OrgType::ordered() {
        let rules = matrix
            .rules()
            .filter(|rule| rule.org_type == org_type)
            .count();
        println!("{org_type}: {rules} rule(s) including default");
    }
    Ok(())
}

pub(crate) fn resolve_position(
    args: ResolveArgs,
    calculation: &CalculationConfig,
) -> Result<(), AppError> {
    let matrix = load(args.matrix, calculation)?;

    let mut position = PositionPath::new(args.position);
    if let Some(second) = args.second {
        position = position.with_second(second);
    }
    if let Some(third) = args.third {
        position = position.with_third(third);
    }

    let trace = matrix.explain(args.org_type, &position);
    println!(
        "{} '{}' -> {} ({})",
        trace.org_type, trace.title, trace.rule_key, trace.rule_name
    );
    match trace.specificity {
        Some(specificity) => println!("Matched by: {specificity:?}"),
        None => println!("Matched by: TYPE default"),
    }
    if trace.candidates.len() > 1 {
        println!("Tied rules: {}", trace.candidates.join(", "));
    }
    println!("Applicable conditions: {}", trace.applicable);
    println!("Excluded conditions: {}", trace.excluded);
    println!("Incentive: {}", serde_json::to_string(&trace.incentive)?);
    Ok(())
}

pub(crate) fn export_matrix() -> Result<(), AppError> {
    let matrix = PositionConditionMatrix::standard();
    println!("{}", serde_json::to_string_pretty(matrix.document())?);
    Ok(())
}
