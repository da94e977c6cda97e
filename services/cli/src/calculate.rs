use crate::infra::{format_amount, parse_month};
use clap::Args;
use qip_incentive::config::CalculationConfig;
use qip_incentive::error::AppError;
use qip_incentive::incentive::{IncentiveRun, ReportingMonth, RunReport};
use qip_incentive::sources::{load_inputs, SourcePaths};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// Reporting month (YYYY-MM)
    #[arg(long, value_parser = parse_month)]
    pub(crate) month: ReportingMonth,
    /// Employee roster CSV
    #[arg(long)]
    pub(crate) roster: PathBuf,
    /// Daily attendance CSV for the month
    #[arg(long)]
    pub(crate) attendance: Option<PathBuf>,
    /// AQL inspection history CSV covering the month and the two before it
    #[arg(long)]
    pub(crate) aql: Option<PathBuf>,
    /// 5PRS inspection CSV for the month
    #[arg(long)]
    pub(crate) prs: Option<PathBuf>,
    /// Previous month's JSON run report, for progressive amounts
    #[arg(long)]
    pub(crate) previous: Option<PathBuf>,
    /// Matrix document overriding QIP_MATRIX_PATH
    #[arg(long)]
    pub(crate) matrix: Option<PathBuf>,
    /// Interim run: relax attendance conditions whose data is not yet available
    #[arg(long)]
    pub(crate) interim: bool,
    /// Directory for the run report, overriding QIP_OUTPUT_DIR
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_calculation(
    args: CalculateArgs,
    mut calculation: CalculationConfig,
) -> Result<(), AppError> {
    let CalculateArgs {
        month,
        roster,
        attendance,
        aql,
        prs,
        previous,
        matrix,
        interim,
        output,
    } = args;

    if matrix.is_some() {
        calculation.matrix_path = matrix;
    }
    if let Some(output) = output {
        calculation.output_dir = output;
    }
    calculation.interim |= interim;

    let matrix = calculation.load_matrix()?;
    let inputs = load_inputs(&SourcePaths {
        roster,
        attendance,
        aql,
        prs,
        previous,
    })?;

    let report = IncentiveRun::new(&matrix, month, calculation.mode()).execute(inputs);

    fs::create_dir_all(&calculation.output_dir)?;
    let path = calculation.output_dir.join(report.file_name());
    fs::write(&path, report.to_json_pretty()?)?;
    info!(path = %path.display(), "run report written");

    render_report(&report, &path);
    Ok(())
}

fn render_report(report: &RunReport, path: &Path) {
    println!("QIP incentive run {} ({})", report.month, report.mode);
    println!("Matrix fingerprint: {}", report.matrix_fingerprint);
    println!(
        "Employees: {} | Eligible: {} | Paid: {} | Total: {}",
        report.totals.employees,
        report.totals.eligible,
        report.totals.paid,
        format_amount(report.totals.total_amount)
    );

    println!();
    println!(
        "{:<12} {:<28} {:<28} {:>7} {:>12}",
        "Employee", "Name", "Rule", "Pass %", "Amount"
    );
    for outcome in &report.outcomes {
        println!(
            "{:<12} {:<28} {:<28} {:>7.1} {:>12}",
            outcome.employee.as_str(),
            truncate(&outcome.name, 28),
            truncate(&outcome.rule, 28),
            outcome.eligibility.pass_rate,
            format_amount(outcome.incentive.amount)
        );
        let failed = outcome.checks.failed();
        if !failed.is_empty() {
            println!("{:<12} failed: {}", "", failed);
        }
    }

    if !report.diagnostics.is_clean() {
        println!();
        println!("Diagnostics");
        for warning in &report.diagnostics.data_quality {
            println!("- {warning}");
        }
        for ambiguity in &report.diagnostics.ambiguities {
            println!(
                "- {} '{}' matched {} equally; used {}",
                ambiguity.employee,
                ambiguity.title,
                ambiguity.candidates.join(", "),
                ambiguity.chosen
            );
        }
    }

    println!();
    println!("Report written to {}", path.display());
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut shortened: String = value.chars().take(width.saturating_sub(1)).collect();
        shortened.push('~');
        shortened
    }
}
