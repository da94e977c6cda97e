use crate::calculate::{run_calculation, CalculateArgs};
use crate::matrix::{export_matrix, resolve_position, validate_matrix, ResolveArgs, ValidateArgs};
use clap::{Parser, Subcommand};
use qip_incentive::config::AppConfig;
use qip_incentive::error::AppError;
use qip_incentive::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "qip-incentive",
    about = "Calculate monthly QIP incentives for inspection staff",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the monthly calculation and write the JSON run report
    Calculate(CalculateArgs),
    /// Inspect the position/condition matrix
    Matrix {
        #[command(subcommand)]
        command: MatrixCommand,
    },
}

#[derive(Subcommand, Debug)]
enum MatrixCommand {
    /// Load and validate a matrix document, printing rule counts
    Validate(ValidateArgs),
    /// Show which rule a position resolves to and its condition classification
    Resolve(ResolveArgs),
    /// Print the built-in standard matrix as JSON
    Export,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Calculate(args) => run_calculation(args, config.calculation),
        Command::Matrix {
            command: MatrixCommand::Validate(args),
        } => validate_matrix(args, &config.calculation),
        Command::Matrix {
            command: MatrixCommand::Resolve(args),
        } => resolve_position(args, &config.calculation),
        Command::Matrix {
            command: MatrixCommand::Export,
        } => export_matrix(),
    }
}
