mod calculate;
mod cli;
mod infra;
mod matrix;

use qip_incentive::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
