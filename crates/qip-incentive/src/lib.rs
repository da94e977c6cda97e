pub mod config;
pub mod error;
pub mod incentive;
pub mod sources;
pub mod telemetry;
