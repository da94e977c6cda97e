use crate::incentive::{MatrixError, PositionConditionMatrix, RunMode};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub calculation: CalculationConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let matrix_path = env::var("QIP_MATRIX_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let output_dir =
            PathBuf::from(env::var("QIP_OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()));
        let interim = match env::var("QIP_INTERIM") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidInterim { value })?,
            Err(_) => false,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            calculation: CalculationConfig {
                matrix_path,
                output_dir,
                interim,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Where the matrix comes from and where run reports go.
#[derive(Debug, Clone)]
pub struct CalculationConfig {
    /// Matrix document to load; the built-in standard matrix when unset.
    pub matrix_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub interim: bool,
}

impl CalculationConfig {
    pub fn mode(&self) -> RunMode {
        RunMode::from_interim_flag(self.interim)
    }

    pub fn load_matrix(&self) -> Result<PositionConditionMatrix, MatrixError> {
        match &self.matrix_path {
            Some(path) => PositionConditionMatrix::from_path(path),
            None => Ok(PositionConditionMatrix::standard()),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidInterim { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidInterim { value } => {
                write!(f, "QIP_INTERIM must be a boolean flag, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("QIP_MATRIX_PATH");
        env::remove_var("QIP_OUTPUT_DIR");
        env::remove_var("QIP_INTERIM");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.calculation.matrix_path, None);
        assert_eq!(config.calculation.output_dir, PathBuf::from("output"));
        assert_eq!(config.calculation.mode(), RunMode::Final);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn interim_flag_selects_interim_mode() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("QIP_INTERIM", "Yes");
        env::set_var("APP_ENV", "ci");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.calculation.mode(), RunMode::Interim);
        assert_eq!(config.environment, AppEnvironment::Test);
        reset_env();
    }

    #[test]
    fn rejects_unparseable_interim_flag() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("QIP_INTERIM", "sometimes");
        match AppConfig::load() {
            Err(ConfigError::InvalidInterim { value }) => assert_eq!(value, "sometimes"),
            other => panic!("expected invalid interim flag, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn standard_matrix_is_used_without_a_path() {
        let calculation = CalculationConfig {
            matrix_path: None,
            output_dir: PathBuf::from("output"),
            interim: false,
        };
        let matrix = calculation.load_matrix().expect("standard matrix");
        assert_eq!(
            matrix.fingerprint(),
            PositionConditionMatrix::standard().fingerprint()
        );
    }
}
