//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Alert threshold configuration.
    #[serde(default)]
    pub alerts: AlertConfig,
    /// Allocation editor configuration.
    #[serde(default)]
    pub editor: EditorConfig,
    /// Defaults used when seeding a budget.
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Alert threshold configuration, in percent of the allocation.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Utilization strictly above this raises an `exceeded` alert.
    #[serde(default = "default_exceeded_above")]
    pub exceeded_above: Decimal,
    /// Utilization strictly above this raises a `warning` alert.
    #[serde(default = "default_warning_above")]
    pub warning_above: Decimal,
    /// Utilization strictly above this raises an `info` alert.
    #[serde(default = "default_info_above")]
    pub info_above: Decimal,
    /// When false, `info` alerts are only raised for the trip total.
    #[serde(default = "default_true")]
    pub info_for_all_scopes: bool,
}

fn default_exceeded_above() -> Decimal {
    Decimal::ONE_HUNDRED
}

fn default_warning_above() -> Decimal {
    Decimal::from(90)
}

fn default_info_above() -> Decimal {
    Decimal::from(80)
}

fn default_true() -> bool {
    true
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            exceeded_above: default_exceeded_above(),
            warning_above: default_warning_above(),
            info_above: default_info_above(),
            info_for_all_scopes: true,
        }
    }
}

/// How the allocation editor treats input that is not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonNumericInput {
    /// Reject the input with an error and leave the session unchanged.
    #[default]
    Reject,
    /// Treat the input as zero.
    Zero,
}

/// Allocation editor configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EditorConfig {
    /// Policy for non-numeric input.
    #[serde(default)]
    pub non_numeric_input: NonNumericInput,
}

/// Defaults used when no budget exists yet.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    /// Contingency buffer applied when seeding a budget from current spend.
    #[serde(default = "default_contingency_pct")]
    pub contingency_pct: Decimal,
}

fn default_contingency_pct() -> Decimal {
    Decimal::TEN
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            contingency_pct: default_contingency_pct(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "tripbudget=info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TRIPBUDGET").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
