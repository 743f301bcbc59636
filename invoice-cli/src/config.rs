//! Application configuration.
//!
//! Values are resolved in this order, later sources winning:
//!
//! 1. Built-in defaults.
//! 2. A TOML file: `--config <path>`, or `invoicer.toml` in the working
//!    directory when it exists.
//! 3. Command-line flags (`--backend`, `--db`, `--log-level`, `--log-file`).
//!
//! Every key is optional:
//!
//! ```toml
//! default_tax_rate = 13
//! payment_terms_days = 30
//! late_fee_rate = 0.05
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "invoices.db"
//!
//! [logging]
//! level = "info"
//! file = "invoicer.log"
//! ```

use std::path::{Path, PathBuf};

use invoice_core::calculations::line_items::is_valid_tax_rate;
use invoice_core::{DEFAULT_TAX_RATE, DbConfig, ServiceConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "invoicer.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Name of a registered repository backend: `sqlite` or `memory`.
    pub backend: String,
    /// Backend-specific; for SQLite a file path, a `sqlite:` URL or `:memory:`.
    pub connection_string: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "invoices.db".to_string(),
        }
    }
}

impl DatabaseSettings {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.backend.clone(),
            connection_string: self.connection_string.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// A bare level (`warn`, `debug`, ...) or any `EnvFilter` directive.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Log records are appended here in addition to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Percent applied to line items without their own rate.
    pub default_tax_rate: Decimal,
    /// Days from issue date to due date for new invoices.
    pub payment_terms_days: u32,
    /// Percent of the invoice total charged per day overdue.
    pub late_fee_rate: Decimal,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let service = ServiceConfig::default();
        Self {
            default_tax_rate: DEFAULT_TAX_RATE,
            payment_terms_days: service.payment_terms_days,
            late_fee_rate: service.late_fee_rate,
            database: DatabaseSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Values given on the command line; `None` leaves the file value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Loads, overrides and validates the configuration.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// read if present and defaults are used otherwise.
    pub fn load(
        path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides(
        &mut self,
        overrides: &ConfigOverrides,
    ) {
        if let Some(backend) = &overrides.backend {
            self.database.backend = backend.clone();
        }
        if let Some(connection_string) = &overrides.connection_string {
            self.database.connection_string = connection_string.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        if let Some(file) = &overrides.log_file {
            self.logging.file = Some(file.clone());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_tax_rate(self.default_tax_rate) {
            return Err(ConfigError::Invalid(format!(
                "default_tax_rate must be between 0 and 100, got {}",
                self.default_tax_rate
            )));
        }
        if self.late_fee_rate < Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "late_fee_rate must not be negative, got {}",
                self.late_fee_rate
            )));
        }
        if self.database.backend.trim().is_empty() {
            return Err(ConfigError::Invalid("database.backend must not be empty".into()));
        }
        Ok(())
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            default_tax_rate: self.default_tax_rate,
            payment_terms_days: self.payment_terms_days,
            late_fee_rate: self.late_fee_rate,
        }
    }
}
