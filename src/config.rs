use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::receipt::PageSize;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LEDGER_PATH: &str = "sales_records.csv";
pub const DEFAULT_SIGNATORY: &str = "Store Manager";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid RECEIPT_PAGE_SIZE: {0}")]
    InvalidPageSize(String),
}

/// Process configuration, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub ledger_path: PathBuf,
    pub signatory: String,
    pub page_size: PageSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            signatory: DEFAULT_SIGNATORY.to_string(),
            page_size: PageSize::default(),
        }
    }
}

impl AppConfig {
    /// Load from `PORT`, `HOST`, `LEDGER_PATH`, `RECEIPT_SIGNATORY` and
    /// `RECEIPT_PAGE_SIZE`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match value("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value: raw, source })?,
            None => defaults.port,
        };

        let page_size = match value("RECEIPT_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<PageSize>()
                .map_err(ConfigError::InvalidPageSize)?,
            None => defaults.page_size,
        };

        Ok(Self {
            host: value("HOST").unwrap_or(defaults.host),
            port,
            ledger_path: value("LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ledger_path),
            signatory: value("RECEIPT_SIGNATORY").unwrap_or(defaults.signatory),
            page_size,
        })
    }
}
