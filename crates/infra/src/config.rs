//! Configuration loading and representation.
//!
//! Values come from `SMARTSTORE_*` environment variables with defaults
//! suited to a single store in Japan.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use smartstore_observability::LogFormat;

pub const ENV_UTC_OFFSET_MINUTES: &str = "SMARTSTORE_UTC_OFFSET_MINUTES";
pub const ENV_LOG_FORMAT: &str = "SMARTSTORE_LOG_FORMAT";
pub const ENV_LOG_FILTER: &str = "SMARTSTORE_LOG_FILTER";
pub const ENV_DELIVERY_PAGE_SIZE: &str = "SMARTSTORE_DELIVERY_PAGE_SIZE";

/// JST.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 9 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: '{value}' is not a valid {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{var}: {reason}")]
    OutOfRange { var: &'static str, reason: String },
}

/// Store-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Store-local offset from UTC; drives time-of-day buckets and daily reports.
    pub utc_offset_minutes: i32,
    pub log_format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub delivery_page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            log_format: LogFormat::Json,
            log_filter: "info".to_string(),
            delivery_page_size: smartstore_core::PageRequest::DEFAULT_LIMIT,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source; unset or blank values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(ENV_UTC_OFFSET_MINUTES) {
            config.utc_offset_minutes = value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: ENV_UTC_OFFSET_MINUTES,
                value: value.clone(),
                expected: "integer number of minutes",
            })?;
        }
        if let Some(value) = get(ENV_LOG_FORMAT) {
            config.log_format = value.parse().map_err(|_| ConfigError::Invalid {
                var: ENV_LOG_FORMAT,
                value: value.clone(),
                expected: "log format (json|pretty)",
            })?;
        }
        if let Some(value) = get(ENV_LOG_FILTER) {
            config.log_filter = value.trim().to_string();
        }
        if let Some(value) = get(ENV_DELIVERY_PAGE_SIZE) {
            config.delivery_page_size =
                value.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: ENV_DELIVERY_PAGE_SIZE,
                    value: value.clone(),
                    expected: "positive integer",
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.utc_offset()?;
        if self.delivery_page_size == 0 {
            return Err(ConfigError::OutOfRange {
                var: ENV_DELIVERY_PAGE_SIZE,
                reason: "page size must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::OutOfRange {
                var: ENV_UTC_OFFSET_MINUTES,
                reason: format!(
                    "{} minutes is outside -1440..1440",
                    self.utc_offset_minutes
                ),
            })
    }
}
