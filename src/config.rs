use std::time::Duration;

use anyhow::{Context, Result};

use crate::model::Year;

pub const DEFAULT_API_BASE_URL: &str = "https://backend-h085.onrender.com";
pub const DEFAULT_OUTPUT_DIR: &str = "out";
pub const DEFAULT_YEAR: Year = 2024;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime settings read from the environment (and `.env`, once loaded by the binary).
///
/// | Variable               | Default                               |
/// |------------------------|---------------------------------------|
/// | `API_BASE_URL`         | `https://backend-h085.onrender.com`   |
/// | `DEFAULT_YEAR`         | `2024` (used when `/years` is empty)  |
/// | `REQUEST_TIMEOUT_SECS` | `30`                                  |
/// | `OUTPUT_DIR`           | `out`                                 |
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub default_year: Year,
    pub request_timeout: Duration,
    pub output_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_year: DEFAULT_YEAR,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Unset or blank values take the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let default_year = match get("DEFAULT_YEAR") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("DEFAULT_YEAR is not a year: '{v}'"))?,
            None => defaults.default_year,
        };
        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse()
                    .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a number: '{v}'"))?,
            ),
            None => defaults.request_timeout,
        };

        Ok(Self {
            api_base_url: get("API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            default_year,
            request_timeout,
            output_dir: get("OUTPUT_DIR").unwrap_or(defaults.output_dir),
        })
    }
}
