//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading child support
//! rate configurations from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{RateConfig, SchemeConfig, SchemeMetadata};

/// Loads and provides access to scheme configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and answers rate lookups by assessment date.
///
/// # Directory Structure
///
/// ```text
/// config/child_support/
/// ├── scheme.yaml          # Scheme metadata
/// └── rates/
///     ├── 2025-01-01.yaml  # Rates effective from this date
///     └── 2026-01-01.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use child_support_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/child_support").unwrap();
/// let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// let rates = loader.rates_for(date).unwrap();
/// println!("Self-support amount: ${}", rates.self_support_amount);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: SchemeConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A cost-of-children table is empty, overlapping or not open-ended
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let scheme_path = path.join("scheme.yaml");
        let metadata = Self::load_yaml::<SchemeMetadata>(&scheme_path)?;

        let rates_dir = path.join("rates");
        let rates = Self::load_rates(&rates_dir)?;

        Ok(Self {
            config: SchemeConfig::new(metadata, rates),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: SchemeConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RateConfig>> {
        let rates_dir_str = rates_dir.display().to_string();

        if !rates_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: rates_dir_str,
            });
        }

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let rate_config = Self::load_yaml::<RateConfig>(&path)?;
                rate_config
                    .cost_of_children
                    .validate(&path.display().to_string())?;
                rates.push(rate_config);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the underlying scheme configuration.
    pub fn config(&self) -> &SchemeConfig {
        &self.config
    }

    /// Returns the scheme metadata.
    pub fn metadata(&self) -> &SchemeMetadata {
        self.config.metadata()
    }

    /// Gets the rate configuration in force on a given date.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use child_support_engine::config::ConfigLoader;
    /// use chrono::NaiveDate;
    ///
    /// let loader = ConfigLoader::load("./config/child_support")?;
    /// let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    /// let rates = loader.rates_for(date)?;
    /// assert_eq!(rates.effective_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    /// # Ok::<(), child_support_engine::error::EngineError>(())
    /// ```
    pub fn rates_for(&self, date: NaiveDate) -> EngineResult<&RateConfig> {
        self.config.rates_for(date)
    }
}
