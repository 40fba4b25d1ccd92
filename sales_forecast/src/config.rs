//! Configuration for training, analysis and forecasting runs
//!
//! Settings are read from an optional JSON file. Every field has a default,
//! so a file only needs the values it changes:
//!
//! ```json
//! {
//!   "data": { "csv_path": "data/retail_sales_dataset.csv" },
//!   "forecast": { "horizon_days": 60, "promo_pct": 10 }
//! }
//! ```

use crate::aggregation::Granularity;
use crate::data::ColumnMapping;
use crate::error::{ForecastError, Result};
use crate::models::additive::AdditiveConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the trained model artifact
pub const DEFAULT_MODEL_PATH: &str = "sales_forecast_model.json";

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Input dataset
    pub data: DataConfig,
    /// Model artifact and hyperparameters
    pub model: ModelConfig,
    /// Live forecast defaults
    pub forecast: ForecastRunConfig,
    /// Historical analysis defaults
    pub analysis: AnalysisConfig,
}

/// Input dataset settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Transaction-level sales CSV
    pub csv_path: PathBuf,
    /// Column names in the CSV
    pub columns: ColumnMapping,
}

/// Model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Where the trainer writes and the live forecast reads the model
    pub artifact_path: PathBuf,
    /// Hyperparameters of the additive model
    pub additive: AdditiveConfig,
}

/// Live forecast settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastRunConfig {
    /// Days to forecast
    pub horizon_days: i64,
    /// Promotion / boost adjustment in percent
    pub promo_pct: f64,
    /// Seasonality adjustment in percent
    pub season_pct: f64,
    /// Rows shown in the forecast summary table
    pub summary_rows: usize,
}

/// Historical analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Bucket size of the trend
    pub granularity: Granularity,
    /// Number of categories in the top products view
    pub top_n: usize,
    /// Days forecast from the analysed history
    pub forecast_days: i64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("retail_sales_dataset.csv"),
            columns: ColumnMapping::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from(DEFAULT_MODEL_PATH),
            additive: AdditiveConfig::default(),
        }
    }
}

impl Default for ForecastRunConfig {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            promo_pct: 0.0,
            season_pct: 0.0,
            summary_rows: 7,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Daily,
            top_n: 5,
            forecast_days: 30,
        }
    }
}

impl ForecastConfig {
    /// Read a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            ForecastError::Config(format!("Invalid configuration in {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "loaded configuration");
        config.validate()?;
        Ok(config)
    }

    /// Read `path` when given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check values that cannot be expressed in the types
    pub fn validate(&self) -> Result<()> {
        if self.analysis.top_n == 0 {
            return Err(ForecastError::Config(
                "analysis.top_n must be at least 1".to_string(),
            ));
        }
        if self.forecast.summary_rows == 0 {
            return Err(ForecastError::Config(
                "forecast.summary_rows must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
