//! Offline training: raw CSV in, persisted model out

use crate::artifact::ModelArtifact;
use crate::data::{ColumnMapping, DataLoader};
use crate::error::{ForecastError, Result};
use crate::models::ForecastModel;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Minimum number of distinct dates required to fit a model
pub const MIN_TRAINING_DATES: usize = 2;

/// Outcome of a successful training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Name of the fitted model
    pub model_name: String,
    /// Number of distinct dates in the training series
    pub observations: usize,
    /// First training date
    pub first_date: NaiveDate,
    /// Last training date
    pub last_date: NaiveDate,
    /// Where the model was written
    pub artifact_path: PathBuf,
}

/// Fits a model on a transaction-level CSV and persists it
#[derive(Debug, Clone)]
pub struct Trainer<M: ForecastModel> {
    model: M,
    columns: ColumnMapping,
    output_path: PathBuf,
}

impl<M> Trainer<M>
where
    M: ForecastModel,
    M::Trained: Serialize,
{
    /// Create a trainer writing to `output_path`
    pub fn new<P: Into<PathBuf>>(model: M, output_path: P) -> Self {
        Self {
            model,
            columns: ColumnMapping::default(),
            output_path: output_path.into(),
        }
    }

    /// Use non-default column names
    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    /// Where the artifact will be written
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Load, aggregate per day, fit and save
    ///
    /// Nothing is written unless the fit succeeds; an existing artifact at
    /// the output path is overwritten.
    pub fn train<P: AsRef<Path>>(&self, csv_path: P) -> Result<TrainingReport> {
        let table = DataLoader::from_csv_with_columns(csv_path.as_ref(), &self.columns)?;
        let series = table.daily_series();

        let (first_date, last_date) = match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) if series.len() >= MIN_TRAINING_DATES => (first, last),
            _ => {
                warn!(
                    distinct_dates = series.len(),
                    "not enough history to train, no artifact written"
                );
                return Err(ForecastError::InsufficientData {
                    needed: MIN_TRAINING_DATES,
                    got: series.len(),
                });
            }
        };

        info!(
            model = self.model.name(),
            observations = series.len(),
            %first_date,
            %last_date,
            "training model"
        );
        let trained = self.model.train(&series)?;
        ModelArtifact::save(&self.output_path, &trained)?;

        Ok(TrainingReport {
            model_name: self.model.name().to_string(),
            observations: series.len(),
            first_date,
            last_date,
            artifact_path: self.output_path.clone(),
        })
    }
}
