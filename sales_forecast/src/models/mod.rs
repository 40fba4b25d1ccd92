//! Forecasting models for sales time series

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::utils::future_dates;
use chrono::NaiveDate;
use std::fmt::Debug;

/// Forecast for a single date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    /// Calendar date
    pub date: NaiveDate,
    /// Point estimate
    pub point_estimate: f64,
    /// Lower bound of the uncertainty interval
    pub lower_bound: f64,
    /// Upper bound of the uncertainty interval
    pub upper_bound: f64,
    /// Percent change of the point estimate from the previous point, if defined
    pub percent_change: Option<f64>,
}

impl ForecastPoint {
    /// Create a point without a percent change
    pub fn new(date: NaiveDate, point_estimate: f64, lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            date,
            point_estimate,
            lower_bound,
            upper_bound,
            percent_change: None,
        }
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// The series the model was fitted on
    fn history(&self) -> &TimeSeries;

    /// Evaluate the model at the given dates
    fn predict_dates(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>>;

    /// Name of the model
    fn name(&self) -> &str;

    /// Historical dates followed by `horizon` consecutive days after the last one
    fn make_future_dates(&self, horizon: i64) -> Result<Vec<NaiveDate>> {
        if horizon <= 0 {
            return Err(ForecastError::InvalidHorizon(horizon));
        }

        let history = self.history();
        let last = history.last_date().ok_or_else(|| {
            ForecastError::EmptySeries("Model has no historical observations".to_string())
        })?;

        let mut dates = history.dates();
        dates.extend(future_dates(last, horizon as usize)?);
        Ok(dates)
    }
}

/// Forecast model that can be trained on a sales series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a sales series
    fn train(&self, data: &TimeSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod additive;
