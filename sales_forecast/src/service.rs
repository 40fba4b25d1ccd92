//! Forecast service: predictions, scenario runs and their summaries
//!
//! A [`ForecastService`] owns exactly one trained model, handed to it by the
//! caller. It either wraps a model loaded from a persisted artifact or fits
//! one on the spot from a (filtered) history.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastPoint, TrainedForecastModel};
use crate::scenario::{self, Scenario};
use crate::summary::{self, Insights, Summary};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Inputs of one interactive forecast run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    /// Days to forecast past the last historical date
    pub horizon_days: i64,
    /// What-if adjustment
    pub scenario: Scenario,
}

/// Output of one forecast run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRun {
    /// Historical and future points, adjusted and with percent changes
    pub points: Vec<ForecastPoint>,
    /// KPIs over the point estimates
    pub summary: Summary,
    /// Headline insights
    pub insights: Insights,
    /// Scenario the run was produced with
    pub scenario: Scenario,
}

impl ForecastRun {
    /// The first `n` points of the run
    pub fn head(&self, n: usize) -> &[ForecastPoint] {
        &self.points[..n.min(self.points.len())]
    }

    /// The points dated after `date`
    pub fn after(&self, date: chrono::NaiveDate) -> &[ForecastPoint] {
        let start = self.points.partition_point(|p| p.date <= date);
        &self.points[start..]
    }
}

/// Forecast service bound to one trained model
#[derive(Debug, Clone)]
pub struct ForecastService<M: TrainedForecastModel> {
    model: M,
}

impl<M: TrainedForecastModel> ForecastService<M> {
    /// Create a service around an already trained model
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Fit a transient model on `history` and wrap it
    pub fn fit<F>(model: &F, history: &TimeSeries) -> Result<Self>
    where
        F: ForecastModel<Trained = M>,
    {
        info!(model = model.name(), observations = history.len(), "fitting transient model");
        Ok(Self::new(model.train(history)?))
    }

    /// Get the model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get the series the model was fitted on
    pub fn history(&self) -> &TimeSeries {
        self.model.history()
    }

    /// Predict the historical range plus `horizon_days` future days
    pub fn predict(&self, horizon_days: i64) -> Result<Vec<ForecastPoint>> {
        let dates = self.model.make_future_dates(horizon_days)?;
        debug!(horizon_days, points = dates.len(), "predicting");
        let points = self.model.predict_dates(&dates)?;

        if points.len() != dates.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Model returned {} points for {} dates",
                points.len(),
                dates.len()
            )));
        }
        Ok(points)
    }

    /// Predict, apply the scenario, and derive percent changes, summary and insights
    pub fn run(&self, request: &ScenarioRequest) -> Result<ForecastRun> {
        let points = self.predict(request.horizon_days)?;
        let points = scenario::apply_scenario(points, &request.scenario);
        let points = scenario::percent_change(points);
        let summary = summary::summarize(&points)?;
        let insights = Insights::from(&summary);

        info!(
            horizon_days = request.horizon_days,
            factor = request.scenario.factor(),
            total = summary.total,
            "forecast run complete"
        );

        Ok(ForecastRun {
            points,
            summary,
            insights,
            scenario: request.scenario,
        })
    }
}
