//! Additive trend + seasonality model for daily sales
//!
//! The model decomposes sales as
//!
//! ```text
//! y(t) = trend(t) + weekly(t) + yearly(t) + ε
//! ```
//!
//! where the trend is piecewise linear with changepoints spread over the
//! first part of the history, and each seasonal effect is a truncated
//! Fourier series. All coefficients are estimated jointly by ridge least
//! squares on the max-abs-scaled target; the ridge penalties play the role
//! of the changepoint and seasonality priors.
//!
//! Uncertainty intervals use the in-sample residual spread. Past the last
//! historical date they widen with the expected drift from future trend
//! changes, whose size is the average magnitude of the fitted changepoints.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastPoint, TrainedForecastModel};
use chrono::NaiveDate;
use sales_math::fourier::{fourier_terms, validate_component};
use sales_math::regression::{ridge_fit, RidgeFit};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, info};

/// Prior noise variance (in scaled units) used to turn prior scales into penalties
const NOISE_PRIOR: f64 = 0.01;

/// Whether a seasonal component is fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    /// Fit when the history is long enough to observe two full cycles
    #[default]
    Auto,
    /// Always fit
    On,
    /// Never fit
    Off,
}

/// Hyperparameters of the additive model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveConfig {
    /// Maximum number of potential trend changepoints
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints are placed
    pub changepoint_range: f64,
    /// Flexibility of the trend (larger allows bigger slope changes)
    pub changepoint_prior_scale: f64,
    /// Strength of the seasonal components
    pub seasonality_prior_scale: f64,
    /// Weekly seasonality (period 7 days)
    pub weekly_seasonality: SeasonalityMode,
    /// Yearly seasonality (period 365.25 days)
    pub yearly_seasonality: SeasonalityMode,
    /// Fourier order of the weekly component
    pub weekly_order: usize,
    /// Fourier order of the yearly component
    pub yearly_order: usize,
    /// Width of the uncertainty interval, e.g. 0.8 for 80%
    pub interval_width: f64,
}

impl Default for AdditiveConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            weekly_seasonality: SeasonalityMode::Auto,
            yearly_seasonality: SeasonalityMode::Auto,
            weekly_order: 3,
            yearly_order: 10,
            interval_width: 0.8,
        }
    }
}

/// One fitted Fourier component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalComponent {
    /// Component name ("weekly", "yearly")
    pub name: String,
    /// Cycle length in days
    pub period: f64,
    /// Fourier order
    pub order: usize,
}

/// Untrained additive model
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    /// Name of the model
    name: String,
    /// Hyperparameters
    config: AdditiveConfig,
}

/// Trained additive model
///
/// Deserialization re-checks the hyperparameters and the fitted state, so a
/// tampered or foreign document is rejected instead of producing a model
/// that fails at prediction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredAdditiveModel")]
pub struct TrainedAdditiveModel {
    name: String,
    config: AdditiveConfig,
    history: TimeSeries,
    /// Date mapped to t = 0
    start: NaiveDate,
    /// Days mapped to one unit of t
    span_days: f64,
    /// Scale applied to the target before fitting
    y_scale: f64,
    /// Changepoint locations in t units
    changepoints: Vec<f64>,
    seasonalities: Vec<SeasonalComponent>,
    fit: RidgeFit,
    /// Residual standard deviation in scaled units
    sigma: f64,
    /// Mean absolute slope change across changepoints
    mean_abs_delta: f64,
    /// Changepoints per unit of t within the changepoint range
    changepoint_rate: f64,
}

impl AdditiveModel {
    /// Create a new additive model
    pub fn new(config: AdditiveConfig) -> Result<Self> {
        validate_config(&config)?;

        Ok(Self {
            name: format!(
                "Additive (changepoints={}, interval={})",
                config.n_changepoints, config.interval_width
            ),
            config,
        })
    }

    /// Get the hyperparameters
    pub fn config(&self) -> &AdditiveConfig {
        &self.config
    }

    fn seasonal_components(&self, span_days: f64) -> Vec<SeasonalComponent> {
        let mut components = Vec::new();
        let wanted = |mode: SeasonalityMode, min_span: f64| match mode {
            SeasonalityMode::On => true,
            SeasonalityMode::Off => false,
            SeasonalityMode::Auto => span_days >= min_span,
        };

        if wanted(self.config.weekly_seasonality, 14.0) {
            components.push(SeasonalComponent {
                name: "weekly".to_string(),
                period: 7.0,
                order: self.config.weekly_order,
            });
        }
        if wanted(self.config.yearly_seasonality, 730.0) {
            components.push(SeasonalComponent {
                name: "yearly".to_string(),
                period: 365.25,
                order: self.config.yearly_order,
            });
        }
        components
    }

    /// Changepoints at evenly spaced observations within the changepoint range
    fn changepoints(&self, t: &[f64]) -> Vec<f64> {
        let hist_size = (t.len() as f64 * self.config.changepoint_range).floor() as usize;
        let count = self.config.n_changepoints.min(hist_size.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }

        let step = (hist_size - 1) as f64 / count as f64;
        (1..=count)
            .map(|i| t[(i as f64 * step).round() as usize])
            .collect()
    }
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self {
            name: "Additive (changepoints=25, interval=0.8)".to_string(),
            config: AdditiveConfig::default(),
        }
    }
}

impl ForecastModel for AdditiveModel {
    type Trained = TrainedAdditiveModel;

    fn train(&self, data: &TimeSeries) -> Result<Self::Trained> {
        if data.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: data.len(),
            });
        }

        let dates = data.dates();
        let amounts = data.amounts();
        let start = dates[0];
        let span_days = ((dates[dates.len() - 1] - start).num_days() as f64).max(1.0);

        let y_scale = amounts.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };
        let y: Vec<f64> = amounts.iter().map(|v| v / y_scale).collect();

        let t: Vec<f64> = dates
            .iter()
            .map(|d| (*d - start).num_days() as f64 / span_days)
            .collect();
        let changepoints = self.changepoints(&t);
        let seasonalities = self.seasonal_components(span_days);

        let rows: Vec<Vec<f64>> = dates
            .iter()
            .zip(t.iter())
            .map(|(date, &ti)| design_row(*date, ti, &changepoints, &seasonalities))
            .collect();

        let mut penalties = vec![0.0, 0.0];
        penalties.extend(
            std::iter::repeat(NOISE_PRIOR / self.config.changepoint_prior_scale.powi(2))
                .take(changepoints.len()),
        );
        let seasonal_width: usize = seasonalities.iter().map(|s| 2 * s.order).sum();
        penalties.extend(
            std::iter::repeat(NOISE_PRIOR / self.config.seasonality_prior_scale.powi(2))
                .take(seasonal_width),
        );

        let fit = ridge_fit(&rows, &y, &penalties)?;
        let residuals = fit.residuals(&rows, &y)?;
        let sigma =
            (residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64).sqrt();

        let deltas = &fit.coefficients[2..2 + changepoints.len()];
        let mean_abs_delta = if deltas.is_empty() {
            0.0
        } else {
            deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len() as f64
        };
        let changepoint_rate = changepoints.len() as f64 / self.config.changepoint_range;

        info!(
            observations = data.len(),
            changepoints = changepoints.len(),
            seasonalities = seasonalities.len(),
            "fitted additive model"
        );
        debug!(sigma, mean_abs_delta, y_scale, "additive model fit statistics");

        Ok(TrainedAdditiveModel {
            name: self.name.clone(),
            config: self.config.clone(),
            history: data.clone(),
            start,
            span_days,
            y_scale,
            changepoints,
            seasonalities,
            fit,
            sigma,
            mean_abs_delta,
            changepoint_rate,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedAdditiveModel {
    /// Fitted seasonal components
    pub fn seasonalities(&self) -> &[SeasonalComponent] {
        &self.seasonalities
    }

    /// Number of trend changepoints
    pub fn changepoint_count(&self) -> usize {
        self.changepoints.len()
    }

    /// Hyperparameters the model was trained with
    pub fn config(&self) -> &AdditiveConfig {
        &self.config
    }

    fn z_score(&self) -> Result<f64> {
        let width = self.config.interval_width;
        if !(width > 0.0 && width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Interval width {} is not between 0 and 1",
                width
            )));
        }
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        Ok(normal.inverse_cdf(0.5 + width / 2.0))
    }

    /// Standard deviation (scaled units) of the prediction at `t`
    fn predictive_sd(&self, t: f64) -> f64 {
        let beyond = t - 1.0;
        if beyond <= 0.0 {
            return self.sigma;
        }
        let trend_sd = self.mean_abs_delta * (2.0 * self.changepoint_rate * beyond).sqrt() * beyond;
        (self.sigma.powi(2) + trend_sd.powi(2)).sqrt()
    }
}

impl TrainedForecastModel for TrainedAdditiveModel {
    fn history(&self) -> &TimeSeries {
        &self.history
    }

    fn predict_dates(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        let z = self.z_score()?;

        dates
            .iter()
            .map(|date| -> Result<ForecastPoint> {
                let t = (*date - self.start).num_days() as f64 / self.span_days;
                let row = design_row(*date, t, &self.changepoints, &self.seasonalities);
                let yhat = self.fit.predict_row(&row)? * self.y_scale;
                let margin = z * self.predictive_sd(t) * self.y_scale;
                Ok(ForecastPoint::new(*date, yhat, yhat - margin, yhat + margin))
            })
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Serialized layout of [`TrainedAdditiveModel`], validated on the way in
#[derive(Deserialize)]
struct StoredAdditiveModel {
    name: String,
    config: AdditiveConfig,
    history: TimeSeries,
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<SeasonalComponent>,
    fit: RidgeFit,
    sigma: f64,
    mean_abs_delta: f64,
    changepoint_rate: f64,
}

impl TryFrom<StoredAdditiveModel> for TrainedAdditiveModel {
    type Error = ForecastError;

    fn try_from(stored: StoredAdditiveModel) -> Result<Self> {
        validate_config(&stored.config)?;
        if stored.history.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: stored.history.len(),
            });
        }
        for component in &stored.seasonalities {
            validate_component(component.period, component.order)?;
        }

        let expected = 2
            + stored.changepoints.len()
            + stored.seasonalities.iter().map(|s| 2 * s.order).sum::<usize>();
        if stored.fit.coefficients.len() != expected {
            return Err(ForecastError::InvalidParameter(format!(
                "Model has {} coefficients, expected {}",
                stored.fit.coefficients.len(),
                expected
            )));
        }

        let finite = stored
            .fit
            .coefficients
            .iter()
            .chain(stored.changepoints.iter())
            .all(|v| v.is_finite());
        let positive = stored.span_days > 0.0 && stored.y_scale > 0.0;
        let non_negative = [stored.sigma, stored.mean_abs_delta, stored.changepoint_rate]
            .iter()
            .all(|v| *v >= 0.0);
        let bounded = [
            stored.span_days,
            stored.y_scale,
            stored.sigma,
            stored.mean_abs_delta,
            stored.changepoint_rate,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !(finite && positive && non_negative && bounded) {
            return Err(ForecastError::InvalidParameter(
                "Model contains invalid fitted values".to_string(),
            ));
        }

        Ok(Self {
            name: stored.name,
            config: stored.config,
            history: stored.history,
            start: stored.start,
            span_days: stored.span_days,
            y_scale: stored.y_scale,
            changepoints: stored.changepoints,
            seasonalities: stored.seasonalities,
            fit: stored.fit,
            sigma: stored.sigma,
            mean_abs_delta: stored.mean_abs_delta,
            changepoint_rate: stored.changepoint_rate,
        })
    }
}

/// Check hyperparameters that the types cannot express
fn validate_config(config: &AdditiveConfig) -> Result<()> {
    if !(config.interval_width > 0.0 && config.interval_width < 1.0) {
        return Err(ForecastError::InvalidParameter(
            "Interval width must be between 0 and 1".to_string(),
        ));
    }
    if !(config.changepoint_range > 0.0 && config.changepoint_range <= 1.0) {
        return Err(ForecastError::InvalidParameter(
            "Changepoint range must be in (0, 1]".to_string(),
        ));
    }
    if !(config.changepoint_prior_scale > 0.0) || !(config.seasonality_prior_scale > 0.0) {
        return Err(ForecastError::InvalidParameter(
            "Prior scales must be positive".to_string(),
        ));
    }
    validate_component(7.0, config.weekly_order)?;
    validate_component(365.25, config.yearly_order)?;
    Ok(())
}

/// Design matrix row: intercept, slope, changepoint hinges, Fourier terms
fn design_row(
    date: NaiveDate,
    t: f64,
    changepoints: &[f64],
    seasonalities: &[SeasonalComponent],
) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + changepoints.len());
    row.push(1.0);
    row.push(t);
    row.extend(changepoints.iter().map(|c| (t - c).max(0.0)));

    let epoch_days = days_since_epoch(date);
    for component in seasonalities {
        row.extend(fourier_terms(epoch_days, component.period, component.order));
    }
    row
}

fn days_since_epoch(date: NaiveDate) -> f64 {
    // 719_163 days separate 0001-01-01 (CE day 1) from 1970-01-01
    (chrono::Datelike::num_days_from_ce(&date) - 719_163) as f64
}
