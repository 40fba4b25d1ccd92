//! Historical sales analysis
//!
//! Everything the analysis view shows for a date range: the trend at the
//! chosen granularity with period-over-period change, cumulative sales,
//! KPIs, the top product categories, and an ad-hoc forecast fitted on the
//! aggregated trend.

use crate::aggregation::{self, CategoryTotal, Granularity};
use crate::data::{SalesTable, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastPoint};
use crate::service::ForecastService;
use crate::summary::Summary;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Inputs of the analysis view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Inclusive date range; `None` keeps the whole table
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Bucket size of the trend
    pub granularity: Granularity,
    /// Number of categories to rank
    pub top_n: usize,
}

/// One bucket of the trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// First date of the bucket
    pub date: NaiveDate,
    /// Sales in the bucket
    pub amount: f64,
    /// Change from the previous bucket in percent, if defined
    pub percent_change: Option<f64>,
}

/// Result of the analysis view
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalAnalysis {
    /// Granularity of `trend`
    pub granularity: Granularity,
    /// Aggregated series the trend was derived from
    pub series: TimeSeries,
    /// Sales per bucket with percent change
    pub trend: Vec<TrendPoint>,
    /// Running total per bucket
    pub cumulative: Vec<(NaiveDate, f64)>,
    /// Total, average, max and min per bucket
    pub summary: Summary,
    /// Best selling categories
    pub top_products: Vec<CategoryTotal>,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            date_range: None,
            granularity: Granularity::Daily,
            top_n: 5,
        }
    }
}

impl HistoricalAnalysis {
    /// Build the analysis of `table` for `request`
    pub fn build(table: &SalesTable, request: &AnalysisRequest) -> Result<Self> {
        let filtered = match request.date_range {
            Some((start, end)) => table.filter_date_range(start, end)?,
            None => table.clone(),
        };
        if filtered.is_empty() {
            return Err(ForecastError::EmptySeries(
                "No sales in the selected date range".to_string(),
            ));
        }

        let series = aggregation::resample(&filtered.daily_series(), request.granularity)?;
        let trend = series
            .observations()
            .iter()
            .zip(series.percent_changes())
            .map(|(observation, percent_change)| TrendPoint {
                date: observation.date,
                amount: observation.amount,
                percent_change,
            })
            .collect();

        let analysis = Self {
            granularity: request.granularity,
            cumulative: series.cumulative(),
            summary: series.summary()?,
            top_products: filtered.top_categories(request.top_n),
            trend,
            series,
        };

        info!(
            granularity = %analysis.granularity,
            buckets = analysis.trend.len(),
            total = analysis.summary.total,
            "built historical analysis"
        );
        Ok(analysis)
    }

    /// Fit `model` on the aggregated trend and forecast `horizon_days` past it
    pub fn forecast<F: ForecastModel>(
        &self,
        model: &F,
        horizon_days: i64,
    ) -> Result<Vec<ForecastPoint>> {
        ForecastService::<F::Trained>::fit(model, &self.series)?.predict(horizon_days)
    }
}
