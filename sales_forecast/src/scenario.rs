//! Scenario adjustment of forecast runs

use crate::models::ForecastPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiplicative what-if adjustment applied to a whole forecast run
///
/// The factor is `1 + promo_pct / 100 + season_pct / 100`. It is not
/// clamped: a combined adjustment below -100% yields negative forecasts,
/// and callers that cannot display negative sales must floor them at
/// presentation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Promotion / boost adjustment in percent
    pub promo_pct: f64,
    /// Seasonality adjustment in percent
    pub season_pct: f64,
}

impl Scenario {
    /// Create a scenario from the two percentage adjustments
    pub fn new(promo_pct: f64, season_pct: f64) -> Self {
        Self {
            promo_pct,
            season_pct,
        }
    }

    /// The multiplier applied to every estimate and bound
    pub fn factor(&self) -> f64 {
        1.0 + self.promo_pct / 100.0 + self.season_pct / 100.0
    }

    /// Whether the scenario leaves forecasts unchanged
    pub fn is_neutral(&self) -> bool {
        self.factor() == 1.0
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "promo {:+}%, season {:+}% (x{:.2})",
            self.promo_pct,
            self.season_pct,
            self.factor()
        )
    }
}

/// Scale the estimate and both bounds of every point by the scenario factor
pub fn apply_scenario(points: Vec<ForecastPoint>, scenario: &Scenario) -> Vec<ForecastPoint> {
    let factor = scenario.factor();
    points
        .into_iter()
        .map(|point| ForecastPoint {
            point_estimate: point.point_estimate * factor,
            lower_bound: point.lower_bound * factor,
            upper_bound: point.upper_bound * factor,
            ..point
        })
        .collect()
}

/// Fill in the percent change of each point estimate from the previous point
///
/// The first point, and any point whose predecessor estimate is zero, gets
/// `None`.
pub fn percent_change(points: Vec<ForecastPoint>) -> Vec<ForecastPoint> {
    let estimates: Vec<f64> = points.iter().map(|p| p.point_estimate).collect();
    points
        .into_iter()
        .zip(sales_math::stats::percent_change(&estimates))
        .map(|(point, percent_change)| ForecastPoint {
            percent_change,
            ..point
        })
        .collect()
}
