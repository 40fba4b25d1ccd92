//! Utility functions for the sales_forecast crate

use crate::data::{SalesObservation, TimeSeries};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Date formats accepted in input files, tried in order
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Parse a calendar date in one of the accepted formats
///
/// A trailing time component (`2023-01-05 00:00:00`) is ignored.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    let date_part = trimmed
        .split(|c| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .ok_or_else(|| ForecastError::DataFormat(format!("Unparsable date: '{}'", text)))
}

/// Consecutive calendar days following `last`
pub fn future_dates(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as i64)
        .map(|offset| {
            last.checked_add_signed(Duration::days(offset))
                .ok_or_else(|| {
                    ForecastError::InvalidParameter(format!(
                        "Horizon of {} days overflows the calendar",
                        horizon
                    ))
                })
        })
        .collect()
}

/// Generate synthetic daily sales for demos and tests
///
/// The series has a gentle upward trend, a weekend lift and Gaussian
/// noise scaled by `noise` (a fraction of `base`). The same `seed` always
/// produces the same series.
///
/// # Arguments
/// * `start` - First date of the series
/// * `days` - Number of consecutive days to generate
/// * `base` - Typical daily sales amount
/// * `noise` - Noise standard deviation as a fraction of `base`
/// * `seed` - Random seed
pub fn generate_sales_data(
    start: NaiveDate,
    days: usize,
    base: f64,
    noise: f64,
    seed: u64,
) -> Result<TimeSeries> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, (noise * base).abs().max(f64::MIN_POSITIVE))
        .map_err(|e| ForecastError::InvalidParameter(format!("Invalid noise level: {}", e)))?;

    let dates = future_dates(start - Duration::days(1), days)?;
    let observations = dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let trend = base * (1.0 + 0.002 * i as f64);
            let weekend = match date.weekday().number_from_monday() {
                6 | 7 => 0.25 * base,
                _ => 0.0,
            };
            SalesObservation {
                date,
                amount: (trend + weekend + normal.sample(&mut rng)).max(0.0),
            }
        })
        .collect();

    TimeSeries::new(observations)
}
