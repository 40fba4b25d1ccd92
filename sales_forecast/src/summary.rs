//! Summary statistics and insights over forecasts and sales series

use crate::error::{ForecastError, Result};
use crate::models::ForecastPoint;
use chrono::NaiveDate;
use sales_math::stats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value reached on a specific date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    /// Date of the value
    pub date: NaiveDate,
    /// The value
    pub value: f64,
}

/// Total, average and extremes of a series (the KPI cards)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Sum of values
    pub total: f64,
    /// Mean value
    pub average: f64,
    /// Largest value (earliest date on ties)
    pub max: Extremum,
    /// Smallest value (earliest date on ties)
    pub min: Extremum,
    /// Number of values summarized
    pub count: usize,
}

/// Headline facts about a forecast run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    /// Date with the highest point estimate
    pub highest_day: NaiveDate,
    /// Date with the lowest point estimate
    pub lowest_day: NaiveDate,
    /// Sum of all point estimates
    pub cumulative_total: f64,
}

/// Summarize parallel date / value slices
pub fn summarize_values(dates: &[NaiveDate], values: &[f64]) -> Result<Summary> {
    if values.is_empty() {
        return Err(ForecastError::EmptySeries(
            "Cannot summarize an empty series".to_string(),
        ));
    }
    if dates.len() != values.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "Got {} dates but {} values",
            dates.len(),
            values.len()
        )));
    }

    let (max_idx, min_idx) = match (stats::argmax(values), stats::argmin(values)) {
        (Some(max_idx), Some(min_idx)) => (max_idx, min_idx),
        _ => {
            return Err(ForecastError::EmptySeries(
                "Series has no comparable values".to_string(),
            ))
        }
    };

    Ok(Summary {
        total: stats::sum(values),
        average: stats::mean(values)?,
        max: Extremum {
            date: dates[max_idx],
            value: values[max_idx],
        },
        min: Extremum {
            date: dates[min_idx],
            value: values[min_idx],
        },
        count: values.len(),
    })
}

/// Summarize the point estimates of a forecast
pub fn summarize(points: &[ForecastPoint]) -> Result<Summary> {
    let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
    let values: Vec<f64> = points.iter().map(|p| p.point_estimate).collect();
    summarize_values(&dates, &values)
}

/// Highest day, lowest day and cumulative total of a forecast
pub fn top_insights(points: &[ForecastPoint]) -> Result<Insights> {
    Ok(Insights::from(&summarize(points)?))
}

impl From<&Summary> for Insights {
    fn from(summary: &Summary) -> Self {
        Self {
            highest_day: summary.max.date,
            lowest_day: summary.min.date,
            cumulative_total: summary.total,
        }
    }
}

impl Insights {
    /// One sentence per insight, ready for display
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!(
                "Highest predicted sales on: {}",
                self.highest_day.format("%Y-%m-%d")
            ),
            format!(
                "Lowest predicted sales on: {}",
                self.lowest_day.format("%Y-%m-%d")
            ),
            format!(
                "Cumulative forecast sales: {}",
                format_currency(self.cumulative_total)
            ),
        ]
    }
}

impl fmt::Display for Insights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total:   {}", format_currency(self.total))?;
        writeln!(f, "Average: {}", format_currency(self.average))?;
        writeln!(
            f,
            "Max:     {} on {}",
            format_currency(self.max.value),
            self.max.date
        )?;
        writeln!(
            f,
            "Min:     {} on {}",
            format_currency(self.min.value),
            self.min.date
        )?;
        Ok(())
    }
}

/// Format an amount as whole dollars with thousands separators, e.g. `$12,346`
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("${}", value);
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
