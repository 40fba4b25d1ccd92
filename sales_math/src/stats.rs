//! Descriptive statistics over sales values
//!
//! Contains the calculations behind the dashboard KPI cards and trend
//! annotations:
//! - Sum, mean and population standard deviation
//! - Period-over-period percent change
//! - Running (cumulative) totals
//! - Position of the first maximum / minimum

use crate::{MathError, Result};

/// Sum of all values (0.0 for an empty slice)
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean of the values
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute the mean of an empty series".to_string(),
        ));
    }

    Ok(sum(values) / values.len() as f64)
}

/// Population standard deviation of the values
pub fn std_dev(values: &[f64]) -> Result<f64> {
    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;

    Ok(variance.sqrt())
}

/// Percent change of each value relative to the one before it
///
/// The first entry has no predecessor and is `None`. A zero (or otherwise
/// degenerate) previous value also yields `None` rather than an infinite
/// or NaN percentage.
///
/// # Examples
///
/// ```
/// use sales_math::stats::percent_change;
///
/// let changes = percent_change(&[100.0, 200.0, 150.0]);
/// assert_eq!(changes, vec![None, Some(100.0), Some(-25.0)]);
/// ```
pub fn percent_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut changes = Vec::with_capacity(values.len());
    if values.is_empty() {
        return changes;
    }

    changes.push(None);
    for window in values.windows(2) {
        let (previous, current) = (window[0], window[1]);
        let change = (current - previous) / previous * 100.0;
        changes.push(if previous != 0.0 && change.is_finite() {
            Some(change)
        } else {
            None
        });
    }

    changes
}

/// Running total of the values
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, value| {
            *total += value;
            Some(*total)
        })
        .collect()
}

/// Index of the first occurrence of the largest value
pub fn argmax(values: &[f64]) -> Option<usize> {
    first_extreme(values, |candidate, best| candidate > best)
}

/// Index of the first occurrence of the smallest value
pub fn argmin(values: &[f64]) -> Option<usize> {
    first_extreme(values, |candidate, best| candidate < best)
}

fn first_extreme(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some(b) if !better(value, values[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}
