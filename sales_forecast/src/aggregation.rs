//! Calendar aggregation of sales series
//!
//! Resampling into daily, weekly and monthly buckets, running totals, and
//! the category breakdown used by the top products view.

use crate::data::{SalesObservation, SalesTable, TimeSeries};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Calendar bucket size for the historical trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per distinct date
    #[default]
    Daily,
    /// Weeks starting on Monday
    Weekly,
    /// Calendar months
    Monthly,
}

/// Total sales of one product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Category name
    pub category: String,
    /// Summed amount
    pub amount: f64,
    /// Share of the amount among the returned categories, in percent
    pub share_pct: f64,
}

impl Granularity {
    /// First date of the bucket containing `date`
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Weekly => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            Granularity::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    /// First date of the bucket following the one that starts at `start`
    fn next_bucket(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Daily => start.succ_opt(),
            Granularity::Weekly => start.checked_add_signed(Duration::days(7)),
            Granularity::Monthly => {
                let (year, month) = if start.month() == 12 {
                    (start.year() + 1, 1)
                } else {
                    (start.year(), start.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
            }
        }
    }

    /// Label used in headings ("Daily", "Weekly", "Monthly")
    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Granularity {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Ok(Granularity::Daily),
            "weekly" | "w" => Ok(Granularity::Weekly),
            "monthly" | "m" => Ok(Granularity::Monthly),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unsupported granularity: {}",
                other
            ))),
        }
    }
}

/// Resample a series into calendar buckets, summing the amounts
///
/// Daily resampling keeps the series as is (one row per observed date).
/// Weekly and monthly buckets are contiguous from the first to the last
/// observation: a bucket without sales appears with an amount of zero and
/// a partial trailing bucket is kept. Each bucket is labelled by its first
/// date (Monday for weeks, the 1st for months).
pub fn resample(series: &TimeSeries, granularity: Granularity) -> Result<TimeSeries> {
    if granularity == Granularity::Daily || series.is_empty() {
        return Ok(series.clone());
    }

    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for observation in series.observations() {
        *totals
            .entry(granularity.bucket_start(observation.date))
            .or_insert(0.0) += observation.amount;
    }

    let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Ok(TimeSeries::default()),
    };

    let mut observations = Vec::with_capacity(totals.len());
    let mut current = first;
    while current <= last {
        observations.push(SalesObservation {
            date: current,
            amount: totals.get(&current).copied().unwrap_or(0.0),
        });
        current = granularity.next_bucket(current).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("Bucket after {} overflows the calendar", current))
        })?;
    }

    TimeSeries::new(observations)
}

/// Running total per date
pub fn cumulative(series: &TimeSeries) -> Vec<(NaiveDate, f64)> {
    series
        .dates()
        .into_iter()
        .zip(sales_math::stats::cumulative_sum(&series.amounts()))
        .collect()
}

/// The `n` categories with the largest total amount, largest first
///
/// Ties are broken by category name. Transactions without a category are
/// ignored. `share_pct` is relative to the returned categories only.
pub fn top_categories(table: &SalesTable, n: usize) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for transaction in table.transactions() {
        if let Some(category) = transaction.category.as_deref() {
            *totals.entry(category).or_insert(0.0) += transaction.amount;
        }
    }

    let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(n);

    let top_total: f64 = ranked.iter().map(|(_, amount)| amount).sum();
    ranked
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            amount,
            share_pct: if top_total != 0.0 {
                amount / top_total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
