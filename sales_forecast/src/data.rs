//! Sales data handling: raw transactions and aggregated daily series

use crate::aggregation::{self, CategoryTotal};
use crate::error::{ForecastError, Result};
use crate::summary::{self, Summary};
use crate::utils::parse_date;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// One row of the raw sales dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Calendar date of the sale
    pub date: NaiveDate,
    /// Total amount of the sale
    pub amount: f64,
    /// Product category, when the dataset carries one
    pub category: Option<String>,
}

/// Names of the columns to read from the raw dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    /// Date column (required)
    pub date: String,
    /// Amount column (required)
    pub amount: String,
    /// Category column (optional in the file)
    pub category: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            amount: "Total Amount".to_string(),
            category: "Product Category".to_string(),
        }
    }
}

/// Transaction-level sales table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    transactions: Vec<Transaction>,
}

/// Total sales for a single calendar date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesObservation {
    /// Calendar date
    pub date: NaiveDate,
    /// Summed amount for the date
    pub amount: f64,
}

/// Chronologically ordered sales series with one observation per date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SalesObservation>", into = "Vec<SalesObservation>")]
pub struct TimeSeries {
    observations: Vec<SalesObservation>,
}

/// Data loader for sales datasets
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a sales table from a CSV file using the default column names
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<SalesTable> {
        Self::from_csv_with_columns(path, &ColumnMapping::default())
    }

    /// Load a sales table from a CSV file with explicit column names
    pub fn from_csv_with_columns<P: AsRef<Path>>(
        path: P,
        columns: &ColumnMapping,
    ) -> Result<SalesTable> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()
            .map_err(|e| {
                ForecastError::DataFormat(format!("Failed to parse {}: {}", path.display(), e))
            })?;

        let table = Self::from_dataframe(&df, columns)?;
        info!(
            path = %path.display(),
            rows = table.len(),
            "loaded sales transactions"
        );
        Ok(table)
    }

    /// Build a sales table from an existing DataFrame
    pub fn from_dataframe(df: &DataFrame, columns: &ColumnMapping) -> Result<SalesTable> {
        let names = df.get_column_names();
        for required in [&columns.date, &columns.amount] {
            if !names.iter().any(|name| *name == required.as_str()) {
                return Err(ForecastError::DataFormat(format!(
                    "Required column '{}' not found (columns: {})",
                    required,
                    names.join(", ")
                )));
            }
        }

        if df.height() == 0 {
            return Err(ForecastError::DataFormat(
                "Dataset contains no rows".to_string(),
            ));
        }

        let dates = Self::date_column(df.column(&columns.date)?)?;
        let amounts = Self::amount_column(df.column(&columns.amount)?)?;
        let categories = if names.iter().any(|name| *name == columns.category.as_str()) {
            Self::category_column(df.column(&columns.category)?)?
        } else {
            debug!(column = %columns.category, "no category column, top products unavailable");
            vec![None; df.height()]
        };

        let transactions = dates
            .into_iter()
            .zip(amounts)
            .zip(categories)
            .map(|((date, amount), category)| Transaction {
                date,
                amount,
                category,
            })
            .collect();

        Ok(SalesTable::new(transactions))
    }

    /// Parse the date column, whether polars inferred it as text or as a temporal type
    fn date_column(series: &Series) -> Result<Vec<NaiveDate>> {
        match series.dtype() {
            DataType::Utf8 => series
                .utf8()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    let text = value.ok_or_else(|| {
                        ForecastError::DataFormat(format!("Missing date at row {}", row + 1))
                    })?;
                    parse_date(text).map_err(|_| {
                        ForecastError::DataFormat(format!(
                            "Unparsable date '{}' at row {}",
                            text,
                            row + 1
                        ))
                    })
                })
                .collect(),
            DataType::Date | DataType::Datetime(_, _) => {
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or_else(|| {
                    ForecastError::DataFormat("Invalid epoch date".to_string())
                })?;
                let days = series.cast(&DataType::Date)?.cast(&DataType::Int32)?;
                let days = days.i32()?;
                days.into_iter()
                    .enumerate()
                    .map(|(row, value)| {
                        value
                            .and_then(|d| {
                                epoch.checked_add_signed(chrono::Duration::days(d as i64))
                            })
                            .ok_or_else(|| {
                                ForecastError::DataFormat(format!(
                                    "Missing or invalid date at row {}",
                                    row + 1
                                ))
                            })
                    })
                    .collect()
            }
            other => Err(ForecastError::DataFormat(format!(
                "Date column '{}' has unsupported type {}",
                series.name(),
                other
            ))),
        }
    }

    /// Convert the amount column to f64, rejecting nulls and non-numeric text
    fn amount_column(series: &Series) -> Result<Vec<f64>> {
        let values = series.cast(&DataType::Float64)?;
        let values = values.f64()?;
        values
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(v) if v.is_finite() => Ok(v),
                _ => Err(ForecastError::DataFormat(format!(
                    "Missing or non-numeric amount in column '{}' at row {}",
                    series.name(),
                    row + 1
                ))),
            })
            .collect()
    }

    fn category_column(series: &Series) -> Result<Vec<Option<String>>> {
        let values = series.cast(&DataType::Utf8)?;
        let values = values.utf8()?;
        Ok(values
            .into_iter()
            .map(|value| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
            .collect())
    }
}

impl SalesTable {
    /// Create a table from transactions
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Get the transactions
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Number of transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Earliest and latest transaction dates
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.transactions.iter().map(|t| t.date).min()?;
        let max = self.transactions.iter().map(|t| t.date).max()?;
        Some((min, max))
    }

    /// Keep the transactions dated within `start..=end`
    pub fn filter_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ForecastError::InvalidParameter(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }

        Ok(Self::new(
            self.transactions
                .iter()
                .filter(|t| t.date >= start && t.date <= end)
                .cloned()
                .collect(),
        ))
    }

    /// Sum the amounts per calendar date
    pub fn daily_series(&self) -> TimeSeries {
        TimeSeries::aggregate_daily(self.transactions.iter().map(|t| (t.date, t.amount)))
    }

    /// Categories with the largest total sales
    pub fn top_categories(&self, n: usize) -> Vec<CategoryTotal> {
        aggregation::top_categories(self, n)
    }
}

impl TimeSeries {
    /// Create a series from observations that are already strictly ordered by date
    pub fn new(observations: Vec<SalesObservation>) -> Result<Self> {
        for window in observations.windows(2) {
            if window[1].date <= window[0].date {
                return Err(ForecastError::DataFormat(format!(
                    "Dates must be strictly increasing ({} follows {})",
                    window[1].date, window[0].date
                )));
            }
        }
        if let Some(bad) = observations.iter().find(|o| !o.amount.is_finite()) {
            return Err(ForecastError::DataFormat(format!(
                "Non-finite amount on {}",
                bad.date
            )));
        }

        Ok(Self { observations })
    }

    /// Create a series from parallel date and amount vectors
    pub fn from_parts(dates: Vec<NaiveDate>, amounts: Vec<f64>) -> Result<Self> {
        if dates.len() != amounts.len() {
            return Err(ForecastError::DataFormat(format!(
                "Got {} dates but {} amounts",
                dates.len(),
                amounts.len()
            )));
        }

        Self::new(
            dates
                .into_iter()
                .zip(amounts)
                .map(|(date, amount)| SalesObservation { date, amount })
                .collect(),
        )
    }

    /// Group (date, amount) pairs by date, summing the amounts
    pub fn aggregate_daily<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (date, amount) in rows {
            *totals.entry(date).or_insert(0.0) += amount;
        }

        Self {
            observations: totals
                .into_iter()
                .map(|(date, amount)| SalesObservation { date, amount })
                .collect(),
        }
    }

    /// Get the observations
    pub fn observations(&self) -> &[SalesObservation] {
        &self.observations
    }

    /// Get the dates as a vector
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    /// Get the amounts as a vector
    pub fn amounts(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.amount).collect()
    }

    /// Check if the time series is empty
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Get the length of the time series
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// First observed date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    /// Last observed date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Sum of all amounts
    pub fn total(&self) -> f64 {
        sales_math::stats::sum(&self.amounts())
    }

    /// Period-over-period percent change (first entry undefined)
    pub fn percent_changes(&self) -> Vec<Option<f64>> {
        sales_math::stats::percent_change(&self.amounts())
    }

    /// Running total per date
    pub fn cumulative(&self) -> Vec<(NaiveDate, f64)> {
        aggregation::cumulative(self)
    }

    /// Total, average, max and min of the amounts
    pub fn summary(&self) -> Result<Summary> {
        summary::summarize_values(&self.dates(), &self.amounts())
    }
}

impl TryFrom<Vec<SalesObservation>> for TimeSeries {
    type Error = ForecastError;

    fn try_from(observations: Vec<SalesObservation>) -> Result<Self> {
        Self::new(observations)
    }
}

impl From<TimeSeries> for Vec<SalesObservation> {
    fn from(series: TimeSeries) -> Self {
        series.observations
    }
}
