//! CSV export of forecasts
//!
//! Layout: a header row `date,point_estimate,lower_bound,upper_bound` with
//! an optional trailing `percent_change` column, then one row per point in
//! chronological order. An undefined percent change is an empty field.

use crate::error::{ForecastError, Result};
use crate::models::ForecastPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Which columns to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportColumns {
    /// Date, estimate and bounds
    Bounds,
    /// Date, estimate, bounds and percent change
    WithPercentChange,
}

#[derive(Debug, Serialize)]
struct BoundsRecord {
    date: NaiveDate,
    point_estimate: f64,
    lower_bound: f64,
    upper_bound: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ForecastRecord {
    date: NaiveDate,
    point_estimate: f64,
    lower_bound: f64,
    upper_bound: f64,
    #[serde(default)]
    percent_change: Option<f64>,
}

/// Write points as CSV to any writer
pub fn write_forecast<W: Write>(
    writer: W,
    points: &[ForecastPoint],
    columns: ExportColumns,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if points.is_empty() {
        // serde only emits the header alongside the first record
        match columns {
            ExportColumns::Bounds => csv_writer.write_record([
                "date",
                "point_estimate",
                "lower_bound",
                "upper_bound",
            ])?,
            ExportColumns::WithPercentChange => csv_writer.write_record([
                "date",
                "point_estimate",
                "lower_bound",
                "upper_bound",
                "percent_change",
            ])?,
        }
    }

    for point in points {
        match columns {
            ExportColumns::Bounds => csv_writer.serialize(BoundsRecord {
                date: point.date,
                point_estimate: point.point_estimate,
                lower_bound: point.lower_bound,
                upper_bound: point.upper_bound,
            })?,
            ExportColumns::WithPercentChange => csv_writer.serialize(ForecastRecord {
                date: point.date,
                point_estimate: point.point_estimate,
                lower_bound: point.lower_bound,
                upper_bound: point.upper_bound,
                percent_change: point.percent_change,
            })?,
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render points as a CSV string
pub fn forecast_to_csv_string(points: &[ForecastPoint], columns: ExportColumns) -> Result<String> {
    let mut buffer = Vec::new();
    write_forecast(&mut buffer, points, columns)?;
    String::from_utf8(buffer).map_err(|e| ForecastError::Csv(e.to_string()))
}

/// Write points to a CSV file, replacing any existing file
pub fn write_forecast_file<P: AsRef<Path>>(
    path: P,
    points: &[ForecastPoint],
    columns: ExportColumns,
) -> Result<()> {
    let path = path.as_ref();
    write_forecast(File::create(path)?, points, columns)?;
    info!(path = %path.display(), rows = points.len(), "exported forecast");
    Ok(())
}

/// Parse an exported forecast from any reader
pub fn read_forecast<R: Read>(reader: R) -> Result<Vec<ForecastPoint>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<ForecastRecord>()
        .map(|record| -> Result<ForecastPoint> {
            let record = record?;
            Ok(ForecastPoint {
                date: record.date,
                point_estimate: record.point_estimate,
                lower_bound: record.lower_bound,
                upper_bound: record.upper_bound,
                percent_change: record.percent_change,
            })
        })
        .collect()
}

/// Parse an exported forecast file
pub fn read_forecast_file<P: AsRef<Path>>(path: P) -> Result<Vec<ForecastPoint>> {
    read_forecast(File::open(path)?)
}
