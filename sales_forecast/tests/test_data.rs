use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sales_forecast::data::{ColumnMapping, DataLoader, SalesObservation, TimeSeries};
use sales_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_data_loader_from_csv() {
    let file = write_csv(&[
        "Transaction ID,Date,Customer ID,Product Category,Quantity,Price per Unit,Total Amount",
        "1,2023-11-24,CUST001,Beauty,3,50,150",
        "2,2023-02-27,CUST002,Clothing,2,500,1000",
        "3,2023-01-13,CUST003,Electronics,1,30,30",
        "4,2023-01-13,CUST004,Clothing,1,500,500",
    ]);

    let table = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(table.len(), 4);
    assert!(!table.is_empty());
    assert_eq!(table.date_bounds(), Some((day("2023-01-13"), day("2023-11-24"))));
    assert_eq!(table.transactions()[1].category.as_deref(), Some("Clothing"));
}

#[test]
fn test_daily_series_sums_per_date() {
    let file = write_csv(&[
        "Date,Total Amount",
        "2023-01-02,30",
        "2023-01-01,100",
        "2023-01-02,20",
        "2023-01-01,50",
    ]);

    let series = DataLoader::from_csv(file.path()).unwrap().daily_series();
    assert_eq!(series.dates(), vec![day("2023-01-01"), day("2023-01-02")]);
    assert_eq!(series.amounts(), vec![150.0, 50.0]);
    assert_eq!(series.total(), 200.0);
}

#[test]
fn test_missing_category_column_is_allowed() {
    let file = write_csv(&["Date,Total Amount", "2023-01-01,10", "2023-01-02,20"]);

    let table = DataLoader::from_csv(file.path()).unwrap();
    assert!(table.transactions().iter().all(|t| t.category.is_none()));
    assert!(table.top_categories(5).is_empty());
}

#[test]
fn test_custom_column_names() {
    let file = write_csv(&["day,revenue,segment", "2023-03-01,12.5,Toys", "2023-03-02,7.5,Toys"]);
    let columns = ColumnMapping {
        date: "day".to_string(),
        amount: "revenue".to_string(),
        category: "segment".to_string(),
    };

    let table = DataLoader::from_csv_with_columns(file.path(), &columns).unwrap();
    assert_eq!(table.daily_series().total(), 20.0);
    assert_eq!(table.top_categories(1)[0].category, "Toys");
}

#[test]
fn test_data_loader_error_handling() {
    // Nonexistent file
    let result = DataLoader::from_csv("nonexistent_file.csv");
    assert!(matches!(result, Err(ForecastError::Io(_))));

    // Required column missing
    let file = write_csv(&["Date,Amount", "2023-01-01,10"]);
    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataFormat(_))));

    // Unparsable date
    let file = write_csv(&["Date,Total Amount", "2023-01-01,10", "not a date,20"]);
    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataFormat(_))));

    // Non-numeric amount
    let file = write_csv(&["Date,Total Amount", "2023-01-01,10", "2023-01-02,lots"]);
    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataFormat(_))));

    // Header only
    let file = write_csv(&["Date,Total Amount"]);
    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataFormat(_))));
}

#[test]
fn test_filter_date_range() {
    let file = write_csv(&[
        "Date,Total Amount",
        "2023-01-01,10",
        "2023-01-05,20",
        "2023-01-10,30",
    ]);
    let table = DataLoader::from_csv(file.path()).unwrap();

    let filtered = table
        .filter_date_range(day("2023-01-02"), day("2023-01-10"))
        .unwrap();
    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered.daily_series().total(), 50.0);

    let empty = table
        .filter_date_range(day("2023-02-01"), day("2023-02-28"))
        .unwrap();
    assert!(empty.is_empty());

    let reversed = table.filter_date_range(day("2023-01-10"), day("2023-01-01"));
    assert!(matches!(reversed, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_time_series_validation() {
    let ok = TimeSeries::from_parts(
        vec![day("2023-01-01"), day("2023-01-03")],
        vec![1.0, 2.0],
    );
    assert!(ok.is_ok());

    let duplicate = TimeSeries::from_parts(
        vec![day("2023-01-01"), day("2023-01-01")],
        vec![1.0, 2.0],
    );
    assert!(matches!(duplicate, Err(ForecastError::DataFormat(_))));

    let unordered = TimeSeries::new(vec![
        SalesObservation {
            date: day("2023-01-02"),
            amount: 1.0,
        },
        SalesObservation {
            date: day("2023-01-01"),
            amount: 1.0,
        },
    ]);
    assert!(unordered.is_err());

    let mismatched = TimeSeries::from_parts(vec![day("2023-01-01")], vec![1.0, 2.0]);
    assert!(mismatched.is_err());

    let non_finite = TimeSeries::from_parts(vec![day("2023-01-01")], vec![f64::NAN]);
    assert!(non_finite.is_err());
}

#[test]
fn test_time_series_derived_values() {
    let series = TimeSeries::from_parts(
        vec![day("2023-01-01"), day("2023-01-02"), day("2023-01-03")],
        vec![100.0, 200.0, 150.0],
    )
    .unwrap();

    assert_eq!(series.percent_changes(), vec![None, Some(100.0), Some(-25.0)]);
    assert_eq!(
        series.cumulative(),
        vec![
            (day("2023-01-01"), 100.0),
            (day("2023-01-02"), 300.0),
            (day("2023-01-03"), 450.0),
        ]
    );

    let summary = series.summary().unwrap();
    assert_eq!(summary.total, 450.0);
    assert_eq!(summary.average, 150.0);
    assert_eq!(summary.max.date, day("2023-01-02"));
    assert_eq!(summary.min.date, day("2023-01-01"));
}

#[test]
fn test_time_series_serde_rejects_unordered_dates() {
    let json = r#"[{"date":"2023-01-02","amount":1.0},{"date":"2023-01-01","amount":2.0}]"#;
    let parsed: Result<TimeSeries, _> = serde_json::from_str(json);
    assert!(parsed.is_err());
}
