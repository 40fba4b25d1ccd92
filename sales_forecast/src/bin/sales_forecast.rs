//! # sales_forecast
//!
//! Command-line front end: train the model, analyse history, and run live
//! scenario forecasts from a trained model.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sales_forecast::aggregation::Granularity;
use sales_forecast::analysis::{AnalysisRequest, HistoricalAnalysis};
use sales_forecast::config::ForecastConfig;
use sales_forecast::export::{write_forecast_file, ExportColumns};
use sales_forecast::models::additive::{AdditiveModel, TrainedAdditiveModel};
use sales_forecast::models::ForecastPoint;
use sales_forecast::scenario::Scenario;
use sales_forecast::service::{ForecastService, ScenarioRequest};
use sales_forecast::summary::{format_currency, Summary};
use sales_forecast::utils::parse_date;
use sales_forecast::{DataLoader, ModelArtifact, Trainer};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sales_forecast")]
#[command(about = "Retail sales analysis and forecasting", long_about = None)]
struct Cli {
    /// Configuration file (JSON); command line flags take precedence
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the forecast model on a sales CSV and save it
    Train {
        /// Transaction-level sales CSV
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to write the model artifact
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize historical sales and forecast from them
    Analyze {
        /// Transaction-level sales CSV
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// First date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        from: Option<NaiveDate>,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        to: Option<NaiveDate>,

        /// Trend granularity (daily, weekly, monthly)
        #[arg(short, long)]
        granularity: Option<Granularity>,

        /// Number of top product categories
        #[arg(long)]
        top_n: Option<usize>,

        /// Days to forecast from the analysed history (0 to skip)
        #[arg(long)]
        forecast_days: Option<i64>,

        /// Write the historical forecast to this CSV
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Run a live forecast from the trained model with scenario adjustments
    Forecast {
        /// Model artifact written by `train`
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Forecast period in days
        #[arg(short, long, allow_negative_numbers = true)]
        days: Option<i64>,

        /// Promotion / boost factor in percent
        #[arg(long, allow_negative_numbers = true)]
        promo: Option<f64>,

        /// Seasonality adjustment in percent
        #[arg(long, allow_negative_numbers = true)]
        season: Option<f64>,

        /// Rows in the summary table
        #[arg(long)]
        rows: Option<usize>,

        /// Write the live forecast to this CSV
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

fn parse_day(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = ForecastConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Train { input, output } => train(&config, input, output),
        Commands::Analyze {
            input,
            from,
            to,
            granularity,
            top_n,
            forecast_days,
            export,
        } => analyze(
            &config,
            input,
            (from, to),
            granularity,
            top_n,
            forecast_days,
            export,
        ),
        Commands::Forecast {
            model,
            days,
            promo,
            season,
            rows,
            export,
        } => {
            let request = scenario_request(&config, days, promo, season);
            forecast(&config, model, request, rows, export)
        }
    }
}

/// Live forecast inputs, each flag falling back to the configured value
fn scenario_request(
    config: &ForecastConfig,
    days: Option<i64>,
    promo: Option<f64>,
    season: Option<f64>,
) -> ScenarioRequest {
    ScenarioRequest {
        horizon_days: days.unwrap_or(config.forecast.horizon_days),
        scenario: Scenario::new(
            promo.unwrap_or(config.forecast.promo_pct),
            season.unwrap_or(config.forecast.season_pct),
        ),
    }
}

/// Analysis inputs, each flag falling back to the configured value
fn analysis_request(
    config: &ForecastConfig,
    date_range: Option<(NaiveDate, NaiveDate)>,
    granularity: Option<Granularity>,
    top_n: Option<usize>,
) -> AnalysisRequest {
    AnalysisRequest {
        date_range,
        granularity: granularity.unwrap_or(config.analysis.granularity),
        top_n: top_n.unwrap_or(config.analysis.top_n),
    }
}

/// Complete a partial `--from`/`--to` range with the table's own bounds.
///
/// No flags means no filter. An open end falls back to the first or last
/// date of the table; an empty table has nothing to fall back to.
fn resolve_date_range(
    bounds: (Option<NaiveDate>, Option<NaiveDate>),
    table_bounds: Option<(NaiveDate, NaiveDate)>,
) -> Option<(NaiveDate, NaiveDate)> {
    match (bounds, table_bounds) {
        ((None, None), _) => None,
        ((from, to), Some((min, max))) => Some((from.unwrap_or(min), to.unwrap_or(max))),
        (_, None) => None,
    }
}

/// The first `rows` points after the last historical date
fn upcoming(points: &[ForecastPoint], last: Option<NaiveDate>, rows: usize) -> &[ForecastPoint] {
    let start = match last {
        Some(last) => points.partition_point(|p| p.date <= last),
        None => 0,
    };
    let future = &points[start..];
    &future[..rows.min(future.len())]
}

fn train(config: &ForecastConfig, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let input = input.unwrap_or_else(|| config.data.csv_path.clone());
    let output = output.unwrap_or_else(|| config.model.artifact_path.clone());

    let model = AdditiveModel::new(config.model.additive.clone())?;
    let trainer = Trainer::new(model, output).with_columns(config.data.columns.clone());
    let report = trainer
        .train(&input)
        .with_context(|| format!("training on {} failed", input.display()))?;

    println!(
        "Model trained on {} days ({} to {}) and saved as {}",
        report.observations,
        report.first_date,
        report.last_date,
        report.artifact_path.display()
    );
    Ok(())
}

fn analyze(
    config: &ForecastConfig,
    input: Option<PathBuf>,
    bounds: (Option<NaiveDate>, Option<NaiveDate>),
    granularity: Option<Granularity>,
    top_n: Option<usize>,
    forecast_days: Option<i64>,
    export: Option<PathBuf>,
) -> Result<()> {
    let input = input.unwrap_or_else(|| config.data.csv_path.clone());
    let table = DataLoader::from_csv_with_columns(&input, &config.data.columns)?;

    let date_range = resolve_date_range(bounds, table.date_bounds());
    let request = analysis_request(config, date_range, granularity, top_n);
    let analysis = HistoricalAnalysis::build(&table, &request)?;

    println!("== {} sales ==", analysis.granularity);
    print_summary("Sales", &analysis.summary);

    println!("\n{} Sales Trend with % Change", analysis.granularity);
    for point in &analysis.trend {
        println!(
            "  {}  {:>14}  {}",
            point.date,
            format_currency(point.amount),
            format_change(point.percent_change)
        );
    }

    if let Some((date, total)) = analysis.cumulative.last() {
        println!("\nCumulative sales through {}: {}", date, format_currency(*total));
    }

    if !analysis.top_products.is_empty() {
        println!("\nTop {} Products", analysis.top_products.len());
        for product in &analysis.top_products {
            println!(
                "  {:<20} {:>14}  {:>5.1}%",
                product.category,
                format_currency(product.amount),
                product.share_pct
            );
        }
    }

    let forecast_days = forecast_days.unwrap_or(config.analysis.forecast_days);
    if forecast_days > 0 {
        let model = AdditiveModel::new(config.model.additive.clone())?;
        let points = analysis.forecast(&model, forecast_days)?;
        println!("\nForecast next {} days", forecast_days);
        if let Some(last) = analysis.series.last_date() {
            print_points(points.iter().filter(|p| p.date > last));
        }
        if let Some(path) = export {
            write_forecast_file(&path, &points, ExportColumns::Bounds)?;
            println!("\nHistorical forecast written to {}", path.display());
        }
    }

    Ok(())
}

fn forecast(
    config: &ForecastConfig,
    model: Option<PathBuf>,
    request: ScenarioRequest,
    rows: Option<usize>,
    export: Option<PathBuf>,
) -> Result<()> {
    let model_path = model.unwrap_or_else(|| config.model.artifact_path.clone());
    let model: TrainedAdditiveModel = ModelArtifact::load(&model_path)?;
    let service = ForecastService::new(model);

    info!(scenario = %request.scenario, "running live forecast");
    let run = service.run(&request)?;

    println!("== Live Forecast Next {} Days ==", request.horizon_days);
    println!("Scenario: {}", run.scenario);
    print_summary("Forecast", &run.summary);

    let rows = rows.unwrap_or(config.forecast.summary_rows);
    println!("\nForecast Summary (Next {} Days)", rows);
    let next = upcoming(&run.points, service.history().last_date(), rows);
    print_points(next.iter());

    println!("\nTop Insights");
    for line in run.insights.lines() {
        println!("  {}", line);
    }

    if let Some(path) = export {
        write_forecast_file(&path, &run.points, ExportColumns::WithPercentChange)?;
        println!("\nLive forecast written to {}", path.display());
    }

    Ok(())
}

fn print_summary(label: &str, summary: &Summary) {
    println!("Total {}:   {}", label, format_currency(summary.total));
    println!("Average {}: {}", label, format_currency(summary.average));
    println!(
        "Max {}:     {} ({})",
        label,
        format_currency(summary.max.value),
        summary.max.date
    );
    println!(
        "Min {}:     {} ({})",
        label,
        format_currency(summary.min.value),
        summary.min.date
    );
}

fn print_points<'a>(points: impl Iterator<Item = &'a ForecastPoint>) {
    println!(
        "  {:<10}  {:>12}  {:>12}  {:>12}  {:>9}",
        "Date", "Forecast", "Lower CI", "Upper CI", "% Change"
    );
    for point in points {
        println!(
            "  {}  {:>12.2}  {:>12.2}  {:>12.2}  {:>9}",
            point.date,
            point.point_estimate,
            point.lower_bound,
            point.upper_bound,
            format_change(point.percent_change)
        );
    }
}

fn format_change(change: Option<f64>) -> String {
    match change {
        Some(c) if c > 0.0 => format!("▲{:.1}%", c),
        Some(c) if c < 0.0 => format!("▼{:.1}%", c.abs()),
        Some(_) => "0.0%".to_string(),
        None => "-".to_string(),
    }
}
