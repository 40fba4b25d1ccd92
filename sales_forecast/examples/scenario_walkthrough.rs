use sales_forecast::aggregation::Granularity;
use sales_forecast::analysis::{AnalysisRequest, HistoricalAnalysis};
use sales_forecast::export::{forecast_to_csv_string, ExportColumns};
use sales_forecast::models::additive::{AdditiveModel, TrainedAdditiveModel};
use sales_forecast::scenario::Scenario;
use sales_forecast::service::{ForecastService, ScenarioRequest};
use sales_forecast::summary::format_currency;
use sales_forecast::{DataLoader, ModelArtifact, Trainer};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sales Forecast: Scenario Walkthrough");
    println!("====================================\n");

    let csv_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("examples/csv/retail_sales_sample.csv");
    let model_dir = std::env::temp_dir().join("sales_forecast_walkthrough");
    let model_path = model_dir.join("sales_forecast_model.json");

    // Historical view
    let table = DataLoader::from_csv(&csv_path)?;
    println!("Loaded {} transactions", table.len());

    let weekly = HistoricalAnalysis::build(
        &table,
        &AnalysisRequest {
            granularity: Granularity::Weekly,
            ..AnalysisRequest::default()
        },
    )?;
    println!("\nWeekly sales:");
    for point in &weekly.trend {
        let change = point
            .percent_change
            .map(|c| format!("{:+.1}%", c))
            .unwrap_or_else(|| "-".to_string());
        println!("  {}  {:>10}  {}", point.date, format_currency(point.amount), change);
    }
    println!("\nTop categories:");
    for product in &weekly.top_products {
        println!("  {:<12} {:>10} ({:.1}%)", product.category, format_currency(product.amount), product.share_pct);
    }

    // Offline training
    println!("\nTraining...");
    let report = Trainer::new(AdditiveModel::default(), &model_path).train(&csv_path)?;
    println!(
        "Trained on {} days ({} to {})",
        report.observations, report.first_date, report.last_date
    );

    // Live forecasts under a few scenarios
    let model: TrainedAdditiveModel = ModelArtifact::load(&model_path)?;
    let service = ForecastService::new(model);

    for scenario in [
        Scenario::default(),
        Scenario::new(15.0, 0.0),
        Scenario::new(10.0, -20.0),
    ] {
        let run = service.run(&ScenarioRequest {
            horizon_days: 30,
            scenario,
        })?;
        println!("\nScenario {}", scenario);
        print!("{}", run.summary);
        print!("{}", run.insights);
    }

    let baseline = service.run(&ScenarioRequest {
        horizon_days: 7,
        scenario: Scenario::default(),
    })?;
    let last = report.last_date;
    println!("\nNext 7 days as CSV:");
    print!(
        "{}",
        forecast_to_csv_string(baseline.after(last), ExportColumns::WithPercentChange)?
    );

    std::fs::remove_dir_all(&model_dir)?;
    Ok(())
}
