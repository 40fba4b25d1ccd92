//! # Sales Forecast
//!
//! A Rust library for retail sales analysis and forecasting.
//!
//! ## Features
//!
//! - Transaction-level CSV loading and daily aggregation
//! - Daily, weekly and monthly resampling, cumulative sales, top categories
//! - Additive trend + seasonality forecasting with uncertainty intervals
//! - Scenario simulation (promotion and seasonality multipliers)
//! - Forecast summaries, insights and CSV export
//! - Offline training with a persisted model artifact
//!
//! ## Quick Start
//!
//! ```no_run
//! use sales_forecast::models::additive::{AdditiveModel, TrainedAdditiveModel};
//! use sales_forecast::scenario::Scenario;
//! use sales_forecast::service::{ForecastService, ScenarioRequest};
//! use sales_forecast::{ModelArtifact, Trainer};
//!
//! // Train once and persist the model
//! let trainer = Trainer::new(AdditiveModel::default(), "sales_forecast_model.json");
//! trainer.train("retail_sales_dataset.csv")?;
//!
//! // Later: load the model and run a what-if forecast
//! let model: TrainedAdditiveModel = ModelArtifact::load("sales_forecast_model.json")?;
//! let service = ForecastService::new(model);
//! let run = service.run(&ScenarioRequest {
//!     horizon_days: 30,
//!     scenario: Scenario::new(10.0, -5.0),
//! })?;
//!
//! for line in run.insights.lines() {
//!     println!("{}", line);
//! }
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod aggregation;
pub mod analysis;
pub mod artifact;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod models;
pub mod scenario;
pub mod service;
pub mod summary;
pub mod trainer;
pub mod utils;

// Re-export commonly used types
pub use crate::aggregation::Granularity;
pub use crate::artifact::ModelArtifact;
pub use crate::data::{DataLoader, SalesTable, TimeSeries};
pub use crate::error::ForecastError;
pub use crate::models::{ForecastModel, ForecastPoint, TrainedForecastModel};
pub use crate::service::ForecastService;
pub use crate::trainer::Trainer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
