//! # Sales Forecast Workspace
//!
//! Umbrella crate for the retail sales dashboard core. It re-exports the
//! workspace members under short names:
//!
//! - [`forecast`]: data loading, aggregation, the additive model, scenario
//!   runs, training and export
//! - [`math`]: statistics, Fourier features and the ridge solver
//!
//! ## Example
//!
//! ```
//! use sales_forecast_workspace::forecast::scenario::Scenario;
//!
//! let promo_week = Scenario::new(10.0, -5.0);
//! assert!((promo_week.factor() - 1.05).abs() < 1e-12);
//! ```

pub use sales_forecast as forecast;
pub use sales_math as math;

/// Version of the workspace crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
