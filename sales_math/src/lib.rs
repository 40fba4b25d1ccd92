//! # Sales Math
//!
//! Numeric building blocks for retail sales analysis.
//! This crate provides the summary statistics, percent change and
//! cumulative calculations used by the dashboard views, plus the Fourier
//! features and regularised least squares solver behind the additive
//! forecasting model.

use thiserror::Error;

pub mod fourier;
pub mod regression;
pub mod stats;

/// Errors that can occur in sales calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for sales math operations
pub type Result<T> = std::result::Result<T, MathError>;
