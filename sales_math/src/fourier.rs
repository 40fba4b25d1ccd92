//! Fourier series features for periodic (seasonal) effects

use crate::{MathError, Result};
use std::f64::consts::PI;

/// Fourier terms of order `order` for a cycle of length `period` days
///
/// Returns `2 * order` values laid out as
/// `[sin(2πt/p), cos(2πt/p), sin(4πt/p), cos(4πt/p), ...]`.
pub fn fourier_terms(t_days: f64, period: f64, order: usize) -> Vec<f64> {
    let mut terms = Vec::with_capacity(2 * order);
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * t_days / period;
        terms.push(angle.sin());
        terms.push(angle.cos());
    }
    terms
}

/// Validate the parameters of a seasonal component
pub fn validate_component(period: f64, order: usize) -> Result<()> {
    if !(period > 0.0) || !period.is_finite() {
        return Err(MathError::InvalidInput(format!(
            "Seasonal period must be positive, got {}",
            period
        )));
    }
    if order == 0 {
        return Err(MathError::InvalidInput(
            "Fourier order must be at least 1".to_string(),
        ));
    }
    Ok(())
}
