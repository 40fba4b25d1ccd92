//! Ridge-regularised least squares
//!
//! Fits `y ≈ X β` where each column of `X` may carry its own quadratic
//! penalty, i.e. solves `(XᵀX + diag(penalties)) β = Xᵀy`. A zero penalty
//! leaves a column unregularised; a small floor is always added to the
//! diagonal so that the normal equations stay positive definite.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Diagonal floor added to every column for numerical stability
const STABILITY_FLOOR: f64 = 1e-8;

/// Coefficients of a fitted ridge regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeFit {
    /// One coefficient per design matrix column
    pub coefficients: Vec<f64>,
}

impl RidgeFit {
    /// Predict the response for a single design matrix row
    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(MathError::InvalidInput(format!(
                "Row has {} features but the fit has {} coefficients",
                row.len(),
                self.coefficients.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, beta)| x * beta)
            .sum())
    }

    /// Residuals `y - ŷ` over the rows used for fitting
    pub fn residuals(&self, rows: &[Vec<f64>], y: &[f64]) -> Result<Vec<f64>> {
        if rows.len() != y.len() {
            return Err(MathError::InvalidInput(format!(
                "Got {} rows but {} targets",
                rows.len(),
                y.len()
            )));
        }

        rows.iter()
            .zip(y.iter())
            .map(|(row, target)| -> Result<f64> { Ok(target - self.predict_row(row)?) })
            .collect()
    }
}

/// Fit a ridge regression with per-column penalties
///
/// # Arguments
/// * `rows` - Design matrix, one row per observation
/// * `y` - Target values (same length as `rows`)
/// * `penalties` - Non-negative penalty per column
pub fn ridge_fit(rows: &[Vec<f64>], y: &[f64], penalties: &[f64]) -> Result<RidgeFit> {
    if rows.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot fit a regression without observations".to_string(),
        ));
    }
    if rows.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Got {} rows but {} targets",
            rows.len(),
            y.len()
        )));
    }

    let k = penalties.len();
    if k == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix must have at least one column".to_string(),
        ));
    }
    if let Some(bad) = rows.iter().position(|row| row.len() != k) {
        return Err(MathError::InvalidInput(format!(
            "Row {} has {} features, expected {}",
            bad,
            rows[bad].len(),
            k
        )));
    }
    if penalties.iter().any(|p| *p < 0.0 || !p.is_finite()) {
        return Err(MathError::InvalidInput(
            "Penalties must be finite and non-negative".to_string(),
        ));
    }

    // Normal equations
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in rows.iter().zip(y.iter()) {
        for i in 0..k {
            xty[i] += row[i] * target;
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
        xtx[i][i] += penalties[i] + STABILITY_FLOOR;
    }

    let coefficients = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        MathError::CalculationError(
            "Regression failed: normal equations are not positive definite".to_string(),
        )
    })?;

    Ok(RidgeFit { coefficients })
}

/// Solve `A x = b` for symmetric positive definite `A` by Cholesky decomposition
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L Lᵀ
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * z[j];
        }
        z[i] = sum / l[i][i];
    }

    // Lᵀ x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}
