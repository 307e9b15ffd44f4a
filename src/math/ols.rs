//! Least squares for growth estimation.
//!
//! The growth report fits a straight line through `ln(total)` over the last few
//! days:
//!
//! ```text
//! ln(total_i) ≈ a + b·i,   daily growth factor = exp(b)
//! ```
//!
//! The system is tiny (two columns), so an SVD solve is plenty fast and copes
//! with degenerate inputs without panicking.

use nalgebra::{DMatrix, DVector};

/// Singular values below this are treated as zero.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Ordinary least squares `x·β ≈ y` through an SVD.
///
/// Returns `None` when the solve fails or yields non-finite coefficients.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    x.clone()
        .svd(true, true)
        .solve(y, SINGULAR_TOLERANCE)
        .ok()
        .filter(|beta| beta.iter().all(|v| v.is_finite()))
}

/// Daily growth factor of a series assumed to grow exponentially.
///
/// Fits `ln(values[i]) = a + b·i` and returns `exp(b)`. Needs at least two
/// strictly positive values.
pub fn log_linear_growth(values: &[f64]) -> Option<f64> {
    if values.len() < 2 || values.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
        return None;
    }

    let n = values.len();
    let mut design = Vec::with_capacity(n * 2);
    for i in 0..n {
        design.push(1.0);
        design.push(i as f64);
    }
    let x = DMatrix::from_row_slice(n, 2, &design);
    let y = DVector::from_iterator(n, values.iter().map(|v| v.ln()));

    let beta = solve_least_squares(&x, &y)?;
    Some(beta[1].exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_through_exact_points_is_recovered() {
        // y = -1 + 0.5x on x = [0, 2, 4, 6]
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 2.0, 1.0, 4.0, 1.0, 6.0]);
        let y = DVector::from_row_slice(&[-1.0, 0.0, 1.0, 2.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] + 1.0).abs() < 1e-10);
        assert!((beta[1] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn doubling_series_has_growth_factor_two() {
        let growth = log_linear_growth(&[100.0, 200.0, 400.0, 800.0, 1600.0]).unwrap();
        assert!((growth - 2.0).abs() < 1e-9, "got {growth}");
    }

    #[test]
    fn flat_series_has_growth_factor_one() {
        let growth = log_linear_growth(&[500.0; 5]).unwrap();
        assert!((growth - 1.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_values_are_rejected() {
        assert_eq!(log_linear_growth(&[0.0, 10.0, 20.0]), None);
        assert_eq!(log_linear_growth(&[10.0]), None);
    }
}
