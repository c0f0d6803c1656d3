//! Pricing, ratio test and basis-inverse update helpers used by the engine.
//!
//! Selection is deterministic: the entering variable is the first position
//! holding the largest reduced cost (Dantzig's rule) and the leaving row is
//! the first row reaching the minimum ratio. Nothing here prevents cycling
//! on degenerate problems.

use ndarray::{Array1, Array2};

/// No reduced cost exceeds `tolerance`, so the current basis is optimal
pub fn is_optimal(reduced_costs: &Array1<f64>, tolerance: f64) -> bool {
    reduced_costs.iter().all(|&d| d <= tolerance)
}

/// The pivot column has no positive entry, so the objective decreases
/// without bound along the entering direction
pub fn is_unbounded(pivot_column: &Array1<f64>, tolerance: f64) -> bool {
    pivot_column.iter().all(|&y| y <= tolerance)
}

/// Nonbasis position with the largest reduced cost, first occurrence on ties
pub fn entering_position(reduced_costs: &Array1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (j, &d) in reduced_costs.iter().enumerate() {
        match best {
            Some((_, max)) if d <= max => {}
            _ => best = Some((j, d)),
        }
    }
    best.map(|(j, _)| j)
}

/// Minimum-ratio test over rows with a positive pivot entry.
///
/// Returns the basis row minimizing `b_bar[i] / y[i]`; the strict comparison
/// keeps the first row on ties.
pub fn min_ratio_row(pivot_column: &Array1<f64>, b_bar: &Array1<f64>, tolerance: f64) -> Option<usize> {
    let mut min_ratio = f64::INFINITY;
    let mut min_row = None;

    for (i, (&y, &b)) in pivot_column.iter().zip(b_bar.iter()).enumerate() {
        if y > tolerance {
            let ratio = b / y;
            if ratio < min_ratio {
                min_ratio = ratio;
                min_row = Some(i);
            }
        }
    }

    min_row
}

/// Non-identity column of the elementary matrix for one pivot.
///
/// E equals the identity except column `row`, which holds `1 / y[row]` on
/// the diagonal and `-y[i] / y[row]` elsewhere. Left-multiplying the basis
/// inverse by E yields the inverse of the basis after the pivot.
#[derive(Debug, Clone)]
pub struct EtaColumn {
    row: usize,
    column: Array1<f64>,
}

impl EtaColumn {
    /// Requires `y[row]` to be nonzero, which the ratio test guarantees
    pub fn new(pivot_column: &Array1<f64>, row: usize) -> Self {
        let pivot = pivot_column[row];
        let column = pivot_column
            .iter()
            .enumerate()
            .map(|(i, &y)| if i == row { 1.0 / pivot } else { -y / pivot })
            .collect();
        Self { row, column }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> &Array1<f64> {
        &self.column
    }

    /// The full m x m elementary matrix
    pub fn matrix(&self) -> Array2<f64> {
        let mut e = Array2::eye(self.column.len());
        e.column_mut(self.row).assign(&self.column);
        e
    }

    /// Replace `inverse` with `E * inverse` without forming E
    pub fn apply(&self, inverse: &mut Array2<f64>) {
        let pivot_row = inverse.row(self.row).to_owned();
        for (i, mut row) in inverse.rows_mut().into_iter().enumerate() {
            if i == self.row {
                row.assign(&pivot_row.mapv(|v| v * self.column[i]));
            } else {
                row.scaled_add(self.column[i], &pivot_row);
            }
        }
    }
}
