use thiserror::Error;

/// Terminal outcomes of building or solving a [`LinearProgram`](crate::LinearProgram)
/// that do not produce a numeric answer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("Problem data contains NaN or infinite values")]
    NonFinite,
    #[error("Problem is infeasible (phase 1 objective {residual:e} is not zero)")]
    Infeasible { residual: f64 },
    #[error("Problem is unbounded along entering variable x{entering}")]
    Unbounded { entering: usize },
    #[error("Iteration limit reached after {iterations} pivots, cycling suspected")]
    CycleSuspected { iterations: usize },
    #[error("No unit column found for rows {rows:?}, an initial basis is required")]
    NoInitialBasis { rows: Vec<usize> },
}
