use std::fmt;

use ndarray::{Array1, Array2};

use crate::error::SolveError;
use crate::solution::Solution;
use crate::solver::Solver;

/// Optimization direction of a linear program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    /// Minimize cᵀx
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "min", alias = "minimize"))]
    Minimize,
    /// Maximize cᵀx
    #[cfg_attr(feature = "serde", serde(rename = "max", alias = "maximize"))]
    Maximize,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sense::Minimize => write!(f, "min"),
            Sense::Maximize => write!(f, "max"),
        }
    }
}

/// A linear program in standard form: optimize cᵀx subject to Ax = b, x >= 0
///
/// The cost vector is always stored as a minimization cost. For
/// [`Sense::Maximize`] it is negated on construction and the reported
/// objective is negated back.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    /// Cost vector in minimization form (length n)
    pub(crate) cost: Array1<f64>,
    /// Constraint matrix (m x n)
    pub(crate) constraints: Array2<f64>,
    /// Right-hand side, non-negative (length m)
    pub(crate) rhs: Array1<f64>,
    /// Sense the caller asked for
    pub(crate) sense: Sense,
    /// Populated by a successful solve
    pub(crate) solution: Option<Solution>,
}

/// Plain row-major form of a linear program, as read from a problem file
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemData {
    /// Cost vector
    pub c: Vec<f64>,
    /// Constraint matrix, one entry per row
    #[cfg_attr(feature = "serde", serde(rename = "A"))]
    pub a: Vec<Vec<f64>>,
    /// Right-hand side
    pub b: Vec<f64>,
    /// Optimization direction, minimize when absent
    #[cfg_attr(feature = "serde", serde(default))]
    pub sense: Sense,
}

impl LinearProgram {
    /// Build a program from cost vector `c`, constraint matrix `a` and
    /// right-hand side `b`.
    ///
    /// Rows with a negative right-hand side are negated so that b >= 0 holds,
    /// which leaves the feasible set unchanged.
    pub fn new(
        c: Array1<f64>,
        a: Array2<f64>,
        b: Array1<f64>,
        sense: Sense,
    ) -> Result<Self, SolveError> {
        let (m, n) = a.dim();
        if m != b.len() {
            return Err(SolveError::DimensionMismatch(format!(
                "A has {} rows but b has {} entries",
                m,
                b.len()
            )));
        }
        if n != c.len() {
            return Err(SolveError::DimensionMismatch(format!(
                "A has {} columns but c has {} entries",
                n,
                c.len()
            )));
        }
        if n < m {
            return Err(SolveError::DimensionMismatch(format!(
                "A has fewer columns ({}) than rows ({})",
                n, m
            )));
        }
        if !c.iter().chain(a.iter()).chain(b.iter()).all(|v| v.is_finite()) {
            return Err(SolveError::NonFinite);
        }

        let mut a = a;
        let mut b = b;
        for (mut row, rhs) in a.rows_mut().into_iter().zip(b.iter_mut()) {
            if *rhs < 0.0 {
                row.mapv_inplace(|v| -v);
                *rhs = -*rhs;
            }
        }

        let mut cost = c;
        if sense == Sense::Maximize {
            cost.mapv_inplace(|v| -v);
        }

        Ok(Self::from_parts(cost, a, b, sense))
    }

    /// Build a program from row-major vectors
    pub fn from_rows(
        c: Vec<f64>,
        a: Vec<Vec<f64>>,
        b: Vec<f64>,
        sense: Sense,
    ) -> Result<Self, SolveError> {
        let m = a.len();
        let n = a.first().map_or(c.len(), Vec::len);
        if let Some((i, row)) = a.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(SolveError::DimensionMismatch(format!(
                "row {} of A has {} entries, expected {}",
                i,
                row.len(),
                n
            )));
        }
        let flat: Vec<f64> = a.into_iter().flatten().collect();
        let a = Array2::from_shape_vec((m, n), flat)
            .map_err(|e| SolveError::DimensionMismatch(e.to_string()))?;
        Self::new(Array1::from(c), a, Array1::from(b), sense)
    }

    /// Derived programs already carry a minimization cost and b >= 0
    pub(crate) fn from_parts(
        cost: Array1<f64>,
        constraints: Array2<f64>,
        rhs: Array1<f64>,
        sense: Sense,
    ) -> Self {
        Self {
            cost,
            constraints,
            rhs,
            sense,
            solution: None,
        }
    }

    /// Solve with the default [`Solver`] configuration and store the result
    pub fn solve(&mut self) -> Result<&Solution, SolveError> {
        Solver::new().solve_in_place(self)
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.nrows()
    }

    pub fn num_variables(&self) -> usize {
        self.constraints.ncols()
    }

    /// Cost vector as minimized by the engine
    pub fn cost(&self) -> &Array1<f64> {
        &self.cost
    }

    pub fn constraints(&self) -> &Array2<f64> {
        &self.constraints
    }

    pub fn rhs(&self) -> &Array1<f64> {
        &self.rhs
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Decision variable values, `None` until a solve succeeds
    pub fn variable_values(&self) -> Option<&[f64]> {
        self.solution.as_ref().map(|s| s.values.as_slice())
    }

    /// Objective value in the caller's sense, `None` until a solve succeeds
    pub fn objective(&self) -> Option<f64> {
        self.solution.as_ref().map(|s| s.objective_value)
    }

    /// Convert a minimization-form objective into the caller's sense
    pub(crate) fn report_objective(&self, min_objective: f64) -> f64 {
        match self.sense {
            Sense::Minimize => min_objective,
            Sense::Maximize => -min_objective,
        }
    }
}

impl TryFrom<ProblemData> for LinearProgram {
    type Error = SolveError;

    fn try_from(data: ProblemData) -> Result<Self, Self::Error> {
        LinearProgram::from_rows(data.c, data.a, data.b, data.sense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rejects_row_count_mismatch() {
        let err = LinearProgram::new(
            array![1.0, 1.0],
            array![[1.0, 1.0]],
            array![1.0, 2.0],
            Sense::Minimize,
        )
        .unwrap_err();
        assert!(matches!(err, SolveError::DimensionMismatch(_)), "{:?}", err);
    }

    #[test]
    fn test_rejects_column_count_mismatch() {
        let err = LinearProgram::new(
            array![1.0, 1.0, 1.0],
            array![[1.0, 1.0]],
            array![1.0],
            Sense::Minimize,
        )
        .unwrap_err();
        assert!(matches!(err, SolveError::DimensionMismatch(_)));
    }

    #[test]
    fn test_rejects_more_rows_than_columns() {
        let err = LinearProgram::new(
            array![1.0],
            array![[1.0], [2.0]],
            array![1.0, 2.0],
            Sense::Minimize,
        )
        .unwrap_err();
        assert!(matches!(err, SolveError::DimensionMismatch(_)));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = LinearProgram::from_rows(
            vec![1.0, 2.0],
            vec![vec![1.0, 0.0], vec![1.0]],
            vec![1.0, 1.0],
            Sense::Minimize,
        )
        .unwrap_err();
        assert!(matches!(err, SolveError::DimensionMismatch(_)));
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = LinearProgram::new(
            array![1.0, f64::NAN],
            array![[1.0, 1.0]],
            array![1.0],
            Sense::Minimize,
        )
        .unwrap_err();
        assert_eq!(err, SolveError::NonFinite);
    }

    #[test]
    fn test_maximize_negates_cost() {
        let lp = LinearProgram::new(
            array![3.0, -2.0],
            array![[1.0, 1.0]],
            array![4.0],
            Sense::Maximize,
        )
        .unwrap();
        assert_eq!(lp.cost(), &array![-3.0, 2.0]);
        assert_eq!(lp.sense(), Sense::Maximize);
        assert_eq!(lp.report_objective(-11.0), 11.0);
    }

    #[test]
    fn test_negative_rhs_rows_are_flipped() {
        let lp = LinearProgram::new(
            array![1.0, 1.0, 0.0],
            array![[1.0, -1.0, 0.0], [2.0, 1.0, 1.0]],
            array![-3.0, 5.0],
            Sense::Minimize,
        )
        .unwrap();
        assert_eq!(lp.rhs(), &array![3.0, 5.0]);
        assert_eq!(lp.constraints(), &array![[-1.0, 1.0, 0.0], [2.0, 1.0, 1.0]]);
    }

    #[test]
    fn test_results_undefined_before_solve() {
        let lp = LinearProgram::from_rows(
            vec![1.0, 0.0],
            vec![vec![1.0, 1.0]],
            vec![2.0],
            Sense::Minimize,
        )
        .unwrap();
        assert_eq!(lp.num_constraints(), 1);
        assert_eq!(lp.num_variables(), 2);
        assert!(lp.variable_values().is_none());
        assert!(lp.objective().is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_problem_data_from_json() {
        let json = r#"{"c": [4, 1, 0, 0], "A": [[3, 1, 0, 0], [4, 3, -1, 0], [1, 2, 0, 1]], "b": [3, 6, 4]}"#;
        let data: ProblemData = serde_json::from_str(json).unwrap();
        assert_eq!(data.sense, Sense::Minimize);

        let lp = LinearProgram::try_from(data).unwrap();
        assert_eq!(lp.num_constraints(), 3);
        assert_eq!(lp.num_variables(), 4);

        let sense: Sense = serde_json::from_str(r#""maximize""#).unwrap();
        assert_eq!(sense, Sense::Maximize);
        assert_eq!(serde_json::to_string(&Sense::Maximize).unwrap(), r#""max""#);
    }
}
