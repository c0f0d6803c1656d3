use log::{debug, info, warn};
use ndarray::{Array1, Array2, Axis};

use crate::basis::UnitBasis;
use crate::error::SolveError;
use crate::pivot::{self, EtaColumn};
use crate::problem::LinearProgram;
use crate::solution::Vertex;

/// Lifecycle of one engine run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Initialized,
    Iterating,
    Optimal,
    Unbounded,
}

/// Outcome of a single simplex iteration
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `entering` replaced `leaving` as the basic variable of `row`
    Pivoted {
        entering: usize,
        leaving: usize,
        row: usize,
    },
    /// The current basis is optimal
    Optimal(Vertex),
}

/// Revised simplex engine over a program whose constraint matrix already
/// contains a unit basis.
///
/// The engine keeps the basis inverse explicitly and updates it with one
/// eta matrix per pivot instead of re-inverting.
#[derive(Debug)]
pub struct RevisedSimplex<'a> {
    program: &'a LinearProgram,
    /// Basic variable of each row
    basis: Vec<usize>,
    nonbasis: Vec<usize>,
    basis_inverse: Array2<f64>,
    /// Column j is A[:, nonbasis[j]]
    nonbasis_matrix: Array2<f64>,
    basis_costs: Array1<f64>,
    nonbasis_costs: Array1<f64>,
    reduced_costs: Array1<f64>,
    state: EngineState,
    /// Variable whose column certified unboundedness
    unbounded_along: Option<usize>,
    iterations: usize,
    tolerance: f64,
    max_iterations: usize,
}

impl<'a> RevisedSimplex<'a> {
    /// Set up the starting basis from the unit columns of `program`.
    ///
    /// Fails with [`SolveError::NoInitialBasis`] when some row has no unit
    /// column; such programs go through the two-phase driver first.
    pub fn new(
        program: &'a LinearProgram,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<Self, SolveError> {
        let a = &program.constraints;
        let (m, n) = a.dim();

        let detected = UnitBasis::detect(a, tolerance);
        let basis = detected.indices().ok_or_else(|| SolveError::NoInitialBasis {
            rows: detected.problematic_rows(),
        })?;

        let mut is_basic = vec![false; n];
        for &j in &basis {
            is_basic[j] = true;
        }
        let nonbasis: Vec<usize> = (0..n).filter(|&j| !is_basic[j]).collect();

        let basis_costs = basis.iter().map(|&j| program.cost[j]).collect();
        let nonbasis_costs = nonbasis.iter().map(|&j| program.cost[j]).collect();
        let nonbasis_matrix = a.select(Axis(1), &nonbasis);

        Ok(Self {
            program,
            basis,
            reduced_costs: Array1::zeros(nonbasis.len()),
            nonbasis,
            basis_inverse: Array2::eye(m),
            nonbasis_matrix,
            basis_costs,
            nonbasis_costs,
            state: EngineState::Initialized,
            unbounded_along: None,
            iterations: 0,
            tolerance,
            max_iterations,
        })
    }

    /// Iterate until the basis is optimal
    pub fn run(&mut self) -> Result<Vertex, SolveError> {
        loop {
            if let Step::Optimal(vertex) = self.step()? {
                return Ok(vertex);
            }
        }
    }

    /// Price the current basis and pivot once if it is not optimal.
    ///
    /// Once the engine is optimal or unbounded, further calls repeat that
    /// outcome without pivoting.
    pub fn step(&mut self) -> Result<Step, SolveError> {
        let program = self.program;

        match (self.state, self.unbounded_along) {
            (EngineState::Optimal, _) => {
                let b_bar = self.basis_inverse.dot(&program.rhs);
                let objective = self.basis_costs.dot(&b_bar);
                return Ok(Step::Optimal(self.vertex(&b_bar, objective)));
            }
            (EngineState::Unbounded, Some(entering)) => {
                return Err(SolveError::Unbounded { entering });
            }
            _ => {}
        }

        let w = self.basis_costs.dot(&self.basis_inverse);
        let b_bar = self.basis_inverse.dot(&program.rhs);
        self.reduced_costs = w.dot(&self.nonbasis_matrix) - &self.nonbasis_costs;
        let objective = w.dot(&program.rhs);

        debug!("iteration {}: objective {}", self.iterations, objective);

        let k = match pivot::entering_position(&self.reduced_costs) {
            Some(k) if !pivot::is_optimal(&self.reduced_costs, self.tolerance) => k,
            _ => {
                self.state = EngineState::Optimal;
                info!(
                    "optimal after {} iterations, objective {}",
                    self.iterations, objective
                );
                return Ok(Step::Optimal(self.vertex(&b_bar, objective)));
            }
        };
        let entering = self.nonbasis[k];

        let y = self.basis_inverse.dot(&program.constraints.column(entering));
        let row = match pivot::min_ratio_row(&y, &b_bar, self.tolerance) {
            Some(row) if !pivot::is_unbounded(&y, self.tolerance) => row,
            _ => {
                self.state = EngineState::Unbounded;
                self.unbounded_along = Some(entering);
                warn!("unbounded along x{} at iteration {}", entering, self.iterations);
                return Err(SolveError::Unbounded { entering });
            }
        };

        if self.iterations >= self.max_iterations {
            warn!(
                "stopping after {} iterations without reaching optimality",
                self.iterations
            );
            return Err(SolveError::CycleSuspected {
                iterations: self.iterations,
            });
        }
        let leaving = self.basis[row];

        debug!("  entering x{}, leaving x{} (row {})", entering, leaving, row);

        self.basis[row] = entering;
        self.nonbasis[k] = leaving;
        let leaving_cost = self.basis_costs[row];
        self.basis_costs[row] = self.nonbasis_costs[k];
        self.nonbasis_costs[k] = leaving_cost;
        self.nonbasis_matrix
            .column_mut(k)
            .assign(&program.constraints.column(leaving));

        EtaColumn::new(&y, row).apply(&mut self.basis_inverse);

        self.iterations += 1;
        self.state = EngineState::Iterating;

        Ok(Step::Pivoted {
            entering,
            leaving,
            row,
        })
    }

    fn vertex(&self, b_bar: &Array1<f64>, objective: f64) -> Vertex {
        let mut x = vec![0.0; self.program.num_variables()];
        for (row, &var) in self.basis.iter().enumerate() {
            x[var] = b_bar[row];
        }
        Vertex { x, objective }
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn nonbasis(&self) -> &[usize] {
        &self.nonbasis
    }

    pub fn basis_inverse(&self) -> &Array2<f64> {
        &self.basis_inverse
    }

    pub fn nonbasis_matrix(&self) -> &Array2<f64> {
        &self.nonbasis_matrix
    }

    /// Reduced costs from the most recent pricing step
    pub fn reduced_costs(&self) -> &Array1<f64> {
        &self.reduced_costs
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Pivots performed so far
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Largest absolute deviation of `B^-1 * A[:, basis]` from the identity
    pub fn basis_residual(&self) -> f64 {
        let basis_matrix = self.program.constraints.select(Axis(1), &self.basis);
        let product = self.basis_inverse.dot(&basis_matrix);
        (product - Array2::<f64>::eye(self.basis.len()))
            .iter()
            .fold(0.0, |acc: f64, v| acc.max(v.abs()))
    }
}
