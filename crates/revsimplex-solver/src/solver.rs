use log::info;

use crate::basis::UnitBasis;
use crate::error::SolveError;
use crate::problem::LinearProgram;
use crate::revised::RevisedSimplex;
use crate::solution::{Solution, SolvePath};
use crate::two_phase::TwoPhase;

/// Tolerance used for every floating point comparison by default
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Pivot limit per engine run before cycling is assumed
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Revised simplex solver for linear programs in standard form
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots per engine run before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Solve the problem, going through phase 1 first when the constraint
    /// matrix has no unit basis
    pub fn solve(&self, program: &LinearProgram) -> Result<Solution, SolveError> {
        let detected = UnitBasis::detect(&program.constraints, self.tolerance);

        if detected.is_complete() {
            info!("unit basis found, solving directly");
            let mut engine = RevisedSimplex::new(program, self.tolerance, self.max_iterations)?;
            let vertex = engine.run()?;
            return Ok(Solution {
                values: vertex.x,
                objective_value: program.report_objective(vertex.objective),
                path: SolvePath::Direct,
                phase_one_iterations: 0,
                iterations: engine.iterations(),
            });
        }

        info!(
            "rows {:?} lack a unit column, starting phase 1",
            detected.problematic_rows()
        );
        let mut driver = TwoPhase::new(program, self.tolerance, self.max_iterations);
        driver.build_artificial_model();
        let phase_two = driver.solve_phase_one()?;

        let mut engine = RevisedSimplex::new(&phase_two, self.tolerance, self.max_iterations)?;
        let vertex = engine.run()?;
        Ok(Solution {
            values: vertex.x,
            objective_value: program.report_objective(vertex.objective),
            path: SolvePath::TwoPhase,
            phase_one_iterations: driver.phase_one_iterations(),
            iterations: engine.iterations(),
        })
    }

    /// Solve and store the result on `program`; a failed solve clears any
    /// previously stored solution
    pub fn solve_in_place<'p>(&self, program: &'p mut LinearProgram) -> Result<&'p Solution, SolveError> {
        match self.solve(program) {
            Ok(solution) => Ok(program.solution.insert(solution)),
            Err(e) => {
                program.solution = None;
                Err(e)
            }
        }
    }
}
