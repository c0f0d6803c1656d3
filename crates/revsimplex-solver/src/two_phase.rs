use log::{debug, info, warn};
use ndarray::{s, Array1, Array2, Axis};

use crate::basis::UnitBasis;
use crate::error::SolveError;
use crate::problem::LinearProgram;
use crate::revised::RevisedSimplex;

/// Two-phase driver for programs without a unit basis.
///
/// Phase 1 minimizes the sum of artificial variables appended to the rows
/// that lack a unit column. A zero optimum yields a feasible basis, from
/// which a canonical phase 2 program is derived. The original program is
/// only read; every derived model is an independent copy.
#[derive(Debug)]
pub struct TwoPhase<'a> {
    program: &'a LinearProgram,
    artificial: Option<LinearProgram>,
    num_artificial: usize,
    phase_one_iterations: usize,
    tolerance: f64,
    max_iterations: usize,
}

impl<'a> TwoPhase<'a> {
    pub fn new(program: &'a LinearProgram, tolerance: f64, max_iterations: usize) -> Self {
        Self {
            program,
            artificial: None,
            num_artificial: 0,
            phase_one_iterations: 0,
            tolerance,
            max_iterations,
        }
    }

    /// Append one unit column per problematic row and price only those
    /// columns, at cost 1 each
    pub fn build_artificial_model(&mut self) -> &LinearProgram {
        let model = self.make_artificial_model();
        self.artificial.insert(model)
    }

    fn make_artificial_model(&mut self) -> LinearProgram {
        let a = &self.program.constraints;
        let (m, n) = a.dim();
        let rows = UnitBasis::detect(a, self.tolerance).problematic_rows();

        let mut augmented = Array2::zeros((m, n + rows.len()));
        augmented.slice_mut(s![.., ..n]).assign(a);
        for (k, &row) in rows.iter().enumerate() {
            augmented[[row, n + k]] = 1.0;
        }

        let mut cost = Array1::zeros(n + rows.len());
        cost.slice_mut(s![n..]).fill(1.0);

        self.num_artificial = rows.len();
        info!("appended {} artificial variables for rows {:?}", rows.len(), rows);

        LinearProgram::from_parts(cost, augmented, self.program.rhs.clone(), self.program.sense)
    }

    /// Solve the artificial model and derive the phase 2 program.
    ///
    /// Returns [`SolveError::Infeasible`] when the artificial variables cannot
    /// all be driven to zero.
    pub fn solve_phase_one(&mut self) -> Result<LinearProgram, SolveError> {
        let artificial = match self.artificial.take() {
            Some(model) => model,
            None => self.make_artificial_model(),
        };

        let result = self.run_phase_one(&artificial);
        self.artificial = Some(artificial);
        result
    }

    fn run_phase_one(&mut self, artificial: &LinearProgram) -> Result<LinearProgram, SolveError> {
        let mut engine = RevisedSimplex::new(artificial, self.tolerance, self.max_iterations)?;
        let vertex = engine.run();
        self.phase_one_iterations = engine.iterations();
        let vertex = vertex?;

        // each artificial must also be zero on its own, unscaled
        let n = self.program.num_variables();
        let scale = 1.0 + self.program.rhs.iter().map(|v| v.abs()).sum::<f64>();
        let artificial_left = vertex.x[n..].iter().any(|&v| v > self.tolerance);
        if vertex.objective > self.tolerance * scale || artificial_left {
            warn!("phase 1 optimum {} is positive, problem is infeasible", vertex.objective);
            return Err(SolveError::Infeasible {
                residual: vertex.objective,
            });
        }

        info!("phase 1 completed after {} iterations", self.phase_one_iterations);
        Ok(self.canonical_model(engine.basis(), engine.basis_inverse(), artificial))
    }

    /// Express the original constraints relative to the feasible basis: the
    /// phase 2 matrix is `B^-1 * A` and its right-hand side `B^-1 * b`, so
    /// every basic column is a unit column.
    fn canonical_model(
        &self,
        basis: &[usize],
        basis_inverse: &Array2<f64>,
        artificial: &LinearProgram,
    ) -> LinearProgram {
        let n = self.program.num_variables();
        let mut tableau = basis_inverse.dot(&artificial.constraints);
        let mut rhs = basis_inverse.dot(&artificial.rhs);
        let mut basis = basis.to_vec();
        let mut keep = Vec::with_capacity(basis.len());

        for row in 0..basis.len() {
            if basis[row] >= n {
                // artificial still basic at level zero
                let replacement = (0..n)
                    .find(|&j| !basis.contains(&j) && tableau[[row, j]].abs() > self.tolerance);
                match replacement {
                    Some(col) => {
                        debug!("driving artificial x{} out of row {} with x{}", basis[row], row, col);
                        pivot_tableau(&mut tableau, &mut rhs, row, col);
                        basis[row] = col;
                    }
                    None => {
                        warn!("constraint row {} is redundant, dropping it", row);
                        continue;
                    }
                }
            }
            keep.push(row);
        }

        let mut constraints = tableau.select(Axis(0), &keep).slice(s![.., ..n]).to_owned();
        let mut rhs = rhs.select(Axis(0), &keep);
        for (i, &row) in keep.iter().enumerate() {
            let mut column = constraints.column_mut(basis[row]);
            column.fill(0.0);
            column[i] = 1.0;
        }
        let tolerance = self.tolerance;
        rhs.mapv_inplace(|v| if v.abs() <= tolerance { 0.0 } else { v });

        LinearProgram::from_parts(self.program.cost.clone(), constraints, rhs, self.program.sense)
    }

    /// Number of artificial variables in the phase 1 model
    pub fn num_artificial(&self) -> usize {
        self.num_artificial
    }

    pub fn artificial_model(&self) -> Option<&LinearProgram> {
        self.artificial.as_ref()
    }

    /// Pivots performed by the phase 1 run
    pub fn phase_one_iterations(&self) -> usize {
        self.phase_one_iterations
    }
}

/// Gauss-Jordan pivot of `tableau` and `rhs` on (`row`, `col`)
fn pivot_tableau(tableau: &mut Array2<f64>, rhs: &mut Array1<f64>, row: usize, col: usize) {
    let pivot_val = tableau[[row, col]];
    tableau.row_mut(row).mapv_inplace(|v| v / pivot_val);
    rhs[row] /= pivot_val;

    let pivot_row = tableau.row(row).to_owned();
    let pivot_rhs = rhs[row];
    for i in 0..tableau.nrows() {
        if i != row {
            let factor = tableau[[i, col]];
            tableau.row_mut(i).scaled_add(-factor, &pivot_row);
            rhs[i] -= factor * pivot_rhs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Sense;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    const TOL: f64 = 1e-9;

    fn needs_two_phases() -> LinearProgram {
        LinearProgram::from_rows(
            vec![4.0, 1.0, 0.0, 0.0],
            vec![
                vec![3.0, 1.0, 0.0, 0.0],
                vec![4.0, 3.0, -1.0, 0.0],
                vec![1.0, 2.0, 0.0, 1.0],
            ],
            vec![3.0, 6.0, 4.0],
            Sense::Minimize,
        )
        .unwrap()
    }

    #[test]
    fn test_artificial_model_shape() {
        let lp = needs_two_phases();
        let original = lp.constraints().clone();
        let mut driver = TwoPhase::new(&lp, TOL, 100);

        let model = driver.build_artificial_model();
        assert_eq!(model.num_constraints(), 3);
        assert_eq!(model.num_variables(), 6);
        assert_eq!(model.cost(), &array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0]);
        assert_eq!(model.constraints().column(4), array![1.0, 0.0, 0.0]);
        assert_eq!(model.constraints().column(5), array![0.0, 1.0, 0.0]);
        assert_eq!(model.rhs(), lp.rhs());
        assert_eq!(driver.num_artificial(), 2);

        // the original program is left as it was
        assert_eq!(lp.constraints(), &original);
        assert_eq!(lp.num_variables(), 4);
    }

    #[test]
    fn test_phase_one_yields_canonical_model() {
        let lp = needs_two_phases();
        let mut driver = TwoPhase::new(&lp, TOL, 100);
        driver.build_artificial_model();
        let phase_two = driver.solve_phase_one().unwrap();

        assert_eq!(driver.phase_one_iterations(), 2);
        assert_eq!(phase_two.num_variables(), 4);
        assert_eq!(phase_two.cost(), lp.cost());
        assert_abs_diff_eq!(
            phase_two.constraints(),
            &array![[1.0, 0.0, 0.2, 0.0], [0.0, 1.0, -0.6, 0.0], [0.0, 0.0, 1.0, 1.0]],
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(phase_two.rhs(), &array![0.6, 1.2, 1.0], epsilon = 1e-9);

        let basis = UnitBasis::detect(phase_two.constraints(), TOL);
        assert_eq!(basis.indices(), Some(vec![0, 1, 3]));
    }

    #[test]
    fn test_phase_one_builds_model_when_missing() {
        let lp = needs_two_phases();
        let mut driver = TwoPhase::new(&lp, TOL, 100);
        assert!(driver.artificial_model().is_none());

        assert!(driver.solve_phase_one().is_ok());
        assert_eq!(driver.num_artificial(), 2);
        assert!(driver.artificial_model().is_some());
    }

    #[test]
    fn test_infeasible_when_artificials_stay_positive() {
        // x0 + x1 <= 1 and x0 + x1 >= 3
        let lp = LinearProgram::from_rows(
            vec![1.0, 1.0, 0.0, 0.0],
            vec![vec![1.0, 1.0, 1.0, 0.0], vec![1.0, 1.0, 0.0, -1.0]],
            vec![1.0, 3.0],
            Sense::Minimize,
        )
        .unwrap();
        let mut driver = TwoPhase::new(&lp, TOL, 100);

        match driver.solve_phase_one() {
            Err(SolveError::Infeasible { residual }) => assert_abs_diff_eq!(residual, 2.0, epsilon = 1e-9),
            other => panic!("expected infeasible, got {:?}", other),
        }
    }

    #[test]
    fn test_infeasible_by_small_margin_with_large_rhs() {
        // x0 + s = 1e7 and x0 - t = 1e7 + 0.005
        let lp = LinearProgram::from_rows(
            vec![1.0, 0.0, 0.0],
            vec![vec![1.0, 1.0, 0.0], vec![1.0, 0.0, -1.0]],
            vec![1e7, 1e7 + 0.005],
            Sense::Minimize,
        )
        .unwrap();
        let mut driver = TwoPhase::new(&lp, TOL, 100);

        match driver.solve_phase_one() {
            Err(SolveError::Infeasible { residual }) => assert_abs_diff_eq!(residual, 0.005, epsilon = 1e-6),
            other => panic!("expected infeasible, got {:?}", other),
        }
    }

    #[test]
    fn test_redundant_row_is_dropped() {
        let lp = LinearProgram::from_rows(
            vec![1.0, 2.0, 0.0],
            vec![vec![1.0, 1.0, 0.0], vec![1.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]],
            vec![2.0, 2.0, 1.0],
            Sense::Minimize,
        )
        .unwrap();
        let mut driver = TwoPhase::new(&lp, TOL, 100);
        let phase_two = driver.solve_phase_one().unwrap();

        assert_eq!(phase_two.num_constraints(), 2);
        assert_abs_diff_eq!(
            phase_two.constraints(),
            &array![[1.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(phase_two.rhs(), &array![2.0, 1.0], epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_artificial_is_driven_out() {
        // -x0 - x1 = 0 leaves the artificial basic at zero after phase 1
        let lp = LinearProgram::from_rows(
            vec![1.0, 1.0, 2.0],
            vec![vec![-1.0, -1.0, 0.0], vec![1.0, 0.0, 1.0]],
            vec![0.0, 1.0],
            Sense::Minimize,
        )
        .unwrap();
        let mut driver = TwoPhase::new(&lp, TOL, 100);
        let phase_two = driver.solve_phase_one().unwrap();

        assert_eq!(driver.phase_one_iterations(), 0);
        assert_abs_diff_eq!(
            phase_two.constraints(),
            &array![[1.0, 1.0, 0.0], [0.0, -1.0, 1.0]],
            epsilon = 1e-9
        );
        assert_eq!(phase_two.rhs(), &array![0.0, 1.0]);
        assert!(UnitBasis::detect(phase_two.constraints(), TOL).is_complete());
    }

    #[test]
    fn test_pivot_tableau() {
        let mut tableau = array![[2.0, 4.0], [1.0, 3.0]];
        let mut rhs = array![2.0, 2.0];
        pivot_tableau(&mut tableau, &mut rhs, 0, 0);

        assert_eq!(tableau, array![[1.0, 2.0], [0.0, 1.0]]);
        assert_eq!(rhs, array![1.0, 1.0]);
    }
}
