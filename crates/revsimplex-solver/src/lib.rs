//! Revised simplex solver for linear programs in standard form
//!
//! ```text
//!    min  c'x
//!    st   Ax == b
//!          x >= 0
//! ```
//!
//! Programs whose constraint matrix already holds a unit basis are solved
//! directly. All others go through a two-phase procedure that first finds a
//! feasible basis with artificial variables.
//!
//! # Example
//! ```
//! use revsimplex_solver::{LinearProgram, Sense};
//!
//! let mut lp = LinearProgram::from_rows(
//!     vec![4.0, 1.0, 0.0, 0.0],
//!     vec![
//!         vec![3.0, 1.0, 0.0, 0.0],
//!         vec![4.0, 3.0, -1.0, 0.0],
//!         vec![1.0, 2.0, 0.0, 1.0],
//!     ],
//!     vec![3.0, 6.0, 4.0],
//!     Sense::Minimize,
//! )
//! .unwrap();
//!
//! let solution = lp.solve().unwrap();
//! assert!((solution.objective_value - 3.4).abs() < 1e-9);
//! ```

mod basis;
mod error;
pub mod pivot;
mod problem;
mod revised;
mod solution;
mod solver;
mod two_phase;

pub use basis::UnitBasis;
pub use error::SolveError;
pub use problem::{LinearProgram, ProblemData, Sense};
pub use revised::{EngineState, RevisedSimplex, Step};
pub use solution::{Solution, SolvePath, Vertex};
pub use solver::{Solver, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
pub use two_phase::TwoPhase;
