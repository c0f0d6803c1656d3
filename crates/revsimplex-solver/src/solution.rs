/// The result of a successful solve
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Value of each original decision variable
    pub values: Vec<f64>,
    /// Optimal objective value, in the sense the problem was posed
    pub objective_value: f64,
    /// How the initial basis was obtained
    pub path: SolvePath,
    /// Pivots performed while searching for a feasible basis
    pub phase_one_iterations: usize,
    /// Pivots performed by the final optimization run
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolvePath {
    /// The constraint matrix already contained a unit basis
    Direct,
    /// An artificial problem was solved first to find a feasible basis
    TwoPhase,
}

/// Basic feasible solution reached by one engine run
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Value of every variable of the program the engine ran on
    pub x: Vec<f64>,
    /// Objective in minimization form
    pub objective: f64,
}
