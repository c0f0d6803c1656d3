use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use revsimplex_solver::{
    LinearProgram, ProblemData, Solution, SolveError, SolvePath, Solver, UnitBasis,
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser)]
#[command(name = "revsimplex")]
#[command(about = "Solve standard-form linear programs with the revised simplex method", long_about = None)]
struct Cli {
    /// Log more detail (-v for progress, -vv for every pivot)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a problem file and report whether two phases are needed
    Check {
        /// The JSON problem file
        file: PathBuf,
    },
    /// Solve a problem file and output the optimal solution
    Solve {
        /// The JSON problem file
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Tolerance for floating point comparisons
        #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,
        /// Pivot limit per simplex run
        #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
        max_iterations: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid problem file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid problem: {0}")]
    Problem(#[from] SolveError),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logger(cli.verbose) {
        eprintln!("Error setting up logging: {}", e);
    }

    let result = match cli.command {
        Commands::Check { file } => check(&file).map(|_| true),
        Commands::Solve {
            file,
            format,
            tolerance,
            max_iterations,
        } => {
            let solver = Solver::new()
                .with_tolerance(tolerance)
                .with_max_iterations(max_iterations);
            solve(&file, format, &solver)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn setup_logger(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{:5} | {} | {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn load(file: &Path) -> Result<LinearProgram, CliError> {
    let source = std::fs::read_to_string(file)?;
    let data: ProblemData = serde_json::from_str(&source)?;
    let program = LinearProgram::try_from(data)?;
    info!(
        "loaded {}: {} constraints, {} variables",
        file.display(),
        program.num_constraints(),
        program.num_variables()
    );
    Ok(program)
}

fn check(file: &Path) -> Result<(), CliError> {
    let program = load(file)?;
    let basis = UnitBasis::detect(program.constraints(), DEFAULT_TOLERANCE);

    println!("✓ {} is valid", file.display());
    println!("  {} constraints", program.num_constraints());
    println!("  {} variables", program.num_variables());
    println!("  sense: {}", program.sense());
    match basis.indices() {
        Some(indices) => {
            let names: Vec<String> = indices.iter().map(|j| format!("x{}", j)).collect();
            println!("  initial basis: {}", names.join(", "));
        }
        None => {
            println!(
                "  two-phase needed: rows {:?} have no unit column",
                basis.problematic_rows()
            );
        }
    }
    Ok(())
}

/// Returns whether an optimal solution was found
fn solve(file: &Path, format: Format, solver: &Solver) -> Result<bool, CliError> {
    let mut program = load(file)?;

    match solver.solve_in_place(&mut program) {
        Ok(solution) => {
            match format {
                Format::Json => {
                    let output = json!({ "status": "optimal", "solution": solution });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                Format::Pretty => print_solution(solution),
            }
            Ok(true)
        }
        Err(e) => {
            match format {
                Format::Json => {
                    let output = json!({ "status": status_name(&e), "message": e.to_string() });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                Format::Pretty => {
                    println!("Status: {}", status_name(&e).to_uppercase());
                    println!("{}", e);
                }
            }
            Ok(false)
        }
    }
}

fn print_solution(solution: &Solution) {
    println!("Status: OPTIMAL");
    println!("Objective: {:.6}", solution.objective_value);
    match solution.path {
        SolvePath::Direct => println!("Iterations: {}", solution.iterations),
        SolvePath::TwoPhase => println!(
            "Iterations: {} (phase 1: {})",
            solution.iterations, solution.phase_one_iterations
        ),
    }
    println!();
    println!("Variables:");
    for (j, value) in solution.values.iter().enumerate() {
        println!("  x{:<6} {:14.6}", j, value);
    }
}

fn status_name(error: &SolveError) -> &'static str {
    match error {
        SolveError::Infeasible { .. } => "infeasible",
        SolveError::Unbounded { .. } => "unbounded",
        SolveError::CycleSuspected { .. } => "iteration_limit",
        _ => "error",
    }
}
