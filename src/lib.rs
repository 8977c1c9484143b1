//! Harmony Search allocation of workers and machines to manufacturing
//! operations.
//!
//! Given workers (position, productivity, quality, wage, shift roster),
//! machines (type, productivity, running cost), operations (required
//! position and machine type, prerequisites, throughput and quality
//! targets) and the production orders they belong to, the crate searches
//! for a staffing that completes as many orders by their deadline as
//! possible, in as few shifts as possible, at the lowest cost.
//!
//! - [`models`]: Plant data and the validated [`Problem`](models::Problem)
//! - [`index`]: Lookup tables derived from the plant data
//! - [`solution`]: Candidate staffings and the operators that build them
//! - [`simulator`]: Shift-by-shift replay that scores a staffing
//! - [`hs`]: Harmony Memory and the search driver
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_harmony::hs::HsConfig;
//! use u_harmony::models::{Machine, Operation, ProductionOrder, Worker};
//!
//! let day = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
//! let worker = Worker::new("W1", "operator")
//!     .with_hourly_cost(10.0)
//!     .with_available_shifts(day, [true; 4]);
//! let machine = Machine::new("M1", "press").with_hourly_cost(2.0);
//! let operations = vec![
//!     Operation::new("OP1", "PO1", "operator", "press").with_targets(5.0, 5.0),
//!     Operation::new("OP2", "PO1", "operator", "press")
//!         .with_prerequisite("OP1")
//!         .with_targets(5.0, 5.0),
//! ];
//! let order = ProductionOrder::new("PO1", day, day)
//!     .with_operation("OP1")
//!     .with_operation("OP2");
//!
//! let result = u_harmony::optimize(
//!     vec![worker],
//!     vec![machine],
//!     operations,
//!     vec![order],
//!     &HsConfig::default().with_seed(1).with_parallel(false),
//! )
//! .unwrap();
//! assert_eq!(result.best_fitness.orders_on_time, 1);
//! ```

pub mod error;
pub mod hs;
pub mod index;
pub mod models;
pub mod random;
pub mod simulator;
pub mod solution;

pub use error::HarmonyError;

use hs::{Fitness, HsConfig, HsResult, HsRunner};
use models::{Machine, Operation, Problem, ProductionOrder, Worker};
use simulator::{SimulationConfig, Simulator};
use solution::Solution;

/// Scores `solution` with the default simulation settings.
///
/// `operations` is reset and then receives the achieved KPI values and
/// assignment logs of the run.
///
/// # Panics
/// When `operations` and the problem's operations differ in length.
pub fn evaluate(problem: &Problem, solution: &Solution, operations: &mut [Operation]) -> Fitness {
    let config = SimulationConfig::default();
    Simulator::new(problem, &config).evaluate(solution, operations)
}

/// Validates the plant data and runs Harmony Search on it.
///
/// # Errors
/// Any structural input error from [`Problem::new`], or
/// [`HarmonyError::InvalidConfig`].
pub fn optimize(
    workers: Vec<Worker>,
    machines: Vec<Machine>,
    operations: Vec<Operation>,
    orders: Vec<ProductionOrder>,
    config: &HsConfig,
) -> Result<HsResult, HarmonyError> {
    let problem = Problem::new(workers, machines, operations, orders)?;
    HsRunner::run(&problem, config)
}
