//! Schedule simulator: the fitness function of the search.
//!
//! A solution is replayed day by day over a bounded horizon of four shifts
//! per day. In every shift the ready operations, most urgent first, pair
//! their free workers and machines, accumulate throughput and quality,
//! and release their resources to other ready operations once complete.
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use u_harmony::models::{Machine, Operation, Problem, ProductionOrder, Worker};
//! use u_harmony::simulator::{SimulationConfig, Simulator};
//! use u_harmony::solution::{Assignment, Solution};
//!
//! let day = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
//! let worker = Worker::new("W1", "operator").with_available_shifts(day, [true; 4]);
//! let machine = Machine::new("M1", "press");
//! let op = Operation::new("OP1", "PO1", "operator", "press").with_targets(5.0, 5.0);
//! let order = ProductionOrder::new("PO1", day, day).with_operation("OP1");
//! let problem = Problem::new(vec![worker], vec![machine], vec![op], vec![order]).unwrap();
//!
//! let mut staffed = Assignment::default();
//! staffed.workers.insert(0);
//! staffed.machines.insert(0);
//! let solution = Solution::from_assignments(vec![staffed]);
//!
//! let config = SimulationConfig::default();
//! let report = Simulator::new(&problem, &config).simulate(&solution);
//! assert_eq!(report.fitness.orders_on_time, 1);
//! assert_eq!(report.fitness.shifts, 1);
//! ```

mod config;
mod engine;

pub use config::SimulationConfig;
pub use engine::{SimulationReport, Simulator};
