//! Candidate solutions and the operators that create and modify them.
//!
//! - [`SolutionBuilder::random`]: random construction with load balancing
//! - [`SolutionBuilder::improvise`]: memory-guided construction
//! - [`local_refinement`]: strictly improving resource swaps
//! - [`hybridize`]: biased per-operation crossover of two solutions

mod builder;
mod hybrid;
mod refine;
mod types;

pub use builder::SolutionBuilder;
pub use hybrid::hybridize;
pub use refine::local_refinement;
pub use types::{Assignment, Solution};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::models::{Machine, Operation, Problem, ProductionOrder, Worker, SHIFTS_PER_DAY};

    /// Rosters `worker` for every shift of `days` days from 2025-04-01.
    pub(crate) fn rostered(mut worker: Worker, days: u64) -> Worker {
        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        for d in 0..days {
            worker = worker.with_available_shifts(start + chrono::Days::new(d), [true; SHIFTS_PER_DAY]);
        }
        worker
    }

    /// Four operations of one order: cut, then sew and hem, then pack.
    /// No machine exists for packing, so the order never completes.
    /// Workers are rostered for 30 days.
    pub(crate) fn plant() -> Problem {
        let d = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let workers = vec![
            Worker::new("W1", "cutter").with_productivity(1.0),
            Worker::new("W2", "cutter").with_productivity(1.4),
            Worker::new("W3", "sewer").with_productivity(0.9),
            Worker::new("W4", "sewer").with_productivity(1.2),
            Worker::new("W5", "sewer").with_productivity(1.1),
            Worker::new("W6", "packer"),
        ]
        .into_iter()
        .map(|w| rostered(w.with_hourly_cost(10.0), 30))
        .collect();
        let machines = vec![
            Machine::new("M1", "knife"),
            Machine::new("M2", "knife").with_productivity(1.3),
            Machine::new("M3", "needle"),
            Machine::new("M4", "needle").with_productivity(0.8),
        ];
        let operations = vec![
            Operation::new("cut", "PO1", "cutter", "knife").with_targets(20.0, 10.0),
            Operation::new("sew", "PO1", "sewer", "needle")
                .with_prerequisite("cut")
                .with_targets(20.0, 10.0),
            Operation::new("hem", "PO1", "sewer", "needle")
                .with_prerequisite("cut")
                .with_targets(10.0, 5.0),
            Operation::new("pack", "PO1", "packer", "box")
                .with_prerequisite("sew")
                .with_targets(5.0, 0.0),
        ];
        let order = ProductionOrder::new("PO1", d, d + chrono::Days::new(10))
            .with_operation("cut")
            .with_operation("sew")
            .with_operation("hem")
            .with_operation("pack");
        Problem::new(workers, machines, operations, vec![order]).unwrap()
    }
}
