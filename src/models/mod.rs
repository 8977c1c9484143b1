//! Plant data model.
//!
//! Workers, machines, operations and production orders as supplied by the
//! loading collaborator. Everything except an [`Operation`]'s achieved KPI
//! values and assignment log is read-only for the whole optimization run.
//!
//! Resources are referenced by their position in the owning [`Problem`]
//! (arena indices), never by shared mutable handles.

mod machine;
mod operation;
mod order;
mod problem;
mod worker;

pub use machine::Machine;
pub use operation::{Kpi, Operation, OperationSummary, ScheduleEntry, KPI_QUALITY, KPI_THROUGHPUT};
pub use order::ProductionOrder;
pub use problem::Problem;
pub use worker::{parse_date, Worker};

/// Fixed number of shifts in one calendar day.
pub const SHIFTS_PER_DAY: usize = 4;
