//! Operation model and KPI accounting.

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of the throughput KPI in [`Operation::kpis`].
pub const KPI_THROUGHPUT: usize = 0;
/// Index of the quality KPI in [`Operation::kpis`].
pub const KPI_QUALITY: usize = 1;

/// An assigned KPI goal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kpi {
    pub id: String,
    pub name: String,
    /// Amount that must be accumulated for the operation to complete.
    pub target: f64,
}

impl Kpi {
    pub fn new(id: impl Into<String>, name: impl Into<String>, target: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            target,
        }
    }
}

/// One worker–machine pair working one shift on an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    /// 0-based shift index within the day.
    pub shift: usize,
    pub worker_id: String,
    pub machine_id: String,
}

/// A schedulable unit of work inside a production order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Operation {
    /// Unique operation identifier.
    pub id: String,
    /// Owning production order.
    pub order_id: String,
    /// Human-readable name.
    pub name: String,
    /// Worker position this operation needs.
    pub required_position: String,
    /// Machine type this operation needs.
    pub required_machine_type: String,
    /// Operations that must complete before this one may start.
    pub prerequisites: Vec<String>,
    /// Throughput ([`KPI_THROUGHPUT`]) and quality ([`KPI_QUALITY`]) targets.
    pub kpis: [Kpi; 2],
    /// Running totals matching `kpis`.
    pub achieved: [f64; 2],
    /// Append-only assignment log, filled by one simulation run.
    pub schedule: Vec<ScheduleEntry>,
}

impl Operation {
    /// Creates an operation with zero KPI targets and no prerequisites.
    pub fn new(
        id: impl Into<String>,
        order_id: impl Into<String>,
        required_position: impl Into<String>,
        required_machine_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            order_id: order_id.into(),
            name: String::new(),
            required_position: required_position.into(),
            required_machine_type: required_machine_type.into(),
            prerequisites: Vec::new(),
            kpis: [
                Kpi::new("throughput", "Throughput", 0.0),
                Kpi::new("quality", "Quality", 0.0),
            ],
            achieved: [0.0; 2],
            schedule: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_prerequisite(mut self, id: impl Into<String>) -> Self {
        self.prerequisites.push(id.into());
        self
    }

    pub fn with_kpis(mut self, throughput: Kpi, quality: Kpi) -> Self {
        self.kpis = [throughput, quality];
        self
    }

    /// Sets both KPI targets, keeping their labels.
    pub fn with_targets(mut self, throughput: f64, quality: f64) -> Self {
        self.kpis[KPI_THROUGHPUT].target = throughput;
        self.kpis[KPI_QUALITY].target = quality;
        self
    }

    pub fn throughput_target(&self) -> f64 {
        self.kpis[KPI_THROUGHPUT].target
    }

    /// Sum of both KPI targets, used to rank operations by demand.
    pub fn total_target(&self) -> f64 {
        self.kpis.iter().map(|k| k.target).sum()
    }

    /// Throughput still missing before the target is met.
    pub fn remaining_throughput(&self) -> f64 {
        self.kpis[KPI_THROUGHPUT].target - self.achieved[KPI_THROUGHPUT]
    }

    /// Both accumulators have reached their targets.
    pub fn is_complete(&self) -> bool {
        self.achieved
            .iter()
            .zip(&self.kpis)
            .all(|(achieved, kpi)| *achieved >= kpi.target)
    }

    /// Adds one shift's output and reports whether the operation is complete.
    ///
    /// When an increment would push its accumulator past the target, the
    /// largest integer `x` is found for which every overshooting KPI still
    /// reaches its target after scaling by `1 - x / shift_hours`, and the
    /// overshooting increments are scaled by that factor. One `x` is shared
    /// across both KPIs.
    pub fn apply_output(&mut self, throughput: f64, quality: f64, shift_hours: f64) -> bool {
        let mut increments = [throughput, quality];
        let overshoots: [bool; 2] = std::array::from_fn(|k| {
            increments[k] > 0.0 && self.achieved[k] + increments[k] > self.kpis[k].target
        });

        if overshoots.iter().any(|&o| o) {
            let max_x = (0..2)
                .filter(|&k| overshoots[k])
                .map(|k| {
                    shift_hours * (self.achieved[k] + increments[k] - self.kpis[k].target)
                        / increments[k]
                })
                .fold(f64::INFINITY, f64::min);
            let x = max_x.floor();
            for k in 0..2 {
                if overshoots[k] {
                    increments[k] *= 1.0 - x / shift_hours;
                }
            }
        }

        for (achieved, inc) in self.achieved.iter_mut().zip(increments) {
            *achieved += inc;
        }
        self.is_complete()
    }

    /// Appends an assignment to the log.
    pub fn record(&mut self, entry: ScheduleEntry) {
        self.schedule.push(entry);
    }

    /// Clears accumulated KPI values and the assignment log.
    pub fn reset(&mut self) {
        self.achieved = [0.0; 2];
        self.schedule.clear();
    }

    /// Snapshot handed to the result-persisting collaborator.
    pub fn summary(&self) -> OperationSummary {
        OperationSummary {
            order_id: self.order_id.clone(),
            operation_id: self.id.clone(),
            name: self.name.clone(),
            throughput: (self.achieved[KPI_THROUGHPUT], self.kpis[KPI_THROUGHPUT].target),
            quality: (self.achieved[KPI_QUALITY], self.kpis[KPI_QUALITY].target),
            schedule: self.schedule.clone(),
        }
    }
}

/// Per-operation result record: `(achieved, assigned)` KPI pairs plus the
/// ordered assignment log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperationSummary {
    pub order_id: String,
    pub operation_id: String,
    pub name: String,
    pub throughput: (f64, f64),
    pub quality: (f64, f64),
    pub schedule: Vec<ScheduleEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(throughput: f64, quality: f64) -> Operation {
        Operation::new("OP1", "PO1", "sewer", "T1").with_targets(throughput, quality)
    }

    #[test]
    fn test_overshoot_is_trimmed() {
        let mut o = op(25.0, 0.0);
        o.achieved[KPI_THROUGHPUT] = 20.0;
        // max_x = 5.5 * 5 / 10 = 2.75 -> x = 2 -> applied 10 * (1 - 2/5.5)
        let done = o.apply_output(10.0, 0.0, 5.5);
        assert!(done);
        let achieved = o.achieved[KPI_THROUGHPUT];
        assert!((achieved - (20.0 + 10.0 * (1.0 - 2.0 / 5.5))).abs() < 1e-9);
        assert!(achieved >= 25.0 && achieved < 26.0 + 1.0 / 5.5 * 10.0);
        assert!(achieved < 30.0);
    }

    #[test]
    fn test_small_overshoot_kept() {
        let mut o = op(5.0, 0.0);
        // max_x = 5.5 * 0.5 / 5.5 = 0.5 -> x = 0, nothing trimmed
        assert!(o.apply_output(5.5, 0.0, 5.5));
        assert!((o.achieved[KPI_THROUGHPUT] - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_shared_factor_across_kpis() {
        let mut o = op(9.0, 8.0);
        // throughput: 5.5 * 13 / 22 = 3.25, quality: 5.5 * 12 / 20 = 3.3 -> x = 3
        assert!(o.apply_output(22.0, 20.0, 5.5));
        let factor = 1.0 - 3.0 / 5.5;
        assert!((o.achieved[KPI_THROUGHPUT] - 22.0 * factor).abs() < 1e-9);
        assert!((o.achieved[KPI_QUALITY] - 20.0 * factor).abs() < 1e-9);
        assert!(o.achieved[KPI_THROUGHPUT] >= 9.0);
        assert!(o.achieved[KPI_QUALITY] >= 8.0);
    }

    #[test]
    fn test_partial_progress_not_complete() {
        let mut o = op(20.0, 10.0);
        assert!(!o.apply_output(5.5, 5.0, 5.5));
        assert!(!o.is_complete());
        assert!((o.remaining_throughput() - 14.5).abs() < 1e-12);
    }

    #[test]
    fn test_completion_is_monotonic() {
        let mut o = op(5.0, 5.0);
        assert!(o.apply_output(6.0, 6.0, 5.5));
        assert!(o.apply_output(0.0, 0.0, 5.5));
        assert!(o.apply_output(3.0, 1.0, 5.5));
        assert!(o.is_complete());
    }

    #[test]
    fn test_zero_targets_complete_immediately() {
        let mut o = op(0.0, 0.0);
        assert!(o.is_complete());
        assert!(o.apply_output(0.0, 0.0, 5.5));
    }

    #[test]
    fn test_reset_and_summary() {
        let mut o = op(5.0, 1.0).with_name("Cut");
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        o.record(ScheduleEntry {
            date,
            shift: 0,
            worker_id: "W1".into(),
            machine_id: "M1".into(),
        });
        o.apply_output(5.5, 5.5, 5.5);

        let summary = o.summary();
        assert_eq!(summary.name, "Cut");
        assert_eq!(summary.throughput.1, 5.0);
        assert_eq!(summary.schedule.len(), 1);

        o.reset();
        assert!(o.schedule.is_empty());
        assert_eq!(o.achieved, [0.0, 0.0]);
    }
}
