//! Discrete shift-by-shift simulation of a solution.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

use super::config::SimulationConfig;
use crate::hs::Fitness;
use crate::models::{Operation, Problem, ScheduleEntry, SHIFTS_PER_DAY};
use crate::solution::{Assignment, Solution};

/// Full outcome of one simulation.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub fitness: Fitness,
    /// Operations copy holding achieved KPI values and assignment logs.
    pub operations: Vec<Operation>,
    /// Incomplete operations whose prerequisites never completed.
    pub stalled: Vec<usize>,
    /// Number of completed operations.
    pub completed: usize,
}

/// Evaluates solutions against one problem.
///
/// The simulator holds no mutable state: every call works on its own
/// resource working copy and on the operations slice it is given, so
/// evaluations can run concurrently.
#[derive(Debug, Clone, Copy)]
pub struct Simulator<'a> {
    problem: &'a Problem,
    config: &'a SimulationConfig,
}

/// Per-run mutable state.
struct RunState {
    working: Vec<Assignment>,
    completed: Vec<bool>,
    completed_count: usize,
    order_progress: Vec<usize>,
    last_shift: Vec<bool>,
    worker_pool: BTreeSet<usize>,
    machine_pool: BTreeSet<usize>,
}

impl<'a> Simulator<'a> {
    pub fn new(problem: &'a Problem, config: &'a SimulationConfig) -> Self {
        Self { problem, config }
    }

    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// Simulates `solution` on a fresh operations copy.
    pub fn simulate(&self, solution: &Solution) -> SimulationReport {
        let mut operations = self.problem.fresh_operations();
        let (fitness, completed) = self.run(solution, &mut operations);

        let index = self.problem.index();
        let stalled: Vec<usize> = (0..operations.len())
            .filter(|&op| !completed[op] && !index.is_ready(op, &completed))
            .collect();
        let completed = completed.iter().filter(|&&c| c).count();

        SimulationReport {
            fitness,
            operations,
            stalled,
            completed,
        }
    }

    /// Simulates `solution`, writing KPI progress and assignment logs into
    /// `operations` (reset first), and returns its fitness.
    ///
    /// `operations` must be a copy of the problem's operations in the same
    /// order.
    ///
    /// # Panics
    /// When `operations` and the problem's operations differ in length.
    pub fn evaluate(&self, solution: &Solution, operations: &mut [Operation]) -> Fitness {
        assert_eq!(
            operations.len(),
            self.problem.operations().len(),
            "operations slice does not match the problem"
        );
        for op in operations.iter_mut() {
            op.reset();
        }
        self.run(solution, operations).0
    }

    fn run(&self, solution: &Solution, operations: &mut [Operation]) -> (Fitness, Vec<bool>) {
        let problem = self.problem;
        let index = problem.index();
        let workers = problem.workers();
        let machines = problem.machines();
        let orders = problem.orders();
        let hours = self.config.shift_hours;
        let n = operations.len();

        let mut state = RunState {
            working: (0..n)
                .map(|op| solution.assignments().get(op).cloned().unwrap_or_default())
                .collect(),
            completed: vec![false; n],
            completed_count: 0,
            order_progress: vec![0; orders.len()],
            last_shift: vec![false; workers.len()],
            worker_pool: BTreeSet::new(),
            machine_pool: BTreeSet::new(),
        };

        let mut orders_on_time = 0usize;
        let mut shifts = 0usize;
        let mut cost = 0.0;

        'days: for day in 0..self.config.horizon_days {
            if state.completed_count == n {
                break;
            }
            let Some(date) = self.config.start_date.checked_add_days(Days::new(day as u64)) else {
                break;
            };
            let mut ready = self.ready_queue(operations, &state.completed, date);

            for shift in 0..SHIFTS_PER_DAY {
                let mut worker_busy = vec![false; workers.len()];
                let mut machine_busy = vec![false; machines.len()];
                let mut finished = Vec::new();

                for &op in &ready {
                    if state.completed[op] {
                        continue;
                    }

                    let mut free_workers: Vec<usize> = state.working[op]
                        .workers
                        .iter()
                        .copied()
                        .filter(|&w| {
                            !worker_busy[w]
                                && !(self.config.rest_between_shifts && state.last_shift[w])
                                && workers[w].is_available(date, shift)
                        })
                        .collect();
                    let mut free_machines: Vec<usize> = state.working[op]
                        .machines
                        .iter()
                        .copied()
                        .filter(|&m| !machine_busy[m])
                        .collect();
                    free_workers.sort_by(|&a, &b| {
                        workers[b].productivity.total_cmp(&workers[a].productivity)
                    });
                    free_machines.sort_by(|&a, &b| {
                        machines[b].productivity.total_cmp(&machines[a].productivity)
                    });

                    let pairs = free_workers.len().min(free_machines.len());
                    let mut needed = 1;
                    if pairs > 0 {
                        let avg_worker = free_workers[..pairs]
                            .iter()
                            .map(|&w| workers[w].productivity)
                            .sum::<f64>()
                            / pairs as f64;
                        let avg_machine = free_machines[..pairs]
                            .iter()
                            .map(|&m| machines[m].productivity)
                            .sum::<f64>()
                            / pairs as f64;
                        let avg_pair = hours * avg_worker * avg_machine;
                        if avg_pair > 0.0 {
                            let estimate = (operations[op].remaining_throughput() / avg_pair).ceil();
                            needed = pairs.min((estimate.max(0.0) as usize).max(1));
                        }
                    }

                    let mut throughput = 0.0;
                    let mut quality = 0.0;
                    for (&w, &m) in free_workers.iter().zip(&free_machines).take(needed) {
                        let worker = &workers[w];
                        let machine = &machines[m];
                        let output = hours * worker.productivity * machine.productivity;
                        throughput += output;
                        quality += output * worker.quality;
                        cost += hours * (worker.hourly_cost + machine.hourly_cost);

                        operations[op].record(ScheduleEntry {
                            date,
                            shift,
                            worker_id: worker.id.clone(),
                            machine_id: machine.id.clone(),
                        });
                        worker_busy[w] = true;
                        machine_busy[m] = true;
                    }

                    if operations[op].apply_output(throughput, quality, hours) {
                        finished.push(op);
                        if let Some(order) = index.order_of(op) {
                            state.order_progress[order] += 1;
                            let o = &orders[order];
                            if state.order_progress[order] == o.total_operations()
                                && date <= o.end_date
                            {
                                orders_on_time += 1;
                            }
                        }
                    }
                }

                state.last_shift = worker_busy;
                for &op in &finished {
                    state.completed[op] = true;
                }
                state.completed_count += finished.len();
                shifts += 1;

                if !finished.is_empty() {
                    ready = self.ready_queue(operations, &state.completed, date);
                }
                if state.completed_count == n {
                    break 'days;
                }

                for &op in &finished {
                    let released = std::mem::take(&mut state.working[op]);
                    state.worker_pool.extend(released.workers);
                    state.machine_pool.extend(released.machines);
                }
                self.recycle(operations, &mut state);
            }
        }

        if state.completed_count < n {
            tracing::debug!(
                incomplete = n - state.completed_count,
                shifts,
                "simulation horizon exhausted"
            );
        }

        (Fitness::new(orders_on_time, shifts, cost), state.completed)
    }

    /// Ready, incomplete operations in ascending priority
    /// `days_to_deadline - 0.2 * throughput_target - 0.5 * dependents`.
    fn ready_queue(&self, operations: &[Operation], completed: &[bool], date: NaiveDate) -> Vec<usize> {
        let index = self.problem.index();
        let orders = self.problem.orders();

        let mut ready: Vec<(usize, f64)> = (0..operations.len())
            .filter(|&op| !completed[op] && index.is_ready(op, completed))
            .map(|op| {
                let days_to_deadline = index
                    .order_of(op)
                    .map(|o| (orders[o].end_date - date).num_days() as f64)
                    .unwrap_or(0.0);
                let priority = days_to_deadline
                    - 0.2 * operations[op].throughput_target()
                    - 0.5 * index.dependent_count(op) as f64;
                (op, priority)
            })
            .collect();
        ready.sort_by(|a, b| a.1.total_cmp(&b.1));
        ready.into_iter().map(|(op, _)| op).collect()
    }

    /// Hands pooled resources to ready operations needing their class.
    ///
    /// Candidates are ordered by order deadline, then by descending total KPI
    /// target. Strong resources (above the configured thresholds) go to the
    /// most demanding candidate instead. Resources without a taker stay
    /// pooled.
    fn recycle(&self, operations: &[Operation], state: &mut RunState) {
        if state.worker_pool.is_empty() && state.machine_pool.is_empty() {
            return;
        }
        let index = self.problem.index();
        let orders = self.problem.orders();
        let workers = self.problem.workers();
        let machines = self.problem.machines();

        let deadline = |op: usize| index.order_of(op).map(|o| orders[o].end_date);
        let by_demand =
            |a: &usize, b: &usize| operations[*b].total_target().total_cmp(&operations[*a].total_target());

        let mut candidates: Vec<usize> = (0..operations.len())
            .filter(|&op| !state.completed[op] && index.is_ready(op, &state.completed))
            .collect();
        candidates.sort_by(|a, b| match (deadline(*a), deadline(*b)) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| by_demand(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => by_demand(a, b),
        });

        let pooled: Vec<usize> = state.worker_pool.iter().copied().collect();
        for w in pooled {
            let mut eligible: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&op| operations[op].required_position == workers[w].position)
                .collect();
            if workers[w].quality > self.config.recycle_quality_threshold {
                eligible.sort_by(by_demand);
            }
            if let Some(&target) = eligible.first() {
                state.working[target].workers.insert(w);
                state.worker_pool.remove(&w);
            }
        }

        let pooled: Vec<usize> = state.machine_pool.iter().copied().collect();
        for m in pooled {
            let mut eligible: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&op| operations[op].required_machine_type == machines[m].machine_type)
                .collect();
            if machines[m].productivity > self.config.recycle_productivity_threshold {
                eligible.sort_by(by_demand);
            }
            if let Some(&target) = eligible.first() {
                state.working[target].machines.insert(m);
                state.machine_pool.remove(&m);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Machine, ProductionOrder, Worker};
    use crate::solution::fixtures::{plant, rostered};
    use crate::random::create_rng;
    use crate::solution::SolutionBuilder;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    fn assignment(workers: &[usize], machines: &[usize]) -> Assignment {
        Assignment {
            workers: workers.iter().copied().collect(),
            machines: machines.iter().copied().collect(),
        }
    }

    /// One worker and one machine; `second` depends on `first`.
    fn chain() -> Problem {
        let workers = vec![rostered(Worker::new("W1", "operator").with_hourly_cost(10.0), 10)];
        let machines = vec![Machine::new("M1", "press").with_hourly_cost(2.0)];
        let operations = vec![
            Operation::new("first", "PO1", "operator", "press").with_targets(5.0, 5.0),
            Operation::new("second", "PO1", "operator", "press")
                .with_prerequisite("first")
                .with_targets(5.0, 5.0),
        ];
        let order = ProductionOrder::new("PO1", start(), start() + Days::new(5))
            .with_operation("first")
            .with_operation("second");
        Problem::new(workers, machines, operations, vec![order]).unwrap()
    }

    fn chain_solution() -> Solution {
        Solution::from_assignments(vec![assignment(&[0], &[0]), assignment(&[0], &[0])])
    }

    #[test]
    fn test_two_step_chain_without_rest() {
        let problem = chain();
        let config = SimulationConfig::default().with_rest_between_shifts(false);
        let report = Simulator::new(&problem, &config).simulate(&chain_solution());

        assert_eq!(report.fitness, Fitness::new(1, 2, 2.0 * 5.5 * (10.0 + 2.0)));
        assert_eq!(report.completed, 2);
        assert!(report.stalled.is_empty());

        let first = &report.operations[0];
        assert!(first.is_complete());
        assert_eq!(first.schedule.len(), 1);
        assert_eq!(first.schedule[0].shift, 0);
        assert_eq!(first.schedule[0].worker_id, "W1");
        let second = &report.operations[1];
        assert_eq!(second.schedule.len(), 1);
        assert_eq!(second.schedule[0].shift, 1);
        assert_eq!(second.schedule[0].date, start());
    }

    #[test]
    fn test_two_step_chain_with_rest() {
        let problem = chain();
        let config = SimulationConfig::default();
        let report = Simulator::new(&problem, &config).simulate(&chain_solution());

        // the only worker must sit out shift 1
        assert_eq!(report.fitness.orders_on_time, 1);
        assert_eq!(report.fitness.shifts, 3);
        assert_eq!(report.operations[1].schedule[0].shift, 2);
    }

    #[test]
    fn test_recycles_released_resources() {
        let problem = chain();
        let config = SimulationConfig::default().with_rest_between_shifts(false);
        // the dependent operation starts with nothing
        let solution = Solution::from_assignments(vec![assignment(&[0], &[0]), assignment(&[], &[])]);
        let report = Simulator::new(&problem, &config).simulate(&solution);

        assert_eq!(report.fitness.shifts, 2);
        assert_eq!(report.fitness.orders_on_time, 1);
        assert_eq!(report.operations[1].schedule[0].machine_id, "M1");
    }

    #[test]
    fn test_late_order_is_not_on_time() {
        let workers = vec![rostered(Worker::new("W1", "operator"), 10)];
        let machines = vec![Machine::new("M1", "press")];
        let operations = vec![Operation::new("big", "PO1", "operator", "press").with_targets(33.0, 0.0)];
        let order = ProductionOrder::new("PO1", start(), start()).with_operation("big");
        let problem = Problem::new(workers, machines, operations, vec![order]).unwrap();
        let config = SimulationConfig::default().with_rest_between_shifts(false);

        let report = Simulator::new(&problem, &config).simulate(&Solution::from_assignments(vec![
            assignment(&[0], &[0]),
        ]));
        // six shifts of 5.5 each: done in the second shift of the second day
        assert_eq!(report.completed, 1);
        assert_eq!(report.fitness.shifts, 6);
        assert_eq!(report.fitness.orders_on_time, 0);
    }

    #[test]
    fn test_blocked_operation_never_works() {
        let workers = vec![rostered(Worker::new("W1", "operator"), 10)];
        let machines = vec![Machine::new("M1", "press")];
        let operations = vec![
            Operation::new("free", "PO1", "operator", "press").with_targets(5.0, 5.0),
            Operation::new("blocked", "PO1", "operator", "press")
                .with_prerequisite("missing")
                .with_targets(5.0, 5.0),
        ];
        let order = ProductionOrder::new("PO1", start(), start() + Days::new(3))
            .with_operation("free")
            .with_operation("blocked");
        let problem = Problem::new(workers, machines, operations, vec![order]).unwrap();
        let config = SimulationConfig::default().with_horizon_days(3);

        let solution = Solution::from_assignments(vec![assignment(&[0], &[0]), assignment(&[0], &[0])]);
        let report = Simulator::new(&problem, &config).simulate(&solution);

        assert_eq!(report.stalled, vec![1]);
        assert_eq!(report.operations[1].achieved, [0.0, 0.0]);
        assert!(report.operations[1].schedule.is_empty());
        assert_eq!(report.fitness.orders_on_time, 0);
        // horizon exhausted
        assert_eq!(report.fitness.shifts, 3 * SHIFTS_PER_DAY);
    }

    #[test]
    fn test_dependency_cycle_stalls() {
        let workers = vec![rostered(Worker::new("W1", "operator"), 5)];
        let machines = vec![Machine::new("M1", "press")];
        let operations = vec![
            Operation::new("A", "PO1", "operator", "press")
                .with_prerequisite("B")
                .with_targets(5.0, 0.0),
            Operation::new("B", "PO1", "operator", "press")
                .with_prerequisite("A")
                .with_targets(5.0, 0.0),
        ];
        let order = ProductionOrder::new("PO1", start(), start() + Days::new(3))
            .with_operation("A")
            .with_operation("B");
        let problem = Problem::new(workers, machines, operations, vec![order]).unwrap();
        let config = SimulationConfig::default().with_horizon_days(2);

        let solution = Solution::from_assignments(vec![assignment(&[0], &[0]), assignment(&[0], &[0])]);
        let report = Simulator::new(&problem, &config).simulate(&solution);

        assert_eq!(report.stalled, vec![0, 1]);
        assert_eq!(report.completed, 0);
        for op in &report.operations {
            assert_eq!(op.achieved, [0.0, 0.0]);
            assert!(op.schedule.is_empty());
        }
        assert_eq!(report.fitness, Fitness::new(0, 2 * SHIFTS_PER_DAY, 0.0));
    }

    #[test]
    fn test_nearest_deadline_served_first() {
        let workers = vec![rostered(Worker::new("W1", "operator"), 5)];
        let machines = vec![Machine::new("M1", "press")];
        let operations = vec![
            Operation::new("relaxed", "PO1", "operator", "press").with_targets(5.0, 0.0),
            Operation::new("urgent", "PO2", "operator", "press").with_targets(5.0, 0.0),
        ];
        let orders = vec![
            ProductionOrder::new("PO1", start(), start() + Days::new(9)).with_operation("relaxed"),
            ProductionOrder::new("PO2", start(), start() + Days::new(1)).with_operation("urgent"),
        ];
        let problem = Problem::new(workers, machines, operations, orders).unwrap();
        let config = SimulationConfig::default().with_rest_between_shifts(false);

        let solution = Solution::from_assignments(vec![assignment(&[0], &[0]), assignment(&[0], &[0])]);
        let report = Simulator::new(&problem, &config).simulate(&solution);

        assert_eq!(report.operations[1].schedule[0].shift, 0);
        assert_eq!(report.operations[0].schedule[0].shift, 1);
        assert_eq!(report.fitness.orders_on_time, 2);
        assert_eq!(report.fitness.shifts, 2);
    }

    /// `first` holds the only worker; once it completes, the worker is
    /// recycled to either `early` (nearest deadline) or `big` (largest
    /// target). Each of those has its own machine but no worker.
    fn recycling_plant(quality: f64) -> Problem {
        let workers = vec![rostered(Worker::new("W1", "operator").with_quality(quality), 5)];
        let machines = (0..3).map(|i| Machine::new(format!("M{i}"), "press")).collect();
        let operations = vec![
            Operation::new("first", "PO1", "operator", "press").with_targets(5.0, 0.0),
            Operation::new("early", "PO2", "operator", "press").with_targets(5.0, 0.0),
            Operation::new("big", "PO3", "operator", "press").with_targets(50.0, 0.0),
        ];
        let orders = vec![
            ProductionOrder::new("PO1", start(), start() + Days::new(5)).with_operation("first"),
            ProductionOrder::new("PO2", start(), start() + Days::new(1)).with_operation("early"),
            ProductionOrder::new("PO3", start(), start() + Days::new(9)).with_operation("big"),
        ];
        Problem::new(workers, machines, operations, orders).unwrap()
    }

    fn recycling_solution() -> Solution {
        Solution::from_assignments(vec![
            assignment(&[0], &[0]),
            assignment(&[], &[1]),
            assignment(&[], &[2]),
        ])
    }

    #[test]
    fn test_strong_worker_recycled_to_most_demanding() {
        let problem = recycling_plant(0.95);
        let config = SimulationConfig::default()
            .with_horizon_days(1)
            .with_rest_between_shifts(false);
        let report = Simulator::new(&problem, &config).simulate(&recycling_solution());

        let big = &report.operations[2];
        assert_eq!(big.schedule[0].worker_id, "W1");
        assert_eq!(big.schedule[0].shift, 1);
        assert!(report.operations[1].schedule.is_empty());
    }

    #[test]
    fn test_ordinary_worker_recycled_by_deadline() {
        let problem = recycling_plant(0.5);
        let config = SimulationConfig::default()
            .with_horizon_days(1)
            .with_rest_between_shifts(false);
        let report = Simulator::new(&problem, &config).simulate(&recycling_solution());

        let early = &report.operations[1];
        assert_eq!(early.schedule[0].worker_id, "W1");
        assert_eq!(early.schedule[0].shift, 1);
        assert!(early.is_complete());
    }

    #[test]
    #[should_panic(expected = "operations slice does not match the problem")]
    fn test_evaluate_rejects_mismatched_operations() {
        let problem = chain();
        let config = SimulationConfig::default();
        let mut operations = problem.fresh_operations();
        operations.pop();
        Simulator::new(&problem, &config).evaluate(&chain_solution(), &mut operations);
    }

    #[test]
    fn test_uses_only_needed_pairs() {
        let workers = (0..3)
            .map(|i| rostered(Worker::new(format!("W{i}"), "operator").with_hourly_cost(1.0), 5))
            .collect();
        let machines = (0..3).map(|i| Machine::new(format!("M{i}"), "press")).collect();
        let operations = vec![Operation::new("small", "PO1", "operator", "press").with_targets(5.0, 0.0)];
        let order = ProductionOrder::new("PO1", start(), start()).with_operation("small");
        let problem = Problem::new(workers, machines, operations, vec![order]).unwrap();
        let config = SimulationConfig::default();

        let report = Simulator::new(&problem, &config).simulate(&Solution::from_assignments(vec![
            assignment(&[0, 1, 2], &[0, 1, 2]),
        ]));
        assert_eq!(report.operations[0].schedule.len(), 1);
        assert_eq!(report.fitness, Fitness::new(1, 1, 5.5));
    }

    #[test]
    fn test_unavailable_worker_idles() {
        // rostered for the first day only
        let workers = vec![rostered(Worker::new("W1", "operator"), 1)];
        let machines = vec![Machine::new("M1", "press")];
        let operations = vec![Operation::new("long", "PO1", "operator", "press").with_targets(100.0, 0.0)];
        let order = ProductionOrder::new("PO1", start(), start() + Days::new(9)).with_operation("long");
        let problem = Problem::new(workers, machines, operations, vec![order]).unwrap();
        let config = SimulationConfig::default()
            .with_horizon_days(4)
            .with_rest_between_shifts(false);

        let report = Simulator::new(&problem, &config).simulate(&Solution::from_assignments(vec![
            assignment(&[0], &[0]),
        ]));
        assert_eq!(report.operations[0].schedule.len(), SHIFTS_PER_DAY);
        assert!(report.operations[0].schedule.iter().all(|e| e.date == start()));
        assert_eq!(report.fitness.shifts, 4 * SHIFTS_PER_DAY);
    }

    #[test]
    fn test_resources_exclusive_per_shift() {
        let problem = plant();
        let config = SimulationConfig::default();
        let builder = SolutionBuilder::new(&problem);
        let simulator = Simulator::new(&problem, &config);
        for seed in 0..10 {
            let solution = builder.random(&mut create_rng(seed));
            let report = simulator.simulate(&solution);
            let mut seen_workers = BTreeSet::new();
            let mut seen_machines = BTreeSet::new();
            for op in &report.operations {
                for e in &op.schedule {
                    assert!(seen_workers.insert((e.date, e.shift, e.worker_id.clone())));
                    assert!(seen_machines.insert((e.date, e.shift, e.machine_id.clone())));
                }
            }
        }
    }

    #[test]
    fn test_deterministic_and_resetting() {
        let problem = plant();
        let config = SimulationConfig::default();
        let simulator = Simulator::new(&problem, &config);
        let solution = SolutionBuilder::new(&problem).random(&mut create_rng(21));

        let mut operations = problem.fresh_operations();
        let a = simulator.evaluate(&solution, &mut operations);
        let logged = operations.iter().map(|o| o.schedule.len()).sum::<usize>();
        let b = simulator.evaluate(&solution, &mut operations);
        assert_eq!(a, b);
        assert_eq!(operations.iter().map(|o| o.schedule.len()).sum::<usize>(), logged);
        assert_eq!(simulator.simulate(&solution).fitness, a);

        // pack has no machine and never completes
        assert_eq!(a.orders_on_time, 0);
        assert_eq!(a.shifts, config.horizon_days * SHIFTS_PER_DAY);
    }
}
