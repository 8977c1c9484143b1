//! Solution generators: random construction, memory-guided improvisation
//! and repair.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::types::Solution;
use crate::hs::{HarmonyMemory, HarmonyRates};
use crate::models::Problem;
use crate::random::{sample_weighted, softmax};

/// Builds candidate solutions for one problem instance.
#[derive(Debug, Clone, Copy)]
pub struct SolutionBuilder<'a> {
    problem: &'a Problem,
}

impl<'a> SolutionBuilder<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self { problem }
    }

    /// Random construction.
    ///
    /// 1. Every operation gets one uniformly chosen eligible worker and
    ///    machine.
    /// 2. Each resource not picked in step 1 joins one eligible operation,
    ///    chosen with weight `exp(-current count)` so that thinly staffed
    ///    operations attract the surplus.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Solution {
        let index = self.problem.index();
        let workers = self.problem.workers();
        let machines = self.problem.machines();
        let n = self.problem.operations().len();

        let mut solution = Solution::empty(n);
        let mut worker_taken = vec![false; workers.len()];
        let mut machine_taken = vec![false; machines.len()];

        for op in 0..n {
            if let Some(&w) = index.eligible_workers(op).choose(rng) {
                solution.get_mut(op).workers.insert(w);
                worker_taken[w] = true;
            }
            if let Some(&m) = index.eligible_machines(op).choose(rng) {
                solution.get_mut(op).machines.insert(m);
                machine_taken[m] = true;
            }
        }

        for (w, worker) in workers.iter().enumerate() {
            if worker_taken[w] {
                continue;
            }
            let candidates = index.operations_for_position(&worker.position);
            let logits: Vec<f64> = candidates
                .iter()
                .map(|&op| -(solution.get(op).workers.len() as f64))
                .collect();
            if let Some(op) = pick(candidates, &logits, rng) {
                solution.get_mut(op).workers.insert(w);
            }
        }

        for (m, machine) in machines.iter().enumerate() {
            if machine_taken[m] {
                continue;
            }
            let candidates = index.operations_for_machine_type(&machine.machine_type);
            let logits: Vec<f64> = candidates
                .iter()
                .map(|&op| -(solution.get(op).machines.len() as f64))
                .collect();
            if let Some(op) = pick(candidates, &logits, rng) {
                solution.get_mut(op).machines.insert(m);
            }
        }

        solution
    }

    /// Memory-guided improvisation.
    ///
    /// Operations are visited in ascending [`priority`](Self::priorities).
    /// With probability `rates.consideration` an operation copies the
    /// not-yet-used resources of the same operation in a memory entry drawn
    /// by rank weight; each copied resource is, with probability
    /// `rates.pitch_adjustment`, handed to another operation with the same
    /// requirement instead. Leftover resources, strongest first, join an
    /// eligible operation with weight `exp(-count) * exp(-priority)`. A final
    /// [`repair`](Self::repair) staffs any empty slot.
    pub fn improvise<R: Rng>(
        &self,
        memory: &HarmonyMemory,
        rates: HarmonyRates,
        rng: &mut R,
    ) -> Solution {
        let index = self.problem.index();
        let workers = self.problem.workers();
        let machines = self.problem.machines();
        let operations = self.problem.operations();
        let n = operations.len();

        let priority = self.priorities();
        let mut visit: Vec<usize> = (0..n).collect();
        visit.sort_by(|&a, &b| priority[a].total_cmp(&priority[b]));

        let mut solution = Solution::empty(n);
        let mut worker_used = vec![false; workers.len()];
        let mut machine_used = vec![false; machines.len()];

        for &op in &visit {
            if rng.random::<f64>() >= rates.consideration {
                continue;
            }
            let Some(source) = memory.select_rank_weighted(rng) else {
                continue;
            };
            if op >= source.len() {
                continue;
            }
            let required = &operations[op];
            let source = source.get(op);

            for &w in &source.workers {
                if worker_used[w] || workers[w].position != required.required_position {
                    continue;
                }
                worker_used[w] = true;
                let mut target = op;
                if rng.random::<f64>() < rates.pitch_adjustment {
                    let alternatives: Vec<usize> = index
                        .operations_for_position(&workers[w].position)
                        .iter()
                        .copied()
                        .filter(|&other| other != op)
                        .collect();
                    if let Some(&alt) = alternatives.choose(rng) {
                        target = alt;
                    }
                }
                solution.get_mut(target).workers.insert(w);
            }

            for &m in &source.machines {
                if machine_used[m] || machines[m].machine_type != required.required_machine_type {
                    continue;
                }
                machine_used[m] = true;
                let mut target = op;
                if rng.random::<f64>() < rates.pitch_adjustment {
                    let alternatives: Vec<usize> = index
                        .operations_for_machine_type(&machines[m].machine_type)
                        .iter()
                        .copied()
                        .filter(|&other| other != op)
                        .collect();
                    if let Some(&alt) = alternatives.choose(rng) {
                        target = alt;
                    }
                }
                solution.get_mut(target).machines.insert(m);
            }
        }

        let mut leftover_workers: Vec<usize> =
            (0..workers.len()).filter(|&w| !worker_used[w]).collect();
        leftover_workers.sort_by(|&a, &b| workers[b].productivity.total_cmp(&workers[a].productivity));
        for w in leftover_workers {
            let candidates = index.operations_for_position(&workers[w].position);
            let logits: Vec<f64> = candidates
                .iter()
                .map(|&op| -(solution.get(op).workers.len() as f64) - priority[op])
                .collect();
            if let Some(op) = pick(candidates, &logits, rng) {
                solution.get_mut(op).workers.insert(w);
            }
        }

        let mut leftover_machines: Vec<usize> =
            (0..machines.len()).filter(|&m| !machine_used[m]).collect();
        leftover_machines
            .sort_by(|&a, &b| machines[b].productivity.total_cmp(&machines[a].productivity));
        for m in leftover_machines {
            let candidates = index.operations_for_machine_type(&machines[m].machine_type);
            let logits: Vec<f64> = candidates
                .iter()
                .map(|&op| -(solution.get(op).machines.len() as f64) - priority[op])
                .collect();
            if let Some(op) = pick(candidates, &logits, rng) {
                solution.get_mut(op).machines.insert(m);
            }
        }

        self.repair(&mut solution);
        solution
    }

    /// Gives every operation without a worker (machine) the most productive
    /// eligible one. Operations with no eligible resource stay empty.
    pub fn repair(&self, solution: &mut Solution) {
        let index = self.problem.index();
        let workers = self.problem.workers();
        let machines = self.problem.machines();

        for op in 0..solution.len() {
            if solution.get(op).workers.is_empty() {
                if let Some(w) = first_max(index.eligible_workers(op), |w| workers[w].productivity) {
                    solution.get_mut(op).workers.insert(w);
                }
            }
            if solution.get(op).machines.is_empty() {
                if let Some(m) = first_max(index.eligible_machines(op), |m| machines[m].productivity)
                {
                    solution.get_mut(op).machines.insert(m);
                }
            }
        }
    }

    /// Improvisation priority per operation:
    /// `#prerequisites - 0.5 * #dependents`. Lower values are visited first.
    pub fn priorities(&self) -> Vec<f64> {
        let index = self.problem.index();
        self.problem
            .operations()
            .iter()
            .enumerate()
            .map(|(op, operation)| {
                operation.prerequisites.len() as f64 - 0.5 * index.dependent_count(op) as f64
            })
            .collect()
    }
}

/// Softmax draw over `candidates` given their log-weights.
fn pick<R: Rng>(candidates: &[usize], logits: &[f64], rng: &mut R) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    let weighted: Vec<(usize, f64)> = candidates
        .iter()
        .copied()
        .zip(softmax(logits))
        .collect();
    sample_weighted(&weighted, rng).copied()
}

/// The candidate with the highest key; the earliest one wins ties.
pub(crate) fn first_max<F>(candidates: &[usize], key: F) -> Option<usize>
where
    F: Fn(usize) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for &c in candidates {
        let k = key(c);
        match best {
            Some((_, bk)) if k <= bk => {}
            _ => best = Some((c, k)),
        }
    }
    best.map(|(c, _)| c)
}
