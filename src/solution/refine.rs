//! Local refinement: swap an operation's weakest resource for a stronger one.

use rand::seq::index::sample;
use rand::Rng;

use super::builder::first_max;
use super::types::Solution;
use crate::models::Problem;

/// Refines up to `sample_size` randomly chosen operations in place.
///
/// For each sampled operation the lowest-scoring worker (productivity times
/// quality) is replaced by the highest-scoring eligible worker not already on
/// the operation, but only when that worker scores strictly higher. Machines
/// are handled the same way by productivity. Returns the number of swaps.
pub fn local_refinement<R: Rng>(
    problem: &Problem,
    solution: &mut Solution,
    sample_size: usize,
    rng: &mut R,
) -> usize {
    let n = solution.len();
    let amount = sample_size.min(n);
    if amount == 0 {
        return 0;
    }

    let index = problem.index();
    let workers = problem.workers();
    let machines = problem.machines();
    let mut swaps = 0;

    for op in sample(rng, n, amount) {
        let assignment = solution.get_mut(op);

        if let Some(weakest) = first_min(&assignment.workers, |w| workers[w].score()) {
            let outside: Vec<usize> = index
                .eligible_workers(op)
                .iter()
                .copied()
                .filter(|w| !assignment.workers.contains(w))
                .collect();
            if let Some(best) = first_max(&outside, |w| workers[w].score()) {
                if workers[best].score() > workers[weakest].score() {
                    assignment.workers.remove(&weakest);
                    assignment.workers.insert(best);
                    swaps += 1;
                }
            }
        }

        if let Some(weakest) = first_min(&assignment.machines, |m| machines[m].productivity) {
            let outside: Vec<usize> = index
                .eligible_machines(op)
                .iter()
                .copied()
                .filter(|m| !assignment.machines.contains(m))
                .collect();
            if let Some(best) = first_max(&outside, |m| machines[m].productivity) {
                if machines[best].productivity > machines[weakest].productivity {
                    assignment.machines.remove(&weakest);
                    assignment.machines.insert(best);
                    swaps += 1;
                }
            }
        }
    }

    swaps
}

fn first_min<'a, I, F>(candidates: I, key: F) -> Option<usize>
where
    I: IntoIterator<Item = &'a usize>,
    F: Fn(usize) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for &c in candidates {
        let k = key(c);
        match best {
            Some((_, bk)) if k >= bk => {}
            _ => best = Some((c, k)),
        }
    }
    best.map(|(c, _)| c)
}
