//! Hybridization of two solutions.

use std::collections::BTreeSet;

use rand::Rng;

use super::builder::SolutionBuilder;
use super::types::{Assignment, Solution};
use crate::models::Problem;

/// Probability of inheriting an operation's resources from `first`.
const FIRST_PARENT_BIAS: f64 = 0.7;
/// Inherited sets smaller than this are topped up from the parents.
const MIN_INHERITED: usize = 2;
/// Upper bound on workers and machines per operation in the child.
const MAX_INHERITED: usize = 3;

/// Builds a child solution operation by operation.
///
/// Each operation inherits the eligible resources of `first` with
/// probability 0.7, otherwise those of `second`. Sets with fewer than two
/// members are topped up from `second`, then `first`. Workers are then
/// trimmed to the three best by score and machines to the three most
/// productive, and empty slots are repaired.
pub fn hybridize<R: Rng>(
    problem: &Problem,
    first: &Solution,
    second: &Solution,
    rng: &mut R,
) -> Solution {
    let workers = problem.workers();
    let machines = problem.machines();
    let operations = problem.operations();
    let n = operations.len().min(first.len()).min(second.len());

    let mut child = Solution::empty(operations.len());
    for op in 0..n {
        let required = &operations[op];
        let preferred = if rng.random::<f64>() < FIRST_PARENT_BIAS {
            first.get(op)
        } else {
            second.get(op)
        };

        let worker_ok = |w: &usize| workers[*w].position == required.required_position;
        let machine_ok = |m: &usize| machines[*m].machine_type == required.required_machine_type;

        let mut inherited_workers: Vec<usize> =
            preferred.workers.iter().copied().filter(worker_ok).collect();
        top_up(&mut inherited_workers, [&second.get(op).workers, &first.get(op).workers], worker_ok);
        let mut inherited_machines: Vec<usize> =
            preferred.machines.iter().copied().filter(machine_ok).collect();
        top_up(
            &mut inherited_machines,
            [&second.get(op).machines, &first.get(op).machines],
            machine_ok,
        );

        inherited_workers.sort_by(|&a, &b| workers[b].score().total_cmp(&workers[a].score()));
        inherited_machines
            .sort_by(|&a, &b| machines[b].productivity.total_cmp(&machines[a].productivity));

        *child.get_mut(op) = Assignment {
            workers: inherited_workers.into_iter().take(MAX_INHERITED).collect(),
            machines: inherited_machines.into_iter().take(MAX_INHERITED).collect(),
        };
    }

    SolutionBuilder::new(problem).repair(&mut child);
    child
}

fn top_up<F>(inherited: &mut Vec<usize>, sources: [&BTreeSet<usize>; 2], eligible: F)
where
    F: Fn(&usize) -> bool,
{
    for source in sources {
        for r in source.iter().filter(|r| eligible(*r)) {
            if inherited.len() >= MIN_INHERITED {
                return;
            }
            if !inherited.contains(r) {
                inherited.push(*r);
            }
        }
    }
}
