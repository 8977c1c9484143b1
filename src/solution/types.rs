//! Solution representation.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::models::Problem;

/// Workers and machines tentatively assigned to one operation.
///
/// Sets are ordered so that iteration, and therefore simulation, is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assignment {
    /// Worker indices into [`Problem::workers`].
    pub workers: BTreeSet<usize>,
    /// Machine indices into [`Problem::machines`].
    pub machines: BTreeSet<usize>,
}

impl Assignment {
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty() && self.machines.is_empty()
    }
}

/// A candidate allocation: one [`Assignment`] per operation index.
///
/// The same worker or machine may appear under several operations.
/// Exclusivity is only enforced per shift, by the simulator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    assignments: Vec<Assignment>,
}

impl Solution {
    /// A solution with no resources for `operations` operations.
    pub fn empty(operations: usize) -> Self {
        Self {
            assignments: vec![Assignment::default(); operations],
        }
    }

    pub fn from_assignments(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn get(&self, op: usize) -> &Assignment {
        &self.assignments[op]
    }

    pub fn get_mut(&mut self, op: usize) -> &mut Assignment {
        &mut self.assignments[op]
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Fraction of shared resource references, from 0 (disjoint) to 1
    /// (identical).
    ///
    /// Each operation contributes `2 * |shared|` over `|a| + |b|` for
    /// workers and for machines; the totals are pooled over all operations.
    pub fn similarity(&self, other: &Solution) -> f64 {
        let mut shared = 0usize;
        let mut total = 0usize;

        for (a, b) in self.assignments.iter().zip(&other.assignments) {
            let workers = a.workers.len() + b.workers.len();
            if workers > 0 {
                shared += 2 * a.workers.intersection(&b.workers).count();
                total += workers;
            }
            let machines = a.machines.len() + b.machines.len();
            if machines > 0 {
                shared += 2 * a.machines.intersection(&b.machines).count();
                total += machines;
            }
        }

        if total > 0 {
            shared as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Operations left without a worker or machine although an eligible
    /// one exists.
    pub fn unstaffed(&self, problem: &Problem) -> Vec<usize> {
        let index = problem.index();
        (0..self.assignments.len())
            .filter(|&op| {
                let a = &self.assignments[op];
                (a.workers.is_empty() && !index.eligible_workers(op).is_empty())
                    || (a.machines.is_empty() && !index.eligible_machines(op).is_empty())
            })
            .collect()
    }
}
