//! Harmony Memory: the ranked population of the search.

use rand::Rng;

use super::types::Fitness;
use crate::models::Operation;
use crate::random::sample_weighted;
use crate::solution::Solution;

/// A solution, its simulated fitness, and the operations copy holding the
/// assignment logs of that simulation.
#[derive(Debug, Clone)]
pub struct HarmonyEntry {
    pub solution: Solution,
    pub fitness: Fitness,
    pub operations: Vec<Operation>,
}

/// Fixed-capacity population of [`HarmonyEntry`] values.
#[derive(Debug, Clone)]
pub struct HarmonyMemory {
    capacity: usize,
    entries: Vec<HarmonyEntry>,
}

impl HarmonyMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HarmonyEntry] {
        &self.entries
    }

    /// Adds an entry while the memory is below capacity.
    ///
    /// Returns `false` (dropping the entry) when full.
    pub fn push(&mut self, entry: HarmonyEntry) -> bool {
        if self.entries.len() >= self.capacity {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Index of the best entry; the first one wins ties.
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            match best {
                Some(b) if !entry.fitness.is_better(&self.entries[b].fitness) => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Index of the worst entry; the first one wins ties.
    pub fn worst_index(&self) -> Option<usize> {
        let mut worst: Option<usize> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            match worst {
                Some(w) if !self.entries[w].fitness.is_better(&entry.fitness) => {}
                _ => worst = Some(i),
            }
        }
        worst
    }

    pub fn best(&self) -> Option<&HarmonyEntry> {
        self.best_index().map(|i| &self.entries[i])
    }

    /// Entry indices from best to worst (stable for equal fitness).
    pub fn ranked(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| self.entries[a].fitness.rank_cmp(&self.entries[b].fitness));
        order
    }

    /// Picks a solution with probability proportional to `1 / (rank + 1)`.
    pub fn select_rank_weighted<R: Rng>(&self, rng: &mut R) -> Option<&Solution> {
        let weighted: Vec<(usize, f64)> = self
            .ranked()
            .into_iter()
            .enumerate()
            .map(|(rank, i)| (i, 1.0 / (rank as f64 + 1.0)))
            .collect();
        sample_weighted(&weighted, rng).map(|&i| &self.entries[i].solution)
    }

    /// Replaces the worst entry when `entry` beats it.
    pub fn replace_worst_if_better(&mut self, entry: HarmonyEntry) -> bool {
        match self.worst_index() {
            Some(w) if entry.fitness.is_better(&self.entries[w].fitness) => {
                self.entries[w] = entry;
                true
            }
            _ => false,
        }
    }

    /// Mean pairwise dissimilarity, `1 - similarity`, over all entry pairs.
    ///
    /// A memory with fewer than two entries counts as fully diverse.
    pub fn diversity(&self) -> f64 {
        let n = self.entries.len();
        if n <= 1 {
            return 1.0;
        }

        let mut total = 0.0;
        let mut pairs = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                total += 1.0 - self.entries[i].solution.similarity(&self.entries[j].solution);
                pairs += 1;
            }
        }
        total / pairs as f64
    }

    /// Keeps the entry at `keep` in front and refills the rest of the
    /// memory from `generate`.
    pub fn reseed<F>(&mut self, keep: usize, mut generate: F)
    where
        F: FnMut() -> HarmonyEntry,
    {
        let kept = self.entries.swap_remove(keep);
        self.entries.clear();
        self.entries.push(kept);
        while self.entries.len() < self.capacity {
            self.entries.push(generate());
        }
    }

    /// Replaces the worst `max(1, fraction * capacity)` entries with
    /// generated ones. Returns how many entries were replaced.
    pub fn diversify<F>(&mut self, fraction: f64, mut generate: F) -> usize
    where
        F: FnMut() -> HarmonyEntry,
    {
        let count = ((fraction * self.capacity as f64) as usize)
            .max(1)
            .min(self.entries.len());
        let mut worst_first = self.ranked();
        worst_first.reverse();
        for &i in worst_first.iter().take(count) {
            self.entries[i] = generate();
        }
        count
    }
}
