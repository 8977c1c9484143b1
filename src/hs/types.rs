//! Fitness and search-rate types.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of simulating one solution.
///
/// Ranked lexicographically: more orders on time first, then fewer shifts,
/// then lower cost.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fitness {
    /// Production orders whose last operation finished by the deadline.
    pub orders_on_time: usize,
    /// Shifts simulated until every operation finished or the horizon ran out.
    pub shifts: usize,
    /// Total wage and machine cost of all worked pairs.
    pub cost: f64,
}

impl Fitness {
    pub fn new(orders_on_time: usize, shifts: usize, cost: f64) -> Self {
        Self {
            orders_on_time,
            shifts,
            cost,
        }
    }

    /// A value every real outcome beats.
    pub fn worst() -> Self {
        Self {
            orders_on_time: 0,
            shifts: usize::MAX,
            cost: f64::INFINITY,
        }
    }

    /// Ranking order: `Less` means `self` is better than `other`.
    pub fn rank_cmp(&self, other: &Fitness) -> Ordering {
        other
            .orders_on_time
            .cmp(&self.orders_on_time)
            .then(self.shifts.cmp(&other.shifts))
            .then(self.cost.total_cmp(&other.cost))
    }

    /// Whether `self` is strictly better than `other`.
    pub fn is_better(&self, other: &Fitness) -> bool {
        self.rank_cmp(other) == Ordering::Less
    }
}

/// Harmony consideration and pitch adjustment rates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HarmonyRates {
    /// Probability of copying an operation's resources from memory.
    pub consideration: f64,
    /// Probability of moving a copied resource to another eligible operation.
    pub pitch_adjustment: f64,
}

impl Default for HarmonyRates {
    fn default() -> Self {
        Self {
            consideration: 0.9,
            pitch_adjustment: 0.3,
        }
    }
}

impl HarmonyRates {
    /// Favors exploration: fewer copies from memory, more jitter.
    pub fn loosen(&mut self) {
        self.consideration = (self.consideration * 0.95).max(0.7);
        self.pitch_adjustment = (self.pitch_adjustment * 1.05).min(0.5);
    }

    /// Favors exploitation: more copies from memory, less jitter.
    pub fn tighten(&mut self) {
        self.consideration = (self.consideration * 1.05).min(0.95);
        self.pitch_adjustment = (self.pitch_adjustment * 0.95).max(0.2);
    }
}
