//! Harmony Search (HS).
//!
//! A population metaheuristic modeled on musical improvisation. New
//! solutions are improvised by copying parts of remembered solutions
//! (harmony consideration), jittering them (pitch adjustment), or filling
//! in randomly. A candidate replaces the worst memory entry when it is
//! better.
//!
//! # Key Types
//!
//! - [`Fitness`]: Lexicographic outcome of a simulation
//! - [`HarmonyMemory`]: Ranked, fixed-capacity population
//! - [`HsConfig`]: Memory size, budget, rates and stagnation policy
//! - [`HsRunner`]: Executes the search loop
//! - [`HsResult`]: Best solution, its schedule and run statistics
//!
//! # References
//!
//! - Geem, Kim & Loganathan (2001), "A New Heuristic Optimization Algorithm: Harmony Search"
//! - Mahdavi, Fesanghary & Damangir (2007), "An Improved Harmony Search Algorithm"

mod config;
mod memory;
mod runner;
mod types;

pub use config::HsConfig;
pub use memory::{HarmonyEntry, HarmonyMemory};
pub use runner::{HsResult, HsRunner, StopReason};
pub use types::{Fitness, HarmonyRates};
