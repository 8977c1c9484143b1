//! Harmony Search execution loop.

use rand::rngs::StdRng;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::config::HsConfig;
use super::memory::{HarmonyEntry, HarmonyMemory};
use super::types::{Fitness, HarmonyRates};
use crate::error::HarmonyError;
use crate::models::{Operation, OperationSummary, Problem};
use crate::random::create_rng;
use crate::simulator::Simulator;
use crate::solution::{hybridize, local_refinement, Solution, SolutionBuilder};

/// Stagnant iterations between two rate loosenings.
const LOOSEN_EVERY: usize = 10;
/// Stagnant iterations that trigger a memory reseed.
const RESEED_AFTER: usize = 15;
/// Stagnant iterations that end the search once reseeds are used up.
const CONVERGED_AFTER: usize = 20;
/// Minimum improvised candidates per iteration.
const MIN_CANDIDATES: usize = 3;
/// Share of memory replaced after an improvement late in the run.
const DIVERSIFY_FRACTION: f64 = 0.1;

/// Why the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopReason {
    /// The iteration budget ran out.
    BudgetExhausted,
    /// No improvement for a long stretch after all reseeds were used.
    Converged,
    /// A small instance stopped improving.
    EarlyStop,
}

/// Result of a Harmony Search run.
#[derive(Debug, Clone)]
pub struct HsResult {
    /// The best solution found.
    pub best: Solution,

    /// Fitness of the best solution.
    pub best_fitness: Fitness,

    /// Operations copy with the assignment logs of the best solution.
    pub operations: Vec<Operation>,

    /// Iterations performed.
    pub iterations: usize,

    /// Memory reseeds performed.
    pub restarts: usize,

    pub stop_reason: StopReason,

    /// Consideration and pitch adjustment rates at the end of the run.
    pub rates: HarmonyRates,

    /// Best fitness after initialization and after every iteration.
    pub fitness_history: Vec<Fitness>,
}

impl HsResult {
    /// Per-operation records for persisting the schedule.
    pub fn summaries(&self) -> Vec<OperationSummary> {
        self.operations.iter().map(Operation::summary).collect()
    }
}

/// Mutable search state owned by one run.
struct SearchState {
    memory: HarmonyMemory,
    rates: HarmonyRates,
    rng: StdRng,
    restarts: usize,
    stagnation: usize,
    best: HarmonyEntry,
}

impl SearchState {
    /// Adopts the memory best as the global best when it is better.
    ///
    /// The memory may hold entries injected by an earlier diversification
    /// or reseed, so the batch candidate alone is not enough.
    fn follow_memory_best(&mut self) -> bool {
        match self.memory.best() {
            Some(entry) if entry.fitness.is_better(&self.best.fitness) => {
                self.best = entry.clone();
                true
            }
            _ => false,
        }
    }
}

/// Executes Harmony Search.
pub struct HsRunner;

impl HsRunner {
    /// Runs the search.
    ///
    /// # Errors
    /// [`HarmonyError::InvalidConfig`] when `config` fails validation.
    pub fn run(problem: &Problem, config: &HsConfig) -> Result<HsResult, HarmonyError> {
        config.validate().map_err(HarmonyError::InvalidConfig)?;

        let data_size = problem.data_size();
        let (memory_size, max_iterations) = config.resolve(data_size);
        let small_instance = data_size < config.small_instance_limit;

        let index = problem.index();
        for (op, operation) in problem.operations().iter().enumerate() {
            if index.eligible_workers(op).is_empty() || index.eligible_machines(op).is_empty() {
                tracing::warn!(
                    operation = %operation.id,
                    position = %operation.required_position,
                    machine_type = %operation.required_machine_type,
                    "no eligible worker or machine class"
                );
            }
        }

        tracing::info!(
            data_size,
            memory_size,
            max_iterations,
            "harmony search started"
        );

        let builder = SolutionBuilder::new(problem);
        let simulator = Simulator::new(problem, &config.simulation);
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        let seeds: Vec<u64> = (0..memory_size).map(|_| rng.random()).collect();
        let mut memory = HarmonyMemory::new(memory_size);
        for entry in map_seeds(&seeds, config.parallel, |seed| {
            random_entry(&builder, &simulator, &mut create_rng(seed))
        }) {
            memory.push(entry);
        }
        let best = memory
            .best()
            .cloned()
            .ok_or_else(|| HarmonyError::InvalidConfig("memory_size must be at least 1".into()))?;

        let mut state = SearchState {
            memory,
            rates: config.rates,
            rng,
            restarts: 0,
            stagnation: 0,
            best,
        };
        let mut fitness_history = vec![state.best.fitness];
        let mut iterations = 0;
        let mut stop_reason = StopReason::BudgetExhausted;

        for iteration in 0..max_iterations {
            iterations = iteration + 1;

            if config.tuning_interval > 0
                && iteration > 0
                && iteration.is_multiple_of(config.tuning_interval)
            {
                let diversity = state.memory.diversity();
                if diversity < 0.3 {
                    state.rates.loosen();
                } else if diversity > 0.7 {
                    state.rates.tighten();
                }
                tracing::debug!(
                    iteration,
                    diversity,
                    consideration = state.rates.consideration,
                    pitch_adjustment = state.rates.pitch_adjustment,
                    "rates retuned"
                );
            }

            let count = config
                .candidates_per_iteration
                .saturating_sub(state.restarts)
                .max(MIN_CANDIDATES);
            let seeds: Vec<u64> = (0..count).map(|_| state.rng.random()).collect();
            let batch = {
                let memory = &state.memory;
                let rates = state.rates;
                map_seeds(&seeds, config.parallel, |seed| {
                    let mut rng = create_rng(seed);
                    let mut solution = builder.improvise(memory, rates, &mut rng);
                    if rng.random::<f64>() < config.refine_probability {
                        local_refinement(problem, &mut solution, config.refine_sample_size, &mut rng);
                    }
                    evaluated(&simulator, solution)
                })
            };
            let Some(mut candidate) = batch
                .into_iter()
                .reduce(|best, c| if c.fitness.is_better(&best.fitness) { c } else { best })
            else {
                break;
            };

            if state.rng.random::<f64>() < config.hybridize_probability {
                let child = hybridize(
                    problem,
                    &candidate.solution,
                    &state.best.solution,
                    &mut state.rng,
                );
                let child = evaluated(&simulator, child);
                if child.fitness.is_better(&candidate.fitness) {
                    candidate = child;
                }
            }

            tracing::debug!(
                iteration,
                orders_on_time = candidate.fitness.orders_on_time,
                shifts = candidate.fitness.shifts,
                cost = candidate.fitness.cost,
                "candidate evaluated"
            );

            state.memory.replace_worst_if_better(candidate);

            if state.follow_memory_best() {
                state.stagnation = 0;
                if iteration > max_iterations / 3 {
                    let replaced = state.memory.diversify(DIVERSIFY_FRACTION, || {
                        random_entry(&builder, &simulator, &mut state.rng)
                    });
                    tracing::debug!(iteration, replaced, "memory diversified");
                }
            } else {
                state.stagnation += 1;
            }
            fitness_history.push(state.best.fitness);

            if small_instance && state.stagnation >= config.early_stop_threshold {
                stop_reason = StopReason::EarlyStop;
                break;
            }
            if state.stagnation >= RESEED_AFTER && state.restarts < config.max_restarts {
                restart(&mut state, config, &builder, &simulator);
                tracing::debug!(iteration, restarts = state.restarts, "memory reseeded");
                continue;
            }
            if state.stagnation >= CONVERGED_AFTER
                && state.restarts >= config.max_restarts
                && iterations > max_iterations / 2
            {
                stop_reason = StopReason::Converged;
                break;
            }
            if state.stagnation > 0 && state.stagnation.is_multiple_of(LOOSEN_EVERY) {
                state.rates.loosen();
            }
        }

        let mut best = state.best;
        if let Some(entry) = state.memory.best() {
            if entry.fitness.is_better(&best.fitness) {
                best = entry.clone();
            }
        }

        tracing::info!(
            iterations,
            restarts = state.restarts,
            ?stop_reason,
            orders_on_time = best.fitness.orders_on_time,
            shifts = best.fitness.shifts,
            cost = best.fitness.cost,
            "harmony search finished"
        );

        Ok(HsResult {
            best: best.solution,
            best_fitness: best.fitness,
            operations: best.operations,
            iterations,
            restarts: state.restarts,
            stop_reason,
            rates: state.rates,
            fitness_history,
        })
    }
}

/// Reseeds memory around its best entry (or the global best when that is
/// better) and resets the rates.
fn restart(
    state: &mut SearchState,
    config: &HsConfig,
    builder: &SolutionBuilder<'_>,
    simulator: &Simulator<'_>,
) {
    let memory_best = state.memory.best().map(|e| e.fitness);
    if memory_best.is_none_or(|f| state.best.fitness.is_better(&f))
        && !state.memory.replace_worst_if_better(state.best.clone())
    {
        state.memory.push(state.best.clone());
    }
    if let Some(keep) = state.memory.best_index() {
        let rng = &mut state.rng;
        state
            .memory
            .reseed(keep, || random_entry(builder, simulator, rng));
    }
    state.rates = config.rates;
    state.restarts += 1;
    state.stagnation = 0;
}

fn evaluated(simulator: &Simulator<'_>, solution: Solution) -> HarmonyEntry {
    let report = simulator.simulate(&solution);
    HarmonyEntry {
        solution,
        fitness: report.fitness,
        operations: report.operations,
    }
}

fn random_entry<R: Rng>(
    builder: &SolutionBuilder<'_>,
    simulator: &Simulator<'_>,
    rng: &mut R,
) -> HarmonyEntry {
    evaluated(simulator, builder.random(rng))
}

/// Maps every seed through `f`, in parallel when enabled. Output order
/// follows `seeds`, so results do not depend on thread scheduling.
fn map_seeds<F>(seeds: &[u64], parallel: bool, f: F) -> Vec<HarmonyEntry>
where
    F: Fn(u64) -> HarmonyEntry + Sync,
{
    #[cfg(feature = "parallel")]
    if parallel {
        return seeds.par_iter().map(|&seed| f(seed)).collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    seeds.iter().map(|&seed| f(seed)).collect()
}
