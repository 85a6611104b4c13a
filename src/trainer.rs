//! Training orchestration: one session owns the population, the simulator,
//! and the run statistics.

use crate::config::Config;
use crate::game::GameSim;
use crate::grid::Turn;
use crate::population::Population;
use crate::stats::TrainingStats;

/// Map a policy's output vector to a steering decision (argmax)
pub fn decide(outputs: &[f32]) -> Turn {
    let index = outputs
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(1);
    Turn::from_index(index)
}

/// One training run: evaluates every candidate against the shared episode
/// seed and feeds scores back to the population.
///
/// The session is the only holder of run state; it is created at startup and
/// dropped at exit.
pub struct TrainingSession {
    population: Population,
    sim: GameSim,
    episode_seed: u64,
    stats_interval: u64,
    stats: TrainingStats,
}

impl TrainingSession {
    /// Build a session from a validated config and a ready population
    pub fn new(config: &Config, population: Population) -> Self {
        let episode_seed = config.evolution.episode_seed;
        let sim = GameSim::new(
            config.game.grid_size,
            Some(config.game.stagnation_cap),
            episode_seed,
        );

        Self {
            population,
            sim,
            episode_seed,
            stats_interval: config.logging.stats_interval.max(1),
            stats: TrainingStats::new(),
        }
    }

    /// Evaluate the network under the cursor for one full episode and
    /// advance the population. Returns the terminal score.
    ///
    /// Every candidate in a generation resets with the same seed, so all of
    /// them face an identical food-placement sequence and their scores are
    /// comparable.
    pub fn evaluate_current(&mut self) -> f32 {
        self.stats
            .begin_candidate(self.population.generation(), self.population.cursor());
        self.sim.reset(self.episode_seed);

        loop {
            let senses = self.sim.sense();
            let outputs = self.population.run_current(&senses);
            let direction = self.sim.heading().turned(decide(&outputs));
            if self.sim.step(direction).terminated {
                break;
            }
        }

        let score = self.sim.terminal_score();
        self.population.advance(score);
        score
    }

    /// Evaluate every candidate once; the final advance fires the
    /// population's evolution step.
    pub fn run_generation(&mut self) {
        let generation = self.population.generation();
        let mut scores = Vec::with_capacity(self.population.size());

        for _ in 0..self.population.size() {
            scores.push(self.evaluate_current());
        }

        self.stats.record_generation(generation, &scores);
    }

    /// Run a fixed number of generations, logging at the configured interval
    pub fn run(&mut self, generations: u64) {
        for i in 0..generations {
            self.run_generation();
            if i % self.stats_interval == 0 {
                log::info!("{}", self.stats.summary());
            }
        }
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }
}
