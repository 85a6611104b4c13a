//! # serpentine
//!
//! Neuroevolution engine for grid snake: feedforward policy networks bred
//! with a genetic algorithm against a deterministic simulator.
//!
//! ## Features
//!
//! - **Rank-based elitism**: the fittest genome survives every generation
//!   untouched and seeds all others
//! - **Deterministic**: seeded `ChaCha8Rng` everywhere; `(seed, weights)`
//!   reproduces an identical trajectory and score
//! - **Resumable**: the fittest network is persisted once per generation
//! - **Configurable**: YAML configuration files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serpentine::{Config, Population, TrainingSession};
//!
//! let config = Config::default();
//! let population = Population::new_random(
//!     config.evolution.population_size,
//!     config.topology(),
//!     config.evolution.domination_rate,
//!     config.evolution.mutation_rate,
//!     42,
//! ).unwrap();
//!
//! let mut session = TrainingSession::new(&config, population);
//! session.run(1000);
//!
//! println!("{}", session.stats().summary());
//! ```
//!
//! ## Resuming
//!
//! ```rust,no_run
//! use serpentine::{Config, Population, TrainingSession};
//!
//! let config = Config::default();
//! let mut population = Population::from_file(
//!     "fittest.net",
//!     config.evolution.population_size,
//!     config.evolution.domination_rate,
//!     config.evolution.mutation_rate,
//!     42,
//! ).unwrap();
//! population.persist_to("fittest.net");
//!
//! let mut session = TrainingSession::new(&config, population);
//! session.run(1000);
//! ```
//!
//! Rendering, keyboard handling, and frame pacing are the host's job: the
//! core hands out simulation state (`GameSim` accessors), a 5-element sensor
//! vector, and per-generation statistics, and consumes one direction per
//! tick.

pub mod config;
pub mod game;
pub mod grid;
pub mod neural;
pub mod population;
pub mod stats;
pub mod store;
pub mod trainer;

// Re-export main types
pub use config::Config;
pub use game::GameSim;
pub use neural::Network;
pub use population::Population;
pub use trainer::TrainingSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
