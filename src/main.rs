//! serpentine - CLI entry point
//!
//! Unattended neuroevolution training for grid snake.

use clap::{Parser, Subcommand};
use serpentine::{store, Config, Population, TrainingSession};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "serpentine")]
#[command(version)]
#[command(about = "Neuroevolution trainer for grid snake")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a fresh population
    Train {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations to run
        #[arg(short, long, default_value = "1000")]
        generations: u64,

        /// Where to persist the fittest network each generation
        #[arg(short, long, default_value = "fittest.net")]
        save: PathBuf,

        /// Seed for population initialization and breeding
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Where to write the stats history (JSON)
        #[arg(long, default_value = "stats_history.json")]
        stats: PathBuf,
    },

    /// Resume training from a persisted network
    Resume {
        /// Persisted network file to resume from
        #[arg(short = 'n', long)]
        network: PathBuf,

        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of additional generations
        #[arg(short, long, default_value = "1000")]
        generations: u64,

        /// Seed for re-randomized slots and breeding
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Where to write the stats history (JSON)
        #[arg(long, default_value = "stats_history.json")]
        stats: PathBuf,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Inspect a persisted network file
    Inspect {
        /// Persisted network file
        network: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            config,
            generations,
            save,
            seed,
            stats,
        } => {
            let config = load_config(&config)?;
            let mut population = Population::new_random(
                config.evolution.population_size,
                config.topology(),
                config.evolution.domination_rate,
                config.evolution.mutation_rate,
                seed,
            )?;
            population.persist_to(&save);
            run_training(&config, population, generations, &save, &stats)
        }

        Commands::Resume {
            network,
            config,
            generations,
            seed,
            stats,
        } => {
            let config = load_config(&config)?;
            let mut population = Population::from_file(
                &network,
                config.evolution.population_size,
                config.evolution.domination_rate,
                config.evolution.mutation_rate,
                seed,
            )?;
            println!(
                "Resumed from {:?} at generation {}",
                network,
                population.generation()
            );
            population.persist_to(&network);
            run_training(&config, population, generations, &network, &stats)
        }

        Commands::Init { output } => {
            let config = Config::default();
            config.save(&output)?;
            println!("Configuration saved to: {:?}", output);
            Ok(())
        }

        Commands::Inspect { network } => inspect_network(network),
    }
}

fn load_config(path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Config::from_file(path)
    } else {
        println!("Using default configuration");
        Ok(Config::default())
    }
}

fn run_training(
    config: &Config,
    population: Population,
    generations: u64,
    save: &PathBuf,
    stats_path: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting training");
    println!("  Population: {}", population.size());
    println!(
        "  Grid size: {}x{}",
        config.game.grid_size, config.game.grid_size
    );
    println!("  Generations: {}", generations);
    println!("  Persisting fittest to: {:?}", save);
    println!();

    let mut session = TrainingSession::new(config, population);

    let start = Instant::now();
    session.run(generations);
    let elapsed = start.elapsed();

    println!();
    println!("=== Training Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Final generation: {}", session.population().generation());
    println!("Best score: {:.3}", session.stats().best_score);
    println!(
        "Speed: {:.1} generations/s",
        generations as f64 / elapsed.as_secs_f64()
    );

    session.stats().save_json(&stats_path.to_string_lossy())?;
    println!("Stats history: {:?}", stats_path);

    Ok(())
}

fn inspect_network(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Network Analysis ===");
    println!("File: {:?}", path);
    println!();

    let saved = store::load(&path)?;
    let topology = saved.network.topology();

    println!("Generation: {}", saved.generation);
    println!("Score: {:.3}", saved.network.score);
    println!(
        "Topology: {} -> {}x{} hidden -> {}",
        topology.inputs, topology.hidden_layers, topology.hidden_nodes, topology.outputs
    );
    println!("Parameters: {}", saved.network.parameter_count());
    println!("Finite weights: {}", saved.network.is_valid());

    Ok(())
}
