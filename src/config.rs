//! Configuration for training runs.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::neural::Topology;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub neural: NeuralConfig,
    pub evolution: EvolutionConfig,
    pub logging: LoggingConfig,
}

/// Game/simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Size of the square grid
    pub grid_size: usize,
    /// Ticks without food before an autonomous episode is cut off
    pub stagnation_cap: u32,
}

/// Policy network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralConfig {
    /// Number of input neurons (the sensor vector width)
    pub n_inputs: usize,
    /// Number of output neurons (left / straight / right)
    pub n_outputs: usize,
    /// Number of hidden layers
    pub hidden_layers: usize,
    /// Neurons per hidden layer
    pub hidden_nodes: usize,
}

/// Evolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Number of networks in the population
    pub population_size: usize,
    /// Conditional probability of inheriting the fitter parent's value
    pub domination_rate: f32,
    /// Unconditional probability of replacing a value with a fresh draw
    pub mutation_rate: f32,
    /// Seed for the shared episode; every candidate in a generation faces
    /// the same food sequence
    pub episode_seed: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Generations between stats log lines
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            neural: NeuralConfig::default(),
            evolution: EvolutionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 32,
            stagnation_cap: 100,
        }
    }
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            n_inputs: 5,
            n_outputs: 3,
            hidden_layers: 1,
            hidden_nodes: 8,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 16,
            domination_rate: 0.5,
            mutation_rate: 0.05,
            episode_seed: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.game.grid_size < 2 || self.game.grid_size > 255 {
            return Err("grid_size must be between 2 and 255".to_string());
        }
        if self.game.stagnation_cap == 0 {
            return Err("stagnation_cap must be > 0".to_string());
        }
        if self.neural.n_inputs == 0 || self.neural.n_outputs == 0 {
            return Err("neural inputs/outputs must be > 0".to_string());
        }
        if self.neural.hidden_layers > 0 && self.neural.hidden_nodes == 0 {
            return Err("hidden_nodes must be > 0 when hidden_layers > 0".to_string());
        }
        if self.evolution.population_size < 2 {
            return Err("population_size must be at least 2".to_string());
        }
        if !(0.0..=1.0).contains(&self.evolution.domination_rate) {
            return Err("domination_rate must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.evolution.mutation_rate) {
            return Err("mutation_rate must be in [0, 1]".to_string());
        }
        Ok(())
    }

    /// The network topology described by the neural section
    pub fn topology(&self) -> Topology {
        Topology {
            inputs: self.neural.n_inputs,
            outputs: self.neural.n_outputs,
            hidden_layers: self.neural.hidden_layers,
            hidden_nodes: self.neural.hidden_nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.game.grid_size, loaded.game.grid_size);
        assert_eq!(config.evolution.population_size, loaded.evolution.population_size);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.game.grid_size = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.evolution.mutation_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.evolution.population_size = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.neural.hidden_layers = 2;
        config.neural.hidden_nodes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_topology_from_config() {
        let config = Config::default();
        let topology = config.topology();
        assert_eq!(topology.inputs, 5);
        assert_eq!(topology.outputs, 3);
    }
}
