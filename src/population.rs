//! Population lifecycle: evaluation cursor, rank-based evolution, and
//! periodic diversity injection.

use crate::neural::{Network, Topology, TopologyError};
use crate::store::{self, StoreError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Generations between diversity injections
const DIVERSITY_INTERVAL: u64 = 10;

/// An ordered population of networks under evaluation.
///
/// The cursor walks the population once per generation; the wrap back to
/// index 0 triggers the evolution step automatically.
pub struct Population {
    networks: Vec<Network>,
    /// Index of the network under evaluation
    curr: usize,
    /// Generation counter, starting at 1
    generation: u64,
    domination_rate: f32,
    mutation_rate: f32,
    /// Where to persist the fittest after each evolution, if anywhere
    save_path: Option<PathBuf>,
    rng: ChaCha8Rng,
}

impl Population {
    /// Build a fresh population of independently randomized networks
    pub fn new_random(
        size: usize,
        topology: Topology,
        domination_rate: f32,
        mutation_rate: f32,
        seed: u64,
    ) -> Result<Self, TopologyError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut networks = Vec::with_capacity(size);
        for _ in 0..size {
            let mut net = Network::new(topology)?;
            net.randomize(&mut rng);
            networks.push(net);
        }

        Ok(Self {
            networks,
            curr: 0,
            generation: 1,
            domination_rate,
            mutation_rate,
            save_path: None,
            rng,
        })
    }

    /// Rebuild a population from a persisted record: the saved genome takes
    /// slot 0 (with its saved score and generation counter) and every other
    /// slot is an independent random re-initialization of the same topology.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        size: usize,
        domination_rate: f32,
        mutation_rate: f32,
        seed: u64,
    ) -> Result<Self, StoreError> {
        let saved = store::load(path)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut networks = Vec::with_capacity(size);
        networks.push(saved.network);
        for _ in 1..size {
            let mut net = networks[0].clone();
            net.randomize(&mut rng);
            net.score = 0.0;
            networks.push(net);
        }

        Ok(Self {
            networks,
            curr: 0,
            generation: saved.generation,
            domination_rate,
            mutation_rate,
            save_path: None,
            rng,
        })
    }

    /// Persist the fittest network here after every evolution step
    pub fn persist_to<P: Into<PathBuf>>(&mut self, path: P) {
        self.save_path = Some(path.into());
    }

    /// Forward an input through the network under evaluation
    pub fn run_current(&self, input: &[f32]) -> Vec<f32> {
        self.networks[self.curr].forward(input)
    }

    /// Record the terminal score for the network under evaluation and move
    /// the cursor. A full wrap evolves the population; one wrap is one
    /// generation.
    pub fn advance(&mut self, score: f32) {
        self.networks[self.curr].score = score;
        self.curr += 1;
        if self.curr == self.networks.len() {
            self.curr = 0;
            self.evolve();
        }
    }

    /// Rank-based evolution step.
    ///
    /// Networks are stable-sorted by descending score; the fittest survives
    /// untouched and is bred into every other slot. Every
    /// `DIVERSITY_INTERVAL`-th generation all non-fittest slots are
    /// re-randomized after breeding, countering premature convergence.
    pub fn evolve(&mut self) {
        self.networks.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
        });

        let fittest = self.networks[0].clone();
        for net in self.networks.iter_mut().skip(1) {
            fittest.breed_into(net, self.domination_rate, self.mutation_rate, &mut self.rng);
        }

        self.generation += 1;

        if self.generation % DIVERSITY_INTERVAL == 0 {
            for net in self.networks.iter_mut().skip(1) {
                net.randomize(&mut self.rng);
            }
        }

        if let Some(path) = &self.save_path {
            match store::save(path, self.generation, &self.networks[0]) {
                Ok(()) => log::debug!(
                    "persisted fittest (generation {}, score {:.3}) to {}",
                    self.generation,
                    self.networks[0].score,
                    path.display()
                ),
                Err(e) => log::error!("failed to persist fittest network: {}", e),
            }
        }
    }

    pub fn size(&self) -> usize {
        self.networks.len()
    }

    /// Index of the network under evaluation
    pub fn cursor(&self) -> usize {
        self.curr
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// The current rank-0 network (only meaningful right after an evolve)
    pub fn fittest(&self) -> &Network {
        &self.networks[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: Topology = Topology {
        inputs: 5,
        outputs: 3,
        hidden_layers: 1,
        hidden_nodes: 4,
    };

    fn scalars_equal(a: &Network, b: &Network) -> bool {
        a.layers
            .iter()
            .zip(b.layers.iter())
            .all(|(la, lb)| la.weights == lb.weights && la.biases == lb.biases)
    }

    fn population(size: usize, domination: f32, mutation: f32) -> Population {
        Population::new_random(size, TOPOLOGY, domination, mutation, 5).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let pop = population(4, 0.5, 0.05);
        assert_eq!(pop.size(), 4);
        assert_eq!(pop.cursor(), 0);
        assert_eq!(pop.generation(), 1);

        // Slots are independently randomized
        assert!(!scalars_equal(&pop.networks()[0], &pop.networks()[1]));
    }

    #[test]
    fn test_run_current_follows_cursor() {
        let mut pop = population(3, 0.5, 0.05);
        let input = [0.1, 0.2, 0.3, 0.4, 0.5];

        let from_pop = pop.run_current(&input);
        let direct = pop.networks()[0].forward(&input);
        assert_eq!(from_pop, direct);

        pop.advance(1.0);
        let from_pop = pop.run_current(&input);
        let direct = pop.networks()[1].forward(&input);
        assert_eq!(from_pop, direct);
    }

    #[test]
    fn test_wrap_triggers_evolution() {
        // Scores [1, 4, 2, 3]: the 4th advance wraps the cursor and fires
        // evolve; rank 0 must equal the network that scored 4, unmodified.
        let mut pop = population(4, 0.3, 0.1);
        let winner = pop.networks()[1].clone();

        for score in [1.0, 4.0, 2.0, 3.0] {
            pop.advance(score);
        }

        assert_eq!(pop.cursor(), 0);
        assert_eq!(pop.generation(), 2);
        assert_eq!(pop.fittest().score, 4.0);
        assert!(scalars_equal(pop.fittest(), &winner));
    }

    #[test]
    fn test_evolve_breeds_every_other_slot() {
        let mut pop = population(4, 0.5, 0.2);
        let before: Vec<Network> = pop.networks().to_vec();

        for score in [1.0, 4.0, 2.0, 3.0] {
            pop.advance(score);
        }

        // Ranks 1..N differ from every pre-evolve genome with overwhelming
        // probability at these rates
        for net in pop.networks().iter().skip(1) {
            for old in &before {
                assert!(!scalars_equal(net, old));
            }
        }
    }

    #[test]
    fn test_stable_sort_on_score_ties() {
        let mut pop = population(3, 0.0, 0.0);
        let first = pop.networks()[0].clone();

        // All-equal scores: stable sort keeps the original order, and with
        // both rates at zero breeding is the identity
        for score in [2.0, 2.0, 2.0] {
            pop.advance(score);
        }

        assert!(scalars_equal(pop.fittest(), &first));
    }

    #[test]
    fn test_diversity_injection_on_tenth_generation() {
        let mut pop = population(3, 0.0, 0.0);

        // With zero rates, breeding never changes a slot, so any change must
        // come from the scheduled re-randomization.
        let original = pop.networks()[1].clone();

        // Generations 2..=9: no injection
        for _ in 0..8 {
            for score in [3.0, 2.0, 1.0] {
                pop.advance(score);
            }
        }
        assert_eq!(pop.generation(), 9);
        assert!(scalars_equal(&pop.networks()[1], &original));

        // The wrap to generation 10 re-randomizes every non-fittest slot
        let fittest_before = pop.fittest().clone();
        for score in [3.0, 2.0, 1.0] {
            pop.advance(score);
        }
        assert_eq!(pop.generation(), 10);
        assert!(scalars_equal(pop.fittest(), &fittest_before));
        assert!(!scalars_equal(&pop.networks()[1], &original));
        assert!(!scalars_equal(&pop.networks()[2], &fittest_before));
    }

    #[test]
    fn test_persistence_roundtrip_through_evolution() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fittest.net");

        let mut pop = population(3, 0.5, 0.1);
        pop.persist_to(&path);

        for score in [1.5, 3.25, 2.0] {
            pop.advance(score);
        }

        let reloaded = Population::from_file(&path, 5, 0.5, 0.1, 99).unwrap();
        assert_eq!(reloaded.size(), 5);
        assert_eq!(reloaded.generation(), 2);
        assert_eq!(reloaded.networks()[0].score, 3.25);
        assert!(scalars_equal(&reloaded.networks()[0], pop.fittest()));

        // Remaining slots share the topology but not the weights
        for net in reloaded.networks().iter().skip(1) {
            assert_eq!(net.topology(), TOPOLOGY);
            assert!(!scalars_equal(net, &reloaded.networks()[0]));
        }
    }

    #[test]
    fn test_from_file_rejects_malformed_record() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("corrupt.net");
        std::fs::write(&path, "not a record at all").unwrap();

        assert!(Population::from_file(&path, 4, 0.5, 0.1, 1).is_err());
    }
}
