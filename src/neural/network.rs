//! Feedforward network structure and forward propagation.

use ndarray::{Array1, Array2};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A single dense layer
#[derive(Clone, Debug)]
pub struct Layer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

/// Fixed-topology network shape: inputs -> hidden* -> outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    /// Number of input neurons
    pub inputs: usize,
    /// Number of output neurons
    pub outputs: usize,
    /// Number of hidden layers
    pub hidden_layers: usize,
    /// Neurons per hidden layer (ignored when hidden_layers == 0)
    pub hidden_nodes: usize,
}

/// Errors raised when a network topology is invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyError {
    /// inputs must be at least 1
    NoInputs,
    /// outputs must be at least 1
    NoOutputs,
    /// hidden_nodes must be at least 1 when hidden_layers > 0
    EmptyHiddenLayer,
}

impl std::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoInputs => write!(f, "network must have at least 1 input"),
            Self::NoOutputs => write!(f, "network must have at least 1 output"),
            Self::EmptyHiddenLayer => {
                write!(f, "hidden_nodes must be at least 1 when hidden_layers > 0")
            }
        }
    }
}

impl std::error::Error for TopologyError {}

/// A feedforward policy network with a fitness score attached.
///
/// The layer chain is fixed at construction and never resized: adjacent
/// layers always satisfy `weights[i].ncols() == biases[i].len() ==
/// weights[i+1].nrows()`.
#[derive(Clone, Debug)]
pub struct Network {
    /// Number of input neurons
    pub n_inputs: usize,
    /// Number of output neurons
    pub n_outputs: usize,
    /// Dense layers, input side first
    pub layers: Vec<Layer>,
    /// Fitness recorded by the last evaluation
    pub score: f32,
}

impl Network {
    /// Build a zero-filled network for the given topology.
    ///
    /// Fails if the topology has no inputs, no outputs, or hidden layers of
    /// zero width. (A negative hidden-layer count is unrepresentable.)
    pub fn new(topology: Topology) -> Result<Self, TopologyError> {
        if topology.inputs < 1 {
            return Err(TopologyError::NoInputs);
        }
        if topology.outputs < 1 {
            return Err(TopologyError::NoOutputs);
        }
        if topology.hidden_layers > 0 && topology.hidden_nodes < 1 {
            return Err(TopologyError::EmptyHiddenLayer);
        }

        let mut sizes = Vec::with_capacity(topology.hidden_layers + 2);
        sizes.push(topology.inputs);
        for _ in 0..topology.hidden_layers {
            sizes.push(topology.hidden_nodes);
        }
        sizes.push(topology.outputs);

        let layers = sizes
            .windows(2)
            .map(|pair| Layer {
                weights: Array2::zeros((pair[0], pair[1])),
                biases: Array1::zeros(pair[1]),
            })
            .collect();

        Ok(Self {
            n_inputs: topology.inputs,
            n_outputs: topology.outputs,
            layers,
            score: 0.0,
        })
    }

    /// Build a network with every scalar drawn from U(-1, 1), seeded for
    /// reproducibility.
    pub fn new_random(topology: Topology, seed: u64) -> Result<Self, TopologyError> {
        let mut net = Self::new(topology)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        net.randomize(&mut rng);
        Ok(net)
    }

    /// Fill all weights and biases with zeros
    pub fn set_zero(&mut self) {
        for layer in &mut self.layers {
            layer.weights.fill(0.0);
            layer.biases.fill(0.0);
        }
    }

    /// Replace every scalar with an independent U(-1, 1) draw
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        for layer in &mut self.layers {
            layer.weights.mapv_inplace(|_| rng.gen_range(-1.0f32..1.0));
            layer.biases.mapv_inplace(|_| rng.gen_range(-1.0f32..1.0));
        }
    }

    /// Perform a forward pass through the network.
    ///
    /// Pure function of (weights, biases, input): `v <- sigmoid(v*W + b)`
    /// layer by layer.
    #[inline]
    pub fn forward(&self, inputs: &[f32]) -> Vec<f32> {
        debug_assert_eq!(inputs.len(), self.n_inputs);

        let mut activation = Array1::from_vec(inputs.to_vec());

        for layer in &self.layers {
            activation = activation.dot(&layer.weights) + &layer.biases;
            activation.mapv_inplace(sigmoid);
        }

        activation.to_vec()
    }

    /// The topology this network was built with
    pub fn topology(&self) -> Topology {
        let hidden_layers = self.layers.len() - 1;
        let hidden_nodes = if hidden_layers > 0 {
            self.layers[0].weights.ncols()
        } else {
            0
        };
        Topology {
            inputs: self.n_inputs,
            outputs: self.n_outputs,
            hidden_layers,
            hidden_nodes,
        }
    }

    /// Total number of parameters (weights + biases)
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    /// Check that no weight or bias is NaN/Inf
    pub fn is_valid(&self) -> bool {
        self.layers.iter().all(|layer| {
            layer.weights.iter().all(|w| w.is_finite())
                && layer.biases.iter().all(|b| b.is_finite())
        })
    }
}

/// Logistic sigmoid
#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology(inputs: usize, outputs: usize, hidden_layers: usize, hidden_nodes: usize) -> Topology {
        Topology {
            inputs,
            outputs,
            hidden_layers,
            hidden_nodes,
        }
    }

    #[test]
    fn test_layer_chain_shapes() {
        let net = Network::new(topology(5, 3, 2, 8)).unwrap();
        assert_eq!(net.layers.len(), 3);
        assert_eq!(net.layers[0].weights.dim(), (5, 8));
        assert_eq!(net.layers[1].weights.dim(), (8, 8));
        assert_eq!(net.layers[2].weights.dim(), (8, 3));

        for pair in net.layers.windows(2) {
            assert_eq!(pair[0].weights.ncols(), pair[0].biases.len());
            assert_eq!(pair[0].weights.ncols(), pair[1].weights.nrows());
        }
    }

    #[test]
    fn test_no_hidden_layers() {
        let net = Network::new(topology(5, 3, 0, 0)).unwrap();
        assert_eq!(net.layers.len(), 1);
        assert_eq!(net.layers[0].weights.dim(), (5, 3));
    }

    #[test]
    fn test_invalid_topologies() {
        assert_eq!(
            Network::new(topology(0, 3, 0, 0)).unwrap_err(),
            TopologyError::NoInputs
        );
        assert_eq!(
            Network::new(topology(5, 0, 0, 0)).unwrap_err(),
            TopologyError::NoOutputs
        );
        assert_eq!(
            Network::new(topology(5, 3, 2, 0)).unwrap_err(),
            TopologyError::EmptyHiddenLayer
        );
    }

    #[test]
    fn test_zero_network_forward() {
        let net = Network::new(topology(5, 3, 1, 4)).unwrap();
        let outputs = net.forward(&[1.0, -1.0, 0.5, 0.0, 2.0]);

        // All-zero weights collapse every pre-activation to 0, so every
        // output is sigmoid(0) = 0.5
        assert_eq!(outputs.len(), 3);
        for out in outputs {
            assert!((out - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_forward_output_range() {
        let net = Network::new_random(topology(5, 3, 2, 8), 7).unwrap();
        let outputs = net.forward(&[3.0, -2.0, 0.25, 10.0, -10.0]);

        assert_eq!(outputs.len(), 3);
        assert!(outputs.iter().all(|o| *o > 0.0 && *o < 1.0));
    }

    #[test]
    fn test_random_init_reproducible() {
        let a = Network::new_random(topology(5, 3, 1, 6), 42).unwrap();
        let b = Network::new_random(topology(5, 3, 1, 6), 42).unwrap();
        let c = Network::new_random(topology(5, 3, 1, 6), 43).unwrap();

        assert_eq!(a.layers[0].weights, b.layers[0].weights);
        assert_eq!(a.layers[0].biases, b.layers[0].biases);
        assert_ne!(a.layers[0].weights, c.layers[0].weights);
    }

    #[test]
    fn test_random_values_in_unit_interval() {
        let net = Network::new_random(topology(5, 3, 2, 8), 11).unwrap();
        for layer in &net.layers {
            assert!(layer.weights.iter().all(|w| (-1.0..1.0).contains(w)));
            assert!(layer.biases.iter().all(|b| (-1.0..1.0).contains(b)));
        }
    }

    #[test]
    fn test_set_zero() {
        let mut net = Network::new_random(topology(5, 3, 1, 4), 9).unwrap();
        net.set_zero();
        for layer in &net.layers {
            assert!(layer.weights.iter().all(|w| *w == 0.0));
            assert!(layer.biases.iter().all(|b| *b == 0.0));
        }
    }

    #[test]
    fn test_topology_roundtrip() {
        let shape = topology(5, 3, 2, 8);
        let net = Network::new(shape).unwrap();
        assert_eq!(net.topology(), shape);

        let flat = topology(4, 2, 0, 0);
        let net = Network::new(flat).unwrap();
        assert_eq!(net.topology(), flat);
    }

    #[test]
    fn test_parameter_count() {
        let net = Network::new(topology(5, 3, 0, 0)).unwrap();
        assert_eq!(net.parameter_count(), 5 * 3 + 3);
    }
}
