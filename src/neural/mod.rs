//! Feedforward policy networks.
//!
//! Implements the genome representation used by the evolution loop:
//! - Dense layer representation over ndarray
//! - Sigmoid forward pass
//! - Pairwise breeding (two-stage mutation/domination scheme)

mod breeding;
mod network;

pub use network::{Layer, Network, Topology, TopologyError};
