//! Pairwise breeding operator between networks.

use super::network::Network;
use rand::Rng;

impl Network {
    /// Breed this network (the fitter parent) into `other` (the weaker
    /// parent), mutating `other` in place.
    ///
    /// Every scalar weight and bias is decided independently in two stages:
    /// first a mutation check (probability `mutation_rate`, replaces the
    /// value with a fresh U(-1, 1) draw), then, only when the mutation check
    /// misses, a domination check (probability `domination_rate`, copies the
    /// fitter parent's value). A value that passes both checks keeps the
    /// weaker parent's original. `domination_rate` is therefore conditional
    /// on the mutation miss, not a population-wide proportion.
    pub fn breed_into(
        &self,
        other: &mut Network,
        domination_rate: f32,
        mutation_rate: f32,
        rng: &mut impl Rng,
    ) {
        debug_assert_eq!(self.layers.len(), other.layers.len());

        for (fit, weak) in self.layers.iter().zip(other.layers.iter_mut()) {
            let (rows, cols) = fit.weights.dim();
            for i in 0..rows {
                for j in 0..cols {
                    weak.weights[[i, j]] = breed_scalar(
                        fit.weights[[i, j]],
                        weak.weights[[i, j]],
                        domination_rate,
                        mutation_rate,
                        rng,
                    );
                }
            }

            for i in 0..fit.biases.len() {
                weak.biases[i] = breed_scalar(
                    fit.biases[i],
                    weak.biases[i],
                    domination_rate,
                    mutation_rate,
                    rng,
                );
            }
        }
    }
}

/// Two-stage Bernoulli decision for a single scalar: mutation check first,
/// domination check only on a mutation miss.
#[inline]
fn breed_scalar(
    fit: f32,
    weak: f32,
    domination_rate: f32,
    mutation_rate: f32,
    rng: &mut impl Rng,
) -> f32 {
    if rng.gen::<f32>() < mutation_rate {
        rng.gen_range(-1.0f32..1.0)
    } else if rng.gen::<f32>() < domination_rate {
        fit
    } else {
        weak
    }
}
