//! Mutation operators for brain evolution
//!
//! A mutation picks a random number of distinct coefficients and either
//! redraws each one or nudges it with small noise.

use morris_core::Brain;
use rand::seq::index;
use rand::Rng;

/// Mutation parameters
#[derive(Clone, Debug)]
pub struct MutationConfig {
    /// Chance that a chosen coefficient is redrawn instead of nudged
    pub reset_probability: f64,
    /// Redrawn coefficients come from `[-reset_range, reset_range]`
    pub reset_range: f32,
    /// Nudges come from `[-noise, noise]`
    pub noise: f32,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            reset_probability: 0.1,
            reset_range: 10.0,
            noise: 1.0,
        }
    }
}

impl MutationConfig {
    pub fn with_reset_probability(mut self, p: f64) -> Self {
        self.reset_probability = p;
        self
    }

    pub fn with_noise(mut self, noise: f32) -> Self {
        self.noise = noise;
        self
    }
}

/// Largest reset range or noise a mutation will use
const MAX_SPREAD: f32 = 1.0e6;

/// Mutate a copy of `brain`.
///
/// Touches between one and all coefficients, each at most once. Non-finite
/// parameters fall back to their defaults.
pub fn mutate_brain<R: Rng>(brain: &Brain, config: &MutationConfig, rng: &mut R) -> Brain {
    let defaults = MutationConfig::default();
    let mut weights = *brain.as_array();
    let count = rng.gen_range(1..=weights.len());
    let reset_p = if config.reset_probability.is_finite() {
        config.reset_probability.clamp(0.0, 1.0)
    } else {
        defaults.reset_probability
    };
    let range = spread(config.reset_range, defaults.reset_range);
    let noise = spread(config.noise, defaults.noise);

    for i in index::sample(&mut *rng, weights.len(), count) {
        if rng.gen_bool(reset_p) {
            weights[i] = rng.gen_range(-range..=range);
        } else {
            weights[i] += rng.gen_range(-noise..=noise);
        }
    }
    Brain::from_array(weights)
}

fn spread(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.abs().min(MAX_SPREAD)
    } else {
        default
    }
}
