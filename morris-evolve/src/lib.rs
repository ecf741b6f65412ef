//! Morris Evolution - Genetic algorithm for evaluator weights
//!
//! This crate provides the evolutionary loop's building blocks:
//! - Population management with a generation counter
//! - Selection (elitism)
//! - Mutation operators
//! - Crossover operators
//!
//! Playing the games that produce fitness scores is up to the caller.

pub mod mutation;
pub mod crossover;
pub mod selection;

pub use mutation::{mutate_brain, MutationConfig};
pub use crossover::crossover_mean;
pub use selection::{best_index, select_elite};

use morris_core::Brain;
use rand::Rng;

/// Evolution configuration
#[derive(Clone, Debug)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub mutation: MutationConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 6,
            mutation: MutationConfig::default(),
        }
    }
}

impl EvolutionConfig {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_mutation(mut self, mutation: MutationConfig) -> Self {
        self.mutation = mutation;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvolveError {
    #[error("previous generation has {got} fitness scores for {expected} members")]
    IncompleteFitness { expected: usize, got: usize },
    #[error("all {0} members of the generation already have a fitness score")]
    FitnessOverflow(usize),
    #[error("population size must be at least 1")]
    EmptyPopulation,
}

/// Generational GA state
#[derive(Clone, Debug)]
pub struct Ga {
    config: EvolutionConfig,
    generation: u32,
    population: Vec<Brain>,
    fitness: Vec<f32>,
}

impl Ga {
    pub fn new(config: EvolutionConfig) -> Self {
        Self {
            config,
            generation: 0,
            population: Vec::new(),
            fitness: Vec::new(),
        }
    }

    /// Resume counting from an earlier run
    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Number of populations generated so far
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn population(&self) -> &[Brain] {
        &self.population
    }

    pub fn fitness(&self) -> &[f32] {
        &self.fitness
    }

    /// Score the next unscored member of the current population
    pub fn record_fitness(&mut self, score: f32) -> Result<(), EvolveError> {
        if self.fitness.len() >= self.population.len() {
            return Err(EvolveError::FitnessOverflow(self.population.len()));
        }
        self.fitness.push(score);
        Ok(())
    }

    /// Best scored member so far of the current population
    pub fn best(&self) -> Option<(&Brain, f32)> {
        best_index(&self.fitness).map(|i| (&self.population[i], self.fitness[i]))
    }

    /// Build the next population around `elite`.
    ///
    /// Member 0 is `elite` itself. If the previous population had at least two
    /// members, member 1 is the mean of its two best. The rest are mutations
    /// of `elite`.
    pub fn generate_population<R: Rng>(&mut self, elite: &Brain, rng: &mut R) -> Result<Vec<Brain>, EvolveError> {
        let size = self.config.population_size;
        if size == 0 {
            return Err(EvolveError::EmptyPopulation);
        }
        if self.fitness.len() != self.population.len() {
            return Err(EvolveError::IncompleteFitness {
                expected: self.population.len(),
                got: self.fitness.len(),
            });
        }

        let mut next = Vec::with_capacity(size);
        next.push(elite.clone());
        if size > 1 && self.population.len() >= 2 {
            let top = select_elite(&self.fitness, 2);
            next.push(crossover_mean(&self.population[top[0]], &self.population[top[1]]));
        }
        while next.len() < size {
            next.push(mutate_brain(elite, &self.config.mutation, rng));
        }

        self.population = next.clone();
        self.fitness.clear();
        self.generation += 1;
        Ok(next)
    }
}
