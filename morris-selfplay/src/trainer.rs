//! One generation of self-play evolution
//!
//! Level 2 - Phase-level implementation

use anyhow::Result;
use morris_core::Brain;
use morris_evolve::Ga;
use rand::Rng;
use rayon::prelude::*;

use crate::fitness::{FitnessSummary, Outcome};
use crate::game_runner::{play_learner_game, GameOutcome, GameRunner};
use crate::store::GameRecord;

/// Result of one population member's game
#[derive(Clone, Debug)]
pub struct MemberResult {
    pub brain: Brain,
    pub outcome: Outcome,
    pub plies: u32,
    pub score: f32,
}

#[derive(Clone, Debug)]
pub struct GenerationReport {
    pub generation: u32,
    pub members: Vec<MemberResult>,
    pub summary: FitnessSummary,
}

impl GenerationReport {
    /// Log records for every member of the generation
    pub fn records(&self) -> impl Iterator<Item = GameRecord> + '_ {
        self.members.iter().map(move |m| GameRecord {
            generation: self.generation,
            brain: m.brain.as_array().to_vec(),
            outcome: m.outcome,
            plies: m.plies,
            score: m.score,
        })
    }
}

/// Breed a population around `elite`, play one game per member and score it
pub fn run_generation<R: Rng>(
    ga: &mut Ga,
    runner: &mut GameRunner,
    elite: &Brain,
    opponent: &Brain,
    rng: &mut R,
) -> Result<GenerationReport> {
    let population = ga.generate_population(elite, rng)?;
    let generation = ga.generation();
    let seeds: Vec<u64> = population.iter().map(|_| runner.next_seed()).collect();
    let config = runner.config();

    let games: Vec<GameOutcome> = if config.parallel {
        population
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(brain, &seed)| play_learner_game(config, brain, opponent, seed))
            .collect::<Result<_, _>>()?
    } else {
        population
            .iter()
            .zip(&seeds)
            .map(|(brain, &seed)| play_learner_game(config, brain, opponent, seed))
            .collect::<Result<_, _>>()?
    };

    let side = config.learner_side;
    let mut members = Vec::with_capacity(population.len());
    for (index, (brain, game)) in population.into_iter().zip(games).enumerate() {
        let outcome = game.outcome_for(side);
        let score = game.score_for(side);
        ga.record_fitness(score)?;
        tracing::info!(
            generation,
            member = index,
            outcome = ?outcome,
            plies = game.plies,
            score,
            "game scored"
        );
        members.push(MemberResult {
            brain,
            outcome,
            plies: game.plies,
            score,
        });
    }

    let summary = FitnessSummary::from_games(members.iter().map(|m| (m.outcome, m.score)));
    Ok(GenerationReport {
        generation,
        members,
        summary,
    })
}

/// The generation's best brain if it did not lose on score, else `current`
pub fn next_elite(report: &GenerationReport, current: &Brain) -> Brain {
    let scores: Vec<f32> = report.members.iter().map(|m| m.score).collect();
    match morris_evolve::best_index(&scores) {
        Some(i) if scores[i] >= 0.0 => report.members[i].brain.clone(),
        _ => current.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AiConfig, SelfPlayConfig};
    use morris_evolve::EvolutionConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fast_config() -> SelfPlayConfig {
        SelfPlayConfig::default()
            .with_learner(AiConfig::minimax(1))
            .with_opponent(AiConfig::random())
            .with_max_plies(80)
    }

    #[test]
    fn test_generation_scores_every_member() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut ga = Ga::new(EvolutionConfig::default().with_population_size(3));
        let mut runner = GameRunner::new(fast_config());
        let elite = Brain::default();

        let report = run_generation(&mut ga, &mut runner, &elite, &elite, &mut rng).unwrap();
        assert_eq!(report.generation, 1);
        assert_eq!(report.members.len(), 3);
        assert_eq!(report.members[0].brain, elite);
        assert_eq!(ga.fitness().len(), 3);
        assert_eq!(report.summary.total_games(), 3);
        assert_eq!(report.records().count(), 3);

        // the scored generation feeds the next one
        let next = run_generation(&mut ga, &mut runner, &elite, &elite, &mut rng).unwrap();
        assert_eq!(next.generation, 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let elite = Brain::default();
        let run = |parallel: bool| {
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            let mut ga = Ga::new(EvolutionConfig::default().with_population_size(3));
            let mut runner = GameRunner::new(fast_config().with_parallel(parallel));
            run_generation(&mut ga, &mut runner, &elite, &elite, &mut rng).unwrap()
        };
        let a: Vec<f32> = run(false).members.iter().map(|m| m.score).collect();
        let b: Vec<f32> = run(true).members.iter().map(|m| m.score).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_next_elite() {
        let current = Brain::default();
        let challenger = Brain::from_array([1.0; morris_core::BRAIN_SIZE]);
        let member = |brain: &Brain, score: f32| MemberResult {
            brain: brain.clone(),
            outcome: Outcome::Draw,
            plies: 10,
            score,
        };
        let report = |members| GenerationReport {
            generation: 1,
            members,
            summary: FitnessSummary::default(),
        };

        let better = report(vec![member(&current, -1.0), member(&challenger, 0.0)]);
        assert_eq!(next_elite(&better, &current), challenger);

        let worse = report(vec![member(&challenger, -3.0), member(&current, -1.0)]);
        assert_eq!(next_elite(&worse, &current), current);
    }
}
