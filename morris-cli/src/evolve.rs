//! Evolution command - improve evaluator weights through self-play
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: select_starting_brains(), run_generations(), print_summary()
//! - Level 3: build_evolution_config(), build_selfplay_config()
//! - Level 4: flag parsing, brain log I/O

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use morris_core::Brain;
use morris_evolve::{EvolutionConfig, Ga, MutationConfig};
use morris_selfplay::{
    next_elite, run_generation, AiConfig, BrainLog, BrainSelector, GameRunner, GenerationReport, SelfPlayConfig,
};

use crate::create_rng;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct EvolveArgs {
    /// Population size
    #[arg(long, default_value = "6")]
    pub population: usize,

    /// Number of generations to run
    #[arg(long, default_value = "10")]
    pub generations: u32,

    /// Learner search depth
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Opponent search depth
    #[arg(long, default_value = "2")]
    pub opponent_depth: u32,

    /// Play against uniformly random moves instead of minimax
    #[arg(long)]
    pub random_opponent: bool,

    /// Brain log to read from and append to
    #[arg(long, value_name = "FILE", default_value = "brain.json")]
    pub brain_file: PathBuf,

    /// Games reaching this many plies are draws
    #[arg(long, default_value = "400")]
    pub max_plies: u32,

    /// Play each generation's games in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Chance a mutated weight is redrawn instead of nudged (0.0-1.0)
    #[arg(long, default_value = "0.1", value_parser = parse_probability)]
    pub reset_probability: f64,

    /// Size of mutation nudges
    #[arg(long, default_value = "1.0", value_parser = parse_noise)]
    pub noise: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run evolution command
///
/// 1. Load the brain log and pick the elite and the opponent
/// 2. Run the generations, saving the log after each one
/// 3. Print the final elite
pub fn run(args: EvolveArgs, seed: Option<u64>) -> Result<()> {
    let mut rng = create_rng(seed);
    let mut log = BrainLog::load_or_default(&args.brain_file);
    let (elite, opponent) = select_starting_brains(&log, &mut rng);

    tracing::info!(
        "Starting evolution: pop={}, gen={}, depth={}, records={}",
        args.population,
        args.generations,
        args.depth,
        log.len()
    );

    let elite = run_generations(&args, &mut log, elite, opponent, seed, &mut rng)?;
    print_summary(&elite, &log, &args.brain_file)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Elite: best logged brain, else random. Opponent: latest winning brain, else the default.
fn select_starting_brains(log: &BrainLog, rng: &mut ChaCha8Rng) -> (Brain, Brain) {
    let elite = log.select(BrainSelector::Best).unwrap_or_else(|| {
        tracing::info!("No usable brain in the log, starting from random weights");
        Brain::random(rng)
    });
    let opponent = log.select(BrainSelector::LastPositive).unwrap_or_default();
    (elite, opponent)
}

fn run_generations(
    args: &EvolveArgs,
    log: &mut BrainLog,
    mut elite: Brain,
    mut opponent: Brain,
    seed: Option<u64>,
    rng: &mut ChaCha8Rng,
) -> Result<Brain> {
    let runner_seed = seed.unwrap_or_else(|| rng.gen());
    let mut ga = Ga::new(build_evolution_config(args)).with_generation(log.last_generation().unwrap_or(0));
    let mut runner = GameRunner::new(build_selfplay_config(args, runner_seed));

    for _ in 0..args.generations {
        let report = run_generation(&mut ga, &mut runner, &elite, &opponent, rng)?;
        log_generation(&report);
        record_generation(log, &report, &args.brain_file)?;
        elite = next_elite(&report, &elite);
        opponent = refresh_opponent(log, &report, opponent);
    }
    Ok(elite)
}

fn print_summary(elite: &Brain, log: &BrainLog, path: &Path) -> Result<()> {
    println!("\n=== Evolution Complete ===");
    println!("Games logged: {} ({})", log.len(), path.display());
    println!("Elite brain:");
    println!("{}", serde_json::to_string(elite).context("Failed to serialize elite brain")?);
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn build_evolution_config(args: &EvolveArgs) -> EvolutionConfig {
    let mutation = MutationConfig::default()
        .with_reset_probability(args.reset_probability)
        .with_noise(args.noise);
    EvolutionConfig::default()
        .with_population_size(args.population)
        .with_mutation(mutation)
}

fn build_selfplay_config(args: &EvolveArgs, seed: u64) -> SelfPlayConfig {
    let opponent = if args.random_opponent {
        AiConfig::random()
    } else {
        AiConfig::minimax(args.opponent_depth)
    };
    SelfPlayConfig::default()
        .with_learner(AiConfig::minimax(args.depth))
        .with_opponent(opponent)
        .with_max_plies(args.max_plies)
        .with_parallel(args.parallel)
        .with_seed(seed)
}

fn log_generation(report: &GenerationReport) {
    let s = &report.summary;
    tracing::info!(
        "Generation {}: W/D/L {}/{}/{}, best={:.2}, avg={:.2}",
        report.generation,
        s.wins,
        s.draws,
        s.losses,
        s.best,
        s.mean
    );
}

/// After a generation that won on score, play against the latest winner
fn refresh_opponent(log: &BrainLog, report: &GenerationReport, current: Brain) -> Brain {
    if report.summary.best <= 0.0 {
        return current;
    }
    match log.select(BrainSelector::LastPositive) {
        Some(brain) => {
            tracing::info!("Generation {}: opponent updated to the latest winning brain", report.generation);
            brain
        }
        None => current,
    }
}

// ============================================================================
// LEVEL 4 - FLAG PARSING AND FILE I/O
// ============================================================================

fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{} is not between 0 and 1", s))
    }
}

fn parse_noise(s: &str) -> Result<f32, String> {
    let noise: f32 = s.parse().map_err(|e| format!("{}", e))?;
    if noise.is_finite() && noise >= 0.0 {
        Ok(noise)
    } else {
        Err(format!("{} is not a finite non-negative number", s))
    }
}

fn record_generation(log: &mut BrainLog, report: &GenerationReport, path: &Path) -> Result<()> {
    for record in report.records() {
        log.append(record);
    }
    log.save(path)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use morris_selfplay::{FitnessSummary, GameRecord, Outcome, PlayerType};
    use rand::SeedableRng;

    fn args() -> EvolveArgs {
        EvolveArgs {
            population: 4,
            generations: 1,
            depth: 2,
            opponent_depth: 1,
            random_opponent: false,
            brain_file: PathBuf::from("brain.json"),
            max_plies: 100,
            parallel: false,
            reset_probability: 0.2,
            noise: 0.5,
        }
    }

    #[test]
    fn test_build_configs() {
        let evolution = build_evolution_config(&args());
        assert_eq!(evolution.population_size, 4);
        assert_eq!(evolution.mutation.reset_probability, 0.2);
        assert_eq!(evolution.mutation.noise, 0.5);

        let selfplay = build_selfplay_config(&args(), 11);
        assert_eq!(selfplay.learner.depth, 2);
        assert_eq!(selfplay.opponent.depth, 1);
        assert_eq!(selfplay.opponent.player_type, PlayerType::Minimax);
        assert_eq!(selfplay.max_plies, 100);
        assert_eq!(selfplay.seed, 11);

        let random = build_selfplay_config(
            &EvolveArgs {
                random_opponent: true,
                ..args()
            },
            11,
        );
        assert_eq!(random.opponent.player_type, PlayerType::Random);
    }

    #[test]
    fn test_starting_brains_from_empty_log() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (elite, opponent) = select_starting_brains(&BrainLog::default(), &mut rng);
        assert!(elite.as_array().iter().all(|&w| (0.0..10.0).contains(&w)));
        assert_eq!(opponent, Brain::default());
    }

    #[test]
    fn test_starting_brains_from_log() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut log = BrainLog::default();
        let record = |w: f32, score: f32| GameRecord {
            generation: 1,
            brain: vec![w; morris_core::BRAIN_SIZE],
            outcome: Outcome::Win,
            plies: 50,
            score,
        };
        log.append(record(1.0, 6.0));
        log.append(record(2.0, 2.0));
        log.append(record(3.0, -4.0));
        let (elite, opponent) = select_starting_brains(&log, &mut rng);
        assert_eq!(elite.as_array()[0], 1.0);
        assert_eq!(opponent.as_array()[0], 2.0);
    }

    #[test]
    fn test_mutation_flags_reject_bad_values() {
        assert_eq!(parse_probability("0.25"), Ok(0.25));
        assert!(parse_probability("nan").is_err());
        assert!(parse_probability("1.5").is_err());
        assert!(parse_probability("x").is_err());

        assert_eq!(parse_noise("0"), Ok(0.0));
        assert!(parse_noise("inf").is_err());
        assert!(parse_noise("NaN").is_err());
        assert!(parse_noise("-1").is_err());
    }

    fn report(generation: u32, best: f32) -> GenerationReport {
        GenerationReport {
            generation,
            members: Vec::new(),
            summary: FitnessSummary {
                best,
                ..FitnessSummary::default()
            },
        }
    }

    #[test]
    fn test_opponent_follows_latest_winner() {
        let record = |generation: u32, w: f32, score: f32| GameRecord {
            generation,
            brain: vec![w; morris_core::BRAIN_SIZE],
            outcome: if score > 0.0 { Outcome::Win } else { Outcome::Loss },
            plies: 40,
            score,
        };
        let mut log = BrainLog::default();
        log.append(record(1, 1.0, 3.0));
        let opponent = select_starting_brains(&log, &mut ChaCha8Rng::seed_from_u64(2)).1;
        assert_eq!(opponent.as_array()[0], 1.0);

        // generation 2 only lost: opponent unchanged
        log.append(record(2, 2.0, -5.0));
        let opponent = refresh_opponent(&log, &report(2, -5.0), opponent);
        assert_eq!(opponent.as_array()[0], 1.0);

        // generation 3 won: its winner becomes the opponent
        log.append(record(3, 7.0, 4.0));
        log.append(record(3, 8.0, -1.0));
        let opponent = refresh_opponent(&log, &report(3, 4.0), opponent);
        assert_eq!(opponent.as_array()[0], 7.0);
    }
}
