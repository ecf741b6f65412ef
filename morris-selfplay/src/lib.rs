//! Morris Self-Play - Fitness evaluation through game playing
//!
//! This crate drives evolution with real games:
//! - Learner vs opponent games (minimax or random)
//! - Fitness scoring from the final piece balance
//! - One full generation per call, optionally in parallel
//! - A JSON log of every evaluated brain
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: the CLI's evolve loop (orchestration)
//! - Level 2: run_generation (phases)
//! - Level 3: play_game, score_game (steps)
//! - Level 4: configuration, brain log I/O

mod config;
mod fitness;
mod game_runner;
mod store;
mod trainer;

pub use config::{AiConfig, PlayerType, SelfPlayConfig};
pub use fitness::{score_game, FitnessSummary, Outcome};
pub use game_runner::{play_game, play_learner_game, Contender, GameOutcome, GameRunner};
pub use store::{BrainLog, BrainSelector, GameRecord};
pub use trainer::{next_elite, run_generation, GenerationReport, MemberResult};
