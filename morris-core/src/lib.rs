//! Morris Core - Game engine and AI
//!
//! This crate provides the core game logic for Nine Men's Morris:
//! - Board topology (24 points, 32 connections, 16 mill lines)
//! - Board state with an incremental Zobrist hash
//! - Phases, legal move generation, apply/undo and repetition draws
//! - Phase-weighted position evaluation
//! - Alpha-beta minimax AI and a random baseline
//! - Point-by-point input handling for interactive front ends

pub mod topology;
pub mod board;
pub mod moves;
pub mod rules;
pub mod eval;
pub mod ai;
pub mod interaction;
pub mod error;

// Re-exports for convenient access
pub use topology::{topology, ParsePointError, Point, NUM_POINTS};
pub use board::{Board, Player, PIECES_PER_PLAYER};
pub use moves::{Action, Move};
pub use rules::{GameResult, MoveGuard, Phase, Rules, Snapshot, Undo, REPETITION_LIMIT};
pub use eval::{Brain, Evaluator, Feature, BRAIN_SIZE, FEATURES_PER_PHASE};
pub use ai::{CacheScope, MinimaxAI, RandomAI, SearchStats, DEFAULT_DEPTH, WIN_SCORE};
pub use interaction::{Intent, Progress, TurnBuilder};
pub use error::{Error, Result};
