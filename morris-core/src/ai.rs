//! Minimax AI with alpha-beta pruning and a static-score cache

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;

use crate::board::Player;
use crate::error::{Error, Result};
use crate::eval::{Brain, Evaluator};
use crate::moves::Move;
use crate::rules::{GameResult, Rules};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Score of a won position (effectively infinite)
pub const WIN_SCORE: f32 = 1.0e6;

/// Default search depth in plies
pub const DEFAULT_DEPTH: u32 = 3;

/// When the static-score cache is emptied
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheScope {
    /// Kept across moves, cleared by [`MinimaxAI::reset`]
    #[default]
    PerGame,
    /// Cleared at the start of every decision
    PerMove,
}

/// Counters for the last decision
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cache_hits: u64,
    pub cutoffs: u64,
}

// ============================================================================
// MINIMAX AI
// ============================================================================

/// Depth-limited alpha-beta search for one side
pub struct MinimaxAI {
    pub max_depth: u32,
    evaluator: Evaluator,
    cache: FxHashMap<u64, f32>,
    cache_scope: CacheScope,
    stats: SearchStats,
}

impl MinimaxAI {
    pub fn new(me: Player, brain: Brain, max_depth: u32) -> Self {
        Self {
            max_depth,
            evaluator: Evaluator::new(me, brain),
            cache: FxHashMap::default(),
            cache_scope: CacheScope::PerGame,
            stats: SearchStats::default(),
        }
    }

    pub fn with_cache_scope(mut self, scope: CacheScope) -> Self {
        self.cache_scope = scope;
        self
    }

    pub fn me(&self) -> Player {
        self.evaluator.me()
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Forget everything learned about the previous game
    pub fn reset(&mut self) {
        self.cache.clear();
        self.stats = SearchStats::default();
    }

    /// Best legal move for the side to move
    pub fn best_move(&mut self, rules: &mut Rules) -> Result<Option<Move>> {
        let moves = rules.legal_moves();
        self.select_move(rules, &moves)
    }

    /// Pick the highest scoring of `moves`; the first one wins ties
    pub fn select_move(&mut self, rules: &mut Rules, moves: &[Move]) -> Result<Option<Move>> {
        let me = self.me();
        if rules.board().turn() != me {
            return Err(Error::OutOfTurn(me));
        }
        if self.cache_scope == CacheScope::PerMove {
            self.cache.clear();
        }
        self.stats = SearchStats::default();

        let mut best: Option<(Move, f32)> = None;
        for &mv in moves {
            let alpha = best.map_or(f32::NEG_INFINITY, |(_, score)| score);
            let mut child = rules.try_move(mv)?;
            let score = self.search(&mut child, 1, alpha, f32::INFINITY, false)?;
            child.finish()?;
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }

        if let Some((mv, score)) = best {
            tracing::debug!(
                player = %me,
                mv = %mv,
                score,
                nodes = self.stats.nodes,
                cache_hits = self.stats.cache_hits,
                cutoffs = self.stats.cutoffs,
                "selected move"
            );
        }
        Ok(best.map(|(mv, _)| mv))
    }

    fn search(&mut self, rules: &mut Rules, depth: u32, mut alpha: f32, mut beta: f32, maximizing: bool) -> Result<f32> {
        self.stats.nodes += 1;
        let key = rules.board().hash();
        if let Some(&score) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            return Ok(score);
        }

        // Only static scores go into the cache
        let terminal = match rules.result() {
            GameResult::Ongoing => None,
            GameResult::Draw => Some(0.0),
            result if result.winner() == Some(self.me()) => Some(WIN_SCORE),
            _ => Some(-WIN_SCORE),
        };
        if let Some(score) = terminal {
            self.cache.insert(key, score);
            return Ok(score);
        }
        if depth >= self.max_depth {
            let score = self.evaluator.evaluate(rules);
            self.cache.insert(key, score);
            return Ok(score);
        }

        let moves = rules.legal_moves();
        let mut best = if maximizing { f32::NEG_INFINITY } else { f32::INFINITY };
        for mv in moves {
            let mut child = rules.try_move(mv)?;
            let score = self.search(&mut child, depth + 1, alpha, beta, !maximizing)?;
            child.finish()?;
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }
        Ok(best)
    }
}

// ============================================================================
// RANDOM AI
// ============================================================================

/// Baseline opponent: uniform choice among legal moves
pub struct RandomAI {
    rng: ChaCha8Rng,
}

impl RandomAI {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn select_move(&mut self, moves: &[Move]) -> Option<Move> {
        moves.choose(&mut self.rng).copied()
    }
}
