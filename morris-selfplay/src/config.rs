//! Configuration types for self-play
//!
//! Level 4 - Utilities and configuration

use morris_core::{CacheScope, Player, DEFAULT_DEPTH};

/// Player type for games
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerType {
    /// Alpha-beta minimax over an evaluator brain
    #[default]
    Minimax,
    /// Uniform random legal moves
    Random,
}

/// AI configuration for one side
#[derive(Clone, Debug)]
pub struct AiConfig {
    pub player_type: PlayerType,
    /// Search depth in plies (minimax only)
    pub depth: u32,
    pub cache_scope: CacheScope,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            player_type: PlayerType::Minimax,
            depth: DEFAULT_DEPTH,
            cache_scope: CacheScope::PerGame,
        }
    }
}

impl AiConfig {
    /// Create config for minimax at given depth
    pub fn minimax(depth: u32) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    pub fn random() -> Self {
        Self {
            player_type: PlayerType::Random,
            ..Self::default()
        }
    }

    pub fn with_cache_scope(mut self, scope: CacheScope) -> Self {
        self.cache_scope = scope;
        self
    }
}

/// Self-play configuration: one learner game per population member
#[derive(Clone, Debug)]
pub struct SelfPlayConfig {
    pub learner: AiConfig,
    pub opponent: AiConfig,
    /// Side the learner plays
    pub learner_side: Player,
    /// Games reaching this many plies count as draws
    pub max_plies: u32,
    /// Play a generation's games on the rayon pool
    pub parallel: bool,
    /// First seed handed to random players
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            learner: AiConfig::default(),
            opponent: AiConfig::minimax(2),
            learner_side: Player::White,
            max_plies: 400,
            parallel: false,
            seed: 42,
        }
    }
}

impl SelfPlayConfig {
    pub fn with_learner(mut self, learner: AiConfig) -> Self {
        self.learner = learner;
        self
    }

    pub fn with_opponent(mut self, opponent: AiConfig) -> Self {
        self.opponent = opponent;
        self
    }

    pub fn with_learner_side(mut self, side: Player) -> Self {
        self.learner_side = side;
        self
    }

    pub fn with_max_plies(mut self, max_plies: u32) -> Self {
        self.max_plies = max_plies;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SelfPlayConfig::default();
        assert_eq!(config.learner.player_type, PlayerType::Minimax);
        assert_eq!(config.learner.depth, DEFAULT_DEPTH);
        assert_eq!(config.opponent.depth, 2);
        assert_eq!(config.learner_side, Player::White);
        assert!(!config.parallel);
    }

    #[test]
    fn test_builders() {
        let config = SelfPlayConfig::default()
            .with_opponent(AiConfig::random())
            .with_learner(AiConfig::minimax(1).with_cache_scope(CacheScope::PerMove))
            .with_learner_side(Player::Black)
            .with_max_plies(50)
            .with_parallel(true)
            .with_seed(7);
        assert_eq!(config.opponent.player_type, PlayerType::Random);
        assert_eq!(config.learner.depth, 1);
        assert_eq!(config.learner.cache_scope, CacheScope::PerMove);
        assert_eq!(config.learner_side, Player::Black);
        assert_eq!(config.max_plies, 50);
        assert!(config.parallel);
        assert_eq!(config.seed, 7);
    }
}
