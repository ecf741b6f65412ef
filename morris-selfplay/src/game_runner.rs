//! Game runner - executes single games
//!
//! Level 3 - Step-level implementation

use morris_core::{Brain, GameResult, MinimaxAI, Move, Player, RandomAI, Rules};

use crate::config::{AiConfig, PlayerType, SelfPlayConfig};
use crate::fitness::{score_game, Outcome};

/// Outcome of a single game
#[derive(Clone, Debug)]
pub struct GameOutcome {
    /// Final game result; the ply cap counts as a draw
    pub result: GameResult,
    /// Number of plies played
    pub plies: u32,
    /// Pieces left on the board, indexed by player
    pub pieces: [u8; 2],
    /// Move history
    pub moves: Vec<Move>,
}

impl GameOutcome {
    /// Check if game is a draw
    pub fn is_draw(&self) -> bool {
        self.result == GameResult::Draw
    }

    /// Get winner (None for draw)
    pub fn winner(&self) -> Option<Player> {
        self.result.winner()
    }

    pub fn outcome_for(&self, player: Player) -> Outcome {
        match self.winner() {
            Some(winner) if winner == player => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Draw,
        }
    }

    pub fn pieces_of(&self, player: Player) -> u8 {
        self.pieces[player.index()]
    }

    /// Fitness of this game for `player`
    pub fn score_for(&self, player: Player) -> f32 {
        score_game(
            self.outcome_for(player),
            self.pieces_of(player),
            self.pieces_of(player.opponent()),
        )
    }
}

// ============================================================================
// CONTENDERS
// ============================================================================

/// AI wrapper enum for asymmetric play
pub enum Contender {
    Minimax(MinimaxAI),
    Random(RandomAI),
}

impl Contender {
    /// Create an AI player from config
    pub fn from_config(config: &AiConfig, side: Player, brain: &Brain, seed: u64) -> Self {
        match config.player_type {
            PlayerType::Minimax => Contender::Minimax(
                MinimaxAI::new(side, brain.clone(), config.depth).with_cache_scope(config.cache_scope),
            ),
            PlayerType::Random => Contender::Random(RandomAI::new(seed)),
        }
    }

    /// Get move from AI player
    pub fn choose(&mut self, rules: &mut Rules) -> morris_core::Result<Option<Move>> {
        match self {
            Contender::Minimax(ai) => ai.best_move(rules),
            Contender::Random(ai) => Ok(ai.select_move(&rules.legal_moves())),
        }
    }

    pub fn reset(&mut self) {
        if let Contender::Minimax(ai) = self {
            ai.reset();
        }
    }
}

/// Play one game from the opening position
pub fn play_game(white: &mut Contender, black: &mut Contender, max_plies: u32) -> morris_core::Result<GameOutcome> {
    let mut rules = Rules::new();
    let mut moves = Vec::new();
    white.reset();
    black.reset();

    while !rules.is_terminal() && rules.board().ply() < max_plies {
        let mv = match rules.board().turn() {
            Player::White => white.choose(&mut rules)?,
            Player::Black => black.choose(&mut rules)?,
        };
        let Some(mv) = mv else {
            break;
        };
        rules.commit(mv)?;
        moves.push(mv);
    }

    let result = match rules.result() {
        GameResult::Ongoing => GameResult::Draw,
        result => result,
    };
    let board = rules.board();
    let outcome = GameOutcome {
        result,
        plies: board.ply(),
        pieces: [
            board.pieces_on_board(Player::White),
            board.pieces_on_board(Player::Black),
        ],
        moves,
    };
    tracing::debug!(result = ?outcome.result, plies = outcome.plies, "game finished");
    Ok(outcome)
}

/// Play the learner with `brain` against the configured opponent
pub fn play_learner_game(
    config: &SelfPlayConfig,
    brain: &Brain,
    opponent_brain: &Brain,
    seed: u64,
) -> morris_core::Result<GameOutcome> {
    let side = config.learner_side;
    let mut learner = Contender::from_config(&config.learner, side, brain, seed);
    let mut opponent = Contender::from_config(&config.opponent, side.opponent(), opponent_brain, seed.wrapping_add(1));
    match side {
        Player::White => play_game(&mut learner, &mut opponent, config.max_plies),
        Player::Black => play_game(&mut opponent, &mut learner, config.max_plies),
    }
}

/// Game runner that hands out a fresh seed per game
pub struct GameRunner {
    config: SelfPlayConfig,
    seed_counter: u64,
}

impl GameRunner {
    pub fn new(config: SelfPlayConfig) -> Self {
        let seed_counter = config.seed;
        Self { config, seed_counter }
    }

    pub fn play(&mut self, brain: &Brain, opponent_brain: &Brain) -> morris_core::Result<GameOutcome> {
        let seed = self.next_seed();
        play_learner_game(&self.config, brain, opponent_brain, seed)
    }

    /// Get next seed and increment counter
    pub fn next_seed(&mut self) -> u64 {
        let seed = self.seed_counter;
        self.seed_counter = self.seed_counter.wrapping_add(2);
        seed
    }

    pub fn config(&self) -> &SelfPlayConfig {
        &self.config
    }
}
