//! Position evaluation
//!
//! A [`Brain`] holds one block of feature weights per non-terminal phase,
//! laid out flat: weight `i` belongs to phase `i / FEATURES_PER_PHASE` and
//! feature `i % FEATURES_PER_PHASE`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Player};
use crate::error::{Error, Result};
use crate::rules::{Phase, Rules};
use crate::topology::{topology, Point};

/// Features scored per phase
pub const FEATURES_PER_PHASE: usize = 7;

/// Phases with their own weights: placement, movement, flying
pub const WEIGHTED_PHASES: usize = 3;

/// Length of a flat weight vector
pub const BRAIN_SIZE: usize = FEATURES_PER_PHASE * WEIGHTED_PHASES;

/// Upper bound (exclusive) of randomly drawn weights
const RANDOM_WEIGHT_MAX: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    /// Own minus opponent pieces on the board
    PieceDifference = 0,
    /// Own pieces with no empty neighbour
    OwnBlocked = 1,
    OpponentBlocked = 2,
    /// Own minus opponent closed mills
    MillDifference = 3,
    /// Lines with two own pieces and a reachable empty third point
    OwnOpenTwos = 4,
    OpponentOpenTwos = 5,
    /// Own minus opponent pieces on the four junction points
    JunctionDifference = 6,
}

impl Feature {
    pub const ALL: [Feature; FEATURES_PER_PHASE] = [
        Feature::PieceDifference,
        Feature::OwnBlocked,
        Feature::OpponentBlocked,
        Feature::MillDifference,
        Feature::OwnOpenTwos,
        Feature::OpponentOpenTwos,
        Feature::JunctionDifference,
    ];
}

/// Weight slot of a phase, `None` for terminal phases
pub fn phase_slot(phase: Phase) -> Option<usize> {
    match phase {
        Phase::Placement => Some(0),
        Phase::Movement => Some(1),
        Phase::Flying => Some(2),
        Phase::Loss | Phase::Draw => None,
    }
}

// ============================================================================
// BRAIN
// ============================================================================

/// Flat evaluator weight vector
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Brain {
    weights: [f32; BRAIN_SIZE],
}

impl Default for Brain {
    fn default() -> Self {
        let placement = [9.0, -1.0, 1.0, 3.0, 1.5, -1.5, 0.5];
        let movement = [9.0, -2.0, 2.0, 2.0, 1.0, -1.0, 0.2];
        let flying = [12.0, 0.0, 0.5, 1.0, 2.0, -3.0, 0.0];
        let mut weights = [0.0; BRAIN_SIZE];
        for (slot, block) in [placement, movement, flying].iter().enumerate() {
            weights[slot * FEATURES_PER_PHASE..(slot + 1) * FEATURES_PER_PHASE].copy_from_slice(block);
        }
        Self { weights }
    }
}

impl Brain {
    pub fn from_array(weights: [f32; BRAIN_SIZE]) -> Self {
        Self { weights }
    }

    pub fn from_weights(weights: &[f32]) -> Result<Self> {
        let weights: [f32; BRAIN_SIZE] = weights.try_into().map_err(|_| Error::BrainSize {
            expected: BRAIN_SIZE,
            got: weights.len(),
        })?;
        Ok(Self { weights })
    }

    /// Every weight drawn uniformly from `[0, 10)`
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut weights = [0.0; BRAIN_SIZE];
        for w in weights.iter_mut() {
            *w = rng.gen_range(0.0..RANDOM_WEIGHT_MAX);
        }
        Self { weights }
    }

    pub fn as_array(&self) -> &[f32; BRAIN_SIZE] {
        &self.weights
    }

    pub fn weight(&self, slot: usize, feature: Feature) -> f32 {
        self.weights[slot * FEATURES_PER_PHASE + feature as usize]
    }
}

impl TryFrom<Vec<f32>> for Brain {
    type Error = Error;

    fn try_from(weights: Vec<f32>) -> Result<Self> {
        Brain::from_weights(&weights)
    }
}

impl From<Brain> for Vec<f32> {
    fn from(brain: Brain) -> Self {
        brain.weights.to_vec()
    }
}

// ============================================================================
// EVALUATOR
// ============================================================================

/// Scores positions for one side
#[derive(Clone, Debug)]
pub struct Evaluator {
    me: Player,
    brain: Brain,
}

impl Evaluator {
    pub fn new(me: Player, brain: Brain) -> Self {
        Self { me, brain }
    }

    pub fn me(&self) -> Player {
        self.me
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    pub fn set_brain(&mut self, brain: Brain) {
        self.brain = brain;
    }

    pub fn get_weights(&self) -> Vec<f32> {
        self.brain.weights.to_vec()
    }

    pub fn set_weights(&mut self, weights: &[f32]) -> Result<()> {
        self.brain = Brain::from_weights(weights)?;
        Ok(())
    }

    /// Static score of the position from this evaluator's side.
    ///
    /// Terminal phases and an empty board score 0; search handles wins and
    /// losses itself.
    pub fn evaluate(&self, rules: &Rules) -> f32 {
        let Some(slot) = phase_slot(rules.phase()) else {
            return 0.0;
        };
        let board = rules.board();
        if board.pieces_on_board(Player::White) == 0 && board.pieces_on_board(Player::Black) == 0 {
            return 0.0;
        }
        let features = self.features(board);
        Feature::ALL
            .iter()
            .map(|&f| self.brain.weight(slot, f) * features[f as usize])
            .sum()
    }

    /// Raw feature values, indexed by [`Feature`]
    pub fn features(&self, board: &Board) -> [f32; FEATURES_PER_PHASE] {
        let me = self.me;
        let them = me.opponent();
        let junctions = |player: Player| board.points_of(player).filter(|p| p.is_junction()).count() as f32;

        let mut values = [0.0; FEATURES_PER_PHASE];
        values[Feature::PieceDifference as usize] =
            board.pieces_on_board(me) as f32 - board.pieces_on_board(them) as f32;
        values[Feature::OwnBlocked as usize] = blocked_pieces(board, me) as f32;
        values[Feature::OpponentBlocked as usize] = blocked_pieces(board, them) as f32;
        values[Feature::MillDifference as usize] = board.count_mills(me) as f32 - board.count_mills(them) as f32;
        values[Feature::OwnOpenTwos as usize] = open_twos(board, me) as f32;
        values[Feature::OpponentOpenTwos as usize] = open_twos(board, them) as f32;
        values[Feature::JunctionDifference as usize] = junctions(me) - junctions(them);
        values
    }
}

fn blocked_pieces(board: &Board, player: Player) -> usize {
    board
        .points_of(player)
        .filter(|p| p.neighbors().iter().all(|&n| !board.is_empty(n)))
        .count()
}

/// Lines holding two of `player`'s pieces whose empty third point they can reach
fn open_twos(board: &Board, player: Player) -> usize {
    let free_movement = board.hand_count(player) > 0 || board.pieces_on_board(player) <= 3;
    topology()
        .mills()
        .iter()
        .filter(|line| {
            let own = line.iter().filter(|&&p| board.owner(p) == Some(player)).count();
            let gap: Vec<Point> = line.iter().copied().filter(|&p| board.is_empty(p)).collect();
            if own != 2 || gap.len() != 1 {
                return false;
            }
            free_movement
                || gap[0]
                    .neighbors()
                    .iter()
                    .any(|&n| !line.contains(&n) && board.owner(n) == Some(player))
        })
        .count()
}
