//! Fitness scoring for evolution
//!
//! Level 3 - Step-level implementation

use serde::{Deserialize, Serialize};

/// Game result from one player's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

/// Score a finished game for the learner.
///
/// Draws score 0; otherwise the on-board piece difference, negative for a loss.
pub fn score_game(outcome: Outcome, own_pieces: u8, opponent_pieces: u8) -> f32 {
    let margin = (own_pieces as f32 - opponent_pieces as f32).abs();
    match outcome {
        Outcome::Draw => 0.0,
        Outcome::Win => margin,
        Outcome::Loss => -margin,
    }
}

/// Aggregate over one generation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FitnessSummary {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub best: f32,
    pub mean: f32,
}

impl FitnessSummary {
    pub fn from_games(games: impl IntoIterator<Item = (Outcome, f32)>) -> Self {
        let mut summary = Self {
            best: f32::NEG_INFINITY,
            ..Self::default()
        };
        let mut total = 0.0;
        for (outcome, score) in games {
            match outcome {
                Outcome::Win => summary.wins += 1,
                Outcome::Draw => summary.draws += 1,
                Outcome::Loss => summary.losses += 1,
            }
            summary.best = summary.best.max(score);
            total += score;
        }
        let games = summary.total_games();
        if games == 0 {
            summary.best = 0.0;
        } else {
            summary.mean = total / games as f32;
        }
        summary
    }

    /// Total games played
    pub fn total_games(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    /// Score (wins + 0.5 * draws) over games
    pub fn normalized_score(&self) -> f32 {
        let total = self.total_games();
        if total == 0 {
            0.0
        } else {
            (self.wins as f32 + 0.5 * self.draws as f32) / total as f32
        }
    }
}
