//! Error type shared by the board, the rules and the evaluator

use crate::board::Player;
use crate::rules::Phase;
use crate::topology::Point;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // Illegal moves: rejected input, the board is left unchanged
    #[error("{0} is already occupied")]
    Occupied(Point),
    #[error("{0} is empty")]
    Vacant(Point),
    #[error("{from} is not adjacent to {to}")]
    NotAdjacent { from: Point, to: Point },
    #[error("{at} is not owned by {player}")]
    NotOwned { at: Point, player: Player },
    #[error("{0} holds one of the mover's own pieces")]
    OwnPiece(Point),
    #[error("{0} is protected by a closed mill")]
    ProtectedPiece(Point),
    #[error("capture given but the move closes no mill")]
    NoMillFormed,
    #[error("move closes a mill and must name a piece to capture")]
    CaptureRequired,
    #[error("move does not fit the {0:?} phase")]
    WrongPhase(Phase),
    #[error("the game is over")]
    GameOver,
    #[error("no piece selected")]
    NoSelection,
    #[error("it is not {0}'s turn")]
    OutOfTurn(Player),
    #[error("brain needs {expected} weights, got {got}")]
    BrainSize { expected: usize, got: usize },

    // Invariant violations: programming errors
    #[error("{0} has no pieces in hand")]
    EmptyHand(Player),
    #[error("{0} already holds every piece in hand")]
    HandFull(Player),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("undo token does not match the current board")]
    UndoMismatch,
}

impl Error {
    /// True for errors that can only come from a bug, never from bad input
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Error::EmptyHand(_) | Error::HandFull(_) | Error::NothingToUndo | Error::UndoMismatch
        )
    }
}
