//! Rule enforcement: phases, legal move generation, apply/undo and game end
//!
//! [`Rules`] owns the single [`Board`] of a game. Search explores the tree by
//! applying a move, recursing and undoing it again, so every mutation here
//! has an exact inverse.

use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Player};
use crate::error::{Error, Result};
use crate::moves::{Action, Move};
use crate::topology::{topology, Point, NUM_POINTS};

/// A position reached this many times through committed moves is drawn
pub const REPETITION_LIMIT: u8 = 3;

/// Pieces below which the mover has lost
pub const MIN_PIECES: u8 = 3;

// ============================================================================
// PHASE AND RESULT
// ============================================================================

/// Game phase, from the point of view of the side to move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Placement,
    Movement,
    Flying,
    Loss,
    Draw,
}

impl Phase {
    pub fn is_over(self) -> bool {
        matches!(self, Phase::Loss | Phase::Draw)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    pub fn win_for(player: Player) -> Self {
        match player {
            Player::White => GameResult::WhiteWins,
            Player::Black => GameResult::BlackWins,
        }
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::WhiteWins => Some(Player::White),
            GameResult::BlackWins => Some(Player::Black),
            GameResult::Ongoing | GameResult::Draw => None,
        }
    }
}

/// Read-only view handed to renderers
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub cells: [Option<Player>; NUM_POINTS],
    pub turn: Player,
    pub phase: Phase,
    pub in_hand: [u8; 2],
    pub ply: u32,
    pub selected: Option<Point>,
}

// ============================================================================
// UNDO TOKENS
// ============================================================================

/// Proof that a move was applied; consumed by [`Rules::undo`]
#[must_use = "an applied move must be undone with Rules::undo"]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Undo {
    mv: Move,
    captured: Option<Player>,
    ply_after: u32,
    hash_after: u64,
}

impl Undo {
    pub fn applied_move(&self) -> Move {
        self.mv
    }
}

/// Scoped apply: the move is undone when the guard goes away.
///
/// Prefer [`MoveGuard::finish`], which reports undo failures; dropping the
/// guard undoes silently and only logs them.
pub struct MoveGuard<'a> {
    rules: &'a mut Rules,
    undo: Option<Undo>,
}

impl MoveGuard<'_> {
    pub fn finish(mut self) -> Result<()> {
        match self.undo.take() {
            Some(undo) => self.rules.undo(undo),
            None => Ok(()),
        }
    }
}

impl Deref for MoveGuard<'_> {
    type Target = Rules;

    fn deref(&self) -> &Rules {
        self.rules
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Rules {
        self.rules
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            if let Err(err) = self.rules.undo(undo) {
                tracing::error!(%err, mv = %undo.mv, "failed to undo move on scope exit");
                debug_assert!(std::thread::panicking(), "failed to undo {}: {}", undo.mv, err);
            }
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct Rules {
    board: Board,
    repetitions: FxHashMap<(Player, u64), u8>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary position with no history
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            repetitions: FxHashMap::default(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn reset(&mut self) {
        self.board = Board::new();
        self.repetitions.clear();
    }

    /// How often the current position was reached through committed moves
    pub fn repetitions(&self) -> u8 {
        let key = (self.board.turn(), self.board.hash());
        self.repetitions.get(&key).copied().unwrap_or(0)
    }

    pub fn phase(&self) -> Phase {
        let mover = self.board.turn();
        if self.repetitions() >= REPETITION_LIMIT {
            Phase::Draw
        } else if self.board.hand_count(mover) > 0 {
            Phase::Placement
        } else {
            match self.board.pieces_on_board(mover) {
                n if n < MIN_PIECES => Phase::Loss,
                MIN_PIECES => Phase::Flying,
                _ => Phase::Movement,
            }
        }
    }

    // ------------------------------------------------------------------------
    // Move generation
    // ------------------------------------------------------------------------

    /// Pieces of `victim` that may be captured right now.
    ///
    /// Pieces in closed mills are protected unless every piece is in one.
    pub fn capturable(&self, victim: Player) -> Vec<Point> {
        let pieces: Vec<Point> = self.board.points_of(victim).collect();
        let free: Vec<Point> = pieces.iter().copied().filter(|&p| !self.board.in_mill(p)).collect();
        if free.is_empty() {
            pieces
        } else {
            free
        }
    }

    /// Whether `player` moving a piece onto `to` (leaving `vacated`) closes a mill
    fn closes_mill(&self, to: Point, player: Player, vacated: Option<Point>) -> bool {
        let mills = topology().mills();
        to.mills().iter().any(|&m| {
            mills[m]
                .iter()
                .filter(|&&p| p != to)
                .all(|&p| Some(p) != vacated && self.board.owner(p) == Some(player))
        })
    }

    /// All legal moves for the side to move, capturing moves first
    pub fn legal_moves(&self) -> Vec<Move> {
        let mover = self.board.turn();
        let targets = self.capturable(mover.opponent());
        let mut captures = Vec::new();
        let mut quiet = Vec::new();
        let mut push = |action: Action, closes: bool| {
            if closes && !targets.is_empty() {
                captures.extend(targets.iter().map(|&t| Move {
                    action,
                    capture: Some(t),
                }));
            } else {
                quiet.push(Move { action, capture: None });
            }
        };

        match self.phase() {
            Phase::Placement => {
                for to in self.board.empty_points() {
                    push(Action::Place(to), self.closes_mill(to, mover, None));
                }
            }
            Phase::Movement => {
                for from in self.board.points_of(mover) {
                    for &to in from.neighbors().iter().filter(|&&to| self.board.is_empty(to)) {
                        push(Action::Slide { from, to }, self.closes_mill(to, mover, Some(from)));
                    }
                }
            }
            Phase::Flying => {
                for from in self.board.points_of(mover) {
                    for to in self.board.empty_points() {
                        push(Action::Slide { from, to }, self.closes_mill(to, mover, Some(from)));
                    }
                }
            }
            Phase::Loss | Phase::Draw => {}
        }

        captures.append(&mut quiet);
        captures
    }

    fn has_any_move(&self) -> bool {
        let mover = self.board.turn();
        match self.phase() {
            Phase::Placement | Phase::Flying => self.board.empty_points().next().is_some(),
            Phase::Movement => self
                .board
                .points_of(mover)
                .any(|from| from.neighbors().iter().any(|&to| self.board.is_empty(to))),
            Phase::Loss | Phase::Draw => false,
        }
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Check a move against every rule, naming the first one it breaks
    pub fn validate(&self, mv: &Move) -> Result<()> {
        let phase = self.phase();
        let mover = self.board.turn();
        match (phase, mv.action) {
            (Phase::Loss | Phase::Draw, _) => return Err(Error::GameOver),
            (Phase::Placement, Action::Place(_)) | (Phase::Movement | Phase::Flying, Action::Slide { .. }) => {}
            _ => return Err(Error::WrongPhase(phase)),
        }

        let to = mv.action.to();
        if !self.board.is_empty(to) {
            return Err(Error::Occupied(to));
        }
        let vacated = mv.action.from();
        if let Some(from) = vacated {
            if self.board.owner(from) != Some(mover) {
                return Err(Error::NotOwned { at: from, player: mover });
            }
            if phase == Phase::Movement && !from.is_adjacent(to) {
                return Err(Error::NotAdjacent { from, to });
            }
        }

        let closes = self.closes_mill(to, mover, vacated);
        let targets = self.capturable(mover.opponent());
        match mv.capture {
            Some(target) => {
                if !closes {
                    return Err(Error::NoMillFormed);
                }
                match self.board.owner(target) {
                    None => return Err(Error::Vacant(target)),
                    Some(owner) if owner == mover => return Err(Error::OwnPiece(target)),
                    Some(_) => {}
                }
                if !targets.contains(&target) {
                    return Err(Error::ProtectedPiece(target));
                }
            }
            None if closes && !targets.is_empty() => return Err(Error::CaptureRequired),
            None => {}
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Apply / undo
    // ------------------------------------------------------------------------

    /// Apply a move without full rule validation.
    ///
    /// Board-level checks still run, and a failure leaves the position
    /// unchanged. Moves from [`Rules::legal_moves`] always succeed.
    pub fn apply(&mut self, mv: Move) -> Result<Undo> {
        let mover = self.board.turn();
        if let Some(target) = mv.capture {
            match self.board.owner(target) {
                None => return Err(Error::Vacant(target)),
                Some(owner) if owner == mover => return Err(Error::OwnPiece(target)),
                Some(_) => {}
            }
        }

        match mv.action {
            Action::Place(to) => self.board.place(to, mover)?,
            Action::Slide { from, to } => {
                let flying = self.board.hand_count(mover) == 0 && self.board.pieces_on_board(mover) == MIN_PIECES;
                self.board.move_piece(from, to, flying)?;
            }
        }
        let captured = match mv.capture {
            Some(target) => Some(self.board.remove(target)?),
            None => None,
        };
        self.board.toggle_turn();

        Ok(Undo {
            mv,
            captured,
            ply_after: self.board.ply(),
            hash_after: self.board.hash(),
        })
    }

    /// Revert the move recorded in `undo`; it must be the last one applied
    pub fn undo(&mut self, undo: Undo) -> Result<()> {
        if self.board.ply() != undo.ply_after || self.board.hash() != undo.hash_after {
            return Err(Error::UndoMismatch);
        }
        self.board.reverse_turn()?;
        match undo.mv.action {
            Action::Place(to) => {
                self.board.return_to_hand(to)?;
            }
            Action::Slide { from, to } => self.board.move_piece(to, from, true)?,
        }
        if let (Some(target), Some(owner)) = (undo.mv.capture, undo.captured) {
            self.board.restore(target, owner)?;
        }
        Ok(())
    }

    /// Apply `mv` for the lifetime of the returned guard
    pub fn try_move(&mut self, mv: Move) -> Result<MoveGuard<'_>> {
        let undo = self.apply(mv)?;
        Ok(MoveGuard {
            rules: self,
            undo: Some(undo),
        })
    }

    /// Play a validated move for real and record the resulting position
    pub fn commit(&mut self, mv: Move) -> Result<()> {
        self.validate(&mv)?;
        let undo = self.apply(mv)?;
        let key = (self.board.turn(), self.board.hash());
        let seen = self.repetitions.entry(key).or_insert(0);
        *seen += 1;
        tracing::debug!(mv = %undo.applied_move(), ply = self.board.ply(), repetitions = *seen, "committed move");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Game end
    // ------------------------------------------------------------------------

    pub fn result(&self) -> GameResult {
        let loser = self.board.turn();
        match self.phase() {
            Phase::Draw => GameResult::Draw,
            Phase::Loss => GameResult::win_for(loser.opponent()),
            Phase::Placement | Phase::Movement | Phase::Flying => {
                if self.has_any_move() {
                    GameResult::Ongoing
                } else {
                    GameResult::win_for(loser.opponent())
                }
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.result() != GameResult::Ongoing
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cells: *self.board.cells(),
            turn: self.board.turn(),
            phase: self.phase(),
            in_hand: [
                self.board.hand_count(Player::White),
                self.board.hand_count(Player::Black),
            ],
            ply: self.board.ply(),
            selected: None,
        }
    }
}
