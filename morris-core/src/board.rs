//! Board state: point ownership, hands, turn and an incremental Zobrist hash

use std::fmt;
use std::sync::OnceLock;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::topology::{topology, Point, NUM_POINTS};

/// Pieces each player starts with in hand
pub const PIECES_PER_PLAYER: u8 = 9;

/// Player identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    White = 0,
    Black = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => f.write_str("white"),
            Player::Black => f.write_str("black"),
        }
    }
}

// ============================================================================
// ZOBRIST KEYS
// ============================================================================

const ZOBRIST_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

struct ZobristKeys {
    cells: [[u64; 2]; NUM_POINTS],
    hand: [[u64; PIECES_PER_PLAYER as usize + 1]; 2],
    black_to_move: u64,
}

static ZOBRIST: OnceLock<ZobristKeys> = OnceLock::new();

fn zobrist() -> &'static ZobristKeys {
    ZOBRIST.get_or_init(|| {
        let mut rng = ChaCha8Rng::seed_from_u64(ZOBRIST_SEED);
        let mut keys = ZobristKeys {
            cells: [[0; 2]; NUM_POINTS],
            hand: [[0; PIECES_PER_PLAYER as usize + 1]; 2],
            black_to_move: 0,
        };
        for cell in keys.cells.iter_mut() {
            cell[0] = rng.gen();
            cell[1] = rng.gen();
        }
        for side in keys.hand.iter_mut() {
            for key in side.iter_mut() {
                *key = rng.gen();
            }
        }
        keys.black_to_move = rng.gen();
        keys
    })
}

// ============================================================================
// BOARD
// ============================================================================

/// Complete game position.
///
/// Every mutation keeps `hash` in sync, so [`Board::hash`] is a field read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Player>; NUM_POINTS],
    in_hand: [u8; 2],
    on_board: [u8; 2],
    turn: Player,
    ply: u32,
    hash: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty board, nine pieces in each hand, white to move
    pub fn new() -> Self {
        let keys = zobrist();
        let full = PIECES_PER_PLAYER as usize;
        Self {
            cells: [None; NUM_POINTS],
            in_hand: [PIECES_PER_PLAYER; 2],
            on_board: [0; 2],
            turn: Player::White,
            ply: 0,
            hash: keys.hand[0][full] ^ keys.hand[1][full],
        }
    }

    /// Build an arbitrary position, e.g. for tests or puzzles.
    ///
    /// `in_hand` is taken as given; pieces on board plus in hand may not exceed
    /// the nine each player owns.
    pub fn setup(white: &[Point], black: &[Point], in_hand: [u8; 2], turn: Player) -> Result<Self> {
        let mut board = Self::new();
        for (player, points) in [(Player::White, white), (Player::Black, black)] {
            if points.len() + in_hand[player.index()] as usize > PIECES_PER_PLAYER as usize {
                return Err(Error::HandFull(player));
            }
            for &p in points {
                if !board.is_empty(p) {
                    return Err(Error::Occupied(p));
                }
                board.put(p, player);
            }
            board.set_hand(player, in_hand[player.index()]);
        }
        if turn != board.turn {
            board.turn = turn;
            board.hash ^= zobrist().black_to_move;
        }
        Ok(board)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    #[inline]
    pub fn owner(&self, at: Point) -> Option<Player> {
        self.cells[at.index()]
    }

    #[inline]
    pub fn is_empty(&self, at: Point) -> bool {
        self.cells[at.index()].is_none()
    }

    #[inline]
    pub fn turn(&self) -> Player {
        self.turn
    }

    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[inline]
    pub fn hand_count(&self, player: Player) -> u8 {
        self.in_hand[player.index()]
    }

    #[inline]
    pub fn pieces_on_board(&self, player: Player) -> u8 {
        self.on_board[player.index()]
    }

    /// Zobrist hash of (turn, owners, hand counts); ply is not part of it
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn cells(&self) -> &[Option<Player>; NUM_POINTS] {
        &self.cells
    }

    pub fn points_of(&self, player: Player) -> impl Iterator<Item = Point> + '_ {
        Point::all().filter(move |&p| self.owner(p) == Some(player))
    }

    pub fn empty_points(&self) -> impl Iterator<Item = Point> + '_ {
        Point::all().filter(move |&p| self.is_empty(p))
    }

    /// Whether the piece on `at` is part of a closed mill of its owner
    pub fn in_mill(&self, at: Point) -> bool {
        let Some(owner) = self.owner(at) else {
            return false;
        };
        let mills = topology().mills();
        at.mills()
            .iter()
            .any(|&m| mills[m].iter().all(|&p| self.owner(p) == Some(owner)))
    }

    pub fn count_mills(&self, player: Player) -> usize {
        topology()
            .mills()
            .iter()
            .filter(|line| line.iter().all(|&p| self.owner(p) == Some(player)))
            .count()
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Place a piece from `player`'s hand
    pub fn place(&mut self, at: Point, player: Player) -> Result<()> {
        if !self.is_empty(at) {
            return Err(Error::Occupied(at));
        }
        let hand = self.hand_count(player);
        if hand == 0 {
            return Err(Error::EmptyHand(player));
        }
        self.set_hand(player, hand - 1);
        self.put(at, player);
        Ok(())
    }

    /// Take a piece off the board without returning it to a hand
    pub fn remove(&mut self, at: Point) -> Result<Player> {
        self.take(at).ok_or(Error::Vacant(at))
    }

    /// Move one of the mover's pieces
    pub fn move_piece(&mut self, from: Point, to: Point, flying: bool) -> Result<()> {
        if !self.is_empty(to) {
            return Err(Error::Occupied(to));
        }
        if self.owner(from) != Some(self.turn) {
            return Err(Error::NotOwned {
                at: from,
                player: self.turn,
            });
        }
        if !flying && !from.is_adjacent(to) {
            return Err(Error::NotAdjacent { from, to });
        }
        self.take(from);
        self.put(to, self.turn);
        Ok(())
    }

    pub fn toggle_turn(&mut self) {
        self.turn = self.turn.opponent();
        self.ply += 1;
        self.hash ^= zobrist().black_to_move;
    }

    pub fn reverse_turn(&mut self) -> Result<()> {
        self.ply = self.ply.checked_sub(1).ok_or(Error::NothingToUndo)?;
        self.turn = self.turn.opponent();
        self.hash ^= zobrist().black_to_move;
        Ok(())
    }

    /// Inverse of [`Board::place`]: lift the piece back into its owner's hand
    pub(crate) fn return_to_hand(&mut self, at: Point) -> Result<Player> {
        let owner = self.owner(at).ok_or(Error::Vacant(at))?;
        let hand = self.hand_count(owner);
        if hand >= PIECES_PER_PLAYER {
            return Err(Error::HandFull(owner));
        }
        self.take(at);
        self.set_hand(owner, hand + 1);
        Ok(owner)
    }

    /// Inverse of [`Board::remove`]: put a captured piece back, hand untouched
    pub(crate) fn restore(&mut self, at: Point, player: Player) -> Result<()> {
        if !self.is_empty(at) {
            return Err(Error::Occupied(at));
        }
        self.put(at, player);
        Ok(())
    }

    fn put(&mut self, at: Point, player: Player) {
        self.cells[at.index()] = Some(player);
        self.on_board[player.index()] += 1;
        self.hash ^= zobrist().cells[at.index()][player.index()];
    }

    fn take(&mut self, at: Point) -> Option<Player> {
        let owner = self.cells[at.index()].take()?;
        self.on_board[owner.index()] -= 1;
        self.hash ^= zobrist().cells[at.index()][owner.index()];
        Some(owner)
    }

    fn set_hand(&mut self, player: Player, count: u8) {
        let keys = &zobrist().hand[player.index()];
        let old = self.in_hand[player.index()];
        self.hash ^= keys[old as usize] ^ keys[count as usize];
        self.in_hand[player.index()] = count;
    }
}
