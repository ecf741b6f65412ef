//! Turning one-point-at-a-time user input into legal moves
//!
//! A board UI reports single points. [`TurnBuilder`] interprets each one as
//! an [`Intent`] and commits a move once the intents add up to one.

use crate::error::{Error, Result};
use crate::moves::{Action, Move};
use crate::rules::{Phase, Rules, Snapshot};
use crate::topology::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Place(Point),
    Select(Point),
    MoveTo(Point),
    Delete(Point),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// More input needed
    Pending,
    /// The move was committed
    Ready(Move),
}

#[derive(Clone, Debug, Default)]
pub struct TurnBuilder {
    selected: Option<Point>,
    awaiting_capture: Option<Action>,
}

impl TurnBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Point> {
        self.selected
    }

    pub fn awaiting_capture(&self) -> bool {
        self.awaiting_capture.is_some()
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.awaiting_capture = None;
    }

    /// Snapshot with the current selection filled in
    pub fn snapshot(&self, rules: &Rules) -> Snapshot {
        Snapshot {
            selected: self.selected,
            ..rules.snapshot()
        }
    }

    /// What a click on `at` means in the current state
    pub fn interpret(&self, rules: &Rules, at: Point) -> Intent {
        if self.awaiting_capture.is_some() {
            return Intent::Delete(at);
        }
        if rules.phase() == Phase::Placement {
            return Intent::Place(at);
        }
        match (rules.board().owner(at), self.selected) {
            (Some(owner), _) if owner == rules.board().turn() => Intent::Select(at),
            (None, Some(_)) => Intent::MoveTo(at),
            _ => Intent::Select(at),
        }
    }

    /// Feed one intent; commits to `rules` once a full move is known.
    ///
    /// On error nothing is committed and the builder keeps its state.
    pub fn submit(&mut self, rules: &mut Rules, intent: Intent) -> Result<Progress> {
        match intent {
            Intent::Delete(target) => {
                let action = self.awaiting_capture.ok_or(Error::NoMillFormed)?;
                let mv = Move {
                    action,
                    capture: Some(target),
                };
                rules.commit(mv)?;
                self.clear();
                Ok(Progress::Ready(mv))
            }
            Intent::Place(to) => self.finish_action(rules, Action::Place(to)),
            Intent::Select(at) => {
                let phase = rules.phase();
                if !matches!(phase, Phase::Movement | Phase::Flying) {
                    return Err(Error::WrongPhase(phase));
                }
                let mover = rules.board().turn();
                if rules.board().owner(at) != Some(mover) {
                    return Err(Error::NotOwned { at, player: mover });
                }
                self.selected = if self.selected == Some(at) { None } else { Some(at) };
                Ok(Progress::Pending)
            }
            Intent::MoveTo(to) => {
                let from = self.selected.ok_or(Error::NoSelection)?;
                self.finish_action(rules, Action::Slide { from, to })
            }
        }
    }

    fn finish_action(&mut self, rules: &mut Rules, action: Action) -> Result<Progress> {
        let mv = Move { action, capture: None };
        match rules.validate(&mv) {
            Ok(()) => {
                rules.commit(mv)?;
                self.clear();
                Ok(Progress::Ready(mv))
            }
            Err(Error::CaptureRequired) => {
                self.awaiting_capture = Some(action);
                Ok(Progress::Pending)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Player};

    fn pt(name: &str) -> Point {
        name.parse().unwrap()
    }

    #[test]
    fn test_placement_clicks() {
        let mut rules = Rules::new();
        let mut builder = TurnBuilder::new();
        let intent = builder.interpret(&rules, pt("d2"));
        assert_eq!(intent, Intent::Place(pt("d2")));
        assert_eq!(builder.submit(&mut rules, intent), Ok(Progress::Ready(Move::place(pt("d2")))));
        assert_eq!(rules.board().turn(), Player::Black);

        let again = builder.interpret(&rules, pt("d2"));
        assert_eq!(builder.submit(&mut rules, again), Err(Error::Occupied(pt("d2"))));
    }

    #[test]
    fn test_mill_waits_for_delete() {
        let board = Board::setup(&[pt("a1"), pt("a4")], &[pt("g7"), pt("d6")], [7, 7], Player::White).unwrap();
        let mut rules = Rules::from_board(board);
        let mut builder = TurnBuilder::new();

        let place = builder.interpret(&rules, pt("a7"));
        assert_eq!(builder.submit(&mut rules, place), Ok(Progress::Pending));
        assert!(builder.awaiting_capture());
        assert_eq!(rules.board().ply(), 0);

        let own = builder.interpret(&rules, pt("a1"));
        assert_eq!(own, Intent::Delete(pt("a1")));
        assert_eq!(builder.submit(&mut rules, own), Err(Error::OwnPiece(pt("a1"))));
        assert!(builder.awaiting_capture());

        let delete = builder.interpret(&rules, pt("g7"));
        let expected = Move::place(pt("a7")).capturing(pt("g7"));
        assert_eq!(builder.submit(&mut rules, delete), Ok(Progress::Ready(expected)));
        assert!(rules.board().is_empty(pt("g7")));
        assert!(!builder.awaiting_capture());
    }

    #[test]
    fn test_select_then_move() {
        let board = Board::setup(
            &[pt("a1"), pt("d2"), pt("f4"), pt("g7")],
            &[pt("a4"), pt("d1"), pt("b6"), pt("e5")],
            [0, 0],
            Player::White,
        )
        .unwrap();
        let mut rules = Rules::from_board(board);
        let mut builder = TurnBuilder::new();

        assert_eq!(builder.interpret(&rules, pt("d3")), Intent::Select(pt("d3")));
        assert_eq!(builder.submit(&mut rules, Intent::MoveTo(pt("d3"))), Err(Error::NoSelection));

        let select = builder.interpret(&rules, pt("d2"));
        assert_eq!(builder.submit(&mut rules, select), Ok(Progress::Pending));
        assert_eq!(builder.snapshot(&rules).selected, Some(pt("d2")));

        let far = builder.interpret(&rules, pt("c3"));
        assert_eq!(far, Intent::MoveTo(pt("c3")));
        assert!(matches!(builder.submit(&mut rules, far), Err(Error::NotAdjacent { .. })));

        let step = builder.interpret(&rules, pt("d3"));
        assert_eq!(builder.submit(&mut rules, step), Ok(Progress::Ready(Move::slide(pt("d2"), pt("d3")))));
        assert_eq!(builder.selected(), None);
    }
}
