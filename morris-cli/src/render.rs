//! Text rendering of board snapshots

use morris_core::{Player, Point, Snapshot};

const LAYOUT: &str = "\
7 @-----------@-----------@
  |           |           |
6 |   @-------@-------@   |
  |   |       |       |   |
5 |   |   @---@---@   |   |
  |   |   |       |   |   |
4 @---@---@       @---@---@
  |   |   |       |   |   |
3 |   |   @---@---@   |   |
  |   |       |       |   |
2 |   @-------@-------@   |
  |           |           |
1 @-----------@-----------@
  a   b   c   d   e   f   g";

/// Points in the order their `@` appears in [`LAYOUT`]
const LAYOUT_ORDER: [&str; 24] = [
    "a7", "d7", "g7", "b6", "d6", "f6", "c5", "d5", "e5", "a4", "b4", "c4",
    "e4", "f4", "g4", "c3", "d3", "e3", "b2", "d2", "f2", "a1", "d1", "g1",
];

fn symbol(snapshot: &Snapshot, name: &str) -> char {
    let Ok(point) = name.parse::<Point>() else {
        return '?';
    };
    let selected = snapshot.selected == Some(point);
    match (snapshot.cells[point.index()], selected) {
        (Some(Player::White), false) => 'W',
        (Some(Player::White), true) => 'w',
        (Some(Player::Black), false) => 'B',
        (Some(Player::Black), true) => 'b',
        (None, _) => '.',
    }
}

/// Board diagram followed by a status line
pub fn render(snapshot: &Snapshot) -> String {
    let mut order = LAYOUT_ORDER.iter();
    let mut out: String = LAYOUT
        .chars()
        .map(|c| match c {
            '@' => order.next().map_or('?', |name| symbol(snapshot, name)),
            other => other,
        })
        .collect();
    out.push_str(&format!(
        "\n{} to move ({:?}), in hand W:{} B:{}, ply {}",
        snapshot.turn, snapshot.phase, snapshot.in_hand[0], snapshot.in_hand[1], snapshot.ply
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use morris_core::{Board, Rules};

    #[test]
    fn test_empty_board() {
        let text = render(&Rules::new().snapshot());
        assert_eq!(text.matches('.').count(), 24);
        assert!(text.ends_with("white to move (Placement), in hand W:9 B:9, ply 0"));
    }

    #[test]
    fn test_pieces_and_selection() {
        let a1: Point = "a1".parse().unwrap();
        let g7: Point = "g7".parse().unwrap();
        let board = Board::setup(&[a1], &[g7], [8, 8], Player::White).unwrap();
        let mut snapshot = Rules::from_board(board).snapshot();
        let text = render(&snapshot);
        assert!(text.starts_with("7 .-----------.-----------B"));
        assert!(text.contains("1 W-----------.-----------."));

        snapshot.selected = Some(a1);
        assert!(render(&snapshot).contains("1 w---"));
    }
}
