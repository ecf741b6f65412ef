//! Board geometry: the 24 points, their connections and the mill lines

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Number of points on the board
pub const NUM_POINTS: usize = 24;

/// Point names in index order, sorted by (file, rank)
const NAMES: [&str; NUM_POINTS] = [
    "a1", "a4", "a7", "b2", "b4", "b6", "c3", "c4", "c5", "d1", "d2", "d3",
    "d5", "d6", "d7", "e3", "e4", "e5", "f2", "f4", "f6", "g1", "g4", "g7",
];

/// Undirected edges of the board graph, by point index
pub const CONNECTIONS: [(u8, u8); 32] = [
    (0, 1), (0, 9), (1, 2), (1, 4), (2, 14), (3, 4), (3, 10), (4, 5),
    (4, 7), (5, 13), (6, 7), (6, 11), (7, 8), (8, 12), (9, 10), (9, 21),
    (10, 11), (10, 18), (11, 15), (12, 13), (12, 17), (13, 14), (13, 20), (14, 23),
    (15, 16), (16, 17), (16, 19), (18, 19), (19, 20), (19, 22), (21, 22), (22, 23),
];

/// A board intersection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Point(u8);

impl Point {
    /// Panics on an out-of-range index; use [`Point::from_index`] for untrusted input.
    pub const fn new(index: u8) -> Self {
        assert!((index as usize) < NUM_POINTS, "point index out of range");
        Self(index)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < NUM_POINTS).then(|| Self(index as u8))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All points in index order
    pub fn all() -> impl Iterator<Item = Point> {
        (0..NUM_POINTS as u8).map(Point)
    }

    pub fn name(self) -> &'static str {
        NAMES[self.index()]
    }

    /// (file, rank), both in 0..7
    pub fn coords(self) -> (u8, u8) {
        let bytes = self.name().as_bytes();
        (bytes[0] - b'a', bytes[1] - b'1')
    }

    pub fn neighbors(self) -> &'static [Point] {
        &topology().neighbors[self.index()]
    }

    #[inline]
    pub fn is_adjacent(self, other: Point) -> bool {
        topology().adjacency[self.index()] & (1 << other.0) != 0
    }

    /// Indices into [`Topology::mills`] of the two lines through this point
    pub fn mills(self) -> &'static [usize] {
        &topology().mills_through[self.index()]
    }

    /// Junction points are the four points with four neighbours
    pub fn is_junction(self) -> bool {
        self.neighbors().len() == 4
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a point name can't be parsed
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown point `{0}`")]
pub struct ParsePointError(pub String);

impl FromStr for Point {
    type Err = ParsePointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        NAMES
            .iter()
            .position(|&name| name == lower)
            .map(|i| Point(i as u8))
            .ok_or_else(|| ParsePointError(s.to_string()))
    }
}

impl TryFrom<String> for Point {
    type Error = ParsePointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Point> for String {
    fn from(point: Point) -> Self {
        point.name().to_string()
    }
}

// ============================================================================
// PRECOMPUTED TOPOLOGY
// ============================================================================

/// Static connection data, built once per process
#[derive(Debug)]
pub struct Topology {
    neighbors: Vec<Vec<Point>>,
    adjacency: [u32; NUM_POINTS],
    mills: Vec<[Point; 3]>,
    mills_through: Vec<Vec<usize>>,
}

static TOPOLOGY: OnceLock<Topology> = OnceLock::new();

/// The shared board topology
pub fn topology() -> &'static Topology {
    TOPOLOGY.get_or_init(Topology::build)
}

impl Topology {
    fn build() -> Self {
        let mut neighbors = vec![Vec::new(); NUM_POINTS];
        let mut adjacency = [0u32; NUM_POINTS];
        for &(a, b) in CONNECTIONS.iter() {
            neighbors[a as usize].push(Point(b));
            neighbors[b as usize].push(Point(a));
            adjacency[a as usize] |= 1 << b;
            adjacency[b as usize] |= 1 << a;
        }
        for list in neighbors.iter_mut() {
            list.sort();
        }

        // A mill line is three points on one file or rank joined by two edges
        let connected = |a: Point, b: Point| adjacency[a.index()] & (1 << b.0) != 0;
        let mut mills = Vec::new();
        for a in Point::all() {
            for b in Point::all().filter(|&b| b > a) {
                for c in Point::all().filter(|&c| c > b) {
                    let (fa, ra) = a.coords();
                    let (fb, rb) = b.coords();
                    let (fc, rc) = c.coords();
                    let straight = (fa == fb && fb == fc) || (ra == rb && rb == rc);
                    let chained = (connected(a, b) && connected(b, c))
                        || (connected(a, c) && connected(c, b))
                        || (connected(b, a) && connected(a, c));
                    if straight && chained {
                        mills.push([a, b, c]);
                    }
                }
            }
        }

        let mut mills_through = vec![Vec::new(); NUM_POINTS];
        for (i, line) in mills.iter().enumerate() {
            for p in line {
                mills_through[p.index()].push(i);
            }
        }

        Self {
            neighbors,
            adjacency,
            mills,
            mills_through,
        }
    }

    pub fn mills(&self) -> &[[Point; 3]] {
        &self.mills
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }
}
