//! Move representation and text notation
//!
//! Notation: `d1` (place), `a1-a4` (slide or fly), with an optional
//! `x<point>` suffix naming the captured piece, e.g. `a1-a4xg7`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::topology::{ParsePointError, Point};

/// What the mover does with their own piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Place(Point),
    Slide { from: Point, to: Point },
}

impl Action {
    /// Destination of the piece
    pub fn to(self) -> Point {
        match self {
            Action::Place(to) | Action::Slide { to, .. } => to,
        }
    }

    pub fn from(self) -> Option<Point> {
        match self {
            Action::Place(_) => None,
            Action::Slide { from, .. } => Some(from),
        }
    }
}

/// A complete move: an action plus the capture it earns, if any
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub action: Action,
    pub capture: Option<Point>,
}

impl Move {
    pub fn place(to: Point) -> Self {
        Self {
            action: Action::Place(to),
            capture: None,
        }
    }

    pub fn slide(from: Point, to: Point) -> Self {
        Self {
            action: Action::Slide { from, to },
            capture: None,
        }
    }

    pub fn capturing(self, target: Point) -> Self {
        Self {
            capture: Some(target),
            ..self
        }
    }

    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            Action::Place(to) => write!(f, "{}", to)?,
            Action::Slide { from, to } => write!(f, "{}-{}", from, to)?,
        }
        if let Some(target) = self.capture {
            write!(f, "x{}", target)?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = ParsePointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (body, capture) = match s.split_once(['x', 'X']) {
            Some((body, target)) => (body, Some(target.parse::<Point>()?)),
            None => (s, None),
        };
        let action = match body.split_once('-') {
            Some((from, to)) => Action::Slide {
                from: from.parse()?,
                to: to.parse()?,
            },
            None => Action::Place(body.parse()?),
        };
        Ok(Move { action, capture })
    }
}
