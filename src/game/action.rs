use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

/// Absolute heading of the snake on the grid
///
/// `Up` points toward increasing `y`, `Right` toward increasing `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Down, Heading::Left, Heading::Right];

    /// Returns the heading pointing the other way
    pub fn opposite(self) -> Heading {
        match self {
            Heading::Up => Heading::Down,
            Heading::Down => Heading::Up,
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(self, other: Heading) -> bool {
        self.opposite() == other
    }

    /// Returns the delta (dx, dy) for moving one cell in this heading
    pub fn delta(self) -> (i32, i32) {
        match self {
            Heading::Up => (0, 1),
            Heading::Down => (0, -1),
            Heading::Left => (-1, 0),
            Heading::Right => (1, 0),
        }
    }

    /// Bearing of this heading in radians, counter-clockwise from `Right`
    pub fn angle(self) -> f32 {
        match self {
            Heading::Right => 0.0,
            Heading::Up => FRAC_PI_2,
            Heading::Left => PI,
            Heading::Down => -FRAC_PI_2,
        }
    }

    /// Absolute heading reached by taking a relative move from this heading
    pub fn turn(self, relative: RelativeDirection) -> Heading {
        match (self, relative) {
            (heading, RelativeDirection::Front) => heading,
            (Heading::Up, RelativeDirection::Left) => Heading::Left,
            (Heading::Up, RelativeDirection::Right) => Heading::Right,
            (Heading::Down, RelativeDirection::Left) => Heading::Right,
            (Heading::Down, RelativeDirection::Right) => Heading::Left,
            (Heading::Left, RelativeDirection::Left) => Heading::Down,
            (Heading::Left, RelativeDirection::Right) => Heading::Up,
            (Heading::Right, RelativeDirection::Left) => Heading::Up,
            (Heading::Right, RelativeDirection::Right) => Heading::Down,
        }
    }

    /// Relative move that leads from this heading to `target`
    ///
    /// Returns `None` for the opposite heading, which no single move reaches.
    pub fn relative_to(self, target: Heading) -> Option<RelativeDirection> {
        RelativeDirection::ALL
            .into_iter()
            .find(|&relative| self.turn(relative) == target)
    }
}

/// Move relative to the current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelativeDirection {
    Left,
    Front,
    Right,
}

impl RelativeDirection {
    pub const ALL: [RelativeDirection; 3] = [
        RelativeDirection::Front,
        RelativeDirection::Left,
        RelativeDirection::Right,
    ];

    /// Feature encoding: -1 for left, 0 for front, 1 for right
    pub fn code(self) -> i8 {
        match self {
            RelativeDirection::Left => -1,
            RelativeDirection::Front => 0,
            RelativeDirection::Right => 1,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(RelativeDirection::Left),
            0 => Some(RelativeDirection::Front),
            1 => Some(RelativeDirection::Right),
            _ => None,
        }
    }
}
