use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid coordinate. Cells use integer coordinates; wall segments use the
/// same type on the cell-corner lattice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: i32,
    pub y: i32,
}

impl Vector2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self { x: self.x + dx, y: self.y + dy }
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Compass direction in screen space (y grows southward). Serialized as
/// its initial, the form tile definitions use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "n")]
    North,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "w")]
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Turns clockwise by `quarter_turns` steps of 90 degrees.
    pub fn rotate_clockwise(self, quarter_turns: usize) -> Self {
        let index = match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        };
        Self::ALL[(index + quarter_turns) % 4]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    Void,
    Floor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BoundaryType {
    Open,
    Wall,
    Door,
}

/// Orientation of the wall a door sits in: a door between horizontal
/// neighbours lies on a vertical wall line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorOrientation {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorState {
    Open,
    #[default]
    Closed,
    Locked,
    Destroyed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MapGeneratorType {
    Procedural,
    Static,
    #[default]
    TreeShip,
    DenseShip,
}

impl MapGeneratorType {
    pub const GENERATIVE: [MapGeneratorType; 3] =
        [MapGeneratorType::TreeShip, MapGeneratorType::DenseShip, MapGeneratorType::Procedural];

    pub fn name(self) -> &'static str {
        match self {
            MapGeneratorType::Procedural => "Procedural",
            MapGeneratorType::Static => "Static",
            MapGeneratorType::TreeShip => "TreeShip",
            MapGeneratorType::DenseShip => "DenseShip",
        }
    }

    pub fn is_generative(self) -> bool {
        self != MapGeneratorType::Static
    }
}

impl fmt::Display for MapGeneratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown map generator type `{0}`")]
pub struct UnknownGeneratorType(pub String);

impl FromStr for MapGeneratorType {
    type Err = UnknownGeneratorType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        match normalized.to_ascii_lowercase().as_str() {
            "procedural" | "spaceship" => Ok(MapGeneratorType::Procedural),
            "static" => Ok(MapGeneratorType::Static),
            "treeship" | "tree" => Ok(MapGeneratorType::TreeShip),
            "denseship" | "dense" => Ok(MapGeneratorType::DenseShip),
            _ => Err(UnknownGeneratorType(value.to_string())),
        }
    }
}
