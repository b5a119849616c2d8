use thiserror::Error;

use crate::types::MapGeneratorType;

/// Failures surfaced by floor-plan generation.
///
/// Ordinary layout hiccups are retried internally and never reach callers;
/// these variants mean the request itself cannot be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("map dimensions {width}x{height} are below the {minimum}x{minimum} minimum")]
    InvalidDimensions { width: usize, height: usize, minimum: usize },

    #[error("{kind} generation gave up after {attempts} layout attempts on a {width}x{height} map")]
    RetriesExhausted { kind: MapGeneratorType, width: usize, height: usize, attempts: usize },

    #[error("static maps are loaded from a supplied layout, not generated")]
    StaticRequiresLayout,
}

/// Reasons an ASCII floor plan cannot be read back into a map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsciiMapError {
    #[error("ASCII map needs at least 3 rows and 3 columns")]
    TooSmall,

    #[error("ASCII map row {row} is {found} characters wide, expected {expected}")]
    RaggedRow { row: usize, found: usize, expected: usize },
}

/// Reasons a tile assembly cannot be stitched into a map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("tile assembly places no tiles")]
    Empty,

    #[error("tile {index} refers to unknown tile definition {tile_id:?}")]
    UnknownTile { index: usize, tile_id: String },

    #[error("tile door {door_id} refers to tile {tile_index}, but only {placed} tiles are placed")]
    UnknownTileIndex { door_id: String, tile_index: usize, placed: usize },

    #[error("tile door {door_id} refers to socket {socket_index} of {tile_id:?}, which has {sockets}")]
    UnknownSocket { door_id: String, tile_id: String, socket_index: usize, sockets: usize },

    #[error("tile rotation must be 0, 90, 180 or 270 degrees, got {0}")]
    InvalidRotation(u16),
}
