//! Hand-authored maps stitched together from reusable tiles.
//!
//! A [`TileAssembly`] places tile definitions on an unbounded grid, each
//! turned by a multiple of 90 degrees. [`assemble`] shifts the placement
//! into its bounding box and emits a raw layout: one Floor cell per tile
//! cell, a wall on every edge no tile declares open, plus the doors and
//! entities the assembly lists. Loading goes through
//! [`MapGenerator::assemble`](super::MapGenerator::assemble) so the result
//! is sanitized like any other static map.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::AssemblyError;
use crate::types::{Direction, DoorOrientation, Vector2};

use super::grid::{EdgeTable, cell_at_index, cell_index, in_bounds};
use super::model::{
    Cell, Door, MapDefinition, ObjectiveDefinition, ObjectiveKind, SpawnPoint, WallDefinition,
};
use super::spawns::SPAWN_RADIUS;

/// Tile definitions keyed by id.
pub type TileLibrary = BTreeMap<String, TileDefinition>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileCell {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub open_edges: Vec<Direction>,
}

/// A spot on a tile's border where an assembly may hang a door.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDoorSocket {
    pub x: i32,
    pub y: i32,
    pub edge: Direction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileDefinition {
    pub id: String,
    pub width: usize,
    pub height: usize,
    pub cells: Vec<TileCell>,
    #[serde(default)]
    pub door_sockets: Vec<TileDoorSocket>,
}

impl TileDefinition {
    /// A single-cell corridor open on the given sides.
    pub fn corridor(id: impl Into<String>, open_edges: &[Direction]) -> Self {
        Self {
            id: id.into(),
            width: 1,
            height: 1,
            cells: vec![TileCell { x: 0, y: 0, open_edges: open_edges.to_vec() }],
            door_sockets: Vec::new(),
        }
    }

    /// A room with every interior edge open and one opening, doubling as a
    /// door socket, in the middle of each side. Sockets are listed north,
    /// east, south, west.
    pub fn room(id: impl Into<String>, width: usize, height: usize) -> Self {
        let (w, h) = (width as i32, height as i32);
        let door_sockets = vec![
            TileDoorSocket { x: w / 2, y: 0, edge: Direction::North },
            TileDoorSocket { x: w - 1, y: h / 2, edge: Direction::East },
            TileDoorSocket { x: w / 2, y: h - 1, edge: Direction::South },
            TileDoorSocket { x: 0, y: h / 2, edge: Direction::West },
        ];
        let cells = (0..h)
            .flat_map(|y| (0..w).map(move |x| Vector2::new(x, y)))
            .map(|pos| {
                let open_edges = Direction::ALL
                    .into_iter()
                    .filter(|&edge| {
                        in_bounds(width, height, pos.offset(edge))
                            || door_sockets.iter().any(|socket| {
                                socket.edge == edge && Vector2::new(socket.x, socket.y) == pos
                            })
                    })
                    .collect();
                TileCell { x: pos.x, y: pos.y, open_edges }
            })
            .collect();
        Self { id: id.into(), width, height, cells, door_sockets }
    }

    /// Tiles whose id mentions `room` become rooms; the rest are corridors.
    fn label(&self, index: usize) -> String {
        let kind = if self.id.contains("room") { "room" } else { "corridor" };
        format!("{kind}-tile-{index}-{}", self.id)
    }
}

/// The built-in tile set.
pub fn standard_tiles() -> TileLibrary {
    use Direction::{East, North, South, West};

    [
        TileDefinition::corridor("corridor_1x1", &[North, South]),
        TileDefinition::corridor("corridor_corner", &[North, East]),
        TileDefinition::corridor("corridor_junction", &[North, East, South, West]),
        TileDefinition::room("room_3x3", 3, 3),
        TileDefinition::room("room_5x3", 5, 3),
    ]
    .into_iter()
    .map(|tile| (tile.id.clone(), tile))
    .collect()
}

/// Clockwise turn applied to a placed tile. Serialized in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum TileRotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl TileRotation {
    pub const ALL: [TileRotation; 4] =
        [TileRotation::Deg0, TileRotation::Deg90, TileRotation::Deg180, TileRotation::Deg270];

    pub fn quarter_turns(self) -> usize {
        match self {
            TileRotation::Deg0 => 0,
            TileRotation::Deg90 => 1,
            TileRotation::Deg180 => 2,
            TileRotation::Deg270 => 3,
        }
    }

    /// Footprint of a `width x height` tile after turning.
    pub fn size(self, width: usize, height: usize) -> (usize, usize) {
        if self.quarter_turns() % 2 == 1 { (height, width) } else { (width, height) }
    }

    /// Where a tile-local cell of a `width x height` tile lands inside the
    /// turned footprint.
    pub fn apply(self, pos: Vector2, width: usize, height: usize) -> Vector2 {
        let (w, h) = (width as i32, height as i32);
        match self {
            TileRotation::Deg0 => pos,
            TileRotation::Deg90 => Vector2::new(h - 1 - pos.y, pos.x),
            TileRotation::Deg180 => Vector2::new(w - 1 - pos.x, h - 1 - pos.y),
            TileRotation::Deg270 => Vector2::new(pos.y, w - 1 - pos.x),
        }
    }
}

impl TryFrom<u16> for TileRotation {
    type Error = AssemblyError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(TileRotation::Deg0),
            90 => Ok(TileRotation::Deg90),
            180 => Ok(TileRotation::Deg180),
            270 => Ok(TileRotation::Deg270),
            other => Err(AssemblyError::InvalidRotation(other)),
        }
    }
}

impl From<TileRotation> for u16 {
    fn from(rotation: TileRotation) -> Self {
        rotation.quarter_turns() as u16 * 90
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileReference {
    pub tile_id: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub rotation: TileRotation,
}

/// A door hung on one of a placed tile's sockets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileDoor {
    pub id: String,
    pub tile_index: usize,
    pub socket_index: usize,
}

/// A door given in assembly coordinates. A vertical door sits on the west
/// edge of `cell`, a horizontal one on its north edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedDoor {
    pub id: String,
    pub cell: Vector2,
    pub orientation: DoorOrientation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedSpawn {
    pub id: String,
    pub cell: Vector2,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedObjective {
    pub id: String,
    pub kind: ObjectiveKind,
    pub cell: Vector2,
}

/// Tiles plus the doors and entities placed on them. Every position is in
/// assembly coordinates, which may be negative.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TileAssembly {
    pub tiles: Vec<TileReference>,
    pub tile_doors: Vec<TileDoor>,
    pub doors: Vec<PlacedDoor>,
    pub spawn_points: Vec<PlacedSpawn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squad_spawn: Option<Vector2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<Vector2>,
    pub objectives: Vec<PlacedObjective>,
}

struct Placement<'a> {
    tile: &'a TileDefinition,
    reference: &'a TileReference,
}

impl Placement<'_> {
    fn footprint(&self) -> (Vector2, Vector2) {
        let (w, h) = self.reference.rotation.size(self.tile.width, self.tile.height);
        let origin = Vector2::new(self.reference.x, self.reference.y);
        (origin, Vector2::new(origin.x + w as i32, origin.y + h as i32))
    }

    /// Assembly position of a tile-local cell.
    fn place(&self, local: Vector2) -> Vector2 {
        let turned = self.reference.rotation.apply(local, self.tile.width, self.tile.height);
        Vector2::new(self.reference.x + turned.x, self.reference.y + turned.y)
    }

    fn turn(&self, edge: Direction) -> Direction {
        edge.rotate_clockwise(self.reference.rotation.quarter_turns())
    }
}

/// Bounding box of every placed footprint.
struct Bounds {
    min: Vector2,
    width: usize,
    height: usize,
}

impl Bounds {
    fn of(placements: &[Placement<'_>]) -> Option<Self> {
        let mut footprints = placements.iter().map(Placement::footprint);
        let first = footprints.next()?;
        let (min, max) = footprints.fold(first, |(min, max), (low, high)| {
            (
                Vector2::new(min.x.min(low.x), min.y.min(low.y)),
                Vector2::new(max.x.max(high.x), max.y.max(high.y)),
            )
        });
        Some(Self { min, width: (max.x - min.x) as usize, height: (max.y - min.y) as usize })
    }

    fn local(&self, pos: Vector2) -> Vector2 {
        Vector2::new(pos.x - self.min.x, pos.y - self.min.y)
    }
}

/// Stitches `assembly` into a raw, unsanitized layout using tiles from
/// `library`.
///
/// Later tiles overwrite the room label of cells they share with earlier
/// ones. An edge is open when any tile opens it from either side; every
/// other edge touching a Floor cell is a wall, the rim included.
pub fn assemble(
    assembly: &TileAssembly,
    library: &TileLibrary,
) -> Result<MapDefinition, AssemblyError> {
    let placements = assembly
        .tiles
        .iter()
        .enumerate()
        .map(|(index, reference)| match library.get(&reference.tile_id) {
            Some(tile) => Ok(Placement { tile, reference }),
            None => {
                Err(AssemblyError::UnknownTile { index, tile_id: reference.tile_id.clone() })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let bounds = Bounds::of(&placements).ok_or(AssemblyError::Empty)?;
    let (width, height) = (bounds.width, bounds.height);

    let mut labels: Vec<Option<String>> = vec![None; width * height];
    let mut open = EdgeTable::from_fn(width, height, |_, _| false);
    for (index, placement) in placements.iter().enumerate() {
        let tile = placement.tile;
        let label = tile.label(index);
        for cell in &tile.cells {
            let local = Vector2::new(cell.x, cell.y);
            if !in_bounds(tile.width, tile.height, local) {
                continue;
            }
            let pos = bounds.local(placement.place(local));
            if let Some(slot) = cell_index(width, height, pos) {
                labels[slot] = Some(label.clone());
            }
            for &edge in &cell.open_edges {
                let neighbour = pos.offset(placement.turn(edge));
                if in_bounds(width, height, neighbour) {
                    open.set(pos, neighbour, true);
                }
            }
        }
    }

    let is_floor =
        |pos: Vector2| cell_index(width, height, pos).is_some_and(|slot| labels[slot].is_some());
    let walls = open
        .iter()
        .filter(|&(a, b, is_open)| !is_open && (is_floor(a) || is_floor(b)))
        .map(|(a, b, _)| WallDefinition::between(a, b))
        .collect();

    let mut doors = Vec::with_capacity(assembly.tile_doors.len() + assembly.doors.len());
    for door in &assembly.tile_doors {
        let placement =
            placements.get(door.tile_index).ok_or_else(|| AssemblyError::UnknownTileIndex {
                door_id: door.id.clone(),
                tile_index: door.tile_index,
                placed: placements.len(),
            })?;
        let sockets = &placement.tile.door_sockets;
        let socket = sockets.get(door.socket_index).ok_or_else(|| AssemblyError::UnknownSocket {
            door_id: door.id.clone(),
            tile_id: placement.tile.id.clone(),
            socket_index: door.socket_index,
            sockets: sockets.len(),
        })?;
        let pos = bounds.local(placement.place(Vector2::new(socket.x, socket.y)));
        let neighbour = pos.offset(placement.turn(socket.edge));
        doors.push(Door::closed(door.id.clone(), pos.min(neighbour), pos.max(neighbour)));
    }
    for door in &assembly.doors {
        let cell = bounds.local(door.cell);
        let before = match door.orientation {
            DoorOrientation::Vertical => cell.offset(Direction::West),
            DoorOrientation::Horizontal => cell.offset(Direction::North),
        };
        doors.push(Door::closed(door.id.clone(), before, cell));
    }

    let cells = labels
        .iter()
        .enumerate()
        .filter_map(|(slot, label)| {
            label.as_ref().map(|id| Cell::floor(cell_at_index(width, slot), Some(id.clone())))
        })
        .collect::<Vec<_>>();
    debug!(
        "assembled {} tiles into a {width}x{height} layout with {} floor cells",
        placements.len(),
        cells.len()
    );

    let squad_spawn = assembly.squad_spawn.map(|pos| bounds.local(pos));
    Ok(MapDefinition {
        width,
        height,
        generator_name: None,
        cells,
        walls,
        doors,
        spawn_points: assembly
            .spawn_points
            .iter()
            .map(|spawn| SpawnPoint {
                id: spawn.id.clone(),
                pos: bounds.local(spawn.cell),
                radius: SPAWN_RADIUS,
            })
            .collect(),
        squad_spawn,
        squad_spawns: squad_spawn.into_iter().collect(),
        extraction: assembly.extraction.map(|pos| bounds.local(pos)),
        objectives: assembly
            .objectives
            .iter()
            .map(|objective| ObjectiveDefinition {
                id: objective.id.clone(),
                kind: objective.kind,
                target_cell: Some(bounds.local(objective.cell)),
            })
            .collect(),
        bonus_loot: Vec::new(),
    })
}
