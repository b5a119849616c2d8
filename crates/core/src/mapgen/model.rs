//! Public data models for floor plans: the map definition wire shape and its parts.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::types::{CellType, DoorOrientation, DoorState, MapGeneratorType, Vector2};

use super::grid::{in_bounds, quadrant};

/// Prefix shared by every room label; anything else is a corridor.
pub const ROOM_PREFIX: &str = "room-";

pub const DOOR_HP: u32 = 100;
pub const DOOR_OPEN_DURATION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: CellType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

impl Cell {
    pub fn floor(pos: Vector2, room_id: Option<String>) -> Self {
        Self { x: pos.x, y: pos.y, kind: CellType::Floor, room_id }
    }

    pub fn pos(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    pub fn is_room(&self) -> bool {
        self.room_id.as_deref().is_some_and(|id| id.starts_with(ROOM_PREFIX))
    }
}

/// Wall segment on the cell-corner lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallDefinition {
    pub p1: Vector2,
    pub p2: Vector2,
}

impl WallDefinition {
    /// Unit segment separating two orthogonally adjacent cells.
    pub fn between(a: Vector2, b: Vector2) -> Self {
        if a.y == b.y {
            let line_x = a.x.max(b.x);
            Self { p1: Vector2::new(line_x, a.y), p2: Vector2::new(line_x, a.y + 1) }
        } else {
            let line_y = a.y.max(b.y);
            Self { p1: Vector2::new(a.x, line_y), p2: Vector2::new(a.x + 1, line_y) }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Door {
    pub id: String,
    pub segment: [Vector2; 2],
    pub orientation: DoorOrientation,
    pub state: DoorState,
    pub hp: u32,
    pub max_hp: u32,
    pub open_duration: u32,
}

impl Door {
    pub fn closed(id: impl Into<String>, a: Vector2, b: Vector2) -> Self {
        let orientation =
            if a.y == b.y { DoorOrientation::Vertical } else { DoorOrientation::Horizontal };
        Self {
            id: id.into(),
            segment: [a, b],
            orientation,
            state: DoorState::Closed,
            hp: DOOR_HP,
            max_hp: DOOR_HP,
            open_duration: DOOR_OPEN_DURATION,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub id: String,
    pub pos: Vector2,
    pub radius: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveKind {
    Recover,
    Kill,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveDefinition {
    pub id: String,
    pub kind: ObjectiveKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cell: Option<Vector2>,
}

/// The generation artifact handed to the simulation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDefinition {
    pub width: usize,
    pub height: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_name: Option<MapGeneratorType>,
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub walls: Vec<WallDefinition>,
    #[serde(default)]
    pub doors: Vec<Door>,
    #[serde(default)]
    pub spawn_points: Vec<SpawnPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squad_spawn: Option<Vector2>,
    #[serde(default)]
    pub squad_spawns: Vec<Vector2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<Vector2>,
    #[serde(default)]
    pub objectives: Vec<ObjectiveDefinition>,
    #[serde(default)]
    pub bonus_loot: Vec<Vector2>,
}

impl MapDefinition {
    pub fn empty(width: usize, height: usize) -> Self {
        Self { width, height, ..Self::default() }
    }

    pub fn in_bounds(&self, pos: Vector2) -> bool {
        in_bounds(self.width, self.height, pos)
    }

    pub fn quadrant_of(&self, pos: Vector2) -> usize {
        quadrant(self.width, self.height, pos)
    }

    pub fn cell_at(&self, pos: Vector2) -> Option<&Cell> {
        self.cells.iter().rev().find(|cell| cell.x == pos.x && cell.y == pos.y)
    }

    pub fn is_floor(&self, pos: Vector2) -> bool {
        self.cell_at(pos).is_some_and(|cell| cell.kind == CellType::Floor)
    }

    pub fn floor_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.kind == CellType::Floor).count()
    }

    pub fn fill_rate(&self) -> f64 {
        let total = self.width * self.height;
        if total == 0 {
            return 0.0;
        }
        self.floor_count() as f64 / total as f64
    }

    /// Squad positions: every entry of `squad_spawns`, plus `squad_spawn`
    /// when it is not already listed.
    pub fn squad_positions(&self) -> Vec<Vector2> {
        let mut positions = self.squad_spawns.clone();
        if let Some(pos) = self.squad_spawn
            && !positions.contains(&pos)
        {
            positions.push(pos);
        }
        positions
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        fn push_pos(bytes: &mut Vec<u8>, pos: Vector2) {
            bytes.extend(pos.x.to_le_bytes());
            bytes.extend(pos.y.to_le_bytes());
        }
        fn push_str(bytes: &mut Vec<u8>, value: &str) {
            bytes.extend((value.len() as u32).to_le_bytes());
            bytes.extend(value.as_bytes());
        }
        fn push_len(bytes: &mut Vec<u8>, len: usize) {
            bytes.extend((len as u32).to_le_bytes());
        }

        let mut bytes = Vec::new();
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.push(match self.generator_name {
            None => 0,
            Some(MapGeneratorType::Procedural) => 1,
            Some(MapGeneratorType::Static) => 2,
            Some(MapGeneratorType::TreeShip) => 3,
            Some(MapGeneratorType::DenseShip) => 4,
        });

        push_len(&mut bytes, self.cells.len());
        for cell in &self.cells {
            push_pos(&mut bytes, cell.pos());
            bytes.push(match cell.kind {
                CellType::Void => 0,
                CellType::Floor => 1,
            });
            push_str(&mut bytes, cell.room_id.as_deref().unwrap_or(""));
        }

        push_len(&mut bytes, self.walls.len());
        for wall in &self.walls {
            push_pos(&mut bytes, wall.p1);
            push_pos(&mut bytes, wall.p2);
        }

        push_len(&mut bytes, self.doors.len());
        for door in &self.doors {
            push_str(&mut bytes, &door.id);
            push_pos(&mut bytes, door.segment[0]);
            push_pos(&mut bytes, door.segment[1]);
        }

        push_len(&mut bytes, self.spawn_points.len());
        for spawn in &self.spawn_points {
            push_str(&mut bytes, &spawn.id);
            push_pos(&mut bytes, spawn.pos);
        }

        let squad = self.squad_positions();
        push_len(&mut bytes, squad.len());
        for pos in squad {
            push_pos(&mut bytes, pos);
        }

        match self.extraction {
            Some(pos) => {
                bytes.push(1);
                push_pos(&mut bytes, pos);
            }
            None => bytes.push(0),
        }

        push_len(&mut bytes, self.objectives.len());
        for objective in &self.objectives {
            push_str(&mut bytes, &objective.id);
            if let Some(target) = objective.target_cell {
                push_pos(&mut bytes, target);
            }
        }

        push_len(&mut bytes, self.bonus_loot.len());
        for &pos in &self.bonus_loot {
            push_pos(&mut bytes, pos);
        }

        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

/// Caller-facing request for one floor plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapGenerationConfig {
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    #[serde(rename = "type", default)]
    pub kind: MapGeneratorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_point_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_loot_count: Option<usize>,
}

impl MapGenerationConfig {
    pub fn new(seed: u64, width: usize, height: usize, kind: MapGeneratorType) -> Self {
        Self { seed, width, height, kind, spawn_point_count: None, bonus_loot_count: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_between_horizontal_neighbours_is_a_vertical_segment() {
        let wall = WallDefinition::between(Vector2::new(1, 0), Vector2::new(0, 0));
        assert_eq!(wall, WallDefinition { p1: Vector2::new(1, 0), p2: Vector2::new(1, 1) });
    }

    #[test]
    fn wall_between_vertical_neighbours_is_a_horizontal_segment() {
        let wall = WallDefinition::between(Vector2::new(2, 3), Vector2::new(2, 4));
        assert_eq!(wall, WallDefinition { p1: Vector2::new(2, 4), p2: Vector2::new(3, 4) });
    }

    #[test]
    fn door_orientation_follows_the_wall_it_sits_in() {
        let east_west = Door::closed("door-1", Vector2::new(0, 0), Vector2::new(1, 0));
        let north_south = Door::closed("door-2", Vector2::new(0, 0), Vector2::new(0, 1));
        assert_eq!(east_west.orientation, DoorOrientation::Vertical);
        assert_eq!(north_south.orientation, DoorOrientation::Horizontal);
        assert_eq!(east_west.hp, 100);
        assert_eq!(east_west.state, DoorState::Closed);
    }

    #[test]
    fn map_definition_uses_camel_case_wire_names() {
        let mut map = MapDefinition::empty(6, 6);
        map.cells.push(Cell::floor(Vector2::new(1, 1), Some("room-1-1".to_string())));
        map.squad_spawn = Some(Vector2::new(1, 1));
        map.generator_name = Some(MapGeneratorType::TreeShip);

        let json = serde_json::to_value(&map).expect("serialize");
        assert_eq!(json["generatorName"], "TreeShip");
        assert_eq!(json["cells"][0]["type"], "Floor");
        assert_eq!(json["cells"][0]["roomId"], "room-1-1");
        assert_eq!(json["squadSpawn"]["x"], 1);
        assert_eq!(json["bonusLoot"], serde_json::json!([]));

        let decoded: MapDefinition = serde_json::from_value(json).expect("deserialize");
        assert_eq!(decoded, map);
    }

    #[test]
    fn config_defaults_optional_counts() {
        let config: MapGenerationConfig =
            serde_json::from_str(r#"{"seed":7,"width":10,"height":12,"type":"DenseShip"}"#)
                .expect("deserialize");
        assert_eq!(config, MapGenerationConfig::new(7, 10, 12, MapGeneratorType::DenseShip));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let mut map = MapDefinition::empty(6, 6);
        let before = map.fingerprint();
        map.bonus_loot.push(Vector2::new(2, 2));
        assert_ne!(before, map.fingerprint());
    }
}
