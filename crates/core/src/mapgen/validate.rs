//! Structural checks over a finished map. Validation never fails outright;
//! it collects every problem it finds as a human-readable issue.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{BoundaryType, CellType, DoorState, Vector2};

use super::graph::{Boundary, Graph};
use super::model::MapDefinition;

/// Maps with at most this many cells may stack objectives with enemies or
/// the extraction.
const SMALL_MAP_AREA: usize = 25;
const CORRIDOR_PREFIX: &str = "corridor-";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<String>) -> Self {
        Self { is_valid: issues.is_empty(), issues }
    }
}

struct Validator<'a> {
    map: &'a MapDefinition,
    graph: Graph<'a>,
    locked_doors: BTreeSet<&'a str>,
    issues: Vec<String>,
}

pub fn validate(map: &MapDefinition) -> ValidationReport {
    let mut validator = Validator {
        map,
        graph: Graph::new(map),
        locked_doors: map
            .doors
            .iter()
            .filter(|door| door.state == DoorState::Locked)
            .map(|door| door.id.as_str())
            .collect(),
        issues: Vec::new(),
    };
    validator.check_dimensions();
    validator.check_cells();
    validator.check_doors();
    validator.check_open_boundaries();
    validator.check_entities();
    validator.check_room_exclusivity();
    validator.check_cell_exclusivity();
    validator.check_reachability();
    validator.check_quadrants();
    ValidationReport::from_issues(validator.issues)
}

impl<'a> Validator<'a> {
    fn push(&mut self, issue: String) {
        self.issues.push(issue);
    }

    fn room_of(&self, pos: Vector2) -> Option<&'a str> {
        self.graph.cell(pos).and_then(|cell| cell.room_id)
    }

    fn is_room(&self, pos: Vector2) -> bool {
        self.room_of(pos).is_some_and(|id| !id.starts_with(CORRIDOR_PREFIX))
    }

    fn passable(&self, boundary: &Boundary<'_>) -> bool {
        match boundary.kind {
            BoundaryType::Open => true,
            BoundaryType::Door => {
                boundary.door_id.is_none_or(|id| !self.locked_doors.contains(id))
            }
            BoundaryType::Wall => false,
        }
    }

    fn check_dimensions(&mut self) {
        if self.map.width == 0 || self.map.height == 0 {
            self.push("Map dimensions (width and height) must be positive.".to_string());
        }
    }

    fn check_cells(&mut self) {
        let map = self.map;
        let mut seen = BTreeSet::new();
        for cell in &map.cells {
            let pos = cell.pos();
            if !seen.insert(pos) {
                self.issues.push(format!("Duplicate cell definition at {pos}."));
            }
            if !map.in_bounds(pos) {
                self.issues.push(format!("Cell at {pos} is out of map bounds."));
            }
        }
    }

    fn check_doors(&mut self) {
        let map = self.map;
        for door in &map.doors {
            let [a, b] = door.segment;
            for end in [a, b] {
                if !map.in_bounds(end) {
                    self.push(format!("Door {} segment at {end} is out of map bounds.", door.id));
                } else if !self.graph.is_floor(end) {
                    self.push(format!("Door {} segment at {end} is not a Floor cell.", door.id));
                }
            }
            if !a.is_adjacent(b) {
                self.push(format!("Door {} segment cells {a} and {b} are not adjacent.", door.id));
            }
        }
    }

    /// Any boundary touching a Floor cell is either a wall, a door, or an
    /// opening into another Floor cell.
    fn check_open_boundaries(&mut self) {
        let offending: Vec<(Vector2, Vector2)> = self
            .graph
            .boundaries()
            .filter(|(_, _, boundary)| boundary.kind == BoundaryType::Open)
            .filter(|&(a, b, _)| {
                let (floor_a, floor_b) = (self.graph.is_floor(a), self.graph.is_floor(b));
                (floor_a || floor_b) && !(floor_a && floor_b)
            })
            .map(|(a, b, _)| (a, b))
            .collect();
        for (a, b) in offending {
            self.push(format!(
                "Open boundary at ({},{})--({},{}) must be between two Floor cells.",
                a.x, a.y, b.x, b.y
            ));
        }
    }

    fn check_placed(&mut self, label: &str, pos: Vector2) {
        if !self.map.in_bounds(pos) {
            self.push(format!("{label} at {pos} is out of map bounds."));
            return;
        }
        if !self.graph.is_floor(pos) {
            self.push(format!("{label} at {pos} is not on a Floor cell."));
        }
        if !self.is_room(pos) {
            self.push(format!("{label} at {pos} must be in a room, not a corridor."));
        }
    }

    fn check_entities(&mut self) {
        let map = self.map;
        if map.spawn_points.is_empty() {
            self.push("No spawn points defined.".to_string());
        }
        for spawn in &map.spawn_points {
            self.check_placed(&format!("Spawn point {}", spawn.id), spawn.pos);
        }
        if let Some(pos) = map.extraction {
            self.check_placed("Extraction point", pos);
        }
        for objective in &map.objectives {
            if let Some(pos) = objective.target_cell {
                self.check_placed(&format!("Objective {}", objective.id), pos);
            }
        }
        for &pos in &map.bonus_loot {
            self.check_placed("Loot", pos);
        }
        for pos in map.squad_positions() {
            self.check_placed("Squad spawn point", pos);
        }
    }

    fn rooms_at(&self, positions: impl IntoIterator<Item = Vector2>) -> BTreeSet<&'a str> {
        positions.into_iter().filter_map(|pos| self.room_of(pos)).collect()
    }

    fn check_room_exclusivity(&mut self) {
        let map = self.map;
        let enemy_rooms = self.rooms_at(map.spawn_points.iter().map(|spawn| spawn.pos));
        let squad_rooms = self.rooms_at(map.squad_positions());
        let objective_rooms =
            self.rooms_at(map.objectives.iter().filter_map(|objective| objective.target_cell));
        let extraction_room = map.extraction.and_then(|pos| self.room_of(pos));

        for &room in &squad_rooms {
            if enemy_rooms.contains(room) {
                self.push(format!("Squad and Enemy spawn points share the same room: {room}"));
            }
            if extraction_room == Some(room) {
                self.push(format!("Squad spawn and Extraction share the same room: {room}"));
            }
            if objective_rooms.contains(room) {
                self.push(format!("Squad spawn and Objective share the same room: {room}"));
            }
        }
        for &room in &enemy_rooms {
            if extraction_room == Some(room) {
                self.push(format!("Enemy spawn and Extraction share the same room: {room}"));
            }
        }
        if map.width * map.height > SMALL_MAP_AREA {
            for &room in &objective_rooms {
                if enemy_rooms.contains(room) {
                    self.push(format!(
                        "Objective and Enemy spawn share the same room on large map: {room}"
                    ));
                }
                if extraction_room == Some(room) {
                    self.push(format!(
                        "Objective and Extraction share the same room on large map: {room}"
                    ));
                }
            }
        }
    }

    fn check_cell_exclusivity(&mut self) {
        let map = self.map;
        let mut occupants: Vec<(Vector2, String)> = map
            .squad_positions()
            .into_iter()
            .map(|pos| (pos, "Squad spawn".to_string()))
            .collect();
        occupants.extend(map.spawn_points.iter().map(|s| (s.pos, format!("Enemy spawn {}", s.id))));
        occupants.extend(map.extraction.map(|pos| (pos, "Extraction point".to_string())));
        occupants.extend(map.objectives.iter().filter_map(|objective| {
            objective.target_cell.map(|pos| (pos, format!("Objective {}", objective.id)))
        }));
        occupants.extend(map.bonus_loot.iter().map(|&pos| (pos, "Loot container".to_string())));

        let mut taken: BTreeMap<Vector2, String> = BTreeMap::new();
        for (pos, label) in occupants {
            match taken.get(&pos) {
                Some(owner) => self.issues.push(format!("{label} at {pos} overlaps with {owner}.")),
                None => {
                    taken.insert(pos, label);
                }
            }
        }
    }

    fn reach(&self, seeds: impl IntoIterator<Item = Vector2>) -> Vec<bool> {
        self.graph.reachable_with(seeds, |boundary| self.passable(boundary))
    }

    fn reached(&self, mask: &[bool], pos: Vector2) -> bool {
        self.graph.index(pos).is_some_and(|index| mask[index])
    }

    fn check_reachability(&mut self) {
        let map = self.map;
        if !map.spawn_points.is_empty() {
            let mask = self.reach(map.spawn_points.iter().map(|spawn| spawn.pos));
            let stranded: Vec<Vector2> = map
                .cells
                .iter()
                .filter(|cell| cell.kind == CellType::Floor)
                .map(|cell| cell.pos())
                .filter(|&pos| !self.reached(&mask, pos))
                .collect();
            for pos in stranded {
                self.push(format!("Floor cell at {pos} is not reachable from any spawn point."));
            }
        }

        let Some(start) = map.squad_spawn.or_else(|| map.squad_spawns.first().copied()) else {
            return;
        };
        let mask = self.reach([start]);
        if let Some(pos) = map.extraction
            && !self.reached(&mask, pos)
        {
            self.push(format!("Extraction point at {pos} is not reachable from squad spawn."));
        }
        for objective in &map.objectives {
            if let Some(pos) = objective.target_cell
                && !self.reached(&mask, pos)
            {
                self.push(format!(
                    "Objective {} at {pos} is not reachable from squad spawn.",
                    objective.id
                ));
            }
        }
    }

    /// Generated maps start every squad spawn in a different quadrant from
    /// the extraction. Hand-made layouts are exempt.
    fn check_quadrants(&mut self) {
        let map = self.map;
        if !map.generator_name.is_some_and(|kind| kind.is_generative()) {
            return;
        }
        let Some(extraction) = map.extraction else {
            return;
        };
        let quadrant = map.quadrant_of(extraction);
        for squad in map.squad_positions() {
            if map.quadrant_of(squad) == quadrant {
                self.push(format!(
                    "Squad spawn at {squad} and extraction at {extraction} share quadrant {quadrant}."
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::model::{Cell, Door, SpawnPoint, WallDefinition};
    use crate::types::MapGeneratorType;

    /// One row of three rooms: `room-a` on x=0..2, `room-b` on x=2,
    /// `room-c` on x=3..5, joined by two doors.
    fn room_row() -> MapDefinition {
        let mut map = MapDefinition::empty(5, 1);
        for x in 0..5 {
            let room = match x {
                0 | 1 => "room-a",
                2 => "room-b",
                _ => "room-c",
            };
            map.cells.push(Cell::floor(Vector2::new(x, 0), Some(room.to_string())));
        }
        map.doors.push(Door::closed("door-1", Vector2::new(1, 0), Vector2::new(2, 0)));
        map.doors.push(Door::closed("door-2", Vector2::new(2, 0), Vector2::new(3, 0)));
        map.spawn_points.push(SpawnPoint {
            id: "spawn-1".into(),
            pos: Vector2::new(4, 0),
            radius: 1,
        });
        map.squad_spawn = Some(Vector2::new(0, 0));
        map.squad_spawns = vec![Vector2::new(0, 0), Vector2::new(1, 0)];
        map.extraction = Some(Vector2::new(2, 0));
        map
    }

    #[test]
    fn well_formed_map_passes() {
        let report = validate(&room_row());
        assert!(report.is_valid, "{:?}", report.issues);
    }

    #[test]
    fn missing_spawns_are_reported() {
        let mut map = room_row();
        map.spawn_points.clear();
        let report = validate(&map);
        assert!(!report.is_valid);
        assert!(report.issues.contains(&"No spawn points defined.".to_string()));
    }

    #[test]
    fn duplicate_and_out_of_bounds_cells_are_reported() {
        let mut map = room_row();
        map.cells.push(Cell::floor(Vector2::new(0, 0), Some("room-a".into())));
        map.cells.push(Cell::floor(Vector2::new(9, 0), None));
        let issues = validate(&map).issues;
        assert!(issues.contains(&"Duplicate cell definition at (0, 0).".to_string()));
        assert!(issues.contains(&"Cell at (9, 0) is out of map bounds.".to_string()));
    }

    #[test]
    fn locked_doors_block_reachability() {
        let mut map = room_row();
        map.doors[0].state = DoorState::Locked;
        let issues = validate(&map).issues;
        assert!(issues.contains(&"Floor cell at (0, 0) is not reachable from any spawn point.".to_string()));
        assert!(
            issues.contains(&"Extraction point at (2, 0) is not reachable from squad spawn.".to_string())
        );
    }

    #[test]
    fn shared_rooms_and_cells_are_reported() {
        let mut map = room_row();
        map.extraction = Some(Vector2::new(1, 0));
        let issues = validate(&map).issues;
        assert!(issues.contains(&"Squad spawn and Extraction share the same room: room-a".to_string()));
        assert!(issues.contains(&"Extraction point at (1, 0) overlaps with Squad spawn.".to_string()));
    }

    #[test]
    fn corridor_entities_are_reported() {
        let mut map = room_row();
        map.cells[4].room_id = Some("corridor-maze".into());
        let issues = validate(&map).issues;
        assert!(issues.contains(
            &"Spawn point spawn-1 at (4, 0) must be in a room, not a corridor.".to_string()
        ));
    }

    #[test]
    fn floor_open_to_void_is_reported() {
        let mut map = MapDefinition::empty(3, 1);
        map.cells.push(Cell::floor(Vector2::new(0, 0), Some("room-a".into())));
        map.cells.push(Cell::floor(Vector2::new(1, 0), Some("room-a".into())));
        map.spawn_points.push(SpawnPoint { id: "spawn-1".into(), pos: Vector2::new(0, 0), radius: 1 });
        let issues = validate(&map).issues;
        assert!(issues.contains(&"Open boundary at (1,0)--(2,0) must be between two Floor cells.".to_string()));

        map.walls.push(WallDefinition::between(Vector2::new(1, 0), Vector2::new(2, 0)));
        assert!(validate(&map).is_valid);
    }

    #[test]
    fn quadrant_rule_only_applies_to_generated_maps() {
        let mut map = MapDefinition::empty(6, 6);
        for y in 0..2 {
            for x in 0..2 {
                map.cells.push(Cell::floor(Vector2::new(x, y), Some(format!("room-{x}-{y}"))));
            }
        }
        for (a, b) in [((1, 0), (2, 0)), ((1, 1), (2, 1)), ((0, 1), (0, 2)), ((1, 1), (1, 2))] {
            map.walls.push(WallDefinition::between(Vector2::new(a.0, a.1), Vector2::new(b.0, b.1)));
        }
        map.spawn_points.push(SpawnPoint { id: "spawn-1".into(), pos: Vector2::new(1, 1), radius: 1 });
        map.squad_spawn = Some(Vector2::new(0, 0));
        map.squad_spawns = vec![Vector2::new(0, 0), Vector2::new(1, 0)];
        map.extraction = Some(Vector2::new(0, 1));

        map.generator_name = Some(MapGeneratorType::Static);
        let issues = validate(&map).issues;
        assert!(issues.iter().all(|issue| !issue.contains("share quadrant")));

        map.generator_name = Some(MapGeneratorType::TreeShip);
        let issues = validate(&map).issues;
        assert!(issues.iter().any(|issue| issue.contains("share quadrant 0")));
    }

    #[test]
    fn every_squad_spawn_is_checked_against_the_extraction_quadrant() {
        let mut map = MapDefinition::empty(6, 6);
        for y in 0..6 {
            for x in 0..6 {
                map.cells.push(Cell::floor(Vector2::new(x, y), Some("room-hull".into())));
            }
        }
        map.spawn_points.push(SpawnPoint { id: "spawn-1".into(), pos: Vector2::new(0, 5), radius: 1 });
        map.squad_spawn = Some(Vector2::new(0, 0));
        map.squad_spawns = vec![Vector2::new(0, 0), Vector2::new(5, 4)];
        map.extraction = Some(Vector2::new(5, 5));
        map.generator_name = Some(MapGeneratorType::TreeShip);

        let issues = validate(&map).issues;
        let quadrant_issues: Vec<&String> =
            issues.iter().filter(|issue| issue.contains("share quadrant")).collect();
        assert_eq!(
            quadrant_issues,
            [&"Squad spawn at (5, 4) and extraction at (5, 5) share quadrant 3.".to_string()]
        );
    }
}
