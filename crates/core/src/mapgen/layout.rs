//! Carving buffer shared by the layout strategies: labelled floor cells,
//! per-edge links, and the doors placed between regions.

use std::collections::VecDeque;

use crate::types::{BoundaryType, CellType, Direction, MapGeneratorType, Vector2};

use super::grid::{EdgeTable, cell_at_index, cell_index};
use super::model::{Cell, Door, MapDefinition, ROOM_PREFIX, WallDefinition};
use super::spawns::PlacedFeatures;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct RoomRect {
    pub(super) x: i32,
    pub(super) y: i32,
    pub(super) width: i32,
    pub(super) height: i32,
}

impl RoomRect {
    fn right(self) -> i32 {
        self.x + self.width - 1
    }

    fn bottom(self) -> i32 {
        self.y + self.height - 1
    }

    pub(super) fn expanded(self, margin: i32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2 * margin,
            height: self.height + 2 * margin,
        }
    }

    pub(super) fn intersects(self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    pub(super) fn contains(self, pos: Vector2) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }

    pub(super) fn cells(self) -> impl Iterator<Item = Vector2> {
        (self.y..=self.bottom())
            .flat_map(move |y| (self.x..=self.right()).map(move |x| Vector2::new(x, y)))
    }

    pub(super) fn label(self) -> String {
        format!("{ROOM_PREFIX}{}-{}", self.x, self.y)
    }
}

/// Cells of one labelled room in first-seen row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct RoomCells {
    pub(super) label: String,
    pub(super) cells: Vec<Vector2>,
}

#[derive(Clone, Debug)]
pub(super) struct Blueprint {
    pub(super) width: usize,
    pub(super) height: usize,
    labels: Vec<Option<String>>,
    links: EdgeTable<BoundaryType>,
    doors: Vec<Door>,
    next_door_id: usize,
}

impl Blueprint {
    pub(super) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            labels: vec![None; width * height],
            links: EdgeTable::from_fn(width, height, |_, _| BoundaryType::Wall),
            doors: Vec::new(),
            next_door_id: 1,
        }
    }

    fn index(&self, pos: Vector2) -> Option<usize> {
        cell_index(self.width, self.height, pos)
    }

    pub(super) fn is_floor(&self, pos: Vector2) -> bool {
        self.index(pos).is_some_and(|index| self.labels[index].is_some())
    }

    pub(super) fn is_void(&self, pos: Vector2) -> bool {
        self.index(pos).is_some_and(|index| self.labels[index].is_none())
    }

    pub(super) fn label(&self, pos: Vector2) -> Option<&str> {
        self.index(pos).and_then(|index| self.labels[index].as_deref())
    }

    pub(super) fn is_room(&self, pos: Vector2) -> bool {
        self.label(pos).is_some_and(|label| label.starts_with(ROOM_PREFIX))
    }

    /// Marks a cell as floor under `label`, replacing any previous label.
    pub(super) fn carve(&mut self, pos: Vector2, label: impl Into<String>) {
        if let Some(index) = self.index(pos) {
            self.labels[index] = Some(label.into());
        }
    }

    pub(super) fn carve_room(&mut self, room: RoomRect) {
        let label = room.label();
        for cell in room.cells() {
            self.carve(cell, label.clone());
        }
        for cell in room.cells() {
            for direction in [Direction::East, Direction::South] {
                let next = cell.offset(direction);
                if room.contains(next) {
                    self.open(cell, next);
                }
            }
        }
    }

    pub(super) fn link(&self, a: Vector2, b: Vector2) -> BoundaryType {
        self.links.get(a, b).unwrap_or(BoundaryType::Wall)
    }

    /// Removes the wall between two floor neighbours.
    pub(super) fn open(&mut self, a: Vector2, b: Vector2) {
        if self.is_floor(a) && self.is_floor(b) {
            self.links.set(a, b, BoundaryType::Open);
        }
    }

    pub(super) fn add_door(&mut self, a: Vector2, b: Vector2) -> bool {
        if !self.is_floor(a) || !self.is_floor(b) || self.link(a, b) != BoundaryType::Wall {
            return false;
        }
        if !self.links.set(a, b, BoundaryType::Door) {
            return false;
        }
        let id = format!("door-{}", self.next_door_id);
        self.next_door_id += 1;
        self.doors.push(Door::closed(id, a, b));
        true
    }

    /// Relabels a corridor cell as a one-cell room so entities that must
    /// sit in rooms can use it.
    pub(super) fn promote_to_alcove(&mut self, pos: Vector2) -> String {
        let label = format!("{ROOM_PREFIX}alcove-{}-{}", pos.x, pos.y);
        self.carve(pos, label.clone());
        label
    }

    pub(super) fn floor_cells(&self) -> Vec<Vector2> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.is_some())
            .map(|(index, _)| cell_at_index(self.width, index))
            .collect()
    }

    pub(super) fn floor_count(&self) -> usize {
        self.labels.iter().filter(|label| label.is_some()).count()
    }

    pub(super) fn fill_rate(&self) -> f64 {
        self.floor_count() as f64 / (self.width * self.height) as f64
    }

    pub(super) fn rooms(&self) -> Vec<RoomCells> {
        let mut rooms: Vec<RoomCells> = Vec::new();
        for (index, label) in self.labels.iter().enumerate() {
            let Some(label) = label.as_deref().filter(|label| label.starts_with(ROOM_PREFIX))
            else {
                continue;
            };
            let pos = cell_at_index(self.width, index);
            match rooms.iter_mut().find(|room| room.label == label) {
                Some(room) => room.cells.push(pos),
                None => rooms.push(RoomCells { label: label.to_string(), cells: vec![pos] }),
            }
        }
        rooms
    }

    /// Keeps only the largest connected floor region, ties going to the one
    /// found first in row-major order. Returns how many cells were dropped.
    pub(super) fn retain_largest_component(&mut self) -> usize {
        let mut component = vec![usize::MAX; self.labels.len()];
        let mut sizes = Vec::new();
        for start in 0..self.labels.len() {
            if self.labels[start].is_none() || component[start] != usize::MAX {
                continue;
            }
            let id = sizes.len();
            let mut size = 0;
            let mut open = VecDeque::from([start]);
            component[start] = id;
            while let Some(index) = open.pop_front() {
                size += 1;
                let pos = cell_at_index(self.width, index);
                for direction in Direction::ALL {
                    let next = pos.offset(direction);
                    let Some(next_index) = self.index(next) else {
                        continue;
                    };
                    if self.labels[next_index].is_none()
                        || component[next_index] != usize::MAX
                        || self.link(pos, next) == BoundaryType::Wall
                    {
                        continue;
                    }
                    component[next_index] = id;
                    open.push_back(next_index);
                }
            }
            sizes.push(size);
        }

        let Some(keep) = (0..sizes.len()).max_by_key(|&id| (sizes[id], usize::MAX - id)) else {
            return 0;
        };

        let mut dropped = 0;
        for index in 0..self.labels.len() {
            if self.labels[index].is_some() && component[index] != keep {
                let pos = cell_at_index(self.width, index);
                self.labels[index] = None;
                for direction in Direction::ALL {
                    self.links.set(pos, pos.offset(direction), BoundaryType::Wall);
                }
                dropped += 1;
            }
        }
        if dropped > 0 {
            let labels = &self.labels;
            let width = self.width;
            let height = self.height;
            self.doors.retain(|door| {
                door.segment.iter().all(|&end| {
                    cell_index(width, height, end).is_some_and(|index| labels[index].is_some())
                })
            });
        }
        dropped
    }

    /// Raw map: every cell (Void included) in row-major order and a wall
    /// segment on every edge that is neither open nor a door.
    pub(super) fn into_map(self, kind: MapGeneratorType, features: PlacedFeatures) -> MapDefinition {
        let width = self.width;
        let cells = self
            .labels
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let pos = cell_at_index(width, index);
                Cell {
                    x: pos.x,
                    y: pos.y,
                    kind: if label.is_some() { CellType::Floor } else { CellType::Void },
                    room_id: label.clone(),
                }
            })
            .collect();
        let walls = self
            .links
            .iter()
            .filter(|(_, _, link)| *link == BoundaryType::Wall)
            .map(|(a, b, _)| WallDefinition::between(a, b))
            .collect();

        MapDefinition {
            width: self.width,
            height: self.height,
            generator_name: Some(kind),
            cells,
            walls,
            doors: self.doors,
            spawn_points: features.spawn_points,
            squad_spawn: features.squad_spawns.first().copied(),
            squad_spawns: features.squad_spawns,
            extraction: Some(features.extraction),
            objectives: features.objectives,
            bonus_loot: Vec::new(),
        }
    }
}
