//! Classic procedural ship: scattered rooms, a depth-first maze through the
//! space between them, and doors from every room into the maze.

use crate::error::GenerationError;
use crate::types::{Direction, MapGeneratorType, Vector2};

use super::super::grid::cell_at_index;
use super::super::layout::{Blueprint, RoomRect};
use super::super::model::MapDefinition;
use super::super::seed::Prng;
use super::super::spawns::FeatureRequest;
use super::pipeline::{LayoutRequest, generate_layout};

const ROOM_AREA_SHARE: f64 = 0.4;
const MAX_ROOM_ATTEMPTS: usize = 2000;
const MAZE_START_ATTEMPTS: usize = 100;
const SECOND_DOOR_CHANCE: f64 = 0.4;
const OBJECTIVE_COUNT: usize = 1;

pub struct SpaceshipGenerator {
    prng: Prng,
    width: usize,
    height: usize,
}

impl SpaceshipGenerator {
    pub fn new(seed: u64, width: usize, height: usize) -> Self {
        Self { prng: Prng::new(seed), width, height }
    }

    pub fn generate(&mut self, spawn_point_count: usize) -> Result<MapDefinition, GenerationError> {
        let request = LayoutRequest {
            kind: MapGeneratorType::Procedural,
            width: self.width,
            height: self.height,
            features: FeatureRequest { spawn_point_count, objective_count: OBJECTIVE_COUNT },
        };
        generate_layout(&request, &mut self.prng, carve_spaceship)
    }
}

fn carve_spaceship(prng: &mut Prng, blueprint: &mut Blueprint) {
    let rooms = scatter_rooms(prng, blueprint);
    carve_maze(prng, blueprint);
    for room in &rooms {
        connect_room(prng, blueprint, *room);
    }
    while patch_gaps(prng, blueprint) {}
}

fn scatter_rooms(prng: &mut Prng, blueprint: &mut Blueprint) -> Vec<RoomRect> {
    let width = blueprint.width as i32;
    let height = blueprint.height as i32;
    let target_area = (blueprint.width * blueprint.height) as f64 * ROOM_AREA_SHARE;

    let mut rooms: Vec<RoomRect> = Vec::new();
    let mut area = 0;
    let mut attempts = 0;
    while (area as f64) < target_area && attempts < MAX_ROOM_ATTEMPTS {
        attempts += 1;
        let w = prng.next_int(1, 2);
        let h = prng.next_int(1, 2);
        let x = prng.next_int(1, width - w - 1);
        let y = prng.next_int(1, height - h - 1);
        let candidate = RoomRect { x, y, width: w, height: h };
        if rooms.iter().any(|room| room.expanded(1).intersects(&candidate)) {
            continue;
        }
        blueprint.carve_room(candidate);
        rooms.push(candidate);
        area += w * h;
    }
    rooms
}

fn carve_maze(prng: &mut Prng, blueprint: &mut Blueprint) {
    let width = blueprint.width as i32;
    let height = blueprint.height as i32;

    let mut start = None;
    for _ in 0..MAZE_START_ATTEMPTS {
        let candidate = Vector2::new(prng.next_int(1, width - 2), prng.next_int(1, height - 2));
        if blueprint.is_void(candidate) {
            start = Some(candidate);
            break;
        }
    }
    let Some(start) = start else {
        return;
    };

    blueprint.carve(start, "corridor-maze");
    let mut stack = vec![start];
    while let Some(&current) = stack.last() {
        let mut directions = Direction::ALL;
        prng.shuffle(&mut directions);
        let next = directions
            .iter()
            .map(|&direction| current.offset(direction))
            .find(|&pos| blueprint.is_void(pos));
        match next {
            Some(next) => {
                blueprint.carve(next, "corridor-maze");
                blueprint.open(current, next);
                stack.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }
}

/// Doors from a room to the floor around it: one always, a second one
/// sometimes.
fn connect_room(prng: &mut Prng, blueprint: &mut Blueprint, room: RoomRect) {
    let connections: Vec<(Vector2, Vector2)> = room
        .cells()
        .flat_map(|cell| Direction::ALL.map(|direction| (cell, cell.offset(direction))))
        .filter(|&(_, outside)| !room.contains(outside) && blueprint.is_floor(outside))
        .collect();
    if connections.is_empty() {
        return;
    }

    let first = prng.next_index(connections.len());
    let (inside, outside) = connections[first];
    blueprint.add_door(inside, outside);

    if connections.len() > 1 && prng.chance(SECOND_DOOR_CHANCE) {
        let mut second = prng.next_index(connections.len() - 1);
        if second >= first {
            second += 1;
        }
        let (inside, outside) = connections[second];
        blueprint.add_door(inside, outside);
    }
}

/// Turns interior void cells bordering floor into corridor, each opened to
/// one random floor neighbour. Returns whether anything changed.
fn patch_gaps(prng: &mut Prng, blueprint: &mut Blueprint) -> bool {
    let width = blueprint.width as i32;
    let height = blueprint.height as i32;
    let mut changed = false;
    for index in 0..blueprint.width * blueprint.height {
        let pos = cell_at_index(blueprint.width, index);
        if pos.x < 1 || pos.y < 1 || pos.x > width - 2 || pos.y > height - 2 {
            continue;
        }
        if !blueprint.is_void(pos) {
            continue;
        }
        let neighbours: Vec<Vector2> = Direction::ALL
            .iter()
            .map(|&direction| pos.offset(direction))
            .filter(|&next| blueprint.is_floor(next))
            .collect();
        if let Some(&neighbour) = prng.pick(&neighbours) {
            blueprint.carve(pos, "corridor-patch");
            blueprint.open(pos, neighbour);
            changed = true;
        }
    }
    changed
}
