//! Sparse tree-shaped ship: a corridor skeleton with rooms budding off it.
//!
//! The skeleton is a fishbone (one aorta with perpendicular arteries) or,
//! on larger maps, a cross. Rooms grow from a randomized frontier; each room
//! touches no floor except its parent cell and joins it through exactly one
//! door, so the region graph stays a tree.

use crate::error::GenerationError;
use crate::types::{Direction, MapGeneratorType, Vector2};

use super::super::layout::{Blueprint, RoomRect};
use super::super::model::MapDefinition;
use super::super::seed::Prng;
use super::super::spawns::FeatureRequest;
use super::pipeline::{LayoutRequest, generate_layout};

const CROSS_MIN_SIDE: usize = 12;
const FISHBONE_CHANCE: f64 = 0.6;
const ARTERY_SPACING: i32 = 4;
const ARTERY_CHANCE: f64 = 0.8;
const CROSS_ARTERY_CHANCE: f64 = 0.7;
const ROOM_ATTEMPT_CHANCE: f64 = 0.4;
const BRANCH_CHANCE: f64 = 0.5;
const OBJECTIVE_COUNT: usize = 1;

pub(super) const ROOM_SHAPES: [(i32, i32); 4] = [(2, 2), (2, 1), (1, 2), (1, 1)];

pub struct TreeShipGenerator {
    prng: Prng,
    width: usize,
    height: usize,
}

impl TreeShipGenerator {
    pub fn new(seed: u64, width: usize, height: usize) -> Self {
        Self { prng: Prng::new(seed), width, height }
    }

    pub fn generate(&mut self, spawn_point_count: usize) -> Result<MapDefinition, GenerationError> {
        let request = LayoutRequest {
            kind: MapGeneratorType::TreeShip,
            width: self.width,
            height: self.height,
            features: FeatureRequest { spawn_point_count, objective_count: OBJECTIVE_COUNT },
        };
        generate_layout(&request, &mut self.prng, carve_tree_ship)
    }
}

#[derive(Clone, Copy, Debug)]
struct FrontierEdge {
    parent: Vector2,
    direction: Direction,
}

fn carve_tree_ship(prng: &mut Prng, blueprint: &mut Blueprint) {
    let spine = if blueprint.width.min(blueprint.height) < CROSS_MIN_SIDE
        || prng.chance(FISHBONE_CHANCE)
    {
        carve_fishbone(prng, blueprint)
    } else {
        carve_cross(prng, blueprint)
    };

    let mut frontier: Vec<FrontierEdge> = spine
        .iter()
        .flat_map(|&parent| Direction::ALL.map(|direction| FrontierEdge { parent, direction }))
        .filter(|edge| blueprint.is_void(edge.parent.offset(edge.direction)))
        .collect();

    while !frontier.is_empty() {
        let edge = frontier.remove(prng.next_index(frontier.len()));
        if !prng.chance(ROOM_ATTEMPT_CHANCE) {
            continue;
        }
        let Some(room) = try_place_room(prng, blueprint, edge) else {
            continue;
        };
        for cell in room.cells() {
            for direction in Direction::ALL {
                if direction == edge.direction.opposite() {
                    continue;
                }
                if blueprint.is_void(cell.offset(direction)) && prng.chance(BRANCH_CHANCE) {
                    frontier.push(FrontierEdge { parent: cell, direction });
                }
            }
        }
    }
}

/// Carves a straight corridor run from `from` (exclusive) for up to `reach`
/// cells, stopping at the inner margin or at existing floor.
fn carve_run(
    blueprint: &mut Blueprint,
    from: Vector2,
    direction: Direction,
    reach: i32,
    label: &str,
    spine: &mut Vec<Vector2>,
) {
    let mut previous = from;
    for _ in 0..reach {
        let cell = previous.offset(direction);
        let inside = cell.x >= 1
            && cell.y >= 1
            && cell.x <= blueprint.width as i32 - 2
            && cell.y <= blueprint.height as i32 - 2;
        if !inside || blueprint.is_floor(cell) {
            break;
        }
        blueprint.carve(cell, label);
        blueprint.open(previous, cell);
        spine.push(cell);
        previous = cell;
    }
}

fn carve_fishbone(prng: &mut Prng, blueprint: &mut Blueprint) -> Vec<Vector2> {
    let horizontal = blueprint.width >= blueprint.height;
    let (long, short) = if horizontal {
        (blueprint.width as i32, blueprint.height as i32)
    } else {
        (blueprint.height as i32, blueprint.width as i32)
    };
    let at = |along: i32, across: i32| {
        if horizontal { Vector2::new(along, across) } else { Vector2::new(across, along) }
    };
    let (forward, sides) = if horizontal {
        (Direction::East, [Direction::North, Direction::South])
    } else {
        (Direction::South, [Direction::West, Direction::East])
    };

    let aorta = (short / 2 + prng.next_int(-1, 1)).clamp(1, short - 2);
    let start = at(1, aorta);
    let label = if horizontal { "corridor-aorta-h" } else { "corridor-aorta-v" };
    blueprint.carve(start, label);
    let mut spine = vec![start];
    carve_run(blueprint, start, forward, long - 3, label, &mut spine);

    let mut along = 3;
    while along <= long - 4 {
        if prng.chance(ARTERY_CHANCE) {
            let label = format!("corridor-artery-{along}");
            for side in sides {
                let reach = prng.next_int(2, (short / 2 - 2).max(2));
                carve_run(blueprint, at(along, aorta), side, reach, &label, &mut spine);
            }
        }
        along += ARTERY_SPACING;
    }
    spine
}

fn carve_cross(prng: &mut Prng, blueprint: &mut Blueprint) -> Vec<Vector2> {
    let width = blueprint.width as i32;
    let height = blueprint.height as i32;
    let mid_x = (width / 2 + prng.next_int(-1, 1)).clamp(1, width - 2);
    let mid_y = (height / 2 + prng.next_int(-1, 1)).clamp(1, height - 2);

    let mut spine = Vec::new();
    let west_end = Vector2::new(1, mid_y);
    blueprint.carve(west_end, "corridor-main-h");
    spine.push(west_end);
    carve_run(blueprint, west_end, Direction::East, width - 3, "corridor-main-h", &mut spine);

    let hub = Vector2::new(mid_x, mid_y);
    carve_run(blueprint, hub, Direction::North, mid_y - 1, "corridor-main-v", &mut spine);
    carve_run(blueprint, hub, Direction::South, height - 2 - mid_y, "corridor-main-v", &mut spine);

    let mut x = 2;
    while x <= width - 3 {
        if (x - mid_x).abs() >= 3 && prng.chance(CROSS_ARTERY_CHANCE) {
            let label = format!("corridor-rib-x{x}");
            for side in [Direction::North, Direction::South] {
                let reach = prng.next_int(2, height / 4 + 2);
                carve_run(blueprint, Vector2::new(x, mid_y), side, reach, &label, &mut spine);
            }
        }
        x += ARTERY_SPACING;
    }

    let mut y = 2;
    while y <= height - 3 {
        if (y - mid_y).abs() >= 3 && prng.chance(CROSS_ARTERY_CHANCE) {
            let label = format!("corridor-rib-y{y}");
            for side in [Direction::West, Direction::East] {
                let reach = prng.next_int(2, width / 4 + 2);
                carve_run(blueprint, Vector2::new(mid_x, y), side, reach, &label, &mut spine);
            }
        }
        y += ARTERY_SPACING;
    }
    spine
}

/// Top-left corners of every `w x h` room that contains `target` and lies
/// flush against the parent's side.
fn room_origins(target: Vector2, direction: Direction, w: i32, h: i32) -> Vec<Vector2> {
    match direction {
        Direction::North | Direction::South => {
            let y = if direction == Direction::North { target.y - h + 1 } else { target.y };
            (target.x - w + 1..=target.x).map(|x| Vector2::new(x, y)).collect()
        }
        Direction::East | Direction::West => {
            let x = if direction == Direction::West { target.x - w + 1 } else { target.x };
            (target.y - h + 1..=target.y).map(|y| Vector2::new(x, y)).collect()
        }
    }
}

fn room_fits(blueprint: &Blueprint, room: RoomRect, parent: Vector2) -> bool {
    room.cells().all(|cell| {
        blueprint.is_void(cell)
            && Direction::ALL.iter().all(|&direction| {
                let neighbour = cell.offset(direction);
                room.contains(neighbour) || neighbour == parent || !blueprint.is_floor(neighbour)
            })
    })
}

fn try_place_room(prng: &mut Prng, blueprint: &mut Blueprint, edge: FrontierEdge) -> Option<RoomRect> {
    let target = edge.parent.offset(edge.direction);
    for (w, h) in ROOM_SHAPES {
        let mut origins = room_origins(target, edge.direction, w, h);
        prng.shuffle(&mut origins);
        for origin in origins {
            let room = RoomRect { x: origin.x, y: origin.y, width: w, height: h };
            if room_fits(blueprint, room, edge.parent) {
                blueprint.carve_room(room);
                blueprint.add_door(edge.parent, target);
                return Some(room);
            }
        }
    }
    None
}
