//! Packed ship: a crossing pair of spine corridors, then greedy fill passes
//! that bud small rooms off any floor until nothing else fits.

use crate::error::GenerationError;
use crate::types::{Direction, MapGeneratorType, Vector2};

use super::super::grid::cell_at_index;
use super::super::layout::{Blueprint, RoomRect};
use super::super::model::MapDefinition;
use super::super::seed::Prng;
use super::super::spawns::FeatureRequest;
use super::pipeline::{LayoutRequest, generate_layout};
use super::tree_ship::ROOM_SHAPES;

const SPINE_COVERAGE: f64 = 0.75;
const EXTRA_DOOR_CHANCE: f64 = 0.08;
const OBJECTIVE_COUNT: usize = 2;

pub struct DenseShipGenerator {
    prng: Prng,
    width: usize,
    height: usize,
}

impl DenseShipGenerator {
    pub fn new(seed: u64, width: usize, height: usize) -> Self {
        Self { prng: Prng::new(seed), width, height }
    }

    pub fn generate(&mut self, spawn_point_count: usize) -> Result<MapDefinition, GenerationError> {
        let request = LayoutRequest {
            kind: MapGeneratorType::DenseShip,
            width: self.width,
            height: self.height,
            features: FeatureRequest { spawn_point_count, objective_count: OBJECTIVE_COUNT },
        };
        generate_layout(&request, &mut self.prng, carve_dense_ship)
    }
}

fn carve_dense_ship(prng: &mut Prng, blueprint: &mut Blueprint) {
    build_frame(prng, blueprint);
    while fill_pass(prng, blueprint) {}
    add_cross_doors(prng, blueprint);
}

fn min_span(side: usize) -> i32 {
    (side as f64 * SPINE_COVERAGE).ceil() as i32
}

fn build_frame(prng: &mut Prng, blueprint: &mut Blueprint) {
    let width = blueprint.width as i32;
    let height = blueprint.height as i32;

    let h_y = prng.next_int(2, height - 3);
    let h_len = prng.next_int(min_span(blueprint.width), width);
    let h_x = prng.next_int(0, width - h_len);
    for x in h_x..h_x + h_len {
        let cell = Vector2::new(x, h_y);
        blueprint.carve(cell, "corridor-spine-h");
        if x > h_x {
            blueprint.open(cell.offset(Direction::West), cell);
        }
    }

    // The vertical spine always crosses the horizontal one.
    let v_x = prng.next_int(h_x.max(2), (width - 3).min(h_x + h_len - 1));
    let v_len = prng.next_int(min_span(blueprint.height), height);
    let v_y = prng.next_int((h_y - v_len + 1).max(0), h_y.min(height - v_len));
    for y in v_y..v_y + v_len {
        let cell = Vector2::new(v_x, y);
        if y != h_y {
            blueprint.carve(cell, "corridor-spine-v");
        }
        if y > v_y {
            blueprint.open(cell.offset(Direction::North), cell);
        }
    }
}

/// One sweep over the grid in shuffled order. Returns whether any room was
/// placed.
fn fill_pass(prng: &mut Prng, blueprint: &mut Blueprint) -> bool {
    let mut indices: Vec<usize> = (0..blueprint.width * blueprint.height).collect();
    prng.shuffle(&mut indices);

    let mut placed_any = false;
    for index in indices {
        let target = cell_at_index(blueprint.width, index);
        if !blueprint.is_void(target) {
            continue;
        }
        let parents: Vec<Vector2> = Direction::ALL
            .iter()
            .map(|&direction| target.offset(direction))
            .filter(|&pos| blueprint.is_floor(pos))
            .collect();
        let Some(&parent) = prng.pick(&parents) else {
            continue;
        };
        if let Some(room) = fit_room(prng, blueprint, target) {
            blueprint.carve_room(room);
            blueprint.add_door(parent, target);
            placed_any = true;
        }
    }
    placed_any
}

fn fit_room(prng: &mut Prng, blueprint: &Blueprint, target: Vector2) -> Option<RoomRect> {
    for (w, h) in ROOM_SHAPES {
        let mut offsets: Vec<(i32, i32)> =
            (0..h).flat_map(|dy| (0..w).map(move |dx| (dx, dy))).collect();
        prng.shuffle(&mut offsets);
        for (dx, dy) in offsets {
            let room = RoomRect { x: target.x - dx, y: target.y - dy, width: w, height: h };
            if room.cells().all(|cell| blueprint.is_void(cell)) {
                return Some(room);
            }
        }
    }
    None
}

/// Sprinkles doors between neighbouring rooms so the layout is not a pure
/// tree of dead ends.
fn add_cross_doors(prng: &mut Prng, blueprint: &mut Blueprint) {
    for pos in blueprint.floor_cells() {
        for direction in [Direction::East, Direction::South] {
            let next = pos.offset(direction);
            if !blueprint.is_room(pos) || !blueprint.is_room(next) {
                continue;
            }
            if blueprint.label(pos) == blueprint.label(next) {
                continue;
            }
            if prng.chance(EXTRA_DOOR_CHANCE) {
                blueprint.add_door(pos, next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_spines_cross() {
        for seed in 0..50_u64 {
            let mut blueprint = Blueprint::new(10, 12);
            build_frame(&mut Prng::new(seed), &mut blueprint);
            let horizontal = blueprint
                .floor_cells()
                .into_iter()
                .filter(|&pos| blueprint.label(pos) == Some("corridor-spine-h"))
                .count();
            assert!(horizontal >= 8, "seed {seed}: spine covers most of the width");
            assert_eq!(blueprint.retain_largest_component(), 0, "seed {seed}");
        }
    }

    #[test]
    fn fill_passes_leave_no_room_sized_gap() {
        let mut blueprint = Blueprint::new(12, 12);
        let mut prng = Prng::new(77);
        build_frame(&mut prng, &mut blueprint);
        while fill_pass(&mut prng, &mut blueprint) {}
        for index in 0..blueprint.width * blueprint.height {
            let pos = cell_at_index(blueprint.width, index);
            if blueprint.is_void(pos) {
                let touches_floor =
                    Direction::ALL.iter().any(|&direction| blueprint.is_floor(pos.offset(direction)));
                assert!(!touches_floor, "void {pos} next to floor survived the fill");
            }
        }
    }

    #[test]
    fn dense_ships_are_packed() {
        for seed in 0..10_u64 {
            let map = DenseShipGenerator::new(seed, 16, 16).generate(2).expect("generates");
            assert!(map.fill_rate() > 0.85, "seed {seed}: fill {}", map.fill_rate());
            assert_eq!(map.objectives.len(), OBJECTIVE_COUNT);
        }
    }
}
