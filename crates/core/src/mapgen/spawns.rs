//! Squad, extraction, enemy spawn, and objective placement on a carved layout.
//!
//! Every entity takes its own cell and sits in a room. The squad deploys in
//! one quadrant; the extraction goes to the opposite quadrant, or the
//! farthest occupied one when the opposite quadrant is empty. Enemy spawns
//! and objectives avoid the squad's rooms. When rooms run out, free corridor
//! cells are promoted to one-cell alcoves; when even that fails the pass
//! reports an error and the pipeline retries with a fresh layout.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::types::Vector2;

use super::grid::{quadrant, quadrant_distance};
use super::layout::{Blueprint, RoomCells};
use super::model::{ObjectiveDefinition, ObjectiveKind, SpawnPoint};
use super::seed::Prng;

pub const SQUAD_SPAWN_COUNT: usize = 2;
pub(super) const SPAWN_RADIUS: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct PlacedFeatures {
    pub(super) squad_spawns: Vec<Vector2>,
    pub(super) spawn_points: Vec<SpawnPoint>,
    pub(super) extraction: Vector2,
    pub(super) objectives: Vec<ObjectiveDefinition>,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct FeatureRequest {
    pub(super) spawn_point_count: usize,
    pub(super) objective_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(super) enum PlacementError {
    #[error("floor occupies {found} quadrant(s); squad and extraction need two")]
    TooFewQuadrants { found: usize },
    #[error("no quadrant holds {} floor cells for the squad", SQUAD_SPAWN_COUNT)]
    SquadQuadrantTooSmall,
    #[error("placed {placed} of {} squad spawns", SQUAD_SPAWN_COUNT)]
    SquadSpawns { placed: usize },
    #[error("no free cell for the extraction in quadrant {quadrant}")]
    Extraction { quadrant: usize },
    #[error("placed {placed} of {needed} enemy spawn points")]
    EnemySpawns { needed: usize, placed: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Squad,
    Extraction,
    Enemy,
    Objective,
}

#[derive(Default)]
struct Claims {
    cells: BTreeSet<Vector2>,
    squad_rooms: BTreeSet<String>,
    enemy_rooms: BTreeSet<String>,
    extraction_room: Option<String>,
}

impl Claims {
    fn is_free(&self, pos: Vector2) -> bool {
        !self.cells.contains(&pos)
    }

    fn claim(&mut self, pos: Vector2, label: &str, role: Role) {
        self.cells.insert(pos);
        let label = label.to_string();
        match role {
            Role::Squad => {
                self.squad_rooms.insert(label);
            }
            Role::Enemy => {
                self.enemy_rooms.insert(label);
            }
            Role::Objective => {}
            Role::Extraction => self.extraction_room = Some(label),
        }
    }

    fn is_extraction_room(&self, label: &str) -> bool {
        self.extraction_room.as_deref() == Some(label)
    }
}

pub(super) fn place_features(
    blueprint: &mut Blueprint,
    prng: &mut Prng,
    request: FeatureRequest,
) -> Result<PlacedFeatures, PlacementError> {
    let (width, height) = (blueprint.width, blueprint.height);
    let mut quadrant_sizes = [0_usize; 4];
    for pos in blueprint.floor_cells() {
        quadrant_sizes[quadrant(width, height, pos)] += 1;
    }
    let occupied = quadrant_sizes.iter().filter(|&&size| size > 0).count();
    if occupied < 2 {
        return Err(PlacementError::TooFewQuadrants { found: occupied });
    }

    let squad_candidates: Vec<usize> =
        (0..4).filter(|&q| quadrant_sizes[q] >= SQUAD_SPAWN_COUNT).collect();
    let squad_quadrant =
        *prng.pick(&squad_candidates).ok_or(PlacementError::SquadQuadrantTooSmall)?;

    let mut claims = Claims::default();
    let squad_spawns = place_squad(blueprint, prng, squad_quadrant, &mut claims)?;

    let extraction_quadrant = pick_extraction_quadrant(squad_quadrant, &quadrant_sizes);
    let extraction = place_extraction(blueprint, prng, extraction_quadrant, &mut claims)?;

    let enemies = place_enemies(blueprint, prng, request.spawn_point_count, &mut claims)?;
    let spawn_points = enemies
        .into_iter()
        .enumerate()
        .map(|(index, pos)| SpawnPoint {
            id: format!("spawn-{}", index + 1),
            pos,
            radius: SPAWN_RADIUS,
        })
        .collect();

    let objectives = place_objectives(blueprint, prng, request.objective_count, &mut claims)
        .into_iter()
        .enumerate()
        .map(|(index, pos)| ObjectiveDefinition {
            id: format!("obj-{}", index + 1),
            kind: ObjectiveKind::Recover,
            target_cell: Some(pos),
        })
        .collect();

    Ok(PlacedFeatures { squad_spawns, spawn_points, extraction, objectives })
}

fn pick_extraction_quadrant(squad_quadrant: usize, quadrant_sizes: &[usize; 4]) -> usize {
    let opposite = 3 - squad_quadrant;
    if quadrant_sizes[opposite] > 0 {
        return opposite;
    }
    (0..4)
        .filter(|&q| q != squad_quadrant && quadrant_sizes[q] > 0)
        .max_by_key(|&q| (quadrant_distance(squad_quadrant, q), Reverse(q)))
        .unwrap_or(opposite)
}

/// Rooms whose cells fall inside `area`, restricted to those cells.
fn rooms_within(blueprint: &Blueprint, area: impl Fn(Vector2) -> bool) -> Vec<RoomCells> {
    blueprint
        .rooms()
        .into_iter()
        .filter_map(|room| {
            let cells: Vec<Vector2> = room.cells.into_iter().filter(|&pos| area(pos)).collect();
            (!cells.is_empty()).then_some(RoomCells { label: room.label, cells })
        })
        .collect()
}

/// One claim per room, in shuffled room order, each on a random free cell.
fn claim_one_per_room(
    prng: &mut Prng,
    rooms: &mut [RoomCells],
    claims: &mut Claims,
    role: Role,
    needed: usize,
    placed: &mut Vec<Vector2>,
) {
    prng.shuffle(rooms);
    for room in rooms.iter() {
        if placed.len() >= needed {
            return;
        }
        let free: Vec<Vector2> =
            room.cells.iter().copied().filter(|&pos| claims.is_free(pos)).collect();
        if let Some(&pos) = prng.pick(&free) {
            claims.claim(pos, &room.label, role);
            placed.push(pos);
        }
    }
}

/// Any remaining free cells of `rooms`, shuffled.
fn claim_spare_cells(
    prng: &mut Prng,
    rooms: &[RoomCells],
    claims: &mut Claims,
    role: Role,
    needed: usize,
    placed: &mut Vec<Vector2>,
) {
    if placed.len() >= needed {
        return;
    }
    let mut spare: Vec<(Vector2, &str)> = rooms
        .iter()
        .flat_map(|room| room.cells.iter().map(move |&pos| (pos, room.label.as_str())))
        .filter(|&(pos, _)| claims.is_free(pos))
        .collect();
    prng.shuffle(&mut spare);
    for (pos, label) in spare.into_iter().take(needed - placed.len()) {
        claims.claim(pos, label, role);
        placed.push(pos);
    }
}

fn claim_alcoves(
    blueprint: &mut Blueprint,
    prng: &mut Prng,
    area: impl Fn(Vector2) -> bool,
    claims: &mut Claims,
    role: Role,
    needed: usize,
    placed: &mut Vec<Vector2>,
) {
    if placed.len() >= needed {
        return;
    }
    let mut corridor: Vec<Vector2> = blueprint
        .floor_cells()
        .into_iter()
        .filter(|&pos| !blueprint.is_room(pos) && claims.is_free(pos) && area(pos))
        .collect();
    prng.shuffle(&mut corridor);
    for pos in corridor.into_iter().take(needed - placed.len()) {
        let label = blueprint.promote_to_alcove(pos);
        claims.claim(pos, &label, role);
        placed.push(pos);
    }
}

fn place_squad(
    blueprint: &mut Blueprint,
    prng: &mut Prng,
    squad_quadrant: usize,
    claims: &mut Claims,
) -> Result<Vec<Vector2>, PlacementError> {
    let (width, height) = (blueprint.width, blueprint.height);
    let in_quadrant = |pos: Vector2| quadrant(width, height, pos) == squad_quadrant;

    let mut placed = Vec::with_capacity(SQUAD_SPAWN_COUNT);
    let mut rooms = rooms_within(blueprint, in_quadrant);
    claim_one_per_room(prng, &mut rooms, claims, Role::Squad, SQUAD_SPAWN_COUNT, &mut placed);

    let squad_rooms: Vec<RoomCells> =
        rooms.into_iter().filter(|room| claims.squad_rooms.contains(&room.label)).collect();
    claim_spare_cells(prng, &squad_rooms, claims, Role::Squad, SQUAD_SPAWN_COUNT, &mut placed);
    claim_alcoves(
        blueprint,
        prng,
        in_quadrant,
        claims,
        Role::Squad,
        SQUAD_SPAWN_COUNT,
        &mut placed,
    );

    if placed.len() < SQUAD_SPAWN_COUNT {
        return Err(PlacementError::SquadSpawns { placed: placed.len() });
    }
    Ok(placed)
}

fn place_extraction(
    blueprint: &mut Blueprint,
    prng: &mut Prng,
    extraction_quadrant: usize,
    claims: &mut Claims,
) -> Result<Vector2, PlacementError> {
    let (width, height) = (blueprint.width, blueprint.height);
    let in_quadrant = |pos: Vector2| quadrant(width, height, pos) == extraction_quadrant;

    let mut placed = Vec::with_capacity(1);
    let mut rooms: Vec<RoomCells> = rooms_within(blueprint, in_quadrant)
        .into_iter()
        .filter(|room| !claims.squad_rooms.contains(&room.label))
        .collect();
    claim_one_per_room(prng, &mut rooms, claims, Role::Extraction, 1, &mut placed);
    claim_alcoves(blueprint, prng, in_quadrant, claims, Role::Extraction, 1, &mut placed);

    placed
        .first()
        .copied()
        .ok_or(PlacementError::Extraction { quadrant: extraction_quadrant })
}

fn place_enemies(
    blueprint: &mut Blueprint,
    prng: &mut Prng,
    needed: usize,
    claims: &mut Claims,
) -> Result<Vec<Vector2>, PlacementError> {
    let mut placed = Vec::with_capacity(needed);
    let mut rooms: Vec<RoomCells> = blueprint
        .rooms()
        .into_iter()
        .filter(|room| {
            !claims.squad_rooms.contains(&room.label) && !claims.is_extraction_room(&room.label)
        })
        .collect();
    claim_one_per_room(prng, &mut rooms, claims, Role::Enemy, needed, &mut placed);
    claim_spare_cells(prng, &rooms, claims, Role::Enemy, needed, &mut placed);
    claim_alcoves(blueprint, prng, |_| true, claims, Role::Enemy, needed, &mut placed);

    if placed.len() < needed {
        return Err(PlacementError::EnemySpawns { needed, placed: placed.len() });
    }
    Ok(placed)
}

/// Objectives are optional; fewer than requested is not an error.
fn place_objectives(
    blueprint: &mut Blueprint,
    prng: &mut Prng,
    needed: usize,
    claims: &mut Claims,
) -> Vec<Vector2> {
    let mut placed = Vec::with_capacity(needed);
    let mut rooms: Vec<RoomCells> = blueprint
        .rooms()
        .into_iter()
        .filter(|room| {
            !claims.squad_rooms.contains(&room.label)
                && !claims.enemy_rooms.contains(&room.label)
                && !claims.is_extraction_room(&room.label)
        })
        .collect();
    claim_one_per_room(prng, &mut rooms, claims, Role::Objective, needed, &mut placed);
    claim_alcoves(blueprint, prng, |_| true, claims, Role::Objective, needed, &mut placed);
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::layout::RoomRect;

    fn four_room_blueprint() -> Blueprint {
        let mut blueprint = Blueprint::new(8, 8);
        for (x, y) in [(0, 0), (5, 0), (0, 5), (5, 5)] {
            blueprint.carve_room(RoomRect { x, y, width: 2, height: 2 });
        }
        for x in 0..8 {
            blueprint.carve(Vector2::new(x, 3), "corridor-spine");
        }
        blueprint
    }

    #[test]
    fn extraction_prefers_the_opposite_quadrant() {
        assert_eq!(pick_extraction_quadrant(0, &[3, 3, 3, 3]), 3);
        assert_eq!(pick_extraction_quadrant(2, &[3, 3, 3, 3]), 1);
    }

    #[test]
    fn extraction_falls_back_to_the_farthest_occupied_quadrant() {
        assert_eq!(pick_extraction_quadrant(0, &[3, 0, 2, 0]), 2);
        assert_eq!(pick_extraction_quadrant(0, &[3, 2, 2, 0]), 1);
    }

    #[test]
    fn placement_keeps_entities_apart_and_in_rooms() {
        let mut blueprint = four_room_blueprint();
        let mut prng = Prng::new(42);
        let request = FeatureRequest { spawn_point_count: 3, objective_count: 1 };
        let features = place_features(&mut blueprint, &mut prng, request).expect("placement");

        assert_eq!(features.squad_spawns.len(), SQUAD_SPAWN_COUNT);
        assert_eq!(features.spawn_points.len(), 3);

        let mut cells: Vec<Vector2> = features.squad_spawns.clone();
        cells.push(features.extraction);
        cells.extend(features.spawn_points.iter().map(|spawn| spawn.pos));
        cells.extend(features.objectives.iter().filter_map(|objective| objective.target_cell));
        let unique: BTreeSet<Vector2> = cells.iter().copied().collect();
        assert_eq!(unique.len(), cells.len(), "entities must not share cells");
        assert!(cells.iter().all(|&pos| blueprint.is_room(pos)));

        let squad_quadrant = quadrant(8, 8, features.squad_spawns[0]);
        for &pos in &features.squad_spawns {
            assert_eq!(quadrant(8, 8, pos), squad_quadrant);
        }
        assert_eq!(quadrant(8, 8, features.extraction), 3 - squad_quadrant);
    }

    #[test]
    fn corridor_only_layouts_fall_back_to_alcoves() {
        let mut blueprint = Blueprint::new(8, 8);
        for x in 0..8 {
            blueprint.carve(Vector2::new(x, 3), "corridor-spine");
            blueprint.carve(Vector2::new(x, 4), "corridor-spine");
        }
        let mut prng = Prng::new(9);
        let request = FeatureRequest { spawn_point_count: 2, objective_count: 1 };
        let features = place_features(&mut blueprint, &mut prng, request).expect("placement");
        assert_eq!(features.squad_spawns.len(), SQUAD_SPAWN_COUNT);
        assert!(features.squad_spawns.iter().all(|&pos| blueprint.is_room(pos)));
        assert!(blueprint.is_room(features.extraction));
    }

    #[test]
    fn single_quadrant_layouts_are_rejected() {
        let mut blueprint = Blueprint::new(8, 8);
        blueprint.carve_room(RoomRect { x: 0, y: 0, width: 2, height: 2 });
        let mut prng = Prng::new(1);
        let request = FeatureRequest { spawn_point_count: 1, objective_count: 0 };
        assert_eq!(
            place_features(&mut blueprint, &mut prng, request),
            Err(PlacementError::TooFewQuadrants { found: 1 })
        );
    }
}
