//! Reachability pruning applied to every map before it leaves the generator.

use crate::types::{BoundaryType, Vector2};

use super::graph::Graph;
use super::grid::cell_at_index;
use super::model::{Cell, MapDefinition, WallDefinition};

/// Returns a copy of `map` reduced to the Floor cells reachable from its
/// spawn points and squad spawns.
///
/// * Unreachable and Void cells are dropped; survivors come back in
///   row-major order with their room labels.
/// * Walls are rebuilt from the boundary graph: an existing wall survives
///   when either side is reachable, and any boundary between a reachable
///   and an unreachable cell becomes a wall.
/// * Doors survive only when both ends are reachable and adjacent.
///
/// Everything else is copied unchanged. The result is a fixed point:
/// sanitizing it again yields the same map.
pub fn sanitize(map: &MapDefinition) -> MapDefinition {
    let graph = Graph::new(map);
    let seeds = map
        .spawn_points
        .iter()
        .map(|spawn| spawn.pos)
        .chain(map.squad_positions());
    let reachable = graph.reachable_from(seeds);
    let is_reachable =
        |pos: Vector2| graph.index(pos).is_some_and(|index| reachable[index]);

    let cells = reachable
        .iter()
        .enumerate()
        .filter(|(_, hit)| **hit)
        .filter_map(|(index, _)| {
            let pos = cell_at_index(map.width, index);
            let cell = graph.cell(pos)?;
            Some(Cell::floor(pos, cell.room_id.map(str::to_string)))
        })
        .collect();

    let walls = graph
        .boundaries()
        .filter(|(a, b, boundary)| {
            let (reach_a, reach_b) = (is_reachable(*a), is_reachable(*b));
            match boundary.kind {
                BoundaryType::Wall => reach_a || reach_b,
                BoundaryType::Open | BoundaryType::Door => reach_a != reach_b,
            }
        })
        .map(|(a, b, _)| WallDefinition::between(a, b))
        .collect();

    let doors = map
        .doors
        .iter()
        .filter(|door| {
            let [a, b] = door.segment;
            a.is_adjacent(b) && is_reachable(a) && is_reachable(b)
        })
        .cloned()
        .collect();

    MapDefinition { cells, walls, doors, ..map.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::model::{Door, SpawnPoint};
    use crate::types::CellType;

    fn two_cell_map(blocked: bool) -> MapDefinition {
        let mut map = MapDefinition::empty(2, 1);
        map.cells.push(Cell::floor(Vector2::new(0, 0), None));
        map.cells.push(Cell::floor(Vector2::new(1, 0), None));
        map.spawn_points.push(SpawnPoint { id: "spawn-1".into(), pos: Vector2::new(0, 0), radius: 1 });
        if blocked {
            map.walls.push(WallDefinition::between(Vector2::new(0, 0), Vector2::new(1, 0)));
        }
        map
    }

    #[test]
    fn walled_off_cell_is_dropped() {
        let sanitized = sanitize(&two_cell_map(true));
        assert_eq!(sanitized.cells.len(), 1);
        assert_eq!(sanitized.cells[0].pos(), Vector2::new(0, 0));
        assert_eq!(sanitized.cells[0].kind, CellType::Floor);
    }

    #[test]
    fn open_neighbour_is_kept() {
        let sanitized = sanitize(&two_cell_map(false));
        assert_eq!(sanitized.cells.len(), 2);
        assert!(sanitized.cells.iter().all(|cell| cell.kind == CellType::Floor));
    }

    #[test]
    fn void_cells_are_omitted_and_walled() {
        let mut map = two_cell_map(false);
        map.cells[1].kind = CellType::Void;
        let sanitized = sanitize(&map);
        assert_eq!(sanitized.cells.len(), 1);
        assert!(
            sanitized
                .walls
                .contains(&WallDefinition::between(Vector2::new(0, 0), Vector2::new(1, 0)))
        );
    }

    #[test]
    fn doors_into_unreachable_cells_become_walls() {
        let mut map = MapDefinition::empty(3, 1);
        for x in 0..3 {
            map.cells.push(Cell::floor(Vector2::new(x, 0), None));
        }
        map.spawn_points.push(SpawnPoint { id: "spawn-1".into(), pos: Vector2::new(0, 0), radius: 1 });
        map.walls.push(WallDefinition::between(Vector2::new(0, 0), Vector2::new(1, 0)));
        map.doors.push(Door::closed("door-1", Vector2::new(1, 0), Vector2::new(2, 0)));

        let sanitized = sanitize(&map);
        assert!(sanitized.doors.is_empty());
        assert_eq!(sanitized.cells.len(), 1);
    }

    #[test]
    fn squad_spawns_also_seed_reachability() {
        let mut map = two_cell_map(true);
        map.squad_spawns.push(Vector2::new(1, 0));
        let sanitized = sanitize(&map);
        assert_eq!(sanitized.cells.len(), 2);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let mut map = MapDefinition::empty(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                map.cells.push(Cell::floor(Vector2::new(x, y), Some(format!("room-{x}"))));
            }
        }
        map.spawn_points.push(SpawnPoint { id: "spawn-1".into(), pos: Vector2::new(0, 0), radius: 1 });
        for y in 0..3 {
            map.walls.push(WallDefinition::between(Vector2::new(1, y), Vector2::new(2, y)));
        }
        map.doors.push(Door::closed("door-1", Vector2::new(0, 1), Vector2::new(1, 1)));

        let once = sanitize(&map);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
        assert_eq!(once.cells.len(), 6);
        assert_eq!(once.doors.len(), 1);
    }
}
