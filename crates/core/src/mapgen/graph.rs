//! Boundary and reachability model derived from a finished map definition.
//!
//! Cells live in a dense row-major array and every grid edge (rim edges
//! against the outside included) carries one [`Boundary`]. Between two
//! in-bounds cells the default is `Open`; walls and doors from the map
//! override it, doors last. Rim edges are always walls.

use std::collections::VecDeque;

use crate::types::{BoundaryType, CellType, Direction, Vector2};

use super::grid::{EdgeTable, cell_at_index, cell_index, in_bounds};
use super::model::MapDefinition;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Boundary<'a> {
    pub kind: BoundaryType,
    pub door_id: Option<&'a str>,
}

impl Boundary<'_> {
    pub const WALL: Boundary<'static> = Boundary { kind: BoundaryType::Wall, door_id: None };
    pub const OPEN: Boundary<'static> = Boundary { kind: BoundaryType::Open, door_id: None };

    /// Doors count as passable regardless of their runtime state.
    pub fn is_traversable(&self) -> bool {
        matches!(self.kind, BoundaryType::Open | BoundaryType::Door)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphCell<'a> {
    pub x: i32,
    pub y: i32,
    pub kind: CellType,
    pub room_id: Option<&'a str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellEdges<'a> {
    pub n: Boundary<'a>,
    pub e: Boundary<'a>,
    pub s: Boundary<'a>,
    pub w: Boundary<'a>,
}

impl<'a> CellEdges<'a> {
    pub fn get(&self, direction: Direction) -> Boundary<'a> {
        match direction {
            Direction::North => self.n,
            Direction::East => self.e,
            Direction::South => self.s,
            Direction::West => self.w,
        }
    }
}

pub struct Graph<'a> {
    width: usize,
    height: usize,
    cells: Vec<GraphCell<'a>>,
    boundaries: EdgeTable<Boundary<'a>>,
}

impl<'a> Graph<'a> {
    pub fn new(map: &'a MapDefinition) -> Self {
        let width = map.width;
        let height = map.height;

        let mut cells: Vec<GraphCell<'a>> = (0..width * height)
            .map(|index| {
                let pos = cell_at_index(width, index);
                GraphCell { x: pos.x, y: pos.y, kind: CellType::Void, room_id: None }
            })
            .collect();
        for cell in &map.cells {
            if let Some(index) = cell_index(width, height, cell.pos()) {
                cells[index].kind = cell.kind;
                cells[index].room_id = cell.room_id.as_deref();
            }
        }

        let mut boundaries: EdgeTable<Boundary<'a>> = EdgeTable::from_fn(width, height, |a, b| {
            if in_bounds(width, height, a) && in_bounds(width, height, b) {
                Boundary::OPEN
            } else {
                Boundary::WALL
            }
        });

        for wall in &map.walls {
            let (p1, p2) = (wall.p1, wall.p2);
            if p1.x == p2.x {
                let x = p1.x;
                for y in p1.y.min(p2.y)..p1.y.max(p2.y) {
                    boundaries.set(Vector2::new(x - 1, y), Vector2::new(x, y), Boundary::WALL);
                }
            } else if p1.y == p2.y {
                let y = p1.y;
                for x in p1.x.min(p2.x)..p1.x.max(p2.x) {
                    boundaries.set(Vector2::new(x, y - 1), Vector2::new(x, y), Boundary::WALL);
                }
            }
        }

        for door in &map.doors {
            let [a, b] = door.segment;
            boundaries.set(a, b, Boundary { kind: BoundaryType::Door, door_id: Some(&door.id) });
        }

        Self { width, height, cells, boundaries }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn index(&self, pos: Vector2) -> Option<usize> {
        cell_index(self.width, self.height, pos)
    }

    pub fn cell(&self, pos: Vector2) -> Option<&GraphCell<'a>> {
        self.index(pos).map(|index| &self.cells[index])
    }

    pub fn is_floor(&self, pos: Vector2) -> bool {
        self.cell(pos).is_some_and(|cell| cell.kind == CellType::Floor)
    }

    /// Boundary between two cells, or `None` when they are not orthogonal
    /// neighbours on this grid.
    pub fn boundary(&self, a: Vector2, b: Vector2) -> Option<Boundary<'a>> {
        self.boundaries.get(a, b)
    }

    pub fn edges(&self, pos: Vector2) -> Option<CellEdges<'a>> {
        self.cell(pos)?;
        let side = |direction: Direction| {
            self.boundaries.get(pos, pos.offset(direction)).unwrap_or(Boundary::WALL)
        };
        Some(CellEdges {
            n: side(Direction::North),
            e: side(Direction::East),
            s: side(Direction::South),
            w: side(Direction::West),
        })
    }

    pub fn boundaries(&self) -> impl Iterator<Item = (Vector2, Vector2, Boundary<'a>)> + '_ {
        self.boundaries.iter()
    }

    /// Row-major mask of Floor cells reachable from `seeds` through Open or
    /// Door boundaries. Seeds that are not Floor are ignored.
    pub fn reachable_from(&self, seeds: impl IntoIterator<Item = Vector2>) -> Vec<bool> {
        self.reachable_with(seeds, |boundary| boundary.is_traversable())
    }

    pub fn reachable_with(
        &self,
        seeds: impl IntoIterator<Item = Vector2>,
        passable: impl Fn(&Boundary<'a>) -> bool,
    ) -> Vec<bool> {
        let mut seen = vec![false; self.cells.len()];
        let mut open = VecDeque::new();
        for seed in seeds {
            if let Some(index) = self.index(seed)
                && self.cells[index].kind == CellType::Floor
                && !seen[index]
            {
                seen[index] = true;
                open.push_back(seed);
            }
        }

        while let Some(pos) = open.pop_front() {
            for direction in Direction::ALL {
                let next = pos.offset(direction);
                let Some(next_index) = self.index(next) else {
                    continue;
                };
                if seen[next_index] || self.cells[next_index].kind != CellType::Floor {
                    continue;
                }
                if !self.boundary(pos, next).is_some_and(|boundary| passable(&boundary)) {
                    continue;
                }
                seen[next_index] = true;
                open.push_back(next);
            }
        }

        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::model::{Cell, Door, WallDefinition};

    fn corridor_map(width: usize) -> MapDefinition {
        let mut map = MapDefinition::empty(width, 1);
        for x in 0..width as i32 {
            map.cells.push(Cell::floor(Vector2::new(x, 0), None));
        }
        map
    }

    #[test]
    fn rim_edges_are_walls_and_interior_edges_default_open() {
        let map = corridor_map(3);
        let graph = Graph::new(&map);
        let edges = graph.edges(Vector2::new(0, 0)).expect("in bounds");
        assert_eq!(edges.n.kind, BoundaryType::Wall);
        assert_eq!(edges.w.kind, BoundaryType::Wall);
        assert_eq!(edges.s.kind, BoundaryType::Wall);
        assert_eq!(edges.e.kind, BoundaryType::Open);
        assert!(graph.edges(Vector2::new(5, 0)).is_none());
    }

    #[test]
    fn boundary_is_none_for_non_neighbours() {
        let map = corridor_map(3);
        let graph = Graph::new(&map);
        assert!(graph.boundary(Vector2::new(0, 0), Vector2::new(2, 0)).is_none());
        assert!(graph.boundary(Vector2::new(0, 0), Vector2::new(0, 0)).is_none());
    }

    #[test]
    fn walls_hydrate_from_lattice_segments() {
        let mut map = corridor_map(4);
        map.walls.push(WallDefinition { p1: Vector2::new(2, 0), p2: Vector2::new(2, 1) });
        let graph = Graph::new(&map);
        assert_eq!(
            graph.boundary(Vector2::new(1, 0), Vector2::new(2, 0)).map(|b| b.kind),
            Some(BoundaryType::Wall)
        );
        assert_eq!(
            graph.boundary(Vector2::new(0, 0), Vector2::new(1, 0)).map(|b| b.kind),
            Some(BoundaryType::Open)
        );
    }

    #[test]
    fn long_wall_segments_cover_every_unit() {
        let mut map = MapDefinition::empty(3, 3);
        map.walls.push(WallDefinition { p1: Vector2::new(0, 1), p2: Vector2::new(3, 1) });
        let graph = Graph::new(&map);
        for x in 0..3 {
            let boundary = graph.boundary(Vector2::new(x, 0), Vector2::new(x, 1));
            assert_eq!(boundary, Some(Boundary::WALL));
        }
    }

    #[test]
    fn doors_override_walls_and_keep_their_id() {
        let mut map = corridor_map(2);
        map.walls.push(WallDefinition::between(Vector2::new(0, 0), Vector2::new(1, 0)));
        map.doors.push(Door::closed("door-7", Vector2::new(0, 0), Vector2::new(1, 0)));
        let graph = Graph::new(&map);
        let boundary = graph.boundary(Vector2::new(1, 0), Vector2::new(0, 0)).expect("adjacent");
        assert_eq!(boundary.kind, BoundaryType::Door);
        assert_eq!(boundary.door_id, Some("door-7"));
    }

    #[test]
    fn reachability_crosses_doors_but_not_walls() {
        let mut map = corridor_map(4);
        map.doors.push(Door::closed("door-1", Vector2::new(0, 0), Vector2::new(1, 0)));
        map.walls.push(WallDefinition::between(Vector2::new(2, 0), Vector2::new(3, 0)));
        let graph = Graph::new(&map);
        let reached = graph.reachable_from([Vector2::new(0, 0)]);
        assert_eq!(reached, vec![true, true, true, false]);
    }

    #[test]
    fn void_seeds_reach_nothing() {
        let map = MapDefinition::empty(2, 2);
        let graph = Graph::new(&map);
        assert!(graph.reachable_from([Vector2::new(0, 0)]).iter().all(|&hit| !hit));
    }
}
