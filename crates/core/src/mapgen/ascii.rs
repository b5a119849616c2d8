//! Text rendering of floor plans, and the reverse parse used for
//! hand-drawn static maps and golden snapshots.
//!
//! A `w x h` map becomes a `(2w + 1) x (2h + 1)` character grid. Cells sit
//! at odd coordinates, boundaries between them at mixed parity and corners
//! at even coordinates:
//!
//! ```text
//! +-+-+-+
//! |P  IS|
//! +-+ +-+
//! |#|E|#|
//! +-+-+-+
//! ```
//!
//! `#` is Void, `-`/`|` are walls, `=`/`I` are doors, and the markers are
//! `P` squad spawn, `S` enemy spawn, `E` extraction, `O` objective and `$`
//! loot.

use std::collections::VecDeque;

use crate::error::AsciiMapError;
use crate::types::{BoundaryType, CellType, Direction, MapGeneratorType, Vector2};

use super::graph::{Boundary, Graph};
use super::model::{
    Cell, Door, MapDefinition, ObjectiveDefinition, ObjectiveKind, SpawnPoint, WallDefinition,
};
use super::spawns::SPAWN_RADIUS;

const VERTICAL_WALLS: [char; 3] = ['|', 'I', '#'];
const HORIZONTAL_WALLS: [char; 3] = ['-', '=', '#'];

pub fn render(map: &MapDefinition) -> String {
    let graph = Graph::new(map);
    let rows = map.height * 2 + 1;
    let columns = map.width * 2 + 1;
    let mut grid = vec![vec![' '; columns]; rows];
    let squad = map.squad_positions();

    for y in 0..map.height {
        for x in 0..map.width {
            let pos = Vector2::new(x as i32, y as i32);
            let (row, column) = (y * 2 + 1, x * 2 + 1);
            grid[row][column] = if graph.is_floor(pos) { marker(map, &squad, pos) } else { '#' };

            let Some(edges) = graph.edges(pos) else {
                continue;
            };
            let glyph = |boundary: Boundary<'_>, wall: char, door: char| {
                match (boundary.kind, boundary.door_id) {
                    (BoundaryType::Open, _) => None,
                    (_, Some(_)) => Some(door),
                    _ => Some(wall),
                }
            };
            if let Some(c) = glyph(edges.n, '-', '=') {
                grid[row - 1][column] = c;
            }
            if let Some(c) = glyph(edges.s, '-', '=') {
                grid[row + 1][column] = c;
            }
            if let Some(c) = glyph(edges.e, '|', 'I') {
                grid[row][column + 1] = c;
            }
            if let Some(c) = glyph(edges.w, '|', 'I') {
                grid[row][column - 1] = c;
            }
        }
    }

    for row in (0..rows).step_by(2) {
        for column in (0..columns).step_by(2) {
            if grid[row][column] != ' ' {
                continue;
            }
            let mut walls = 0;
            if row > 0 && VERTICAL_WALLS.contains(&grid[row - 1][column]) {
                walls += 1;
            }
            if row + 1 < rows && VERTICAL_WALLS.contains(&grid[row + 1][column]) {
                walls += 1;
            }
            if column > 0 && HORIZONTAL_WALLS.contains(&grid[row][column - 1]) {
                walls += 1;
            }
            if column + 1 < columns && HORIZONTAL_WALLS.contains(&grid[row][column + 1]) {
                walls += 1;
            }
            if walls >= 2 {
                grid[row][column] = '+';
            }
        }
    }

    grid.into_iter().map(|line| line.into_iter().collect::<String>()).collect::<Vec<_>>().join("\n")
}

fn marker(map: &MapDefinition, squad: &[Vector2], pos: Vector2) -> char {
    if squad.contains(&pos) {
        'P'
    } else if map.spawn_points.iter().any(|spawn| spawn.pos == pos) {
        'S'
    } else if map.extraction == Some(pos) {
        'E'
    } else if map.objectives.iter().any(|objective| objective.target_cell == Some(pos)) {
        'O'
    } else if map.bonus_loot.contains(&pos) {
        '$'
    } else {
        ' '
    }
}

/// Reads a rendered grid back into a static map. Floor regions joined by
/// open boundaries each become one room (`room-1`, `room-2`, ...).
pub fn parse(text: &str) -> Result<MapDefinition, AsciiMapError> {
    let lines: Vec<Vec<char>> =
        text.lines().filter(|line| !line.is_empty()).map(|line| line.chars().collect()).collect();
    let columns = lines.first().map_or(0, Vec::len);
    if lines.len() < 3 || columns < 3 {
        return Err(AsciiMapError::TooSmall);
    }
    if let Some((row, line)) = lines.iter().enumerate().find(|(_, line)| line.len() != columns) {
        return Err(AsciiMapError::RaggedRow { row, found: line.len(), expected: columns });
    }

    let width = (columns - 1) / 2;
    let height = (lines.len() - 1) / 2;
    let mut map = MapDefinition::empty(width, height);
    map.generator_name = Some(MapGeneratorType::Static);
    let mut floor = vec![false; width * height];

    for y in 0..height {
        for x in 0..width {
            let (row, column) = (y * 2 + 1, x * 2 + 1);
            let pos = Vector2::new(x as i32, y as i32);
            let glyph = lines[row][column];
            if glyph != '#' {
                floor[y * width + x] = true;
            }
            match glyph {
                'P' => {
                    map.squad_spawns.push(pos);
                    map.squad_spawn.get_or_insert(pos);
                }
                'S' => map.spawn_points.push(SpawnPoint {
                    id: format!("spawn-{}", map.spawn_points.len() + 1),
                    pos,
                    radius: SPAWN_RADIUS,
                }),
                'E' => map.extraction = Some(pos),
                'O' => map.objectives.push(ObjectiveDefinition {
                    id: format!("obj-{}", map.objectives.len() + 1),
                    kind: ObjectiveKind::Recover,
                    target_cell: Some(pos),
                }),
                '$' => map.bonus_loot.push(pos),
                _ => {}
            }

            let east = pos.offset(Direction::East);
            if x + 1 < width {
                match lines[row][column + 1] {
                    '|' => map.walls.push(WallDefinition::between(pos, east)),
                    'I' => map.doors.push(Door::closed(next_door_id(&map), pos, east)),
                    _ => {}
                }
            }
            let south = pos.offset(Direction::South);
            if y + 1 < height {
                match lines[row + 1][column] {
                    '-' => map.walls.push(WallDefinition::between(pos, south)),
                    '=' => map.doors.push(Door::closed(next_door_id(&map), pos, south)),
                    _ => {}
                }
            }
        }
    }

    let rooms = label_rooms(&map, &floor);
    map.cells = floor
        .iter()
        .enumerate()
        .filter(|(_, is_floor)| **is_floor)
        .map(|(index, _)| {
            let pos = Vector2::new((index % width) as i32, (index / width) as i32);
            Cell { x: pos.x, y: pos.y, kind: CellType::Floor, room_id: rooms[index].clone() }
        })
        .collect();
    Ok(map)
}

fn next_door_id(map: &MapDefinition) -> String {
    format!("door-{}", map.doors.len() + 1)
}

/// Flood-fills floor regions across open boundaries in row-major order.
fn label_rooms(map: &MapDefinition, floor: &[bool]) -> Vec<Option<String>> {
    let width = map.width;
    let mut floor_only = map.clone();
    floor_only.cells = floor
        .iter()
        .enumerate()
        .filter(|(_, is_floor)| **is_floor)
        .map(|(index, _)| Cell::floor(Vector2::new((index % width) as i32, (index / width) as i32), None))
        .collect();
    let graph = Graph::new(&floor_only);

    let mut labels: Vec<Option<String>> = vec![None; floor.len()];
    let mut rooms = 0;
    for start in 0..floor.len() {
        if !floor[start] || labels[start].is_some() {
            continue;
        }
        rooms += 1;
        let label = format!("room-{rooms}");
        labels[start] = Some(label.clone());
        let mut open = VecDeque::from([Vector2::new((start % width) as i32, (start / width) as i32)]);
        while let Some(pos) = open.pop_front() {
            for direction in Direction::ALL {
                let next = pos.offset(direction);
                let Some(index) = graph.index(next) else {
                    continue;
                };
                if !floor[index] || labels[index].is_some() {
                    continue;
                }
                if graph.boundary(pos, next).is_some_and(|b| b.kind == BoundaryType::Open) {
                    labels[index] = Some(label.clone());
                    open.push_back(next);
                }
            }
        }
    }
    labels
}
