//! Dense row-major grid primitives shared by the carving buffer and the graph.

use crate::types::Vector2;

pub(crate) fn in_bounds(width: usize, height: usize, pos: Vector2) -> bool {
    pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < width && (pos.y as usize) < height
}

pub(crate) fn cell_index(width: usize, height: usize, pos: Vector2) -> Option<usize> {
    in_bounds(width, height, pos).then(|| (pos.y as usize) * width + (pos.x as usize))
}

pub(crate) fn cell_at_index(width: usize, index: usize) -> Vector2 {
    Vector2::new((index % width) as i32, (index / width) as i32)
}

/// Quadrant index: 0 north-west, 1 north-east, 2 south-west, 3 south-east.
/// The split sits at the midpoint of each axis, so on odd sizes the middle
/// column and row fall on the west and north side.
pub fn quadrant(width: usize, height: usize, pos: Vector2) -> usize {
    let east = 2 * i64::from(pos.x) >= width as i64;
    let south = 2 * i64::from(pos.y) >= height as i64;
    usize::from(south) * 2 + usize::from(east)
}

pub(crate) fn quadrant_distance(a: usize, b: usize) -> usize {
    (a % 2).abs_diff(b % 2) + (a / 2).abs_diff(b / 2)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeSlot {
    Vertical(usize),
    Horizontal(usize),
}

/// One value per boundary edge of a `width x height` grid, rim edges
/// against the outside included.
///
/// Vertical edges separate `(x, y)` from `(x + 1, y)` for `x` in
/// `-1..width`; horizontal edges separate `(x, y)` from `(x, y + 1)` for
/// `y` in `-1..height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EdgeTable<T> {
    width: usize,
    height: usize,
    vertical: Vec<T>,
    horizontal: Vec<T>,
}

impl<T: Copy> EdgeTable<T> {
    pub(crate) fn from_fn(
        width: usize,
        height: usize,
        mut init: impl FnMut(Vector2, Vector2) -> T,
    ) -> Self {
        let vertical = (0..(width + 1) * height)
            .map(|index| {
                let (a, b) = vertical_pair(width, index);
                init(a, b)
            })
            .collect();
        let horizontal = (0..width * (height + 1))
            .map(|index| {
                let (a, b) = horizontal_pair(width, index);
                init(a, b)
            })
            .collect();
        Self { width, height, vertical, horizontal }
    }

    fn slot(&self, a: Vector2, b: Vector2) -> Option<EdgeSlot> {
        if a.y == b.y && a.x.abs_diff(b.x) == 1 {
            let left = a.x.min(b.x);
            let row_ok = a.y >= 0 && (a.y as usize) < self.height;
            let column_ok = left >= -1 && left < self.width as i32;
            return (row_ok && column_ok).then(|| {
                EdgeSlot::Vertical((a.y as usize) * (self.width + 1) + (left + 1) as usize)
            });
        }
        if a.x == b.x && a.y.abs_diff(b.y) == 1 {
            let top = a.y.min(b.y);
            let column_ok = a.x >= 0 && (a.x as usize) < self.width;
            let row_ok = top >= -1 && top < self.height as i32;
            return (row_ok && column_ok)
                .then(|| EdgeSlot::Horizontal(((top + 1) as usize) * self.width + a.x as usize));
        }
        None
    }

    pub(crate) fn get(&self, a: Vector2, b: Vector2) -> Option<T> {
        match self.slot(a, b)? {
            EdgeSlot::Vertical(index) => self.vertical.get(index).copied(),
            EdgeSlot::Horizontal(index) => self.horizontal.get(index).copied(),
        }
    }

    /// Returns `false` when `a` and `b` do not share an edge of this grid.
    pub(crate) fn set(&mut self, a: Vector2, b: Vector2, value: T) -> bool {
        let slot = match self.slot(a, b) {
            Some(EdgeSlot::Vertical(index)) => self.vertical.get_mut(index),
            Some(EdgeSlot::Horizontal(index)) => self.horizontal.get_mut(index),
            None => None,
        };
        match slot {
            Some(entry) => {
                *entry = value;
                true
            }
            None => false,
        }
    }

    /// Every edge in a fixed order: vertical edges row by row, then
    /// horizontal edges row by row.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (Vector2, Vector2, T)> + '_ {
        let width = self.width;
        let vertical = self.vertical.iter().enumerate().map(move |(index, &value)| {
            let (a, b) = vertical_pair(width, index);
            (a, b, value)
        });
        let horizontal = self.horizontal.iter().enumerate().map(move |(index, &value)| {
            let (a, b) = horizontal_pair(width, index);
            (a, b, value)
        });
        vertical.chain(horizontal)
    }
}

fn vertical_pair(width: usize, index: usize) -> (Vector2, Vector2) {
    let y = (index / (width + 1)) as i32;
    let left = (index % (width + 1)) as i32 - 1;
    (Vector2::new(left, y), Vector2::new(left + 1, y))
}

fn horizontal_pair(width: usize, index: usize) -> (Vector2, Vector2) {
    let top = (index / width) as i32 - 1;
    let x = (index % width) as i32;
    (Vector2::new(x, top), Vector2::new(x, top + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrants_split_at_axis_midpoints() {
        assert_eq!(quadrant(8, 8, Vector2::new(3, 3)), 0);
        assert_eq!(quadrant(8, 8, Vector2::new(4, 3)), 1);
        assert_eq!(quadrant(8, 8, Vector2::new(3, 4)), 2);
        assert_eq!(quadrant(8, 8, Vector2::new(4, 4)), 3);
        assert_eq!(quadrant(7, 7, Vector2::new(3, 3)), 0);
        assert_eq!(quadrant(7, 7, Vector2::new(4, 4)), 3);
    }

    #[test]
    fn opposite_quadrants_are_two_steps_apart() {
        assert_eq!(quadrant_distance(0, 3), 2);
        assert_eq!(quadrant_distance(1, 2), 2);
        assert_eq!(quadrant_distance(0, 1), 1);
        assert_eq!(quadrant_distance(2, 2), 0);
    }

    #[test]
    fn edge_table_covers_rim_edges() {
        let table = EdgeTable::from_fn(3, 2, |a, b| in_bounds(3, 2, a) && in_bounds(3, 2, b));
        assert_eq!(table.iter().count(), 4 * 2 + 3 * 3);
        assert_eq!(table.get(Vector2::new(-1, 0), Vector2::new(0, 0)), Some(false));
        assert_eq!(table.get(Vector2::new(0, 0), Vector2::new(1, 0)), Some(true));
        assert_eq!(table.get(Vector2::new(1, 0), Vector2::new(0, 0)), Some(true));
        assert_eq!(table.get(Vector2::new(2, 1), Vector2::new(2, 2)), Some(false));
        assert_eq!(table.get(Vector2::new(0, 0), Vector2::new(1, 1)), None);
        assert_eq!(table.get(Vector2::new(-1, -1), Vector2::new(-1, 0)), None);
    }

    #[test]
    fn edge_table_set_targets_a_single_edge() {
        let mut table = EdgeTable::from_fn(4, 4, |_, _| 0_u8);
        assert!(table.set(Vector2::new(2, 1), Vector2::new(2, 2), 7));
        assert!(!table.set(Vector2::new(2, 1), Vector2::new(3, 2), 9));
        let marked: Vec<_> = table.iter().filter(|(_, _, value)| *value == 7).collect();
        assert_eq!(marked, vec![(Vector2::new(2, 1), Vector2::new(2, 2), 7)]);
    }
}
