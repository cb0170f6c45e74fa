#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile-granular line-of-sight queries used by the enemy AI.

use maze_escape_core::{TileCoord, WallView};

/// Iterator over the tiles an integer Bresenham line visits.
///
/// The sequence starts at `from`, ends at `to` and includes both endpoints.
#[derive(Clone, Debug)]
pub struct TileTrace {
    current: TileCoord,
    end: TileCoord,
    dx: i64,
    dy: i64,
    step_x: i32,
    step_y: i32,
    error: i64,
    finished: bool,
}

impl TileTrace {
    /// Starts a trace between two tiles.
    #[must_use]
    pub fn new(from: TileCoord, to: TileCoord) -> Self {
        let dx = (i64::from(to.column()) - i64::from(from.column())).abs();
        let dy = -(i64::from(to.row()) - i64::from(from.row())).abs();
        Self {
            current: from,
            end: to,
            dx,
            dy,
            step_x: if from.column() < to.column() { 1 } else { -1 },
            step_y: if from.row() < to.row() { 1 } else { -1 },
            error: dx + dy,
            finished: false,
        }
    }
}

impl Iterator for TileTrace {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let tile = self.current;
        if tile == self.end {
            self.finished = true;
            return Some(tile);
        }

        let doubled = 2 * self.error;
        let mut column = tile.column();
        let mut row = tile.row();
        if doubled >= self.dy {
            self.error += self.dy;
            column += self.step_x;
        }
        if doubled <= self.dx {
            self.error += self.dx;
            row += self.step_y;
        }
        self.current = TileCoord::new(column, row);
        Some(tile)
    }
}

/// Reports whether `to` is visible from `from`.
///
/// Only the tiles strictly between the endpoints are tested against the wall
/// grid, so a viewer standing next to its target always sees it.
#[must_use]
pub fn has_line_of_sight(from: TileCoord, to: TileCoord, walls: WallView<'_>) -> bool {
    let mut interior = TileTrace::new(from, to).skip(1).peekable();
    while let Some(tile) = interior.next() {
        if interior.peek().is_none() {
            break;
        }
        if walls.is_wall(tile) {
            return false;
        }
    }
    true
}
