//! Immutable wall grid and tile geometry shared by every actor.

use maze_escape_core::{grid_index, PixelPoint, TileCoord, WallView};

use crate::layout::{MazeLayout, TileCode};

/// Dense wall occupancy plus the tile size that maps tiles onto pixels.
#[derive(Clone, Debug)]
pub(crate) struct GridWorld {
    columns: u32,
    rows: u32,
    tile_size: u32,
    walls: Vec<bool>,
    exit: TileCoord,
}

impl GridWorld {
    /// Builds the wall grid described by `layout`.
    pub(crate) fn from_layout(layout: &MazeLayout, tile_size: u32) -> Self {
        let walls = layout
            .iter()
            .map(|(_, code)| code == TileCode::Wall)
            .collect();
        Self {
            columns: layout.columns(),
            rows: layout.rows(),
            tile_size,
            walls,
            exit: layout.exit(),
        }
    }

    pub(crate) const fn columns(&self) -> u32 {
        self.columns
    }

    pub(crate) const fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub(crate) const fn exit(&self) -> TileCoord {
        self.exit
    }

    pub(crate) fn contains(&self, tile: TileCoord) -> bool {
        grid_index(tile, self.columns, self.rows).is_some()
    }

    pub(crate) fn wall_view(&self) -> WallView<'_> {
        WallView::new(&self.walls, self.columns, self.rows)
    }

    /// Pixel centre of `tile`.
    pub(crate) fn center(&self, tile: TileCoord) -> PixelPoint {
        tile.center(self.tile_size)
    }

    /// Reports whether an actor of `size` pixels may not stand on `tile`.
    ///
    /// A tile is blocked when it lies outside the grid or when the
    /// `size × size` square centred on it shares interior area with any wall
    /// tile. Only the wall tiles the square can reach are inspected.
    pub(crate) fn is_blocked(&self, tile: TileCoord, size: u32) -> bool {
        if !self.contains(tile) {
            return true;
        }
        if size == 0 || self.tile_size == 0 {
            return false;
        }

        let tile_size = i64::from(self.tile_size);
        let half_tile = tile_size / 2;
        let half_size = i64::from(size / 2);
        let center_x = i64::from(tile.column()) * tile_size + half_tile;
        let center_y = i64::from(tile.row()) * tile_size + half_tile;

        let left = center_x - half_size;
        let top = center_y - half_size;
        let right = left + i64::from(size);
        let bottom = top + i64::from(size);

        let first_column = left.div_euclid(tile_size);
        let last_column = (right - 1).div_euclid(tile_size);
        let first_row = top.div_euclid(tile_size);
        let last_row = (bottom - 1).div_euclid(tile_size);

        let walls = self.wall_view();
        (first_row..=last_row).any(|row| {
            (first_column..=last_column).any(|column| {
                match (i32::try_from(column), i32::try_from(row)) {
                    (Ok(column), Ok(row)) => walls.is_wall(TileCoord::new(column, row)),
                    _ => false,
                }
            })
        })
    }
}
