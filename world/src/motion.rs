//! Two-phase tile movement shared by the player and enemies.
//!
//! A move first *commits*: the grid tile changes immediately and a pixel
//! target is set. The actor then *interpolates* toward that target over the
//! following ticks. Each axis is clamped to `speed` pixels independently, so
//! an actor closing on both axes at once covers more ground per tick than one
//! travelling along a single axis.

use maze_escape_core::{ActorSnapshot, Direction, PixelPoint, TileCoord};

use crate::grid::GridWorld;

#[derive(Clone, Debug)]
pub(crate) struct Actor {
    tile: TileCoord,
    position: PixelPoint,
    target: PixelPoint,
    size: u32,
    speed: f32,
    moving: bool,
}

impl Actor {
    /// Places an idle actor at the centre of `tile`.
    pub(crate) fn spawn(tile: TileCoord, size: u32, speed: f32, grid: &GridWorld) -> Self {
        let center = grid.center(tile);
        Self {
            tile,
            position: center,
            target: center,
            size,
            speed,
            moving: false,
        }
    }

    pub(crate) const fn tile(&self) -> TileCoord {
        self.tile
    }

    pub(crate) const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Snaps the actor back onto `tile` and cancels any motion.
    pub(crate) fn place(&mut self, tile: TileCoord, grid: &GridWorld) {
        let center = grid.center(tile);
        self.tile = tile;
        self.position = center;
        self.target = center;
        self.moving = false;
    }

    /// Commits a single step, returning the tile entered.
    ///
    /// Fails while an interpolation is still in flight or when the candidate
    /// tile is blocked for an actor of this size.
    pub(crate) fn try_commit(
        &mut self,
        direction: Direction,
        grid: &GridWorld,
    ) -> Option<TileCoord> {
        if self.moving {
            return None;
        }

        let candidate = self.tile.step(direction);
        if grid.is_blocked(candidate, self.size) {
            return None;
        }

        self.tile = candidate;
        self.target = grid.center(candidate);
        self.moving = true;
        Some(candidate)
    }

    /// Moves toward the target and reports whether the actor arrived this tick.
    pub(crate) fn interpolate(&mut self) -> bool {
        if !self.moving {
            return false;
        }

        self.position.x = approach(self.position.x, self.target.x, self.speed);
        self.position.y = approach(self.position.y, self.target.y, self.speed);

        if self.position == self.target {
            self.moving = false;
            return true;
        }
        false
    }

    pub(crate) fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            tile: self.tile,
            position: self.position,
            target: self.target,
            size: self.size,
            speed: self.speed,
            moving: self.moving,
        }
    }
}

fn approach(current: f32, target: f32, speed: f32) -> f32 {
    let delta = target - current;
    if delta.abs() > speed {
        current + speed.copysign(delta)
    } else {
        target
    }
}
