use std::f32::consts::TAU;

use maze_escape_core::{
    CollectibleId, CollectibleSnapshot, CollectibleTuning, PixelPoint, TileCoord,
};

use crate::grid::GridWorld;

#[derive(Clone, Debug)]
pub(crate) struct Collectible {
    id: CollectibleId,
    tile: TileCoord,
    position: PixelPoint,
    size: u32,
    collected: bool,
    animation_phase: f32,
    animation_speed: f32,
}

impl Collectible {
    pub(crate) fn spawn(
        id: CollectibleId,
        tile: TileCoord,
        tuning: &CollectibleTuning,
        grid: &GridWorld,
    ) -> Self {
        Self {
            id,
            tile,
            position: grid.center(tile),
            size: tuning.size,
            collected: false,
            animation_phase: 0.0,
            animation_speed: tuning.animation_speed,
        }
    }

    pub(crate) const fn id(&self) -> CollectibleId {
        self.id
    }

    pub(crate) const fn is_collected(&self) -> bool {
        self.collected
    }

    /// Advances the floating animation; the phase wraps back to zero past a full turn.
    pub(crate) fn animate(&mut self) {
        if self.collected {
            return;
        }
        self.animation_phase += self.animation_speed;
        if self.animation_phase > TAU {
            self.animation_phase = 0.0;
        }
    }

    /// Marks the collectible as picked up, returning `false` if it already was.
    pub(crate) fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }

    pub(crate) fn reset(&mut self) {
        self.collected = false;
        self.animation_phase = 0.0;
    }

    pub(crate) fn snapshot(&self) -> CollectibleSnapshot {
        CollectibleSnapshot {
            id: self.id,
            tile: self.tile,
            position: self.position,
            size: self.size,
            collected: self.collected,
            animation_phase: self.animation_phase,
        }
    }
}
