//! Per-enemy patrol memory.

use maze_escape_core::{grid_index, TileCoord, VisitView};

/// Dense visit-count grid mirroring the maze dimensions.
#[derive(Clone, Debug)]
pub(crate) struct VisitMap {
    columns: u32,
    rows: u32,
    counts: Vec<u32>,
}

impl VisitMap {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            counts: vec![0; capacity],
        }
    }

    /// Forgets every visit and seeds `origin` with a single arrival.
    pub(crate) fn reset_to(&mut self, origin: TileCoord) {
        self.counts.fill(0);
        self.record_arrival(origin);
    }

    pub(crate) fn record_arrival(&mut self, tile: TileCoord) {
        if let Some(slot) =
            grid_index(tile, self.columns, self.rows).and_then(|index| self.counts.get_mut(index))
        {
            *slot = slot.saturating_add(1);
        }
    }

    pub(crate) fn view(&self) -> VisitView<'_> {
        VisitView::new(&self.counts, self.columns, self.rows)
    }
}
