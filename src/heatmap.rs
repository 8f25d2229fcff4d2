//! Read-only occupancy view of the collision grid.
//!
//! The renderer draws a heatmap from the per-cell counts produced by the last
//! grid rebuild. Nothing here can mutate the grid.

use crate::spatial::CollisionGrid;
use serde::{Deserialize, Serialize};

/// Counts below this are drawn green, above it red.
pub const HEAT_THRESHOLD: u32 = 10;
/// Upper bound on heatmap alpha.
pub const HEAT_MAX_ALPHA: u32 = 150;

/// Borrowed view over the grid's occupancy counts.
#[derive(Clone, Copy)]
pub struct Heatmap<'a> {
    grid: &'a CollisionGrid,
}

impl<'a> Heatmap<'a> {
    pub fn new(grid: &'a CollisionGrid) -> Self {
        Self { grid }
    }

    /// Entities in cell `(col, row)` this frame, 0 for coordinates outside
    /// the grid.
    pub fn cell_occupancy(&self, col: i32, row: i32) -> u32 {
        self.grid.count(col, row)
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cell_size(&self) -> f32 {
        self.grid.cell_size()
    }

    pub fn total(&self) -> usize {
        self.grid.total_count()
    }

    /// Every cell as `(col, row, count)`, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u32)> + 'a {
        let grid: &'a CollisionGrid = self.grid;
        let cols = grid.cols();
        grid.counts()
            .iter()
            .enumerate()
            .map(move |(i, &count)| (i % cols, i / cols, count))
    }

    /// The busiest cell, if any cell is occupied.
    pub fn hottest(&self) -> Option<(usize, usize, u32)> {
        self.cells()
            .filter(|&(_, _, count)| count > 0)
            .max_by_key(|&(_, _, count)| count)
    }

    pub fn snapshot(&self) -> HeatmapSnapshot {
        HeatmapSnapshot {
            cols: self.cols(),
            rows: self.rows(),
            cell_size: self.cell_size(),
            counts: self.grid.counts().to_vec(),
        }
    }
}

/// Serializable copy of the heatmap for the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSnapshot {
    pub cols: usize,
    pub rows: usize,
    pub cell_size: f32,
    /// Row-major per-cell counts.
    pub counts: Vec<u32>,
}

/// RGBA overlay color for a cell holding `count` entities, `None` if empty.
///
/// Sparse cells are green and crowded cells red; alpha grows with the count.
pub fn heat_tint(count: u32) -> Option<[u8; 4]> {
    if count == 0 {
        return None;
    }
    let r = if count > HEAT_THRESHOLD { 255 } else { 0 };
    let g = if count < HEAT_THRESHOLD { 255 } else { 0 };
    let a = count.saturating_mul(20).saturating_add(20).min(HEAT_MAX_ALPHA) as u8;
    Some([r, g, 0, a])
}
