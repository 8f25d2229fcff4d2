//! Uniform spatial grid for broad-phase collision.
//!
//! The world is cut into fixed-size square cells. Each frame the grid is
//! rebuilt from scratch: every collidable entity is prepended to the list of
//! the cell that contains it. Lists are intrusive, so the grid itself only
//! owns one head slot and one occupancy count per cell and a rebuild never
//! allocates.

use crate::config::SimConfig;
use crate::registry::{EntityId, Registry};
use bevy_ecs::prelude::*;

/// Grid-based spatial index over the arena.
#[derive(Resource, Debug)]
pub struct CollisionGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    /// First entity of each cell's list, row-major.
    heads: Vec<Option<EntityId>>,
    /// Entities inserted into each cell this frame, row-major.
    counts: Vec<u32>,
}

impl CollisionGrid {
    /// Create a grid covering `width x height` world units.
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let cols = (width / cell_size).ceil() as usize;
        let rows = (height / cell_size).ceil() as usize;
        Self {
            cell_size,
            cols,
            rows,
            heads: vec![None; cols * rows],
            counts: vec![0; cols * rows],
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.world_width, config.world_height, config.cell_size)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_total(&self) -> usize {
        self.heads.len()
    }

    /// Convert world coordinates to (unbounded) cell coordinates.
    #[inline]
    pub fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Row-major index of a cell, or `None` outside the grid.
    #[inline]
    pub fn cell_index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(row * self.cols + col)
    }

    /// Reset every list head and occupancy count.
    pub fn clear(&mut self) {
        self.heads.fill(None);
        self.counts.fill(0);
    }

    /// Prepend `id` to the list of the cell containing `(x, y)`.
    ///
    /// Returns `false` (and leaves the grid untouched) when the position lies
    /// outside the grid.
    pub fn insert(&mut self, registry: &mut Registry, id: EntityId, x: f32, y: f32) -> bool {
        let (col, row) = self.world_to_cell(x, y);
        let Some(cell) = self.cell_index(col, row) else {
            return false;
        };
        registry.set_link(id, self.heads[cell]);
        self.heads[cell] = Some(id);
        self.counts[cell] += 1;
        true
    }

    /// Clear the grid, then insert every active collider except `skip`.
    ///
    /// Returns how many entities landed in the grid.
    pub fn rebuild(&mut self, registry: &mut Registry, skip: Option<EntityId>) -> usize {
        self.clear();

        let mut inserted = 0;
        for i in 0..registry.len() as u32 {
            let id = EntityId::from_raw(i);
            if Some(id) == skip {
                continue;
            }
            let (active, x, y) = match (registry.collider(id), registry.transform(id)) {
                (Some(c), Some(t)) => (c.active, t.x, t.y),
                _ => continue,
            };
            if active && self.insert(registry, id, x, y) {
                inserted += 1;
            }
        }
        inserted
    }

    /// First entity of a cell's list.
    #[inline]
    pub fn head(&self, cell: usize) -> Option<EntityId> {
        self.heads.get(cell).copied().flatten()
    }

    /// Walk one cell's list.
    pub fn cell_entities<'a>(&self, cell: usize, registry: &'a Registry) -> CellIter<'a> {
        CellIter {
            registry,
            cursor: self.head(cell),
        }
    }

    /// Occupancy of a cell, 0 outside the grid.
    pub fn count(&self, col: i32, row: i32) -> u32 {
        self.cell_index(col, row)
            .map(|cell| self.counts[cell])
            .unwrap_or(0)
    }

    /// Row-major occupancy counts of every cell.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Total entities inserted this frame.
    pub fn total_count(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    /// Indices of the 3x3 block of cells around `(col, row)`, clipped to the
    /// grid. Empty when the block lies entirely outside.
    pub fn neighborhood(&self, col: i32, row: i32) -> impl Iterator<Item = usize> + '_ {
        let col_lo = col.saturating_sub(1).max(0);
        let col_hi = col.saturating_add(1).min(self.cols as i32 - 1);
        let row_lo = row.saturating_sub(1).max(0);
        let row_hi = row.saturating_add(1).min(self.rows as i32 - 1);

        (col_lo..=col_hi).flat_map(move |c| {
            (row_lo..=row_hi).filter_map(move |r| self.cell_index(c, r))
        })
    }
}

/// Iterator over the entities chained in one grid cell.
pub struct CellIter<'a> {
    registry: &'a Registry,
    cursor: Option<EntityId>,
}

impl Iterator for CellIter<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        let current = self.cursor?;
        self.cursor = self.registry.link(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::*;

    fn spawn_at(registry: &mut Registry, x: f32, y: f32, active: bool) -> EntityId {
        let mut collider = Collider::new(5.0, Category::Enemy);
        collider.active = active;
        registry
            .spawn(
                Transform::new(x, y),
                Velocity::ZERO,
                Sprite::square(Color::ENEMY, 10.0),
                collider,
            )
            .unwrap()
    }

    #[test]
    fn test_dimensions_round_up() {
        let grid = CollisionGrid::new(100.0, 45.0, 20.0);
        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cell_total(), 15);
    }

    #[test]
    fn test_world_to_cell_floors() {
        let grid = CollisionGrid::new(100.0, 100.0, 10.0);
        assert_eq!(grid.world_to_cell(5.0, 15.0), (0, 1));
        assert_eq!(grid.world_to_cell(-0.5, 99.9), (-1, 9));
        assert_eq!(grid.cell_index(-1, 0), None);
        assert_eq!(grid.cell_index(10, 0), None);
        assert_eq!(grid.cell_index(3, 2), Some(23));
    }

    #[test]
    fn test_insert_prepends() {
        let mut registry = Registry::with_capacity(8, -10_000.0);
        let mut grid = CollisionGrid::new(100.0, 100.0, 10.0);
        let a = spawn_at(&mut registry, 1.0, 1.0, true);
        let b = spawn_at(&mut registry, 2.0, 2.0, true);

        assert!(grid.insert(&mut registry, a, 1.0, 1.0));
        assert!(grid.insert(&mut registry, b, 2.0, 2.0));

        let members: Vec<_> = grid.cell_entities(0, &registry).collect();
        assert_eq!(members, vec![b, a]);
        assert_eq!(grid.count(0, 0), 2);
    }

    #[test]
    fn test_rebuild_skips_inactive_out_of_bounds_and_skipped() {
        let mut registry = Registry::with_capacity(8, -10_000.0);
        let mut grid = CollisionGrid::new(100.0, 100.0, 10.0);

        let player = spawn_at(&mut registry, 50.0, 50.0, true);
        spawn_at(&mut registry, 15.0, 15.0, true);
        spawn_at(&mut registry, 16.0, 16.0, true);
        spawn_at(&mut registry, 95.0, 5.0, true);
        spawn_at(&mut registry, 30.0, 30.0, false); // inactive
        spawn_at(&mut registry, -5.0, 30.0, true); // left of grid
        spawn_at(&mut registry, 30.0, 100.0, true); // below grid

        let inserted = grid.rebuild(&mut registry, Some(player));

        assert_eq!(inserted, 3);
        assert_eq!(grid.total_count(), 3);
        assert_eq!(grid.count(1, 1), 2);
        assert_eq!(grid.count(9, 0), 1);
        assert_eq!(grid.count(5, 5), 0);
    }

    #[test]
    fn test_rebuild_holds_no_state_across_frames() {
        let mut registry = Registry::with_capacity(4, -10_000.0);
        let mut grid = CollisionGrid::new(100.0, 100.0, 10.0);
        let a = spawn_at(&mut registry, 5.0, 5.0, true);

        grid.rebuild(&mut registry, None);
        assert_eq!(grid.count(0, 0), 1);

        registry.transform_mut(a).unwrap().x = 55.0;
        grid.rebuild(&mut registry, None);
        assert_eq!(grid.count(0, 0), 0);
        assert_eq!(grid.count(5, 0), 1);
        assert_eq!(grid.total_count(), 1);
    }

    #[test]
    fn test_neighborhood_clipped() {
        let grid = CollisionGrid::new(30.0, 30.0, 10.0);

        let mut corner: Vec<_> = grid.neighborhood(0, 0).collect();
        corner.sort();
        assert_eq!(corner, vec![0, 1, 3, 4]);

        assert_eq!(grid.neighborhood(1, 1).count(), 9);
        assert_eq!(grid.neighborhood(-5, -5).count(), 0);
        // One cell outside the edge still reaches the border column.
        assert_eq!(grid.neighborhood(3, 1).count(), 3);
    }

    #[test]
    fn test_neighborhood_at_extreme_cells_is_empty() {
        let grid = CollisionGrid::new(30.0, 30.0, 10.0);

        assert_eq!(grid.neighborhood(i32::MAX, 1).count(), 0);
        assert_eq!(grid.neighborhood(1, i32::MIN).count(), 0);
        assert_eq!(grid.neighborhood(i32::MIN, i32::MAX).count(), 0);

        let (col, row) = grid.world_to_cell(1.0e12, f32::NEG_INFINITY);
        assert_eq!((col, row), (i32::MAX, i32::MIN));
        assert_eq!(grid.neighborhood(col, row).count(), 0);
    }
}
