//! Render snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of everything the
//! renderer draws after a frame: visible entities, score, round state and
//! the occupancy heatmap.

use crate::components::*;
use crate::heatmap::{Heatmap, HeatmapSnapshot};
use crate::registry::{EntityId, Registry};
use crate::spatial::CollisionGrid;
use crate::systems::GameState;
use serde::{Deserialize, Serialize};

/// Snapshot of a single visible entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: u32,
    pub category: Category,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    pub radius: f32,
    pub color: Color,
}

/// Complete frame snapshot for the renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Frames stepped so far.
    pub frame: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    pub score: u32,
    pub game_over: bool,
    pub player: Option<u32>,
    /// Visible entities only; collected coins are left out.
    pub entities: Vec<EntitySnapshot>,
    pub heatmap: HeatmapSnapshot,
}

impl Snapshot {
    pub fn capture(
        registry: &Registry,
        grid: &CollisionGrid,
        state: &GameState,
        player: Option<EntityId>,
        frame: u64,
        time: f32,
    ) -> Self {
        let mut entities = Vec::new();
        for id in registry.ids() {
            let (Some(t), Some(v), Some(s), Some(c)) = (
                registry.transform(id),
                registry.velocity(id),
                registry.sprite(id),
                registry.collider(id),
            ) else {
                continue;
            };
            if !s.visible {
                continue;
            }
            entities.push(EntitySnapshot {
                id: id.raw(),
                category: c.category,
                x: t.x,
                y: t.y,
                vx: v.vx,
                vy: v.vy,
                w: s.w,
                h: s.h,
                radius: c.radius,
                color: s.color,
            });
        }

        Self {
            frame,
            time,
            score: state.score,
            game_over: state.game_over,
            player: player.map(EntityId::raw),
            entities,
            heatmap: Heatmap::new(grid).snapshot(),
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
