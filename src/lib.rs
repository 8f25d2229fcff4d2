//! Grid Arena - Simulation Core
//!
//! A real-time arena of circular entities (one player, bouncing enemies and
//! collectible coins). Each frame integrates motion across worker threads,
//! then rebuilds a uniform spatial grid to resolve collisions without
//! pairwise O(n²) checks. Uses `bevy_ecs` to host the resources and systems.

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod heatmap;
pub mod level;
pub mod profiler;
pub mod registry;
pub mod spatial;
pub mod systems;
pub mod world;

pub use api::GameWorld;
pub use components::*;
pub use config::{EntityStyle, LevelConfig, SimConfig};
pub use error::{Result, SimError};
pub use heatmap::{heat_tint, Heatmap, HeatmapSnapshot};
pub use registry::{EntityId, Registry};
pub use spatial::CollisionGrid;
pub use systems::*;
pub use world::{EntitySnapshot, Snapshot};
