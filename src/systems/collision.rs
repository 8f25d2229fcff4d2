//! Collision system - grid rebuild, coin separation and player contacts.
//!
//! Runs single-threaded after the motion system has joined. The steps are
//! strictly ordered every frame:
//!
//! 1. **Clear + populate** the [`CollisionGrid`] from the current transforms.
//! 2. **Coin separation**: overlapping coin pairs that share a cell are
//!    pushed apart by half the overlap each. Pairs in different cells are
//!    never compared, so two coins straddling a cell border can stay
//!    overlapped for a frame. This is an accepted broad-phase approximation.
//! 3. **Player contacts**: the 3x3 block of cells around the player is
//!    scanned. Coins are collected (score + soft destroy); touching an enemy
//!    ends the round.
//!
//! Once the round is over the whole system is a no-op until
//! [`GameState::reset`] is called.

use crate::components::*;
use crate::config::SimConfig;
use crate::registry::{EntityId, Registry};
use crate::spatial::CollisionGrid;
use bevy_ecs::prelude::*;

/// Red channel painted onto the player when the round is lost.
pub const GAME_OVER_TINT_RED: u8 = 100;

/// The player entity that collision checks are centred on.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivePlayer(pub Option<EntityId>);

/// Score and round state.
#[derive(Resource, Debug, Clone, Default)]
pub struct GameState {
    pub score: u32,
    pub game_over: bool,
    /// Player color from before the game-over tint, restored on reset.
    saved_player_color: Option<Color>,
}

impl GameState {
    /// Start a new round: clear score and game-over, restore the player's
    /// color and stop it. Coins that were already collected stay collected.
    pub fn reset(&mut self, registry: &mut Registry, player: Option<EntityId>) {
        log::debug!("round reset (score was {})", self.score);
        self.score = 0;
        self.game_over = false;

        let saved = self.saved_player_color.take();
        if let Some(player) = player {
            if let (Some(color), Some(sprite)) = (saved, registry.sprite_mut(player)) {
                sprite.color = color;
            }
            if let Some(vel) = registry.velocity_mut(player) {
                *vel = Velocity::ZERO;
            }
        }
    }

    fn end_round(&mut self, registry: &mut Registry, player: EntityId) {
        if !self.game_over {
            log::info!("game over: player {} hit an enemy (score {})", player, self.score);
        }
        self.game_over = true;

        if let Some(vel) = registry.velocity_mut(player) {
            *vel = Velocity::ZERO;
        }
        if let Some(sprite) = registry.sprite_mut(player) {
            if self.saved_player_color.is_none() {
                self.saved_player_color = Some(sprite.color);
            }
            sprite.color.r = GAME_OVER_TINT_RED;
        }
    }
}

/// System that rebuilds the grid and resolves every collision for the frame.
pub fn collision_system(
    config: Res<SimConfig>,
    player: Res<ActivePlayer>,
    mut state: ResMut<GameState>,
    mut grid: ResMut<CollisionGrid>,
    mut registry: ResMut<Registry>,
) {
    if state.game_over {
        return;
    }

    let inserted = grid.rebuild(&mut registry, player.0);
    log::trace!("collision: {} entities in grid", inserted);

    separate_coins(&grid, &mut registry, &config);

    if let Some(player) = player.0 {
        resolve_player_contacts(&grid, &mut registry, &mut state, player, &config);
    }
}

/// Push apart every overlapping pair of coins that share a cell.
///
/// This is a positional correction, not an impulse: velocities are left
/// alone. Pairs closer than `separation_epsilon` have no usable direction
/// and are skipped.
pub fn separate_coins(grid: &CollisionGrid, registry: &mut Registry, config: &SimConfig) {
    let screen = config.coin_screen;
    let epsilon = config.separation_epsilon;

    for cell in 0..grid.cell_total() {
        let mut outer = grid.head(cell);
        while let Some(a) = outer {
            let mut inner = registry.link(a);
            while let Some(b) = inner {
                inner = registry.link(b);
                separate_pair(registry, a, b, screen, epsilon);
            }
            outer = registry.link(a);
        }
    }
}

fn separate_pair(registry: &mut Registry, a: EntityId, b: EntityId, screen: f32, epsilon: f32) {
    let (Some(ca), Some(cb)) = (registry.collider(a).copied(), registry.collider(b).copied())
    else {
        return;
    };
    if !(ca.is_coin() && cb.is_coin()) {
        return;
    }
    let (Some(pa), Some(pb)) = (registry.transform(a).copied(), registry.transform(b).copied())
    else {
        return;
    };

    let dx = pa.x - pb.x;
    let dy = pa.y - pb.y;
    if dx.abs() >= screen || dy.abs() >= screen {
        return;
    }

    let dist_sq = dx * dx + dy * dy;
    let r_total = ca.radius + cb.radius;
    if dist_sq >= r_total * r_total || dist_sq <= epsilon {
        return;
    }

    let dist = dist_sq.sqrt();
    let push = (r_total - dist) * 0.5;
    let nx = dx / dist;
    let ny = dy / dist;

    if let Some(t) = registry.transform_mut(a) {
        t.x += nx * push;
        t.y += ny * push;
    }
    if let Some(t) = registry.transform_mut(b) {
        t.x -= nx * push;
        t.y -= ny * push;
    }
}

/// Check the player against everything in its 3x3 cell neighborhood.
///
/// Contacts are gathered in a read-only pass over the grid, then applied.
/// Every entity sits in at most one cell, so each contact is seen once.
pub fn resolve_player_contacts(
    grid: &CollisionGrid,
    registry: &mut Registry,
    state: &mut GameState,
    player: EntityId,
    config: &SimConfig,
) {
    let contacts = player_contacts(grid, registry, player, config.player_screen);

    for (other, category) in contacts {
        match category {
            Category::Coin => {
                if let Err(err) = registry.deactivate(other) {
                    log::warn!("coin {} could not be collected: {}", other, err);
                    continue;
                }
                state.score += 1;
                log::debug!("coin {} collected, score {}", other, state.score);
            }
            Category::Enemy => state.end_round(registry, player),
            Category::Player | Category::None => {}
        }
    }
}

/// Active entities around `player` whose collider overlaps the player's.
fn player_contacts(
    grid: &CollisionGrid,
    registry: &Registry,
    player: EntityId,
    screen: f32,
) -> Vec<(EntityId, Category)> {
    let (Some(ppos), Some(pcol)) = (registry.transform(player), registry.collider(player))
    else {
        return Vec::new();
    };
    let (col, row) = grid.world_to_cell(ppos.x, ppos.y);

    let mut contacts = Vec::new();
    for cell in grid.neighborhood(col, row) {
        for other in grid.cell_entities(cell, registry) {
            let (Some(opos), Some(ocol)) = (registry.transform(other), registry.collider(other))
            else {
                continue;
            };
            if !ocol.active {
                continue;
            }

            let dx = ppos.x - opos.x;
            let dy = ppos.y - opos.y;
            if dx.abs() >= screen || dy.abs() >= screen {
                continue;
            }
            let r_total = pcol.radius + ocol.radius;
            if dx * dx + dy * dy < r_total * r_total {
                contacts.push((other, ocol.category));
            }
        }
    }
    contacts
}
