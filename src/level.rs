//! Default level layout: one player, a swarm of bouncing enemies and a field
//! of coins.

use crate::components::*;
use crate::config::{EntityStyle, SimConfig};
use crate::error::Result;
use crate::registry::{EntityId, Registry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator if the config names a seed, entropy otherwise.
pub fn level_rng(config: &SimConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn spawn_styled(
    registry: &mut Registry,
    style: &EntityStyle,
    category: Category,
    transform: Transform,
    velocity: Velocity,
) -> Result<EntityId> {
    registry.spawn(
        transform,
        velocity,
        Sprite::square(style.color, style.size),
        Collider::new(style.radius, category),
    )
}

/// Populate the registry with the default level and return the player.
///
/// Fails with `CapacityExhausted` if the registry cannot hold the whole
/// level; entities spawned before the failure stay allocated.
pub fn spawn_level(
    registry: &mut Registry,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Result<EntityId> {
    let level = &config.level;
    let (w, h) = (config.world_width, config.world_height);

    let player = spawn_styled(
        registry,
        &level.player,
        Category::Player,
        Transform::new(w / 2.0, h / 2.0),
        Velocity::ZERO,
    )?;

    for _ in 0..level.enemy_count {
        let pos = Transform::new(rng.gen_range(0.0..w), rng.gen_range(0.0..h));
        let vel = if level.enemy_speed > 0.0 {
            Velocity::new(
                rng.gen_range(-level.enemy_speed..level.enemy_speed),
                rng.gen_range(-level.enemy_speed..level.enemy_speed),
            )
        } else {
            Velocity::ZERO
        };
        spawn_styled(registry, &level.enemy, Category::Enemy, pos, vel)?;
    }

    // Fall back to the whole world if the margin leaves no room.
    let margin = if w > 2.0 * level.coin_margin && h > 2.0 * level.coin_margin {
        level.coin_margin
    } else {
        0.0
    };
    for _ in 0..level.coin_count {
        let pos = Transform::new(
            rng.gen_range(margin..w - margin),
            rng.gen_range(margin..h - margin),
        );
        spawn_styled(registry, &level.coin, Category::Coin, pos, Velocity::ZERO)?;
    }

    log::debug!(
        "level spawned: player {}, {} enemies, {} coins",
        player,
        level.enemy_count,
        level.coin_count
    );
    Ok(player)
}
