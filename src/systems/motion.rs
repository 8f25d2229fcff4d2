//! Motion system - integrates velocity into position across worker threads.
//!
//! ## Partitioning
//!
//! The allocated range `[0, len)` is cut into one contiguous chunk per
//! worker; the last chunk absorbs the remainder. Chunks are carved out of the
//! transform and velocity arrays with `split_at_mut`, so each worker holds
//! the only mutable borrow of its own rows and no locking is needed.
//!
//! ## Barrier
//!
//! With the `parallel` feature the chunks run inside a `rayon::scope`, which
//! returns only after every worker has finished. Without it the chunks run
//! one after another on the calling thread. Either way the system returns
//! with every write visible to the systems that run after it.

use crate::components::*;
use crate::config::SimConfig;
use crate::registry::Registry;
use bevy_ecs::prelude::*;
use rand::Rng;
use std::ops::Range;

/// Resource containing the time step for the current frame, in seconds.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct DeltaTime(pub f32);

/// Per-frame constants shared by every worker.
#[derive(Debug, Clone, Copy)]
struct MotionParams {
    dt: f32,
    width: f32,
    height: f32,
    jitter: f32,
}

/// Split `[0, len)` into `workers` contiguous ranges. Every index is covered
/// exactly once; the last range takes whatever division leaves over.
pub fn chunk_bounds(len: usize, workers: usize) -> impl Iterator<Item = Range<usize>> {
    let workers = workers.max(1);
    let chunk = len / workers;
    (0..workers).map(move |i| {
        let start = i * chunk;
        let end = if i == workers - 1 { len } else { start + chunk };
        start..end
    })
}

/// System that moves every visible entity and bounces it off the world edges.
pub fn motion_system(
    dt: Res<DeltaTime>,
    config: Res<SimConfig>,
    mut registry: ResMut<Registry>,
) {
    let params = MotionParams {
        dt: dt.0,
        width: config.world_width,
        height: config.world_height,
        jitter: config.coin_jitter,
    };
    let workers = config.worker_count();
    let (transforms, velocities, sprites, colliders) = registry.motion_slices();
    let len = transforms.len();

    log::trace!("motion: {} entities over {} workers", len, workers);

    #[cfg(feature = "parallel")]
    rayon::scope(|scope| {
        let mut transforms_rest = transforms;
        let mut velocities_rest = velocities;
        for range in chunk_bounds(len, workers) {
            let (t_chunk, t_tail) = std::mem::take(&mut transforms_rest).split_at_mut(range.len());
            let (v_chunk, v_tail) = std::mem::take(&mut velocities_rest).split_at_mut(range.len());
            transforms_rest = t_tail;
            velocities_rest = v_tail;
            let s_chunk = &sprites[range.clone()];
            let c_chunk = &colliders[range];

            scope.spawn(move |_| {
                let mut rng = rand::thread_rng();
                integrate_chunk(t_chunk, v_chunk, s_chunk, c_chunk, params, &mut rng);
            });
        }
    });

    #[cfg(not(feature = "parallel"))]
    {
        let mut rng = rand::thread_rng();
        for range in chunk_bounds(len, workers) {
            integrate_chunk(
                &mut transforms[range.clone()],
                &mut velocities[range.clone()],
                &sprites[range.clone()],
                &colliders[range],
                params,
                &mut rng,
            );
        }
    }
}

/// Integrate one chunk. All four slices cover the same index range.
fn integrate_chunk(
    transforms: &mut [Transform],
    velocities: &mut [Velocity],
    sprites: &[Sprite],
    colliders: &[Collider],
    params: MotionParams,
    rng: &mut impl Rng,
) {
    let rows = transforms
        .iter_mut()
        .zip(velocities.iter_mut())
        .zip(sprites.iter().zip(colliders));

    for ((pos, vel), (sprite, collider)) in rows {
        if !sprite.visible {
            continue;
        }

        // Idle wobble
        if collider.is_coin() && params.jitter > 0.0 {
            pos.x += rng.gen_range(-params.jitter..=params.jitter);
            pos.y += rng.gen_range(-params.jitter..=params.jitter);
        }

        pos.x += vel.vx * params.dt;
        pos.y += vel.vy * params.dt;

        if vel.is_moving() {
            if pos.x <= 0.0 || pos.x >= params.width - sprite.w {
                vel.vx = -vel.vx;
            }
            if pos.y <= 0.0 || pos.y >= params.height - sprite.h {
                vel.vy = -vel.vy;
            }
        }
    }
}
