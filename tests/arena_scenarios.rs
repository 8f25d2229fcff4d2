//! End-to-end frame scenarios driven through `GameWorld`.

use grid_arena::*;

/// 1280x720 world, 64 unit cells, no coin wobble so positions are exact.
fn quiet_config() -> SimConfig {
    SimConfig {
        coin_jitter: 0.0,
        max_entities: 64,
        worker_threads: Some(4),
        ..Default::default()
    }
}

fn spawn_player(sim: &mut GameWorld, x: f32, y: f32) -> EntityId {
    sim.spawn(
        Transform::new(x, y),
        Velocity::ZERO,
        Sprite::square(Color::PLAYER, 30.0),
        Collider::new(15.0, Category::Player),
    )
    .unwrap()
}

fn spawn_coin(sim: &mut GameWorld, x: f32, y: f32) -> EntityId {
    sim.spawn(
        Transform::new(x, y),
        Velocity::ZERO,
        Sprite::square(Color::COIN, 15.0),
        Collider::new(8.0, Category::Coin),
    )
    .unwrap()
}

fn spawn_enemy(sim: &mut GameWorld, x: f32, y: f32, vel: Velocity) -> EntityId {
    sim.spawn(
        Transform::new(x, y),
        vel,
        Sprite::square(Color::ENEMY, 25.0),
        Collider::new(12.0, Category::Enemy),
    )
    .unwrap()
}

fn occupancy_sum(sim: &GameWorld) -> u32 {
    let heatmap = sim.heatmap();
    let mut sum = 0;
    for row in 0..heatmap.rows() as i32 {
        for col in 0..heatmap.cols() as i32 {
            sum += sim.cell_occupancy(col, row);
        }
    }
    sum
}

#[test]
fn occupancy_sum_matches_active_in_bounds_non_player() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let player = spawn_player(&mut sim, 100.0, 100.0);
    for i in 0..10 {
        spawn_coin(&mut sim, 300.0 + i as f32 * 70.0, 400.0);
    }
    spawn_enemy(&mut sim, 900.0, 200.0, Velocity::ZERO);
    // Outside the grid.
    spawn_enemy(&mut sim, -50.0, 200.0, Velocity::ZERO);
    spawn_coin(&mut sim, 500.0, 800.0);
    // Allocated but never given an active collider.
    sim.allocate().unwrap();
    // Deactivated.
    let gone = spawn_coin(&mut sim, 600.0, 600.0);
    sim.deactivate(gone).unwrap();

    sim.run_collision_step(player).unwrap();

    let registry = sim.registry();
    let (cols, rows) = (sim.heatmap().cols() as i32, sim.heatmap().rows() as i32);
    let cell_size = sim.config().cell_size;
    let expected = registry
        .ids()
        .filter(|&id| id != player)
        .filter(|&id| registry.collider(id).unwrap().active)
        .filter(|&id| {
            let t = registry.transform(id).unwrap();
            let (c, r) = ((t.x / cell_size).floor() as i32, (t.y / cell_size).floor() as i32);
            (0..cols).contains(&c) && (0..rows).contains(&r)
        })
        .count() as u32;

    assert_eq!(expected, 11);
    assert_eq!(occupancy_sum(&sim), expected);
    assert_eq!(sim.heatmap().total(), 11);
}

#[test]
fn motion_step_is_exact_without_jitter_or_bounces() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let mut expected = Vec::new();
    for i in 0..25 {
        let start = Transform::new(100.0 + i as f32 * 30.0, 100.0 + i as f32 * 10.0);
        let vel = Velocity::new(8.0 - i as f32, 2.0 * i as f32 - 20.0);
        let id = spawn_enemy(&mut sim, start.x, start.y, vel);
        let dt = 0.25;
        expected.push((id, Transform::new(start.x + vel.vx * dt, start.y + vel.vy * dt), vel));
    }

    sim.run_motion_step(0.25);

    for (id, pos, vel) in expected {
        assert_eq!(*sim.transform(id).unwrap(), pos);
        assert_eq!(*sim.velocity(id).unwrap(), vel);
    }
}

#[test]
fn motion_step_covers_every_entity_with_odd_worker_split() {
    let config = SimConfig {
        worker_threads: Some(7),
        ..quiet_config()
    };
    let mut sim = GameWorld::with_config(config).unwrap();
    let ids: Vec<_> = (0..23)
        .map(|i| spawn_enemy(&mut sim, 200.0 + i as f32, 300.0, Velocity::new(10.0, 0.0)))
        .collect();

    sim.run_motion_step(1.0);

    for (i, id) in ids.into_iter().enumerate() {
        assert_eq!(sim.transform(id).unwrap().x, 210.0 + i as f32);
    }
}

#[test]
fn right_edge_flips_vx_only() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    // Right edge for a 25 unit sprite is 1280 - 25 = 1255.
    let enemy = spawn_enemy(&mut sim, 1255.0, 300.0, Velocity::new(50.0, 20.0));

    sim.run_motion_step(0.1);

    let vel = sim.velocity(enemy).unwrap();
    assert_eq!(vel.vx, -50.0);
    assert_eq!(vel.vy, 20.0);
    let pos = sim.transform(enemy).unwrap();
    assert_eq!(pos.y, 302.0);
}

#[test]
fn collision_step_with_no_colliders_is_idle() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let player = spawn_player(&mut sim, 640.0, 360.0);
    sim.allocate().unwrap();

    sim.run_collision_step(player).unwrap();
    sim.run_collision_step(player).unwrap();

    assert_eq!(occupancy_sum(&sim), 0);
    assert_eq!(sim.score(), 0);
    assert!(!sim.is_game_over());
}

#[test]
fn overlapping_coins_separate_to_combined_radius() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let player = spawn_player(&mut sim, 1000.0, 600.0);
    let a = spawn_coin(&mut sim, 100.0, 100.0);
    let b = spawn_coin(&mut sim, 105.0, 100.0);

    sim.run_collision_step(player).unwrap();

    let distance = sim.transform(a).unwrap().distance_to(sim.transform(b).unwrap());
    assert!(distance >= 16.0 - 1e-3, "coins still overlap: {}", distance);
    assert_eq!(sim.score(), 0);
}

#[test]
fn coins_across_cell_border_stay_overlapped() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let player = spawn_player(&mut sim, 1000.0, 600.0);
    // x = 128 is a cell border with 64 unit cells.
    let a = spawn_coin(&mut sim, 125.0, 100.0);
    let b = spawn_coin(&mut sim, 131.0, 100.0);

    sim.run_collision_step(player).unwrap();

    assert_eq!(sim.transform(a).unwrap().x, 125.0);
    assert_eq!(sim.transform(b).unwrap().x, 131.0);
}

#[test]
fn enemy_contact_ends_the_round() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let player = spawn_player(&mut sim, 640.0, 360.0);
    sim.registry_mut().velocity_mut(player).unwrap().vx = 350.0;
    spawn_enemy(&mut sim, 645.0, 360.0, Velocity::new(100.0, 0.0));

    sim.run_collision_step(player).unwrap();

    assert!(sim.is_game_over());
    assert_eq!(*sim.velocity(player).unwrap(), Velocity::ZERO);
}

#[test]
fn collision_step_is_a_no_op_after_game_over() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let player = spawn_player(&mut sim, 640.0, 360.0);
    spawn_enemy(&mut sim, 645.0, 360.0, Velocity::ZERO);
    sim.run_collision_step(player).unwrap();
    assert!(sim.is_game_over());

    let coin = spawn_coin(&mut sim, 630.0, 360.0);
    sim.run_collision_step(player).unwrap();

    assert_eq!(sim.score(), 0);
    assert!(sim.collider(coin).unwrap().active);
}

#[test]
fn player_far_outside_the_world_touches_nothing() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let player = spawn_player(&mut sim, 1.0e12, 360.0);
    let coin = spawn_coin(&mut sim, 1270.0, 360.0);
    spawn_enemy(&mut sim, 1250.0, 360.0, Velocity::ZERO);

    sim.run_collision_step(player).unwrap();

    sim.registry_mut().transform_mut(player).unwrap().y = f32::NEG_INFINITY;
    sim.run_collision_step(player).unwrap();

    assert_eq!(sim.score(), 0);
    assert!(!sim.is_game_over());
    assert!(sim.collider(coin).unwrap().active);
    assert_eq!(occupancy_sum(&sim), 2);
}

#[test]
fn one_frame_collects_every_touching_coin_and_ends_on_enemy() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let player = spawn_player(&mut sim, 640.0, 360.0);
    let left = spawn_coin(&mut sim, 625.0, 360.0);
    let right = spawn_coin(&mut sim, 655.0, 360.0);
    spawn_enemy(&mut sim, 640.0, 380.0, Velocity::ZERO);

    sim.run_collision_step(player).unwrap();

    assert_eq!(sim.score(), 2);
    assert!(sim.is_game_over());
    assert!(!sim.collider(left).unwrap().active);
    assert!(!sim.collider(right).unwrap().active);
}

#[test]
fn coin_is_collected_once() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let player = spawn_player(&mut sim, 640.0, 360.0);
    let coin = spawn_coin(&mut sim, 650.0, 365.0);

    sim.run_collision_step(player).unwrap();

    assert_eq!(sim.score(), 1);
    assert!(!sim.sprite(coin).unwrap().visible);
    assert!(!sim.collider(coin).unwrap().active);

    sim.run_collision_step(player).unwrap();
    assert_eq!(sim.score(), 1);
    assert_eq!(occupancy_sum(&sim), 0);
}

#[test]
fn reset_keeps_collected_coins_collected() {
    let mut sim = GameWorld::with_config(quiet_config()).unwrap();
    let player = spawn_player(&mut sim, 640.0, 360.0);
    let coin = spawn_coin(&mut sim, 620.0, 360.0);
    spawn_enemy(&mut sim, 660.0, 360.0, Velocity::ZERO);

    sim.run_collision_step(player).unwrap();
    assert_eq!(sim.score(), 1);
    assert!(sim.is_game_over());

    sim.reset();

    assert_eq!(sim.score(), 0);
    assert!(!sim.is_game_over());
    assert!(!sim.sprite(coin).unwrap().visible);
    assert_eq!(sim.sprite(player).unwrap().color, Color::PLAYER);
}

#[test]
fn allocation_beyond_capacity_fails() {
    let config = SimConfig {
        max_entities: 3,
        ..quiet_config()
    };
    let mut sim = GameWorld::with_config(config).unwrap();
    for _ in 0..3 {
        sim.allocate().unwrap();
    }

    let err = sim.allocate().unwrap_err();
    assert!(matches!(err, SimError::CapacityExhausted { capacity: 3 }));
    assert_eq!(sim.entity_count(), 3);
}

#[test]
fn full_frames_keep_grid_consistent() {
    let config = SimConfig {
        seed: Some(99),
        level: LevelConfig {
            enemy_count: 20,
            coin_count: 400,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut sim = GameWorld::new_default_level(config).unwrap();
    let player = sim.player().unwrap();

    for _ in 0..30 {
        let score_before = sim.score();
        sim.step(1.0 / 60.0);

        let collected = (sim.score() - score_before) as usize;
        let registry = sim.registry();
        let active = registry
            .ids()
            .filter(|&id| id != player && registry.collider(id).unwrap().active)
            .count();

        // Coins collected in this frame's contact pass were inserted before
        // they were deactivated; out-of-bounds entities were never inserted.
        assert!(sim.heatmap().total() <= active + collected);
        assert_eq!(occupancy_sum(&sim) as usize, sim.heatmap().total());

        if sim.is_game_over() {
            break;
        }
    }
}
