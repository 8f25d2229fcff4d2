//! Headless run of the default arena level.
//!
//! Run with: RUST_LOG=debug cargo run --example basic_demo

use grid_arena::{heat_tint, GameWorld, PlayerInput, SimConfig};

fn main() {
    let _ = env_logger::Builder::from_default_env().try_init();

    println!("=== Grid Arena - Simulation Demo ===\n");

    let config = SimConfig {
        seed: Some(7),
        profile: true,
        ..Default::default()
    };
    println!(
        "World {}x{}, {}x{} grid cells, {} motion workers\n",
        config.world_width,
        config.world_height,
        config.grid_cols(),
        config.grid_rows(),
        config.worker_count()
    );

    let mut sim = match GameWorld::new_default_level(config) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("failed to build level: {}", err);
            return;
        }
    };

    // Sweep the player around the arena in a square.
    let legs = [
        PlayerInput {
            right: true,
            ..Default::default()
        },
        PlayerInput {
            down: true,
            ..Default::default()
        },
        PlayerInput {
            left: true,
            ..Default::default()
        },
        PlayerInput {
            up: true,
            ..Default::default()
        },
    ];

    let dt = 1.0 / 60.0;
    for frame in 0..600 {
        sim.set_input(legs[(frame / 30) % legs.len()]);
        sim.step(dt);

        if (frame + 1) % 60 == 0 {
            print_status(&sim);
        }
        if sim.is_game_over() {
            println!(
                "\n--- Game over at frame {} (score {}) ---",
                sim.current_frame(),
                sim.score()
            );
            print_heatmap(&sim);
            println!("\n--- Resetting round ---\n");
            sim.reset();
        }
    }

    print_heatmap(&sim);

    if let Some(profiler) = sim.profiler() {
        profiler.log_summary();
    }

    match sim.snapshot_json() {
        Ok(json) => println!("\nFinal snapshot: {} bytes of JSON", json.len()),
        Err(err) => eprintln!("snapshot failed: {}", err),
    }
}

fn print_status(sim: &GameWorld) {
    let heatmap = sim.heatmap();
    let hottest = heatmap
        .hottest()
        .map(|(c, r, n)| format!("({}, {}) x{}", c, r, n))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  frame {:>4} t={:>5.2}s score={:>4} in-grid={:>5} hottest cell {}",
        sim.current_frame(),
        sim.current_time(),
        sim.score(),
        heatmap.total(),
        hottest
    );
}

fn print_heatmap(sim: &GameWorld) {
    let heatmap = sim.heatmap();
    println!("\n  Occupancy heatmap (. empty, g sparse, R crowded):");
    for row in 0..heatmap.rows() as i32 {
        let line: String = (0..heatmap.cols() as i32)
            .map(|col| match heat_tint(heatmap.cell_occupancy(col, row)) {
                None => '.',
                Some([255, _, _, _]) => 'R',
                Some([_, 255, _, _]) => 'g',
                Some(_) => 'o',
            })
            .collect();
        println!("    {}", line);
    }
}
