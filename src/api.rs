//! Public API for the simulation.
//!
//! [`GameWorld`] is the interface the host (window, input polling, renderer)
//! talks to. It owns the ECS world holding the registry, grid and round
//! state, and the schedules that advance it.
//!
//! ## Frame
//!
//! `step(dt)` runs input, motion and collision in that order, unless the
//! round is over, in which case the world is frozen until `reset()`. The
//! motion and collision phases are also exposed on their own as
//! `run_motion_step` and `run_collision_step`.

use crate::components::*;
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::heatmap::Heatmap;
use crate::level::{level_rng, spawn_level};
use crate::profiler::Profiler;
use crate::registry::{EntityId, Registry};
use crate::spatial::CollisionGrid;
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;

/// The main simulation world container.
pub struct GameWorld {
    world: World,
    input_schedule: Schedule,
    motion_schedule: Schedule,
    collision_schedule: Schedule,
    frame: u64,
    time: f32,
    profiler: Option<Profiler>,
}

impl GameWorld {
    /// Create an empty world with the default configuration.
    pub fn new() -> Self {
        Self::build(SimConfig::default())
    }

    /// Create an empty world after validating `config`.
    pub fn with_config(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Create a world and spawn the default level into it.
    pub fn new_default_level(config: SimConfig) -> Result<Self> {
        let mut sim = Self::with_config(config)?;
        sim.spawn_default_level()?;
        Ok(sim)
    }

    fn build(config: SimConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(Registry::with_capacity(config.max_entities, config.park_coordinate));
        world.insert_resource(CollisionGrid::from_config(&config));
        world.insert_resource(DeltaTime(0.0));
        world.insert_resource(GameState::default());
        world.insert_resource(ActivePlayer::default());
        world.insert_resource(PlayerInput::default());

        let profiler = config.profile.then(Profiler::new);
        log::debug!(
            "world {}x{}, {}x{} cells of {}, capacity {}, {} motion workers",
            config.world_width,
            config.world_height,
            config.grid_cols(),
            config.grid_rows(),
            config.cell_size,
            config.max_entities,
            config.worker_count()
        );
        world.insert_resource(config);

        let mut input_schedule = Schedule::default();
        input_schedule.add_systems(player_input_system);

        let mut motion_schedule = Schedule::default();
        motion_schedule.add_systems(motion_system);

        let mut collision_schedule = Schedule::default();
        collision_schedule.add_systems(collision_system);

        Self {
            world,
            input_schedule,
            motion_schedule,
            collision_schedule,
            frame: 0,
            time: 0.0,
            profiler,
        }
    }

    /// Spawn the default level and make its player the active one.
    pub fn spawn_default_level(&mut self) -> Result<EntityId> {
        let config = self.config().clone();
        let mut rng = level_rng(&config);
        let player = spawn_level(self.registry_mut(), &config, &mut rng)?;
        self.world.insert_resource(ActivePlayer(Some(player)));
        Ok(player)
    }

    /// Advance one frame by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        log::trace!("frame {} dt={}", self.frame, dt);
        if !self.is_game_over() {
            self.input_schedule.run(&mut self.world);
            self.run_motion_step(dt);
            self.collision_phase();
        }
        self.frame += 1;
        self.time += dt;
        if let Some(profiler) = self.profiler.as_mut() {
            profiler.end_frame();
        }
    }

    /// Integrate motion for every entity. Returns after all workers joined.
    pub fn run_motion_step(&mut self, dt: f32) {
        self.world.resource_mut::<DeltaTime>().0 = dt;
        let (schedule, world) = (&mut self.motion_schedule, &mut self.world);
        match self.profiler.as_mut() {
            Some(profiler) => profiler.time_section("motion", || schedule.run(world)),
            None => schedule.run(world),
        }
    }

    /// Rebuild the grid and resolve collisions around `player`.
    ///
    /// Does nothing once the round is over.
    pub fn run_collision_step(&mut self, player: EntityId) -> Result<()> {
        self.set_player(player)?;
        self.collision_phase();
        Ok(())
    }

    fn collision_phase(&mut self) {
        let (schedule, world) = (&mut self.collision_schedule, &mut self.world);
        match self.profiler.as_mut() {
            Some(profiler) => profiler.time_section("collision", || schedule.run(world)),
            None => schedule.run(world),
        }
    }

    /// Allocate a bare entity slot (inactive collider, visible, at rest).
    pub fn allocate(&mut self) -> Result<EntityId> {
        self.registry_mut().allocate()
    }

    /// Allocate an entity and set all of its components.
    pub fn spawn(
        &mut self,
        transform: Transform,
        velocity: Velocity,
        sprite: Sprite,
        collider: Collider,
    ) -> Result<EntityId> {
        self.registry_mut().spawn(transform, velocity, sprite, collider)
    }

    /// Soft-destroy an entity. Its slot is never reused.
    pub fn deactivate(&mut self, id: EntityId) -> Result<()> {
        self.registry_mut().deactivate(id)
    }

    /// Make `player` the entity collision checks are centred on.
    pub fn set_player(&mut self, player: EntityId) -> Result<()> {
        let registry = self.registry();
        if !registry.contains(player) {
            return Err(SimError::InvalidHandle {
                index: player.index(),
                count: registry.len(),
            });
        }
        self.world.resource_mut::<ActivePlayer>().0 = Some(player);
        Ok(())
    }

    pub fn player(&self) -> Option<EntityId> {
        self.world.resource::<ActivePlayer>().0
    }

    /// Set the directional input applied at the start of the next `step`.
    pub fn set_input(&mut self, input: PlayerInput) {
        *self.world.resource_mut::<PlayerInput>() = input;
    }

    /// Clear score and game-over and re-enable the player. Collected coins
    /// stay collected.
    pub fn reset(&mut self) {
        let player = self.player();
        self.world.resource_scope(|world, mut state: Mut<GameState>| {
            let mut registry = world.resource_mut::<Registry>();
            state.reset(&mut registry, player);
        });
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<GameState>().score
    }

    pub fn is_game_over(&self) -> bool {
        self.world.resource::<GameState>().game_over
    }

    /// Occupancy of grid cell `(col, row)` from the last collision step.
    pub fn cell_occupancy(&self, col: i32, row: i32) -> u32 {
        self.heatmap().cell_occupancy(col, row)
    }

    pub fn heatmap(&self) -> Heatmap<'_> {
        Heatmap::new(self.world.resource::<CollisionGrid>())
    }

    pub fn registry(&self) -> &Registry {
        self.world.resource::<Registry>()
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        self.world.resource_mut::<Registry>().into_inner()
    }

    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.registry().transform(id)
    }

    pub fn velocity(&self, id: EntityId) -> Option<&Velocity> {
        self.registry().velocity(id)
    }

    pub fn sprite(&self, id: EntityId) -> Option<&Sprite> {
        self.registry().sprite(id)
    }

    pub fn collider(&self, id: EntityId) -> Option<&Collider> {
        self.registry().collider(id)
    }

    pub fn entity_count(&self) -> usize {
        self.registry().len()
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            self.registry(),
            self.world.resource::<CollisionGrid>(),
            self.world.resource::<GameState>(),
            self.player(),
            self.frame,
            self.time,
        )
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(self.snapshot().to_json()?)
    }

    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Frame timings, if profiling is enabled in the config.
    pub fn profiler(&self) -> Option<&Profiler> {
        self.profiler.as_ref()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new()
    }
}
