//! Player steering from directional input.
//!
//! Reading the keyboard is the host's job; it only fills in [`PlayerInput`].

use super::collision::ActivePlayer;
use crate::components::Velocity;
use crate::config::SimConfig;
use crate::registry::Registry;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Directional input held this frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl PlayerInput {
    /// Velocity for this input at `speed`. Opposite keys do not cancel:
    /// down wins over up and right wins over left.
    pub fn velocity(&self, speed: f32) -> Velocity {
        let mut vel = Velocity::ZERO;
        if self.up {
            vel.vy = -speed;
        }
        if self.down {
            vel.vy = speed;
        }
        if self.left {
            vel.vx = -speed;
        }
        if self.right {
            vel.vx = speed;
        }
        vel
    }
}

/// System that overwrites the player's velocity from the current input.
pub fn player_input_system(
    input: Res<PlayerInput>,
    player: Res<ActivePlayer>,
    config: Res<SimConfig>,
    mut registry: ResMut<Registry>,
) {
    let Some(player) = player.0 else {
        return;
    };
    if let Some(vel) = registry.velocity_mut(player) {
        *vel = input.velocity(config.player_speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::*;

    #[test]
    fn test_input_velocity() {
        let idle = PlayerInput::default();
        assert_eq!(idle.velocity(350.0), Velocity::ZERO);

        let up_right = PlayerInput {
            up: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(up_right.velocity(350.0), Velocity::new(350.0, -350.0));

        let both = PlayerInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.velocity(10.0).vx, 10.0);
    }

    #[test]
    fn test_input_system_steers_player() {
        let mut world = World::new();
        let mut registry = Registry::with_capacity(4, -10_000.0);
        let player = registry
            .spawn(
                Transform::new(10.0, 10.0),
                Velocity::new(5.0, 5.0),
                Sprite::square(Color::PLAYER, 30.0),
                Collider::new(15.0, Category::Player),
            )
            .unwrap();
        world.insert_resource(registry);
        world.insert_resource(SimConfig::default());
        world.insert_resource(ActivePlayer(Some(player)));
        world.insert_resource(PlayerInput {
            left: true,
            ..Default::default()
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(player_input_system);
        schedule.run(&mut world);

        let registry = world.resource::<Registry>();
        assert_eq!(*registry.velocity(player).unwrap(), Velocity::new(-350.0, 0.0));
    }
}
