//! ECS systems for the arena simulation.
//!
//! Systems contain the game logic that operates on the registry.
//!
//! ## Frame Order
//!
//! A frame runs three systems, each in its own schedule, one after another:
//!
//! 1. `player_input_system` - steers the player from [`PlayerInput`].
//! 2. `motion_system` - integrates every entity in parallel chunks and joins
//!    all workers before returning.
//! 3. `collision_system` - single-threaded grid rebuild, coin separation
//!    and player contacts, reading the positions written by step 2.
//!
//! Step 3 never overlaps step 2: its schedule only starts once the motion
//! schedule has returned, and the motion system joins its workers first.

pub mod collision;
pub mod input;
pub mod motion;

pub use collision::*;
pub use input::*;
pub use motion::*;
