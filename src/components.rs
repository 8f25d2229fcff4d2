//! Component data for arena entities.
//!
//! Components are pure data rows. The [`Registry`](crate::registry::Registry)
//! stores one dense array per component type and all simulation logic lives
//! in the systems that read and write those arrays.

use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in world units (x grows right, y grows down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
}

impl Transform {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: &Transform) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &Transform) -> f32 {
        self.distance_sq(other).sqrt()
    }
}

/// 2D velocity vector in world units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { vx: 0.0, vy: 0.0 };

    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    /// True when either axis is nonzero. Only moving entities bounce.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.vx != 0.0 || self.vy != 0.0
    }
}

// ============================================================================
// RENDER COMPONENTS
// ============================================================================

/// Opaque RGB render color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const PLAYER: Color = Color::rgb(0, 255, 0);
    pub const ENEMY: Color = Color::rgb(255, 50, 50);
    pub const COIN: Color = Color::rgb(255, 215, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Render state of an entity.
///
/// `visible == false` doubles as the "destroyed" marker: every system skips
/// invisible entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub visible: bool,
    pub color: Color,
    /// Render extent along x, also used as the right-edge inset for bouncing.
    pub w: f32,
    /// Render extent along y, also used as the bottom-edge inset for bouncing.
    pub h: f32,
}

impl Sprite {
    pub fn new(color: Color, w: f32, h: f32) -> Self {
        Self {
            visible: true,
            color,
            w,
            h,
        }
    }

    pub fn square(color: Color, size: f32) -> Self {
        Self::new(color, size, size)
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new(Color::default(), 0.0, 0.0)
    }
}

// ============================================================================
// COLLISION COMPONENTS
// ============================================================================

/// Gameplay category of a collider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    None,
    Player,
    Enemy,
    Coin,
}

/// Circular collider. Inactive colliders never enter the spatial grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub active: bool,
    pub radius: f32,
    pub category: Category,
}

impl Collider {
    pub fn new(radius: f32, category: Category) -> Self {
        Self {
            active: true,
            radius,
            category,
        }
    }

    #[inline]
    pub fn is_coin(&self) -> bool {
        self.category == Category::Coin
    }
}
