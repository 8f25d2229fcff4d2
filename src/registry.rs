//! Fixed-capacity entity registry.
//!
//! Entities are dense indices into parallel component arrays. Handles are
//! bump-allocated and never reused: "destroying" an entity is a soft
//! deactivation that leaves its row in place.

use crate::components::*;
use crate::error::{Result, SimError};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense handle of an arena entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structure-of-arrays storage for every arena entity.
///
/// All arrays are sized to `capacity` up front; `len` marks the allocated
/// prefix. The `links` array is the intrusive "next" slot used by the
/// spatial grid to chain entities that share a cell.
#[derive(Resource, Debug)]
pub struct Registry {
    transforms: Vec<Transform>,
    velocities: Vec<Velocity>,
    sprites: Vec<Sprite>,
    colliders: Vec<Collider>,
    links: Vec<Option<EntityId>>,
    len: usize,
    park_coordinate: f32,
}

impl Registry {
    pub fn with_capacity(capacity: usize, park_coordinate: f32) -> Self {
        Self {
            transforms: vec![Transform::default(); capacity],
            velocities: vec![Velocity::default(); capacity],
            sprites: vec![Sprite::default(); capacity],
            colliders: vec![Collider::default(); capacity],
            links: vec![None; capacity],
            len: 0,
            park_coordinate,
        }
    }

    pub fn capacity(&self) -> usize {
        self.transforms.len()
    }

    /// Number of entities allocated so far. Never decreases.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: EntityId) -> bool {
        id.index() < self.len
    }

    /// Hand out the next slot with an inactive collider, a visible sprite,
    /// zero velocity and no grid link.
    pub fn allocate(&mut self) -> Result<EntityId> {
        if self.len >= self.capacity() {
            log::warn!("entity allocation refused: capacity {} exhausted", self.capacity());
            return Err(SimError::CapacityExhausted {
                capacity: self.capacity(),
            });
        }
        let index = self.len;
        self.len += 1;

        self.colliders[index].active = false;
        self.sprites[index].visible = true;
        self.velocities[index] = Velocity::ZERO;
        self.links[index] = None;

        Ok(EntityId(index as u32))
    }

    /// Allocate a slot and fill in all of its components.
    pub fn spawn(
        &mut self,
        transform: Transform,
        velocity: Velocity,
        sprite: Sprite,
        collider: Collider,
    ) -> Result<EntityId> {
        let id = self.allocate()?;
        let i = id.index();
        self.transforms[i] = transform;
        self.velocities[i] = velocity;
        self.sprites[i] = sprite;
        self.colliders[i] = collider;
        Ok(id)
    }

    /// Soft-destroy an entity: hide it, disable its collider and park it far
    /// outside the grid. The slot is never reclaimed.
    pub fn deactivate(&mut self, id: EntityId) -> Result<()> {
        let i = self.check(id)?;
        self.sprites[i].visible = false;
        self.colliders[i].active = false;
        self.transforms[i] = Transform::new(self.park_coordinate, self.park_coordinate);
        Ok(())
    }

    fn check(&self, id: EntityId) -> Result<usize> {
        if self.contains(id) {
            Ok(id.index())
        } else {
            Err(SimError::InvalidHandle {
                index: id.index(),
                count: self.len,
            })
        }
    }

    /// Iterate every allocated handle, including deactivated ones.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> {
        (0..self.len as u32).map(EntityId)
    }

    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.transforms[..self.len].get(id.index())
    }

    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.transforms[..self.len].get_mut(id.index())
    }

    pub fn velocity(&self, id: EntityId) -> Option<&Velocity> {
        self.velocities[..self.len].get(id.index())
    }

    pub fn velocity_mut(&mut self, id: EntityId) -> Option<&mut Velocity> {
        self.velocities[..self.len].get_mut(id.index())
    }

    pub fn sprite(&self, id: EntityId) -> Option<&Sprite> {
        self.sprites[..self.len].get(id.index())
    }

    pub fn sprite_mut(&mut self, id: EntityId) -> Option<&mut Sprite> {
        self.sprites[..self.len].get_mut(id.index())
    }

    pub fn collider(&self, id: EntityId) -> Option<&Collider> {
        self.colliders[..self.len].get(id.index())
    }

    pub fn collider_mut(&mut self, id: EntityId) -> Option<&mut Collider> {
        self.colliders[..self.len].get_mut(id.index())
    }

    /// Allocated prefix of the transform and velocity arrays, mutable, with
    /// the sprite and collider arrays read-only alongside.
    pub(crate) fn motion_slices(
        &mut self,
    ) -> (&mut [Transform], &mut [Velocity], &[Sprite], &[Collider]) {
        let n = self.len;
        (
            &mut self.transforms[..n],
            &mut self.velocities[..n],
            &self.sprites[..n],
            &self.colliders[..n],
        )
    }

    /// Next entity in the same grid cell, as of the last grid rebuild.
    #[inline]
    pub(crate) fn link(&self, id: EntityId) -> Option<EntityId> {
        self.links[id.index()]
    }

    #[inline]
    pub(crate) fn set_link(&mut self, id: EntityId, next: Option<EntityId>) {
        self.links[id.index()] = next;
    }
}
