//! Interactive level objects: doors, falling platforms, checkpoints and teleporters.
//!
//! All of them react to the player touching a trigger and then run on explicit timers
//! advanced once per fixed tick. Timers live on the objects, so tearing the level down
//! cancels them with it.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::state::SimulationSet;

pub mod door;
pub mod falling;
pub mod waypoints;

pub use door::{Door, DoorZone, spawn_door};
pub use falling::{FallingCopy, FallingPlatform, spawn_falling_platform};
pub use waypoints::{Checkpoint, Teleporter, spawn_checkpoint, spawn_teleporter};

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedPostUpdate,
        (
            door::track_door_zones,
            door::animate_doors,
            falling::arm_falling_platforms,
            falling::tick_falling_platforms,
            falling::tick_falling_copies,
            waypoints::activate_checkpoints,
            waypoints::use_teleporters,
        )
            .chain()
            .in_set(SimulationSet::Environment),
    );
}

#[inline]
fn owner(collider: Entity, body: Option<Entity>) -> Entity {
    body.unwrap_or(collider)
}

/// Split a contact into `(object, other)` when one side passes `is_object`.
///
/// The object side is matched by collider (sensors and zones have no body of their own);
/// the other side resolves to its rigid body.
pub(crate) fn object_contact(
    collider1: Entity,
    body1: Option<Entity>,
    collider2: Entity,
    body2: Option<Entity>,
    is_object: impl Fn(Entity) -> bool,
) -> Option<(Entity, Entity)> {
    if is_object(collider1) {
        Some((collider1, owner(collider2, body2)))
    } else if is_object(collider2) {
        Some((collider2, owner(collider1, body1)))
    } else {
        None
    }
}

pub(crate) fn started_pair(ev: &CollisionStart, is_object: impl Fn(Entity) -> bool) -> Option<(Entity, Entity)> {
    object_contact(ev.collider1, ev.body1, ev.collider2, ev.body2, is_object)
}

pub(crate) fn ended_pair(ev: &CollisionEnd, is_object: impl Fn(Entity) -> bool) -> Option<(Entity, Entity)> {
    object_contact(ev.collider1, ev.body1, ev.collider2, ev.body2, is_object)
}

#[cfg(test)]
mod tests;
