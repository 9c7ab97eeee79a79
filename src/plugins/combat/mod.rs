//! Combat plugin: health, the damage contract, and the death/respawn lifecycle.
//!
//! Every damage path funnels through this module:
//! - contact damage from [`DamageSource`] sensors (hazards, hitboxes, projectiles),
//! - instant damage via [`DealDamage`] messages (falls, drowning, targeted abilities).
//!
//! Both write [`DamageTaken`]. The lifecycle step then turns depleted health into exactly one
//! [`Died`] per death and counts down timed respawns.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::{GameState, SimulationSet};

pub mod components;
pub mod damage;
pub mod lifecycle;
pub mod messages;

pub use components::*;
pub use damage::{DamageContacts, DamageSource, TargetFilter, apply_if_due};
pub use messages::*;

pub fn plugin(app: &mut App) {
    app.add_message::<DealDamage>()
        .add_message::<DamageTaken>()
        .add_message::<Died>()
        .add_message::<Respawned>();

    app.configure_sets(
        FixedPostUpdate,
        (
            SimulationSet::Probe,
            SimulationSet::Environment,
            SimulationSet::Ai,
            SimulationSet::Attacks,
            SimulationSet::Damage,
            SimulationSet::Lifecycle,
            SimulationSet::Derive,
        )
            .chain()
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        (
            damage::track_damage_contacts,
            damage::resolve_contact_damage,
            damage::apply_damage_requests,
        )
            .chain()
            .in_set(SimulationSet::Damage),
    );

    app.add_systems(
        FixedPostUpdate,
        (
            lifecycle::detect_deaths,
            lifecycle::forget_dead_targets,
            lifecycle::tick_respawns,
        )
            .chain()
            .in_set(SimulationSet::Lifecycle),
    );

    app.add_systems(PostUpdate, lifecycle::despawn_marked);
}

#[cfg(test)]
mod tests;
