//! Weapons plugin: two-slot loadout, pickups, and the four attack archetypes.
//!
//! Pipeline (FixedPostUpdate):
//! - Environment: collect pickups on Interact
//! - Attacks: cycle slots, dispatch actions, move and expire hitboxes
//! - Lifecycle: cancel hitboxes whose owner died

use bevy::prelude::*;

use crate::common::state::SimulationSet;
use crate::plugins::combat::lifecycle::detect_deaths;

pub mod actions;
pub mod charge;
pub mod hitbox;
pub mod loadout;
pub mod pickup;

pub use charge::ChargeState;
pub use hitbox::{Hitbox, HitboxSpec, Lifetime, spawn_hitbox};
pub use loadout::{ActionSide, LoadoutError, WeaponKind, WeaponLoadout};
pub use pickup::{WeaponPickup, spawn_pickup};

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedPostUpdate,
        pickup::collect_pickups.in_set(SimulationSet::Environment),
    )
    .add_systems(
        FixedPostUpdate,
        (
            actions::cycle_weapons,
            actions::player_weapon_actions,
            hitbox::follow_owners,
            hitbox::tick_effect_units,
            hitbox::tick_lifetimes,
            hitbox::despawn_out_of_bounds,
        )
            .chain()
            .in_set(SimulationSet::Attacks),
    )
    .add_systems(
        FixedPostUpdate,
        hitbox::cancel_attacks_of_dead
            .after(detect_deaths)
            .in_set(SimulationSet::Lifecycle),
    );
}
