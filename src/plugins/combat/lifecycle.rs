//! Alive -> Dead -> Alive transitions shared by every combatant.
//!
//! Kind-specific consequences (teleport, disabling collision, removal) are handled by the
//! owning plugin in reaction to [`Died`] and [`Respawned`].

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{CombatantKind, Health, LifeState, PendingDespawn, RespawnDelay, SpawnPoint};
use super::damage::DamageContacts;
use super::messages::{Died, Respawned};

/// Fire the death transition for every combatant whose health hit zero.
pub fn detect_deaths(
    mut q: Query<(Entity, &CombatantKind, &Health, &mut LifeState, Option<&RespawnDelay>)>,
    mut died: MessageWriter<Died>,
) {
    for (e, kind, health, mut life, delay) in &mut q {
        if !health.is_depleted() {
            continue;
        }
        if life.kill(delay.map(|d| d.0)) {
            info!("{kind:?} {e:?} died");
            died.write(Died { entity: e, kind: *kind });
        }
    }
}

/// A dead entity is no longer "in contact" with anything that hurts it.
pub fn forget_dead_targets(mut died: MessageReader<Died>, mut q_sources: Query<&mut DamageContacts>) {
    for ev in died.read() {
        for mut contacts in &mut q_sources {
            contacts.end(ev.entity);
        }
    }
}

/// Count down timed respawns; revive at the spawn point with full health.
pub fn tick_respawns(
    time: Res<Time<Fixed>>,
    mut q: Query<(
        Entity,
        &CombatantKind,
        &mut LifeState,
        &mut Health,
        &mut Transform,
        Option<&SpawnPoint>,
        Option<&mut LinearVelocity>,
    )>,
    mut respawned: MessageWriter<Respawned>,
) {
    for (e, kind, mut life, mut health, mut tf, spawn, vel) in &mut q {
        if !life.tick_respawn(time.delta()) {
            continue;
        }
        life.revive();
        health.restore_full();
        if let Some(spawn) = spawn {
            tf.translation.x = spawn.0.x;
            tf.translation.y = spawn.0.y;
        }
        if let Some(mut vel) = vel {
            vel.0 = Vec2::ZERO;
        }
        info!("{kind:?} {e:?} respawned");
        respawned.write(Respawned { entity: e, kind: *kind });
    }
}

/// Despawn entities marked for removal. Runs in `PostUpdate`.
pub fn despawn_marked(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
