//! Timed attack hitboxes and their cleanup.
//!
//! Every hitbox is a sensor carrying a [`DamageSource`], so hits go through the shared damage
//! contract. The owning entity dying or disappearing cancels the hitbox on the same tick.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::combat::{DamageSource, Died};

use super::charge::unit_height;

/// An attack volume owned by a combatant.
#[derive(Component, Debug, Clone, Copy)]
pub struct Hitbox {
    pub owner: Entity,
    /// Offset from the owner's position, already oriented by facing.
    pub offset: Vec2,
    /// Re-centre on the owner every tick.
    pub follow_owner: bool,
}

/// Despawn after the timer finishes.
#[derive(Component, Debug, Deref, DerefMut)]
pub struct Lifetime(pub Timer);

impl Lifetime {
    pub fn from_secs(secs: f32) -> Self {
        Self(Timer::from_seconds(secs, TimerMode::Once))
    }
}

/// One unit of a charged attack: dormant until its stagger delay passes, then rises out of the
/// ground, arcs and settles back to `rest` before expiring.
#[derive(Component, Debug, Clone)]
pub struct EffectUnit {
    pub delay: Timer,
    pub life: Timer,
    pub rest: Vec2,
    pub rise_depth: f32,
    pub arc_height: f32,
    pub active_layers: CollisionLayers,
}

impl EffectUnit {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.delay.is_finished()
    }

    /// Position for the current point of the unit's life.
    pub fn position(&self) -> Vec2 {
        if !self.is_active() {
            return self.rest - Vec2::Y * self.rise_depth;
        }
        self.rest + Vec2::Y * unit_height(self.life.fraction(), self.rise_depth, self.arc_height)
    }
}

/// Thrown projectile marker.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile;

/// Everything needed to put one hitbox into the world.
#[derive(Debug, Clone)]
pub struct HitboxSpec {
    pub name: &'static str,
    pub owner: Entity,
    pub origin: Vec2,
    pub offset: Vec2,
    pub size: Vec2,
    pub secs: f32,
    pub source: DamageSource,
    pub layers: CollisionLayers,
    pub follow_owner: bool,
    pub color: Color,
}

pub fn spawn_hitbox(commands: &mut Commands, spec: HitboxSpec) -> Entity {
    commands
        .spawn((
            Name::new(spec.name),
            Hitbox { owner: spec.owner, offset: spec.offset, follow_owner: spec.follow_owner },
            Lifetime::from_secs(spec.secs),
            spec.source.owned_by(spec.owner),
            Sprite {
                color: spec.color,
                custom_size: Some(spec.size),
                ..default()
            },
            Transform::from_translation((spec.origin + spec.offset).extend(2.0)),
            RigidBody::Kinematic,
            Collider::rectangle(spec.size.x, spec.size.y),
            Sensor,
            spec.layers,
            CollisionEventsEnabled,
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

/// Keep following hitboxes attached; drop any whose owner is gone.
pub fn follow_owners(
    mut commands: Commands,
    q_owners: Query<&Transform, Without<Hitbox>>,
    mut q_hitboxes: Query<(Entity, &Hitbox, &mut Transform)>,
) {
    for (e, hitbox, mut tf) in &mut q_hitboxes {
        let Ok(owner_tf) = q_owners.get(hitbox.owner) else {
            commands.entity(e).despawn();
            continue;
        };
        if hitbox.follow_owner {
            let p = owner_tf.translation.truncate() + hitbox.offset;
            tf.translation.x = p.x;
            tf.translation.y = p.y;
        }
    }
}

pub fn tick_lifetimes(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut q: Query<(Entity, &mut Lifetime)>,
) {
    for (e, mut lt) in &mut q {
        lt.tick(time.delta());
        if lt.is_finished() {
            commands.entity(e).despawn();
        }
    }
}

/// Advance charged-attack units: wake after the stagger delay, then follow the rise/arc curve.
pub fn tick_effect_units(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut q: Query<(Entity, &mut EffectUnit, &mut Transform, &mut CollisionLayers)>,
) {
    for (e, mut unit, mut tf, mut layers) in &mut q {
        if !unit.is_active() {
            unit.delay.tick(time.delta());
            if !unit.is_active() {
                continue;
            }
            *layers = unit.active_layers;
        } else {
            unit.life.tick(time.delta());
        }

        if unit.life.is_finished() {
            commands.entity(e).despawn();
            continue;
        }
        let p = unit.position();
        tf.translation.x = p.x;
        tf.translation.y = p.y;
    }
}

/// Thrown projectiles that leave the playable area are removed.
pub fn despawn_out_of_bounds(
    mut commands: Commands,
    tunables: Res<Tunables>,
    q: Query<(Entity, &Transform), With<Projectile>>,
) {
    let bounds = tunables.world_half_extents;
    for (e, tf) in &q {
        let p = tf.translation.truncate();
        if p.x.abs() > bounds.x || p.y.abs() > bounds.y {
            debug!("Projectile {e:?} left the world at {p:?}");
            commands.entity(e).despawn();
        }
    }
}

/// A dead attacker's pending attacks are cancelled immediately.
pub fn cancel_attacks_of_dead(
    mut commands: Commands,
    mut died: MessageReader<Died>,
    q_hitboxes: Query<(Entity, &Hitbox)>,
) {
    for ev in died.read() {
        for (e, hitbox) in &q_hitboxes {
            if hitbox.owner == ev.entity {
                commands.entity(e).despawn();
            }
        }
    }
}
