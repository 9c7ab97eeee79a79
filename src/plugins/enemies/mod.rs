//! Enemies plugin: hostile combatants driven by the shared AI brain.
//!
//! ---------------------------
//! FACTS VS. PRESENTATION
//! ---------------------------
//! - Gameplay truth lives in `Health`, `LifeState`, `AiBrain` and `CollisionLayers`.
//! - The combat lifecycle fires `Died`/`Respawned`; this module only applies the enemy-specific
//!   consequences (collision off while dead, brain reset, physics flags).
//! - Sprite colour is derived every frame from life state plus a decaying `HitFlash`.
//!
//! ---------------------------
//! DEATH WITHOUT DESPAWN
//! ---------------------------
//! A dead enemy stays in the world with empty collision filters and no gravity, so nothing
//! touches it and it does not sink through the floor. The respawn timer lives in its
//! `LifeState`; on `Respawned` the layers and gravity are restored.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{Layer, enemy_layers, non_interacting};
use crate::common::state::{GameState, SimulationSet};
use crate::common::tunables::AiTunables;
use crate::plugins::ai::AiBrain;
use crate::plugins::combat::lifecycle::{detect_deaths, tick_respawns};
use crate::plugins::combat::{
    CombatantKind, DamageTaken, Died, Facing, Health, LifeState, RespawnDelay, Respawned, SpawnPoint,
};
use crate::plugins::physics::BodySize;

const ALIVE_COLOR: Color = Color::srgb(0.9, 0.25, 0.25);
const DEAD_COLOR: Color = Color::srgba(0.35, 0.35, 0.35, 0.4);

// -----------------------------------------------------------------------------
// Newtypes
// -----------------------------------------------------------------------------

/// Value normalized to [0..1]. Clamped on write so readers never re-clamp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct UnitF32(f32);

impl UnitF32 {
    #[inline]
    fn get(self) -> f32 {
        self.0
    }

    #[inline]
    fn set_max(&mut self, v: f32) {
        self.0 = self.0.max(v.clamp(0.0, 1.0));
    }

    #[inline]
    fn decay_to_zero(&mut self, rate_per_sec: f32, dt: f32) {
        self.0 = (self.0 - rate_per_sec * dt).max(0.0);
    }
}

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy;

/// Presentation-only: brief white flash after taking damage.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct HitFlash(UnitF32);

impl HitFlash {
    const DECAY_PER_SEC: f32 = 6.0;

    pub fn intensity(&self) -> f32 {
        self.0.get()
    }
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

/// Schedules:
/// - FixedPostUpdate/Lifecycle: react to death and respawn after the shared lifecycle ran.
/// - Update: derive sprite colour.
pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedPostUpdate,
        (
            on_enemy_died.after(detect_deaths),
            on_enemy_respawned.after(tick_respawns),
        )
            .in_set(SimulationSet::Lifecycle),
    );

    app.add_systems(
        Update,
        (flash_on_damage, tint_enemies)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}

// -----------------------------------------------------------------------------
// Spawn
// -----------------------------------------------------------------------------

/// Spawn one enemy at `at`. Non-aggressive enemies stand still until something flags them.
pub fn spawn_enemy(commands: &mut Commands, at: Vec2, tuning: &AiTunables, aggressive: bool) -> Entity {
    let size = tuning.size;
    let mut e = commands.spawn((
        (
            Name::new("Enemy"),
            Enemy,
            CombatantKind::Enemy,
            Health::new(tuning.max_health),
            LifeState::Alive,
            SpawnPoint(at),
            Facing::Left,
            AiBrain::new(*tuning, aggressive),
            BodySize(size),
            HitFlash::default(),
        ),
        (
            Sprite {
                color: ALIVE_COLOR,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(at.extend(1.0)),
            RigidBody::Dynamic,
            Collider::rectangle(size.x, size.y),
            LockedAxes::ROTATION_LOCKED,
            GravityScale(1.0),
            Friction::ZERO,
            LinearVelocity::ZERO,
            enemy_layers(),
            DespawnOnExit(GameState::InGame),
        ),
    ));
    if let Some(secs) = tuning.respawn_secs {
        e.insert(RespawnDelay(secs));
    }
    e.id()
}

// -----------------------------------------------------------------------------
// Rules: death and respawn consequences
// -----------------------------------------------------------------------------

type EnemyBody = (
    &'static mut LinearVelocity,
    &'static mut CollisionLayers,
    &'static mut GravityScale,
    &'static mut AiBrain,
);

/// Stop, stop colliding, forget the target.
fn on_enemy_died(mut died: MessageReader<Died>, mut q: Query<EnemyBody, With<Enemy>>) {
    for ev in died.read() {
        let Ok((mut vel, mut layers, mut gravity, mut brain)) = q.get_mut(ev.entity) else {
            continue;
        };
        vel.0 = Vec2::ZERO;
        *layers = non_interacting(Layer::Enemy);
        gravity.0 = 0.0;
        brain.reset();
    }
}

/// Solid again, falling again, thinking from scratch.
fn on_enemy_respawned(mut respawned: MessageReader<Respawned>, mut q: Query<EnemyBody, With<Enemy>>) {
    for ev in respawned.read() {
        let Ok((mut vel, mut layers, mut gravity, mut brain)) = q.get_mut(ev.entity) else {
            continue;
        };
        vel.0 = Vec2::ZERO;
        *layers = enemy_layers();
        gravity.0 = 1.0;
        brain.reset();
    }
}

// -----------------------------------------------------------------------------
// Presentation
// -----------------------------------------------------------------------------

fn flash_on_damage(
    time: Res<Time>,
    mut taken: MessageReader<DamageTaken>,
    mut q: Query<&mut HitFlash, With<Enemy>>,
) {
    let dt = time.delta_secs();
    for mut flash in &mut q {
        flash.0.decay_to_zero(HitFlash::DECAY_PER_SEC, dt);
    }
    for ev in taken.read() {
        if let Ok(mut flash) = q.get_mut(ev.target) {
            flash.0.set_max(1.0);
        }
    }
}

/// Colour derived from facts: grey while dead, flashing toward white when hit.
pub fn enemy_color(life: &LifeState, flash: f32) -> Color {
    if !life.is_alive() {
        return DEAD_COLOR;
    }
    let base = ALIVE_COLOR.to_srgba();
    let t = flash.clamp(0.0, 1.0);
    Color::srgb(
        base.red + (1.0 - base.red) * t,
        base.green + (1.0 - base.green) * t,
        base.blue + (1.0 - base.blue) * t,
    )
}

fn tint_enemies(mut q: Query<(&LifeState, &HitFlash, &mut Sprite), With<Enemy>>) {
    for (life, flash, mut sprite) in &mut q {
        sprite.color = enemy_color(life, flash.intensity());
    }
}

#[cfg(test)]
mod tests;
