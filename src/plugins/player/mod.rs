//! Player plugin.
//!
//! Pipeline:
//! - Update: sample devices into the `PlayerInput` snapshot
//! - FixedUpdate: set velocity from input (walk, jump, swim, drop-through)
//! - FixedPostUpdate:
//!   - Probe: ground/ceiling state against settled positions
//!   - Environment: fall damage, regeneration
//!   - Lifecycle: immediate respawn at the spawn point
//!   - Derive: consume latched input edges

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::player_layers;
use crate::common::state::{GameState, SimulationSet};
use crate::common::tunables::Tunables;
use crate::plugins::combat::lifecycle::detect_deaths;
use crate::plugins::combat::{CombatantKind, Died, Facing, Health, LifeState, Respawned, SpawnPoint};
use crate::plugins::physics::BodySize;
use crate::plugins::physics::platforms::DropThrough;
use crate::plugins::water::{Tilt, TiltVisual, WaterState};
use crate::plugins::weapons::{ChargeState, WeaponLoadout};
use crate::plugins::world::PLAYER_START;

pub mod fall;
pub mod input;
pub mod movement;
pub mod regen;
pub mod snapshot;

use fall::FallTracker;
use input::PlayerInput;
use movement::MovementState;
use regen::HealthRegen;

#[derive(Component, Debug, Clone, Copy)]
pub struct Player;

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .add_message::<snapshot::CaptureSnapshot>()
        .add_message::<snapshot::SnapshotTaken>()
        .add_message::<snapshot::RestoreSnapshot>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, input::gather_input)
        .add_systems(
            Update,
            (snapshot::capture_snapshot, snapshot::restore_snapshot)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedUpdate,
            movement::apply_movement.run_if(in_state(GameState::InGame)),
        );

    app.add_systems(
        FixedPostUpdate,
        movement::update_ground_state.in_set(SimulationSet::Probe),
    )
    .add_systems(
        FixedPostUpdate,
        (fall::track_falls, regen::regenerate).in_set(SimulationSet::Environment),
    )
    .add_systems(
        FixedPostUpdate,
        respawn_player
            .after(detect_deaths)
            .in_set(SimulationSet::Lifecycle),
    )
    .add_systems(
        FixedPostUpdate,
        input::consume_edges.in_set(SimulationSet::Derive),
    );
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) {
    let size = tunables.player.size;

    commands
        .spawn((
            (
                Name::new("Player"),
                Player,
                CombatantKind::Player,
                Health::new(tunables.player.max_health),
                LifeState::Alive,
                Facing::Right,
                SpawnPoint(PLAYER_START),
                BodySize(size),
            ),
            (
                MovementState::default(),
                FallTracker::default(),
                HealthRegen::default(),
                WaterState::default(),
                Tilt::default(),
                DropThrough::default(),
                WeaponLoadout::default(),
                ChargeState::default(),
            ),
            (
                Transform::from_translation(PLAYER_START.extend(1.0)),
                Visibility::default(),
                RigidBody::Dynamic,
                Collider::rectangle(size.x, size.y),
                LockedAxes::ROTATION_LOCKED,
                GravityScale(1.0),
                Friction::ZERO,
                LinearVelocity::ZERO,
                player_layers(),
                CollisionEventsEnabled,
                DespawnOnExit(GameState::InGame),
            ),
        ))
        .with_children(|body| {
            body.spawn((
                TiltVisual,
                Sprite {
                    color: Color::srgb(0.2, 0.75, 0.9),
                    custom_size: Some(size),
                    ..default()
                },
                Transform::default(),
            ));
        });
}

/// The player never stays dead: teleport to spawn, full health, all transient state cleared.
fn respawn_player(
    mut died: MessageReader<Died>,
    mut q_player: Query<
        (
            Entity,
            &mut LifeState,
            &mut Health,
            &mut Transform,
            &mut LinearVelocity,
            &mut GravityScale,
            &SpawnPoint,
            (
                &mut FallTracker,
                &mut WaterState,
                &mut DropThrough,
                &mut HealthRegen,
                &mut MovementState,
                &mut Tilt,
                &mut ChargeState,
            ),
        ),
        With<Player>,
    >,
    mut respawned: MessageWriter<Respawned>,
) {
    for ev in died.read() {
        if ev.kind != CombatantKind::Player {
            continue;
        }
        let Ok((e, mut life, mut health, mut tf, mut vel, mut gravity, spawn, transient)) =
            q_player.get_mut(ev.entity)
        else {
            continue;
        };
        let (mut fall, mut water, mut drop, mut regen, mut movement, mut tilt, mut charge) = transient;

        tf.translation.x = spawn.0.x;
        tf.translation.y = spawn.0.y;
        vel.0 = Vec2::ZERO;
        health.restore_full();

        fall.reset();
        water.clear();
        gravity.0 = water.gravity_scale();
        drop.clear();
        regen.on_damage();
        *movement = MovementState::default();
        *tilt = Tilt::default();
        charge.cancel();

        life.revive();
        info!("Player respawned at {:?}", spawn.0);
        respawned.write(Respawned { entity: e, kind: CombatantKind::Player });
    }
}
