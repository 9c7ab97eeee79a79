//! Checkpoints set the player's spawn point; teleporters move the player to a destination.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::trigger_layers;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::combat::SpawnPoint;
use crate::plugins::player::Player;
use crate::plugins::player::fall::FallTracker;

use super::started_pair;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Checkpoint {
    pub activated: bool,
}

impl Checkpoint {
    /// First activation only.
    pub fn activate(&mut self) -> bool {
        !std::mem::replace(&mut self.activated, true)
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Teleporter {
    pub destination: Vec2,
    last_used: Option<f32>,
}

impl Teleporter {
    pub fn new(destination: Vec2) -> Self {
        Self { destination, last_used: None }
    }

    /// Use the teleporter at `now` unless it fired within the guard window.
    pub fn try_use(&mut self, now: f32, guard_secs: f32) -> Option<Vec2> {
        if self.last_used.is_some_and(|t| now - t <= guard_secs) {
            return None;
        }
        self.last_used = Some(now);
        Some(self.destination)
    }
}

fn trigger_bundle(name: &'static str, at: Vec2, size: Vec2, color: Color) -> impl Bundle {
    (
        Name::new(name),
        Sprite {
            color,
            custom_size: Some(size),
            ..default()
        },
        Transform::from_translation(at.extend(0.0)),
        Collider::rectangle(size.x, size.y),
        Sensor,
        trigger_layers(),
        CollisionEventsEnabled,
        DespawnOnExit(GameState::InGame),
    )
}

pub fn spawn_checkpoint(commands: &mut Commands, at: Vec2) -> Entity {
    commands
        .spawn((
            Checkpoint::default(),
            trigger_bundle("Checkpoint", at, Vec2::new(0.6, 1.6), Color::srgb(0.5, 0.5, 0.6)),
        ))
        .id()
}

pub fn spawn_teleporter(commands: &mut Commands, at: Vec2, destination: Vec2) -> Entity {
    commands
        .spawn((
            Teleporter::new(destination),
            trigger_bundle("Teleporter", at, Vec2::new(1.0, 1.6), Color::srgb(0.6, 0.3, 0.9)),
        ))
        .id()
}

pub fn activate_checkpoints(
    mut started: MessageReader<CollisionStart>,
    mut q_checkpoints: Query<(&Transform, &mut Checkpoint, Option<&mut Sprite>)>,
    mut q_player: Query<&mut SpawnPoint, With<Player>>,
) {
    for ev in started.read() {
        let Some((cp, other)) = started_pair(ev, |e| q_checkpoints.contains(e)) else {
            continue;
        };
        let Ok(mut spawn) = q_player.get_mut(other) else {
            continue;
        };
        let Ok((tf, mut checkpoint, sprite)) = q_checkpoints.get_mut(cp) else {
            continue;
        };
        if !checkpoint.activate() {
            continue;
        }
        spawn.0 = tf.translation.truncate();
        if let Some(mut sprite) = sprite {
            sprite.color = Color::srgb(0.95, 0.85, 0.3);
        }
        info!("Checkpoint reached at {:?}", spawn.0);
    }
}

pub fn use_teleporters(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut started: MessageReader<CollisionStart>,
    mut q_teleporters: Query<&mut Teleporter>,
    mut q_player: Query<(&mut Transform, &mut LinearVelocity, &mut FallTracker), With<Player>>,
) {
    let now = time.elapsed_secs();
    for ev in started.read() {
        let Some((pad, other)) = started_pair(ev, |e| q_teleporters.contains(e)) else {
            continue;
        };
        let Ok((mut tf, mut vel, mut fall)) = q_player.get_mut(other) else {
            continue;
        };
        let Ok(mut teleporter) = q_teleporters.get_mut(pad) else {
            continue;
        };
        let Some(dest) = teleporter.try_use(now, tunables.environment.teleport_guard_secs) else {
            debug!("Teleporter {pad:?} still guarded");
            continue;
        };
        tf.translation.x = dest.x;
        tf.translation.y = dest.y;
        vel.0 = Vec2::ZERO;
        fall.reset();
        info!("Teleported to {dest:?}");
    }
}
