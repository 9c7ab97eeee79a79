//! Scene-boundary snapshot of the player.
//!
//! Producing and consuming the snapshot is in scope; where it is stored is not.

use avian2d::prelude::*;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::plugins::combat::Health;
use crate::plugins::weapons::WeaponLoadout;

use super::Player;
use super::fall::FallTracker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: [f32; 3],
    pub health: u32,
    /// Opaque loadout entries, one per occupied slot.
    pub inventory: Vec<String>,
}

#[derive(Message, Debug, Clone, Copy, Default)]
pub struct CaptureSnapshot;

#[derive(Message, Debug, Clone)]
pub struct SnapshotTaken(pub PlayerSnapshot);

#[derive(Message, Debug, Clone)]
pub struct RestoreSnapshot(pub PlayerSnapshot);

pub fn capture_snapshot(
    mut requests: MessageReader<CaptureSnapshot>,
    q_player: Query<(&Transform, &Health, &WeaponLoadout), With<Player>>,
    mut taken: MessageWriter<SnapshotTaken>,
) {
    if requests.read().count() == 0 {
        return;
    }
    let Ok((tf, health, loadout)) = q_player.single() else {
        debug!("Snapshot requested without a player");
        return;
    };
    taken.write(SnapshotTaken(PlayerSnapshot {
        position: tf.translation.to_array(),
        health: health.current(),
        inventory: loadout.inventory(),
    }));
}

/// Apply the latest restore request. A zero-health snapshot restores at full health.
pub fn restore_snapshot(
    mut requests: MessageReader<RestoreSnapshot>,
    mut q_player: Query<
        (
            &mut Transform,
            &mut Health,
            &mut WeaponLoadout,
            &mut LinearVelocity,
            &mut FallTracker,
        ),
        With<Player>,
    >,
) {
    let Some(RestoreSnapshot(snapshot)) = requests.read().last() else {
        return;
    };
    let Ok((mut tf, mut health, mut loadout, mut vel, mut fall)) = q_player.single_mut() else {
        debug!("Snapshot restore without a player");
        return;
    };

    tf.translation = Vec3::from_array(snapshot.position);
    vel.0 = Vec2::ZERO;
    fall.reset();

    if snapshot.health == 0 {
        health.restore_full();
    } else {
        health.set(snapshot.health);
    }

    loadout.restore_inventory(&snapshot.inventory);
    info!("Restored player snapshot at {:?}", snapshot.position);
}
