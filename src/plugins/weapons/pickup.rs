//! World pickups collected with Interact.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::combat::LifeState;
use crate::plugins::physics::probe::nearest_within;
use crate::plugins::player::Player;
use crate::plugins::player::input::PlayerInput;

use super::loadout::{WeaponKind, WeaponLoadout};

#[derive(Component, Debug, Clone, Copy)]
pub struct WeaponPickup(pub WeaponKind);

fn pickup_color(kind: WeaponKind) -> Color {
    match kind {
        WeaponKind::Melee => Color::srgb(0.85, 0.85, 0.9),
        WeaponKind::Thrown => Color::srgb(0.9, 0.7, 0.3),
        WeaponKind::Elemental => Color::srgb(0.5, 0.7, 1.0),
    }
}

pub fn spawn_pickup(commands: &mut Commands, at: Vec2, kind: WeaponKind) -> Entity {
    commands
        .spawn((
            Name::new(format!("Pickup({})", kind.name())),
            WeaponPickup(kind),
            Sprite {
                color: pickup_color(kind),
                custom_size: Some(Vec2::splat(0.5)),
                ..default()
            },
            Transform::from_translation(at.extend(0.5)),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

/// Equip the nearest pickup in reach. A rejected equip leaves the pickup in the world.
pub fn collect_pickups(
    mut commands: Commands,
    input: Res<PlayerInput>,
    tunables: Res<Tunables>,
    mut q_player: Query<(&Transform, &LifeState, &mut WeaponLoadout), With<Player>>,
    q_pickups: Query<(Entity, &Transform, &WeaponPickup)>,
) {
    if !input.interact {
        return;
    }
    let Ok((tf, life, mut loadout)) = q_player.single_mut() else {
        return;
    };
    if !life.is_alive() {
        return;
    }

    let origin = tf.translation.truncate();
    let candidates = q_pickups.iter().map(|(e, tf, _)| (e, tf.translation.truncate()));
    let Some((e, _)) = nearest_within(origin, tunables.weapons.interaction_range, candidates) else {
        return;
    };
    let Ok((_, _, pickup)) = q_pickups.get(e) else {
        return;
    };

    match loadout.equip(pickup.0) {
        Ok(slot) => {
            info!("Picked up {} into slot {slot}", pickup.0.name());
            commands.entity(e).despawn();
        }
        Err(err) => debug!("Pickup rejected: {err}"),
    }
}
