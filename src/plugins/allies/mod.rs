//! Allies: transient companions that follow the player and fight enemies.
//!
//! Allies share the AI brain with enemies but are leashed to the player and never respawn.
//! A dead ally is removed; its pending attacks are cancelled by the weapons lifecycle.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::ally_layers;
use crate::common::state::{GameState, SimulationSet};
use crate::common::tunables::AiTunables;
use crate::plugins::ai::AiBrain;
use crate::plugins::combat::lifecycle::detect_deaths;
use crate::plugins::combat::{CombatantKind, Died, Facing, Health, LifeState, PendingDespawn};
use crate::plugins::physics::BodySize;

#[derive(Component, Debug, Clone, Copy)]
pub struct Ally;

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedPostUpdate,
        remove_dead_allies
            .after(detect_deaths)
            .in_set(SimulationSet::Lifecycle),
    );
}

pub fn spawn_ally(commands: &mut Commands, at: Vec2, tuning: &AiTunables) -> Entity {
    let size = tuning.size;
    commands
        .spawn((
            (
                Name::new("Ally"),
                Ally,
                CombatantKind::Ally,
                Health::new(tuning.max_health),
                LifeState::Alive,
                Facing::Right,
                AiBrain::new(*tuning, true),
                BodySize(size),
            ),
            (
                Sprite {
                    color: Color::srgb(0.35, 0.85, 0.45),
                    custom_size: Some(size),
                    ..default()
                },
                Transform::from_translation(at.extend(1.0)),
                RigidBody::Dynamic,
                Collider::rectangle(size.x, size.y),
                LockedAxes::ROTATION_LOCKED,
                Friction::ZERO,
                LinearVelocity::ZERO,
                ally_layers(),
                DespawnOnExit(GameState::InGame),
            ),
        ))
        .id()
}

fn remove_dead_allies(
    mut commands: Commands,
    mut died: MessageReader<Died>,
    mut q: Query<&mut LinearVelocity, With<Ally>>,
) {
    for ev in died.read() {
        if ev.kind != CombatantKind::Ally {
            continue;
        }
        let Ok(mut vel) = q.get_mut(ev.entity) else {
            continue;
        };
        vel.0 = Vec2::ZERO;
        info!("Ally {:?} lost", ev.entity);
        commands.entity(ev.entity).insert(PendingDespawn);
    }
}
