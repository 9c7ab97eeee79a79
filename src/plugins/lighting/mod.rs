//! Lighting plugin (Firefly) (render-only).
//!
//! A warm light follows the player. Each checkpoint lights up once it has been activated.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::environment::waypoints::Checkpoint;
use crate::plugins::player::Player;

#[derive(Component)]
pub struct PlayerLight;

/// Marks a checkpoint whose light has already been spawned.
#[derive(Component)]
struct Lit;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(OnEnter(GameState::InGame), setup).add_systems(
        Update,
        (follow_player_light, light_checkpoints).run_if(in_state(GameState::InGame)),
    );
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: Color::srgb(1.0, 0.9, 0.75),
            radius: 14.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_player_light(
    q_player: Query<&Transform, (With<Player>, Without<PlayerLight>)>,
    mut q_light: Query<&mut Transform, (With<PlayerLight>, Without<Player>)>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok(mut tf_light) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_player.translation.x;
    tf_light.translation.y = tf_player.translation.y;
}

fn light_checkpoints(
    mut commands: Commands,
    q: Query<(Entity, &Checkpoint, &Transform), (Changed<Checkpoint>, Without<Lit>)>,
) {
    for (e, checkpoint, tf) in &q {
        if !checkpoint.activated {
            continue;
        }
        commands.entity(e).insert(Lit);
        commands.spawn((
            Name::new("CheckpointLight"),
            PointLight2d {
                color: Color::srgb(0.6, 0.8, 1.0),
                radius: 6.0,
                ..default()
            },
            Transform::from_translation(tf.translation.truncate().extend(10.0)),
            DespawnOnExit(GameState::InGame),
        ));
    }
}
