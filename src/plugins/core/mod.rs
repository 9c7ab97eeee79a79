//! Core plugin: shared resources, global settings and pause.
//!
//! Pause is a time scale, not a state. While `GamePaused` is set the virtual clock runs at
//! relative speed 0, so the fixed-step schedule stops accumulating and every gameplay timer
//! freezes at once. The flag may be written by external UI as well as the Escape key.

use bevy::prelude::*;

use crate::common::tunables::Tunables;

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GamePaused(pub bool);

pub fn plugin(app: &mut App) {
    app.init_resource::<Tunables>();
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));
    app.init_resource::<GamePaused>()
        .add_systems(Update, (toggle_pause_on_escape, apply_pause).chain());
}

fn toggle_pause_on_escape(keys: Option<Res<ButtonInput<KeyCode>>>, mut paused: ResMut<GamePaused>) {
    if keys.is_some_and(|k| k.just_pressed(KeyCode::Escape)) {
        paused.0 = !paused.0;
        info!("paused: {}", paused.0);
    }
}

/// Mirror the flag onto the virtual clock whenever it changes.
pub fn apply_pause(paused: Res<GamePaused>, mut time: ResMut<Time<Virtual>>) {
    if !paused.is_changed() {
        return;
    }
    time.set_relative_speed(if paused.0 { 0.0 } else { 1.0 });
}
