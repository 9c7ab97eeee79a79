//! Device input -> abstract per-tick input snapshot.
//!
//! Held signals mirror the device each frame. Edge signals (presses and releases) are latched
//! until a fixed tick has consumed them, so a press between two fixed steps is never lost and
//! never seen twice.

use bevy::prelude::*;

use crate::plugins::camera::MainCamera;

#[derive(Resource, Debug, Default, Clone)]
pub struct PlayerInput {
    pub move_left: bool,
    pub move_right: bool,
    pub move_down: bool,
    pub jump_held: bool,
    pub jump_pressed: bool,
    pub interact: bool,
    pub cycle_modifier: bool,
    pub cycle_left: bool,
    pub cycle_right: bool,
    pub attack_primary: bool,
    pub secondary_pressed: bool,
    pub secondary_held: bool,
    pub secondary_released: bool,
    /// Pointer position in world space, when the pointer is over the window.
    pub aim_point: Option<Vec2>,
}

impl PlayerInput {
    /// Left/right resolved to -1, 0 or 1. Both held cancels out.
    #[inline]
    pub fn horizontal_axis(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.interact = false;
        self.cycle_left = false;
        self.cycle_right = false;
        self.attack_primary = false;
        self.secondary_pressed = false;
        self.secondary_released = false;
    }
}

const LEFT: [KeyCode; 2] = [KeyCode::KeyA, KeyCode::ArrowLeft];
const RIGHT: [KeyCode; 2] = [KeyCode::KeyD, KeyCode::ArrowRight];
const DOWN: [KeyCode; 2] = [KeyCode::KeyS, KeyCode::ArrowDown];
const JUMP: [KeyCode; 3] = [KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp];

pub fn gather_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut input: ResMut<PlayerInput>,
) {
    if let Some(keys) = keys {
        input.move_left = keys.any_pressed(LEFT);
        input.move_right = keys.any_pressed(RIGHT);
        input.move_down = keys.any_pressed(DOWN);
        input.jump_held = keys.any_pressed(JUMP);
        input.jump_pressed |= keys.any_just_pressed(JUMP);
        input.interact |= keys.just_pressed(KeyCode::KeyE);

        input.cycle_modifier = keys.pressed(KeyCode::KeyQ);
        if input.cycle_modifier {
            input.cycle_left |= keys.any_just_pressed(LEFT);
            input.cycle_right |= keys.any_just_pressed(RIGHT);
        }
    }

    if let Some(buttons) = buttons {
        input.attack_primary |= buttons.just_pressed(MouseButton::Left);
        input.secondary_pressed |= buttons.just_pressed(MouseButton::Right);
        input.secondary_held = buttons.pressed(MouseButton::Right);
        input.secondary_released |= buttons.just_released(MouseButton::Right);
    }

    input.aim_point = cursor_world_position(&windows, &q_camera);
}

fn cursor_world_position(
    windows: &Query<&Window>,
    q_camera: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Option<Vec2> {
    let window = windows.single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, camera_tf) = q_camera.single().ok()?;
    match camera.viewport_to_world_2d(camera_tf, cursor) {
        Ok(p) => Some(p),
        Err(e) => {
            debug!("viewport_to_world_2d failed: {e:?}");
            None
        }
    }
}

/// Edges are consumed once every fixed-step consumer has seen them.
pub fn consume_edges(mut input: ResMut<PlayerInput>) {
    input.clear_edges();
}
