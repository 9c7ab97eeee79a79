//! Horizontal control, jumping/swimming, drop-through, and the ground/ceiling probe step.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::combat::{Facing, LifeState};
use crate::plugins::physics::BodySize;
use crate::plugins::physics::platforms::{DropThrough, OneWayPlatform};
use crate::plugins::physics::probe::{
    AvianProbe, WorldProbe, ground_probe_origins, has_overlap_above, is_grounded_at,
};
use crate::plugins::water::{WaterProperties, WaterState};

use super::Player;
use super::input::PlayerInput;

/// Probe results, recomputed after every physics step.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct MovementState {
    pub grounded: bool,
    pub ceiling_clear: bool,
    /// One-way platform currently stood on.
    pub platform: Option<Entity>,
}

/// Target horizontal velocity. Set directly each tick, never accumulated.
pub fn horizontal_velocity(axis: f32, base_speed: f32, water: Option<&WaterProperties>) -> f32 {
    match water {
        Some(w) => axis * base_speed * w.speed_multiplier + w.current.x,
        None => axis * base_speed,
    }
}

/// New vertical velocity from jump input, if any.
///
/// In water the jump is a swim stroke repeated while held. On land it needs a fresh press,
/// ground underfoot and no solid overlap above.
pub fn jump_velocity(
    input: &PlayerInput,
    state: &MovementState,
    water: Option<&WaterProperties>,
    base_jump: f32,
) -> Option<f32> {
    if let Some(w) = water {
        return input.jump_held.then_some(base_jump * w.jump_multiplier);
    }
    (input.jump_pressed && state.grounded && state.ceiling_clear).then_some(base_jump)
}

pub fn apply_movement(
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<
        (
            &mut LinearVelocity,
            &mut Facing,
            &mut DropThrough,
            &MovementState,
            &WaterState,
            &LifeState,
        ),
        With<Player>,
    >,
) {
    let Ok((mut vel, mut facing, mut drop, state, water, life)) = q_player.single_mut() else {
        return;
    };
    if !life.is_alive() {
        return;
    }

    let axis = input.horizontal_axis();
    let props = water.properties();

    vel.x = horizontal_velocity(axis, tunables.player.move_speed, props);
    *facing = facing.toward(axis);

    if let Some(vy) = jump_velocity(&input, state, props, tunables.player.jump_velocity) {
        vel.y = vy;
    }

    if input.move_down
        && state.grounded
        && let Some(platform) = state.platform
    {
        drop.begin(platform, tunables.player.drop_through_secs);
    }
}

/// Ground and ceiling state for one body.
pub fn probe_body<P: WorldProbe>(
    probe: Option<&P>,
    tunables: &Tunables,
    center: Vec2,
    size: Vec2,
    exclude: &[Entity],
    is_platform: impl Fn(Entity) -> bool,
) -> MovementState {
    let p = &tunables.player;
    let origins = ground_probe_origins(center, size, p.ground_probe_spread, p.ground_probe_skin);
    let hit = is_grounded_at(probe, &origins, p.ground_probe_distance, exclude);
    MovementState {
        grounded: hit.is_some(),
        ceiling_clear: !has_overlap_above(probe, center, size, p.ceiling_box_scale, exclude),
        platform: hit.filter(|e| is_platform(*e)),
    }
}

pub fn update_ground_state(
    spatial: Option<SpatialQuery>,
    tunables: Res<Tunables>,
    q_platforms: Query<(), With<OneWayPlatform>>,
    mut q: Query<(Entity, &Transform, &BodySize, &DropThrough, &mut MovementState)>,
) {
    let probe = spatial.as_ref().map(AvianProbe::new);

    for (e, tf, size, drop, mut state) in &mut q {
        let exclude: Vec<Entity> = std::iter::once(e).chain(drop.platforms()).collect();
        *state = probe_body(
            probe.as_ref(),
            &tunables,
            tf.translation.truncate(),
            size.0,
            &exclude,
            |hit| q_platforms.contains(hit),
        );
    }
}
