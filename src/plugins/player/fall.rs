//! Fall tracking and fall damage.

use bevy::prelude::*;

use crate::common::tunables::{FallDamage, Tunables};
use crate::plugins::combat::{DealDamage, Health, LifeState};
use crate::plugins::water::WaterState;

use super::movement::MovementState;

#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct FallTracker {
    was_grounded: bool,
    falling: bool,
    start_height: f32,
}

impl FallTracker {
    #[inline]
    pub fn is_falling(&self) -> bool {
        self.falling
    }

    /// Feed one tick of ground state. Returns the fall distance on the tick the body lands.
    ///
    /// A fall starts only on the tick the body leaves the ground while not rising. Jumps never
    /// start one, so jumping off a ledge lands without damage.
    pub fn update(&mut self, grounded: bool, vel_y: f32, height: f32) -> Option<f32> {
        let mut landed = None;

        if self.was_grounded && !grounded && vel_y <= 0.0 {
            self.falling = true;
            self.start_height = height;
        }

        if grounded && !self.was_grounded && self.falling {
            landed = Some(self.start_height - height);
        }
        if grounded {
            self.falling = false;
        }

        self.was_grounded = grounded;
        landed
    }

    pub fn reset(&mut self) {
        self.falling = false;
        self.was_grounded = false;
    }
}

/// Damage for a fall of `distance` units.
///
/// At or below `min_height` nothing; at or above `max_height` the whole of `current_health`;
/// in between a rounded linear ramp up to `max_damage`.
pub fn fall_damage(distance: f32, cfg: &FallDamage, current_health: u32) -> u32 {
    if distance <= cfg.min_height {
        return 0;
    }
    if distance >= cfg.max_height {
        return current_health;
    }
    let ratio = (distance - cfg.min_height) / (cfg.max_height - cfg.min_height);
    (ratio * cfg.max_damage as f32).round() as u32
}

/// Suspended entirely while in water.
pub fn track_falls(
    tunables: Res<Tunables>,
    mut q: Query<(
        Entity,
        &Transform,
        &avian2d::prelude::LinearVelocity,
        &MovementState,
        &WaterState,
        &Health,
        &LifeState,
        &mut FallTracker,
    )>,
    mut damage: MessageWriter<DealDamage>,
) {
    for (e, tf, vel, movement, water, health, life, mut fall) in &mut q {
        if !life.is_alive() {
            continue;
        }
        if water.in_water() {
            fall.reset();
            continue;
        }
        let Some(distance) = fall.update(movement.grounded, vel.y, tf.translation.y) else {
            continue;
        };
        let amount = fall_damage(distance, &tunables.fall, health.current());
        if amount > 0 {
            debug!("{e:?} fell {distance:.2} units for {amount} damage");
            damage.write(DealDamage { target: e, amount, source: None });
        }
    }
}
