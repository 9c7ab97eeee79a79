//! Hold-to-charge melee: charge time quantized into a number of effect units.

use bevy::prelude::*;

#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct ChargeState {
    started_at: Option<f32>,
}

impl ChargeState {
    #[inline]
    pub fn is_charging(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start charging. Only one charge may be in progress.
    pub fn begin(&mut self, now: f32) -> bool {
        if self.is_charging() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Stop charging and return how long it was held.
    pub fn release(&mut self, now: f32) -> Option<f32> {
        self.started_at.take().map(|start| (now - start).max(0.0))
    }

    pub fn cancel(&mut self) {
        self.started_at = None;
    }
}

/// Units spawned for a charge held `elapsed` seconds.
///
/// `tiers` pairs exclusive upper bounds with unit counts, ascending. Anything past the last
/// bound gets `max_units`.
pub fn charge_units(elapsed: f32, tiers: &[(f32, u32)], max_units: u32) -> u32 {
    tiers
        .iter()
        .find(|(limit, _)| elapsed < *limit)
        .map_or(max_units, |(_, units)| *units)
}

/// Horizontal offsets of each unit from the attacker: `(i + 1) * spacing` along facing.
pub fn unit_offsets(count: u32, spacing: f32, facing_sign: f32) -> Vec<f32> {
    (0..count)
        .map(|i| (i + 1) as f32 * spacing * facing_sign)
        .collect()
}

/// Height of a unit relative to its resting point over its normalized lifetime `t`.
///
/// Rises from `-depth` to a peak of `arc` during the first 40%, then settles back to rest.
pub fn unit_height(t: f32, depth: f32, arc: f32) -> f32 {
    const RISE: f32 = 0.4;
    let t = t.clamp(0.0, 1.0);
    if t < RISE {
        let u = t / RISE;
        let eased = 1.0 - (1.0 - u) * (1.0 - u);
        -depth + (depth + arc) * eased
    } else {
        let u = (t - RISE) / (1.0 - RISE);
        arc * (1.0 - u * u * (3.0 - 2.0 * u))
    }
}
