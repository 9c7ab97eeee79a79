use bevy::prelude::*;

use crate::common::tunables::{Regen, Tunables};
use crate::plugins::combat::{DamageTaken, Health, LifeState};

/// Out-of-combat healing. Any damage restarts the delay.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct HealthRegen {
    since_damage: f32,
    accum: f32,
}

impl HealthRegen {
    pub fn on_damage(&mut self) {
        self.since_damage = 0.0;
        self.accum = 0.0;
    }

    /// Advance by `dt`; returns how much health to restore this tick.
    pub fn tick(&mut self, dt: f32, cfg: &Regen, health: &Health) -> u32 {
        if !cfg.enabled || health.is_full() {
            self.accum = 0.0;
            self.since_damage += dt;
            return 0;
        }

        self.since_damage += dt;
        if self.since_damage < cfg.delay_secs {
            return 0;
        }

        self.accum += dt;
        let mut amount = 0;
        while self.accum >= cfg.interval_secs {
            self.accum -= cfg.interval_secs;
            amount += (cfg.rate * cfg.interval_secs).round() as u32;
        }
        amount
    }
}

pub fn regenerate(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut taken: MessageReader<DamageTaken>,
    mut q: Query<(&mut HealthRegen, &mut Health, &LifeState)>,
) {
    for ev in taken.read() {
        if let Ok((mut regen, _, _)) = q.get_mut(ev.target) {
            regen.on_damage();
        }
    }

    let dt = time.delta_secs();
    for (mut regen, mut health, life) in &mut q {
        if !life.is_alive() {
            continue;
        }
        let amount = regen.tick(dt, &tunables.regen, &health);
        if amount > 0 {
            health.heal(amount);
        }
    }
}
