//! One-way platforms and timed drop-through.
//!
//! A one-way platform only blocks bodies that are not moving upward. Dropping through a
//! platform ignores contacts between that one body and that one platform until its timer
//! expires. Both rules live in a contact-modification hook, so nothing is toggled on the
//! platform itself and other bodies keep standing on it.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::state::{GameState, SimulationSet};

#[derive(Component, Debug, Default, Clone, Copy)]
pub struct OneWayPlatform;

/// Platforms a body is currently falling through, each with its own restore timer.
#[derive(Component, Debug, Default, Clone)]
pub struct DropThrough {
    ignoring: Vec<(Entity, Timer)>,
}

impl DropThrough {
    /// Start (or restart) ignoring `platform` for `secs`.
    pub fn begin(&mut self, platform: Entity, secs: f32) {
        let timer = Timer::from_seconds(secs, TimerMode::Once);
        match self.ignoring.iter_mut().find(|(p, _)| *p == platform) {
            Some((_, t)) => *t = timer,
            None => self.ignoring.push((platform, timer)),
        }
    }

    #[inline]
    pub fn is_ignoring(&self, platform: Entity) -> bool {
        self.ignoring.iter().any(|(p, _)| *p == platform)
    }

    pub fn platforms(&self) -> impl Iterator<Item = Entity> + '_ {
        self.ignoring.iter().map(|(p, _)| *p)
    }

    /// Advance timers and restore collision with every platform whose timer finished.
    pub fn tick(&mut self, delta: Duration) {
        for (_, t) in &mut self.ignoring {
            t.tick(delta);
        }
        self.ignoring.retain(|(_, t)| !t.is_finished());
    }

    pub fn clear(&mut self) {
        self.ignoring.clear();
    }
}

#[derive(SystemParam)]
pub struct PlatformHooks<'w, 's> {
    platforms: Query<'w, 's, (), With<OneWayPlatform>>,
    droppers: Query<'w, 's, &'static DropThrough>,
    velocities: Query<'w, 's, &'static LinearVelocity>,
}

impl CollisionHooks for PlatformHooks<'_, '_> {
    fn modify_contacts(&self, contacts: &mut ContactPair, _commands: &mut Commands) -> bool {
        let (platform, other) = if self.platforms.contains(contacts.collider1) {
            (contacts.collider1, contacts.collider2)
        } else if self.platforms.contains(contacts.collider2) {
            (contacts.collider2, contacts.collider1)
        } else {
            return true;
        };

        if self
            .droppers
            .get(other)
            .is_ok_and(|d| d.is_ignoring(platform))
        {
            return false;
        }

        !self.velocities.get(other).is_ok_and(|v| v.y > 0.0)
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedPostUpdate,
        tick_drop_through
            .in_set(SimulationSet::Probe)
            .run_if(in_state(GameState::InGame)),
    );
}

/// Restore platform collision once a drop-through window has elapsed.
pub fn tick_drop_through(time: Res<Time<Fixed>>, mut q: Query<&mut DropThrough>) {
    for mut drop in &mut q {
        if drop.ignoring.is_empty() {
            continue;
        }
        drop.tick(time.delta());
    }
}
