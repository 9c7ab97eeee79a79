//! Test helpers.
//!
//! `World::run_system_once` (via `RunSystemOnce`) runs a system without building a schedule.
//! Commands queued by the system are applied with `world.flush()` before assertions.

use std::time::Duration;

use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// A fixed clock that has ticked once by `dt` after `elapsed` seconds.
pub fn fixed_time_at(elapsed: f32, dt: f32) -> Time<Fixed> {
    let mut t = Time::<Fixed>::default();
    if elapsed > dt {
        t.advance_by(Duration::from_secs_f32(elapsed - dt));
    }
    t.advance_by(Duration::from_secs_f32(dt));
    t
}

/// Replace the world's fixed clock with one at `elapsed`, last step `dt`.
pub fn set_fixed_time(world: &mut World, elapsed: f32, dt: f32) {
    world.insert_resource(fixed_time_at(elapsed, dt));
}
