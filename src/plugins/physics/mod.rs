//! Physics plugin: avian2d setup plus the read-only probe layer gameplay queries go through.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

pub mod platforms;
pub mod probe;

/// Collider box of a gameplay body, in world units.
///
/// Probe origins and ceiling boxes are derived from this, so it must match the collider.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BodySize(pub Vec2);

impl BodySize {
    #[inline]
    pub fn half(self) -> Vec2 {
        self.0 * 0.5
    }
}

pub fn plugin(app: &mut App) {
    let gravity = app.world().resource::<Tunables>().gravity;
    // World units are meters, so the default length unit applies.
    app.add_plugins(
        PhysicsPlugins::default()
            .with_length_unit(1.0)
            .with_collision_hooks::<platforms::PlatformHooks>(),
    );
    app.insert_resource(Gravity(Vec2::NEG_Y * gravity));
    platforms::plugin(app);
}
