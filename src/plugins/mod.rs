//! Feature plugins.

use bevy::prelude::*;

pub mod ai;
pub mod allies;
pub mod combat;
pub mod core;
pub mod enemies;
pub mod environment;
pub mod physics;
pub mod player;
pub mod ui;
pub mod water;
pub mod weapons;
pub mod world;

// Render-only
pub mod camera;
pub mod lighting;

/// Register gameplay plugins that work in headless tests.
///
/// `core` goes first: `physics` reads `Tunables` while it builds.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    combat::plugin(app);
    world::plugin(app);
    player::plugin(app);
    water::plugin(app);
    weapons::plugin(app);
    ai::plugin(app);
    enemies::plugin(app);
    allies::plugin(app);
    environment::plugin(app);
    ui::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    lighting::plugin(app);
    camera::plugin(app);
}
