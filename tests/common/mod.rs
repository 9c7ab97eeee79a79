//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `soulful_journey::game::configure_headless` to install gameplay plugins.
//! - time advances by exactly one fixed step per `update`, so tick counts are deterministic.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use soulful_journey::plugins::player::Player;

pub const STEP: Duration = Duration::from_micros(15_625);

pub fn app_headless() -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP));
    app.insert_resource(Time::<Fixed>::from_duration(STEP));

    soulful_journey::game::configure_headless(&mut app);
    app
}

/// Headless app with the level spawned and a few fixed steps behind it.
pub fn app_in_level() -> App {
    let mut app = app_headless();
    ticks(&mut app, 4);
    app
}

pub fn ticks(app: &mut App, n: usize) {
    for _ in 0..n {
        app.update();
    }
}

pub fn player(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<Player>>()
        .single(app.world())
        .expect("exactly one player")
}

pub fn named(app: &mut App, name: &str) -> Vec<Entity> {
    app.world_mut()
        .query::<(Entity, &Name)>()
        .iter(app.world())
        .filter(|(_, n)| n.as_str() == name)
        .map(|(e, _)| e)
        .collect()
}
