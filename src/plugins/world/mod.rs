//! World plugin: builds the level on entering `InGame`.
//!
//! The layout is plain data: each table below lists rectangles (centre, size) in world units.
//! Spawning turns every entry into the matching physics body. Gameplay modules own the
//! behaviour; this module only decides where things are.
//!
//! ```text
//!   tp<-                                                              ->tp
//!   |  fall   ow   ow     ally  P   spikes  ~~water~~  cp  E   E  door  |
//!   ================================== ground ===========================
//! ```

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{hazard_layers, one_way_platform_layers, terrain_layers, water_layers};
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::allies::spawn_ally;
use crate::plugins::combat::{DamageSource, TargetFilter};
use crate::plugins::enemies::spawn_enemy;
use crate::plugins::environment::door::spawn_door;
use crate::plugins::environment::falling::spawn_falling_platform;
use crate::plugins::environment::waypoints::{spawn_checkpoint, spawn_teleporter};
use crate::plugins::physics::platforms::OneWayPlatform;
use crate::plugins::water::{WaterProperties, WaterVolume};
use crate::plugins::weapons::{WeaponKind, spawn_pickup};

pub const PLAYER_START: Vec2 = Vec2::new(0.0, 1.0);

const GROUND_COLOR: Color = Color::srgb(0.25, 0.27, 0.33);
const PLATFORM_COLOR: Color = Color::srgb(0.35, 0.33, 0.28);
const WATER_COLOR: Color = Color::srgba(0.2, 0.4, 0.8, 0.45);
const HAZARD_COLOR: Color = Color::srgb(0.8, 0.15, 0.1);

const WALL_THICKNESS: f32 = 1.0;

/// (centre, size)
type Rect = (Vec2, Vec2);

const ONE_WAY_PLATFORMS: [Rect; 2] = [
    (Vec2::new(-8.0, 2.5), Vec2::new(4.0, 0.3)),
    (Vec2::new(-13.0, 5.0), Vec2::new(4.0, 0.3)),
];

const HAZARDS: [Rect; 1] = [(Vec2::new(6.0, 0.25), Vec2::new(2.0, 0.5))];

const FALLING_PLATFORMS: [Rect; 1] = [(Vec2::new(-20.0, 7.0), Vec2::new(3.0, 0.4))];

const ENEMIES: [(Vec2, bool); 2] = [(Vec2::new(30.0, 1.0), true), (Vec2::new(36.0, 1.0), false)];

const ALLIES: [Vec2; 1] = [Vec2::new(-3.0, 1.0)];

const PICKUPS: [(Vec2, WeaponKind); 3] = [
    (Vec2::new(1.5, 0.4), WeaponKind::Melee),
    (Vec2::new(-8.0, 3.2), WeaponKind::Thrown),
    (Vec2::new(24.0, 0.4), WeaponKind::Elemental),
];

const DOORS: [Rect; 1] = [(Vec2::new(44.0, 1.5), Vec2::new(1.0, 3.0))];

const CHECKPOINTS: [Vec2; 1] = [Vec2::new(26.0, 0.8)];

/// (pad, destination). Destinations sit beside the partner pad, never on it.
const TELEPORTERS: [(Vec2, Vec2); 2] = [
    (Vec2::new(54.0, 0.8), Vec2::new(-52.0, 1.0)),
    (Vec2::new(-54.0, 0.8), Vec2::new(52.0, 1.0)),
];

pub fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(GameState::InGame),
        (spawn_terrain, spawn_water, spawn_hazards, spawn_population, spawn_objects),
    );
}

fn solid(commands: &mut Commands, name: &'static str, (at, size): Rect) -> Entity {
    commands
        .spawn((
            Name::new(name),
            Sprite {
                color: GROUND_COLOR,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(at.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            terrain_layers(),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

/// Ground with its top face at y = 0, side walls at the world bounds, and the one-way
/// platforms.
fn spawn_terrain(mut commands: Commands, tunables: Res<Tunables>) {
    let half = tunables.world_half_extents;

    solid(
        &mut commands,
        "Ground",
        (Vec2::new(0.0, -0.5), Vec2::new(half.x * 2.0, 1.0)),
    );
    for (name, sign) in [("WallLeft", -1.0), ("WallRight", 1.0)] {
        solid(
            &mut commands,
            name,
            (
                Vec2::new(sign * (half.x - WALL_THICKNESS * 0.5), half.y * 0.5),
                Vec2::new(WALL_THICKNESS, half.y + 1.0),
            ),
        );
    }

    for (at, size) in ONE_WAY_PLATFORMS {
        commands.spawn((
            Name::new("OneWayPlatform"),
            OneWayPlatform,
            Sprite {
                color: PLATFORM_COLOR,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(at.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            one_way_platform_layers(),
            ActiveCollisionHooks::MODIFY_CONTACTS,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

/// A shallow breathable pool with a deeper, unbreathable channel overlapping its far end.
fn spawn_water(mut commands: Commands) {
    let channel = WaterProperties {
        current: Vec2::new(1.5, 0.0),
        breathable: false,
        ..default()
    };
    let volumes = [
        ("Pool", (Vec2::new(16.0, 2.0), Vec2::new(10.0, 4.0)), WaterProperties::default()),
        ("Channel", (Vec2::new(20.0, 1.5), Vec2::new(4.0, 3.0)), channel),
    ];

    for (name, (at, size), props) in volumes {
        commands.spawn((
            Name::new(name),
            WaterVolume(props),
            Sprite {
                color: WATER_COLOR,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(at.extend(2.0)),
            Collider::rectangle(size.x, size.y),
            Sensor,
            water_layers(),
            CollisionEventsEnabled,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn spawn_hazards(mut commands: Commands, tunables: Res<Tunables>) {
    let env = &tunables.environment;
    for (at, size) in HAZARDS {
        commands.spawn((
            Name::new("Spikes"),
            DamageSource::new(env.hazard_damage, env.hazard_rate_secs, TargetFilter::player_aligned()),
            Sprite {
                color: HAZARD_COLOR,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(at.extend(0.0)),
            Collider::rectangle(size.x, size.y),
            Sensor,
            hazard_layers(),
            CollisionEventsEnabled,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn spawn_population(mut commands: Commands, tunables: Res<Tunables>) {
    for (at, aggressive) in ENEMIES {
        spawn_enemy(&mut commands, at, &tunables.enemy, aggressive);
    }
    for at in ALLIES {
        spawn_ally(&mut commands, at, &tunables.ally);
    }
}

fn spawn_objects(mut commands: Commands) {
    for (at, kind) in PICKUPS {
        spawn_pickup(&mut commands, at, kind);
    }
    for (at, size) in DOORS {
        spawn_door(&mut commands, at, size);
    }
    for (at, size) in FALLING_PLATFORMS {
        spawn_falling_platform(&mut commands, at, size);
    }
    for at in CHECKPOINTS {
        spawn_checkpoint(&mut commands, at);
    }
    for (pad, destination) in TELEPORTERS {
        spawn_teleporter(&mut commands, pad, destination);
    }
}
