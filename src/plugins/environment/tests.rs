use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;

use super::door::{animate_doors, track_door_zones};
use super::falling::{PlatformEvent, PlatformPhase, arm_falling_platforms, tick_falling_platforms};
use super::waypoints::{activate_checkpoints, use_teleporters};
use super::*;
use crate::common::test_utils::{run_system_once, set_fixed_time};
use crate::common::tunables::Tunables;
use crate::plugins::combat::SpawnPoint;
use crate::plugins::player::Player;
use crate::plugins::player::fall::FallTracker;

fn secs(s: f32) -> Duration {
    Duration::from_secs_f32(s)
}

fn env_world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.init_resource::<Messages<CollisionStart>>();
    world.init_resource::<Messages<CollisionEnd>>();
    set_fixed_time(&mut world, 0.0, 0.0);
    world
}

fn touch(world: &mut World, object: Entity, body: Entity) {
    world.write_message(CollisionStart { collider1: object, collider2: body, body1: None, body2: Some(body) });
}

fn leave(world: &mut World, object: Entity, body: Entity) {
    world.write_message(CollisionEnd { collider1: body, collider2: object, body1: Some(body), body2: None });
}

fn player(world: &mut World, at: Vec2) -> Entity {
    world
        .spawn((
            Player,
            SpawnPoint(Vec2::ZERO),
            FallTracker::default(),
            LinearVelocity(Vec2::new(1.0, -3.0)),
            Transform::from_translation(at.extend(1.0)),
        ))
        .id()
}

// -----------------------------------------------------------------------------
// Door
// -----------------------------------------------------------------------------

#[test]
fn door_opens_on_entry_and_closes_after_delay() {
    let mut door = Door::default();
    assert!(door.is_solid());

    assert!(door.enter());
    assert!(!door.is_solid());
    door.tick(secs(0.5), 1.0);
    assert!((door.anim() - 0.5).abs() < 1e-5);

    door.exit(2.0);
    assert!(door.close_pending());
    assert!(!door.tick(secs(1.5), 1.0));
    assert!(door.is_open());
    assert!(door.tick(secs(0.6), 1.0));
    assert!(door.is_solid());
    assert!(!door.close_pending());
}

#[test]
fn reentry_cancels_a_pending_close() {
    let mut door = Door::default();
    door.enter();
    door.exit(2.0);
    door.tick(secs(1.9), 1.0);

    assert!(!door.enter());
    assert!(!door.close_pending());
    assert!(!door.tick(secs(5.0), 1.0));
    assert!(door.is_open());
}

#[test]
fn door_zone_drives_collision() {
    let mut world = env_world();
    let p = player(&mut world, Vec2::ZERO);
    let door = run_system_once(&mut world, |mut commands: Commands| {
        spawn_door(&mut commands, Vec2::new(1.0, 0.0), Vec2::new(0.4, 2.0))
    });
    let zone = world
        .query_filtered::<Entity, With<DoorZone>>()
        .single(&world)
        .unwrap();

    touch(&mut world, zone, p);
    run_system_once(&mut world, track_door_zones);
    run_system_once(&mut world, animate_doors);
    assert!(world.entity(door).contains::<ColliderDisabled>());

    leave(&mut world, zone, p);
    run_system_once(&mut world, track_door_zones);
    set_fixed_time(&mut world, 2.5, 2.5);
    run_system_once(&mut world, animate_doors);
    assert!(!world.entity(door).contains::<ColliderDisabled>());
}

// -----------------------------------------------------------------------------
// Falling platform
// -----------------------------------------------------------------------------

#[test]
fn platform_drops_after_delay_and_returns() {
    let mut platform = FallingPlatform::new(Vec2::new(3.0, 0.4));
    assert!(platform.arm(0.5));
    assert!(!platform.arm(0.5));

    assert_eq!(platform.tick(secs(0.4), 5.0), None);
    assert_eq!(platform.tick(secs(0.1), 5.0), Some(PlatformEvent::Drop));
    assert!(matches!(platform.phase, PlatformPhase::Fallen(_)));
    assert!(!platform.arm(0.5));

    assert_eq!(platform.tick(secs(4.9), 5.0), None);
    assert_eq!(platform.tick(secs(0.1), 5.0), Some(PlatformEvent::Restore));
    assert!(platform.arm(0.5));
}

#[test]
fn copy_lingers_after_landing_or_times_out() {
    let mut copy = FallingCopy::default();
    assert!(!copy.advance(0.1, 0.0, 5.0, 10.0));
    assert!(!copy.has_landed());
    assert!(!copy.advance(1.0, -6.0, 5.0, 10.0));
    assert!(!copy.advance(0.1, 0.0, 5.0, 10.0));
    assert!(copy.has_landed());
    assert!(!copy.advance(4.9, 0.0, 5.0, 10.0));
    assert!(copy.advance(0.1, 0.0, 5.0, 10.0));

    let mut endless = FallingCopy::default();
    assert!(!endless.advance(9.5, -20.0, 5.0, 10.0));
    assert!(endless.advance(0.5, -20.0, 5.0, 10.0));
}

#[test]
fn standing_on_platform_arms_it_and_drop_spawns_copy() {
    let mut world = env_world();
    let platform = run_system_once(&mut world, |mut commands: Commands| {
        spawn_falling_platform(&mut commands, Vec2::ZERO, Vec2::new(3.0, 0.4))
    });
    let below = player(&mut world, Vec2::new(0.0, -2.0));
    touch(&mut world, platform, below);
    run_system_once(&mut world, arm_falling_platforms);
    assert!(matches!(world.get::<FallingPlatform>(platform).unwrap().phase, PlatformPhase::Resting));

    let above = player(&mut world, Vec2::new(0.0, 1.0));
    touch(&mut world, platform, above);
    run_system_once(&mut world, arm_falling_platforms);
    assert!(matches!(world.get::<FallingPlatform>(platform).unwrap().phase, PlatformPhase::Armed(_)));

    set_fixed_time(&mut world, 0.5, 0.5);
    run_system_once(&mut world, tick_falling_platforms);

    assert_eq!(*world.get::<Visibility>(platform).unwrap(), Visibility::Hidden);
    assert!(world.entity(platform).contains::<ColliderDisabled>());
    assert_eq!(world.query::<&FallingCopy>().iter(&world).count(), 1);

    set_fixed_time(&mut world, 5.0, 5.0);
    run_system_once(&mut world, tick_falling_platforms);
    assert!(!world.entity(platform).contains::<ColliderDisabled>());
    assert_eq!(*world.get::<Visibility>(platform).unwrap(), Visibility::Visible);
}

// -----------------------------------------------------------------------------
// Checkpoints and teleporters
// -----------------------------------------------------------------------------

#[test]
fn checkpoint_sets_spawn_once() {
    let mut world = env_world();
    let p = player(&mut world, Vec2::ZERO);
    let first = run_system_once(&mut world, |mut commands: Commands| {
        spawn_checkpoint(&mut commands, Vec2::new(10.0, 2.0))
    });

    touch(&mut world, first, p);
    run_system_once(&mut world, activate_checkpoints);
    assert_eq!(world.get::<SpawnPoint>(p).unwrap().0, Vec2::new(10.0, 2.0));
    assert!(world.get::<Checkpoint>(first).unwrap().activated);

    world.get_mut::<SpawnPoint>(p).unwrap().0 = Vec2::new(20.0, 0.0);
    touch(&mut world, first, p);
    run_system_once(&mut world, activate_checkpoints);
    assert_eq!(world.get::<SpawnPoint>(p).unwrap().0, Vec2::new(20.0, 0.0));
}

#[test]
fn teleporter_guard_blocks_immediate_reuse() {
    let mut pad = Teleporter::new(Vec2::new(5.0, 5.0));
    assert_eq!(pad.try_use(1.0, 1.0), Some(Vec2::new(5.0, 5.0)));
    assert_eq!(pad.try_use(1.5, 1.0), None);
    assert_eq!(pad.try_use(2.0, 1.0), None);
    assert_eq!(pad.try_use(2.01, 1.0), Some(Vec2::new(5.0, 5.0)));
}

#[test]
fn teleporter_moves_player_and_stops_it() {
    let mut world = env_world();
    let p = player(&mut world, Vec2::ZERO);
    let pad = run_system_once(&mut world, |mut commands: Commands| {
        spawn_teleporter(&mut commands, Vec2::ZERO, Vec2::new(-8.0, 4.0))
    });
    set_fixed_time(&mut world, 3.0, 0.0);

    touch(&mut world, pad, p);
    run_system_once(&mut world, use_teleporters);

    assert_eq!(world.get::<Transform>(p).unwrap().translation.truncate(), Vec2::new(-8.0, 4.0));
    assert_eq!(world.get::<LinearVelocity>(p).unwrap().0, Vec2::ZERO);
}
