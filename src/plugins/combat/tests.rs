use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;
use proptest::prelude::*;

use super::damage::{apply_damage_requests, resolve_contact_damage, track_damage_contacts};
use super::lifecycle::{detect_deaths, tick_respawns};
use super::*;
use crate::common::test_utils::{run_system_once, set_fixed_time};

fn combat_world() -> World {
    let mut world = World::new();
    world.init_resource::<Messages<CollisionStart>>();
    world.init_resource::<Messages<CollisionEnd>>();
    world.init_resource::<Messages<DealDamage>>();
    world.init_resource::<Messages<DamageTaken>>();
    world.init_resource::<Messages<Died>>();
    world.init_resource::<Messages<Respawned>>();
    set_fixed_time(&mut world, 0.0, 0.0);
    world
}

fn spawn_target(world: &mut World, kind: CombatantKind, hp: u32) -> Entity {
    world
        .spawn((kind, Health::new(hp), LifeState::Alive, Transform::default()))
        .id()
}

fn start(world: &mut World, a: Entity, b: Entity) {
    world.write_message(CollisionStart { collider1: a, collider2: b, body1: None, body2: None });
}

fn end(world: &mut World, a: Entity, b: Entity) {
    world.write_message(CollisionEnd { collider1: a, collider2: b, body1: None, body2: None });
}

fn hp(world: &World, e: Entity) -> u32 {
    world.get::<Health>(e).map(|h| h.current()).unwrap_or_default()
}

// -----------------------------------------------------------------------------
// Pure contract
// -----------------------------------------------------------------------------

#[test]
fn rate_gates_repeats_and_reentry_resets() {
    let mut world = World::new();
    let target = world.spawn_empty().id();
    let source = DamageSource::new(10, 1.0, TargetFilter::player_aligned());
    let mut contacts = DamageContacts::default();
    let mut health = Health::new(100);
    let life = LifeState::Alive;

    contacts.begin(target);
    assert!(apply_if_due(&source, &mut contacts, target, CombatantKind::Player, &mut health, &life, 0.0));
    assert_eq!(health.current(), 90);

    assert!(!apply_if_due(&source, &mut contacts, target, CombatantKind::Player, &mut health, &life, 0.5));
    assert_eq!(health.current(), 90);

    contacts.end(target);
    contacts.begin(target);
    assert!(apply_if_due(&source, &mut contacts, target, CombatantKind::Player, &mut health, &life, 0.65));
    assert_eq!(health.current(), 80);

    assert!(!apply_if_due(&source, &mut contacts, target, CombatantKind::Player, &mut health, &life, 1.6));
    assert!(apply_if_due(&source, &mut contacts, target, CombatantKind::Player, &mut health, &life, 1.7));
}

#[test]
fn filter_and_owner_exclude_targets() {
    let mut world = World::new();
    let owner = world.spawn_empty().id();
    let other = world.spawn_empty().id();
    let source = DamageSource::new(10, 0.1, TargetFilter::hostile()).owned_by(owner);
    let mut contacts = DamageContacts::default();
    let mut health = Health::new(50);

    assert!(!apply_if_due(&source, &mut contacts, other, CombatantKind::Player, &mut health, &LifeState::Alive, 0.0));
    assert!(!apply_if_due(&source, &mut contacts, owner, CombatantKind::Enemy, &mut health, &LifeState::Alive, 0.0));
    assert!(apply_if_due(&source, &mut contacts, other, CombatantKind::Enemy, &mut health, &LifeState::Alive, 0.0));
    assert_eq!(health.current(), 40);

    let custom = TargetFilter::hostile().with_allies(true).with_enemies(false);
    assert!(custom.admits(CombatantKind::Ally));
    assert!(!custom.admits(CombatantKind::Enemy));
    assert!(!custom.admits(CombatantKind::Player));
}

#[test]
fn dead_targets_take_nothing() {
    let mut world = World::new();
    let target = world.spawn_empty().id();
    let source = DamageSource::new(10, 0.0, TargetFilter::player_aligned());
    let mut contacts = DamageContacts::default();
    let mut health = Health::new(10);
    health.take(10);
    let mut life = LifeState::Alive;
    assert!(life.kill(None));

    assert!(!apply_if_due(&source, &mut contacts, target, CombatantKind::Player, &mut health, &life, 3.0));
    assert_eq!(health.current(), 0);
}

#[test]
fn kill_is_idempotent() {
    let mut life = LifeState::Alive;
    assert!(life.kill(Some(3.0)));
    let before = format!("{life:?}");
    assert!(!life.kill(None));
    assert_eq!(format!("{life:?}"), before);
}

#[test]
fn respawn_timer_finishes_once() {
    let mut life = LifeState::Alive;
    life.kill(Some(1.0));
    assert!(!life.tick_respawn(Duration::from_secs_f32(0.6)));
    assert!(life.tick_respawn(Duration::from_secs_f32(0.6)));
    life.revive();
    assert!(life.is_alive());
    assert!(!life.tick_respawn(Duration::from_secs_f32(5.0)));
}

#[test]
fn facing_follows_sign() {
    assert_eq!(Facing::Right.toward(-0.3), Facing::Left);
    assert_eq!(Facing::Left.toward(0.0), Facing::Left);
    assert_eq!(Facing::Left.toward(2.0).sign(), 1.0);
}

proptest! {
    #[test]
    fn health_stays_within_bounds(
        max in 0u32..500,
        ops in proptest::collection::vec((any::<bool>(), 0u32..1000), 0..64),
    ) {
        let mut health = Health::new(max);
        for (heal, amount) in ops {
            if heal { health.heal(amount); } else { health.take(amount); }
            prop_assert!(health.current() <= health.max());
        }
    }

    #[test]
    fn continuous_contact_never_applies_twice_within_rate(
        rate in 0.05f32..3.0,
        steps in proptest::collection::vec(0.001f32..0.5, 1..200),
    ) {
        let mut world = World::new();
        let target = world.spawn_empty().id();
        let source = DamageSource::new(1, rate, TargetFilter::player_aligned());
        let mut contacts = DamageContacts::default();
        let mut health = Health::new(u32::MAX);
        contacts.begin(target);

        let mut now = 0.0f32;
        let mut last: Option<f32> = None;
        for dt in steps {
            if apply_if_due(&source, &mut contacts, target, CombatantKind::Player, &mut health, &LifeState::Alive, now) {
                if let Some(prev) = last {
                    prop_assert!(now - prev >= rate);
                }
                last = Some(now);
            }
            now += dt;
        }
    }
}

// -----------------------------------------------------------------------------
// ECS wiring
// -----------------------------------------------------------------------------

#[test]
fn collision_start_applies_immediately_then_waits() {
    let mut world = combat_world();
    let hazard = world
        .spawn(DamageSource::new(20, 1.0, TargetFilter::player_aligned()))
        .id();
    let player = spawn_target(&mut world, CombatantKind::Player, 100);

    start(&mut world, hazard, player);
    run_system_once(&mut world, track_damage_contacts);
    run_system_once(&mut world, resolve_contact_damage);
    assert_eq!(hp(&world, player), 80);

    set_fixed_time(&mut world, 0.5, 0.5);
    run_system_once(&mut world, resolve_contact_damage);
    assert_eq!(hp(&world, player), 80);

    set_fixed_time(&mut world, 1.0, 0.5);
    run_system_once(&mut world, resolve_contact_damage);
    assert_eq!(hp(&world, player), 60);
}

#[test]
fn collision_end_forgets_the_pair() {
    let mut world = combat_world();
    let hazard = world
        .spawn(DamageSource::new(20, 1.0, TargetFilter::player_aligned()))
        .id();
    let player = spawn_target(&mut world, CombatantKind::Player, 100);

    start(&mut world, player, hazard);
    run_system_once(&mut world, track_damage_contacts);
    run_system_once(&mut world, resolve_contact_damage);

    end(&mut world, player, hazard);
    run_system_once(&mut world, track_damage_contacts);
    assert!(!world.get::<DamageContacts>(hazard).is_some_and(|c| c.in_contact(player)));

    set_fixed_time(&mut world, 1.5, 0.5);
    run_system_once(&mut world, resolve_contact_damage);
    assert_eq!(hp(&world, player), 80);
}

#[test]
fn stale_targets_are_dropped() {
    let mut world = combat_world();
    let hazard = world
        .spawn(DamageSource::new(20, 1.0, TargetFilter::player_aligned()))
        .id();
    let player = spawn_target(&mut world, CombatantKind::Player, 100);

    start(&mut world, hazard, player);
    run_system_once(&mut world, track_damage_contacts);
    world.despawn(player);
    run_system_once(&mut world, resolve_contact_damage);

    assert!(world.get::<DamageContacts>(hazard).is_some_and(|c| c.is_empty()));
}

#[test]
fn death_fires_exactly_once() {
    let mut world = combat_world();
    let enemy = spawn_target(&mut world, CombatantKind::Enemy, 30);
    world.entity_mut(enemy).insert(RespawnDelay(3.0));

    world.write_message(DealDamage { target: enemy, amount: 50, source: None });
    run_system_once(&mut world, apply_damage_requests);
    assert_eq!(hp(&world, enemy), 0);

    run_system_once(&mut world, detect_deaths);
    run_system_once(&mut world, detect_deaths);

    let died = world.resource::<Messages<Died>>();
    let mut cursor = died.get_cursor();
    assert_eq!(cursor.read(died).count(), 1);
    assert!(!world.get::<LifeState>(enemy).is_some_and(LifeState::is_alive));
}

#[test]
fn timed_respawn_restores_health_and_position() {
    let mut world = combat_world();
    let enemy = world
        .spawn((
            CombatantKind::Enemy,
            Health::new(50),
            LifeState::Alive,
            RespawnDelay(3.0),
            SpawnPoint(Vec2::new(4.0, 2.0)),
            Transform::from_xyz(9.0, -1.0, 0.0),
            LinearVelocity(Vec2::new(3.0, 0.0)),
        ))
        .id();
    world.get_mut::<Health>(enemy).map(|mut h| h.take(50));
    run_system_once(&mut world, detect_deaths);

    set_fixed_time(&mut world, 2.0, 2.0);
    run_system_once(&mut world, tick_respawns);
    assert!(!world.get::<LifeState>(enemy).is_some_and(LifeState::is_alive));

    set_fixed_time(&mut world, 3.5, 1.5);
    run_system_once(&mut world, tick_respawns);

    assert!(world.get::<LifeState>(enemy).is_some_and(LifeState::is_alive));
    assert_eq!(hp(&world, enemy), 50);
    let tf = world.get::<Transform>(enemy).copied().unwrap_or_default();
    assert_eq!(tf.translation.truncate(), Vec2::new(4.0, 2.0));
    assert_eq!(world.get::<LinearVelocity>(enemy).map(|v| v.0), Some(Vec2::ZERO));
}
