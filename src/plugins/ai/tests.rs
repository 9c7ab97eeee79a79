use avian2d::prelude::*;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{run_system_once, set_fixed_time};
use crate::common::tunables::AiTunables;
use crate::plugins::weapons::Hitbox;

fn enemy() -> AiBrain {
    AiBrain::new(AiTunables::enemy(), true)
}

fn ally() -> AiBrain {
    AiBrain::new(AiTunables::ally(), true)
}

fn target(world: &mut World) -> Entity {
    world.spawn_empty().id()
}

// -----------------------------------------------------------------------------
// Pure decisions
// -----------------------------------------------------------------------------

#[test]
fn inert_brain_holds_still() {
    let mut world = World::new();
    let t = target(&mut world);
    let mut brain = AiBrain::new(AiTunables::enemy(), false);
    let d = brain.decide(
        &Perception { nearest: Some((t, Vec2::X)), anchor: Some(Vec2::X), ..default() },
        0.0,
    );
    assert_eq!(d, Decision::default());
    assert_eq!(brain.state, AiState::Following);
    assert_eq!(brain.target, None);
}

#[test]
fn following_engages_on_the_same_tick() {
    let mut world = World::new();
    let t = target(&mut world);
    let mut brain = enemy();

    let d = brain.decide(&Perception { nearest: Some((t, Vec2::new(1.5, 0.0))), ..default() }, 0.0);

    assert_eq!(brain.state, AiState::Attacking);
    assert_eq!(brain.target, Some(t));
    assert!(d.attack);
    assert_eq!(d.velocity_x, 0.0);
    assert!(d.face > 0.0);
}

#[test]
fn attacks_respect_cooldown() {
    let mut world = World::new();
    let t = target(&mut world);
    let mut brain = enemy();
    let near = Perception { nearest: Some((t, Vec2::X)), target: Some(Vec2::X), ..default() };

    assert!(brain.decide(&near, 0.0).attack);
    assert!(!brain.decide(&near, 1.0).attack);
    assert!(brain.decide(&near, 2.0).attack);
}

#[test]
fn chases_horizontally_when_out_of_range() {
    let mut world = World::new();
    let t = target(&mut world);
    let mut brain = enemy();

    let d = brain.decide(&Perception { nearest: Some((t, Vec2::new(-3.0, 2.0))), ..default() }, 0.0);

    assert_eq!(brain.state, AiState::Attacking);
    assert!(!d.attack);
    assert_eq!(d.velocity_x, -AiTunables::enemy().move_speed);
}

#[test]
fn target_beyond_twice_range_is_dropped() {
    let mut world = World::new();
    let t = target(&mut world);
    let mut brain = enemy();
    brain.decide(&Perception { nearest: Some((t, Vec2::X)), ..default() }, 0.0);

    let range = brain.tuning.attack_range;
    brain.decide(&Perception { target: Some(Vec2::X * (range * 2.0 + 0.1)), ..default() }, 0.1);

    assert_eq!(brain.state, AiState::Following);
    assert_eq!(brain.target, None);
}

#[test]
fn dead_or_missing_target_is_dropped() {
    let mut world = World::new();
    let t = target(&mut world);
    let mut brain = enemy();
    brain.decide(&Perception { nearest: Some((t, Vec2::X)), ..default() }, 0.0);

    brain.decide(&Perception { target: None, ..default() }, 0.1);

    assert_eq!(brain.state, AiState::Following);
    assert_eq!(brain.target, None);
}

#[test]
fn follower_closes_distance_to_anchor_with_boost() {
    let brain = ally();
    let follow = brain.tuning.follow_distance;
    let base = brain.tuning.move_speed;

    assert_eq!(brain.speed(Some(follow * 0.5)), base);
    assert_eq!(brain.speed(Some(follow * 1.2)), base * 1.5);
    assert_eq!(brain.speed(Some(follow * 2.0)), base * 3.0);
    // Enemies never follow at a distance, so never boost.
    assert_eq!(enemy().speed(Some(100.0)), AiTunables::enemy().move_speed);

    let mut brain = ally();
    let d = brain.decide(&Perception { anchor: Some(Vec2::new(follow * 1.2, 0.0)), ..default() }, 0.0);
    assert_eq!(d.velocity_x, base * 1.5);

    let d = brain.decide(&Perception { anchor: Some(Vec2::new(follow * 0.5, 0.0)), ..default() }, 0.0);
    assert_eq!(d.velocity_x, 0.0);
}

#[test]
fn leashed_ally_returns_home_before_following_again() {
    let mut world = World::new();
    let t = target(&mut world);
    let mut brain = ally();
    let follow = brain.tuning.follow_distance;
    brain.decide(&Perception { nearest: Some((t, Vec2::X)), ..default() }, 0.0);
    assert_eq!(brain.state, AiState::Attacking);

    let far_anchor = Vec2::new(-(follow * 2.0 + 1.0), 0.0);
    let d = brain.decide(
        &Perception { anchor: Some(far_anchor), target: Some(Vec2::X), ..default() },
        0.1,
    );
    assert_eq!(brain.state, AiState::Returning);
    assert_eq!(brain.target, None);
    assert!(d.velocity_x < 0.0);
    assert!(!d.attack);

    // Still returning while beyond 0.8x follow distance, even with an opponent nearby.
    let mid = Vec2::new(-follow * 0.9, 0.0);
    brain.decide(&Perception { anchor: Some(mid), nearest: Some((t, Vec2::X)), ..default() }, 0.2);
    assert_eq!(brain.state, AiState::Returning);

    let home = Vec2::new(-follow * 0.7, 0.0);
    brain.decide(&Perception { anchor: Some(home), ..default() }, 0.3);
    assert_eq!(brain.state, AiState::Following);
}

#[test]
fn enemies_never_leash() {
    let mut world = World::new();
    let t = target(&mut world);
    let mut brain = enemy();
    brain.decide(&Perception { nearest: Some((t, Vec2::X)), ..default() }, 0.0);
    brain.decide(
        &Perception { anchor: Some(Vec2::new(500.0, 0.0)), target: Some(Vec2::X), ..default() },
        0.1,
    );
    assert_eq!(brain.state, AiState::Attacking);
}

// -----------------------------------------------------------------------------
// System
// -----------------------------------------------------------------------------

fn ai_world() -> World {
    let mut world = World::new();
    set_fixed_time(&mut world, 1.0, 0.0);
    world
}

fn spawn_brain(world: &mut World, kind: CombatantKind, brain: AiBrain, at: Vec2) -> Entity {
    world
        .spawn((
            kind,
            LifeState::Alive,
            brain,
            Facing::Right,
            LinearVelocity::ZERO,
            Transform::from_translation(at.extend(0.0)),
        ))
        .id()
}

#[test]
fn aggressive_enemy_attacks_nearby_player() {
    let mut world = ai_world();
    let player = world
        .spawn((Player, CombatantKind::Player, LifeState::Alive, Transform::from_xyz(-1.0, 0.0, 0.0)))
        .id();
    let enemy_e = spawn_brain(&mut world, CombatantKind::Enemy, enemy(), Vec2::ZERO);

    run_system_once(&mut world, think);

    let brain = world.get::<AiBrain>(enemy_e).unwrap();
    assert_eq!(brain.target, Some(player));
    assert_eq!(*world.get::<Facing>(enemy_e).unwrap(), Facing::Left);

    let hitbox = world.query::<&Hitbox>().single(&world).unwrap();
    assert_eq!(hitbox.owner, enemy_e);
    assert!(hitbox.offset.x < 0.0);
}

#[test]
fn brains_ignore_dead_and_friendly_bodies() {
    let mut world = ai_world();
    world.spawn((Player, CombatantKind::Player, LifeState::Dead { respawn: None }, Transform::default()));
    spawn_brain(&mut world, CombatantKind::Enemy, enemy(), Vec2::new(0.5, 0.0));
    let other = spawn_brain(&mut world, CombatantKind::Enemy, enemy(), Vec2::new(1.0, 0.0));

    run_system_once(&mut world, think);

    assert_eq!(world.get::<AiBrain>(other).unwrap().target, None);
    assert_eq!(world.query::<&Hitbox>().iter(&world).count(), 0);
}

#[test]
fn nearest_ties_resolve_to_the_lowest_entity() {
    let mut world = ai_world();
    let first = spawn_brain(&mut world, CombatantKind::Enemy, AiBrain::new(AiTunables::enemy(), false), Vec2::new(-3.0, 0.0));
    spawn_brain(&mut world, CombatantKind::Enemy, AiBrain::new(AiTunables::enemy(), false), Vec2::new(3.0, 0.0));
    let ally_e = spawn_brain(&mut world, CombatantKind::Ally, ally(), Vec2::ZERO);

    run_system_once(&mut world, think);

    assert_eq!(world.get::<AiBrain>(ally_e).unwrap().target, Some(first));
}
