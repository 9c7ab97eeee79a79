use std::time::Duration;

use super::*;
use crate::common::test_utils::run_system_once;

fn enemy_world() -> World {
    let mut world = World::new();
    world.init_resource::<Messages<Died>>();
    world.init_resource::<Messages<Respawned>>();
    world.init_resource::<Messages<DamageTaken>>();
    world.insert_resource(Time::<()>::default());
    world
}

fn spawned(world: &mut World, tuning: AiTunables, aggressive: bool) -> Entity {
    run_system_once(world, move |mut commands: Commands| {
        spawn_enemy(&mut commands, Vec2::new(4.0, 1.0), &tuning, aggressive);
    });
    world
        .query_filtered::<Entity, With<Enemy>>()
        .single(world)
        .unwrap()
}

// -----------------------------------------------------------------------------
// Newtype
// -----------------------------------------------------------------------------

#[test]
fn unitf32_clamps_and_decays() {
    let mut v = UnitF32::default();
    v.set_max(3.0);
    assert_eq!(v.get(), 1.0);
    v.set_max(0.5);
    assert_eq!(v.get(), 1.0);
    v.decay_to_zero(6.0, 0.1);
    assert!((v.get() - 0.4).abs() < 1e-5);
    v.decay_to_zero(6.0, 1.0);
    assert_eq!(v.get(), 0.0);
}

// -----------------------------------------------------------------------------
// Spawn + lifecycle
// -----------------------------------------------------------------------------

#[test]
fn spawned_enemy_carries_its_defaults() {
    let mut world = enemy_world();
    let e = spawned(&mut world, AiTunables::enemy(), true);

    assert_eq!(world.get::<Health>(e).unwrap().max(), 50);
    assert_eq!(world.get::<RespawnDelay>(e).unwrap().0, 3.0);
    assert_eq!(world.get::<SpawnPoint>(e).unwrap().0, Vec2::new(4.0, 1.0));
    assert!(world.get::<AiBrain>(e).unwrap().aggressive);
}

#[test]
fn no_respawn_delay_without_respawn_time() {
    let mut world = enemy_world();
    let tuning = AiTunables { respawn_secs: None, ..AiTunables::enemy() };
    let e = spawned(&mut world, tuning, false);
    assert!(world.get::<RespawnDelay>(e).is_none());
}

#[test]
fn death_disables_collision_and_clears_target() {
    let mut world = enemy_world();
    let e = spawned(&mut world, AiTunables::enemy(), true);
    let victim = world.spawn_empty().id();
    {
        let mut ent = world.entity_mut(e);
        ent.get_mut::<LinearVelocity>().unwrap().0 = Vec2::new(2.0, -1.0);
        let mut brain = ent.get_mut::<AiBrain>().unwrap();
        brain.target = Some(victim);
        brain.state = crate::plugins::ai::AiState::Attacking;
    }

    world.write_message(Died { entity: e, kind: CombatantKind::Enemy });
    run_system_once(&mut world, on_enemy_died);

    let ent = world.entity(e);
    assert_eq!(ent.get::<LinearVelocity>().unwrap().0, Vec2::ZERO);
    assert_eq!(*ent.get::<CollisionLayers>().unwrap(), non_interacting(Layer::Enemy));
    assert_eq!(ent.get::<GravityScale>().unwrap().0, 0.0);
    assert_eq!(ent.get::<AiBrain>().unwrap().target, None);

    world.write_message(Respawned { entity: e, kind: CombatantKind::Enemy });
    run_system_once(&mut world, on_enemy_respawned);

    let ent = world.entity(e);
    assert_eq!(*ent.get::<CollisionLayers>().unwrap(), enemy_layers());
    assert_eq!(ent.get::<GravityScale>().unwrap().0, 1.0);
}

#[test]
fn full_cycle_through_shared_lifecycle() {
    let mut world = enemy_world();
    let e = spawned(&mut world, AiTunables::enemy(), true);
    world.entity_mut(e).get_mut::<Transform>().unwrap().translation = Vec3::new(-3.0, -2.0, 1.0);
    world.entity_mut(e).get_mut::<Health>().unwrap().take(100);

    let mut fixed = Time::<Fixed>::default();
    fixed.advance_by(Duration::from_secs_f32(0.5));
    world.insert_resource(fixed);

    run_system_once(&mut world, detect_deaths);
    run_system_once(&mut world, on_enemy_died);
    assert!(!world.get::<LifeState>(e).unwrap().is_alive());

    for _ in 0..6 {
        run_system_once(&mut world, tick_respawns);
    }
    run_system_once(&mut world, on_enemy_respawned);

    let ent = world.entity(e);
    assert!(ent.get::<LifeState>().unwrap().is_alive());
    assert!(ent.get::<Health>().unwrap().is_full());
    assert_eq!(ent.get::<Transform>().unwrap().translation.truncate(), Vec2::new(4.0, 1.0));
    assert_eq!(*ent.get::<CollisionLayers>().unwrap(), enemy_layers());
}

// -----------------------------------------------------------------------------
// Presentation
// -----------------------------------------------------------------------------

#[test]
fn color_reflects_life_and_flash() {
    assert_eq!(enemy_color(&LifeState::Dead { respawn: None }, 1.0), DEAD_COLOR);
    assert_eq!(enemy_color(&LifeState::Alive, 0.0), ALIVE_COLOR);
    let white = enemy_color(&LifeState::Alive, 1.0).to_srgba();
    assert!((white.red - 1.0).abs() < 1e-5 && (white.green - 1.0).abs() < 1e-5);
}

#[test]
fn damage_triggers_flash() {
    let mut world = enemy_world();
    let e = spawned(&mut world, AiTunables::enemy(), false);
    world.write_message(DamageTaken { target: e, source: None, amount: 5 });

    run_system_once(&mut world, flash_on_damage);

    assert_eq!(world.get::<HitFlash>(e).unwrap().intensity(), 1.0);
}
