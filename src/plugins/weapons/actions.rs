//! Player weapon dispatch: cycling, primary/secondary actions per archetype.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{Layer, non_interacting, player_attack_layers};
use crate::common::state::GameState;
use crate::common::tunables::{ChargeTunables, Tunables};
use crate::plugins::combat::{
    CombatantKind, DamageSource, DealDamage, Facing, LifeState, TargetFilter,
};
use crate::plugins::physics::probe::{AvianProbe, WorldProbe, nearest_within};
use crate::plugins::player::Player;
use crate::plugins::player::input::PlayerInput;

use super::charge::{ChargeState, charge_units, unit_offsets};
use super::hitbox::{EffectUnit, Hitbox, HitboxSpec, Lifetime, Projectile, spawn_hitbox};
use super::loadout::{ActionSide, WeaponKind, WeaponLoadout};

/// Visual-only line drawn for a successful elemental arc.
#[derive(Component, Debug, Clone, Copy)]
pub struct ArcFlash {
    pub from: Vec2,
    pub to: Vec2,
}

/// Normalized throw direction toward `aim`, falling back to facing when degenerate.
pub fn throw_direction(origin: Vec2, aim: Option<Vec2>, facing: Facing) -> Vec2 {
    aim.map(|p| p - origin)
        .filter(|d| d.length_squared() > 0.001)
        .map_or(Vec2::X * facing.sign(), Vec2::normalize)
}

/// Pick the elemental arc target: the nearest living enemy in range, if the line to it is clear.
pub fn arc_target<P: WorldProbe>(
    probe: Option<&P>,
    origin: Vec2,
    range: f32,
    enemies: impl IntoIterator<Item = (Entity, Vec2)>,
) -> Option<(Entity, Vec2)> {
    let candidates: Vec<(Entity, Vec2)> = enemies.into_iter().collect();
    let (target, _) = nearest_within(origin, range, candidates.iter().copied())?;
    let pos = candidates.iter().find(|(e, _)| *e == target)?.1;
    let probe = probe?;
    probe.line_clear(origin, pos).then_some((target, pos))
}

pub fn cycle_weapons(
    input: Res<PlayerInput>,
    mut q_player: Query<(&mut WeaponLoadout, &mut ChargeState), With<Player>>,
) {
    if !input.cycle_modifier {
        return;
    }
    let Ok((mut loadout, mut charge)) = q_player.single_mut() else {
        return;
    };
    let slot = match (input.cycle_left, input.cycle_right) {
        (true, false) => 1,
        (false, true) => 0,
        _ => return,
    };
    match loadout.switch_to(slot) {
        Ok(()) => {
            charge.cancel();
            debug!("Active weapon slot {slot}: {:?}", loadout.active());
        }
        Err(e) => debug!("Weapon switch rejected: {e}"),
    }
}

pub fn player_weapon_actions(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    spatial: Option<SpatialQuery>,
    mut q_player: Query<
        (Entity, &Transform, &Facing, &LifeState, &mut WeaponLoadout, &mut ChargeState),
        With<Player>,
    >,
    q_targets: Query<(Entity, &Transform, &CombatantKind, &LifeState), Without<Player>>,
    mut damage: MessageWriter<DealDamage>,
) {
    let Ok((player, tf, facing, life, mut loadout, mut charge)) = q_player.single_mut() else {
        return;
    };
    // Holding the cycle modifier is slot selection, not combat.
    if !life.is_alive() || input.cycle_modifier {
        charge.cancel();
        return;
    }

    let now = time.elapsed_secs();
    let origin = tf.translation.truncate();
    let weapons = &tunables.weapons;

    if input.attack_primary {
        let cooldown = match loadout.active() {
            Some(WeaponKind::Melee) => weapons.melee.cooldown_secs,
            Some(WeaponKind::Thrown) => weapons.thrown.cooldown_secs,
            Some(WeaponKind::Elemental) => weapons.elemental.cooldown_secs,
            None => 0.0,
        };
        match loadout.try_use(ActionSide::Primary, now, cooldown) {
            Ok(WeaponKind::Melee) => {
                let m = &weapons.melee;
                spawn_hitbox(
                    &mut commands,
                    HitboxSpec {
                        name: "MeleeHitbox",
                        owner: player,
                        origin,
                        offset: Vec2::X * m.reach * facing.sign(),
                        size: m.size,
                        secs: m.duration_secs,
                        source: DamageSource::new(m.damage, m.rate_secs, TargetFilter::hostile()),
                        layers: player_attack_layers(),
                        follow_owner: true,
                        color: Color::srgba(0.9, 0.9, 1.0, 0.5),
                    },
                );
            }
            Ok(WeaponKind::Thrown) => {
                let dir = throw_direction(origin, input.aim_point, *facing);
                spawn_projectile(&mut commands, player, origin, dir, &tunables);
            }
            Ok(WeaponKind::Elemental) => {
                let probe = spatial.as_ref().map(AvianProbe::new);
                let enemies = q_targets
                    .iter()
                    .filter(|(_, _, kind, life)| **kind == CombatantKind::Enemy && life.is_alive())
                    .map(|(e, tf, _, _)| (e, tf.translation.truncate()));
                match arc_target(probe.as_ref(), origin, weapons.elemental.range, enemies) {
                    Some((target, pos)) => {
                        damage.write(DealDamage {
                            target,
                            amount: weapons.elemental.damage,
                            source: Some(player),
                        });
                        spawn_arc_flash(&mut commands, origin, pos, weapons.elemental.flash_secs);
                    }
                    None => debug!("Elemental arc found no reachable target"),
                }
            }
            Err(e) => debug!("Primary action rejected: {e}"),
        }
    }

    if loadout.active() != Some(WeaponKind::Melee) {
        charge.cancel();
        return;
    }

    if input.secondary_pressed {
        match loadout.ready(ActionSide::Secondary, now) {
            Ok(_) => {
                charge.begin(now);
            }
            Err(e) => debug!("Charge rejected: {e}"),
        }
    }

    if input.secondary_released
        && let Some(held) = charge.release(now)
    {
        let c = &weapons.charge;
        if let Err(e) = loadout.try_use(ActionSide::Secondary, now, c.cooldown_secs) {
            debug!("Charge release rejected: {e}");
            return;
        }
        let units = charge_units(held, &c.tiers, c.max_units);
        spawn_charge_units(&mut commands, player, origin, facing.sign(), units, c);
    }
}

fn spawn_projectile(commands: &mut Commands, owner: Entity, origin: Vec2, dir: Vec2, tunables: &Tunables) {
    let t = &tunables.weapons.thrown;
    commands.spawn((
        Name::new("ThrownShard"),
        Projectile,
        Hitbox { owner, offset: Vec2::ZERO, follow_owner: false },
        Lifetime::from_secs(t.lifetime_secs),
        DamageSource::new(t.damage, t.lifetime_secs, TargetFilter::hostile()).owned_by(owner),
        Sprite {
            color: Color::srgb(0.7, 0.9, 1.0),
            custom_size: Some(Vec2::splat(t.radius * 2.0)),
            ..default()
        },
        Transform::from_translation((origin + dir * 0.6).extend(2.0)),
        RigidBody::Dynamic,
        Collider::circle(t.radius),
        Sensor,
        player_attack_layers(),
        LinearVelocity(dir * t.speed),
        CollisionEventsEnabled,
        DespawnOnExit(GameState::InGame),
    ));
}

/// Spawn `count` charged units along the facing direction, each waiting one stagger step
/// longer than the previous.
pub fn spawn_charge_units(
    commands: &mut Commands,
    owner: Entity,
    origin: Vec2,
    facing_sign: f32,
    count: u32,
    c: &ChargeTunables,
) {
    for (i, dx) in unit_offsets(count, c.spacing, facing_sign).into_iter().enumerate() {
        let rest = origin + Vec2::X * dx;
        let unit = EffectUnit {
            delay: Timer::from_seconds(i as f32 * c.stagger_secs, TimerMode::Once),
            life: Timer::from_seconds(c.unit_lifetime_secs, TimerMode::Once),
            rest,
            rise_depth: c.rise_depth,
            arc_height: c.arc_height,
            active_layers: player_attack_layers(),
        };
        let start = unit.position();
        commands.spawn((
            Name::new("ChargeUnit"),
            Hitbox { owner, offset: Vec2::X * dx, follow_owner: false },
            unit,
            DamageSource::new(c.damage, c.rate_secs, TargetFilter::hostile()).owned_by(owner),
            Sprite {
                color: Color::srgb(0.6, 0.85, 1.0),
                custom_size: Some(c.unit_size),
                ..default()
            },
            Transform::from_translation(start.extend(2.0)),
            RigidBody::Kinematic,
            Collider::rectangle(c.unit_size.x, c.unit_size.y),
            Sensor,
            non_interacting(Layer::PlayerAttack),
            CollisionEventsEnabled,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn spawn_arc_flash(commands: &mut Commands, from: Vec2, to: Vec2, secs: f32) {
    let delta = to - from;
    commands.spawn((
        Name::new("ArcFlash"),
        ArcFlash { from, to },
        Lifetime::from_secs(secs),
        Sprite {
            color: Color::srgb(0.8, 0.9, 1.0),
            custom_size: Some(Vec2::new(delta.length(), 0.08)),
            ..default()
        },
        Transform::from_translation(((from + to) * 0.5).extend(3.0))
            .with_rotation(Quat::from_rotation_z(delta.to_angle())),
        DespawnOnExit(GameState::InGame),
    ));
}
