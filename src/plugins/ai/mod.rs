//! Shared brain for enemies and allies.
//!
//! ```text
//!            target found                       leash exceeded (allies)
//! Following ─────────────▶ Attacking ───────────────────────────────▶ Returning
//!     ▲                        │                                          │
//!     └── target lost ─────────┘          within 0.8 × follow distance    │
//!     ▲                                                                   │
//!     └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`AiBrain::decide`] is pure: the [`think`] system gathers a [`Perception`] per brain, asks
//! for a [`Decision`], then applies velocity, facing and attacks.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::{enemy_attack_layers, player_attack_layers};
use crate::common::state::SimulationSet;
use crate::common::tunables::AiTunables;
use crate::plugins::combat::{CombatantKind, DamageSource, Facing, LifeState, TargetFilter};
use crate::plugins::physics::probe::nearest_within;
use crate::plugins::player::Player;
use crate::plugins::weapons::{HitboxSpec, spawn_hitbox};

/// Closer than this to a move goal counts as arrived.
const ARRIVE_EPSILON: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiState {
    #[default]
    Following,
    Attacking,
    Returning,
}

#[derive(Component, Debug, Clone)]
pub struct AiBrain {
    pub state: AiState,
    pub target: Option<Entity>,
    pub tuning: AiTunables,
    /// Inactive brains hold still and ignore everything.
    pub aggressive: bool,
    next_attack_at: f32,
}

/// What a brain can see this tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Perception {
    pub position: Vec2,
    pub anchor: Option<Vec2>,
    /// Current target's position, if it still exists and is alive.
    pub target: Option<Vec2>,
    /// Nearest living opponent within the search radius.
    pub nearest: Option<(Entity, Vec2)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Decision {
    /// Horizontal velocity. Zero halts.
    pub velocity_x: f32,
    /// Turn toward this signed horizontal direction.
    pub face: f32,
    pub attack: bool,
}

impl Decision {
    const HALT: Self = Self { velocity_x: 0.0, face: 0.0, attack: false };
}

impl AiBrain {
    pub fn new(tuning: AiTunables, aggressive: bool) -> Self {
        Self { state: AiState::Following, target: None, tuning, aggressive, next_attack_at: 0.0 }
    }

    /// Back to a clean Following state with no target.
    pub fn reset(&mut self) {
        self.state = AiState::Following;
        self.target = None;
    }

    /// Horizontal speed, boosted when far from the anchor so the brain never falls behind.
    pub fn speed(&self, anchor_distance: Option<f32>) -> f32 {
        let base = self.tuning.move_speed;
        let follow = self.tuning.follow_distance;
        match anchor_distance {
            Some(d) if follow > 0.0 && d > follow * 1.5 => base * 3.0,
            Some(d) if follow > 0.0 && d > follow => base * 1.5,
            _ => base,
        }
    }

    pub fn decide(&mut self, p: &Perception, now: f32) -> Decision {
        if !self.aggressive {
            return Decision::HALT;
        }
        let anchor_distance = p.anchor.map(|a| a.distance(p.position));

        match self.state {
            AiState::Following => match p.nearest {
                Some((e, pos)) => {
                    self.target = Some(e);
                    self.state = AiState::Attacking;
                    self.engage(p.position, pos, anchor_distance, now)
                }
                None => self.follow_anchor(p, anchor_distance),
            },
            AiState::Attacking => {
                if let (Some(leash), Some(d)) = (self.tuning.leash_distance, anchor_distance)
                    && d > leash
                {
                    self.target = None;
                    self.state = AiState::Returning;
                    return self.return_home(p, anchor_distance);
                }
                let range = self.tuning.attack_range;
                match p.target.filter(|pos| pos.distance(p.position) <= range * 2.0) {
                    Some(pos) => self.engage(p.position, pos, anchor_distance, now),
                    None => {
                        self.target = None;
                        self.state = AiState::Following;
                        self.follow_anchor(p, anchor_distance)
                    }
                }
            }
            AiState::Returning => self.return_home(p, anchor_distance),
        }
    }

    fn engage(&mut self, me: Vec2, target: Vec2, anchor_distance: Option<f32>, now: f32) -> Decision {
        let dx = target.x - me.x;
        if me.distance(target) > self.tuning.attack_range {
            return Decision { velocity_x: dx.signum() * self.speed(anchor_distance), face: dx, attack: false };
        }
        let attack = now >= self.next_attack_at;
        if attack {
            self.next_attack_at = now + self.tuning.attack_cooldown_secs;
        }
        Decision { velocity_x: 0.0, face: dx, attack }
    }

    fn follow_anchor(&self, p: &Perception, anchor_distance: Option<f32>) -> Decision {
        let (Some(anchor), Some(d)) = (p.anchor, anchor_distance) else {
            return Decision::HALT;
        };
        if d <= self.tuning.follow_distance {
            return Decision::HALT;
        }
        self.move_toward(p.position, anchor, anchor_distance)
    }

    fn return_home(&mut self, p: &Perception, anchor_distance: Option<f32>) -> Decision {
        let (Some(anchor), Some(d)) = (p.anchor, anchor_distance) else {
            self.state = AiState::Following;
            return Decision::HALT;
        };
        if d <= self.tuning.follow_distance * 0.8 {
            self.state = AiState::Following;
            return Decision::HALT;
        }
        self.move_toward(p.position, anchor, anchor_distance)
    }

    fn move_toward(&self, me: Vec2, goal: Vec2, anchor_distance: Option<f32>) -> Decision {
        let dx = goal.x - me.x;
        if dx.abs() < ARRIVE_EPSILON {
            return Decision::HALT;
        }
        Decision { velocity_x: dx.signum() * self.speed(anchor_distance), face: dx, attack: false }
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(FixedPostUpdate, think.in_set(SimulationSet::Ai));
}

/// Opponents in a stable order, so nearest-target ties resolve the same way every run.
fn opponents_of(
    kind: CombatantKind,
    bodies: &Query<(Entity, &Transform, &CombatantKind, &LifeState)>,
) -> Vec<(Entity, Vec2)> {
    let mut v: Vec<(Entity, Vec2)> = bodies
        .iter()
        .filter(|(_, _, k, life)| kind.faction().opposes(k.faction()) && life.is_alive())
        .map(|(e, tf, _, _)| (e, tf.translation.truncate()))
        .collect();
    v.sort_by_key(|(e, _)| *e);
    v
}

pub fn think(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    q_anchor: Query<&Transform, With<Player>>,
    q_bodies: Query<(Entity, &Transform, &CombatantKind, &LifeState)>,
    mut q_brains: Query<(
        Entity,
        &Transform,
        &CombatantKind,
        &LifeState,
        &mut AiBrain,
        &mut LinearVelocity,
        &mut Facing,
    )>,
) {
    let now = time.elapsed_secs();
    let anchor = q_anchor.single().ok().map(|tf| tf.translation.truncate());

    for (e, tf, kind, life, mut brain, mut vel, mut facing) in &mut q_brains {
        if !life.is_alive() {
            continue;
        }
        let position = tf.translation.truncate();
        let target = brain.target.and_then(|t| match q_bodies.get(t) {
            Ok((_, ttf, _, tlife)) if tlife.is_alive() => Some(ttf.translation.truncate()),
            _ => None,
        });
        let opponents = opponents_of(*kind, &q_bodies);
        let nearest = nearest_within(position, brain.tuning.search_radius, opponents.iter().copied())
            .and_then(|(t, _)| opponents.iter().find(|(o, _)| *o == t).copied());

        let before = brain.state;
        let decision = brain.decide(&Perception { position, anchor, target, nearest }, now);
        if brain.state != before {
            debug!("{kind:?} {e:?}: {before:?} -> {:?}", brain.state);
        }

        vel.x = decision.velocity_x;
        *facing = facing.toward(decision.face);

        if decision.attack {
            spawn_attack(&mut commands, e, *kind, position, *facing, &brain.tuning);
        }
    }
}

fn spawn_attack(
    commands: &mut Commands,
    owner: Entity,
    kind: CombatantKind,
    origin: Vec2,
    facing: Facing,
    t: &AiTunables,
) {
    let (filter, layers, color) = match kind {
        CombatantKind::Enemy => (
            TargetFilter::player_aligned(),
            enemy_attack_layers(),
            Color::srgba(1.0, 0.3, 0.3, 0.5),
        ),
        CombatantKind::Ally | CombatantKind::Player => (
            TargetFilter::hostile(),
            player_attack_layers(),
            Color::srgba(0.4, 1.0, 0.6, 0.5),
        ),
    };
    spawn_hitbox(
        commands,
        HitboxSpec {
            name: "AiAttackHitbox",
            owner,
            origin,
            offset: Vec2::X * t.attack_range * t.attack_reach * facing.sign(),
            size: t.attack_size,
            secs: t.attack_secs,
            source: DamageSource::new(t.attack_damage, t.attack_rate_secs, filter),
            layers,
            follow_owner: true,
            color,
        },
    );
}

#[cfg(test)]
mod tests;
