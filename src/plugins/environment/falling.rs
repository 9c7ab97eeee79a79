//! Platforms that drop shortly after the player lands on them and come back later.
//!
//! The resting platform never moves. When it drops, it hides and goes non-solid, and a
//! dynamic copy falls in its place. The copy is removed after lingering on the ground or
//! after falling too long; the original reappears on its own respawn timer.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::terrain_layers;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::player::Player;

use super::started_pair;

/// Vertical speed under which a falling copy counts as landed.
const LANDED_SPEED: f32 = 0.05;
/// Grace period before a copy can count as landed.
const LAUNCH_SECS: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformPhase {
    Resting,
    Armed(Timer),
    Fallen(Timer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    Drop,
    Restore,
}

#[derive(Component, Debug, Clone)]
pub struct FallingPlatform {
    pub phase: PlatformPhase,
    pub size: Vec2,
}

impl FallingPlatform {
    pub fn new(size: Vec2) -> Self {
        Self { phase: PlatformPhase::Resting, size }
    }

    /// Start the fall delay. Only a resting platform can be armed.
    pub fn arm(&mut self, delay_secs: f32) -> bool {
        if !matches!(self.phase, PlatformPhase::Resting) {
            return false;
        }
        self.phase = PlatformPhase::Armed(Timer::from_seconds(delay_secs, TimerMode::Once));
        true
    }

    pub fn tick(&mut self, delta: Duration, respawn_secs: f32) -> Option<PlatformEvent> {
        let (next, event) = match &mut self.phase {
            PlatformPhase::Resting => return None,
            PlatformPhase::Armed(timer) => {
                timer.tick(delta);
                if !timer.is_finished() {
                    return None;
                }
                let respawn = Timer::from_seconds(respawn_secs, TimerMode::Once);
                (PlatformPhase::Fallen(respawn), PlatformEvent::Drop)
            }
            PlatformPhase::Fallen(timer) => {
                timer.tick(delta);
                if !timer.is_finished() {
                    return None;
                }
                (PlatformPhase::Resting, PlatformEvent::Restore)
            }
        };
        self.phase = next;
        Some(event)
    }
}

/// The falling stand-in for a dropped platform.
#[derive(Component, Debug, Clone, Default)]
pub struct FallingCopy {
    elapsed: f32,
    landed_for: Option<f32>,
}

impl FallingCopy {
    /// Advance by `dt` with the copy's current vertical speed. Returns true once it should go.
    pub fn advance(&mut self, dt: f32, vel_y: f32, linger_secs: f32, max_fall_secs: f32) -> bool {
        self.elapsed += dt;
        match self.landed_for.as_mut() {
            Some(t) => *t += dt,
            None if self.elapsed > LAUNCH_SECS && vel_y.abs() < LANDED_SPEED => {
                self.landed_for = Some(0.0);
            }
            None => {}
        }
        match self.landed_for {
            Some(t) => t >= linger_secs,
            None => self.elapsed >= max_fall_secs,
        }
    }

    pub fn has_landed(&self) -> bool {
        self.landed_for.is_some()
    }
}

const PLATFORM_COLOR: Color = Color::srgb(0.6, 0.5, 0.35);

pub fn spawn_falling_platform(commands: &mut Commands, at: Vec2, size: Vec2) -> Entity {
    commands
        .spawn((
            Name::new("FallingPlatform"),
            FallingPlatform::new(size),
            Sprite {
                color: PLATFORM_COLOR,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(at.extend(0.0)),
            Visibility::Visible,
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            terrain_layers(),
            CollisionEventsEnabled,
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

/// Arm a platform when the player touches it from above.
pub fn arm_falling_platforms(
    tunables: Res<Tunables>,
    mut started: MessageReader<CollisionStart>,
    q_player: Query<&Transform, With<Player>>,
    mut q_platforms: Query<(&Transform, &mut FallingPlatform), Without<Player>>,
) {
    for ev in started.read() {
        let Some((platform, other)) = started_pair(ev, |e| q_platforms.contains(e)) else {
            continue;
        };
        let Ok(player_tf) = q_player.get(other) else {
            continue;
        };
        let Ok((tf, mut falling)) = q_platforms.get_mut(platform) else {
            continue;
        };
        let top = tf.translation.y + falling.size.y * 0.5;
        if player_tf.translation.y > top && falling.arm(tunables.environment.platform_fall_delay_secs) {
            debug!("Falling platform {platform:?} armed");
        }
    }
}

pub fn tick_falling_platforms(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut q: Query<(Entity, &Transform, &mut FallingPlatform, &mut Visibility)>,
) {
    for (e, tf, mut falling, mut vis) in &mut q {
        match falling.tick(time.delta(), tunables.environment.platform_respawn_secs) {
            Some(PlatformEvent::Drop) => {
                commands.entity(e).insert(ColliderDisabled);
                *vis = Visibility::Hidden;
                let size = falling.size;
                commands.spawn((
                    Name::new("FallingPlatformCopy"),
                    FallingCopy::default(),
                    Sprite {
                        color: PLATFORM_COLOR,
                        custom_size: Some(size),
                        ..default()
                    },
                    *tf,
                    RigidBody::Dynamic,
                    Collider::rectangle(size.x, size.y),
                    LockedAxes::ROTATION_LOCKED,
                    terrain_layers(),
                    DespawnOnExit(GameState::InGame),
                ));
            }
            Some(PlatformEvent::Restore) => {
                commands.entity(e).remove::<ColliderDisabled>();
                *vis = Visibility::Visible;
                debug!("Falling platform {e:?} restored");
            }
            None => {}
        }
    }
}

pub fn tick_falling_copies(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut q: Query<(Entity, &mut FallingCopy, Option<&LinearVelocity>)>,
) {
    let env = &tunables.environment;
    for (e, mut copy, vel) in &mut q {
        let vy = vel.map_or(0.0, |v| v.y);
        if copy.advance(time.delta_secs(), vy, env.platform_linger_secs, env.platform_max_fall_secs) {
            commands.entity(e).despawn();
        }
    }
}
