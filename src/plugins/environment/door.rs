//! Doors open when the player walks into their zone and close a while after the player left.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{terrain_layers, trigger_layers};
use crate::common::state::GameState;
use crate::common::tunables::{EnvironmentTunables, Tunables};
use crate::plugins::player::Player;

use super::{ended_pair, started_pair};

/// Extra width of the trigger zone on each side of the door.
const ZONE_MARGIN: f32 = 0.6;

#[derive(Component, Debug, Clone, Default)]
pub struct Door {
    open: bool,
    occupants: u32,
    close_timer: Option<Timer>,
    /// Cosmetic opening amount in [0..1].
    anim: f32,
}

impl Door {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        !self.open
    }

    #[inline]
    pub fn anim(&self) -> f32 {
        self.anim
    }

    #[inline]
    pub fn close_pending(&self) -> bool {
        self.close_timer.is_some()
    }

    /// Player entered the zone. Opens the door and cancels any pending close.
    /// Returns true if this opened it.
    pub fn enter(&mut self) -> bool {
        self.occupants += 1;
        self.close_timer = None;
        let opened = !self.open;
        self.open = true;
        opened
    }

    /// Player left the zone. The last one out starts the close delay.
    pub fn exit(&mut self, close_delay_secs: f32) {
        self.occupants = self.occupants.saturating_sub(1);
        if self.occupants == 0 && self.open {
            self.close_timer = Some(Timer::from_seconds(close_delay_secs, TimerMode::Once));
        }
    }

    /// Advance animation and the close delay. Returns true on the tick the door shuts.
    pub fn tick(&mut self, delta: Duration, open_secs: f32) -> bool {
        let dt = delta.as_secs_f32();
        let speed = 1.0 / open_secs.max(f32::EPSILON);
        self.anim = if self.open {
            (self.anim + dt * speed).min(1.0)
        } else {
            (self.anim - dt * speed * 2.0).max(0.0)
        };

        let Some(timer) = self.close_timer.as_mut() else {
            return false;
        };
        timer.tick(delta);
        if !timer.is_finished() {
            return false;
        }
        self.close_timer = None;
        if self.occupants > 0 {
            return false;
        }
        self.open = false;
        true
    }
}

/// Trigger area in front of and behind a door.
#[derive(Component, Debug, Clone, Copy)]
pub struct DoorZone {
    pub door: Entity,
}

pub fn spawn_door(commands: &mut Commands, at: Vec2, size: Vec2) -> Entity {
    let door = commands
        .spawn((
            Name::new("Door"),
            Door::default(),
            Sprite {
                color: Color::srgb(0.45, 0.3, 0.2),
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(at.extend(0.5)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            terrain_layers(),
            DespawnOnExit(GameState::InGame),
        ))
        .id();

    let zone = size + Vec2::new(ZONE_MARGIN * 2.0, 0.0);
    commands.spawn((
        Name::new("DoorZone"),
        DoorZone { door },
        Transform::from_translation(at.extend(0.0)),
        Collider::rectangle(zone.x, zone.y),
        Sensor,
        trigger_layers(),
        CollisionEventsEnabled,
        DespawnOnExit(GameState::InGame),
    ));
    door
}

pub fn track_door_zones(
    tunables: Res<Tunables>,
    mut started: MessageReader<CollisionStart>,
    mut ended: MessageReader<CollisionEnd>,
    q_zones: Query<&DoorZone>,
    q_player: Query<(), With<Player>>,
    mut q_doors: Query<&mut Door>,
) {
    let env: &EnvironmentTunables = &tunables.environment;

    for ev in started.read() {
        let Some((zone, other)) = started_pair(ev, |e| q_zones.contains(e)) else {
            continue;
        };
        if !q_player.contains(other) {
            continue;
        }
        let Ok(zone) = q_zones.get(zone) else { continue };
        if let Ok(mut door) = q_doors.get_mut(zone.door)
            && door.enter()
        {
            debug!("Door {:?} opened", zone.door);
        }
    }

    for ev in ended.read() {
        let Some((zone, other)) = ended_pair(ev, |e| q_zones.contains(e)) else {
            continue;
        };
        if !q_player.contains(other) {
            continue;
        }
        let Ok(zone) = q_zones.get(zone) else { continue };
        if let Ok(mut door) = q_doors.get_mut(zone.door) {
            door.exit(env.door_close_delay_secs);
        }
    }
}

/// Advance door timers and derive collision and sprite from the door state.
///
/// An open door carries `ColliderDisabled`, which also takes it out of spatial queries.
pub fn animate_doors(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut q: Query<(Entity, &mut Door, Has<ColliderDisabled>, Option<&mut Sprite>)>,
) {
    for (e, mut door, disabled, sprite) in &mut q {
        if door.tick(time.delta(), tunables.environment.door_open_secs) {
            debug!("Door {e:?} closed");
        }
        match (door.is_solid(), disabled) {
            (true, true) => {
                commands.entity(e).remove::<ColliderDisabled>();
            }
            (false, false) => {
                commands.entity(e).insert(ColliderDisabled);
            }
            _ => {}
        }
        if let Some(mut sprite) = sprite {
            sprite.color.set_alpha(1.0 - door.anim() * 0.8);
        }
    }
}
