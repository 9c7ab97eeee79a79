//! Water overlay: reference-counted volume overlap, buoyancy/drag/current, drowning and the
//! cosmetic swim tilt.
//!
//! Volumes can overlap. A swimmer keeps a list of the volumes it is inside; the most recently
//! entered one supplies the active [`WaterProperties`]. Only the exit that empties the list
//! restores baseline gravity.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::state::{GameState, SimulationSet};
use crate::common::tunables::{Drowning, Tilt as TiltTunables, Tunables};
use crate::plugins::combat::{DealDamage, LifeState};
use crate::plugins::player::fall::FallTracker;
use crate::plugins::player::input::PlayerInput;
use crate::plugins::player::{Player, movement};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterProperties {
    pub gravity_multiplier: f32,
    pub speed_multiplier: f32,
    pub jump_multiplier: f32,
    pub buoyancy: f32,
    pub drag: f32,
    pub current: Vec2,
    pub breathable: bool,
}

impl Default for WaterProperties {
    fn default() -> Self {
        Self {
            gravity_multiplier: 0.1,
            speed_multiplier: 0.6,
            jump_multiplier: 0.8,
            buoyancy: 8.0,
            drag: 2.0,
            current: Vec2::ZERO,
            breathable: true,
        }
    }
}

/// A sensor region that applies its properties to swimmers inside it.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct WaterVolume(pub WaterProperties);

/// Per-swimmer water overlay.
#[derive(Component, Debug, Clone)]
pub struct WaterState {
    inside: Vec<(Entity, WaterProperties)>,
    time_in_water: f32,
    drown_accum: f32,
    baseline_gravity: f32,
}

impl Default for WaterState {
    fn default() -> Self {
        Self::with_baseline_gravity(1.0)
    }
}

impl WaterState {
    pub fn with_baseline_gravity(gravity_scale: f32) -> Self {
        Self { inside: Vec::new(), time_in_water: 0.0, drown_accum: 0.0, baseline_gravity: gravity_scale }
    }

    #[inline]
    pub fn in_water(&self) -> bool {
        !self.inside.is_empty()
    }

    #[inline]
    pub fn overlap_count(&self) -> usize {
        self.inside.len()
    }

    /// Properties of the most recently entered volume still overlapped.
    #[inline]
    pub fn properties(&self) -> Option<&WaterProperties> {
        self.inside.last().map(|(_, p)| p)
    }

    #[inline]
    pub fn time_in_water(&self) -> f32 {
        self.time_in_water
    }

    /// Gravity scale the body should have right now.
    pub fn gravity_scale(&self) -> f32 {
        self.properties()
            .map_or(self.baseline_gravity, |p| self.baseline_gravity * p.gravity_multiplier)
    }

    /// Entered `volume`. Returns true on the first entry (count 0 -> 1).
    pub fn enter(&mut self, volume: Entity, properties: WaterProperties) -> bool {
        let first = self.inside.is_empty();
        self.inside.push((volume, properties));
        if first {
            self.time_in_water = 0.0;
            self.drown_accum = 0.0;
        }
        first
    }

    /// Left `volume`. Returns true when this exit left no volumes overlapped.
    ///
    /// Exits from volumes never entered are ignored.
    pub fn exit(&mut self, volume: Entity) -> bool {
        let Some(i) = self.inside.iter().rposition(|(v, _)| *v == volume) else {
            return false;
        };
        self.inside.remove(i);
        if self.inside.is_empty() {
            self.time_in_water = 0.0;
            self.drown_accum = 0.0;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.inside.clear();
        self.time_in_water = 0.0;
        self.drown_accum = 0.0;
    }

    /// Advance time in water. Returns drowning damage due this tick.
    pub fn advance(&mut self, dt: f32, drowning: &Drowning) -> u32 {
        let Some(props) = self.properties().copied() else {
            return 0;
        };
        self.time_in_water += dt;
        if props.breathable || self.time_in_water <= drowning.grace_secs {
            return 0;
        }

        self.drown_accum += dt;
        if self.drown_accum >= drowning.interval_secs {
            self.drown_accum -= drowning.interval_secs;
            return drowning.damage;
        }
        0
    }
}

/// Cosmetic body roll while swimming, in degrees. Feeds the next tick's easing.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Tilt {
    pub degrees: f32,
}

impl Tilt {
    pub fn step(&mut self, axis: f32, in_water: bool, dt: f32, cfg: &TiltTunables) {
        let (target, ease) = if in_water {
            let target = if axis.abs() > 0.1 {
                (axis * cfg.degrees_per_input).clamp(-cfg.max_degrees, cfg.max_degrees)
            } else {
                0.0
            };
            (target, cfg.ease_in_water)
        } else {
            (0.0, cfg.ease_out_of_water)
        };
        let t = (dt * ease).clamp(0.0, 1.0);
        self.degrees += (target - self.degrees) * t;
    }
}

/// Child sprite that carries the tilt, so the locked-rotation body never rotates.
#[derive(Component, Debug, Clone, Copy)]
pub struct TiltVisual;

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        apply_water_forces
            .after(movement::apply_movement)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        (track_water_contacts, drowning, update_tilt)
            .chain()
            .in_set(SimulationSet::Environment),
    );

    app.add_systems(Update, apply_tilt_visual.run_if(in_state(GameState::InGame)));
}

/// Count volume entries and exits from avian collision messages.
pub fn track_water_contacts(
    mut started: MessageReader<CollisionStart>,
    mut ended: MessageReader<CollisionEnd>,
    q_volumes: Query<&WaterVolume>,
    mut q_swimmers: Query<(&mut WaterState, &mut GravityScale, Option<&mut FallTracker>)>,
) {
    for ev in started.read() {
        let pairs = [(ev.collider1, ev.collider2), (ev.collider2, ev.collider1)];
        for (volume_e, swimmer_e) in pairs {
            let Ok(volume) = q_volumes.get(volume_e) else { continue };
            let Ok((mut water, mut gravity, fall)) = q_swimmers.get_mut(swimmer_e) else { continue };
            if water.enter(volume_e, volume.0) {
                debug!("{swimmer_e:?} entered water");
                if let Some(mut fall) = fall {
                    fall.reset();
                }
            }
            gravity.0 = water.gravity_scale();
        }
    }

    for ev in ended.read() {
        let pairs = [(ev.collider1, ev.collider2), (ev.collider2, ev.collider1)];
        for (volume_e, swimmer_e) in pairs {
            if !q_volumes.contains(volume_e) {
                continue;
            }
            let Ok((mut water, mut gravity, fall)) = q_swimmers.get_mut(swimmer_e) else { continue };
            if water.exit(volume_e) {
                debug!("{swimmer_e:?} left water");
                if let Some(mut fall) = fall {
                    fall.reset();
                }
            }
            gravity.0 = water.gravity_scale();
        }
    }
}

/// Buoyancy while sinking fast, drag against motion, and vertical current.
///
/// Forces act on a unit mass and are integrated straight into velocity.
pub fn apply_water_forces(time: Res<Time<Fixed>>, mut q: Query<(&WaterState, &mut LinearVelocity)>) {
    let dt = time.delta_secs();
    for (water, mut vel) in &mut q {
        let Some(props) = water.properties() else { continue };
        vel.0 = water_velocity(vel.0, props, dt);
    }
}

pub fn water_velocity(v: Vec2, props: &WaterProperties, dt: f32) -> Vec2 {
    let mut accel = -v * props.drag * 0.3;
    if v.y < -3.0 {
        accel.y += props.buoyancy * 0.3;
    }
    accel.y += props.current.y;
    v + accel * dt
}

pub fn drowning(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut q: Query<(Entity, &mut WaterState, &LifeState)>,
    mut damage: MessageWriter<DealDamage>,
) {
    let dt = time.delta_secs();
    for (e, mut water, life) in &mut q {
        if !life.is_alive() {
            continue;
        }
        let amount = water.advance(dt, &tunables.drowning);
        if amount > 0 {
            damage.write(DealDamage { target: e, amount, source: None });
        }
    }
}

pub fn update_tilt(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q: Query<(&WaterState, &mut Tilt), With<Player>>,
) {
    let Ok((water, mut tilt)) = q.single_mut() else {
        return;
    };
    tilt.step(input.horizontal_axis(), water.in_water(), time.delta_secs(), &tunables.tilt);
}

fn apply_tilt_visual(
    q_bodies: Query<(&Tilt, &Children)>,
    mut q_visuals: Query<&mut Transform, With<TiltVisual>>,
) {
    for (tilt, children) in &q_bodies {
        for child in children.iter() {
            if let Ok(mut tf) = q_visuals.get_mut(child) {
                tf.rotation = Quat::from_rotation_z(-tilt.degrees.to_radians());
            }
        }
    }
}
