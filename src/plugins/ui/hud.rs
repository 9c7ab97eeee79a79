//! Derived HUD state.
//!
//! `HudState` is a read-only projection of the player, rebuilt at the end of every fixed tick
//! (`SimulationSet::Derive`). Widgets read it; nothing in the simulation reads it back.

use bevy::prelude::*;

use crate::common::state::SimulationSet;
use crate::plugins::combat::{Facing, Health, LifeState};
use crate::plugins::core::GamePaused;
use crate::plugins::player::Player;
use crate::plugins::weapons::loadout::SLOT_COUNT;
use crate::plugins::weapons::{ActionSide, WeaponKind, WeaponLoadout};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HealthBand {
    #[default]
    Healthy,
    Wounded,
    Critical,
}

impl HealthBand {
    pub fn from_fraction(fraction: f32) -> Self {
        if fraction > 0.6 {
            Self::Healthy
        } else if fraction > 0.3 {
            Self::Wounded
        } else {
            Self::Critical
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Healthy => Color::srgb(0.2, 0.8, 0.3),
            Self::Wounded => Color::srgb(0.9, 0.75, 0.2),
            Self::Critical => Color::srgb(0.85, 0.2, 0.2),
        }
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct HudState {
    pub health: u32,
    pub max_health: u32,
    pub health_fraction: f32,
    pub band: HealthBand,
    pub alive: bool,
    pub position: Vec2,
    pub facing: Facing,
    pub active_slot: usize,
    pub slots: [Option<WeaponKind>; SLOT_COUNT],
    /// Seconds until the active weapon's primary action is ready again.
    pub cooldown_remaining: f32,
    pub paused: bool,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<HudState>().add_systems(
        FixedPostUpdate,
        update_hud.in_set(SimulationSet::Derive),
    );
}

type PlayerView = (
    &'static Health,
    &'static LifeState,
    &'static Transform,
    &'static Facing,
    &'static WeaponLoadout,
);

pub fn update_hud(
    time: Res<Time<Fixed>>,
    paused: Option<Res<GamePaused>>,
    q_player: Query<PlayerView, With<Player>>,
    mut hud: ResMut<HudState>,
) {
    hud.paused = paused.is_some_and(|p| p.0);

    let Ok((health, life, tf, facing, loadout)) = q_player.single() else {
        return;
    };
    let now = time.elapsed_secs();
    let fraction = health.fraction();

    hud.health = health.current();
    hud.max_health = health.max();
    hud.health_fraction = fraction;
    hud.band = HealthBand::from_fraction(fraction);
    hud.alive = life.is_alive();
    hud.position = tf.translation.truncate();
    hud.facing = *facing;
    hud.active_slot = loadout.active_slot();
    hud.slots = *loadout.slots();
    hud.cooldown_remaining = loadout
        .active()
        .map_or(0.0, |kind| loadout.cooldown_remaining(kind, ActionSide::Primary, now));
}
