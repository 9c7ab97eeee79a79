//! Tunable gameplay constants.
//!
//! Defaults reproduce the shipped game feel. A RON file may override any subset of fields:
//!
//! ```ron
//! (
//!     player: (move_speed: 6.0),
//!     fall: (min_height: 4.0, max_height: 12.0, max_damage: 80),
//! )
//! ```

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::TunablesError;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    pub gravity: f32,
    pub player: PlayerTunables,
    pub fall: FallDamage,
    pub regen: Regen,
    pub drowning: Drowning,
    pub tilt: Tilt,
    pub enemy: AiTunables,
    pub ally: AiTunables,
    pub weapons: WeaponTunables,
    pub environment: EnvironmentTunables,
    /// Half extents of the playable area; anything thrown beyond it is removed.
    pub world_half_extents: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTunables {
    pub move_speed: f32,
    pub jump_velocity: f32,
    pub size: Vec2,
    pub max_health: u32,
    pub ground_probe_distance: f32,
    /// Probe start below the collider bottom.
    pub ground_probe_skin: f32,
    /// Horizontal probe offsets as a fraction of body width.
    pub ground_probe_spread: f32,
    /// Ceiling overlap box as a fraction of the body size.
    pub ceiling_box_scale: f32,
    pub drop_through_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallDamage {
    pub min_height: f32,
    pub max_height: f32,
    pub max_damage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Regen {
    pub enabled: bool,
    pub delay_secs: f32,
    /// Health per second.
    pub rate: f32,
    pub interval_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Drowning {
    pub grace_secs: f32,
    pub interval_secs: f32,
    pub damage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tilt {
    pub degrees_per_input: f32,
    pub max_degrees: f32,
    pub ease_in_water: f32,
    pub ease_out_of_water: f32,
}

/// Behaviour parameters shared by enemy and ally brains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTunables {
    pub max_health: u32,
    pub size: Vec2,
    pub move_speed: f32,
    pub search_radius: f32,
    pub attack_range: f32,
    pub follow_distance: f32,
    /// Beyond this distance from the anchor an engaged brain disengages. `None` never leashes.
    pub leash_distance: Option<f32>,
    pub attack_cooldown_secs: f32,
    pub attack_damage: u32,
    pub attack_secs: f32,
    pub attack_size: Vec2,
    /// Hitbox centre as a fraction of attack range in front of the attacker.
    pub attack_reach: f32,
    pub attack_rate_secs: f32,
    /// `None` means the entity is removed on death instead of respawning.
    pub respawn_secs: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTunables {
    pub interaction_range: f32,
    pub melee: MeleeTunables,
    pub charge: ChargeTunables,
    pub thrown: ThrownTunables,
    pub elemental: ElementalTunables,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeTunables {
    pub reach: f32,
    pub size: Vec2,
    pub duration_secs: f32,
    pub damage: u32,
    pub rate_secs: f32,
    pub cooldown_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeTunables {
    /// Upper bounds (exclusive) of charge time per tier, paired with unit counts.
    pub tiers: Vec<(f32, u32)>,
    pub max_units: u32,
    pub spacing: f32,
    pub stagger_secs: f32,
    pub unit_lifetime_secs: f32,
    pub unit_size: Vec2,
    pub rise_depth: f32,
    pub arc_height: f32,
    pub damage: u32,
    pub rate_secs: f32,
    pub cooldown_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrownTunables {
    pub speed: f32,
    pub radius: f32,
    pub lifetime_secs: f32,
    pub damage: u32,
    pub cooldown_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementalTunables {
    pub range: f32,
    pub damage: u32,
    pub cooldown_secs: f32,
    pub flash_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentTunables {
    pub hazard_damage: u32,
    pub hazard_rate_secs: f32,
    pub door_open_secs: f32,
    pub door_close_delay_secs: f32,
    pub platform_fall_delay_secs: f32,
    pub platform_respawn_secs: f32,
    pub platform_linger_secs: f32,
    pub platform_max_fall_secs: f32,
    pub teleport_guard_secs: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 32.0,
            gravity: 9.81 * 2.0,
            player: PlayerTunables::default(),
            fall: FallDamage::default(),
            regen: Regen::default(),
            drowning: Drowning::default(),
            tilt: Tilt::default(),
            enemy: AiTunables::enemy(),
            ally: AiTunables::ally(),
            weapons: WeaponTunables::default(),
            environment: EnvironmentTunables::default(),
            world_half_extents: Vec2::new(60.0, 30.0),
        }
    }
}

impl Default for PlayerTunables {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_velocity: 10.0,
            size: Vec2::new(0.8, 1.6),
            max_health: 100,
            ground_probe_distance: 0.1,
            ground_probe_skin: 0.05,
            ground_probe_spread: 0.4,
            ceiling_box_scale: 0.9,
            drop_through_secs: 0.5,
        }
    }
}

impl Default for FallDamage {
    fn default() -> Self {
        Self { min_height: 5.0, max_height: 15.0, max_damage: 80 }
    }
}

impl Default for Regen {
    fn default() -> Self {
        Self { enabled: true, delay_secs: 5.0, rate: 2.0, interval_secs: 1.0 }
    }
}

impl Default for Drowning {
    fn default() -> Self {
        Self { grace_secs: 10.0, interval_secs: 2.0, damage: 5 }
    }
}

impl Default for Tilt {
    fn default() -> Self {
        Self { degrees_per_input: 15.0, max_degrees: 25.0, ease_in_water: 3.0, ease_out_of_water: 5.0 }
    }
}

impl AiTunables {
    pub fn enemy() -> Self {
        Self {
            max_health: 50,
            size: Vec2::new(0.9, 1.2),
            move_speed: 2.0,
            search_radius: 5.0,
            attack_range: 2.0,
            follow_distance: 0.0,
            leash_distance: None,
            attack_cooldown_secs: 2.0,
            attack_damage: 15,
            attack_secs: 0.3,
            attack_size: Vec2::ONE,
            attack_reach: 0.7,
            attack_rate_secs: 0.1,
            respawn_secs: Some(3.0),
        }
    }

    pub fn ally() -> Self {
        Self {
            max_health: 50,
            size: Vec2::new(0.8, 1.0),
            move_speed: 4.0,
            search_radius: 5.0 * 1.5,
            attack_range: 5.0,
            follow_distance: 12.0,
            leash_distance: Some(24.0),
            attack_cooldown_secs: 1.5,
            attack_damage: 15,
            attack_secs: 0.3,
            attack_size: Vec2::splat(1.5),
            attack_reach: 0.3,
            attack_rate_secs: 0.1,
            respawn_secs: None,
        }
    }
}

impl Default for AiTunables {
    fn default() -> Self {
        Self::enemy()
    }
}

impl Default for WeaponTunables {
    fn default() -> Self {
        Self {
            interaction_range: 2.0,
            melee: MeleeTunables::default(),
            charge: ChargeTunables::default(),
            thrown: ThrownTunables::default(),
            elemental: ElementalTunables::default(),
        }
    }
}

impl Default for MeleeTunables {
    fn default() -> Self {
        Self {
            reach: 0.8,
            size: Vec2::new(1.2, 2.0),
            duration_secs: 0.25,
            damage: 25,
            rate_secs: 0.1,
            cooldown_secs: 0.4,
        }
    }
}

impl Default for ChargeTunables {
    fn default() -> Self {
        Self {
            tiers: vec![(0.5, 1), (0.8, 2), (1.2, 3)],
            max_units: 5,
            spacing: 1.2,
            stagger_secs: 0.1,
            unit_lifetime_secs: 0.5,
            unit_size: Vec2::new(0.6, 1.2),
            rise_depth: 1.0,
            arc_height: 0.6,
            damage: 15,
            rate_secs: 0.1,
            cooldown_secs: 1.0,
        }
    }
}

impl Default for ThrownTunables {
    fn default() -> Self {
        Self { speed: 12.0, radius: 0.2, lifetime_secs: 3.0, damage: 20, cooldown_secs: 0.8 }
    }
}

impl Default for ElementalTunables {
    fn default() -> Self {
        Self { range: 8.0, damage: 30, cooldown_secs: 1.5, flash_secs: 0.2 }
    }
}

impl Default for EnvironmentTunables {
    fn default() -> Self {
        Self {
            hazard_damage: 20,
            hazard_rate_secs: 1.0,
            door_open_secs: 1.0,
            door_close_delay_secs: 2.0,
            platform_fall_delay_secs: 0.5,
            platform_respawn_secs: 5.0,
            platform_linger_secs: 5.0,
            platform_max_fall_secs: 10.0,
            teleport_guard_secs: 1.0,
        }
    }
}

impl Tunables {
    pub fn from_ron_str(source: &str) -> Result<Self, TunablesError> {
        let tunables: Self = ron::from_str(source)?;
        tunables.validate()?;
        Ok(tunables)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TunablesError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| TunablesError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Load from `path`, falling back to defaults when the file is missing or broken.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(t) => {
                info!("Loaded tunables from {}", path.display());
                t
            }
            Err(e) => {
                warn!("{e}. Using default tunables.");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), TunablesError> {
        let positive = [
            ("pixels_per_meter", self.pixels_per_meter),
            ("player.move_speed", self.player.move_speed),
            ("player.jump_velocity", self.player.jump_velocity),
            ("player.ground_probe_distance", self.player.ground_probe_distance),
            ("regen.interval_secs", self.regen.interval_secs),
            ("drowning.interval_secs", self.drowning.interval_secs),
            ("weapons.charge.spacing", self.weapons.charge.spacing),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TunablesError::Invalid {
                    name,
                    reason: format!("expected a positive number, got {value}"),
                });
            }
        }

        if self.fall.min_height >= self.fall.max_height {
            return Err(TunablesError::Invalid {
                name: "fall",
                reason: format!(
                    "min_height ({}) must be below max_height ({})",
                    self.fall.min_height, self.fall.max_height
                ),
            });
        }

        let tiers = &self.weapons.charge.tiers;
        if tiers.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(TunablesError::Invalid {
                name: "weapons.charge.tiers",
                reason: "tier thresholds must be strictly increasing".into(),
            });
        }

        Ok(())
    }
}
