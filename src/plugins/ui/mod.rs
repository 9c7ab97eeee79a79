//! UI-facing state. Rendering widgets is left to whoever consumes these resources.

use bevy::prelude::*;

pub mod hud;

pub use hud::{HealthBand, HudState};

pub fn plugin(app: &mut App) {
    hud::plugin(app);
}
