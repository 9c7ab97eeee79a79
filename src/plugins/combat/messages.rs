use bevy::prelude::*;

use super::components::CombatantKind;

/// Instant damage not tied to a contact (fall, drowning, targeted abilities).
#[derive(Message, Debug, Clone, Copy)]
pub struct DealDamage {
    pub target: Entity,
    pub amount: u32,
    pub source: Option<Entity>,
}

/// Damage that actually landed.
#[derive(Message, Debug, Clone, Copy)]
pub struct DamageTaken {
    pub target: Entity,
    pub source: Option<Entity>,
    pub amount: u32,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct Died {
    pub entity: Entity,
    pub kind: CombatantKind,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct Respawned {
    pub entity: Entity,
    pub kind: CombatantKind,
}
