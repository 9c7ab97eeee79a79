//! Collision layers.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    /// Solid terrain: floors, walls, closed doors.
    Ground,
    OneWayPlatform,
    Water,
    Player,
    Enemy,
    Ally,
    PlayerAttack,
    EnemyAttack,
    Hazard,
    /// Pickups, checkpoints, teleporters, door zones.
    Trigger,
}

impl Layer {
    /// Everything a body stands on.
    pub const STANDABLE: [Layer; 2] = [Layer::Ground, Layer::OneWayPlatform];
}

#[inline]
pub fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}

pub fn terrain_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Ground,
        [Layer::Player, Layer::Enemy, Layer::Ally, Layer::PlayerAttack],
    )
}

pub fn one_way_platform_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::OneWayPlatform, [Layer::Player, Layer::Enemy, Layer::Ally])
}

pub fn water_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Water, [Layer::Player])
}

pub fn player_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Player,
        [
            Layer::Ground,
            Layer::OneWayPlatform,
            Layer::Water,
            Layer::EnemyAttack,
            Layer::Hazard,
            Layer::Trigger,
        ],
    )
}

pub fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Enemy,
        [Layer::Ground, Layer::OneWayPlatform, Layer::PlayerAttack],
    )
}

pub fn ally_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Ally,
        [Layer::Ground, Layer::OneWayPlatform, Layer::EnemyAttack, Layer::Hazard],
    )
}

/// Attack hitbox owned by the player or an ally.
pub fn player_attack_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerAttack, [Layer::Enemy, Layer::Ground])
}

pub fn enemy_attack_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::EnemyAttack, [Layer::Player, Layer::Ally])
}

pub fn hazard_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Hazard, [Layer::Player, Layer::Ally])
}

pub fn trigger_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Trigger, [Layer::Player])
}

/// A dead body keeps its membership but stops interacting with anything.
#[inline]
pub fn non_interacting(layer: Layer) -> CollisionLayers {
    CollisionLayers::new(layer, [] as [Layer; 0])
}
