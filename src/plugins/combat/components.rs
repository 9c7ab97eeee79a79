use bevy::prelude::*;

/// Closed set of things that fight.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatantKind {
    Player,
    Enemy,
    Ally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    PlayerAligned,
    Hostile,
}

impl CombatantKind {
    #[inline]
    pub fn faction(self) -> Faction {
        match self {
            Self::Player | Self::Ally => Faction::PlayerAligned,
            Self::Enemy => Faction::Hostile,
        }
    }
}

impl Faction {
    #[inline]
    pub fn opposes(self, other: Faction) -> bool {
        self != other
    }
}

/// Hit points. `current <= max` always holds; both only change through the methods below.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }

    /// Remove up to `amount`, flooring at zero. Returns what was actually removed.
    pub fn take(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.current);
        self.current -= dealt;
        dealt
    }

    /// Add up to `amount`, capping at max. Returns what was actually added.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max - self.current);
        self.current += healed;
        healed
    }

    pub fn restore_full(&mut self) {
        self.current = self.max;
    }

    pub fn set(&mut self, value: u32) {
        self.current = value.min(self.max);
    }
}

#[derive(Component, Debug, Clone)]
pub enum LifeState {
    Alive,
    Dead {
        /// Counts down to revival. `None` means revival is handled by the owner's policy.
        respawn: Option<Timer>,
    },
}

impl Default for LifeState {
    fn default() -> Self {
        Self::Alive
    }
}

impl LifeState {
    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive)
    }

    /// Alive -> Dead. Returns false and leaves everything untouched when already dead.
    pub fn kill(&mut self, respawn_after: Option<f32>) -> bool {
        if !self.is_alive() {
            return false;
        }
        *self = Self::Dead {
            respawn: respawn_after.map(|s| Timer::from_seconds(s, TimerMode::Once)),
        };
        true
    }

    /// Advance a pending respawn. Returns true on the tick the timer finishes.
    pub fn tick_respawn(&mut self, delta: std::time::Duration) -> bool {
        let Self::Dead { respawn: Some(timer) } = self else {
            return false;
        };
        timer.tick(delta);
        timer.is_finished()
    }

    pub fn revive(&mut self) {
        *self = Self::Alive;
    }
}

/// Timed revival after death. Entities without it are either revived at once (player)
/// or removed (allies).
#[derive(Component, Debug, Clone, Copy)]
pub struct RespawnDelay(pub f32);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Facing toward a signed horizontal direction; zero keeps `self`.
    pub fn toward(self, dx: f32) -> Self {
        if dx < 0.0 {
            Self::Left
        } else if dx > 0.0 {
            Self::Right
        } else {
            self
        }
    }
}

/// Where an entity reappears after death.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint(pub Vec2);

/// Marker: entity should be removed from the world.
///
/// Combatants are marked and removed in `PostUpdate`, after every fixed-step reader of the
/// death has run. Short-lived attack volumes are despawned directly by their own systems.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;
