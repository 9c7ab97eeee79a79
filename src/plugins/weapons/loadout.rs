//! Two-slot weapon loadout with per-archetype, per-action cooldowns.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use thiserror::Error;

pub const SLOT_COUNT: usize = 2;

/// The three shard archetypes a slot can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Melee,
    Thrown,
    Elemental,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [Self::Melee, Self::Thrown, Self::Elemental];

    pub fn name(self) -> &'static str {
        match self {
            Self::Melee => "melee",
            Self::Thrown => "thrown",
            Self::Elemental => "elemental",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Left (primary) and right (secondary) actions cool down independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionSide {
    Primary,
    Secondary,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadoutError {
    #[error("all weapon slots are occupied")]
    SlotsFull,
    #[error("{0:?} is already equipped")]
    AlreadyEquipped(WeaponKind),
    #[error("slot {0} does not exist")]
    NoSuchSlot(usize),
    #[error("slot {0} is empty")]
    EmptySlot(usize),
    #[error("no weapon in the active slot")]
    NothingActive,
    #[error("{kind:?} {side:?} is cooling down for {remaining:.2}s")]
    OnCooldown {
        kind: WeaponKind,
        side: ActionSide,
        remaining: f32,
    },
}

#[derive(Component, Debug, Clone, Default)]
pub struct WeaponLoadout {
    slots: [Option<WeaponKind>; SLOT_COUNT],
    active: usize,
    ready_at: HashMap<(WeaponKind, ActionSide), f32>,
}

impl WeaponLoadout {
    #[inline]
    pub fn slots(&self) -> &[Option<WeaponKind>; SLOT_COUNT] {
        &self.slots
    }

    #[inline]
    pub fn active_slot(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn active(&self) -> Option<WeaponKind> {
        self.slots[self.active]
    }

    pub fn holds(&self, kind: WeaponKind) -> bool {
        self.slots.contains(&Some(kind))
    }

    /// Put `kind` into the first empty slot.
    pub fn equip(&mut self, kind: WeaponKind) -> Result<usize, LoadoutError> {
        if self.holds(kind) {
            return Err(LoadoutError::AlreadyEquipped(kind));
        }
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(LoadoutError::SlotsFull)?;
        self.slots[slot] = Some(kind);
        Ok(slot)
    }

    /// Make `slot` active. Empty or missing slots leave the loadout unchanged.
    pub fn switch_to(&mut self, slot: usize) -> Result<(), LoadoutError> {
        match self.slots.get(slot) {
            None => Err(LoadoutError::NoSuchSlot(slot)),
            Some(None) => Err(LoadoutError::EmptySlot(slot)),
            Some(Some(_)) => {
                self.active = slot;
                Ok(())
            }
        }
    }

    pub fn cooldown_remaining(&self, kind: WeaponKind, side: ActionSide, now: f32) -> f32 {
        self.ready_at
            .get(&(kind, side))
            .map_or(0.0, |ready| (ready - now).max(0.0))
    }

    /// Check the active weapon's action without consuming it.
    pub fn ready(&self, side: ActionSide, now: f32) -> Result<WeaponKind, LoadoutError> {
        let kind = self.active().ok_or(LoadoutError::NothingActive)?;
        let remaining = self.cooldown_remaining(kind, side, now);
        if remaining > 0.0 {
            return Err(LoadoutError::OnCooldown { kind, side, remaining });
        }
        Ok(kind)
    }

    /// Use the active weapon's action, starting its cooldown. No queuing: a use during
    /// cooldown is rejected.
    pub fn try_use(&mut self, side: ActionSide, now: f32, cooldown: f32) -> Result<WeaponKind, LoadoutError> {
        let kind = self.ready(side, now)?;
        self.ready_at.insert((kind, side), now + cooldown);
        Ok(kind)
    }

    pub fn inventory(&self) -> Vec<String> {
        self.slots
            .iter()
            .flatten()
            .map(|k| k.name().to_string())
            .collect()
    }

    /// Replace slot contents from saved entries. Unknown entries are skipped.
    pub fn restore_inventory(&mut self, entries: &[String]) {
        self.slots = [None; SLOT_COUNT];
        self.active = 0;
        for entry in entries {
            let Some(kind) = WeaponKind::from_name(entry) else {
                debug!("Skipping unknown inventory entry '{entry}'");
                continue;
            };
            if let Err(e) = self.equip(kind) {
                debug!("Inventory entry '{entry}' not restored: {e}");
            }
        }
    }
}
