//! Shared damage contract: a source hurts a target at most once per `rate` seconds while the
//! two stay in contact. Leaving contact forgets the pair, so re-entry applies immediately.
//!
//! ```text
//! CollisionStart(source, target) -> contacts.begin(target)   (timer treated as expired)
//! every tick, for each target in contact:  apply_if_due(...)
//! CollisionEnd(source, target)   -> contacts.end(target)     (timer discarded)
//! ```

use avian2d::prelude::*;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::components::{CombatantKind, Health, LifeState};
use super::messages::{DamageTaken, DealDamage};

/// Which combatant kinds a source may hurt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetFilter {
    pub affects_player: bool,
    pub affects_enemies: bool,
    pub affects_allies: bool,
}

impl TargetFilter {
    /// Hurts the player and their allies: hazards and enemy attacks.
    pub const fn player_aligned() -> Self {
        Self { affects_player: true, affects_enemies: false, affects_allies: true }
    }

    /// Hurts enemies only: player and ally attacks.
    pub const fn hostile() -> Self {
        Self { affects_player: false, affects_enemies: true, affects_allies: false }
    }

    pub const fn with_player(mut self, on: bool) -> Self {
        self.affects_player = on;
        self
    }

    pub const fn with_enemies(mut self, on: bool) -> Self {
        self.affects_enemies = on;
        self
    }

    pub const fn with_allies(mut self, on: bool) -> Self {
        self.affects_allies = on;
        self
    }

    #[inline]
    pub fn admits(&self, kind: CombatantKind) -> bool {
        match kind {
            CombatantKind::Player => self.affects_player,
            CombatantKind::Enemy => self.affects_enemies,
            CombatantKind::Ally => self.affects_allies,
        }
    }
}

#[derive(Component, Debug, Clone)]
#[require(DamageContacts)]
pub struct DamageSource {
    pub amount: u32,
    /// Minimum seconds between two applications to the same target.
    pub rate: f32,
    pub filter: TargetFilter,
    /// Never damaged by its own source.
    pub owner: Option<Entity>,
}

impl DamageSource {
    pub fn new(amount: u32, rate: f32, filter: TargetFilter) -> Self {
        Self { amount, rate: rate.max(0.0), filter, owner: None }
    }

    pub fn owned_by(mut self, owner: Entity) -> Self {
        self.owner = Some(owner);
        self
    }

    #[inline]
    pub fn admits(&self, target: Entity, kind: CombatantKind) -> bool {
        self.owner != Some(target) && self.filter.admits(kind)
    }
}

/// Targets currently touching a source, with the last time each was hurt by it.
#[derive(Component, Debug, Default, Clone)]
pub struct DamageContacts {
    last_applied: HashMap<Entity, Option<f32>>,
}

impl DamageContacts {
    /// Overlap began. Any previous timer for the pair is dropped.
    pub fn begin(&mut self, target: Entity) {
        self.last_applied.insert(target, None);
    }

    /// Overlap ended. The pair's timer is discarded, not paused.
    pub fn end(&mut self, target: Entity) {
        self.last_applied.remove(&target);
    }

    #[inline]
    pub fn in_contact(&self, target: Entity) -> bool {
        self.last_applied.contains_key(&target)
    }

    /// Targets in a stable order.
    pub fn targets(&self) -> Vec<Entity> {
        let mut v: Vec<Entity> = self.last_applied.keys().copied().collect();
        v.sort();
        v
    }

    pub fn is_empty(&self) -> bool {
        self.last_applied.is_empty()
    }

    pub fn clear(&mut self) {
        self.last_applied.clear();
    }

    pub fn is_due(&self, target: Entity, now: f32, rate: f32) -> bool {
        match self.last_applied.get(&target) {
            Some(Some(last)) => now - last >= rate,
            _ => true,
        }
    }

    fn record(&mut self, target: Entity, now: f32) {
        self.last_applied.insert(target, Some(now));
    }
}

/// Apply `source` to a target if its re-trigger interval elapsed and the filter admits it.
///
/// Dead targets take nothing. Health floors at zero; the death transition is left to the
/// lifecycle step so it happens exactly once.
pub fn apply_if_due(
    source: &DamageSource,
    contacts: &mut DamageContacts,
    target: Entity,
    kind: CombatantKind,
    health: &mut Health,
    life: &LifeState,
    now: f32,
) -> bool {
    if !life.is_alive() || !source.admits(target, kind) {
        return false;
    }
    if !contacts.is_due(target, now, source.rate) {
        return false;
    }
    health.take(source.amount);
    contacts.record(target, now);
    true
}

#[inline]
fn gameplay_owner(collider: Entity, body: Option<Entity>) -> Entity {
    body.unwrap_or(collider)
}

/// Open and close source/target contacts from avian collision messages.
pub fn track_damage_contacts(
    mut started: MessageReader<CollisionStart>,
    mut ended: MessageReader<CollisionEnd>,
    mut q_sources: Query<&mut DamageContacts>,
    q_targets: Query<(), With<Health>>,
) {
    for ev in started.read() {
        let a = gameplay_owner(ev.collider1, ev.body1);
        let b = gameplay_owner(ev.collider2, ev.body2);
        for (source, target) in [(ev.collider1, b), (ev.collider2, a)] {
            if !q_targets.contains(target) {
                continue;
            }
            if let Ok(mut contacts) = q_sources.get_mut(source) {
                contacts.begin(target);
            }
        }
    }

    for ev in ended.read() {
        let a = gameplay_owner(ev.collider1, ev.body1);
        let b = gameplay_owner(ev.collider2, ev.body2);
        for (source, target) in [(ev.collider1, b), (ev.collider2, a)] {
            if let Ok(mut contacts) = q_sources.get_mut(source) {
                contacts.end(target);
            }
        }
    }
}

/// Re-apply every source to every target it is touching, gated by rate.
///
/// Targets that no longer exist are dropped from the ledger.
pub fn resolve_contact_damage(
    time: Res<Time<Fixed>>,
    mut q_sources: Query<(Entity, &DamageSource, &mut DamageContacts)>,
    mut q_targets: Query<(&CombatantKind, &mut Health, &LifeState)>,
    mut taken: MessageWriter<DamageTaken>,
) {
    let now = time.elapsed_secs();

    for (source_e, source, mut contacts) in &mut q_sources {
        if contacts.is_empty() {
            continue;
        }
        for target in contacts.targets() {
            let Ok((kind, mut health, life)) = q_targets.get_mut(target) else {
                contacts.end(target);
                continue;
            };
            let before = health.current();
            if apply_if_due(source, &mut contacts, target, *kind, &mut health, life, now) {
                taken.write(DamageTaken {
                    target,
                    source: Some(source_e),
                    amount: before - health.current(),
                });
            }
        }
    }
}

/// Apply instant damage requests.
pub fn apply_damage_requests(
    mut requests: MessageReader<DealDamage>,
    mut q_targets: Query<(&mut Health, &LifeState)>,
    mut taken: MessageWriter<DamageTaken>,
) {
    for req in requests.read() {
        let Ok((mut health, life)) = q_targets.get_mut(req.target) else {
            debug!("Damage request for missing target {:?}", req.target);
            continue;
        };
        if !life.is_alive() {
            continue;
        }
        let dealt = health.take(req.amount);
        taken.write(DamageTaken { target: req.target, source: req.source, amount: dealt });
    }
}
