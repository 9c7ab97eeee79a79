//! Global state machine.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
}

/// Fixed-step simulation phases, run in this order after physics each tick.
///
/// ```text
/// FixedUpdate:      player movement -> water forces
/// (physics step, collision messages)
/// FixedPostUpdate:  Probe -> Environment -> Ai -> Attacks -> Damage -> Lifecycle -> Derive
/// ```
///
/// Probes always see positions settled by this tick's integration. Movement in the next
/// `FixedUpdate` reads what the probes wrote.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Probe,
    Environment,
    Ai,
    Attacks,
    Damage,
    Lifecycle,
    Derive,
}
