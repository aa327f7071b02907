//! Scenario callback definitions.
//!
//! A scenario composes a world and defines how rewards and observations
//! are computed from it. The surrounding environment loop invokes
//! `reward` and `observation` once per agent per step; both are pure
//! functions of the current world state.

use ndarray::Array1;
use rand::rngs::StdRng;

use crate::world::{Robot, World};

/// Per-scenario world construction, reset and callback functions.
///
/// Resets draw from the `StdRng` passed in by the owning environment
/// rather than any process-wide source, so episodes are reproducible
/// and independent across parallel environment instances.
pub trait Scenario: Send {
    /// Build the world population. Called once per environment instance;
    /// no agents or landmarks are created or destroyed afterwards.
    fn make_world(&self, rng: &mut StdRng) -> World;

    /// (Re)initialize agent kinematic state and landmark positions at
    /// episode start.
    fn reset_world(&self, world: &mut World, rng: &mut StdRng);

    /// Scalar reward for one agent. Must not mutate world state.
    fn reward(&self, agent: &Robot, world: &World) -> f32;

    /// Observation vector for one agent. The concatenation order is part
    /// of the contract: a learned policy's input layout depends on it.
    /// Must not mutate world state.
    fn observation(&self, agent: &Robot, world: &World) -> Array1<f32>;
}
