//! # armlib
//!
//! A multi-agent environment layer for serial-arm manipulation research.
//!
//! ## Overview
//!
//! armlib provides:
//! - Action-space descriptors (`Discrete`, `MultiDiscrete`, `Box`) with
//!   per-variant segmentation of flat action vectors
//! - A configurable two-stage action decode pipeline producing per-agent
//!   motion and communication commands
//! - Planar serial-chain forward kinematics for joint and end-effector
//!   positions
//! - A `Scenario` trait for composing rewards and observations from
//!   world state, with seeded, instance-local episode resets
//!
//! Physics integration (advancing joint angles from control vectors) and
//! the outer step/reset loop are supplied by the caller. Rendering is an
//! external collaborator; see the [`render`] module for the contract.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use armlib::prelude::*;
//! use armlib_scenarios::ReachAndPlace;
//!
//! let scenario = Box::new(ReachAndPlace::default());
//! let mut env = RobotEnv::new(scenario, DecodeMode::OneHotInput, Some(42));
//!
//! let action = ndarray::ArrayD::from_shape_vec(
//!     ndarray::IxDyn(&[6]),
//!     vec![0.0, 0.0, 0.0, 1.0, 0.0, 1.0],
//! )
//! .unwrap();
//! env.set_action(0, &action)?;
//! let reward = env.reward(0);
//! let obs = env.observation(0);
//! ```

pub mod action;
pub mod env;
pub mod kinematics;
pub mod render;
pub mod scenario;
pub mod spaces;
pub mod world;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{ActionDecoder, DecodeMode};
    pub use crate::env::RobotEnv;
    pub use crate::scenario::Scenario;
    pub use crate::spaces::*;
    pub use crate::world::{Landmark, Robot, World};
    pub use crate::{ArmError, Result};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library.
///
/// Decode errors indicate a configuration or integration defect rather
/// than a transient runtime condition; callers must discard the failing
/// agent's action state for the step and must not retry the same input.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ArmError {
    /// The descriptor's expected flat length differs from the supplied
    /// action vector's length. Raised before any control vector is
    /// computed.
    #[error("action length mismatch for {agent}: descriptor expects {expected} elements, got {actual}")]
    ActionLengthMismatch {
        agent: String,
        expected: usize,
        actual: usize,
    },

    /// Segments were left over after the motion and communication stages
    /// ran. Signals a mismatch between the declared action-space
    /// descriptor and the agent's capability flags.
    #[error("unconsumed action data for {agent}: {leftover} segment(s) left after decode")]
    UnconsumedActionData { agent: String, leftover: usize },

    /// An action segment was missing, too short for its decode layout,
    /// or carried an out-of-range communication index.
    #[error("invalid action for {agent}: {reason}")]
    InvalidAction { agent: String, reason: String },
}

pub type Result<T> = core::result::Result<T, ArmError>;
