//! World state: agents, landmarks and their mutable per-step state.
//!
//! The world population is fixed for the lifetime of an environment
//! instance. Agents and landmarks are (re)initialized on episode reset;
//! `action.u`/`action.c` are re-zeroed and rewritten every step by the
//! decode pipeline, while kinematic state is advanced by the external
//! physics integrator between steps.

use ndarray::{array, Array1};
use rand::Rng;

use crate::kinematics;

/// Kinematic and communication state of an agent
#[derive(Clone, Debug)]
pub struct AgentState {
    /// Joint angles in radians, one per link
    pub angles: Vec<f32>,
    /// Link lengths, same arity as `angles`
    pub lengths: Vec<f32>,
    /// Base position of the arm
    pub p_pos: Array1<f32>,
    /// Whether the gripper is actuated
    pub grasp: bool,
    /// Broadcast communication state, written by the integrator from
    /// `action.c`
    pub c: Array1<f32>,
}

/// Per-step action output of the decode pipeline
#[derive(Clone, Debug)]
pub struct AgentAction {
    /// Control vector: one channel per spatial dimension plus a trailing
    /// grasp-intensity channel
    pub u: Array1<f32>,
    /// Communication signal vector
    pub c: Array1<f32>,
}

/// A serial-arm agent
#[derive(Clone, Debug)]
pub struct Robot {
    /// Display/debug identity, unique within a world
    pub name: String,
    /// Whether the motion decode stage applies
    pub movable: bool,
    /// Whether the communication decode stage is suppressed
    pub silent: bool,
    /// Whether the physics integrator resolves contacts for this agent
    pub collide: bool,
    /// Sensitivity multiplier applied to the raw control vector; decode
    /// uses 1.0 when absent
    pub accel: Option<f32>,
    /// Presentation-only color
    pub color: [f32; 3],
    pub state: AgentState,
    pub action: AgentAction,
}

impl Robot {
    /// Create an agent with zeroed state, sized for the given world
    /// dimensions. Defaults: movable, not silent, colliding.
    pub fn new(name: impl Into<String>, num_joints: usize, dim_p: usize, dim_c: usize) -> Self {
        Self {
            name: name.into(),
            movable: true,
            silent: false,
            collide: true,
            accel: None,
            color: [0.0; 3],
            state: AgentState {
                angles: vec![0.0; num_joints],
                lengths: vec![0.0; num_joints],
                p_pos: Array1::zeros(dim_p),
                grasp: false,
                c: Array1::zeros(dim_c),
            },
            action: AgentAction {
                u: Array1::zeros(dim_p + 1),
                c: Array1::zeros(dim_c),
            },
        }
    }

    /// Cartesian position of joint `k` (joint 0 is the base)
    pub fn joint_pos(&self, k: usize) -> Array1<f32> {
        kinematics::joint_position(&self.state.p_pos, &self.state.angles, &self.state.lengths, k)
    }

    /// Cartesian position of the arm tip
    pub fn end_effector(&self) -> Array1<f32> {
        self.joint_pos(self.state.angles.len())
    }
}

/// A static or movable landmark (object or goal)
#[derive(Clone, Debug)]
pub struct Landmark {
    pub name: String,
    /// Whether the physics integrator may move this landmark
    pub movable: bool,
    /// Whether contacts are resolved against this landmark
    pub collide: bool,
    /// Presentation-only color
    pub color: [f32; 3],
    pub p_pos: Array1<f32>,
}

impl Landmark {
    pub fn new(name: impl Into<String>, dim_p: usize) -> Self {
        Self {
            name: name.into(),
            movable: false,
            collide: true,
            color: [0.0; 3],
            p_pos: Array1::zeros(dim_p),
        }
    }
}

/// The multi-agent world
#[derive(Clone, Debug)]
pub struct World {
    pub agents: Vec<Robot>,
    pub objects: Vec<Landmark>,
    pub goals: Vec<Landmark>,
    /// Joints per arm
    pub num_joints: usize,
    /// Length of each arm link
    pub arm_length: f32,
    /// Spatial dimensions
    pub dim_p: usize,
    /// Communication channel count
    pub dim_c: usize,
}

impl World {
    /// Create an empty planar world
    pub fn new(num_joints: usize, arm_length: f32) -> Self {
        Self {
            agents: Vec::new(),
            objects: Vec::new(),
            goals: Vec::new(),
            num_joints,
            arm_length,
            dim_p: 2,
            dim_c: 0,
        }
    }

    /// Base positions for `n` arms: unit-spaced along the x-axis,
    /// centered on the origin, so adjacent workspaces overlap.
    pub fn robot_positions(&self, n: usize) -> Vec<Array1<f32>> {
        (0..n)
            .map(|i| {
                let x = i as f32 - (n as f32 - 1.0) / 2.0;
                array![x, 0.0]
            })
            .collect()
    }

    /// Uniform sample from the disk every arm rooted at the origin can
    /// reach. The radius is sqrt-distributed so area density is uniform.
    pub fn random_reachable_pos<R: Rng>(&self, rng: &mut R) -> Array1<f32> {
        let reach = self.num_joints as f32 * self.arm_length;
        let theta = rng.gen_range(0.0..std::f32::consts::TAU);
        let r = reach * rng.gen::<f32>().sqrt();
        array![r * theta.cos(), r * theta.sin()]
    }
}
