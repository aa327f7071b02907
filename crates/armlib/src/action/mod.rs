//! Action decode pipeline.
//!
//! Converts a flat per-agent action vector into a motion control vector
//! and a communication signal, in two stages:
//! - the motion stage runs only for movable agents and consumes the
//!   first segment
//! - the communication stage runs only for non-silent agents and
//!   consumes the next segment
//!
//! Segmentation follows the agent's action-space descriptor (see
//! [`crate::spaces::DynSpace::segment`]). After both stages the segment
//! queue must be empty; anything else is a configuration error between
//! the descriptor and the agent's capability flags.

use ndarray::{Array1, ArrayView1};

use crate::spaces::DynSpace;
use crate::world::{Robot, World};
use crate::{ArmError, Result};

/// How a motion segment is interpreted.
///
/// Historically this was three independently settable environment flags
/// with an implicit precedence. The mode is resolved once at
/// configuration time via [`DecodeMode::from_flags`] instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeMode {
    /// Segment is a 6-slot layout `[noop, x+, x-, y+, y-, grasp]` of
    /// 0/1 indicators; grasp is decoded as a boolean flag.
    OneHotInput,
    /// Segment is forced to a one-hot vector (argmax, ties to the lowest
    /// index) before the axis-difference rule is applied.
    ForcedDiscrete,
    /// Axis-difference rule: `u[0] = seg[1] - seg[2]`,
    /// `u[1] = seg[3] - seg[4]`, and the trailing control channel takes
    /// `seg[5]` as a continuous grasp intensity.
    DiscreteAxes,
    /// Segment is the control vector, taken verbatim.
    Continuous,
}

impl DecodeMode {
    /// Resolve the three legacy flags into a single mode.
    ///
    /// Precedence: `discrete_action_input` wins over
    /// `force_discrete_action`, which wins over
    /// `discrete_action_space`; with all three unset the mode is
    /// continuous.
    pub fn from_flags(
        discrete_action_input: bool,
        force_discrete_action: bool,
        discrete_action_space: bool,
    ) -> Self {
        if discrete_action_input {
            DecodeMode::OneHotInput
        } else if force_discrete_action {
            DecodeMode::ForcedDiscrete
        } else if discrete_action_space {
            DecodeMode::DiscreteAxes
        } else {
            DecodeMode::Continuous
        }
    }
}

/// Replace `v` with a one-hot vector at its argmax.
///
/// Ties break toward the lowest index. Applying the transform twice
/// gives the same result as applying it once.
pub fn force_one_hot(v: &mut Array1<f32>) {
    if v.is_empty() {
        return;
    }
    let mut best = 0;
    let mut best_val = v[0];
    for (i, &x) in v.iter().enumerate().skip(1) {
        if x > best_val {
            best = i;
            best_val = x;
        }
    }
    v.fill(0.0);
    v[best] = 1.0;
}

/// The two decode stages, in the order they drain segments
#[derive(Clone, Copy, Debug)]
enum Stage {
    Motion,
    Communication,
}

impl Stage {
    /// Whether the stage runs for this agent
    fn applies(&self, agent: &Robot) -> bool {
        match self {
            Stage::Motion => agent.movable,
            Stage::Communication => !agent.silent,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Stage::Motion => "motion",
            Stage::Communication => "communication",
        }
    }
}

/// Decodes flat action vectors into per-agent motion and communication
/// commands.
///
/// One decoder is shared by all agents of an environment; the mode is
/// environment-wide. Decoding mutates only the target agent's
/// `action.u`/`action.c` (and its grasp flag under
/// [`DecodeMode::OneHotInput`]), so a failed decode never leaves state
/// behind for any other agent.
#[derive(Clone, Copy, Debug)]
pub struct ActionDecoder {
    mode: DecodeMode,
}

impl ActionDecoder {
    pub fn new(mode: DecodeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Decode one agent's action for the current step.
    ///
    /// Zeroes `action.u`/`action.c`, segments the flat vector per the
    /// descriptor, runs the applicable stages in order and checks that
    /// every segment was consumed. On error the caller must treat the
    /// agent's action state as invalid for this step; retrying the same
    /// input cannot succeed.
    pub fn decode(
        &self,
        world: &mut World,
        agent_index: usize,
        space: &DynSpace,
        action: ArrayView1<f32>,
    ) -> Result<()> {
        let dim_p = world.dim_p;
        let dim_c = world.dim_c;
        let agent = &mut world.agents[agent_index];

        let expected = space.flat_len();
        if expected != action.len() {
            tracing::warn!(
                agent = %agent.name,
                expected,
                actual = action.len(),
                "action length mismatch"
            );
            return Err(ArmError::ActionLengthMismatch {
                agent: agent.name.clone(),
                expected,
                actual: action.len(),
            });
        }

        agent.action.u = Array1::zeros(dim_p + 1);
        agent.action.c = Array1::zeros(dim_c);

        let mut segments = space.segment(action);
        // pop() takes from the back; reverse so the queue drains in order
        segments.reverse();

        for stage in [Stage::Motion, Stage::Communication] {
            if !stage.applies(agent) {
                continue;
            }
            let seg = segments.pop().ok_or_else(|| ArmError::InvalidAction {
                agent: agent.name.clone(),
                reason: format!("no segment left for the {} stage", stage.name()),
            })?;
            match stage {
                Stage::Motion => self.apply_motion(agent, seg)?,
                Stage::Communication => self.apply_comm(agent, seg, dim_c)?,
            }
        }

        if !segments.is_empty() {
            tracing::warn!(
                agent = %agent.name,
                leftover = segments.len(),
                "unconsumed action data"
            );
            return Err(ArmError::UnconsumedActionData {
                agent: agent.name.clone(),
                leftover: segments.len(),
            });
        }
        Ok(())
    }

    fn apply_motion(&self, agent: &mut Robot, mut seg: Array1<f32>) -> Result<()> {
        match self.mode {
            DecodeMode::OneHotInput => {
                check_motion_layout(agent, &seg)?;
                if seg[1] == 1.0 {
                    agent.action.u[0] = 1.0;
                }
                if seg[2] == 1.0 {
                    agent.action.u[0] = -1.0;
                }
                if seg[3] == 1.0 {
                    agent.action.u[1] = 1.0;
                }
                if seg[4] == 1.0 {
                    agent.action.u[1] = -1.0;
                }
                agent.state.grasp = seg[5] == 1.0;
            }
            DecodeMode::ForcedDiscrete => {
                check_motion_layout(agent, &seg)?;
                force_one_hot(&mut seg);
                apply_axes(agent, &seg);
            }
            DecodeMode::DiscreteAxes => {
                check_motion_layout(agent, &seg)?;
                apply_axes(agent, &seg);
            }
            DecodeMode::Continuous => {
                agent.action.u = seg;
            }
        }

        let sensitivity = agent.accel.unwrap_or(1.0);
        agent.action.u *= sensitivity;
        Ok(())
    }

    fn apply_comm(&self, agent: &mut Robot, seg: Array1<f32>, dim_c: usize) -> Result<()> {
        match self.mode {
            DecodeMode::OneHotInput => {
                let index = seg.first().copied().unwrap_or(0.0) as usize;
                if index >= dim_c {
                    return Err(ArmError::InvalidAction {
                        agent: agent.name.clone(),
                        reason: format!(
                            "communication index {} out of range for {} channel(s)",
                            index, dim_c
                        ),
                    });
                }
                agent.action.c[index] = 1.0;
            }
            _ => {
                agent.action.c = seg;
            }
        }
        Ok(())
    }
}

/// Axis-difference rule shared by the discrete vector modes
fn apply_axes(agent: &mut Robot, seg: &Array1<f32>) {
    agent.action.u[0] = seg[1] - seg[2];
    agent.action.u[1] = seg[3] - seg[4];
    let last = agent.action.u.len() - 1;
    agent.action.u[last] = seg[5];
}

fn check_motion_layout(agent: &Robot, seg: &Array1<f32>) -> Result<()> {
    if seg.len() < 6 {
        return Err(ArmError::InvalidAction {
            agent: agent.name.clone(),
            reason: format!("discrete motion layout needs 6 slots, segment has {}", seg.len()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::{Box as BoxSpace, Discrete, MultiDiscrete};
    use ndarray::array;

    fn test_world(movable: bool, silent: bool) -> World {
        let mut world = World::new(2, 0.35);
        world.dim_c = 4;
        let mut robot = Robot::new("agent 0", 2, 2, 4);
        robot.movable = movable;
        robot.silent = silent;
        world.agents.push(robot);
        world
    }

    #[test]
    fn test_from_flags_precedence() {
        assert_eq!(DecodeMode::from_flags(true, true, true), DecodeMode::OneHotInput);
        assert_eq!(DecodeMode::from_flags(false, true, true), DecodeMode::ForcedDiscrete);
        assert_eq!(DecodeMode::from_flags(false, false, true), DecodeMode::DiscreteAxes);
        assert_eq!(DecodeMode::from_flags(false, false, false), DecodeMode::Continuous);
    }

    #[test]
    fn test_force_one_hot_idempotent() {
        let mut v = array![0.3, -1.0, 2.5, 2.5, 0.0];
        force_one_hot(&mut v);
        assert_eq!(v, array![0.0, 0.0, 1.0, 0.0, 0.0]);

        let once = v.clone();
        force_one_hot(&mut v);
        assert_eq!(v, once);
    }

    #[test]
    fn test_force_one_hot_ties_to_lowest_index() {
        let mut v = array![1.0, 1.0, 1.0];
        force_one_hot(&mut v);
        assert_eq!(v, array![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_one_hot_negative_overrides_positive() {
        let mut world = test_world(true, true);
        let decoder = ActionDecoder::new(DecodeMode::OneHotInput);
        let space = DynSpace::Discrete(Discrete::new(6));

        let action = array![0.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        decoder.decode(&mut world, 0, &space, action.view()).unwrap();
        assert_eq!(world.agents[0].action.u[0], -1.0);
    }

    #[test]
    fn test_discrete_axes_decode() {
        let mut world = test_world(true, true);
        let decoder = ActionDecoder::new(DecodeMode::DiscreteAxes);
        let space = DynSpace::Discrete(Discrete::new(6));

        let action = array![0.0, 0.7, 0.2, 0.1, 0.6, 0.9];
        decoder.decode(&mut world, 0, &space, action.view()).unwrap();

        let u = &world.agents[0].action.u;
        assert!((u[0] - 0.5).abs() < 1e-6);
        assert!((u[1] + 0.5).abs() < 1e-6);
        assert!((u[2] - 0.9).abs() < 1e-6);
        // grasp intensity lives on the control vector, not the flag
        assert!(!world.agents[0].state.grasp);
    }

    #[test]
    fn test_forced_discrete_decode() {
        let mut world = test_world(true, true);
        let decoder = ActionDecoder::new(DecodeMode::ForcedDiscrete);
        let space = DynSpace::Discrete(Discrete::new(6));

        // argmax at slot 3 forces a one-hot, then the axis rule reads it
        let action = array![0.1, 0.2, 0.3, 0.9, 0.4, 0.5];
        decoder.decode(&mut world, 0, &space, action.view()).unwrap();

        let u = &world.agents[0].action.u;
        assert_eq!(u[0], 0.0);
        assert_eq!(u[1], 1.0);
        assert_eq!(u[2], 0.0);
    }

    #[test]
    fn test_continuous_decode_verbatim() {
        let mut world = test_world(true, true);
        let decoder = ActionDecoder::new(DecodeMode::Continuous);
        let space = DynSpace::Box(BoxSpace::symmetric(&[3]));

        let action = array![0.25, -0.5, 0.75];
        decoder.decode(&mut world, 0, &space, action.view()).unwrap();
        assert_eq!(world.agents[0].action.u, action);
    }

    #[test]
    fn test_sensitivity_defaults_to_identity() {
        let mut world = test_world(true, true);
        let decoder = ActionDecoder::new(DecodeMode::Continuous);
        let space = DynSpace::Box(BoxSpace::symmetric(&[3]));
        let action = array![0.25, -0.5, 0.75];

        world.agents[0].accel = None;
        decoder.decode(&mut world, 0, &space, action.view()).unwrap();
        assert_eq!(world.agents[0].action.u, action);

        world.agents[0].accel = Some(2.0);
        decoder.decode(&mut world, 0, &space, action.view()).unwrap();
        assert_eq!(world.agents[0].action.u, array![0.5, -1.0, 1.5]);
    }

    #[test]
    fn test_comm_stage_writes_one_hot() {
        let mut world = test_world(true, false);
        let decoder = ActionDecoder::new(DecodeMode::OneHotInput);
        let space = DynSpace::MultiDiscrete(MultiDiscrete::new(vec![6, 4]));

        let action = array![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0];
        decoder.decode(&mut world, 0, &space, action.view()).unwrap();
        assert_eq!(world.agents[0].action.c, array![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_silent_agent_keeps_zero_comm() {
        let mut world = test_world(true, true);
        let decoder = ActionDecoder::new(DecodeMode::OneHotInput);
        let space = DynSpace::Discrete(Discrete::new(6));

        let action = array![0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        decoder.decode(&mut world, 0, &space, action.view()).unwrap();
        assert!(world.agents[0].action.c.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_immovable_agent_keeps_zero_motion() {
        let mut world = test_world(false, false);
        let decoder = ActionDecoder::new(DecodeMode::Continuous);
        let space = DynSpace::Box(BoxSpace::uniform(&[4], 0.0, 1.0));

        let action = array![0.9, 0.8, 0.7, 0.6];
        decoder.decode(&mut world, 0, &space, action.view()).unwrap();
        assert!(world.agents[0].action.u.iter().all(|&x| x == 0.0));
        assert_eq!(world.agents[0].action.c, action);
    }

    #[test]
    fn test_length_mismatch_rejected_up_front() {
        let mut world = test_world(true, true);
        let decoder = ActionDecoder::new(DecodeMode::OneHotInput);
        let space = DynSpace::Discrete(Discrete::new(6));

        let action = array![0.0, 1.0, 0.0];
        let err = decoder.decode(&mut world, 0, &space, action.view()).unwrap_err();
        match err {
            ArmError::ActionLengthMismatch { expected, actual, .. } => {
                assert_eq!(expected, 6);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unconsumed_segments_rejected() {
        // Neither stage applies, so the single segment is never drained.
        let mut world = test_world(false, true);
        let decoder = ActionDecoder::new(DecodeMode::Continuous);
        let space = DynSpace::Box(BoxSpace::symmetric(&[3]));

        let action = array![0.1, 0.2, 0.3];
        let err = decoder.decode(&mut world, 0, &space, action.view()).unwrap_err();
        match err {
            ArmError::UnconsumedActionData { leftover, .. } => assert_eq!(leftover, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_segment_rejected() {
        // Both stages apply but the descriptor only declares one segment.
        let mut world = test_world(true, false);
        let decoder = ActionDecoder::new(DecodeMode::OneHotInput);
        let space = DynSpace::Discrete(Discrete::new(6));

        let action = array![0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let err = decoder.decode(&mut world, 0, &space, action.view()).unwrap_err();
        assert!(matches!(err, ArmError::InvalidAction { .. }));
    }
}
