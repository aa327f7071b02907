//! The environment surface the outer step/reset loop drives.
//!
//! `RobotEnv` owns the world, the decode configuration, the scenario
//! callbacks and the episode RNG. The caller advances physics between
//! steps; this layer decodes actions and delegates rewards and
//! observations to the scenario.

use ndarray::{Array1, ArrayD};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::action::{ActionDecoder, DecodeMode};
use crate::render::CameraBounds;
use crate::scenario::Scenario;
use crate::spaces::{Box as BoxSpace, Discrete, DynSpace, MultiDiscrete};
use crate::world::World;
use crate::Result;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Multi-agent serial-arm environment layer.
pub struct RobotEnv {
    /// Current world snapshot, advanced externally between steps
    pub world: World,
    scenario: Box<dyn Scenario>,
    decoder: ActionDecoder,
    rng: StdRng,
}

impl RobotEnv {
    /// Create an environment, build its world and run the first reset.
    ///
    /// Without a seed the episode RNG is drawn from entropy.
    pub fn new(scenario: Box<dyn Scenario>, mode: DecodeMode, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let world = scenario.make_world(&mut rng);
        Self {
            world,
            scenario,
            decoder: ActionDecoder::new(mode),
            rng,
        }
    }

    /// The environment-wide decode mode
    pub fn mode(&self) -> DecodeMode {
        self.decoder.mode()
    }

    /// Reset the world for a new episode.
    ///
    /// # Arguments
    /// * `seed` - Optional random seed for reproducibility
    pub fn reset(&mut self, seed: Option<u64>) {
        if let Some(s) = seed {
            self.rng = StdRng::seed_from_u64(s);
        }
        self.scenario.reset_world(&mut self.world, &mut self.rng);
        tracing::debug!(agents = self.world.agents.len(), "world reset");
    }

    /// Action-space descriptor for one agent.
    ///
    /// The motion part is a 6-slot discrete choice in the discrete
    /// modes, or a symmetric box over the control channels in continuous
    /// mode. A non-silent agent gets a communication part as well; both
    /// parts combine into a `MultiDiscrete` whose flat encoding
    /// concatenates the two segments.
    pub fn action_space(&self, agent_index: usize) -> DynSpace {
        let agent = &self.world.agents[agent_index];
        let discrete = self.decoder.mode() != DecodeMode::Continuous;

        let motion = agent.movable.then(|| {
            if discrete {
                DynSpace::Discrete(Discrete::new(2 * self.world.dim_p + 2))
            } else {
                DynSpace::Box(BoxSpace::symmetric(&[self.world.dim_p + 1]))
            }
        });
        let comm = (!agent.silent).then(|| {
            if discrete {
                DynSpace::Discrete(Discrete::new(self.world.dim_c))
            } else {
                DynSpace::Box(BoxSpace::uniform(&[self.world.dim_c], 0.0, 1.0))
            }
        });

        match (motion, comm) {
            (Some(m), Some(c)) => {
                DynSpace::MultiDiscrete(MultiDiscrete::new(vec![m.flat_len(), c.flat_len()]))
            }
            (Some(m), None) => m,
            (None, Some(c)) => c,
            // An agent with neither stage cannot decode any action; the
            // empty descriptor makes every decode report the mismatch.
            (None, None) => DynSpace::Box(BoxSpace::uniform(&[0], 0.0, 0.0)),
        }
    }

    /// Decode one agent's raw action vector for the current step.
    ///
    /// Called once per agent per step, in `world.agents` order. On error
    /// the agent's `action.u`/`action.c` must be treated as invalid for
    /// this step.
    pub fn set_action(&mut self, agent_index: usize, action: &ArrayD<f32>) -> Result<()> {
        let space = self.action_space(agent_index);
        let flat = Array1::from_iter(action.iter().cloned());
        self.decoder.decode(&mut self.world, agent_index, &space, flat.view())
    }

    /// Scalar reward for one agent, delegated to the scenario
    pub fn reward(&self, agent_index: usize) -> f32 {
        self.scenario.reward(&self.world.agents[agent_index], &self.world)
    }

    /// Observation vector for one agent, delegated to the scenario
    pub fn observation(&self, agent_index: usize) -> Array1<f32> {
        self.scenario
            .observation(&self.world.agents[agent_index], &self.world)
    }

    /// Human-readable summary of the inter-agent communication state.
    ///
    /// Each speaking agent's strongest channel maps to a letter; agents
    /// with an all-zero communication state read as `_`.
    pub fn comm_transcript(&self) -> String {
        let mut message = String::new();
        for agent in &self.world.agents {
            for other in &self.world.agents {
                if other.name == agent.name {
                    continue;
                }
                let word = if other.state.c.iter().all(|&x| x == 0.0) {
                    '_'
                } else {
                    let mut best = 0;
                    let mut best_val = f32::NEG_INFINITY;
                    for (i, &x) in other.state.c.iter().enumerate() {
                        if x > best_val {
                            best = i;
                            best_val = x;
                        }
                    }
                    ALPHABET[best % ALPHABET.len()] as char
                };
                message.push_str(&format!("{} to {}: {}   ", other.name, agent.name, word));
            }
        }
        message
    }

    /// Camera bounds for the external viewer, centered on one agent's
    /// base or on the origin for a shared view.
    pub fn camera_bounds(&self, agent_index: Option<usize>, cam_range: f32) -> CameraBounds {
        let origin = Array1::zeros(self.world.dim_p);
        let pos = match agent_index {
            Some(i) => &self.world.agents[i].state.p_pos,
            None => &origin,
        };
        CameraBounds::centered(pos, cam_range)
    }
}
