//! Single-arm reach-and-place scenario.

use armlib::scenario::Scenario;
use armlib::world::{Landmark, Robot, World};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;
use std::f32::consts::PI;

/// One arm, one object, one goal.
///
/// The reward pulls the end effector toward the object and the object
/// toward the goal. Observations use cartesian joint positions and the
/// object's cartesian position.
pub struct ReachAndPlace {
    /// Number of objects to place
    pub num_objects: usize,
    /// Joints per arm
    pub num_joints: usize,
    /// Length of each arm link
    pub arm_length: f32,
    /// Weight of the object-to-goal distance term in the reward
    pub goal_weight: f32,
}

impl Default for ReachAndPlace {
    fn default() -> Self {
        Self {
            num_objects: 1,
            num_joints: 2,
            arm_length: 0.35,
            goal_weight: 1.5,
        }
    }
}

impl Scenario for ReachAndPlace {
    fn make_world(&self, rng: &mut StdRng) -> World {
        let mut world = World::new(self.num_joints, self.arm_length);

        let mut agent = Robot::new("agent 0", world.num_joints, world.dim_p, world.dim_c);
        agent.silent = true;
        world.agents.push(agent);

        for i in 0..self.num_objects {
            world
                .objects
                .push(Landmark::new(format!("object {i}"), world.dim_p));
        }
        world.goals.push(Landmark::new("goal", world.dim_p));

        self.reset_world(&mut world, rng);
        world
    }

    fn reset_world(&self, world: &mut World, rng: &mut StdRng) {
        let num_joints = world.num_joints;
        let arm_length = world.arm_length;
        let dim_c = world.dim_c;

        let origins = world.robot_positions(world.agents.len());
        for (agent, origin) in world.agents.iter_mut().zip(origins) {
            agent.color = [0.25, 0.25, 0.25];
            agent.state.lengths = vec![arm_length; num_joints];
            agent.state.angles = (0..num_joints)
                .map(|_| (2.0 * rng.gen::<f32>() - 1.0) * PI)
                .collect();
            agent.state.p_pos = origin;
            agent.state.grasp = false;
            agent.state.c = Array1::zeros(dim_c);
        }

        for i in 0..world.objects.len() {
            let pos = world.random_reachable_pos(rng);
            world.objects[i].color = [0.0, 0.0, 1.0];
            world.objects[i].p_pos = pos;
        }

        let pos = world.random_reachable_pos(rng);
        world.goals[0].color = [1.0, 0.0, 0.0];
        world.goals[0].p_pos = pos;
    }

    fn reward(&self, agent: &Robot, world: &World) -> f32 {
        let ee = agent.end_effector();
        let object = &world.objects[0];
        let goal = &world.goals[0];

        let mut r_grab = 0.0;
        let mut r_goal = 0.0;
        for i in 0..agent.state.p_pos.len() {
            r_grab += (object.p_pos[i] - ee[i]).powi(2);
            r_goal += (goal.p_pos[i] - object.p_pos[i]).powi(2);
        }
        -r_grab.sqrt() - self.goal_weight * r_goal.sqrt()
    }

    fn observation(&self, agent: &Robot, world: &World) -> Array1<f32> {
        let mut obs: Vec<f32> = Vec::new();

        for joint in 1..=world.num_joints {
            obs.extend(agent.joint_pos(joint).iter());
        }
        obs.push(if agent.state.grasp { 1.0 } else { 0.0 });

        for object in &world.objects {
            obs.extend(object.p_pos.iter());
        }

        if world.agents.len() > 1 {
            for partner in &world.agents {
                if partner.name != agent.name {
                    let diff = &partner.end_effector() - &agent.end_effector();
                    obs.push(diff.mapv(|x| x * x).sum().sqrt());
                    obs.push(if partner.state.grasp { 1.0 } else { 0.0 });
                }
            }
        }

        obs.extend(world.goals[0].p_pos.iter());
        Array1::from(obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn make(rng_seed: u64) -> (ReachAndPlace, World) {
        let scenario = ReachAndPlace::default();
        let mut rng = StdRng::seed_from_u64(rng_seed);
        let world = scenario.make_world(&mut rng);
        (scenario, world)
    }

    #[test]
    fn test_world_population() {
        let (_, world) = make(42);
        assert_eq!(world.agents.len(), 1);
        assert_eq!(world.objects.len(), 1);
        assert_eq!(world.goals.len(), 1);
        assert!(world.agents[0].silent);
        assert_eq!(world.agents[0].state.lengths, vec![0.35, 0.35]);
    }

    #[test]
    fn test_reward_weights_goal_distance() {
        let (scenario, mut world) = make(42);

        // fold the arm so the end effector sits on the base at the origin
        world.agents[0].state.angles = vec![0.0, PI];
        world.objects[0].p_pos = array![0.0, 0.0];
        world.goals[0].p_pos = array![1.0, 0.0];

        let reward = scenario.reward(&world.agents[0], &world);
        assert!((reward + 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_observation_order() {
        let (scenario, mut world) = make(42);
        world.agents[0].state.angles = vec![0.0, 0.0];
        world.agents[0].state.grasp = true;
        world.objects[0].p_pos = array![0.3, 0.4];
        world.goals[0].p_pos = array![-0.2, 0.1];

        let obs = scenario.observation(&world.agents[0], &world);
        assert_eq!(obs.len(), 9);

        // joint positions for the straight arm, then grasp, object, goal
        assert!((obs[0] - 0.35).abs() < 1e-6);
        assert!(obs[1].abs() < 1e-6);
        assert!((obs[2] - 0.7).abs() < 1e-6);
        assert!(obs[3].abs() < 1e-6);
        assert_eq!(obs[4], 1.0);
        assert_eq!(obs[5], 0.3);
        assert_eq!(obs[6], 0.4);
        assert_eq!(obs[7], -0.2);
        assert_eq!(obs[8], 0.1);
    }

    #[test]
    fn test_reset_is_seed_deterministic() {
        let (scenario, mut world1) = make(42);
        let (_, mut world2) = make(42);

        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        scenario.reset_world(&mut world1, &mut rng1);
        scenario.reset_world(&mut world2, &mut rng2);

        assert_eq!(world1.agents[0].state.angles, world2.agents[0].state.angles);
        assert_eq!(world1.objects[0].p_pos, world2.objects[0].p_pos);
        assert_eq!(world1.goals[0].p_pos, world2.goals[0].p_pos);
    }
}
