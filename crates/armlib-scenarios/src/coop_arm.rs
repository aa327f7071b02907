//! Two-arm cooperative manipulation scenario.

use armlib::scenario::Scenario;
use armlib::world::{Landmark, Robot, World};
use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;
use std::f32::consts::PI;

/// Two arms share the task of moving one object to a mirrored goal.
///
/// The reward is shared: the negative sum of squared object-to-goal
/// distances. Observations use normalized joint angles and squared
/// end-effector distances to the object.
pub struct CoopArm {
    /// Number of cooperating arms
    pub num_agents: usize,
    /// Number of objects to move
    pub num_objects: usize,
    /// Joints per arm
    pub num_joints: usize,
    /// Length of each arm link
    pub arm_length: f32,
}

impl Default for CoopArm {
    fn default() -> Self {
        Self {
            num_agents: 2,
            num_objects: 1,
            num_joints: 2,
            arm_length: 0.35,
        }
    }
}

impl Scenario for CoopArm {
    fn make_world(&self, rng: &mut StdRng) -> World {
        let mut world = World::new(self.num_joints, self.arm_length);

        for i in 0..self.num_agents {
            let mut agent = Robot::new(
                format!("agent {i}"),
                world.num_joints,
                world.dim_p,
                world.dim_c,
            );
            agent.silent = true;
            world.agents.push(agent);
        }

        for i in 0..self.num_objects {
            let mut object = Landmark::new(format!("object {i}"), world.dim_p);
            object.movable = true;
            world.objects.push(object);
        }

        let mut goal = Landmark::new("goal", world.dim_p);
        goal.collide = false;
        world.goals.push(goal);

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

        for object in &mut world.objects {
            let dx: f32 = rng.sample(StandardNormal);
            let dy: f32 = rng.sample(StandardNormal);
            object.color = [1.0, 0.0, 0.0];
            object.p_pos = array![0.2 * dx + 0.5, 0.2 * dy];
        }

        // the goal mirrors the object through the origin
        world.goals[0].p_pos = world.objects[0].p_pos.mapv(|x| -x);
    }

    fn reward(&self, _agent: &Robot, world: &World) -> f32 {
        let mut reward = 0.0;
        for object in &world.objects {
            let diff = &object.p_pos - &world.goals[0].p_pos;
            reward += diff.mapv(|x| x * x).sum();
        }
        -reward
    }

    fn observation(&self, agent: &Robot, world: &World) -> Array1<f32> {
        let mut obs: Vec<f32> = agent.state.angles.iter().map(|a| a / PI).collect();
        obs.push(if agent.state.grasp { 1.0 } else { 0.0 });

        for object in &world.objects {
            let diff = &object.p_pos - &agent.end_effector();
            obs.push(diff.mapv(|x| x * x).sum());
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
