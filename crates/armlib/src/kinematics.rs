//! Planar serial-chain forward kinematics.
//!
//! Each joint's orientation is relative to the previous link, so joint
//! `k` sits at the base position plus the sum of link vectors under
//! cumulative angle summation. Velocity and force integration live in
//! the external physics module; this module only maps angles to
//! cartesian positions.

use ndarray::{array, Array1};

/// Cartesian position of joint `k` for an arm rooted at `base`.
///
/// `k = 0` is the base itself; `k = angles.len()` is the end effector.
pub fn joint_position(base: &Array1<f32>, angles: &[f32], lengths: &[f32], k: usize) -> Array1<f32> {
    let mut x = base[0];
    let mut y = base[1];
    let mut heading = 0.0_f32;
    for (&angle, &length) in angles.iter().zip(lengths.iter()).take(k) {
        heading += angle;
        x += length * heading.cos();
        y += length * heading.sin();
    }
    array![x, y]
}

/// Cartesian position of the arm tip
pub fn end_effector(base: &Array1<f32>, angles: &[f32], lengths: &[f32]) -> Array1<f32> {
    joint_position(base, angles, lengths, angles.len())
}
