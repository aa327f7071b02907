//! Box (continuous) observation/action space

use super::Space;
use ndarray::{ArrayD, IxDyn};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Box space for continuous values with bounds
#[derive(Clone, Debug)]
pub struct Box {
    /// Lower bound for each element
    pub low: ArrayD<f32>,
    /// Upper bound for each element
    pub high: ArrayD<f32>,
    /// Shape of the space
    shape: Vec<usize>,
}

impl Box {
    /// Create a new box space with given bounds
    pub fn new(low: ArrayD<f32>, high: ArrayD<f32>) -> Self {
        assert_eq!(
            low.shape(),
            high.shape(),
            "Low and high must have same shape"
        );
        let shape = low.shape().to_vec();
        Self { low, high, shape }
    }

    /// Create a box space with uniform bounds
    pub fn uniform(shape: &[usize], low: f32, high: f32) -> Self {
        let low_arr = ArrayD::from_elem(IxDyn(shape), low);
        let high_arr = ArrayD::from_elem(IxDyn(shape), high);
        Self::new(low_arr, high_arr)
    }

    /// Create a symmetric box [-1, 1] for all elements
    pub fn symmetric(shape: &[usize]) -> Self {
        Self::uniform(shape, -1.0, 1.0)
    }
}

impl Space for Box {
    type Sample = ArrayD<f32>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        let mut result = ArrayD::zeros(IxDyn(&self.shape));
        for ((&l, &h), r) in self
            .low
            .iter()
            .zip(self.high.iter())
            .zip(result.iter_mut())
        {
            let dist = Uniform::new(l, h);
            *r = dist.sample(rng);
        }
        result
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        if value.shape() != self.low.shape() {
            return false;
        }
        value
            .iter()
            .zip(self.low.iter())
            .zip(self.high.iter())
            .all(|((&v, &l), &h)| v >= l && v <= h)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}
