//! MultiDiscrete action/observation space

use super::Space;
use rand::Rng;

/// MultiDiscrete space for multiple independent discrete sub-choices
///
/// Each dimension i has nvec[i] possible values: {0, 1, ..., nvec[i]-1}.
/// At the action boundary the choices arrive as concatenated one-hot
/// segments, one per dimension, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiDiscrete {
    /// Number of values for each dimension
    pub nvec: Vec<usize>,
    /// Cached shape (just the length of nvec)
    shape: Vec<usize>,
}

impl MultiDiscrete {
    /// Create a new multi-discrete space
    pub fn new(nvec: Vec<usize>) -> Self {
        assert!(
            !nvec.is_empty(),
            "MultiDiscrete must have at least 1 dimension"
        );
        assert!(
            nvec.iter().all(|&n| n > 0),
            "All dimensions must have at least 1 element"
        );
        let shape = vec![nvec.len()];
        Self { nvec, shape }
    }

    /// Get the number of dimensions
    pub fn ndim(&self) -> usize {
        self.nvec.len()
    }
}

impl Space for MultiDiscrete {
    type Sample = Vec<usize>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        self.nvec.iter().map(|&n| rng.gen_range(0..n)).collect()
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        if value.len() != self.nvec.len() {
            return false;
        }
        value.iter().zip(self.nvec.iter()).all(|(&v, &n)| v < n)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn num_elements(&self) -> usize {
        self.nvec.len()
    }
}
