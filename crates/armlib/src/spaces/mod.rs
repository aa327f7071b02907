//! Action space descriptors.
//!
//! Provides Gymnasium-compatible space definitions and the segmentation
//! rules that turn a flat per-agent action vector into the ordered
//! segments consumed by the decode pipeline.

mod r#box;
mod discrete;
mod multi_discrete;

pub use discrete::Discrete;
pub use multi_discrete::MultiDiscrete;
pub use r#box::Box;

use ndarray::{s, Array1, ArrayView1};
use rand::Rng;
use smallvec::{smallvec, SmallVec};

/// Ordered list of action segments drained by the decode stages.
///
/// Every practical configuration produces one or two segments, so the
/// queue stays inline.
pub type SegmentQueue = SmallVec<[Array1<f32>; 2]>;

/// Trait for observation and action spaces
pub trait Space: Clone + Send + Sync {
    /// The type of samples from this space
    type Sample;

    /// Sample a random element from this space
    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample;

    /// Check if a value is contained in this space
    fn contains(&self, value: &Self::Sample) -> bool;

    /// Get the shape of samples from this space
    fn shape(&self) -> &[usize];

    /// Get the total number of elements in a sample
    fn num_elements(&self) -> usize {
        self.shape().iter().product()
    }
}

/// Enum for dynamic space types.
///
/// This is the action-space descriptor attached to each agent: the
/// variant determines both the expected flat encoding length and how the
/// flat vector splits into segments.
#[derive(Clone, Debug)]
pub enum DynSpace {
    Discrete(Discrete),
    MultiDiscrete(MultiDiscrete),
    Box(Box),
}

impl DynSpace {
    /// Expected length of the flat action encoding.
    ///
    /// Discrete choices arrive one-hot encoded, so a `Discrete(n)`
    /// descriptor expects `n` elements and a `MultiDiscrete` descriptor
    /// expects the sum of its per-dimension cardinalities.
    pub fn flat_len(&self) -> usize {
        match self {
            DynSpace::Discrete(s) => s.n,
            DynSpace::MultiDiscrete(s) => s.nvec.iter().sum(),
            DynSpace::Box(s) => s.num_elements(),
        }
    }

    /// Split a flat action vector into ordered segments.
    ///
    /// `MultiDiscrete` splits into contiguous chunks of the per-dimension
    /// cardinalities, in order. Every other descriptor wraps the whole
    /// vector as a single segment. The caller is responsible for checking
    /// `action.len() == self.flat_len()` first.
    pub fn segment(&self, action: ArrayView1<f32>) -> SegmentQueue {
        match self {
            DynSpace::MultiDiscrete(space) => {
                let mut segments = SegmentQueue::new();
                let mut index = 0;
                for &size in &space.nvec {
                    segments.push(action.slice(s![index..index + size]).to_owned());
                    index += size;
                }
                segments
            }
            _ => smallvec![action.to_owned()],
        }
    }

    /// Sample a valid flat action encoding from this space.
    ///
    /// Discrete choices are emitted as one-hot segments.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Array1<f32> {
        match self {
            DynSpace::Discrete(s) => one_hot(s.n, s.sample(rng)),
            DynSpace::MultiDiscrete(s) => {
                let choices = s.sample(rng);
                let mut flat = Vec::with_capacity(self.flat_len());
                for (&choice, &n) in choices.iter().zip(s.nvec.iter()) {
                    flat.extend(one_hot(n, choice));
                }
                Array1::from(flat)
            }
            DynSpace::Box(s) => {
                let sample = s.sample(rng);
                Array1::from_iter(sample.iter().cloned())
            }
        }
    }

    /// Check if a flat encoding is a valid element of this space
    pub fn contains(&self, value: &Array1<f32>) -> bool {
        if value.len() != self.flat_len() {
            return false;
        }
        match self {
            DynSpace::Discrete(_) => is_one_hot(value.view()),
            DynSpace::MultiDiscrete(s) => {
                let mut index = 0;
                for &size in &s.nvec {
                    if !is_one_hot(value.slice(s![index..index + size])) {
                        return false;
                    }
                    index += size;
                }
                true
            }
            DynSpace::Box(s) => value
                .iter()
                .zip(s.low.iter())
                .zip(s.high.iter())
                .all(|((&v, &l), &h)| v >= l && v <= h),
        }
    }
}

fn one_hot(len: usize, index: usize) -> Array1<f32> {
    let mut v = Array1::zeros(len);
    v[index] = 1.0;
    v
}

fn is_one_hot(v: ArrayView1<f32>) -> bool {
    let mut ones = 0;
    for &x in v.iter() {
        if x == 1.0 {
            ones += 1;
        } else if x != 0.0 {
            return false;
        }
    }
    ones == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    #[test]
    fn test_flat_len_per_variant() {
        assert_eq!(DynSpace::Discrete(Discrete::new(6)).flat_len(), 6);
        assert_eq!(
            DynSpace::MultiDiscrete(MultiDiscrete::new(vec![6, 4])).flat_len(),
            10
        );
        assert_eq!(DynSpace::Box(Box::symmetric(&[3])).flat_len(), 3);
    }

    #[test]
    fn test_multi_discrete_segmentation() {
        let space = DynSpace::MultiDiscrete(MultiDiscrete::new(vec![3, 2, 4]));
        let action: Array1<f32> = Array1::from_iter((0..9).map(|i| i as f32));

        let segments = space.segment(action.view());
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], array![0.0, 1.0, 2.0]);
        assert_eq!(segments[1], array![3.0, 4.0]);
        assert_eq!(segments[2], array![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_single_segment_wrapping() {
        let action = array![0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

        let discrete = DynSpace::Discrete(Discrete::new(6));
        let segments = discrete.segment(action.view());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], action);

        let cont = DynSpace::Box(Box::symmetric(&[6]));
        let segments = cont.segment(action.view());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], action);
    }

    #[test]
    fn test_dyn_sample_is_contained() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let spaces = [
            DynSpace::Discrete(Discrete::new(6)),
            DynSpace::MultiDiscrete(MultiDiscrete::new(vec![6, 4])),
            DynSpace::Box(Box::symmetric(&[3])),
        ];

        for space in &spaces {
            for _ in 0..50 {
                let sample = space.sample(&mut rng);
                assert_eq!(sample.len(), space.flat_len());
                assert!(space.contains(&sample));
            }
        }
    }

    #[test]
    fn test_contains_rejects_bad_encodings() {
        let space = DynSpace::Discrete(Discrete::new(4));
        assert!(!space.contains(&array![1.0, 1.0, 0.0, 0.0]));
        assert!(!space.contains(&array![0.5, 0.0, 0.0, 0.0]));
        assert!(!space.contains(&array![1.0, 0.0, 0.0]));
    }
}
