//! Holdout evaluation helpers

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Row indices of a train/test partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldoutSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a fixed seed and hold out `ceil(n * test_fraction)` rows.
///
/// Both sides keep at least one row when `n >= 2`. With fewer rows
/// everything goes to training and the test side is empty.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> HoldoutSplit {
    let mut indices: Vec<usize> = (0..n).collect();
    if n < 2 {
        return HoldoutSplit {
            train: indices,
            test: Vec::new(),
        };
    }

    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fraction = test_fraction.clamp(0.0, 1.0);
    let n_test = ((n as f64 * fraction).ceil() as usize).clamp(1, n - 1);
    let train = indices.split_off(n_test);

    HoldoutSplit {
        train,
        test: indices,
    }
}

/// Mean of absolute differences, `None` for empty input
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    Some(total / actual.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(10, 0.2, 42);
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        let split = train_test_split(11, 0.2, 42);
        assert_eq!(split.test.len(), 3);
    }

    #[test]
    fn test_split_is_partition() {
        let split = train_test_split(17, 0.2, 7);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..17).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_deterministic() {
        assert_eq!(train_test_split(20, 0.2, 42), train_test_split(20, 0.2, 42));
    }

    #[test]
    fn test_split_small_inputs() {
        let two = train_test_split(2, 0.2, 42);
        assert_eq!((two.train.len(), two.test.len()), (1, 1));

        let one = train_test_split(1, 0.2, 42);
        assert_eq!(one.train, vec![0]);
        assert!(one.test.is_empty());

        assert_eq!(train_test_split(0, 0.2, 42), HoldoutSplit::default());
    }

    #[test]
    fn test_split_full_fraction_keeps_training_row() {
        let split = train_test_split(5, 1.0, 42);
        assert_eq!(split.train.len(), 1);
        assert_eq!(split.test.len(), 4);
    }

    #[test]
    fn test_mae() {
        let mae = mean_absolute_error(&[80.0, 82.0, 84.0], &[81.0, 82.0, 81.0]).unwrap();
        assert!((mae - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(mean_absolute_error(&[], &[]), None);
        assert_eq!(mean_absolute_error(&[1.0], &[1.0, 2.0]), None);
    }
}
