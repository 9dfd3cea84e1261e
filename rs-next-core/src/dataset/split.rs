use log::info;
use ndarray::Axis;
use rand::Rng;
use rand::seq::SliceRandom;

use super::padding::Examples;
use crate::error::{NextWordError, Result};

/// Disjoint partition of a set of examples.
#[derive(Clone, Debug)]
pub struct TrainTestSplit {
	pub train: Examples,
	pub test: Examples,
}

/// Number of held-out rows for `total` examples: `ceil(total × fraction)`.
pub fn test_size(total: usize, test_fraction: f64) -> usize {
	(total as f64 * test_fraction).ceil() as usize
}

/// Randomly partitions `examples` into a training and a held-out subset.
///
/// Row indices are shuffled uniformly; the first [`test_size`] of them go
/// to the test side, the rest to the train side. Every row lands in exactly
/// one side.
///
/// # Errors
/// - [`NextWordError::Config`] if `test_fraction` is not in (0, 1)
/// - [`NextWordError::InsufficientData`] if the train side would be empty
pub fn train_test_split<R: Rng + ?Sized>(
	examples: &Examples,
	test_fraction: f64,
	rng: &mut R,
) -> Result<TrainTestSplit> {
	if !(test_fraction > 0.0 && test_fraction < 1.0) {
		return Err(NextWordError::Config(format!(
			"test_fraction must be in (0, 1), got {test_fraction}"
		)));
	}

	let total = examples.len();
	let n_test = test_size(total, test_fraction);
	if n_test >= total {
		return Err(NextWordError::InsufficientData(format!(
			"{total} example(s) leave nothing to train on"
		)));
	}

	let mut indices: Vec<usize> = (0..total).collect();
	indices.shuffle(rng);
	let (test_idx, train_idx) = indices.split_at(n_test);

	let split = TrainTestSplit {
		train: select(examples, train_idx),
		test: select(examples, test_idx),
	};
	info!("Split {} examples into {} train / {} test", total, split.train.len(), split.test.len());
	Ok(split)
}

fn select(examples: &Examples, rows: &[usize]) -> Examples {
	Examples {
		inputs: examples.inputs.select(Axis(0), rows),
		labels: examples.labels.select(Axis(0), rows),
	}
}
