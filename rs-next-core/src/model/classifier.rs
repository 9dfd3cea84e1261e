use log::info;
use ndarray::{Array2, ArrayView1};

use crate::dataset::padding::Examples;
use crate::error::{NextWordError, Result};

/// Trainable mapping from padded id rows to class probabilities.
///
/// This is the seam where a numeric backend plugs into the pipeline. The
/// pipeline only relies on this contract and never inspects parameters.
///
/// # Contract
/// - `fit` consumes rows of `W - 1` ids and one-hot labels over `classes()`
/// - `predict` returns one row per input, each summing to 1 over `classes()`
/// - Any internal failure is reported as [`NextWordError::Classifier`]
pub trait SequenceClassifier {
	/// Number of output classes (`total_words`).
	fn classes(&self) -> usize;

	/// Trains on the given examples. Training is one-shot and not retried.
	fn fit(&mut self, examples: &Examples) -> Result<()>;

	/// Scores every input row.
	fn predict(&self, inputs: &Array2<u32>) -> Result<Array2<f32>>;

	/// Opaque serialized state, readable only by the same backend.
	fn to_bytes(&self) -> Result<Vec<u8>>;
}

/// Index of the highest value, the lowest index on ties.
///
/// Returns `None` for an empty row.
pub fn argmax(row: ArrayView1<f32>) -> Option<usize> {
	let mut best: Option<(usize, f32)> = None;
	for (i, value) in row.iter().enumerate() {
		match best {
			Some((_, best_value)) if *value <= best_value => (),
			_ => best = Some((i, *value)),
		}
	}
	best.map(|(i, _)| i)
}

/// Top-1 accuracy of a classifier on held-out examples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
	pub samples: usize,
	pub accuracy: f32,
}

/// Scores `classifier` on `examples` by comparing argmax predictions with
/// the argmax of the one-hot labels.
///
/// An empty example set evaluates to zero samples and zero accuracy.
pub fn evaluate<C: SequenceClassifier + ?Sized>(classifier: &C, examples: &Examples) -> Result<Evaluation> {
	if examples.is_empty() {
		return Ok(Evaluation { samples: 0, accuracy: 0.0 });
	}

	let probabilities = classifier.predict(&examples.inputs)?;
	if probabilities.nrows() != examples.len() {
		return Err(NextWordError::Classifier(format!(
			"expected {} prediction rows, got {}",
			examples.len(),
			probabilities.nrows()
		)));
	}

	let correct = probabilities
		.rows()
		.into_iter()
		.zip(examples.labels.rows())
		.filter(|(predicted, expected)| {
			let class = argmax(predicted.view());
			class.is_some() && class == argmax(expected.view())
		})
		.count();

	let evaluation = Evaluation {
		samples: examples.len(),
		accuracy: correct as f32 / examples.len() as f32,
	};
	info!(
		"Evaluated on {} held-out examples: accuracy {:.3}",
		evaluation.samples, evaluation.accuracy
	);
	Ok(evaluation)
}

#[cfg(test)]
mod tests {
	use super::*;
	use ndarray::{Array1, array};

	/// Always predicts the class given at construction.
	struct Constant {
		classes: usize,
		class: usize,
	}

	impl SequenceClassifier for Constant {
		fn classes(&self) -> usize {
			self.classes
		}

		fn fit(&mut self, _examples: &Examples) -> Result<()> {
			Ok(())
		}

		fn predict(&self, inputs: &Array2<u32>) -> Result<Array2<f32>> {
			let mut out = Array2::zeros((inputs.nrows(), self.classes));
			out.column_mut(self.class).fill(1.0);
			Ok(out)
		}

		fn to_bytes(&self) -> Result<Vec<u8>> {
			Ok(vec![self.class as u8])
		}
	}

	#[test]
	fn test_argmax_lowest_index_on_ties() {
		assert_eq!(argmax(array![0.1f32, 0.4, 0.4, 0.1].view()), Some(1));
		assert_eq!(argmax(array![0.25f32, 0.25, 0.25, 0.25].view()), Some(0));
		assert_eq!(argmax(Array1::<f32>::zeros(0).view()), None);
	}

	#[test]
	fn test_evaluate_counts_matches() {
		let examples = Examples {
			inputs: array![[0u32, 1], [1, 2], [0, 3], [2, 1]],
			labels: array![
				[0.0f32, 0.0, 1.0],
				[0.0, 1.0, 0.0],
				[0.0, 0.0, 1.0],
				[0.0, 0.0, 1.0]
			],
		};
		let classifier = Constant { classes: 3, class: 2 };
		let evaluation = evaluate(&classifier, &examples).unwrap();
		assert_eq!(evaluation.samples, 4);
		assert!((evaluation.accuracy - 0.75).abs() < 1e-6);
	}

	#[test]
	fn test_evaluate_empty_set() {
		let examples = Examples {
			inputs: Array2::zeros((0, 3)),
			labels: Array2::zeros((0, 4)),
		};
		let classifier = Constant { classes: 4, class: 1 };
		let evaluation = evaluate(&classifier, &examples).unwrap();
		assert_eq!(evaluation, Evaluation { samples: 0, accuracy: 0.0 });
	}
}
