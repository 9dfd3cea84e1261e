use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::classifier::SequenceClassifier;
use super::context_model::ContextModel;
use crate::dataset::padding::{Examples, strip_padding};
use crate::error::{NextWordError, Result};

/// Count-based back-off classifier.
///
/// Holds one [`ContextModel`] per context length. Prediction uses the
/// longest context suffix that was observed during fitting and falls back
/// to shorter ones, down to the label prior (length 0).
///
/// This is the built-in [`SequenceClassifier`] backend. It is trained in a
/// single pass and needs no hyperparameters besides `max_context`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BackoffClassifier {
	classes: usize,
	/// Longest context used; 0 means the full input width.
	max_context: usize,
	models: HashMap<usize, ContextModel>,
}

impl BackoffClassifier {
	/// Creates an untrained classifier over `classes` labels.
	pub fn new(classes: usize, max_context: usize) -> Self {
		Self { classes, max_context, models: HashMap::new() }
	}

	/// Restores a classifier from [`SequenceClassifier::to_bytes`] output.
	///
	/// # Errors
	/// Returns [`NextWordError::Classifier`] if the bytes are not a valid state.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		postcard::from_bytes(bytes).map_err(|e| NextWordError::Classifier(format!("invalid state: {e}")))
	}

	/// Context lengths to record or probe for a history of `len` ids.
	fn context_limit(&self, len: usize) -> usize {
		if self.max_context == 0 { len } else { len.min(self.max_context) }
	}

	/// Records one example under every context length it supports.
	fn add_example(&mut self, history: &[u32], label: u32) {
		for k in 0..=self.context_limit(history.len()) {
			self.models
				.entry(k)
				.or_insert_with(|| ContextModel::new(k))
				.add_example(history, label);
		}
	}

	/// Merges another classifier into this one.
	///
	/// # Errors
	/// Returns an error if the class counts differ.
	pub fn merge(&mut self, other: &Self) -> std::result::Result<(), String> {
		if self.classes != other.classes {
			return Err(format!("Class count mismatch: {} vs {}", self.classes, other.classes));
		}

		for (k, model) in &other.models {
			if let Some(existing) = self.models.get_mut(k) {
				existing.merge(model)?;
			} else {
				self.models.insert(*k, model.clone());
			}
		}

		Ok(())
	}

	/// Reads `(history, label)` pairs out of one-hot examples.
	fn decode_examples(&self, examples: &Examples) -> Result<Vec<(Vec<u32>, u32)>> {
		if examples.inputs.nrows() != examples.labels.nrows() {
			return Err(NextWordError::Classifier(format!(
				"{} input rows but {} label rows",
				examples.inputs.nrows(),
				examples.labels.nrows()
			)));
		}
		if examples.labels.ncols() != self.classes {
			return Err(NextWordError::Classifier(format!(
				"labels have {} columns, expected {}",
				examples.labels.ncols(),
				self.classes
			)));
		}

		let mut pairs = Vec::with_capacity(examples.len());
		for (i, (input, label)) in examples.inputs.rows().into_iter().zip(examples.labels.rows()).enumerate() {
			let hot: Vec<usize> = label
				.iter()
				.enumerate()
				.filter(|(_, value)| **value != 0.0)
				.map(|(class, _)| class)
				.collect();
			let class = match hot.as_slice() {
				[class] if label[*class] == 1.0 => *class as u32,
				_ => return Err(NextWordError::Classifier(format!("label row {i} is not one-hot"))),
			};
			let row = input.to_vec();
			pairs.push((strip_padding(&row).to_vec(), class));
		}
		Ok(pairs)
	}
}

impl SequenceClassifier for BackoffClassifier {
	fn classes(&self) -> usize {
		self.classes
	}

	/// Counts every example, splitting the work across CPU cores.
	///
	/// # Behavior
	/// - Splits rows into chunks (based on CPU cores * factor).
	/// - Spawns threads to build partial classifiers for each chunk.
	/// - Merges all partial classifiers; counts are summed, so the result
	///   does not depend on chunking.
	fn fit(&mut self, examples: &Examples) -> Result<()> {
		let pairs = self.decode_examples(examples)?;
		if pairs.is_empty() {
			return Err(NextWordError::Classifier("no examples to fit".to_owned()));
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = pairs.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		for chunk in pairs.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk = chunk.to_vec();
			let mut partial = Self::new(self.classes, self.max_context);

			thread::spawn(move || {
				for (history, label) in chunk {
					partial.add_example(&history, label);
				}
				// The receiver outlives every sender
				let _ = tx.send(partial);
			});
		}
		drop(tx);

		let expected = pairs.len().div_ceil(chunk_size);
		let mut received = 0;
		for partial in rx.iter() {
			self.merge(&partial).map_err(NextWordError::Classifier)?;
			received += 1;
		}
		if received != expected {
			return Err(NextWordError::Classifier(format!(
				"{} of {} fitting workers failed",
				expected - received,
				expected
			)));
		}

		debug!(
			"Fitted back-off classifier: {} context lengths, {} examples",
			self.models.len(),
			pairs.len()
		);
		Ok(())
	}

	/// Scores each row with the longest known context suffix.
	///
	/// Rows without any known context (untrained classifier) get a uniform
	/// distribution over all classes.
	fn predict(&self, inputs: &Array2<u32>) -> Result<Array2<f32>> {
		if self.classes == 0 {
			return Err(NextWordError::Classifier("classifier has no classes".to_owned()));
		}

		let mut probabilities = Array2::from_elem((inputs.nrows(), self.classes), 1.0 / self.classes as f32);
		for (input, mut out) in inputs.rows().into_iter().zip(probabilities.rows_mut()) {
			let row = input.to_vec();
			let history = strip_padding(&row);

			let state = (0..=self.context_limit(history.len()))
				.rev()
				.find_map(|k| self.models.get(&k)?.lookup(history));

			if let Some(state) = state {
				let slice = out
					.as_slice_mut()
					.ok_or_else(|| NextWordError::Classifier("non-contiguous output row".to_owned()))?;
				state.fill_distribution(slice).map_err(NextWordError::Classifier)?;
			}
		}
		Ok(probabilities)
	}

	fn to_bytes(&self) -> Result<Vec<u8>> {
		postcard::to_stdvec(self).map_err(|e| NextWordError::Classifier(format!("cannot serialize state: {e}")))
	}
}
