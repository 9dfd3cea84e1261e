use log::debug;
use ndarray::Array2;

use super::classifier::{SequenceClassifier, argmax};
use crate::dataset::padding::pad_input;
use crate::error::{NextWordError, Result};
use crate::text::vocabulary::{PADDING_ID, Vocabulary};

/// Turns free-form text into a next-word prediction.
///
/// # Responsibilities
/// - Encode text with the frozen vocabulary (unknown words are dropped)
/// - Fit the ids into the training input width `W - 1`
/// - Map the classifier's most probable class back to a word
///
/// The vocabulary and classifier are borrowed; several predictors can share
/// them without synchronization.
pub struct Predictor<'a, C: SequenceClassifier + ?Sized> {
	vocabulary: &'a Vocabulary,
	classifier: &'a C,
}

impl<'a, C: SequenceClassifier + ?Sized> Predictor<'a, C> {
	pub fn new(vocabulary: &'a Vocabulary, classifier: &'a C) -> Self {
		Self { vocabulary, classifier }
	}

	/// Encodes `text` into one classifier input row of `width - 1` ids.
	///
	/// If the text has `width` ids or more, only the last `width - 1` are
	/// kept. Shorter inputs are left-padded; text without any known word
	/// gives an all-padding row.
	///
	/// # Errors
	/// Returns [`NextWordError::Shape`] if `width < 2`.
	pub fn encode_input(&self, text: &str, width: usize) -> Result<Vec<u32>> {
		check_width(width)?;
		Ok(pad_input(&self.vocabulary.encode(text), width - 1))
	}

	/// Predicts the word following `text`.
	///
	/// # Returns
	/// - `Ok(Some(word))` for the most probable class (lowest id on ties)
	/// - `Ok(None)` if the text has no known word, or the winning class is
	///   the padding id or has no word in the vocabulary
	///
	/// # Errors
	/// - [`NextWordError::Shape`] if `width < 2`
	/// - [`NextWordError::Classifier`] if the classifier fails or returns a
	///   malformed probability matrix
	pub fn predict(&self, text: &str, width: usize) -> Result<Option<String>> {
		let row = self.encode_input(text, width)?;
		if row.iter().all(|id| *id == PADDING_ID) {
			debug!("No known word in {text:?}");
			return Ok(None);
		}
		let next = self.predict_row(row)?;
		Ok(next.and_then(|id| self.vocabulary.word(id)).map(str::to_owned))
	}

	/// Scores one padded row and returns the winning id, `None` for the
	/// padding id or an id outside the vocabulary.
	fn predict_row(&self, row: Vec<u32>) -> Result<Option<u32>> {
		let inputs = Array2::from_shape_vec((1, row.len()), row)
			.map_err(|e| NextWordError::Shape(e.to_string()))?;
		let probabilities = self.classifier.predict(&inputs)?;
		if probabilities.nrows() != 1 {
			return Err(NextWordError::Classifier(format!(
				"expected 1 prediction row, got {}",
				probabilities.nrows()
			)));
		}

		let id = argmax(probabilities.row(0)).map(|class| class as u32);
		Ok(id.filter(|id| self.vocabulary.word(*id).is_some()))
	}

	/// Extends `text` by up to `count` predicted words.
	///
	/// The text is encoded once; each predicted id then slides into a window
	/// of the last `width - 1` ids. Generation stops early when there is no
	/// prediction. The result is the trimmed text followed by the generated
	/// words.
	pub fn generate(&self, text: &str, width: usize, count: usize) -> Result<String> {
		check_width(width)?;
		let mut generated = text.trim().to_owned();
		let mut window = pad_input(&self.vocabulary.encode(text), width - 1);

		for _ in 0..count {
			if window.iter().all(|id| *id == PADDING_ID) {
				break;
			}
			let Some(id) = self.predict_row(window.clone())? else {
				break;
			};
			let Some(word) = self.vocabulary.word(id) else {
				break;
			};
			if !generated.is_empty() {
				generated.push(' ');
			}
			generated.push_str(word);
			window.remove(0);
			window.push(id);
		}
		Ok(generated)
	}
}

fn check_width(width: usize) -> Result<()> {
	if width < 2 {
		return Err(NextWordError::Shape(format!("width must be >= 2, got {width}")));
	}
	Ok(())
}
